use std::fmt;

use sonic_rs::Value;

use crate::adapter::{ApiError, ApiResult, Client};
use crate::listing::ListingDraft;

/// Endpoint under test.
pub const API_URL: &str = "http://localhost:8080/api/listings";

const CREATED: u16 = 201;

/// Outcome of one smoke run against a reachable endpoint. `body` holds the
/// response JSON, already pretty-printed.
#[derive(Clone, Debug)]
pub struct SmokeReport {
    pub status: u16,
    pub body: String,
}

impl SmokeReport {
    pub fn accepted(&self) -> bool {
        self.status == CREATED
    }
}

impl fmt::Display for SmokeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Status: {}", self.status)?;
        if self.accepted() {
            writeln!(f, "✅ Success!")?;
        } else {
            writeln!(f, "❌ Error:")?;
        }
        write!(f, "{}", self.body)
    }
}

/// Posts the oversized-image listing draft to `url` and reports the outcome.
/// Transport failures and non-JSON bodies surface as a single `ApiError`.
pub async fn submit_listing(client: &Client, url: &str) -> ApiResult<SmokeReport> {
    let draft = ListingDraft::oversized_image_sample();
    let response = client.post_json(url, &draft).await?;

    let body: Value = response.json()?;
    let body = sonic_rs::to_string_pretty(&body).map_err(ApiError::from)?;

    Ok(SmokeReport {
        status: response.status(),
        body,
    })
}
