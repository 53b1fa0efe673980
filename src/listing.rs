use serde::Serialize;

/// 1x1 transparent PNG, base64-encoded.
pub const SMALL_IMAGE_B64: &str =
    "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

/// Repeating the sample this many times yields a ~50KB image payload.
pub const IMAGE_REPEAT: usize = 500;

pub const DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// One marketplace listing as the API accepts it. Field names follow the
/// server's camelCase wire format.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDraft {
    pub title: String,
    pub price: f64,
    pub description: String,
    pub category: String,
    pub condition: String,
    pub image_url: String,
}

impl ListingDraft {
    /// The fixed draft submitted by the smoke run: valid in every field,
    /// oversized only in its embedded image.
    pub fn oversized_image_sample() -> Self {
        Self {
            title: "Test Large Image".to_string(),
            price: 50.0,
            description: "Test".to_string(),
            category: "Other".to_string(),
            condition: "Good".to_string(),
            image_url: oversized_image_data_uri(),
        }
    }
}

/// Builds the data URI by repeating the small sample image.
pub fn oversized_image_data_uri() -> String {
    let mut uri =
        String::with_capacity(DATA_URI_PREFIX.len() + SMALL_IMAGE_B64.len() * IMAGE_REPEAT);
    uri.push_str(DATA_URI_PREFIX);
    for _ in 0..IMAGE_REPEAT {
        uri.push_str(SMALL_IMAGE_B64);
    }
    uri
}
