//! One-shot smoke check that posts an oversized-image marketplace listing to a
//! local API, with an in-memory mock transport for fully deterministic tests.

pub mod adapter;
pub mod listing;
pub mod mock;
pub mod runner;

pub use reqwest::Method;

pub use adapter::{
    ApiError, ApiErrorKind, ApiFuture, ApiRequest, ApiResponse, ApiResult, ApiTransport, Client,
    DEFAULT_TIMEOUT, ReqwestTransport,
};
pub use listing::{
    DATA_URI_PREFIX, IMAGE_REPEAT, ListingDraft, SMALL_IMAGE_B64, oversized_image_data_uri,
};
pub use mock::{MockBehavior, MockResponse, MockSnapshot, MockTransport};
pub use runner::{API_URL, SmokeReport, submit_listing};
