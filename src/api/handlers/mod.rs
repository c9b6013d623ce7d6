pub mod analysis;
pub mod dashboard;
pub mod odds;
pub mod system;

pub use analysis::*;
pub use dashboard::*;
pub use odds::*;
pub use system::*;

use axum::{http::StatusCode, Json};

use crate::api::types::ErrorBody;
use crate::error::{FetchError, MatchdayError};

pub type ApiError = (StatusCode, Json<ErrorBody>);

pub(crate) fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorBody {
            error: message.into(),
        }),
    )
}

pub(crate) fn fetch_status(err: &FetchError) -> StatusCode {
    match err {
        FetchError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}

pub(crate) fn service_error(err: MatchdayError) -> ApiError {
    let status = match &err {
        MatchdayError::Validation(_) => StatusCode::BAD_REQUEST,
        MatchdayError::Fetch(e) => fetch_status(e),
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    api_error(status, err.to_string())
}
