use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use projd_core::ProjdError;
use serde_json::json;
use tracing::{error, warn};

/// A failure that happened before any response bytes were committed.
#[derive(Debug)]
pub struct ApiError(pub ProjdError);

impl From<ProjdError> for ApiError {
    fn from(e: ProjdError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            ProjdError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ProjdError::NotFound(_) => StatusCode::NOT_FOUND,
            ProjdError::Io(_) | ProjdError::Archive(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    // server-side details stay in the log
    fn public_message(&self) -> String {
        match self.0 {
            ProjdError::InvalidInput(_) | ProjdError::NotFound(_) => self.0.to_string(),
            ProjdError::Io(_) | ProjdError::Archive(_) => "error reading project files".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        } else {
            warn!(error = %self.0, status = status.as_u16(), "request rejected");
        }
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}
