use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use service::errors::ServiceError;
use tracing::error;

/// Service error carried to the HTTP boundary; `IntoResponse` does the
/// status mapping so handlers stay `?`-friendly.
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl From<ServiceError> for ApiError {
    fn from(e: ServiceError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ServiceError::Validation(_)
            | ServiceError::Conflict(_)
            | ServiceError::InvalidCredentials(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Hash(_) | ServiceError::Store(_) | ServiceError::Model(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let msg = self.0.to_string();
        if status.is_server_error() {
            error!(error = %msg, "request failed");
        }
        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}
