use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::{error, warn};

use mirrorlink_types::api::{ErrorBody, ErrorDetail};
use mirrorlink_types::error::LinkError;

/// Maps the error taxonomy onto HTTP. Internals (store errors, remote bodies)
/// are logged, never exposed.
pub struct ApiError(pub LinkError);

impl From<LinkError> for ApiError {
    fn from(err: LinkError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self.0 {
            LinkError::InvalidInput(reason) => {
                (StatusCode::BAD_REQUEST, "invalid_input", reason.clone())
            }
            LinkError::NotFound => (StatusCode::NOT_FOUND, "not_found", "not found".into()),
            LinkError::Forbidden => (StatusCode::FORBIDDEN, "forbidden", "forbidden".into()),
            LinkError::Gateway(err) => {
                warn!("Webhook gateway failure: {}", err);
                (
                    StatusCode::BAD_GATEWAY,
                    "gateway_error",
                    "webhook gateway failure".into(),
                )
            }
            LinkError::WebhookRegistrationFailed(err) => {
                warn!("Webhook registration failed: {}", err);
                (
                    StatusCode::BAD_GATEWAY,
                    "webhook_registration_failed",
                    "webhook registration failed".into(),
                )
            }
            LinkError::Persistence(err) => {
                error!("Persistence failure: {:#}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "persistence_error",
                    "internal error".into(),
                )
            }
        };

        (
            status,
            Json(ErrorBody {
                error: ErrorDetail { code, message },
            }),
        )
            .into_response()
    }
}
