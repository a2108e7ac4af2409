use thiserror::Error;

/// Failure talking to the remote hosting platform's webhook API.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("webhook API request failed: {0}")]
    Http(String),
    #[error("webhook API returned {status}: {body}")]
    Remote { status: u16, body: String },
}

/// Error taxonomy for link operations. Deregistration gateway failures are
/// caught and logged by the reconciler and never reach callers; registration
/// failures surface as `WebhookRegistrationFailed` with nothing persisted.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("not found")]
    NotFound,
    #[error("forbidden")]
    Forbidden,
    #[error("webhook gateway failure: {0}")]
    Gateway(#[from] GatewayError),
    #[error("webhook registration failed: {0}")]
    WebhookRegistrationFailed(GatewayError),
    #[error("persistence failure: {0}")]
    Persistence(anyhow::Error),
}

impl From<anyhow::Error> for LinkError {
    fn from(err: anyhow::Error) -> Self {
        LinkError::Persistence(err)
    }
}
