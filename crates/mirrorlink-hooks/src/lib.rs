pub mod github;
pub mod mock;

use async_trait::async_trait;

use mirrorlink_types::error::GatewayError;
use mirrorlink_types::models::{Link, Repository};

/// Remote webhook management on the hosting platform. The reconciler only
/// depends on this contract; production and test implementations are injected
/// at startup.
///
/// Both calls must be safely retryable. Idempotent registration is the
/// gateway's responsibility: registering twice for the same link and upstream
/// must not produce a second remote subscription.
#[async_trait]
pub trait WebhookGateway: Send + Sync {
    async fn register_webhooks(
        &self,
        repository: &Repository,
        link: &Link,
    ) -> Result<Vec<String>, GatewayError>;

    async fn deregister_webhooks(
        &self,
        repository: &Repository,
        hook_ids: &[String],
    ) -> Result<(), GatewayError>;
}
