use std::sync::Arc;

use jsonwebtoken::DecodingKey;

use mirrorlink_db::Database;
use mirrorlink_hooks::WebhookGateway;

pub type AppState = Arc<AppStateInner>;

/// Shared handles, constructed once at startup and threaded through every
/// handler; nothing here is reached as ambient state.
pub struct AppStateInner {
    pub db: Database,
    pub gateway: Arc<dyn WebhookGateway>,
    pub auth_key: DecodingKey,
}
