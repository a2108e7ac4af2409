use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info};

use mirrorlink_types::error::GatewayError;
use mirrorlink_types::models::{Link, Repository};

use crate::WebhookGateway;

const USER_AGENT: &str = concat!("mirrorlink/", env!("CARGO_PKG_VERSION"));

/// Webhook management against the GitHub REST API.
pub struct GitHubGateway {
    http: reqwest::Client,
    api_base: String,
    token: String,
    callback_url: String,
}

#[derive(Debug, Deserialize)]
struct HookResource {
    id: u64,
    #[serde(default)]
    config: HookConfig,
}

#[derive(Debug, Default, Deserialize)]
struct HookConfig {
    url: Option<String>,
}

impl GitHubGateway {
    pub fn new(api_base: String, token: String, callback_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            token,
            callback_url: callback_url.trim_end_matches('/').to_string(),
        }
    }

    /// Per-link delivery URL; also the idempotency key for registration.
    fn callback_for(&self, link: &Link) -> String {
        format!("{}/{}", self.callback_url, link.id)
    }

    fn hooks_endpoint(&self, repository: &Repository) -> String {
        format!(
            "{}/repos/{}/{}/hooks",
            self.api_base, repository.owner, repository.repo
        )
    }

    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, url)
            .header("authorization", format!("token {}", self.token))
            .header("accept", "application/vnd.github+json")
            .header("user-agent", USER_AGENT)
    }

    async fn existing_hook(
        &self,
        repository: &Repository,
        callback: &str,
    ) -> Result<Option<u64>, GatewayError> {
        let response = self
            .request(reqwest::Method::GET, &self.hooks_endpoint(repository))
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        let hooks: Vec<HookResource> = read_json(response).await?;
        Ok(hooks
            .into_iter()
            .find(|hook| hook.config.url.as_deref() == Some(callback))
            .map(|hook| hook.id))
    }
}

#[async_trait]
impl WebhookGateway for GitHubGateway {
    async fn register_webhooks(
        &self,
        repository: &Repository,
        link: &Link,
    ) -> Result<Vec<String>, GatewayError> {
        let callback = self.callback_for(link);

        // Reuse a hook that already points at this link's callback rather
        // than piling up duplicates on retries.
        if let Some(id) = self.existing_hook(repository, &callback).await? {
            debug!(
                "Reusing webhook {} on {}/{} for link {}",
                id, repository.owner, repository.repo, link.id
            );
            return Ok(vec![id.to_string()]);
        }

        let response = self
            .request(reqwest::Method::POST, &self.hooks_endpoint(repository))
            .json(&json!({
                "name": "web",
                "active": true,
                "events": ["push"],
                "config": {
                    "url": callback,
                    "content_type": "json",
                },
            }))
            .send()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        let hook: HookResource = read_json(response).await?;
        info!(
            "Registered webhook {} on {}/{} for link {}",
            hook.id, repository.owner, repository.repo, link.id
        );
        Ok(vec![hook.id.to_string()])
    }

    async fn deregister_webhooks(
        &self,
        repository: &Repository,
        hook_ids: &[String],
    ) -> Result<(), GatewayError> {
        let mut first_failure = None;

        // Each hook is individually retryable; attempt all of them before
        // reporting the first failure.
        for hook_id in hook_ids {
            let url = format!("{}/{}", self.hooks_endpoint(repository), hook_id);
            let result = self
                .request(reqwest::Method::DELETE, &url)
                .send()
                .await
                .map_err(|e| GatewayError::Http(e.to_string()));

            match result {
                Ok(response) => {
                    let status = response.status();
                    // An already-deleted hook counts as deregistered.
                    if status.is_success() || status == reqwest::StatusCode::NOT_FOUND {
                        debug!(
                            "Deregistered webhook {} on {}/{}",
                            hook_id, repository.owner, repository.repo
                        );
                        continue;
                    }
                    let body = response.text().await.unwrap_or_default();
                    first_failure.get_or_insert(GatewayError::Remote {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(err) => {
                    first_failure.get_or_insert(err);
                }
            }
        }

        match first_failure {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, GatewayError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(GatewayError::Remote {
            status: status.as_u16(),
            body,
        });
    }
    response
        .json()
        .await
        .map_err(|e| GatewayError::Http(e.to_string()))
}
