use tracing::warn;
use uuid::Uuid;

use mirrorlink_db::Database;
use mirrorlink_hooks::WebhookGateway;
use mirrorlink_types::error::LinkError;
use mirrorlink_types::models::{Link, Repository, RepositoryRef};

use crate::registry;

/// The desired new state of a link. Absent fields retain the current value.
#[derive(Debug, Default)]
pub struct DesiredLink {
    pub name: Option<String>,
    pub upstream: Option<RepositoryRef>,
    pub fork: Option<RepositoryRef>,
    pub enabled: Option<bool>,
}

/// Diffs the desired state against the loaded link, issues the minimal
/// webhook register/deregister calls, and persists the merged row.
///
/// Only the upstream slot drives webhook placement; resolving a fork
/// reference never touches the gateway. The old hook set is deregistered
/// best-effort before the new one is registered — stale remote hooks are
/// preferred over losing mirroring — while a registration failure aborts the
/// whole operation with nothing persisted. The merged row is written as a
/// single atomic update, so the stored link always reflects a hook set that
/// was actually created.
pub async fn reconcile(
    db: &Database,
    gateway: &dyn WebhookGateway,
    current: &Link,
    desired: DesiredLink,
) -> Result<Link, LinkError> {
    let resolved_upstream = desired
        .upstream
        .as_ref()
        .map(|reference| registry::resolve(db, reference))
        .transpose()?;
    let resolved_fork_id = desired
        .fork
        .as_ref()
        .map(|reference| registry::resolve(db, reference))
        .transpose()?
        .map(|repository| repository.id);

    let new_upstream_id = match &resolved_upstream {
        Some(repository) => Some(repository.id),
        None => current.upstream_id,
    };
    let upstream_changed = resolved_upstream.is_some() && new_upstream_id != current.upstream_id;
    let enabled = desired.enabled.unwrap_or(current.enabled);

    let mut link = Link {
        id: current.id,
        name: desired.name.unwrap_or_else(|| current.name.clone()),
        enabled,
        hook_ids: current.hook_ids.clone(),
        owner_id: current.owner_id,
        upstream_id: new_upstream_id,
        fork_id: resolved_fork_id.or(current.fork_id),
    };

    if !enabled {
        if current.enabled && !current.hook_ids.is_empty() {
            deregister_current(db, gateway, current).await?;
        }
        link.hook_ids = Vec::new();
    } else if upstream_changed || !current.enabled {
        if let Some(upstream_id) = new_upstream_id {
            let upstream = match &resolved_upstream {
                Some(repository) => repository.clone(),
                None => fetch_repository(db, upstream_id)?,
            };

            if !current.hook_ids.is_empty() {
                deregister_current(db, gateway, current).await?;
            }

            link.hook_ids = gateway
                .register_webhooks(&upstream, &link)
                .await
                .map_err(LinkError::WebhookRegistrationFailed)?;
        }
    }

    let overwritten = db.update_link(&link)?;
    if overwritten != current.hook_ids {
        warn!(
            "Link {} hook set changed under us (stored {:?}, loaded {:?}); \
             the concurrent writer's remote hooks may need manual cleanup",
            link.id, overwritten, current.hook_ids
        );
    }

    Ok(link)
}

/// Best-effort removal of the link's current hook set from its current
/// upstream. Gateway failures are logged and swallowed; store failures
/// propagate.
pub(crate) async fn deregister_current(
    db: &Database,
    gateway: &dyn WebhookGateway,
    current: &Link,
) -> Result<(), LinkError> {
    let Some(upstream_id) = current.upstream_id else {
        return Ok(());
    };
    let Some(row) = db.get_repository(&upstream_id.to_string())? else {
        warn!(
            "Upstream {} of link {} is gone, skipping webhook cleanup",
            upstream_id, current.id
        );
        return Ok(());
    };
    let upstream = row.into_model()?;

    if let Err(err) = gateway
        .deregister_webhooks(&upstream, &current.hook_ids)
        .await
    {
        warn!(
            "Failed to deregister webhooks {:?} on {}/{} for link {}: {}",
            current.hook_ids, upstream.owner, upstream.repo, current.id, err
        );
    }
    Ok(())
}

fn fetch_repository(db: &Database, id: Uuid) -> Result<Repository, LinkError> {
    let row = db.get_repository(&id.to_string())?.ok_or(LinkError::NotFound)?;
    Ok(row.into_model()?)
}
