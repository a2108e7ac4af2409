use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use mirrorlink_db::Database;
use mirrorlink_types::api::{LinkResponse, LinksIndexResponse, UpdateLinkBody};
use mirrorlink_types::error::LinkError;
use mirrorlink_types::models::Link;

use crate::error::ApiError;
use crate::middleware::Claims;
use crate::reconciler::{self, DesiredLink};
use crate::state::{AppState, AppStateInner};

const DEFAULT_LINK_NAME: &str = "untitled link";

// -- Handlers --

pub async fn index(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let data = index_links(&state, &claims)?;
    Ok(Json(LinksIndexResponse { data }))
}

pub async fn show(
    State(state): State<AppState>,
    Path(link_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(get_link(&state, &claims, link_id)?))
}

pub async fn create(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    Ok((StatusCode::CREATED, Json(create_link(&state, &claims)?)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(link_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(body): Json<UpdateLinkBody>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(update_link(&state, &claims, link_id, body).await?))
}

pub async fn destroy(
    State(state): State<AppState>,
    Path(link_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    delete_link(&state, &claims, link_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// -- Lifecycle operations --

/// A new link starts unlinked and disabled; there is nothing to reconcile
/// until an upstream is configured. The owner's user row is upserted so the
/// projection has something to embed.
pub fn create_link(state: &AppStateInner, claims: &Claims) -> Result<LinkResponse, LinkError> {
    state
        .db
        .ensure_user(&claims.sub.to_string(), &claims.username)?;

    let link = Link {
        id: Uuid::new_v4(),
        name: DEFAULT_LINK_NAME.into(),
        enabled: false,
        hook_ids: vec![],
        owner_id: claims.sub,
        upstream_id: None,
        fork_id: None,
    };
    state.db.insert_link(&link)?;

    expand(&state.db, link)
}

pub fn index_links(
    state: &AppStateInner,
    claims: &Claims,
) -> Result<Vec<LinkResponse>, LinkError> {
    let rows = state.db.list_links_by_owner(&claims.sub.to_string())?;
    rows.into_iter()
        .map(|row| {
            let link = row.into_model()?;
            expand(&state.db, link)
        })
        .collect()
}

/// Read-only projection. Unlike the mutating operations, a link owned by
/// someone else reads as absent rather than forbidden.
pub fn get_link(
    state: &AppStateInner,
    claims: &Claims,
    link_id: Uuid,
) -> Result<LinkResponse, LinkError> {
    let link = load_owned(&state.db, link_id, claims.sub).map_err(|err| match err {
        LinkError::Forbidden => LinkError::NotFound,
        other => other,
    })?;
    expand(&state.db, link)
}

pub async fn update_link(
    state: &AppStateInner,
    claims: &Claims,
    link_id: Uuid,
    body: UpdateLinkBody,
) -> Result<LinkResponse, LinkError> {
    let current = load_owned(&state.db, link_id, claims.sub)?;

    let patch = body.link;
    let desired = DesiredLink {
        name: patch.as_ref().and_then(|p| p.name.clone()),
        upstream: patch.as_ref().and_then(|p| p.upstream.clone()),
        fork: patch.as_ref().and_then(|p| p.fork.clone()),
        enabled: body.enabled,
    };

    let updated = reconciler::reconcile(&state.db, state.gateway.as_ref(), &current, desired).await?;
    expand(&state.db, updated)
}

/// Full teardown: best-effort deregistration of any owned hooks, then row
/// removal. A gateway failure never blocks the delete.
pub async fn delete_link(
    state: &AppStateInner,
    claims: &Claims,
    link_id: Uuid,
) -> Result<(), LinkError> {
    let current = load_owned(&state.db, link_id, claims.sub)?;

    if !current.hook_ids.is_empty() {
        reconciler::deregister_current(&state.db, state.gateway.as_ref(), &current).await?;
    }

    if !state.db.delete_link(&link_id.to_string())? {
        return Err(LinkError::NotFound);
    }
    Ok(())
}

// -- Helpers --

fn load_owned(db: &Database, link_id: Uuid, owner: Uuid) -> Result<Link, LinkError> {
    let row = db
        .get_link(&link_id.to_string())?
        .ok_or(LinkError::NotFound)?;
    let link = row.into_model()?;
    if link.owner_id != owner {
        return Err(LinkError::Forbidden);
    }
    Ok(link)
}

/// Expands owner/upstream/fork ids into embedded objects for presentation.
fn expand(db: &Database, link: Link) -> Result<LinkResponse, LinkError> {
    let owner = db
        .get_user(&link.owner_id.to_string())?
        .map(|row| row.into_model())
        .transpose()?;
    let upstream = link
        .upstream_id
        .map(|id| db.get_repository(&id.to_string()))
        .transpose()?
        .flatten()
        .map(|row| row.into_model())
        .transpose()?;
    let fork = link
        .fork_id
        .map(|id| db.get_repository(&id.to_string()))
        .transpose()?
        .flatten()
        .map(|row| row.into_model())
        .transpose()?;

    Ok(LinkResponse {
        link,
        owner,
        upstream,
        fork,
    })
}
