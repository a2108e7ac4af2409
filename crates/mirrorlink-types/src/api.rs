use serde::{Deserialize, Serialize};

use crate::models::{Link, Repository, RepositoryRef, User};

// -- Links --

/// Body of `PUT /links/{id}`. Two shapes share the route: `{link: {...}}`
/// repoints or renames, `{enabled: bool}` toggles webhook presence. Both may
/// be present in one request; the enabled flag is then applied alongside the
/// patch.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateLinkBody {
    pub link: Option<LinkPatch>,
    pub enabled: Option<bool>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkPatch {
    pub name: Option<String>,
    pub upstream: Option<RepositoryRef>,
    pub fork: Option<RepositoryRef>,
}

/// A link materialized for presentation: the raw ids plus the referenced
/// rows expanded into embedded objects.
#[derive(Debug, Serialize)]
pub struct LinkResponse {
    #[serde(flatten)]
    pub link: Link,
    pub owner: Option<User>,
    pub upstream: Option<Repository>,
    pub fork: Option<Repository>,
}

#[derive(Debug, Serialize)]
pub struct LinksIndexResponse {
    pub data: Vec<LinkResponse>,
}

// -- Errors --

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
}
