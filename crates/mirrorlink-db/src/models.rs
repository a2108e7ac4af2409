use anyhow::{Context, Result};
use uuid::Uuid;

use mirrorlink_types::models::{Link, Repository, User};

/// Raw rows as stored in SQLite. Ids are TEXT uuids and the hook/branch sets
/// are JSON arrays; `into_model` does the parsing in one place so callers
/// work with typed values.
#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct RepositoryRow {
    pub id: String,
    pub kind: String,
    pub owner: String,
    pub repo: String,
    pub html_url: String,
    pub branches: String,
    pub branch: String,
    pub fork: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct LinkRow {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub hook_ids: String,
    pub owner_id: String,
    pub upstream_id: Option<String>,
    pub fork_id: Option<String>,
    pub created_at: String,
}

impl UserRow {
    pub fn into_model(self) -> Result<User> {
        Ok(User {
            id: parse_uuid(&self.id, "user id")?,
            username: self.username,
        })
    }
}

impl RepositoryRow {
    pub fn into_model(self) -> Result<Repository> {
        Ok(Repository {
            id: parse_uuid(&self.id, "repository id")?,
            kind: self.kind,
            owner: self.owner,
            repo: self.repo,
            html_url: self.html_url,
            branches: serde_json::from_str(&self.branches)
                .with_context(|| format!("corrupt branches column on repository {}", self.id))?,
            branch: self.branch,
            fork: self.fork,
        })
    }
}

impl LinkRow {
    pub fn into_model(self) -> Result<Link> {
        Ok(Link {
            id: parse_uuid(&self.id, "link id")?,
            name: self.name,
            enabled: self.enabled,
            hook_ids: serde_json::from_str(&self.hook_ids)
                .with_context(|| format!("corrupt hook_ids column on link {}", self.id))?,
            owner_id: parse_uuid(&self.owner_id, "link owner id")?,
            upstream_id: self
                .upstream_id
                .as_deref()
                .map(|id| parse_uuid(id, "link upstream id"))
                .transpose()?,
            fork_id: self
                .fork_id
                .as_deref()
                .map(|id| parse_uuid(id, "link fork id"))
                .transpose()?,
        })
    }
}

fn parse_uuid(raw: &str, what: &str) -> Result<Uuid> {
    raw.parse()
        .with_context(|| format!("corrupt {}: '{}'", what, raw))
}
