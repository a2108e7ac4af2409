use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
}

/// A mirrorable code repository. The `fork` flag is informational only —
/// whether a repository acts as upstream or fork for a given link is decided
/// purely by which slot of the link it occupies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repository {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: String,
    pub owner: String,
    pub repo: String,
    pub html_url: String,
    pub branches: Vec<String>,
    pub branch: String,
    pub fork: bool,
}

/// One mirror relationship: owner → upstream → fork, plus enablement and the
/// remote webhook identifiers the link currently owns on its upstream.
///
/// `hook_ids` is non-empty only while `enabled` is true and `upstream_id` is
/// set; it is the sole evidence of live remote subscriptions. The wire name
/// `hookId` is kept for client compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: Uuid,
    pub name: String,
    pub enabled: bool,
    #[serde(rename = "hookId")]
    pub hook_ids: Vec<String>,
    pub owner_id: Uuid,
    pub upstream_id: Option<Uuid>,
    pub fork_id: Option<Uuid>,
}

/// How a request names a repository: either the id of a persisted row, or an
/// inline descriptor that the registry turns into a new row.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RepositoryRef {
    Id(Uuid),
    Inline(RepositoryDescriptor),
}

/// Inline repository descriptor. `owner` and `repo` are required; the rest is
/// optional and defaulted by the registry. Fields are `Option` so that missing
/// required fields surface as `InvalidInput` instead of a serde error buried
/// in the untagged enum.
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryDescriptor {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub html_url: Option<String>,
    pub branches: Option<Vec<String>>,
    pub branch: Option<String>,
    pub fork: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_ref_parses_id_and_inline() {
        let id: RepositoryRef =
            serde_json::from_str("\"0a0b785e-1bc8-4bbd-9a40-46a8dba6fdd2\"").unwrap();
        assert!(matches!(id, RepositoryRef::Id(_)));

        let inline: RepositoryRef =
            serde_json::from_str(r#"{"owner": "foo", "repo": "bar"}"#).unwrap();
        match inline {
            RepositoryRef::Inline(desc) => {
                assert_eq!(desc.owner.as_deref(), Some("foo"));
                assert_eq!(desc.repo.as_deref(), Some("bar"));
                assert!(desc.kind.is_none());
            }
            RepositoryRef::Id(_) => panic!("object parsed as id"),
        }
    }

    #[test]
    fn link_serializes_wire_names() {
        let link = Link {
            id: Uuid::nil(),
            name: "mirror".into(),
            enabled: true,
            hook_ids: vec!["98765".into()],
            owner_id: Uuid::nil(),
            upstream_id: None,
            fork_id: None,
        };

        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["hookId"], serde_json::json!(["98765"]));
        assert!(value.get("ownerId").is_some());
        assert!(value.get("upstreamId").is_some());
        assert!(value.get("hook_ids").is_none());
    }
}
