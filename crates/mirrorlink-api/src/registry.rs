use uuid::Uuid;

use mirrorlink_db::Database;
use mirrorlink_types::error::LinkError;
use mirrorlink_types::models::{Repository, RepositoryDescriptor, RepositoryRef};

/// Resolve a repository reference to a persisted Repository.
///
/// An id must point at an existing row (`NotFound` otherwise) and has no side
/// effect. An inline descriptor always inserts a new row — resolution never
/// mutates an existing Repository, and identical descriptors are deliberately
/// not deduplicated.
pub fn resolve(db: &Database, reference: &RepositoryRef) -> Result<Repository, LinkError> {
    match reference {
        RepositoryRef::Id(id) => {
            let row = db
                .get_repository(&id.to_string())?
                .ok_or(LinkError::NotFound)?;
            Ok(row.into_model()?)
        }
        RepositoryRef::Inline(descriptor) => create_from_descriptor(db, descriptor),
    }
}

fn create_from_descriptor(
    db: &Database,
    descriptor: &RepositoryDescriptor,
) -> Result<Repository, LinkError> {
    let owner = required(&descriptor.owner, "owner")?;
    let repo = required(&descriptor.repo, "repo")?;

    let repository = Repository {
        id: Uuid::new_v4(),
        kind: descriptor.kind.clone().unwrap_or_else(|| "github".into()),
        html_url: descriptor
            .html_url
            .clone()
            .unwrap_or_else(|| format!("https://github.com/{}/{}", owner, repo)),
        branches: descriptor.branches.clone().unwrap_or_default(),
        branch: descriptor.branch.clone().unwrap_or_else(|| "main".into()),
        fork: descriptor.fork.unwrap_or(false),
        owner,
        repo,
    };

    db.insert_repository(&repository)?;
    Ok(repository)
}

fn required(field: &Option<String>, name: &str) -> Result<String, LinkError> {
    field
        .clone()
        .filter(|value| !value.is_empty())
        .ok_or_else(|| LinkError::InvalidInput(format!("repository descriptor is missing '{name}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(owner: &str, repo: &str) -> RepositoryRef {
        RepositoryRef::Inline(RepositoryDescriptor {
            kind: None,
            owner: Some(owner.into()),
            repo: Some(repo.into()),
            html_url: None,
            branches: Some(vec!["main".into(), "dev".into()]),
            branch: None,
            fork: None,
        })
    }

    #[test]
    fn unknown_id_is_not_found() {
        let db = Database::open_in_memory().unwrap();
        let err = resolve(&db, &RepositoryRef::Id(Uuid::new_v4())).unwrap_err();
        assert!(matches!(err, LinkError::NotFound));
    }

    #[test]
    fn inline_descriptor_creates_and_persists() {
        let db = Database::open_in_memory().unwrap();
        let repository = resolve(&db, &descriptor("foo", "bar")).unwrap();

        assert_eq!(repository.kind, "github");
        assert_eq!(repository.html_url, "https://github.com/foo/bar");
        assert_eq!(repository.branch, "main");

        let reloaded = resolve(&db, &RepositoryRef::Id(repository.id)).unwrap();
        assert_eq!(reloaded.owner, "foo");
        assert_eq!(reloaded.branches, vec!["main".to_string(), "dev".to_string()]);
    }

    #[test]
    fn identical_descriptors_create_distinct_rows() {
        let db = Database::open_in_memory().unwrap();
        let first = resolve(&db, &descriptor("foo", "bar")).unwrap();
        let second = resolve(&db, &descriptor("foo", "bar")).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn missing_owner_is_invalid_input() {
        let db = Database::open_in_memory().unwrap();
        let reference = RepositoryRef::Inline(RepositoryDescriptor {
            kind: None,
            owner: None,
            repo: Some("bar".into()),
            html_url: None,
            branches: None,
            branch: None,
            fork: None,
        });
        let err = resolve(&db, &reference).unwrap_err();
        assert!(matches!(err, LinkError::InvalidInput(_)));
    }
}
