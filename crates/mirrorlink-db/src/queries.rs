use crate::Database;
use crate::models::{LinkRow, RepositoryRow, UserRow};
use anyhow::{Result, anyhow};
use rusqlite::{Connection, OptionalExtension};

use mirrorlink_types::models::{Link, Repository};

impl Database {
    // -- Users --

    pub fn ensure_user(&self, id: &str, username: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT OR IGNORE INTO users (id, username) VALUES (?1, ?2)",
                (id, username),
            )?;
            Ok(())
        })
    }

    pub fn get_user(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, id))
    }

    // -- Repositories --

    pub fn insert_repository(&self, repository: &Repository) -> Result<()> {
        let branches = serde_json::to_string(&repository.branches)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO repositories (id, kind, owner, repo, html_url, branches, branch, fork)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                rusqlite::params![
                    repository.id.to_string(),
                    repository.kind,
                    repository.owner,
                    repository.repo,
                    repository.html_url,
                    branches,
                    repository.branch,
                    repository.fork,
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_repository(&self, id: &str) -> Result<Option<RepositoryRow>> {
        self.with_conn(|conn| query_repository(conn, id))
    }

    // -- Links --

    pub fn insert_link(&self, link: &Link) -> Result<()> {
        let hook_ids = serde_json::to_string(&link.hook_ids)?;
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO links (id, name, enabled, hook_ids, owner_id, upstream_id, fork_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    link.id.to_string(),
                    link.name,
                    link.enabled,
                    hook_ids,
                    link.owner_id.to_string(),
                    link.upstream_id.map(|id| id.to_string()),
                    link.fork_id.map(|id| id.to_string()),
                ],
            )?;
            Ok(())
        })
    }

    pub fn get_link(&self, id: &str) -> Result<Option<LinkRow>> {
        self.with_conn(|conn| query_link(conn, id))
    }

    pub fn list_links_by_owner(&self, owner_id: &str) -> Result<Vec<LinkRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {LINK_COLUMNS} FROM links WHERE owner_id = ?1 ORDER BY created_at, id"
            ))?;
            let rows = stmt
                .query_map([owner_id], map_link_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Single-statement attribute update of the mutable link columns. Returns
    /// the hook set the update overwrote so the caller can detect a concurrent
    /// writer whose hooks would otherwise be orphaned silently. The read and
    /// the write happen under the same connection lock.
    pub fn update_link(&self, link: &Link) -> Result<Vec<String>> {
        let hook_ids = serde_json::to_string(&link.hook_ids)?;
        let id = link.id.to_string();
        self.with_conn(|conn| {
            let previous: String = conn
                .query_row("SELECT hook_ids FROM links WHERE id = ?1", [&id], |row| {
                    row.get(0)
                })
                .optional()?
                .ok_or_else(|| anyhow!("link {} no longer exists", id))?;

            conn.execute(
                "UPDATE links
                 SET name = ?2, enabled = ?3, hook_ids = ?4, upstream_id = ?5, fork_id = ?6
                 WHERE id = ?1",
                rusqlite::params![
                    id,
                    link.name,
                    link.enabled,
                    hook_ids,
                    link.upstream_id.map(|u| u.to_string()),
                    link.fork_id.map(|f| f.to_string()),
                ],
            )?;

            Ok(serde_json::from_str(&previous)?)
        })
    }

    /// Returns false if no row existed.
    pub fn delete_link(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let affected = conn.execute("DELETE FROM links WHERE id = ?1", [id])?;
            Ok(affected > 0)
        })
    }
}

const LINK_COLUMNS: &str =
    "id, name, enabled, hook_ids, owner_id, upstream_id, fork_id, created_at";

fn map_link_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LinkRow> {
    Ok(LinkRow {
        id: row.get(0)?,
        name: row.get(1)?,
        enabled: row.get(2)?,
        hook_ids: row.get(3)?,
        owner_id: row.get(4)?,
        upstream_id: row.get(5)?,
        fork_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn query_link(conn: &Connection, id: &str) -> Result<Option<LinkRow>> {
    let mut stmt = conn.prepare(&format!("SELECT {LINK_COLUMNS} FROM links WHERE id = ?1"))?;
    let row = stmt.query_row([id], map_link_row).optional()?;
    Ok(row)
}

fn query_repository(conn: &Connection, id: &str) -> Result<Option<RepositoryRow>> {
    let mut stmt = conn.prepare(
        "SELECT id, kind, owner, repo, html_url, branches, branch, fork, created_at
         FROM repositories WHERE id = ?1",
    )?;
    let row = stmt
        .query_row([id], |row| {
            Ok(RepositoryRow {
                id: row.get(0)?,
                kind: row.get(1)?,
                owner: row.get(2)?,
                repo: row.get(3)?,
                html_url: row.get(4)?,
                branches: row.get(5)?,
                branch: row.get(6)?,
                fork: row.get(7)?,
                created_at: row.get(8)?,
            })
        })
        .optional()?;
    Ok(row)
}

fn query_user(conn: &Connection, id: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn.prepare("SELECT id, username, created_at FROM users WHERE id = ?1")?;
    let row = stmt
        .query_row([id], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                created_at: row.get(2)?,
            })
        })
        .optional()?;
    Ok(row)
}
