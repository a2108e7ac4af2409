use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS repositories (
            id          TEXT PRIMARY KEY,
            kind        TEXT NOT NULL,
            owner       TEXT NOT NULL,
            repo        TEXT NOT NULL,
            html_url    TEXT NOT NULL,
            branches    TEXT NOT NULL,
            branch      TEXT NOT NULL,
            fork        INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS links (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            enabled     INTEGER NOT NULL DEFAULT 0,
            hook_ids    TEXT NOT NULL DEFAULT '[]',
            owner_id    TEXT NOT NULL REFERENCES users(id),
            upstream_id TEXT REFERENCES repositories(id),
            fork_id     TEXT REFERENCES repositories(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_links_owner
            ON links(owner_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
