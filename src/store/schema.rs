use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::util::now_utc_string;

pub const DB_SCHEMA_VERSION: &str = "1.0.0";

pub(super) fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    connection
        .pragma_update(None, "foreign_keys", "ON")
        .context("failed to set foreign_keys=ON")?;
    Ok(())
}

pub(super) fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
        CREATE TABLE IF NOT EXISTS metadata (
          key TEXT PRIMARY KEY,
          value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS users (
          user_id INTEGER PRIMARY KEY,
          handle TEXT NOT NULL UNIQUE
        );

        CREATE TABLE IF NOT EXISTS clans (
          clan_id INTEGER PRIMARY KEY AUTOINCREMENT,
          game_id TEXT NOT NULL,
          clan_no INTEGER NOT NULL CHECK (clan_no BETWEEN 1 AND 999),
          user_id INTEGER NOT NULL,
          UNIQUE (game_id, clan_no),
          FOREIGN KEY(user_id) REFERENCES users(user_id)
        );

        CREATE TABLE IF NOT EXISTS contents (
          contents_hash TEXT PRIMARY KEY,
          content_length INTEGER NOT NULL,
          contents BLOB NOT NULL
        );

        CREATE TABLE IF NOT EXISTS documents (
          document_id INTEGER PRIMARY KEY AUTOINCREMENT,
          contents_hash TEXT NOT NULL,
          kind TEXT NOT NULL,
          mime_type TEXT NOT NULL,
          name TEXT NOT NULL,
          content_length INTEGER NOT NULL,
          owner_clan_id INTEGER NOT NULL,
          created_at TEXT NOT NULL,
          updated_at TEXT NOT NULL,
          FOREIGN KEY(contents_hash) REFERENCES contents(contents_hash),
          FOREIGN KEY(owner_clan_id) REFERENCES clans(clan_id)
        );

        CREATE TABLE IF NOT EXISTS document_acl (
          document_id INTEGER NOT NULL,
          clan_id INTEGER NOT NULL,
          is_owner INTEGER NOT NULL DEFAULT 0,
          can_read INTEGER NOT NULL DEFAULT 0,
          can_delete INTEGER NOT NULL DEFAULT 0,
          PRIMARY KEY (document_id, clan_id),
          FOREIGN KEY(document_id) REFERENCES documents(document_id),
          FOREIGN KEY(clan_id) REFERENCES clans(clan_id)
        );

        CREATE INDEX IF NOT EXISTS documents_by_hash ON documents(contents_hash);
        CREATE INDEX IF NOT EXISTS acl_by_clan ON document_acl(clan_id);
        ",
        )
        .context("failed to create document store schema")?;

    let now = now_utc_string();
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [DB_SCHEMA_VERSION],
    )?;
    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('db_updated_at', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [now],
    )?;

    Ok(())
}

pub(super) fn query_count(connection: &Connection, sql: &str) -> rusqlite::Result<i64> {
    connection.query_row(sql, [], |row| row.get(0))
}
