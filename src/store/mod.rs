//! Content-addressed document storage. Bytes are keyed by their SHA-256
//! and shared between documents; each document row carries a name, a kind
//! and an owning clan, and `document_acl` decides which clans may see it.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::{ClanNo, GameId};
use crate::util::{ensure_directory, now_utc_string, sha256_hex, sha256_reader};

mod schema;

pub use schema::DB_SCHEMA_VERSION;

use schema::{configure_connection, ensure_schema, query_count};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not authorized")]
    NotAuthorized,
    #[error("invalid path: {0:?} must not need html escaping")]
    InvalidPath(String),
    #[error("hash failed: {0}")]
    HashFailed(String),
    #[error("bad input: {0}")]
    BadInput(String),
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    TurnReportFile,
    ReportExtract,
    WorldographerMap,
}

impl DocumentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TurnReportFile => "turn_report_file",
            Self::ReportExtract => "report_extract",
            Self::WorldographerMap => "worldographer_map",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::TurnReportFile => {
                "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
            }
            Self::ReportExtract => "text/vnd.tribenet-turnreport.data",
            Self::WorldographerMap => "application/vnd.worldographer.map",
        }
    }

    pub fn parse(text: &str) -> Option<Self> {
        [
            Self::TurnReportFile,
            Self::ReportExtract,
            Self::WorldographerMap,
        ]
        .into_iter()
        .find(|kind| kind.as_str() == text)
    }
}

impl ToSql for DocumentKind {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for DocumentKind {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let text = value.as_str()?;
        Self::parse(text)
            .ok_or_else(|| FromSqlError::Other(format!("unknown document kind {text:?}").into()))
    }
}

/// What an actor is allowed to do regardless of any particular document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    pub create_documents: bool,
    pub share_documents: bool,
    pub delete_documents: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            create_documents: true,
            share_documents: true,
            delete_documents: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Actor {
    pub id: i64,
    pub handle: String,
    #[serde(flatten)]
    pub capabilities: Capabilities,
}

impl Default for Actor {
    fn default() -> Self {
        Self {
            id: 1,
            handle: "operator".to_string(),
            capabilities: Capabilities::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clan {
    pub id: i64,
    pub game: String,
    pub clan_no: u16,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDocument {
    pub kind: DocumentKind,
    pub name: String,
    pub contents: Vec<u8>,
    /// Length claimed by the uploader. Never stored; the store measures.
    pub declared_length: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentMeta {
    pub id: i64,
    pub hash: String,
    pub kind: DocumentKind,
    pub mime_type: String,
    pub name: String,
    pub length: i64,
    pub owner_clan_id: i64,
    pub created_at: String,
    pub updated_at: String,
    pub is_owner: bool,
    pub can_read: bool,
    pub can_delete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharePermissions {
    pub can_read: bool,
    pub can_delete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Deletion {
    /// The owner deleted the document and every share of it.
    Removed,
    /// A share was dropped; the document itself remains.
    Unshared,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub users: i64,
    pub clans: i64,
    pub documents: i64,
    pub contents: i64,
    pub shares: i64,
}

const META_COLUMNS: &str = "
    d.document_id, d.contents_hash, d.kind, d.mime_type, d.name, d.content_length,
    d.owner_clan_id, d.created_at, d.updated_at,
    MAX(a.is_owner), MAX(a.can_read), MAX(a.can_delete)";

fn meta_from_row(row: &Row<'_>) -> rusqlite::Result<DocumentMeta> {
    Ok(DocumentMeta {
        id: row.get(0)?,
        hash: row.get(1)?,
        kind: row.get(2)?,
        mime_type: row.get(3)?,
        name: row.get(4)?,
        length: row.get(5)?,
        owner_clan_id: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
        is_owner: row.get(9)?,
        can_read: row.get(10)?,
        can_delete: row.get(11)?,
    })
}

/// True when HTML escaping would leave `name` unchanged.
pub fn is_html_safe(name: &str) -> bool {
    !name.contains(['<', '>', '&', '"', '\''])
}

pub struct DocumentStore {
    connection: Connection,
}

impl DocumentStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            ensure_directory(parent)?;
        }
        let connection = Connection::open(path)
            .with_context(|| format!("failed to open {}", path.display()))?;
        configure_connection(&connection)?;
        ensure_schema(&connection)?;
        info!(path = %path.display(), "document store opened");
        Ok(Self { connection })
    }

    pub fn open_in_memory() -> Result<Self> {
        let connection =
            Connection::open_in_memory().context("failed to open in-memory database")?;
        connection
            .pragma_update(None, "foreign_keys", "ON")
            .context("failed to set foreign_keys=ON")?;
        ensure_schema(&connection)?;
        Ok(Self { connection })
    }

    /// Records the actor as a user, keeping its handle current.
    /// Handles are unique; an actor cannot take one another user holds.
    pub fn ensure_user(&self, actor: &Actor) -> StoreResult<()> {
        let holder: Option<i64> = self
            .connection
            .query_row(
                "SELECT user_id FROM users WHERE handle = ?1 AND user_id <> ?2",
                params![actor.handle, actor.id],
                |row| row.get(0),
            )
            .optional()?;
        if let Some(holder) = holder {
            return Err(StoreError::BadInput(format!(
                "handle {:?} already belongs to user {holder}",
                actor.handle
            )));
        }
        self.connection.execute(
            "INSERT INTO users(user_id, handle) VALUES(?1, ?2)
             ON CONFLICT(user_id) DO UPDATE SET handle=excluded.handle",
            params![actor.id, actor.handle],
        )?;
        Ok(())
    }

    /// Registers `clan_no` in `game` to the actor. Registering a clan the
    /// actor already holds returns the existing clan.
    pub fn register_clan(&self, actor: &Actor, game: &GameId, clan_no: ClanNo) -> StoreResult<Clan> {
        self.ensure_user(actor)?;
        self.connection.execute(
            "INSERT INTO clans(game_id, clan_no, user_id) VALUES(?1, ?2, ?3)
             ON CONFLICT(game_id, clan_no) DO NOTHING",
            params![game.as_str(), clan_no.value(), actor.id],
        )?;

        let clan = self.connection.query_row(
            "SELECT clan_id, game_id, clan_no, user_id FROM clans WHERE game_id = ?1 AND clan_no = ?2",
            params![game.as_str(), clan_no.value()],
            |row| {
                Ok(Clan {
                    id: row.get(0)?,
                    game: row.get(1)?,
                    clan_no: row.get(2)?,
                    user_id: row.get(3)?,
                })
            },
        )?;
        if clan.user_id != actor.id {
            warn!(game = %game, clan = %clan_no, owner = clan.user_id, "clan belongs to another user");
            return Err(StoreError::NotAuthorized);
        }
        debug!(game = %game, clan = %clan_no, clan_id = clan.id, "clan registered");
        Ok(clan)
    }

    fn clan_owner(&self, clan_id: i64) -> StoreResult<Option<(i64, String)>> {
        let owner = self
            .connection
            .query_row(
                "SELECT user_id, game_id FROM clans WHERE clan_id = ?1",
                [clan_id],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(owner)
    }

    pub fn create(&mut self, actor: &Actor, clan_id: i64, document: NewDocument) -> StoreResult<DocumentMeta> {
        let hash = sha256_hex(&document.contents);
        self.create_hashed(actor, clan_id, document, hash)
    }

    /// Reads `path` through the hasher and stores it under its file name.
    pub fn create_from_path(
        &mut self,
        actor: &Actor,
        clan_id: i64,
        kind: DocumentKind,
        path: &Path,
    ) -> StoreResult<DocumentMeta> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| StoreError::InvalidPath(path.display().to_string()))?
            .to_string();
        let file = File::open(path)
            .map_err(|err| StoreError::HashFailed(format!("{}: {err}", path.display())))?;
        let (hash, contents) = sha256_reader(file)
            .map_err(|err| StoreError::HashFailed(format!("{}: {err}", path.display())))?;
        let document = NewDocument {
            kind,
            name,
            contents,
            declared_length: None,
        };
        self.create_hashed(actor, clan_id, document, hash)
    }

    fn create_hashed(
        &mut self,
        actor: &Actor,
        clan_id: i64,
        document: NewDocument,
        hash: String,
    ) -> StoreResult<DocumentMeta> {
        let NewDocument {
            kind,
            name,
            contents,
            declared_length,
        } = document;
        if !actor.capabilities.create_documents {
            return Err(StoreError::NotAuthorized);
        }
        match self.clan_owner(clan_id)? {
            Some((user_id, _)) if user_id == actor.id => {}
            _ => return Err(StoreError::NotAuthorized),
        }
        if name.trim().is_empty() || !is_html_safe(&name) {
            return Err(StoreError::InvalidPath(name));
        }

        let length = i64::try_from(contents.len())
            .map_err(|_| StoreError::BadInput(format!("{name}: document too large")))?;
        if let Some(declared) = declared_length {
            if declared != contents.len() as u64 {
                warn!(name = %name, declared, actual = length, "ignoring declared length");
            }
        }

        let now = now_utc_string();
        let tx = self.connection.transaction()?;
        let inserted = tx.execute(
            "INSERT INTO contents(contents_hash, content_length, contents) VALUES(?1, ?2, ?3)
             ON CONFLICT(contents_hash) DO NOTHING",
            params![hash, length, contents],
        )?;
        tx.execute(
            "INSERT INTO documents(contents_hash, kind, mime_type, name, content_length, owner_clan_id, created_at, updated_at)
             VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)",
            params![hash, kind, kind.mime_type(), name, length, clan_id, now],
        )?;
        let id = tx.last_insert_rowid();
        tx.execute(
            "INSERT INTO document_acl(document_id, clan_id, is_owner, can_read, can_delete)
             VALUES(?1, ?2, 1, 1, 1)",
            params![id, clan_id],
        )?;
        tx.commit()?;

        info!(
            id,
            hash = %hash,
            name = %name,
            kind = kind.as_str(),
            length,
            deduplicated = inserted == 0,
            "document created"
        );
        Ok(DocumentMeta {
            id,
            hash,
            kind,
            mime_type: kind.mime_type().to_string(),
            name,
            length,
            owner_clan_id: clan_id,
            created_at: now.clone(),
            updated_at: now,
            is_owner: true,
            can_read: true,
            can_delete: true,
        })
    }

    /// Metadata is visible to any clan of the actor holding an ACL row.
    /// Missing and hidden documents are indistinguishable.
    pub fn get_metadata(&self, actor: &Actor, id: i64) -> StoreResult<DocumentMeta> {
        let sql = format!(
            "SELECT {META_COLUMNS}
             FROM documents d
             JOIN document_acl a ON a.document_id = d.document_id
             JOIN clans c ON c.clan_id = a.clan_id
             WHERE d.document_id = ?1 AND c.user_id = ?2
             GROUP BY d.document_id"
        );
        self.connection
            .query_row(&sql, params![id, actor.id], meta_from_row)
            .optional()?
            .ok_or(StoreError::NotAuthorized)
    }

    pub fn get_contents(&self, actor: &Actor, id: i64) -> StoreResult<Vec<u8>> {
        let meta = self.get_metadata(actor, id)?;
        if !meta.can_read {
            return Err(StoreError::NotAuthorized);
        }
        let contents = self.connection.query_row(
            "SELECT contents FROM contents WHERE contents_hash = ?1",
            [&meta.hash],
            |row| row.get(0),
        )?;
        Ok(contents)
    }

    pub fn list_for_actor(&self, actor: &Actor, kind: Option<DocumentKind>) -> StoreResult<Vec<DocumentMeta>> {
        let sql = format!(
            "SELECT {META_COLUMNS}
             FROM documents d
             JOIN document_acl a ON a.document_id = d.document_id
             JOIN clans c ON c.clan_id = a.clan_id
             WHERE c.user_id = ?1 AND (?2 IS NULL OR d.kind = ?2)
             GROUP BY d.document_id
             ORDER BY d.document_id"
        );
        let mut statement = self.connection.prepare(&sql)?;
        let documents = statement
            .query_map(params![actor.id, kind], meta_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(documents)
    }

    /// Gives `ally`'s clan in the document's game access to the document.
    /// Sharing again replaces the previous permissions.
    pub fn share(
        &self,
        actor: &Actor,
        id: i64,
        ally_user_id: i64,
        permissions: SharePermissions,
    ) -> StoreResult<i64> {
        if !actor.capabilities.share_documents {
            return Err(StoreError::NotAuthorized);
        }
        let meta = self.get_metadata(actor, id)?;
        if !meta.is_owner {
            return Err(StoreError::NotAuthorized);
        }
        let Some((_, game)) = self.clan_owner(meta.owner_clan_id)? else {
            return Err(StoreError::NotAuthorized);
        };

        let ally_clan: Option<i64> = self
            .connection
            .query_row(
                "SELECT clan_id FROM clans WHERE user_id = ?1 AND game_id = ?2",
                params![ally_user_id, game],
                |row| row.get(0),
            )
            .optional()?;
        let Some(ally_clan) = ally_clan else {
            return Err(StoreError::NotAuthorized);
        };
        if ally_clan == meta.owner_clan_id {
            return Err(StoreError::BadInput(format!(
                "document {id} is already owned by clan {ally_clan}"
            )));
        }

        self.connection.execute(
            "INSERT INTO document_acl(document_id, clan_id, is_owner, can_read, can_delete)
             VALUES(?1, ?2, 0, ?3, ?4)
             ON CONFLICT(document_id, clan_id) DO UPDATE SET
               can_read=excluded.can_read,
               can_delete=excluded.can_delete",
            params![id, ally_clan, permissions.can_read, permissions.can_delete],
        )?;
        info!(id, ally_clan, can_read = permissions.can_read, can_delete = permissions.can_delete, "document shared");
        Ok(ally_clan)
    }

    /// Missing and hidden documents both fail with `NotAuthorized`.
    pub fn delete(&mut self, actor: &Actor, id: i64) -> StoreResult<Deletion> {
        let meta = self.get_metadata(actor, id)?;
        if meta.is_owner {
            if !actor.capabilities.delete_documents {
                return Err(StoreError::NotAuthorized);
            }
            let tx = self.connection.transaction()?;
            tx.execute("DELETE FROM document_acl WHERE document_id = ?1", [id])?;
            tx.execute("DELETE FROM documents WHERE document_id = ?1", [id])?;
            let collected = tx.execute(
                "DELETE FROM contents WHERE contents_hash = ?1
                 AND NOT EXISTS (SELECT 1 FROM documents WHERE contents_hash = ?1)",
                [&meta.hash],
            )?;
            tx.commit()?;
            info!(id, hash = %meta.hash, contents_removed = collected > 0, "document deleted");
            return Ok(Deletion::Removed);
        }

        if !meta.can_delete {
            return Err(StoreError::NotAuthorized);
        }
        self.connection.execute(
            "DELETE FROM document_acl
             WHERE document_id = ?1 AND is_owner = 0
               AND clan_id IN (SELECT clan_id FROM clans WHERE user_id = ?2)",
            params![id, actor.id],
        )?;
        info!(id, "share removed");
        Ok(Deletion::Unshared)
    }

    pub fn counts(&self) -> StoreResult<StoreCounts> {
        Ok(StoreCounts {
            users: query_count(&self.connection, "SELECT COUNT(*) FROM users")?,
            clans: query_count(&self.connection, "SELECT COUNT(*) FROM clans")?,
            documents: query_count(&self.connection, "SELECT COUNT(*) FROM documents")?,
            contents: query_count(&self.connection, "SELECT COUNT(*) FROM contents")?,
            shares: query_count(
                &self.connection,
                "SELECT COUNT(*) FROM document_acl WHERE is_owner = 0",
            )?,
        })
    }

    pub fn schema_version(&self) -> StoreResult<Option<String>> {
        let version = self
            .connection
            .query_row(
                "SELECT value FROM metadata WHERE key = 'db_schema_version'",
                [],
                |row| row.get(0),
            )
            .optional()?;
        Ok(version)
    }
}
