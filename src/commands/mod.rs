use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::Config;
use crate::store::DocumentStore;

pub mod cat;
pub mod delete;
pub mod extract;
pub mod import;
pub mod list;
pub mod parse;
pub mod parse_line;
pub mod scrub;
pub mod share;
pub mod status;

/// Opens the store at `db_path`, falling back to the configured path.
fn open_store(config: &Config, db_path: Option<&Path>) -> Result<DocumentStore> {
    let path = db_path.unwrap_or(config.db_path.as_path());
    debug!(path = %path.display(), "opening document store");
    DocumentStore::open(path).with_context(|| format!("failed to open {}", path.display()))
}
