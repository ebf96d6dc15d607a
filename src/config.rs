use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::docx::{ExtractOptions, Trim};
use crate::scrub::ScrubOptions;
use crate::store::Actor;

pub const DEFAULT_DB_PATH: &str = ".cache/turnrpt/documents.sqlite";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub db_path: PathBuf,
    pub actor: Actor,
    pub extract: ExtractOptions,
    pub scrub: ScrubOptions,
    /// Names that label special hexes rather than settlements.
    pub special_hexes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            actor: Actor::default(),
            extract: ExtractOptions {
                normalize_newlines: true,
                trim: Trim::Both,
            },
            scrub: ScrubOptions {
                patch_na: true,
                accept_unit_moves: true,
            },
            special_hexes: Vec::new(),
        }
    }
}

impl Config {
    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let config: Config = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        debug!(path = %path.display(), db_path = %config.db_path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_gives_defaults() {
        let config = Config::load(None).unwrap();
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert!(config.extract.normalize_newlines);
        assert_eq!(config.extract.trim, Trim::Both);
        assert!(config.scrub.patch_na);
        assert!(config.scrub.accept_unit_moves);
        assert!(config.actor.capabilities.create_documents);
        assert!(config.special_hexes.is_empty());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("turnrpt.json");
        fs::write(
            &path,
            r#"{
                "db_path": "data/store.sqlite",
                "actor": {"id": 7, "handle": "clan0138", "delete_documents": false},
                "scrub": {"patch_na": false},
                "special_hexes": ["Aeddon Bay"]
            }"#,
        )
        .unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.db_path, PathBuf::from("data/store.sqlite"));
        assert_eq!(config.actor.id, 7);
        assert_eq!(config.actor.handle, "clan0138");
        assert!(config.actor.capabilities.create_documents);
        assert!(!config.actor.capabilities.delete_documents);
        assert!(!config.scrub.patch_na);
        // a present section falls back to the type's own defaults
        assert!(!config.scrub.accept_unit_moves);
        assert_eq!(config.extract.trim, Trim::Both);
        assert_eq!(config.special_hexes, vec!["Aeddon Bay".to_string()]);
    }

    #[test]
    fn malformed_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, "{not json").unwrap();

        let err = Config::load(Some(&path)).unwrap_err();
        assert!(err.to_string().contains("failed to parse"));
    }
}
