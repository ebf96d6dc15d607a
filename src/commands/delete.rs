use anyhow::{Context, Result};
use tracing::info;

use super::open_store;
use crate::cli::DeleteArgs;
use crate::config::Config;

pub fn run(args: DeleteArgs, config: &Config) -> Result<()> {
    let mut store = open_store(config, args.db_path.as_deref())?;
    let outcome = store
        .delete(&config.actor, args.id)
        .with_context(|| format!("failed to delete document {}", args.id))?;

    info!(id = args.id, outcome = ?outcome, "delete finished");
    Ok(())
}
