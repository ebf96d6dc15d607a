use anyhow::{Context, Result};
use tracing::info;

use super::open_store;
use crate::cli::CatArgs;
use crate::config::Config;
use crate::util::write_output;

pub fn run(args: CatArgs, config: &Config) -> Result<()> {
    let store = open_store(config, args.db_path.as_deref())?;
    let contents = store
        .get_contents(&config.actor, args.id)
        .with_context(|| format!("failed to read document {}", args.id))?;

    write_output(args.output.as_deref(), &contents)?;
    info!(id = args.id, bytes = contents.len(), "document written");
    Ok(())
}
