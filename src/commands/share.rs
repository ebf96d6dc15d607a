use anyhow::{Context, Result};
use tracing::info;

use super::open_store;
use crate::cli::ShareArgs;
use crate::config::Config;
use crate::store::SharePermissions;

pub fn run(args: ShareArgs, config: &Config) -> Result<()> {
    let store = open_store(config, args.db_path.as_deref())?;
    let permissions = SharePermissions {
        can_read: !args.no_read,
        can_delete: args.can_delete,
    };
    let ally_clan = store
        .share(&config.actor, args.id, args.ally, permissions)
        .with_context(|| format!("failed to share document {} with user {}", args.id, args.ally))?;

    info!(id = args.id, ally = args.ally, ally_clan, "document shared");
    Ok(())
}
