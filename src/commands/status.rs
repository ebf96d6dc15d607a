use anyhow::Result;
use tracing::{info, warn};

use super::open_store;
use crate::cli::StatusArgs;
use crate::config::Config;
use crate::store::DB_SCHEMA_VERSION;

pub fn run(args: StatusArgs, config: &Config) -> Result<()> {
    let db_path = args.db_path.as_deref().unwrap_or(config.db_path.as_path());

    info!(db_path = %db_path.display(), actor = %config.actor.handle, "status requested");

    if !db_path.exists() {
        warn!(path = %db_path.display(), "database file missing");
        return Ok(());
    }

    let store = open_store(config, Some(db_path))?;
    let counts = store.counts()?;
    let schema_version = store.schema_version()?.unwrap_or_default();
    let visible = store.list_for_actor(&config.actor, None)?.len();
    if schema_version != DB_SCHEMA_VERSION {
        warn!(
            found = %schema_version,
            expected = DB_SCHEMA_VERSION,
            "schema version mismatch"
        );
    }

    info!(
        path = %db_path.display(),
        schema_version = %schema_version,
        users = counts.users,
        clans = counts.clans,
        documents = counts.documents,
        contents = counts.contents,
        shares = counts.shares,
        visible_to_actor = visible,
        "database status"
    );
    Ok(())
}
