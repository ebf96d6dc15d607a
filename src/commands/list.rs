use anyhow::{Context, Result};
use tracing::info;

use super::open_store;
use crate::cli::ListArgs;
use crate::config::Config;
use crate::store::DocumentKind;
use crate::util::write_output;

pub fn run(args: ListArgs, config: &Config) -> Result<()> {
    let store = open_store(config, args.db_path.as_deref())?;
    let kind: Option<DocumentKind> = args.kind.map(Into::into);
    let documents = store
        .list_for_actor(&config.actor, kind)
        .context("failed to list documents")?;

    let mut out = if args.json {
        serde_json::to_vec_pretty(&documents).context("failed to serialize document list")?
    } else {
        let mut out = String::new();
        for document in &documents {
            out.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\t{}\n",
                document.id,
                document.hash,
                document.kind.as_str(),
                document.length,
                if document.is_owner { "owner" } else { "shared" },
                document.name
            ));
        }
        out.into_bytes()
    };
    if args.json {
        out.push(b'\n');
    }
    write_output(None, &out)?;

    info!(
        actor = %config.actor.handle,
        kind = kind.map(|kind| kind.as_str()).unwrap_or("any"),
        documents = documents.len(),
        "documents listed"
    );
    Ok(())
}
