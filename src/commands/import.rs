use anyhow::{Result, bail};
use tracing::{error, info};

use super::open_store;
use crate::cli::ImportArgs;
use crate::config::Config;
use crate::pipeline::Driver;

pub fn run(args: ImportArgs, config: &Config) -> Result<()> {
    let mut store = open_store(config, args.db_path.as_deref())?;
    let driver = Driver::from_config(config)?;

    let mut imported = 0_usize;
    let mut failed = 0_usize;
    for input in &args.inputs {
        match driver.import(&mut store, &config.actor, input) {
            Ok(result) => {
                imported += 1;
                info!(
                    input = %input.display(),
                    clan = result.clan.clan_no,
                    turn = %result.turn_report.turn,
                    report_id = result.report.id,
                    extract_id = result.extract.id,
                    "turn report imported"
                );
            }
            Err(err) if args.keep_going => {
                failed += 1;
                error!(input = %input.display(), error = %err, "import failed");
                for cause in err.chain().skip(1) {
                    error!(cause = %cause, "caused by");
                }
            }
            Err(err) => return Err(err),
        }
    }

    info!(imported, failed, "import finished");
    if failed > 0 {
        bail!("{failed} of {} turn reports failed to import", args.inputs.len());
    }
    Ok(())
}
