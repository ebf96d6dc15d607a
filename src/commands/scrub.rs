use std::fs;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::ScrubArgs;
use crate::config::Config;
use crate::pipeline::{Driver, Wanted};
use crate::util::write_output;

pub fn run(args: ScrubArgs, config: &Config) -> Result<()> {
    let mut config = config.clone();
    if args.no_patch_na {
        config.scrub.patch_na = false;
    }
    if args.strict {
        config.scrub.accept_unit_moves = false;
    }
    let driver = Driver::from_config(&config)?;
    let wanted = Wanted {
        scrubbed: true,
        ..Wanted::default()
    };

    let is_docx = args
        .input
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("docx"));
    let artifacts = if is_docx {
        driver.run_path(&args.input, wanted)?
    } else {
        let text = fs::read_to_string(&args.input)
            .with_context(|| format!("failed to read {}", args.input.display()))?;
        driver.run_extract(&args.input, &text, wanted)?
    };

    let Some(scrubbed) = artifacts.scrubbed else {
        warn!(input = %args.input.display(), "no scrubbed extract produced");
        return Ok(());
    };
    write_output(args.output.as_deref(), &scrubbed)?;
    info!(
        input = %args.input.display(),
        lines = scrubbed.iter().filter(|byte| **byte == b'\n').count(),
        patch_na = config.scrub.patch_na,
        "scrubbed extract written"
    );
    Ok(())
}
