use std::fs;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::ExtractArgs;
use crate::config::Config;
use crate::docx;
use crate::util::write_output;

pub fn run(args: ExtractArgs, config: &Config) -> Result<()> {
    let mut options = config.extract;
    if let Some(trim) = args.trim {
        options.trim = trim.into();
    }
    if args.keep_carriage_returns {
        options.normalize_newlines = false;
    }

    let data = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let text = docx::extract(&data, &options)
        .with_context(|| format!("failed to extract {}", args.input.display()))?;

    write_output(args.output.as_deref(), &text)?;
    info!(
        input = %args.input.display(),
        bytes = text.len(),
        trim = ?options.trim,
        "extract written"
    );
    Ok(())
}
