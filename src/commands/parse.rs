use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::cli::ParseArgs;
use crate::config::Config;
use crate::pipeline::{Driver, Wanted};
use crate::util::{write_json_pretty, write_output};

pub fn run(args: ParseArgs, config: &Config) -> Result<()> {
    let mut config = config.clone();
    config.special_hexes.extend(args.special_hexes);
    let driver = Driver::from_config(&config)?;

    let artifacts = driver.run_path(
        &args.input,
        Wanted {
            report: true,
            stats: args.stats_path.is_some(),
            ..Wanted::default()
        },
    )?;
    let Some(report) = artifacts.report else {
        bail!("no report parsed from {}", args.input.display());
    };

    let mut json = serde_json::to_vec_pretty(&report)
        .with_context(|| format!("failed to serialize report from {}", args.input.display()))?;
    json.push(b'\n');
    write_output(args.output.as_deref(), &json)?;

    if let (Some(path), Some(stats)) = (args.stats_path.as_deref(), artifacts.stats.as_ref()) {
        write_json_pretty(path, stats)?;
        for (alternative, count) in stats.iter() {
            debug!(alternative, count, "alternative chosen");
        }
        info!(path = %path.display(), alternatives = stats.total(), "stats written");
    }

    for section in &report.sections {
        for scout in &section.scouts {
            let last_terrain = scout
                .steps
                .last()
                .and_then(|step| step.here())
                .and_then(|here| here.terrain);
            debug!(
                scout = %scout.id(&section.unit_id),
                steps = scout.steps.len(),
                last_terrain = ?last_terrain,
                "scout parsed"
            );
        }
    }

    info!(
        input = %args.input.display(),
        turn = %report.turn,
        sections = report.sections.len(),
        "report parsed"
    );
    Ok(())
}
