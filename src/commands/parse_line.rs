use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::{LineProduction, ParseLineArgs};
use crate::config::Config;
use crate::parser::{ParseOptions, ReportParser};
use crate::util::write_output;

pub fn run(args: ParseLineArgs, config: &Config) -> Result<()> {
    let mut special_hexes = config.special_hexes.clone();
    special_hexes.extend(args.special_hexes);
    let parser = ReportParser::new(ParseOptions { special_hexes })?;
    let text = args.text.as_str();

    let json = match args.production {
        LineProduction::Turn => to_json(&parser.parse_turn(text)?)?,
        LineProduction::Location => to_json(&parser.parse_location(text)?)?,
        LineProduction::Follows => to_json(&parser.parse_follows(text)?)?,
        LineProduction::GoesTo => to_json(&parser.parse_goes_to(text)?)?,
        LineProduction::Move => to_json(&parser.parse_move(text)?)?,
        LineProduction::Scout => to_json(&parser.parse_scout(text)?)?,
        LineProduction::Status => to_json(&parser.parse_status(text)?)?,
    };
    write_output(None, &json)?;

    info!(production = ?args.production, bytes = text.len(), "line parsed");
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut json = serde_json::to_vec_pretty(value).context("failed to serialize parsed line")?;
    json.push(b'\n');
    Ok(json)
}
