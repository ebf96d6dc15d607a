use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::lexer::Sniffers;
use crate::model::{
    Coords, FollowsLine, LocationLine, MovementReport, ScoutingReport, Status, TurnHeader,
    TurnReport,
};

mod engine;
mod errors;
mod items;
mod lines;
mod report;
mod steps;
#[cfg(test)]
mod tests;

pub use engine::ParseStats;
pub use errors::ParseFailure;

use engine::Parser;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Labels that name special hexes; any other label is a settlement.
    pub special_hexes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Production {
    Report,
    Turn,
    Location,
    Follows,
    GoesTo,
    Move,
    Scout,
    Status,
}

impl Production {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Report => "report",
            Self::Turn => "turn",
            Self::Location => "location",
            Self::Follows => "follows",
            Self::GoesTo => "goes_to",
            Self::Move => "move",
            Self::Scout => "scout",
            Self::Status => "status",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseValue {
    Report(TurnReport),
    Turn(TurnHeader),
    Location(LocationLine),
    Follows(FollowsLine),
    GoesTo(Coords),
    Move(MovementReport),
    Scout(ScoutingReport),
    Status(Status),
}

macro_rules! narrow {
    ($name:ident, $variant:ident, $ty:ty, $label:literal) => {
        pub fn $name(self) -> Result<$ty, ParseFailure> {
            match self {
                Self::$variant(value) => Ok(value),
                other => Err(ParseFailure::Unexpected {
                    expected: $label,
                    found: other.kind(),
                }),
            }
        }
    };
}

impl ParseValue {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Report(_) => "report",
            Self::Turn(_) => "turn",
            Self::Location(_) => "location",
            Self::Follows(_) => "follows",
            Self::GoesTo(_) => "goes_to",
            Self::Move(_) => "move",
            Self::Scout(_) => "scout",
            Self::Status(_) => "status",
        }
    }

    narrow!(into_report, Report, TurnReport, "report");
    narrow!(into_turn, Turn, TurnHeader, "turn");
    narrow!(into_location, Location, LocationLine, "location");
    narrow!(into_follows, Follows, FollowsLine, "follows");
    narrow!(into_goes_to, GoesTo, Coords, "goes_to");
    narrow!(into_move, Move, MovementReport, "move");
    narrow!(into_scout, Scout, ScoutingReport, "scout");
    narrow!(into_status, Status, Status, "status");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Parsed {
    pub value: ParseValue,
    pub stats: ParseStats,
}

pub struct ReportParser {
    sniffers: Sniffers,
    options: ParseOptions,
}

impl ReportParser {
    pub fn new(options: ParseOptions) -> Result<Self> {
        Ok(Self {
            sniffers: Sniffers::new()?,
            options,
        })
    }

    /// Parses all of `input` as `production`. Line productions accept an
    /// optional trailing newline; the report production accepts blank lines.
    pub fn parse(&self, production: Production, input: &str) -> Result<Parsed, ParseFailure> {
        let mut parser = Parser::new(input, &self.sniffers, &self.options);

        let value = match production {
            Production::Report => ParseValue::Report(parser.report()?),
            line => {
                parser.skip_blank_lines();
                let value = match line {
                    Production::Turn => parser.turn_line().map(ParseValue::Turn),
                    Production::Location => parser.location_line().map(ParseValue::Location),
                    Production::Follows => parser.follows_line().map(ParseValue::Follows),
                    Production::GoesTo => parser.goes_to_line().map(ParseValue::GoesTo),
                    Production::Move => parser.movement_line().map(ParseValue::Move),
                    Production::Scout => parser.scout_line().map(ParseValue::Scout),
                    Production::Status => parser.status_line().map(ParseValue::Status),
                    Production::Report => None,
                };
                let Some(value) = value else {
                    return Err(parser.error().into());
                };
                parser.skip_blank_lines();
                if !parser.at_eof() {
                    let at = parser.position();
                    parser.expected(at, "end of input");
                    return Err(parser.error().into());
                }
                value
            }
        };

        let stats = parser.stats();
        debug!(
            production = production.as_str(),
            alternatives = stats.total(),
            "parsed"
        );
        Ok(Parsed { value, stats })
    }

    pub fn parse_report(&self, input: &str) -> Result<(TurnReport, ParseStats), ParseFailure> {
        let parsed = self.parse(Production::Report, input)?;
        Ok((parsed.value.into_report()?, parsed.stats))
    }

    pub fn parse_turn(&self, input: &str) -> Result<TurnHeader, ParseFailure> {
        self.parse(Production::Turn, input)?.value.into_turn()
    }

    pub fn parse_location(&self, input: &str) -> Result<LocationLine, ParseFailure> {
        self.parse(Production::Location, input)?.value.into_location()
    }

    pub fn parse_follows(&self, input: &str) -> Result<FollowsLine, ParseFailure> {
        self.parse(Production::Follows, input)?.value.into_follows()
    }

    pub fn parse_goes_to(&self, input: &str) -> Result<Coords, ParseFailure> {
        self.parse(Production::GoesTo, input)?.value.into_goes_to()
    }

    pub fn parse_move(&self, input: &str) -> Result<MovementReport, ParseFailure> {
        self.parse(Production::Move, input)?.value.into_move()
    }

    pub fn parse_scout(&self, input: &str) -> Result<ScoutingReport, ParseFailure> {
        self.parse(Production::Scout, input)?.value.into_scout()
    }

    pub fn parse_status(&self, input: &str) -> Result<Status, ParseFailure> {
        self.parse(Production::Status, input)?.value.into_status()
    }
}
