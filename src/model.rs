use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::hexes::{Direction, Edge};
use crate::terrain::Terrain;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueError {
    #[error("invalid turn: {0}")]
    Turn(String),
    #[error("invalid game id: {0}")]
    GameId(String),
    #[error("invalid clan number: {0}")]
    ClanNo(String),
    #[error("invalid unit id: {0}")]
    UnitId(String),
    #[error("invalid coordinates: {0}")]
    Coords(String),
}

/// A game turn. Years run from 899 (the setup turn, always month 12) to 9999.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TurnStamp {
    pub year: u16,
    pub month: u8,
}

impl TurnStamp {
    pub fn new(year: u16, month: u8) -> Result<Self, ValueError> {
        if !(899..=9999).contains(&year) {
            return Err(ValueError::Turn(format!("year {year} out of range")));
        }
        if !(1..=12).contains(&month) {
            return Err(ValueError::Turn(format!("month {month} out of range")));
        }
        if year == 899 && month != 12 {
            return Err(ValueError::Turn(format!(
                "setup year 899 requires month 12, got {month}"
            )));
        }
        Ok(Self { year, month })
    }

    /// Accepts `YYY-M`, `YYYY-MM` and the mixed forms the lexer sniffs.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::Turn(text.to_string());
        let (year, month) = text.split_once('-').ok_or_else(invalid)?;
        if !(3..=4).contains(&year.len())
            || !(1..=2).contains(&month.len())
            || !year.bytes().all(|b| b.is_ascii_digit())
            || !month.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }
        let year = year.parse().map_err(|_| invalid())?;
        let month = month.parse().map_err(|_| invalid())?;
        Self::new(year, month)
    }
}

impl fmt::Display for TurnStamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for TurnStamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        if text.len() == 4 && text.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(text.to_string()))
        } else {
            Err(ValueError::GameId(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ClanNo(u16);

impl ClanNo {
    pub fn new(value: u16) -> Result<Self, ValueError> {
        if (1..=999).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ValueError::ClanNo(value.to_string()))
        }
    }

    /// Parses the `0NNN` form used in file names and clan headers.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        if text.len() != 4 || !text.starts_with('0') || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValueError::ClanNo(text.to_string()));
        }
        let value = text
            .parse()
            .map_err(|_| ValueError::ClanNo(text.to_string()))?;
        Self::new(value)
    }

    pub fn value(self) -> u16 {
        self.0
    }
}

impl fmt::Display for ClanNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    Clan,
    Tribe,
    Courier,
    Element,
    Fleet,
    Garrison,
}

impl UnitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Clan => "clan",
            Self::Tribe => "tribe",
            Self::Courier => "courier",
            Self::Element => "element",
            Self::Fleet => "fleet",
            Self::Garrison => "garrison",
        }
    }

    /// The word that opens this unit's location header.
    pub fn header_word(self) -> &'static str {
        match self {
            Self::Clan | Self::Tribe => "Tribe",
            Self::Courier => "Courier",
            Self::Element => "Element",
            Self::Fleet => "Fleet",
            Self::Garrison => "Garrison",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct UnitId(String);

impl UnitId {
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let bytes = text.as_bytes();
        let digits = bytes.len() >= 4 && bytes[..4].iter().all(u8::is_ascii_digit);
        let valid = match bytes.len() {
            4 => digits,
            6 => digits && matches!(bytes[4], b'c' | b'e' | b'f' | b'g') && (b'1'..=b'9').contains(&bytes[5]),
            _ => false,
        };
        if valid {
            Ok(Self(text.to_string()))
        } else {
            Err(ValueError::UnitId(text.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> UnitKind {
        match self.0.as_bytes().get(4) {
            Some(b'c') => UnitKind::Courier,
            Some(b'e') => UnitKind::Element,
            Some(b'f') => UnitKind::Fleet,
            Some(b'g') => UnitKind::Garrison,
            _ if self.0.starts_with('0') => UnitKind::Clan,
            _ => UnitKind::Tribe,
        }
    }

    /// Tribes 1987 and 2987 belong to clan 0987.
    pub fn clan_no(&self) -> u16 {
        self.0[..4].parse::<u16>().map(|n| n % 1000).unwrap_or(0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Coords {
    NotApplicable,
    Obscured { column: u8, row: u8 },
    Grid { grid: String, column: u8, row: u8 },
}

impl Coords {
    /// Parses `N/A`, `## CCRR` or `GG CCRR`.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        let invalid = || ValueError::Coords(text.to_string());
        if text == "N/A" {
            return Ok(Self::NotApplicable);
        }
        let (grid, digits) = text.split_once(' ').ok_or_else(invalid)?;
        let (column, row) = split_column_row(digits).ok_or_else(invalid)?;
        if grid == "##" {
            return Ok(Self::Obscured { column, row });
        }
        if grid.len() != 2 || !grid.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(invalid());
        }
        Ok(Self::Grid {
            grid: grid.to_string(),
            column,
            row,
        })
    }

    pub fn grid(&self) -> Option<&str> {
        match self {
            Self::Grid { grid, .. } => Some(grid),
            Self::Obscured { .. } => Some("##"),
            Self::NotApplicable => None,
        }
    }

    pub fn column(&self) -> Option<u8> {
        match self {
            Self::Grid { column, .. } | Self::Obscured { column, .. } => Some(*column),
            Self::NotApplicable => None,
        }
    }

    pub fn row(&self) -> Option<u8> {
        match self {
            Self::Grid { row, .. } | Self::Obscured { row, .. } => Some(*row),
            Self::NotApplicable => None,
        }
    }
}

fn split_column_row(digits: &str) -> Option<(u8, u8)> {
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some((digits[..2].parse().ok()?, digits[2..].parse().ok()?))
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotApplicable => f.write_str("N/A"),
            Self::Obscured { column, row } => write!(f, "## {column:02}{row:02}"),
            Self::Grid { grid, column, row } => write!(f, "{grid} {column:02}{row:02}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnReport {
    pub turn: TurnStamp,
    pub sections: Vec<UnitSection>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TurnHeader {
    pub current: TurnStamp,
    pub number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<NextTurn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NextTurn {
    pub turn: TurnStamp,
    pub number: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationLine {
    pub kind: UnitKind,
    pub unit_id: UnitId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub current: Coords,
    pub previous: Coords,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FollowsLine {
    pub target: UnitId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitSection {
    pub unit_id: UnitId,
    pub kind: UnitKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub starting_location: Coords,
    pub current_location: Coords,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follows: Option<UnitId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goes_to: Option<Coords>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub movement: Option<MovementReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scouts: Vec<ScoutingReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Wind {
    Calm,
    Mild,
    Strong,
    Gale,
}

impl Wind {
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "CALM" => Some(Self::Calm),
            "MILD" => Some(Self::Mild),
            "STRONG" => Some(Self::Strong),
            "GALE" => Some(Self::Gale),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MoveMode {
    Land,
    Fleet { wind: Wind, heading: Direction },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MovementReport {
    #[serde(flatten)]
    pub mode: MoveMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Coords>,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Step {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    pub outcome: StepOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Coords>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub observations: Vec<Observation>,
}

impl Step {
    /// The result describing the hex the unit ends the step in.
    pub fn here(&self) -> Option<&Observation> {
        self.observations.iter().find(|o| o.offset.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "snake_case")]
pub enum StepOutcome {
    Moved,
    Stayed,
    Blocked(Blocker),
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "blocker", rename_all = "snake_case")]
pub enum Blocker {
    Water { water: Water, direction: Direction },
    NoFord { direction: Direction },
    NotEnoughMovePoints { direction: Direction, terrain: Terrain },
}

impl Blocker {
    pub fn direction(&self) -> Direction {
        match self {
            Self::Water { direction, .. }
            | Self::NoFord { direction }
            | Self::NotEnoughMovePoints { direction, .. } => *direction,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Water {
    Lake,
    Ocean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ObservationKind {
    ScoutInLocation,
    UnitInLocation,
    UnitNextToLocation,
    FleetNextToRing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Sighting {
    Land,
    Water,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "thing", content = "name", rename_all = "snake_case")]
pub enum Thing {
    SpecialHex(String),
    Settlement(String),
    Unit(UnitId),
}

/// What a unit learned about one hex. `offset` is the path from the hex
/// the observer stands in; it is empty for the observer's own hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub kind: ObservationKind,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub offset: Vec<Direction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Coords>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub terrain: Option<Terrain>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sighting: Option<Sighting>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub edges: BTreeMap<Direction, Vec<Edge>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub things: Vec<Thing>,
}

impl Observation {
    pub fn new(kind: ObservationKind, offset: Vec<Direction>) -> Self {
        Self {
            kind,
            offset,
            location: None,
            terrain: None,
            sighting: None,
            resources: Vec::new(),
            edges: BTreeMap::new(),
            things: Vec::new(),
        }
    }

    pub fn add_edge(&mut self, direction: Direction, edge: Edge) {
        let edges = self.edges.entry(direction).or_default();
        if !edges.contains(&edge) {
            edges.push(edge);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoutingReport {
    pub number: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<Coords>,
    pub steps: Vec<Step>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patrol: Option<Patrol>,
}

impl ScoutingReport {
    /// Scouts are named after their unit, e.g. `0987s1`.
    pub fn id(&self, unit_id: &UnitId) -> String {
        format!("{unit_id}s{}", self.number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "patrol", content = "units", rename_all = "snake_case")]
pub enum Patrol {
    NothingOfInterest,
    Found(Vec<UnitId>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub unit_id: UnitId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Coords>,
    pub observations: Vec<Observation>,
}

#[cfg(test)]
mod tests;
