use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::model::{TurnStamp, UnitId, UnitKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SplitError {
    #[error("invalid report: no sections")]
    NoSections,
    #[error("invalid report: no turn info")]
    NoTurnInfo,
    #[error("invalid report: multiple turns")]
    MultipleTurns {
        expected: TurnStamp,
        found: TurnStamp,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitOptions {
    pub keep_scry_lines: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            keep_scry_lines: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub kind: UnitKind,
    pub unit_id: UnitId,
    pub turn: Option<TurnStamp>,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub turn: TurnStamp,
    pub sections: Vec<Section>,
}

impl Report {
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.sections
            .iter()
            .flat_map(|section| section.lines.iter().map(String::as_str))
    }
}

struct KindPatterns {
    kind: UnitKind,
    header: Regex,
    scry: Regex,
    status: Regex,
}

pub struct Splitter {
    kinds: Vec<KindPatterns>,
    current_turn: Regex,
    fleet_movement: Regex,
    tribe_follows: Regex,
    tribe_goes_to: Regex,
    tribe_movement: Regex,
    scout: Regex,
}

impl Splitter {
    pub fn new() -> Result<Self> {
        // clan must be tested before tribe so that 0NNN tribes are labeled clan
        let table = [
            (UnitKind::Clan, r"Tribe\s(0\d{3}),", r"0\d{3}"),
            (UnitKind::Tribe, r"Tribe\s(\d{4}),", r"\d{4}"),
            (UnitKind::Courier, r"Courier\s(\d{4}c[1-9]),", r"\d{4}c[1-9]"),
            (UnitKind::Element, r"Element\s(\d{4}e[1-9]),", r"\d{4}e[1-9]"),
            (UnitKind::Fleet, r"Fleet\s(\d{4}f[1-9]),", r"\d{4}f[1-9]"),
            (UnitKind::Garrison, r"Garrison\s(\d{4}g[1-9]),", r"\d{4}g[1-9]"),
        ];

        let mut kinds = Vec::with_capacity(table.len());
        for (kind, header, id) in table {
            kinds.push(KindPatterns {
                kind,
                header: Regex::new(&format!("^{header}"))
                    .with_context(|| format!("failed to compile {} header regex", kind.as_str()))?,
                scry: Regex::new(&format!(r"^{id}\sScry:"))
                    .with_context(|| format!("failed to compile {} scry regex", kind.as_str()))?,
                status: Regex::new(&format!(r"^{id}\sStatus:"))
                    .with_context(|| format!("failed to compile {} status regex", kind.as_str()))?,
            });
        }

        Ok(Self {
            kinds,
            current_turn: Regex::new(r"^Current\sTurn\s(\d{3,4}-\d{2})\s\(#\d+\),")
                .context("failed to compile current turn regex")?,
            fleet_movement: Regex::new(r"^(CALM|MILD|STRONG|GALE)\s[NS][EW]?\sFleet\sMovement:")
                .context("failed to compile fleet movement regex")?,
            tribe_follows: Regex::new(r"^Tribe Follows\s")
                .context("failed to compile tribe follows regex")?,
            tribe_goes_to: Regex::new(r"^Tribe Goes to\s")
                .context("failed to compile tribe goes to regex")?,
            tribe_movement: Regex::new(r"^Tribe Movement:")
                .context("failed to compile tribe movement regex")?,
            scout: Regex::new(r"^Scout\s[1-8]:Scout").context("failed to compile scout regex")?,
        })
    }

    /// Buckets the mapping-relevant lines of `text` by unit. A section opens
    /// on a unit header and closes on its status line or the next header.
    pub fn split(&self, text: &str, options: &SplitOptions) -> Result<Report, SplitError> {
        let mut sections = Vec::new();
        let mut active: Option<(Section, &KindPatterns)> = None;

        for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
            if let Some((patterns, unit_id)) = self.match_header(line) {
                if let Some((section, _)) = active.take() {
                    sections.push(section);
                }
                debug!(unit = unit_id.as_str(), kind = patterns.kind.as_str(), "section opened");
                active = Some((
                    Section {
                        kind: patterns.kind,
                        unit_id,
                        turn: None,
                        lines: vec![line.to_string()],
                    },
                    patterns,
                ));
                continue;
            }

            let Some((section, patterns)) = active.as_mut() else {
                continue;
            };

            if let Some(captures) = self.current_turn.captures(line) {
                if section.turn.is_none() {
                    section.turn = TurnStamp::parse(&captures[1]).ok();
                }
                section.lines.push(line.to_string());
            } else if patterns.status.is_match(line) {
                section.lines.push(line.to_string());
                if let Some((section, _)) = active.take() {
                    sections.push(section);
                }
            } else if self.is_movement_line(line)
                || self.scout.is_match(line)
                || (options.keep_scry_lines && patterns.scry.is_match(line))
            {
                section.lines.push(line.to_string());
            }
        }

        if let Some((section, _)) = active.take() {
            sections.push(section);
        }

        let Some(first) = sections.first() else {
            return Err(SplitError::NoSections);
        };
        let turn = first.turn.ok_or(SplitError::NoTurnInfo)?;
        for section in &sections {
            match section.turn {
                None => return Err(SplitError::NoTurnInfo),
                Some(found) if found != turn => {
                    return Err(SplitError::MultipleTurns {
                        expected: turn,
                        found,
                    });
                }
                Some(_) => {}
            }
        }

        Ok(Report { turn, sections })
    }

    fn match_header(&self, line: &str) -> Option<(&KindPatterns, UnitId)> {
        self.kinds.iter().find_map(|patterns| {
            let captures = patterns.header.captures(line)?;
            let unit_id = UnitId::parse(&captures[1]).ok()?;
            Some((patterns, unit_id))
        })
    }

    fn is_movement_line(&self, line: &str) -> bool {
        self.fleet_movement.is_match(line)
            || self.tribe_follows.is_match(line)
            || self.tribe_goes_to.is_match(line)
            || self.tribe_movement.is_match(line)
    }
}

#[cfg(test)]
mod tests;
