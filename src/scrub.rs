use anyhow::{Context, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrubOptions {
    /// Rewrite `Previous Hex = N/A` to the current hex on units that did not move.
    pub patch_na: bool,
    /// Also keep `Tribe Follows`, `Tribe Goes to` and fleet movement lines.
    pub accept_unit_moves: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Location,
    CurrentTurn,
    TribeMovement,
    FleetMovement,
    Follows,
    GoesTo,
    Scout,
    Status,
}

pub struct Scrubber {
    tabs: Regex,
    spaces: Regex,
    location: Regex,
    current_turn: Regex,
    tribe_movement: Regex,
    fleet_movement: Regex,
    follows: Regex,
    goes_to: Regex,
    scout: Regex,
    status: Regex,
    previous_na: Regex,
    motion: Regex,
}

impl Scrubber {
    pub fn new() -> Result<Self> {
        Ok(Self {
            tabs: Regex::new(r"\t+").context("failed to compile tab run regex")?,
            spaces: Regex::new(r" {2,}").context("failed to compile space run regex")?,
            location: Regex::new(
                r"^(Courier \d{4}c[1-9]|Element \d{4}e[1-9]|Fleet \d{4}f[1-9]|Garrison \d{4}g[1-9]|Tribe \d{4}),",
            )
            .context("failed to compile location line regex")?,
            current_turn: Regex::new(r"^Current Turn \d")
                .context("failed to compile current turn regex")?,
            tribe_movement: Regex::new(r"^Tribe Movement: Move")
                .context("failed to compile tribe movement regex")?,
            fleet_movement: Regex::new(r"^(CALM|MILD|STRONG|GALE) [NS][EW]? Fleet Movement:")
                .context("failed to compile fleet movement regex")?,
            follows: Regex::new(r"^Tribe Follows ").context("failed to compile follows regex")?,
            goes_to: Regex::new(r"^Tribe Goes to ").context("failed to compile goes to regex")?,
            scout: Regex::new(r"^Scout [1-8]:Scout ").context("failed to compile scout regex")?,
            status: Regex::new(r"^(\d{4}[cefg][1-9]|\d{4}) Status:")
                .context("failed to compile status regex")?,
            previous_na: Regex::new(r"Current Hex = ([A-Z]{2} \d{4}),.*\(Previous Hex = N/A\)")
                .context("failed to compile previous hex regex")?,
            motion: Regex::new(r"(?:Move|\\) ?(?:NE|NW|SE|SW|N|S)-")
                .context("failed to compile movement step regex")?,
        })
    }

    /// Trims the line and collapses tab runs and space runs to one space.
    pub fn normalize_line(&self, line: &str) -> String {
        let line = line.trim_matches(|c: char| c.is_ascii_whitespace());
        let line = self.tabs.replace_all(line, " ");
        self.spaces.replace_all(&line, " ").into_owned()
    }

    pub fn classify(&self, line: &str, options: &ScrubOptions) -> Option<LineKind> {
        if self.location.is_match(line) {
            Some(LineKind::Location)
        } else if self.current_turn.is_match(line) {
            Some(LineKind::CurrentTurn)
        } else if self.tribe_movement.is_match(line) {
            Some(LineKind::TribeMovement)
        } else if self.scout.is_match(line) {
            Some(LineKind::Scout)
        } else if self.status.is_match(line) {
            Some(LineKind::Status)
        } else if !options.accept_unit_moves {
            None
        } else if self.fleet_movement.is_match(line) {
            Some(LineKind::FleetMovement)
        } else if self.follows.is_match(line) {
            Some(LineKind::Follows)
        } else if self.goes_to.is_match(line) {
            Some(LineKind::GoesTo)
        } else {
            None
        }
    }

    pub fn scrub<'a, I>(&self, lines: I, options: &ScrubOptions) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut kept: Vec<(LineKind, String)> = Vec::new();
        for line in lines {
            let line = self.normalize_line(line);
            match self.classify(&line, options) {
                Some(kind) => kept.push((kind, line)),
                None if line.is_empty() => {}
                None => debug!(line = %line, "dropped line"),
            }
        }

        if options.patch_na {
            self.patch_previous_hexes(&mut kept);
        }

        kept.into_iter().map(|(_, line)| line).collect()
    }

    // Decided over retained lines only, so a second pass sees the same evidence.
    fn patch_previous_hexes(&self, kept: &mut [(LineKind, String)]) {
        for index in 0..kept.len() {
            if kept[index].0 != LineKind::Location || !self.previous_na.is_match(&kept[index].1) {
                continue;
            }
            if self.unit_moved(&kept[index + 1..]) {
                debug!(line = %kept[index].1, "kept N/A previous hex on a unit that moved");
                continue;
            }
            let patched = self
                .previous_na
                .replace(&kept[index].1, "Current Hex = ${1}, (Previous Hex = ${1})")
                .into_owned();
            kept[index].1 = patched;
        }
    }

    fn unit_moved(&self, following: &[(LineKind, String)]) -> bool {
        following
            .iter()
            .take_while(|(kind, _)| *kind != LineKind::Location)
            .any(|(kind, line)| match kind {
                LineKind::GoesTo => true,
                LineKind::TribeMovement | LineKind::FleetMovement => self.motion.is_match(line),
                _ => false,
            })
    }
}

/// Joins scrubbed lines into the extract format: LF terminated, trailing newline.
pub fn render_lines(lines: &[String]) -> Vec<u8> {
    let mut out = Vec::new();
    for line in lines {
        out.extend_from_slice(line.as_bytes());
        out.push(b'\n');
    }
    out
}

#[cfg(test)]
mod tests;
