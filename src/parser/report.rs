use tracing::debug;

use crate::hexes;
use crate::model::{
    Coords, MovementReport, ScoutingReport, Status, Step, StepOutcome, TurnHeader, TurnReport,
    TurnStamp, UnitSection,
};

use super::engine::Parser;
use super::errors::ParseError;

impl<'a> Parser<'a> {
    /// A whole extract: one or more unit sections sharing a single turn.
    pub(super) fn report(&mut self) -> Result<TurnReport, ParseError> {
        self.skip_blank_lines();
        let mut turn: Option<TurnStamp> = None;
        let mut sections = Vec::new();

        while !self.at_eof() {
            let Some((section, header)) = self.rule("report", |p| p.section()) else {
                return Err(self.error());
            };
            if let Some((at, header)) = header {
                match turn {
                    None => turn = Some(header.current),
                    Some(expected) if expected != header.current => {
                        debug!(%expected, found = %header.current, "turn mismatch");
                        return Err(self.error_at(at, "report", "multiple turns"));
                    }
                    Some(_) => {}
                }
            }
            sections.push(section);
            self.skip_blank_lines();
        }

        let at = self.position();
        if sections.is_empty() {
            return Err(self.error_at(at, "report", "no sections"));
        }
        let Some(turn) = turn else {
            return Err(self.error_at(at, "report", "no turn info"));
        };
        Ok(TurnReport { turn, sections })
    }

    fn section(&mut self) -> Option<(UnitSection, Option<(usize, TurnHeader)>)> {
        let location = self.location_line()?;
        self.skip_blank_lines();

        let at = self.position();
        let header = self.attempt(|p| p.turn_line()).map(|header| (at, header));
        self.skip_blank_lines();

        let follows = self.attempt(|p| p.follows_line()).map(|line| line.target);
        self.skip_blank_lines();
        let goes_to = self.attempt(|p| p.goes_to_line());
        self.skip_blank_lines();
        let movement = self.attempt(|p| p.movement_line());
        self.skip_blank_lines();

        let mut scouts = Vec::new();
        while let Some(scout) = self.attempt(|p| p.scout_line()) {
            scouts.push(scout);
            self.skip_blank_lines();
        }
        let status = self.attempt(|p| p.status_line());
        if let Some(status) = &status {
            if status.unit_id != location.unit_id {
                let at = self.position();
                return self.reject(
                    at,
                    format!(
                        "status for {} closes section of {}",
                        status.unit_id, location.unit_id
                    ),
                );
            }
        }

        self.record("report/section");
        let mut section = UnitSection {
            unit_id: location.unit_id,
            kind: location.kind,
            note: location.note,
            starting_location: location.previous,
            current_location: location.current,
            follows,
            goes_to,
            movement,
            scouts,
            status,
        };
        resolve_locations(&mut section);
        Some((section, header))
    }
}

/// Fills in the coordinates of every step and observation in `section`.
fn resolve_locations(section: &mut UnitSection) {
    if let Some(movement) = &mut section.movement {
        let origin = section
            .goes_to
            .clone()
            .unwrap_or_else(|| section.starting_location.clone());
        resolve_movement(movement, origin);
    }
    for scout in &mut section.scouts {
        resolve_scout(scout, &section.current_location);
    }
    if let Some(status) = &mut section.status {
        resolve_status(status, &section.current_location);
    }
}

fn resolve_movement(movement: &mut MovementReport, origin: Coords) {
    resolve_steps(&mut movement.steps, &origin);
    movement.origin = Some(origin);
}

fn resolve_scout(scout: &mut ScoutingReport, origin: &Coords) {
    resolve_steps(&mut scout.steps, origin);
    scout.origin = Some(origin.clone());
}

fn resolve_status(status: &mut Status, location: &Coords) {
    let here = located(location);
    for observation in &mut status.observations {
        observation.location = here
            .as_ref()
            .and_then(|here| hexes::walk(here, &observation.offset));
    }
    status.location = here;
}

fn resolve_steps(steps: &mut [Step], origin: &Coords) {
    let mut current = located(origin);
    for step in steps {
        if let (StepOutcome::Moved, Some(direction)) = (&step.outcome, step.direction) {
            current = current.and_then(|hex| hexes::neighbor(&hex, direction));
        }
        step.location = current.clone();
        for observation in &mut step.observations {
            observation.location = current
                .as_ref()
                .and_then(|hex| hexes::walk(hex, &observation.offset));
        }
    }
}

// Only grid coordinates can be walked.
fn located(coords: &Coords) -> Option<Coords> {
    matches!(coords, Coords::Grid { .. }).then(|| coords.clone())
}
