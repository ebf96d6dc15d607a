use crate::hexes::{Direction, Edge};
use crate::lexer::{Keyword, TokenKind};
use crate::model::{
    Blocker, MoveMode, MovementReport, Observation, ObservationKind, Patrol, ScoutingReport,
    Status, Step, StepOutcome, Thing, Water, Wind,
};
use crate::terrain::Terrain;

use super::engine::Parser;
use super::items::{Item, Lead, Segment};

/// What a segment's items say about the hex the unit stands in and its
/// surroundings.
struct Findings {
    here: Observation,
    around: Vec<Observation>,
    blocker: Option<Blocker>,
    patrol: Option<Patrol>,
}

impl Findings {
    fn new(kind: ObservationKind) -> Self {
        Self {
            here: Observation::new(kind, Vec::new()),
            around: Vec::new(),
            blocker: None,
            patrol: None,
        }
    }

    fn at(&mut self, offset: &[Direction]) -> &mut Observation {
        if offset.is_empty() {
            return &mut self.here;
        }
        let index = match self.around.iter().position(|o| o.offset == offset) {
            Some(index) => index,
            None => {
                let kind = if offset.len() == 1 {
                    ObservationKind::UnitNextToLocation
                } else {
                    ObservationKind::FleetNextToRing
                };
                self.around.push(Observation::new(kind, offset.to_vec()));
                self.around.len() - 1
            }
        };
        &mut self.around[index]
    }

    fn observed_anything(&self) -> bool {
        !is_blank(&self.here) || !self.around.is_empty()
    }

    fn into_observations(self, keep_here: bool) -> Vec<Observation> {
        let mut observations = Vec::with_capacity(self.around.len() + 1);
        if keep_here || !is_blank(&self.here) {
            observations.push(self.here);
        }
        observations.extend(self.around);
        observations
    }
}

fn is_blank(observation: &Observation) -> bool {
    observation.terrain.is_none()
        && observation.resources.is_empty()
        && observation.edges.is_empty()
        && observation.things.is_empty()
}

/// The terrain or edge that a bare list of directions continues.
#[derive(Clone, Copy)]
enum Group {
    Terrain(Terrain),
    Edge(Edge),
}

impl<'a> Parser<'a> {
    /// `Tribe Movement: Move ...` or `CALM NE Fleet Movement: Move ...`
    pub(super) fn movement_line(&mut self) -> Option<MovementReport> {
        self.rule("move", |p| {
            let mode = if p.attempt(|p| p.keyword(Keyword::Tribe)).is_some() {
                p.record("move/land");
                MoveMode::Land
            } else {
                let wind = p.token_where("wind", |token| Wind::parse(token.text).is_some())?;
                let wind = Wind::parse(wind.text)?;
                let heading = p.direction()?;
                p.keyword(Keyword::Fleet)?;
                p.record("move/fleet");
                MoveMode::Fleet { wind, heading }
            };
            p.keyword(Keyword::Movement)?;
            p.punct(":")?;
            p.keyword(Keyword::Move)?;
            let (steps, patrol) = p.step_list(ObservationKind::UnitInLocation)?;
            if patrol.is_some() {
                let at = p.position();
                return p.reject(at, "patrol results outside a scout line".to_string());
            }
            p.eol()?;
            Some(MovementReport {
                mode,
                origin: None,
                steps,
            })
        })
    }

    /// `Scout 1:Scout N-PR, \N-PR, ,River N NE\,No Ford on River to N of HEX, Nothing of interest found`
    pub(super) fn scout_line(&mut self) -> Option<ScoutingReport> {
        self.rule("scout", |p| {
            p.keyword(Keyword::Scout)?;
            let at = p.position();
            let number = p.number()?;
            let number = match u8::try_from(number) {
                Ok(number) if (1..=8).contains(&number) => number,
                _ => return p.reject(at, format!("scout number {number} out of range")),
            };
            p.punct(":")?;
            p.keyword(Keyword::Scout)?;
            let (steps, patrol) = p.step_list(ObservationKind::ScoutInLocation)?;
            p.eol()?;
            p.record("scout/steps");
            Some(ScoutingReport {
                number,
                origin: None,
                steps,
                patrol,
            })
        })
    }

    /// `0987 Status: PRAIRIE, O NE, SE, L SW 0987`
    pub(super) fn status_line(&mut self) -> Option<Status> {
        self.rule("status", |p| {
            let unit_id = p.unit_id()?;
            p.keyword(Keyword::Status)?;
            p.punct(":")?;
            let terrain = p.terrain_name()?;
            let at = p.position();
            let mut items = Vec::new();
            while p.attempt(|p| p.punct(",")).is_some() {
                items.extend(p.attempt(|p| p.item()));
            }
            p.eol()?;

            let mut findings = p.findings(at, items, ObservationKind::UnitInLocation)?;
            if findings.blocker.is_some() || findings.patrol.is_some() {
                return p.reject(at, "status cannot report movement results".to_string());
            }
            findings.here.terrain = Some(terrain);
            p.record("status/observations");
            Some(Status {
                unit_id,
                location: None,
                observations: findings.into_observations(true),
            })
        })
    }

    /// Steps separated by `\`, or the single `failed due to ...` form.
    fn step_list(&mut self, here: ObservationKind) -> Option<(Vec<Step>, Option<Patrol>)> {
        if let Some(reason) = self.attempt(|p| {
            p.word("failed")?;
            p.word("due")?;
            p.word("to")?;
            let start = p.position();
            while !matches!(p.peek().kind, TokenKind::Eol | TokenKind::Eof) {
                p.advance_to(p.position() + 1);
            }
            Some(p.text_between(start, p.cursor()).to_string())
        }) {
            self.record("step/failed");
            let step = Step {
                direction: None,
                outcome: StepOutcome::Failed(reason),
                location: None,
                observations: Vec::new(),
            };
            return Some((vec![step], None));
        }

        let mut steps = Vec::new();
        let mut patrol = None;
        loop {
            let segment = self.segment();
            let (step, found) = self.step(segment, here)?;
            steps.extend(step);
            if found.is_some() {
                patrol = found;
            }
            if self.attempt(|p| p.punct("\\")).is_none() {
                break;
            }
        }
        Some((steps, patrol))
    }

    fn step(&mut self, segment: Segment, here: ObservationKind) -> Option<(Option<Step>, Option<Patrol>)> {
        let Segment { at, lead, items } = segment;
        let mut findings = self.findings(at, items, here)?;
        let patrol = findings.patrol.take();

        let (direction, outcome) = match (lead, findings.blocker) {
            (Some(_), Some(_)) => {
                return self.reject(at, "a step cannot both move and be blocked".to_string());
            }
            (Some(Lead::Moved(direction, terrain)), None) => {
                findings.here.terrain = Some(terrain);
                self.record("step/moved");
                (Some(direction), StepOutcome::Moved)
            }
            (Some(Lead::Stayed), None) => {
                self.record("step/stayed");
                (None, StepOutcome::Stayed)
            }
            (None, Some(blocker)) => {
                self.record("step/blocked");
                (Some(blocker.direction()), StepOutcome::Blocked(blocker))
            }
            (None, None) if findings.observed_anything() => {
                self.record("step/stayed");
                (None, StepOutcome::Stayed)
            }
            (None, None) => return Some((None, patrol)),
        };

        let keep_here = matches!(outcome, StepOutcome::Moved);
        let step = Step {
            direction,
            outcome,
            location: None,
            observations: findings.into_observations(keep_here),
        };
        Some((Some(step), patrol))
    }

    fn findings(&mut self, at: usize, items: Vec<Item>, here: ObservationKind) -> Option<Findings> {
        let mut findings = Findings::new(here);
        let mut group = None;

        for item in items {
            match item {
                Item::Blocker(blocker) => {
                    if findings.blocker.is_some() {
                        return self.reject(at, "a step can be blocked only once".to_string());
                    }
                    match blocker {
                        Blocker::Water { water, direction } => {
                            findings.at(&[direction]).terrain = Some(match water {
                                Water::Lake => Terrain::Lake,
                                Water::Ocean => Terrain::Ocean,
                            });
                        }
                        Blocker::NoFord { direction } => {
                            findings.here.add_edge(direction, Edge::River);
                        }
                        Blocker::NotEnoughMovePoints { direction, terrain } => {
                            findings.at(&[direction]).terrain = Some(terrain);
                        }
                    }
                    findings.blocker = Some(blocker);
                }
                Item::Patrol(patrol) => findings.patrol = Some(patrol),
                Item::Sightings(sightings) => {
                    for (sighting, first, second) in sightings {
                        findings.at(&[first, second]).sighting = Some(sighting);
                    }
                }
                Item::Edges {
                    edge,
                    directions,
                    units,
                } => {
                    for direction in directions {
                        findings.here.add_edge(direction, edge);
                    }
                    findings.here.things.extend(units.into_iter().map(Thing::Unit));
                    group = Some(Group::Edge(edge));
                }
                Item::Resource(resource) => {
                    if !findings.here.resources.contains(&resource) {
                        findings.here.resources.push(resource);
                    }
                }
                Item::Neighbors {
                    terrain,
                    directions,
                    units,
                } => {
                    for direction in directions {
                        findings.at(&[direction]).terrain = Some(terrain);
                    }
                    findings.here.things.extend(units.into_iter().map(Thing::Unit));
                    group = Some(Group::Terrain(terrain));
                }
                Item::Continuation { directions, units } => {
                    let Some(group) = group else {
                        return self.reject(
                            at,
                            "directions without a preceding terrain or edge".to_string(),
                        );
                    };
                    for direction in directions {
                        match group {
                            Group::Terrain(terrain) => {
                                findings.at(&[direction]).terrain = Some(terrain);
                            }
                            Group::Edge(edge) => findings.here.add_edge(direction, edge),
                        }
                    }
                    findings.here.things.extend(units.into_iter().map(Thing::Unit));
                }
                Item::Units(units) => {
                    findings.here.things.extend(units.into_iter().map(Thing::Unit));
                }
                Item::Label(label) => {
                    let thing = if self.options.special_hexes.iter().any(|name| *name == label) {
                        Thing::SpecialHex(label)
                    } else {
                        Thing::Settlement(label)
                    };
                    findings.here.things.push(thing);
                }
            }
        }
        Some(findings)
    }
}
