use crate::hexes::{Direction, Edge};
use crate::lexer::TokenKind;
use crate::model::{Blocker, Patrol, Sighting, UnitId, Water};
use crate::terrain::{RESOURCES, Terrain};

use super::engine::Parser;

/// One comma-separated detail inside a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Item {
    Blocker(Blocker),
    Patrol(Patrol),
    Sightings(Vec<(Sighting, Direction, Direction)>),
    Edges {
        edge: Edge,
        directions: Vec<Direction>,
        units: Vec<UnitId>,
    },
    Resource(String),
    Neighbors {
        terrain: Terrain,
        directions: Vec<Direction>,
        units: Vec<UnitId>,
    },
    Continuation {
        directions: Vec<Direction>,
        units: Vec<UnitId>,
    },
    Units(Vec<UnitId>),
    Label(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Lead {
    Moved(Direction, Terrain),
    Stayed,
}

/// The text between two backslashes of a step list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct Segment {
    pub(super) at: usize,
    pub(super) lead: Option<Lead>,
    pub(super) items: Vec<Item>,
}

const EDGES: [(&str, Edge); 5] = [
    ("Stony Road", Edge::StonyRoad),
    ("River", Edge::River),
    ("Ford", Edge::Ford),
    ("Pass", Edge::Pass),
    ("Canal", Edge::Canal),
];

impl<'a> Parser<'a> {
    /// `[<Dir>-<Code> | -] [<item>] (, [<item>])*`, stopping before `\` or the line end.
    pub(super) fn segment(&mut self) -> Segment {
        let at = self.position();
        let lead = self.attempt(|p| p.lead());
        let mut items = Vec::new();
        if lead.is_none() {
            items.extend(self.attempt(|p| p.item()));
        }
        while self.attempt(|p| p.punct(",")).is_some() {
            items.extend(self.attempt(|p| p.item()));
        }
        Segment { at, lead, items }
    }

    fn lead(&mut self) -> Option<Lead> {
        if let Some(lead) = self.attempt(|p| {
            let direction = p.direction()?;
            p.punct("-")?;
            let terrain = p.terrain_code()?;
            Some(Lead::Moved(direction, terrain))
        }) {
            return Some(lead);
        }
        self.punct("-")?;
        Some(Lead::Stayed)
    }

    pub(super) fn item(&mut self) -> Option<Item> {
        if let Some(blocker) = self.attempt(|p| p.blocker()) {
            self.record("item/blocker");
            return Some(Item::Blocker(blocker));
        }
        if let Some(patrol) = self.attempt(|p| p.patrol()) {
            self.record("item/patrol");
            return Some(Item::Patrol(patrol));
        }
        if let Some(sightings) = self.attempt(|p| p.sightings()) {
            self.record("item/sightings");
            return Some(Item::Sightings(sightings));
        }
        if let Some(item) = self.attempt(|p| p.edge_group()) {
            self.record("item/edges");
            return Some(item);
        }
        if let Some(resource) = self.attempt(|p| {
            p.word("Find")?;
            p.resource()
        }) {
            self.record("item/find");
            return Some(Item::Resource(resource));
        }
        if let Some(resource) = self.attempt(|p| p.resource()) {
            self.record("item/resource");
            return Some(Item::Resource(resource));
        }
        if let Some(item) = self.attempt(|p| p.neighbor_group()) {
            self.record("item/neighbors");
            return Some(item);
        }
        if let Some((directions, units)) = self.attempt(|p| {
            let directions = p.directions()?;
            Some((directions, p.unit_ids()))
        }) {
            self.record("item/continuation");
            return Some(Item::Continuation { directions, units });
        }
        if let Some(units) = self.attempt(|p| {
            let units = p.unit_ids();
            (!units.is_empty()).then_some(units)
        }) {
            self.record("item/units");
            return Some(Item::Units(units));
        }
        let label = self.label()?;
        self.record("item/label");
        Some(Item::Label(label))
    }

    fn blocker(&mut self) -> Option<Blocker> {
        if let Some(blocker) = self.attempt(|p| {
            p.phrase("Can't Move on")?;
            let water = if p.attempt(|p| p.word("Lake")).is_some() {
                Water::Lake
            } else {
                p.word("Ocean")?;
                Water::Ocean
            };
            p.word("to")?;
            let direction = p.direction()?;
            p.phrase("of HEX")?;
            Some(Blocker::Water { water, direction })
        }) {
            return Some(blocker);
        }
        if let Some(blocker) = self.attempt(|p| {
            p.phrase("No Ford on River to")?;
            let direction = p.direction()?;
            p.phrase("of HEX")?;
            Some(Blocker::NoFord { direction })
        }) {
            return Some(blocker);
        }
        self.phrase("Not enough M.P's to move to")?;
        let direction = self.direction()?;
        self.word("into")?;
        let terrain = self.terrain_name()?;
        Some(Blocker::NotEnoughMovePoints { direction, terrain })
    }

    fn patrol(&mut self) -> Option<Patrol> {
        if self
            .attempt(|p| p.phrase("Nothing of interest found"))
            .is_some()
        {
            return Some(Patrol::NothingOfInterest);
        }
        self.phrase("Patrolled and found")?;
        let mut units = vec![self.unit_id()?];
        while let Some(unit) = self.attempt(|p| {
            p.punct(",")?;
            p.unit_id()
        }) {
            units.push(unit);
        }
        Some(Patrol::Found(units))
    }

    /// `(Sight Land - N/NE, Sight Water - NE/SE)`
    fn sightings(&mut self) -> Option<Vec<(Sighting, Direction, Direction)>> {
        self.punct("(")?;
        let mut sightings = vec![self.sighting()?];
        while let Some(sighting) = self.attempt(|p| {
            p.punct(",")?;
            p.sighting()
        }) {
            sightings.push(sighting);
        }
        self.punct(")")?;
        Some(sightings)
    }

    fn sighting(&mut self) -> Option<(Sighting, Direction, Direction)> {
        self.word("Sight")?;
        let sighting = if self.attempt(|p| p.word("Land")).is_some() {
            Sighting::Land
        } else {
            self.word("Water")?;
            Sighting::Water
        };
        self.punct("-")?;
        let first = self.direction()?;
        self.punct("/")?;
        let second = self.direction()?;
        Some((sighting, first, second))
    }

    fn edge_group(&mut self) -> Option<Item> {
        let at = self.position();
        let edge = EDGES.iter().find_map(|(name, edge)| {
            self.match_phrase(name).map(|end| (end, *edge))
        });
        let Some((end, edge)) = edge else {
            self.expected(at, "edge");
            return None;
        };
        self.advance_to(end);
        let directions = self.directions()?;
        let units = self.unit_ids();
        Some(Item::Edges {
            edge,
            directions,
            units,
        })
    }

    fn resource(&mut self) -> Option<String> {
        let at = self.position();
        let mut names: Vec<&str> = RESOURCES.to_vec();
        names.sort_by_key(|name| std::cmp::Reverse(name.len()));
        for name in names {
            if let Some(end) = self.match_phrase(name) {
                self.advance_to(end);
                return Some(name.to_string());
            }
        }
        self.expected(at, "resource");
        None
    }

    fn neighbor_group(&mut self) -> Option<Item> {
        let terrain = self.terrain_code()?;
        let directions = self.directions()?;
        let units = self.unit_ids();
        Some(Item::Neighbors {
            terrain,
            directions,
            units,
        })
    }

    /// One or more space-separated directions.
    fn directions(&mut self) -> Option<Vec<Direction>> {
        let mut directions = vec![self.direction()?];
        while let Some(direction) = self.attempt(|p| p.direction()) {
            directions.push(direction);
        }
        Some(directions)
    }

    /// Zero or more space-separated unit ids.
    fn unit_ids(&mut self) -> Vec<UnitId> {
        let mut units = Vec::new();
        while let Some(unit) = self.attempt(|p| p.unit_id()) {
            units.push(unit);
        }
        units
    }

    // Free text up to the next comma, backslash or line end. Names hold
    // only letters, spaces, apostrophes and periods.
    fn label(&mut self) -> Option<String> {
        let start = self.position();
        self.advance_to(start);
        loop {
            let token = self.peek();
            let stop = matches!(token.kind, TokenKind::Eol | TokenKind::Eof)
                || (token.kind == TokenKind::Delimiter && matches!(token.text, "," | "\\"));
            if stop {
                break;
            }
            self.advance_to(self.position() + 1);
        }
        let label = self.text_between(start, self.cursor());
        if label.is_empty() {
            self.expected(start, "label");
            return None;
        }
        if !label
            .chars()
            .all(|c| c.is_alphabetic() || matches!(c, ' ' | '\'' | '.'))
        {
            return self.reject(start, format!("{label:?} is not a place name"));
        }
        Some(label.to_string())
    }
}
