use crate::hexes::Direction;
use crate::lexer::{Keyword, TokenKind};
use crate::model::{
    Coords, FollowsLine, LocationLine, NextTurn, TurnHeader, TurnStamp, UnitId, UnitKind,
};
use crate::terrain::Terrain;

use super::engine::Parser;

impl<'a> Parser<'a> {
    pub(super) fn unit_id(&mut self) -> Option<UnitId> {
        let token = self.token_where("unit id", |token| {
            token.kind == TokenKind::UnitId
                || (token.kind == TokenKind::Number && token.text.len() == 4)
        })?;
        UnitId::parse(token.text).ok()
    }

    pub(super) fn direction(&mut self) -> Option<Direction> {
        let token = self.token_where("direction", |token| Direction::parse(token.text).is_some())?;
        Direction::parse(token.text)
    }

    pub(super) fn terrain_code(&mut self) -> Option<Terrain> {
        let token = self.token_where("terrain code", |token| {
            matches!(
                token.kind,
                TokenKind::Keyword(_) | TokenKind::Grid | TokenKind::Text
            ) && Terrain::from_code_ignore_case(token.text).is_some()
        })?;
        Terrain::from_code_ignore_case(token.text)
    }

    /// Long names are tried longest first so `GRASSY HILLS PLATEAU` is
    /// never read as `GRASSY HILLS`.
    pub(super) fn terrain_name(&mut self) -> Option<Terrain> {
        let at = self.position();
        for terrain in Terrain::by_long_name_length() {
            if let Some(end) = self.match_phrase(terrain.long_name()) {
                self.advance_to(end);
                return Some(terrain);
            }
        }
        self.expected(at, "terrain name");
        None
    }

    pub(super) fn number(&mut self) -> Option<u32> {
        let token = self.kind(TokenKind::Number)?;
        match token.text.parse() {
            Ok(value) => Some(value),
            Err(_) => self.reject(self.position(), format!("number {} out of range", token.text)),
        }
    }

    fn turn_stamp(&mut self) -> Option<TurnStamp> {
        let at = self.position();
        let token = self.kind(TokenKind::TurnStamp)?;
        match TurnStamp::parse(token.text) {
            Ok(turn) => Some(turn),
            Err(err) => self.reject(at, err.to_string()),
        }
    }

    fn turn_number(&mut self) -> Option<u32> {
        self.punct("(")?;
        self.punct("#")?;
        let number = self.number()?;
        self.punct(")")?;
        Some(number)
    }

    pub(super) fn coords(&mut self) -> Option<Coords> {
        self.rule("coords", |p| {
            let at = p.position();
            let (text, alternative) = if p.attempt(|p| p.kind(TokenKind::NotApplicable)).is_some() {
                ("N/A".to_string(), "coords/not_applicable")
            } else if let Some(digits) = p.attempt(|p| {
                p.punct("#")?;
                p.punct("#")?;
                p.column_row()
            }) {
                (format!("## {digits}"), "coords/obscured")
            } else {
                let grid = p.token_where("grid", |token| {
                    token.text.len() == 2 && token.text.bytes().all(|b| b.is_ascii_uppercase())
                })?;
                let digits = p.column_row()?;
                (format!("{} {digits}", grid.text), "coords/grid")
            };
            match Coords::parse(&text) {
                Ok(coords) => {
                    p.record(alternative);
                    Some(coords)
                }
                Err(err) => p.reject(at, err.to_string()),
            }
        })
    }

    fn column_row(&mut self) -> Option<&'a str> {
        self.token_where("column and row", |token| {
            token.kind == TokenKind::Number && token.text.len() == 4
        })
        .map(|token| token.text)
    }

    /// `Current Turn 899-12 (#0), Winter, FINE Next Turn 900-01 (#1), 28/11/2025`
    pub(super) fn turn_line(&mut self) -> Option<TurnHeader> {
        self.rule("turn", |p| {
            p.keyword(Keyword::Current)?;
            p.keyword(Keyword::Turn)?;
            let current = p.turn_stamp()?;
            let number = p.turn_number()?;
            p.punct(",")?;
            p.keyword(Keyword::Season)?;
            p.punct(",")?;
            p.weather()?;

            let next = p.attempt(|p| {
                p.keyword(Keyword::Next)?;
                p.keyword(Keyword::Turn)?;
                let turn = p.turn_stamp()?;
                let number = p.turn_number()?;
                Some(NextTurn { turn, number })
            });
            let report_date = if next.is_some() {
                p.attempt(|p| {
                    p.punct(",")?;
                    p.kind(TokenKind::Date)
                })
                .map(|token| token.text.to_string())
            } else {
                None
            };

            p.eol()?;
            p.record(if next.is_some() {
                "turn/with_next"
            } else {
                "turn/current_only"
            });
            Some(TurnHeader {
                current,
                number,
                next,
                report_date,
            })
        })
    }

    // Weather is not kept; any run of words up to `Next` or the line end will do.
    fn weather(&mut self) -> Option<()> {
        let is_weather_word = |kind: TokenKind| {
            matches!(
                kind,
                TokenKind::Keyword(Keyword::Weather) | TokenKind::Text | TokenKind::Grid
            )
        };
        self.token_where("weather", |token| is_weather_word(token.kind))?;
        while self
            .attempt(|p| p.token_where("weather", |token| is_weather_word(token.kind)))
            .is_some()
        {}
        Some(())
    }

    /// `Tribe 0987, , Current Hex = QQ 0909, (Previous Hex = QQ 1010)`
    pub(super) fn location_line(&mut self) -> Option<LocationLine> {
        self.rule("location", |p| {
            let at = p.position();
            let header = p.token_where("unit kind", |token| {
                matches!(
                    token.kind,
                    TokenKind::Keyword(
                        Keyword::Tribe
                            | Keyword::Courier
                            | Keyword::Element
                            | Keyword::Fleet
                            | Keyword::Garrison
                    )
                )
            })?;
            let unit_id = p.unit_id()?;
            let kind = unit_id.kind();
            if kind.header_word() != header.text {
                return p.reject(
                    at,
                    format!("{} header cannot open unit {unit_id}", header.text),
                );
            }

            p.punct(",")?;
            let note = p.note();
            p.punct(",")?;
            p.keyword(Keyword::Current)?;
            p.keyword(Keyword::Hex)?;
            p.punct("=")?;
            let current = p.coords()?;
            p.punct(",")?;
            p.punct("(")?;
            p.keyword(Keyword::Previous)?;
            p.keyword(Keyword::Hex)?;
            p.punct("=")?;
            let previous = p.coords()?;
            p.punct(")")?;
            p.eol()?;

            p.record(match kind {
                UnitKind::Clan => "location/clan",
                UnitKind::Tribe => "location/tribe",
                UnitKind::Courier => "location/courier",
                UnitKind::Element => "location/element",
                UnitKind::Fleet => "location/fleet",
                UnitKind::Garrison => "location/garrison",
            });
            Some(LocationLine {
                kind,
                unit_id,
                note,
                current,
                previous,
            })
        })
    }

    fn note(&mut self) -> Option<String> {
        let start = self.cursor();
        loop {
            let token = self.peek();
            let stop = matches!(token.kind, TokenKind::Eol | TokenKind::Eof)
                || (token.kind == TokenKind::Delimiter && token.text == ",");
            if stop {
                break;
            }
            self.advance_to(self.position() + 1);
        }
        let note = self.text_between(start, self.cursor());
        (!note.is_empty()).then(|| note.to_string())
    }

    /// `Tribe Follows 0987e1`
    pub(super) fn follows_line(&mut self) -> Option<FollowsLine> {
        self.rule("follows", |p| {
            p.keyword(Keyword::Tribe)?;
            p.keyword(Keyword::Follows)?;
            let target = p.unit_id()?;
            p.eol()?;
            p.record("follows/unit");
            Some(FollowsLine { target })
        })
    }

    /// `Tribe Goes to QQ 1010`
    pub(super) fn goes_to_line(&mut self) -> Option<Coords> {
        self.rule("goes_to", |p| {
            p.keyword(Keyword::Tribe)?;
            p.keyword(Keyword::Goes)?;
            p.word("to")?;
            let destination = p.coords()?;
            p.eol()?;
            p.record("goes_to/coords");
            Some(destination)
        })
    }
}
