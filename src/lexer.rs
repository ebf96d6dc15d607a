use anyhow::{Context, Result};
use regex::Regex;

use crate::hexes::Direction;
use crate::terrain::Terrain;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Tribe,
    Courier,
    Element,
    Fleet,
    Garrison,
    Current,
    Hex,
    Previous,
    Turn,
    Next,
    Season,
    Weather,
    Scout,
    Status,
    Movement,
    Move,
    Follows,
    Goes,
    Direction(Direction),
    Terrain(Terrain),
}

impl Keyword {
    /// Directions win over terrain codes (`SW`), and both win over grids.
    pub fn lookup(text: &str) -> Option<Self> {
        let keyword = match text {
            "Tribe" => Self::Tribe,
            "Courier" => Self::Courier,
            "Element" => Self::Element,
            "Fleet" => Self::Fleet,
            "Garrison" => Self::Garrison,
            "Current" => Self::Current,
            "Hex" => Self::Hex,
            "Previous" => Self::Previous,
            "Turn" => Self::Turn,
            "Next" => Self::Next,
            "Spring" | "Summer" | "Fall" | "Winter" => Self::Season,
            "FINE" => Self::Weather,
            "Scout" => Self::Scout,
            "Status" => Self::Status,
            "Movement" => Self::Movement,
            "Move" => Self::Move,
            "Follows" => Self::Follows,
            "Goes" => Self::Goes,
            _ => {
                return Direction::parse(text)
                    .map(Self::Direction)
                    .or_else(|| Terrain::from_code(text).map(Self::Terrain));
            }
        };
        Some(keyword)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Spaces,
    Eol,
    Eof,
    Delimiter,
    Date,
    NotApplicable,
    TurnStamp,
    Keyword(Keyword),
    Grid,
    Number,
    UnitId,
    Text,
}

impl TokenKind {
    pub fn describe(self) -> &'static str {
        match self {
            Self::Spaces => "spaces",
            Self::Eol => "end of line",
            Self::Eof => "end of input",
            Self::Delimiter => "delimiter",
            Self::Date => "date",
            Self::NotApplicable => "N/A",
            Self::TurnStamp => "turn",
            Self::Keyword(_) => "keyword",
            Self::Grid => "grid",
            Self::Number => "number",
            Self::UnitId => "unit id",
            Self::Text => "text",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

/// Patterns for compound tokens that span delimiters, tried at the cursor.
pub struct Sniffers {
    date: Regex,
    turn: Regex,
}

impl Sniffers {
    pub fn new() -> Result<Self> {
        Ok(Self {
            date: Regex::new(r"^\d{1,2}/\d{1,2}/\d{4}").context("failed to compile date regex")?,
            turn: Regex::new(r"^\d{3,4}-\d{1,2}").context("failed to compile turn regex")?,
        })
    }

    fn sniff(&self, rest: &str) -> Option<(TokenKind, usize)> {
        if let Some(found) = self.date.find(rest) {
            return Some((TokenKind::Date, found.end()));
        }
        if rest.starts_with("N/A") {
            return Some((TokenKind::NotApplicable, 3));
        }
        self.turn
            .find(rest)
            .map(|found| (TokenKind::TurnStamp, found.end()))
    }
}

pub fn is_delimiter(c: char) -> bool {
    matches!(
        c,
        '\0' | '\'' | '"' | '.' | ',' | '(' | ')' | '#' | '+' | '-' | '*' | '/' | '=' | '\\' | '$' | ':'
    )
}

fn is_trivia(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r')
}

fn classify_word(text: &str) -> TokenKind {
    if let Some(keyword) = Keyword::lookup(text) {
        return TokenKind::Keyword(keyword);
    }
    let bytes = text.as_bytes();
    if bytes.len() == 2 && bytes.iter().all(u8::is_ascii_uppercase) {
        return TokenKind::Grid;
    }
    if !bytes.is_empty() && bytes.iter().all(u8::is_ascii_digit) {
        return TokenKind::Number;
    }
    if bytes.len() == 6
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && matches!(bytes[4], b'c' | b'e' | b'f' | b'g')
        && (b'1'..=b'9').contains(&bytes[5])
    {
        return TokenKind::UnitId;
    }
    TokenKind::Text
}

/// Yields tokens lazily; the final token is always `Eof`.
pub struct Lexer<'a> {
    source: &'a str,
    sniffers: &'a Sniffers,
    offset: usize,
    line: usize,
    column: usize,
    finished: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, sniffers: &'a Sniffers) -> Self {
        Self {
            source,
            sniffers,
            offset: 0,
            line: 1,
            column: 1,
            finished: false,
        }
    }

    fn emit(&mut self, kind: TokenKind, len: usize) -> Token<'a> {
        let text = &self.source[self.offset..self.offset + len];
        let token = Token {
            kind,
            text,
            line: self.line,
            column: self.column,
            offset: self.offset,
        };
        self.offset += len;
        if kind == TokenKind::Eol {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += text.chars().count();
        }
        token
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.finished {
            return None;
        }

        let rest = &self.source[self.offset..];
        let Some(first) = rest.chars().next() else {
            self.finished = true;
            return Some(self.emit(TokenKind::Eof, 0));
        };

        if first == '\n' {
            return Some(self.emit(TokenKind::Eol, 1));
        }
        if is_trivia(first) {
            let len = rest.find(|c: char| !is_trivia(c)).unwrap_or(rest.len());
            return Some(self.emit(TokenKind::Spaces, len));
        }
        if first.is_ascii_digit() || first == 'N' {
            if let Some((kind, len)) = self.sniffers.sniff(rest) {
                return Some(self.emit(kind, len));
            }
        }
        if is_delimiter(first) {
            return Some(self.emit(TokenKind::Delimiter, first.len_utf8()));
        }

        let len = rest
            .find(|c: char| c == '\n' || is_trivia(c) || is_delimiter(c))
            .unwrap_or(rest.len());
        let kind = classify_word(&rest[..len]);
        Some(self.emit(kind, len))
    }
}
