use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::lexer::{Keyword, Lexer, Sniffers, Token, TokenKind};

use super::ParseOptions;
use super::errors::ParseError;

/// How often each grammar alternative was chosen, keyed `production/alternative`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParseStats(BTreeMap<String, u64>);

impl ParseStats {
    pub fn get(&self, key: &str) -> u64 {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(key, count)| (key.as_str(), *count))
    }

    fn from_log(log: &[&'static str]) -> Self {
        let mut counts = BTreeMap::new();
        for key in log {
            *counts.entry((*key).to_string()).or_default() += 1;
        }
        Self(counts)
    }
}

#[derive(Debug, Default)]
struct Failure {
    at: usize,
    prefix: String,
    expected: BTreeSet<String>,
    message: Option<String>,
}

/// Backtracking recursive-descent state over a fully lexed buffer.
pub(super) struct Parser<'a> {
    pub(super) source: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    rules: Vec<&'static str>,
    log: Vec<&'static str>,
    failure: Failure,
    pub(super) options: &'a ParseOptions,
}

impl<'a> Parser<'a> {
    pub(super) fn new(source: &'a str, sniffers: &'a Sniffers, options: &'a ParseOptions) -> Self {
        Self {
            source,
            tokens: Lexer::new(source, sniffers).collect(),
            pos: 0,
            rules: Vec::new(),
            log: Vec::new(),
            failure: Failure::default(),
            options,
        }
    }

    pub(super) fn stats(&self) -> ParseStats {
        ParseStats::from_log(&self.log)
    }

    /// Runs `f`, rewinding the cursor and the alternative log if it fails.
    pub(super) fn attempt<T>(&mut self, f: impl FnOnce(&mut Self) -> Option<T>) -> Option<T> {
        let (pos, logged) = (self.pos, self.log.len());
        let result = f(self);
        if result.is_none() {
            self.pos = pos;
            self.log.truncate(logged);
        }
        result
    }

    pub(super) fn rule<T>(
        &mut self,
        name: &'static str,
        f: impl FnOnce(&mut Self) -> Option<T>,
    ) -> Option<T> {
        self.rules.push(name);
        let result = self.attempt(f);
        self.rules.pop();
        result
    }

    pub(super) fn record(&mut self, alternative: &'static str) {
        self.log.push(alternative);
    }

    fn significant(&self) -> usize {
        let mut index = self.pos;
        while self.tokens[index].kind == TokenKind::Spaces {
            index += 1;
        }
        index
    }

    pub(super) fn peek(&self) -> Token<'a> {
        self.tokens[self.significant()]
    }

    pub(super) fn position(&self) -> usize {
        self.significant()
    }

    fn prefix(&self) -> String {
        self.rules.join("/")
    }

    pub(super) fn expected(&mut self, at: usize, what: &str) {
        if at > self.failure.at || (self.failure.prefix.is_empty() && self.failure.expected.is_empty()) {
            self.failure = Failure {
                at,
                prefix: self.prefix(),
                expected: BTreeSet::new(),
                message: None,
            };
        }
        if at == self.failure.at {
            self.failure.expected.insert(what.to_string());
        }
    }

    /// Fails at token `at` with a message rather than a list of expectations.
    pub(super) fn reject<T>(&mut self, at: usize, message: String) -> Option<T> {
        if at >= self.failure.at {
            self.failure = Failure {
                at,
                prefix: self.prefix(),
                expected: BTreeSet::new(),
                message: Some(message),
            };
        }
        None
    }

    pub(super) fn error(&self) -> ParseError {
        let token = self.tokens[self.failure.at.min(self.tokens.len() - 1)];
        ParseError {
            prefix: if self.failure.prefix.is_empty() {
                "input".to_string()
            } else {
                self.failure.prefix.clone()
            },
            inner: self
                .failure
                .message
                .clone()
                .unwrap_or_else(|| "no match found".to_string()),
            line: token.line,
            column: token.column,
            offset: token.offset,
            expected: self.failure.expected.iter().cloned().collect(),
        }
    }

    pub(super) fn error_at(&self, at: usize, prefix: &str, inner: &str) -> ParseError {
        let token = self.tokens[at.min(self.tokens.len() - 1)];
        ParseError {
            prefix: prefix.to_string(),
            inner: inner.to_string(),
            line: token.line,
            column: token.column,
            offset: token.offset,
            expected: Vec::new(),
        }
    }

    pub(super) fn token_where(
        &mut self,
        what: &str,
        accept: impl Fn(&Token<'a>) -> bool,
    ) -> Option<Token<'a>> {
        let at = self.significant();
        let token = self.tokens[at];
        if accept(&token) {
            self.pos = at + 1;
            Some(token)
        } else {
            self.expected(at, what);
            None
        }
    }

    pub(super) fn kind(&mut self, kind: TokenKind) -> Option<Token<'a>> {
        self.token_where(kind.describe(), |token| token.kind == kind)
    }

    pub(super) fn keyword(&mut self, keyword: Keyword) -> Option<Token<'a>> {
        self.token_where(&format!("{keyword:?}"), |token| {
            token.kind == TokenKind::Keyword(keyword)
        })
    }

    pub(super) fn punct(&mut self, text: &'static str) -> Option<()> {
        self.token_where(&format!("{text:?}"), |token| {
            token.kind == TokenKind::Delimiter && token.text == text
        })
        .map(|_| ())
    }

    pub(super) fn word(&mut self, text: &'static str) -> Option<()> {
        self.token_where(&format!("{text:?}"), |token| token.text == text)
            .map(|_| ())
    }

    /// Matches `phrase` token by token, ignoring spacing on both sides.
    pub(super) fn phrase(&mut self, phrase: &'static str) -> Option<()> {
        let at = self.significant();
        match self.match_phrase(phrase) {
            Some(end) => {
                self.pos = end;
                Some(())
            }
            None => {
                self.expected(at, &format!("{phrase:?}"));
                None
            }
        }
    }

    /// Returns the cursor position just past `phrase`, without moving.
    pub(super) fn match_phrase(&self, phrase: &str) -> Option<usize> {
        let mut remaining = phrase.trim_start();
        let mut index = self.pos;
        while !remaining.is_empty() {
            while self.tokens[index].kind == TokenKind::Spaces {
                index += 1;
            }
            let token = self.tokens[index];
            if token.text.is_empty() || !remaining.starts_with(token.text) {
                return None;
            }
            remaining = remaining[token.text.len()..].trim_start();
            index += 1;
        }
        Some(index)
    }

    pub(super) fn advance_to(&mut self, pos: usize) {
        self.pos = pos;
    }

    /// End of line, or end of input without consuming it.
    pub(super) fn eol(&mut self) -> Option<()> {
        let at = self.significant();
        match self.tokens[at].kind {
            TokenKind::Eol => {
                self.pos = at + 1;
                Some(())
            }
            TokenKind::Eof => {
                self.pos = at;
                Some(())
            }
            _ => {
                self.expected(at, "end of line");
                None
            }
        }
    }

    pub(super) fn skip_blank_lines(&mut self) {
        while matches!(
            self.tokens[self.pos].kind,
            TokenKind::Spaces | TokenKind::Eol
        ) {
            self.pos += 1;
        }
    }

    pub(super) fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    /// The source text between two cursor positions, trimmed.
    pub(super) fn text_between(&self, from: usize, to: usize) -> &'a str {
        if from >= to {
            return "";
        }
        let start = self.tokens[from].offset;
        let last = self.tokens[to - 1];
        self.source[start..last.offset + last.text.len()].trim()
    }

    pub(super) fn cursor(&self) -> usize {
        self.pos
    }
}
