use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, bail};
use regex::Regex;

use crate::model::{ClanNo, GameId, TurnStamp};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    TurnReport,
    ReportExtract,
}

impl FileKind {
    pub fn suffix(self) -> &'static str {
        match self {
            Self::TurnReport => "docx",
            Self::ReportExtract => "report.txt",
        }
    }
}

/// `<game>.<YYYY-MM>.<clan>.docx` or `<game>.<YYYY-MM>.<clan>.report.txt`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFileName {
    pub game: GameId,
    pub turn: TurnStamp,
    pub clan: ClanNo,
    pub kind: FileKind,
}

impl ReportFileName {
    pub fn with_kind(&self, kind: FileKind) -> Self {
        Self {
            kind,
            ..self.clone()
        }
    }
}

impl fmt::Display for ReportFileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.game,
            self.turn,
            self.clan,
            self.kind.suffix()
        )
    }
}

pub struct FileNames {
    pattern: Regex,
}

impl FileNames {
    pub fn new() -> Result<Self> {
        Ok(Self {
            pattern: Regex::new(r"^(\d{4})\.(\d{4}-\d{2})\.(0\d{3})\.(docx|report\.txt)$")
                .context("failed to compile report file name regex")?,
        })
    }

    pub fn parse(&self, name: &str) -> Result<ReportFileName> {
        let Some(captures) = self.pattern.captures(name) else {
            bail!("{name:?} is not named <game>.<YYYY-MM>.<clan>.docx or .report.txt");
        };
        let kind = match &captures[4] {
            "docx" => FileKind::TurnReport,
            _ => FileKind::ReportExtract,
        };
        Ok(ReportFileName {
            game: GameId::parse(&captures[1])?,
            turn: TurnStamp::parse(&captures[2])
                .with_context(|| format!("invalid turn in {name:?}"))?,
            clan: ClanNo::parse(&captures[3])
                .with_context(|| format!("invalid clan in {name:?}"))?,
            kind,
        })
    }

    pub fn parse_path(&self, path: &Path) -> Result<ReportFileName> {
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .with_context(|| format!("no file name in {}", path.display()))?;
        self.parse(name)
    }
}
