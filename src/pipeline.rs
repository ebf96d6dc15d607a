//! Drives one turn report from DOCX bytes to a parsed `TurnReport`:
//! extract, split, scrub, parse. Each phase hands its output to the next
//! and the caller picks which intermediate artifacts it wants back.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{Context, Result, bail};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::Config;
use crate::docx::{self, ExtractError, ExtractOptions};
use crate::filenames::{FileKind, FileNames};
use crate::model::TurnReport;
use crate::parser::{ParseFailure, ParseOptions, ParseStats, ReportParser};
use crate::scrub::{ScrubOptions, Scrubber, render_lines};
use crate::sections::{SplitError, SplitOptions, Splitter};
use crate::store::{Actor, Clan, DocumentKind, DocumentMeta, DocumentStore, NewDocument};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Extract,
    Split,
    Scrub,
    Parse,
}

impl Phase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extract => "extract",
            Self::Split => "split",
            Self::Scrub => "scrub",
            Self::Parse => "parse",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("failed to read {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to extract {}", .path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },
    #[error("failed to split {}", .path.display())]
    Split {
        path: PathBuf,
        #[source]
        source: SplitError,
    },
    #[error("failed to parse {}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseFailure,
    },
    #[error("cancelled {} before {phase}", .path.display())]
    Cancelled { path: PathBuf, phase: Phase },
}

impl PipelineError {
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::Read { .. } => None,
            Self::Extract { .. } => Some(Phase::Extract),
            Self::Split { .. } => Some(Phase::Split),
            Self::Parse { .. } => Some(Phase::Parse),
            Self::Cancelled { phase, .. } => Some(*phase),
        }
    }
}

/// Which artifacts a run should hand back. Phases after the last wanted
/// artifact are not run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Wanted {
    pub raw: bool,
    pub scrubbed: bool,
    pub report: bool,
    pub stats: bool,
}

impl Wanted {
    pub fn all() -> Self {
        Self {
            raw: true,
            scrubbed: true,
            report: true,
            stats: true,
        }
    }

    fn needs_scrub(self) -> bool {
        self.scrubbed || self.needs_parse()
    }

    fn needs_parse(self) -> bool {
        self.report || self.stats
    }
}

#[derive(Debug, Default)]
pub struct Artifacts {
    pub raw: Option<Vec<u8>>,
    pub scrubbed: Option<Vec<u8>>,
    pub report: Option<TurnReport>,
    pub stats: Option<ParseStats>,
}

#[derive(Debug, Clone, Default)]
pub struct DriverOptions {
    pub extract: ExtractOptions,
    pub split: SplitOptions,
    pub scrub: ScrubOptions,
}

impl From<&Config> for DriverOptions {
    fn from(config: &Config) -> Self {
        Self {
            extract: config.extract,
            split: SplitOptions::default(),
            scrub: config.scrub,
        }
    }
}

pub struct Driver {
    splitter: Splitter,
    scrubber: Scrubber,
    parser: ReportParser,
    names: FileNames,
    options: DriverOptions,
    cancel: Arc<AtomicBool>,
}

/// What `import` stored for one turn report.
#[derive(Debug)]
pub struct Imported {
    pub clan: Clan,
    pub report: DocumentMeta,
    pub extract: DocumentMeta,
    pub turn_report: TurnReport,
}

impl Driver {
    pub fn new(options: DriverOptions, parse: ParseOptions) -> Result<Self> {
        Ok(Self {
            splitter: Splitter::new()?,
            scrubber: Scrubber::new()?,
            parser: ReportParser::new(parse)?,
            names: FileNames::new()?,
            options,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            DriverOptions::from(config),
            ParseOptions {
                special_hexes: config.special_hexes.clone(),
            },
        )
    }

    /// Setting the returned flag stops the run at the next phase boundary.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    pub fn run_path(&self, path: &Path, wanted: Wanted) -> Result<Artifacts, PipelineError> {
        self.checkpoint(path, Phase::Extract)?;
        let data = fs::read(path).map_err(|source| PipelineError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        self.run_bytes(path, &data, wanted)
    }

    /// `path` only labels errors and log lines; `data` is the DOCX itself.
    pub fn run_bytes(
        &self,
        path: &Path,
        data: &[u8],
        wanted: Wanted,
    ) -> Result<Artifacts, PipelineError> {
        self.checkpoint(path, Phase::Extract)?;
        let raw = docx::extract(data, &self.options.extract).map_err(|source| {
            PipelineError::Extract {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!(path = %path.display(), bytes = raw.len(), "extracted");

        let mut artifacts = if wanted.needs_scrub() {
            let text = String::from_utf8_lossy(&raw);
            self.run_extract(path, &text, wanted)?
        } else {
            Artifacts::default()
        };
        if wanted.raw {
            artifacts.raw = Some(raw);
        }
        Ok(artifacts)
    }

    /// Starts from extract text that is already on hand.
    pub fn run_extract(
        &self,
        path: &Path,
        text: &str,
        wanted: Wanted,
    ) -> Result<Artifacts, PipelineError> {
        let mut artifacts = Artifacts::default();
        if !wanted.needs_scrub() {
            return Ok(artifacts);
        }

        self.checkpoint(path, Phase::Split)?;
        let split = self
            .splitter
            .split(text, &self.options.split)
            .map_err(|source| PipelineError::Split {
                path: path.to_path_buf(),
                source,
            })?;
        info!(
            path = %path.display(),
            turn = %split.turn,
            sections = split.sections.len(),
            "split"
        );

        self.checkpoint(path, Phase::Scrub)?;
        let lines = self.scrubber.scrub(split.lines(), &self.options.scrub);
        debug!(
            kept = lines.len(),
            dropped = split.lines().count().saturating_sub(lines.len()),
            "scrubbed"
        );
        let scrubbed = render_lines(&lines);

        if wanted.needs_parse() {
            self.checkpoint(path, Phase::Parse)?;
            let input = String::from_utf8_lossy(&scrubbed);
            let (report, stats) =
                self.parser
                    .parse_report(&input)
                    .map_err(|source| PipelineError::Parse {
                        path: path.to_path_buf(),
                        source,
                    })?;
            info!(
                path = %path.display(),
                sections = report.sections.len(),
                alternatives = stats.total(),
                "parsed"
            );
            if wanted.report {
                artifacts.report = Some(report);
            }
            if wanted.stats {
                artifacts.stats = Some(stats);
            }
        }
        if wanted.scrubbed {
            artifacts.scrubbed = Some(scrubbed);
        }
        Ok(artifacts)
    }

    /// Registers the clan named by the file, runs the pipeline and stores
    /// the DOCX together with its scrubbed extract.
    pub fn import(
        &self,
        store: &mut DocumentStore,
        actor: &Actor,
        path: &Path,
    ) -> Result<Imported> {
        let name = self.names.parse_path(path)?;
        if name.kind != FileKind::TurnReport {
            bail!("{} is not a turn report document", path.display());
        }

        let artifacts = self.run_path(
            path,
            Wanted {
                scrubbed: true,
                report: true,
                ..Wanted::default()
            },
        )?;
        let (Some(scrubbed), Some(turn_report)) = (artifacts.scrubbed, artifacts.report) else {
            bail!("pipeline returned no report for {}", path.display());
        };
        if turn_report.turn != name.turn {
            bail!(
                "{} reports turn {} but is named for turn {}",
                path.display(),
                turn_report.turn,
                name.turn
            );
        }
        if let Some(section) = turn_report
            .sections
            .iter()
            .find(|section| section.unit_id.clan_no() != name.clan.value())
        {
            bail!(
                "{} holds unit {} of clan {:04}, not clan {}",
                path.display(),
                section.unit_id,
                section.unit_id.clan_no(),
                name.clan
            );
        }

        let clan = store
            .register_clan(actor, &name.game, name.clan)
            .with_context(|| format!("failed to register clan {}", name.clan))?;
        let report = store
            .create_from_path(actor, clan.id, DocumentKind::TurnReportFile, path)
            .with_context(|| format!("failed to store {}", path.display()))?;
        let extract_name = name.with_kind(FileKind::ReportExtract).to_string();
        let extract = store
            .create(
                actor,
                clan.id,
                NewDocument {
                    kind: DocumentKind::ReportExtract,
                    name: extract_name.clone(),
                    contents: scrubbed,
                    declared_length: None,
                },
            )
            .with_context(|| format!("failed to store {extract_name}"))?;

        info!(
            path = %path.display(),
            clan = clan.id,
            report = %report.hash,
            extract = %extract.hash,
            "imported"
        );
        Ok(Imported {
            clan,
            report,
            extract,
            turn_report,
        })
    }

    fn checkpoint(&self, path: &Path, phase: Phase) -> Result<(), PipelineError> {
        if self.cancel.load(Ordering::Relaxed) {
            return Err(PipelineError::Cancelled {
                path: path.to_path_buf(),
                phase,
            });
        }
        Ok(())
    }
}
