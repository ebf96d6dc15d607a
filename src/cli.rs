use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::docx::Trim;
use crate::store::DocumentKind;

#[derive(Parser, Debug)]
#[command(
    name = "turnrpt",
    version,
    about = "TribeNet turn report extraction, parsing and document storage"
)]
pub struct Cli {
    /// JSON configuration file; flags override its values.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Extract(ExtractArgs),
    Scrub(ScrubArgs),
    Parse(ParseArgs),
    ParseLine(ParseLineArgs),
    Import(ImportArgs),
    List(ListArgs),
    Cat(CatArgs),
    Share(ShareArgs),
    Delete(DeleteArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ExtractArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub trim: Option<TrimMode>,

    #[arg(long, default_value_t = false)]
    pub keep_carriage_returns: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ScrubArgs {
    /// A turn report document, or extract text when it does not end in `.docx`.
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub no_patch_na: bool,

    /// Keep only the strict line list: no follows, goes to or fleet movement lines.
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    #[arg(long)]
    pub input: PathBuf,

    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub stats_path: Option<PathBuf>,

    #[arg(long = "special-hex")]
    pub special_hexes: Vec<String>,
}

/// Parses one report line on its own, for checking a single production.
#[derive(Args, Debug, Clone)]
pub struct ParseLineArgs {
    #[arg(long, value_enum)]
    pub production: LineProduction,

    #[arg(long)]
    pub text: String,

    #[arg(long = "special-hex")]
    pub special_hexes: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ImportArgs {
    #[arg(long = "input", required = true)]
    pub inputs: Vec<PathBuf>,

    #[arg(long)]
    pub db_path: Option<PathBuf>,

    /// Keep importing the remaining files after one fails.
    #[arg(long, default_value_t = false)]
    pub keep_going: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long, value_enum)]
    pub kind: Option<KindFilter>,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CatArgs {
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub id: i64,

    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct ShareArgs {
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub id: i64,

    /// User id of the ally receiving access.
    #[arg(long)]
    pub ally: i64,

    #[arg(long, default_value_t = false)]
    pub no_read: bool,

    #[arg(long, default_value_t = false)]
    pub can_delete: bool,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    #[arg(long)]
    pub db_path: Option<PathBuf>,

    #[arg(long)]
    pub id: i64,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long)]
    pub db_path: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum TrimMode {
    None,
    Leading,
    Trailing,
    Both,
}

impl From<TrimMode> for Trim {
    fn from(mode: TrimMode) -> Self {
        match mode {
            TrimMode::None => Trim::None,
            TrimMode::Leading => Trim::Leading,
            TrimMode::Trailing => Trim::Trailing,
            TrimMode::Both => Trim::Both,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum LineProduction {
    Turn,
    Location,
    Follows,
    GoesTo,
    Move,
    Scout,
    Status,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum KindFilter {
    TurnReport,
    Extract,
    Map,
}

impl From<KindFilter> for DocumentKind {
    fn from(filter: KindFilter) -> Self {
        match filter {
            KindFilter::TurnReport => DocumentKind::TurnReportFile,
            KindFilter::Extract => DocumentKind::ReportExtract,
            KindFilter::Map => DocumentKind::WorldographerMap,
        }
    }
}
