mod cli;
mod commands;
mod config;
mod docx;
mod filenames;
mod hexes;
mod lexer;
mod model;
mod parser;
mod pipeline;
mod scrub;
mod sections;
mod store;
mod terrain;
mod util;

use anyhow::Result;
use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::config::Config;

fn main() {
    init_tracing();

    if let Err(err) = run() {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Extract(args) => commands::extract::run(args, &config),
        Commands::Scrub(args) => commands::scrub::run(args, &config),
        Commands::Parse(args) => commands::parse::run(args, &config),
        Commands::ParseLine(args) => commands::parse_line::run(args, &config),
        Commands::Import(args) => commands::import::run(args, &config),
        Commands::List(args) => commands::list::run(args, &config),
        Commands::Cat(args) => commands::cat::run(args, &config),
        Commands::Share(args) => commands::share::run(args, &config),
        Commands::Delete(args) => commands::delete::run(args, &config),
        Commands::Status(args) => commands::status::run(args, &config),
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
