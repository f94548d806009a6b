use crate::commands::{run_evaluate, run_history, run_ranges, run_rules, run_session};
use blood_panel::error::AppError;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Blood Test Report Analyzer",
    about = "Classify blood panels, suggest findings, and record doctor advice",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the interactive patient session (default command)
    Session(SessionArgs),
    /// List the reference ranges in use
    Ranges(RangesArgs),
    /// List the disease rules and their suggested guidance
    Rules,
    /// Classify one panel and print the findings without saving anything
    Evaluate(EvaluateArgs),
    /// List records saved in the report store
    History(HistoryArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct SessionArgs {
    /// Directory for per-patient and master text reports
    #[arg(long)]
    pub(crate) output_dir: Option<PathBuf>,
    /// SQLite database file for the structured report store
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
    /// Skip writing text reports
    #[arg(long)]
    pub(crate) no_file_sink: bool,
    /// Skip writing to the report store
    #[arg(long)]
    pub(crate) no_store: bool,
    /// CSV file (name,low,high) replacing the standard reference ranges
    #[arg(long)]
    pub(crate) reference_table: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct RangesArgs {
    /// CSV file (name,low,high) replacing the standard reference ranges
    #[arg(long)]
    pub(crate) reference_table: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct EvaluateArgs {
    /// Reading as NAME=VALUE, repeated once per test
    #[arg(long = "reading", value_name = "NAME=VALUE", required = true)]
    pub(crate) readings: Vec<String>,
    /// CSV file (name,low,high) replacing the standard reference ranges
    #[arg(long)]
    pub(crate) reference_table: Option<PathBuf>,
    /// Print JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct HistoryArgs {
    /// SQLite database file for the structured report store
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
    /// Print JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Session(SessionArgs::default()));

    match command {
        Command::Session(args) => run_session(args),
        Command::Ranges(args) => run_ranges(args),
        Command::Rules => run_rules(),
        Command::Evaluate(args) => run_evaluate(args),
        Command::History(args) => run_history(args),
    }
}
