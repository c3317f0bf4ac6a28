use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "semaforo",
    version,
    about = "Survey response scoring and traffic-light reporting CLI"
)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Score answer detail rows into a traffic-light report
    Score(ScoreCommand),
    /// Score a filled ballot in place, the way the form preview does
    Preview(PreviewCommand),
    /// Check a survey definition for data-quality defects
    Validate(ValidateCommand),
    /// Build the submission payload for a filled ballot
    Export(ExportCommand),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ReportFormat {
    Json,
    Md,
}

#[derive(Args)]
pub struct ScoreCommand {
    /// JSON file with answer detail rows (bare array or { "respuestas": [...] })
    pub respuestas: PathBuf,

    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,

    /// Restrict the output to one category's average
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Args)]
pub struct PreviewCommand {
    /// JSON file with the survey definition
    pub encuesta: PathBuf,

    /// JSON file with the filled ballot
    pub boleta: PathBuf,

    #[arg(short, long, value_enum)]
    pub format: Option<ReportFormat>,
}

#[derive(Args)]
pub struct ValidateCommand {
    /// JSON file with the survey definition
    pub encuesta: PathBuf,

    /// Treat warnings as blocking
    #[arg(long)]
    pub estricto: bool,
}

#[derive(Args)]
pub struct ExportCommand {
    /// JSON file with the survey definition
    pub encuesta: PathBuf,

    /// JSON file with the filled ballot
    pub boleta: PathBuf,

    /// Write the payload here instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}
