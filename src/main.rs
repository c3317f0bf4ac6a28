mod cli;
mod config;
mod error;
mod form;
mod load;
mod report;
mod scoring;
mod submission;
mod types;
mod validate;
mod visibility;

use crate::error::SemaforoError;
use crate::types::config::{ReportFormatConfig, SemaforoConfig};
use crate::types::report::Semaforo;
use clap::Parser;
use std::path::Path;

pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const WARNINGS: i32 = 1;
    pub const BLOCKING: i32 = 2;
    pub const RUNTIME_FAILURE: i32 = 3;
}

fn color_exit_code(color: Semaforo) -> i32 {
    match color {
        Semaforo::Verde => exit_code::SUCCESS,
        Semaforo::Naranja => exit_code::WARNINGS,
        Semaforo::Rojo => exit_code::BLOCKING,
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn output_format(
    flag: Option<cli::ReportFormat>,
    config: &SemaforoConfig,
) -> report::OutputFormat {
    match flag {
        Some(cli::ReportFormat::Json) => report::OutputFormat::Json,
        Some(cli::ReportFormat::Md) => report::OutputFormat::Md,
        None => match config.formato() {
            Some(ReportFormatConfig::Json) => report::OutputFormat::Json,
            Some(ReportFormatConfig::Md) | None => report::OutputFormat::Md,
        },
    }
}

fn run() -> Result<i32, SemaforoError> {
    let cli = cli::Cli::parse();
    init_tracing(cli.verbose, cli.quiet);
    let config = config::load_config(Path::new("."))?.unwrap_or_default();

    match cli.command {
        cli::Commands::Score(cmd) => {
            let details = load::load_details(&cmd.respuestas)?;

            if let Some(categoria) = &cmd.category {
                let filtered: Vec<_> = details
                    .iter()
                    .filter(|row| row.categoria.as_deref() == Some(categoria.as_str()))
                    .cloned()
                    .collect();
                let raw = scoring::score_category(&details, categoria);
                let color = scoring::classify::classify(raw);
                let promedio = scoring::round_to(raw, config.decimales());
                match output_format(cmd.format, &config) {
                    report::OutputFormat::Json => {
                        let row = serde_json::json!({
                            "categoria": categoria,
                            "promedio": promedio,
                            "color_semaforo": color,
                            "total_respuestas": filtered.len(),
                        });
                        println!("{}", serde_json::to_string_pretty(&row)?);
                    }
                    report::OutputFormat::Md => {
                        println!(
                            "{}: {:.2} ({}, {} respuestas)",
                            categoria,
                            promedio,
                            color.label(),
                            filtered.len()
                        );
                    }
                }
                return Ok(color_exit_code(color));
            }

            let score_report = scoring::build_report(&details, config.decimales());
            let format = output_format(cmd.format, &config);
            let rendered = report::render(&score_report, format)?;
            println!("{rendered}");
            Ok(color_exit_code(score_report.color_semaforo))
        }
        cli::Commands::Preview(cmd) => {
            let survey = load::load_survey(&cmd.encuesta)?;
            let ballot = load::load_ballot(&cmd.boleta)?;
            let form = form::FormState::from_ballot(&survey, &ballot)?;
            let visibility = form.resolve_visibility(&survey);

            // Hidden questions keep any stale answer out of the preview.
            let details: Vec<_> = form
                .details(&survey)
                .into_iter()
                .filter(|row| visibility.is_eligible(row.id_pregunta))
                .collect();

            let score_report = scoring::build_report(&details, config.decimales());
            let format = output_format(cmd.format, &config);
            let rendered = report::render(&score_report, format)?;
            println!("{rendered}");
            Ok(color_exit_code(score_report.color_semaforo))
        }
        cli::Commands::Validate(cmd) => {
            let survey = load::load_survey(&cmd.encuesta)?;
            let estricto = cmd.estricto || config.estricto();
            let findings = validate::survey_findings(&survey, estricto);

            if findings.is_empty() {
                println!("validate: no findings");
                return Ok(exit_code::SUCCESS);
            }

            for finding in &findings {
                let level = if finding.blocking { "BLOCKING" } else { "WARN" };
                println!("[{}] {}: {}", level, finding.id, finding.title);
                println!("  {}", finding.body);
            }

            if findings.iter().any(|finding| finding.blocking) {
                Ok(exit_code::BLOCKING)
            } else {
                Ok(exit_code::WARNINGS)
            }
        }
        cli::Commands::Export(cmd) => {
            let survey = load::load_survey(&cmd.encuesta)?;
            let ballot = load::load_ballot(&cmd.boleta)?;
            let payload = submission::build_payload(&survey, &ballot)?;
            let rendered = serde_json::to_string_pretty(&payload)?;
            match cmd.out {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!("payload file: {}", path.display());
                }
                None => println!("{rendered}"),
            }
            Ok(exit_code::SUCCESS)
        }
    }
}

fn main() {
    match run() {
        Ok(code) => {
            if code != 0 {
                std::process::exit(code);
            }
        }
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(exit_code::RUNTIME_FAILURE);
        }
    }
}
