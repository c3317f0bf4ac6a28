pub mod json;
pub mod md;

use crate::error::SemaforoError;
use crate::types::report::ScoreReport;

#[derive(Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Md,
}

pub fn render(report: &ScoreReport, format: OutputFormat) -> Result<String, SemaforoError> {
    match format {
        OutputFormat::Json => json::to_json(report).map_err(SemaforoError::Json),
        OutputFormat::Md => Ok(md::to_markdown(report)),
    }
}
