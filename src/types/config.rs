use crate::error::SemaforoError;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SemaforoConfig {
    pub report: Option<ReportConfig>,
    pub validate: Option<ValidateConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    pub formato: Option<ReportFormatConfig>,
    pub decimales: Option<u32>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormatConfig {
    Json,
    Md,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidateConfig {
    #[serde(default)]
    pub estricto: bool,
}

pub const DEFAULT_DECIMALES: u32 = 2;

impl SemaforoConfig {
    pub fn decimales(&self) -> u32 {
        self.report
            .as_ref()
            .and_then(|report| report.decimales)
            .unwrap_or(DEFAULT_DECIMALES)
    }

    pub fn formato(&self) -> Option<ReportFormatConfig> {
        self.report.as_ref().and_then(|report| report.formato)
    }

    pub fn estricto(&self) -> bool {
        self.validate
            .as_ref()
            .map(|validate| validate.estricto)
            .unwrap_or(false)
    }

    pub fn validate(&self) -> Result<(), SemaforoError> {
        if let Some(decimales) = self.report.as_ref().and_then(|report| report.decimales) {
            if decimales > 6 {
                return Err(SemaforoError::ConfigParse(format!(
                    "report.decimales must be between 0 and 6, got {decimales}"
                )));
            }
        }
        Ok(())
    }
}
