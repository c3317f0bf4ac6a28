use thiserror::Error;

#[derive(Error, Debug)]
pub enum SemaforoError {
    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("invalid survey definition: {0}")]
    InvalidSurvey(String),

    #[error("invalid answer details: {0}")]
    InvalidDetails(String),

    #[error("invalid ballot: {0}")]
    InvalidBallot(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SemaforoError>;
