use thiserror::Error;

#[derive(Error, Debug)]
pub enum SensingError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported input source: {0}")]
    UnsupportedInputSource(String),

    #[error("Invalid sample at line {line}: {message}")]
    InvalidSample { line: usize, message: String },

    #[error("Feature dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Training unavailable: {0}")]
    TrainingUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SensingResult<T> = Result<T, SensingError>;
