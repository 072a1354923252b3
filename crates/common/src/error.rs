use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Insufficient data: need {required} samples, got {available}")]
    InsufficientData { required: usize, available: usize },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Price series is not strictly time-ordered: {0}")]
    UnorderedSeries(String),

    #[error("Market data error: {0}")]
    MarketData(String),

    #[error("Notification error: {0}")]
    Notify(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
