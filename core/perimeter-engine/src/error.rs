//! FILENAME: core/perimeter-engine/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PerimeterError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown perimeter level: {0}")]
    UnknownLevel(String),

    #[error("Unknown filter key: {0}")]
    UnknownFilterKey(String),

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Log file not initialized")]
    LogFileNotInitialized,
}

pub type Result<T> = std::result::Result<T, PerimeterError>;
