// src/error.rs

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OplError {
    #[error("IO Error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON Error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Log file {path:?} is corrupt: {source}")]
    CorruptLog {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Spreadsheet Error: {0}")]
    Spreadsheet(#[from] rust_xlsxwriter::XlsxError),

    #[error("Network Error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("No IP lookup service returned a usable address")]
    NoPublicIp,

    #[error("Home directory not found")]
    HomeDirNotFound,

    #[error("Log location {0:?} does not exist")]
    LocationNotFound(PathBuf),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Command exited with {0}")]
    CommandFailed(std::process::ExitStatus),

    #[error("Logging task panicked")]
    TaskPanicked,
}

pub type Result<T> = std::result::Result<T, OplError>;
