//! Error types for sail-ports

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SailError {
    #[error("Suffix out of range: {0}")]
    SuffixOutOfRange(String),

    #[error("Suffix {suffix} is already in use by another project: {path}")]
    SuffixCollision { suffix: u32, path: String },

    #[error("Failed to read port registry {path}: {reason}")]
    StoreRead { path: String, reason: String },

    #[error("Failed to write port registry {path}: {reason}")]
    StoreWrite { path: String, reason: String },

    #[error("Project not registered: {0}")]
    ProjectNotRegistered(String),

    #[error("Home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Env file error: {0}")]
    EnvFile(String),

    #[error("Sail binary not found at {0}")]
    SailNotFound(String),

    #[error("Launcher error: {0}")]
    Launcher(String),

    #[error("Input closed before a suffix was confirmed")]
    InputClosed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SailError>;
