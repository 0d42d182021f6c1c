use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeyImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to open keyring context: {0}")]
    Context(String),

    #[error("Keyring is locked by another process: {}", .0.display())]
    Locked(PathBuf),

    #[error("No valid OpenPGP data found")]
    NoData,

    #[error("Key import failed: {0}")]
    Import(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0}")]
    Unsupported(String),
}

pub type Result<T> = std::result::Result<T, KeyImportError>;
