use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unsupported database driver: {0}")]
    UnsupportedDriver(String),

    #[error("Could not list tables: {0}")]
    CatalogUnavailable(String),

    #[error("Failed to decompress input file {}: {source}", .path.display())]
    DecompressFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Database dump failed: {message} (command: {command})")]
    DumpFailure { command: String, message: String },

    #[error("Query failed: {message} (command: {command})")]
    QueryFailure { command: String, message: String },

    #[error("Failed to create database '{database}': {message}")]
    CreateDatabaseFailure {
        database: String,
        command: Option<String>,
        message: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl AppError {
    /// The shell command that was being run when the error occurred, if any.
    pub fn command(&self) -> Option<&str> {
        match self {
            AppError::DumpFailure { command, .. } | AppError::QueryFailure { command, .. } => {
                Some(command)
            }
            AppError::CreateDatabaseFailure { command, .. } => command.as_deref(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
