// src/error.rs

//! Crate-wide error type for the recipe generator

use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating recipes
#[derive(Error, Debug)]
pub enum Error {
    /// Broken generator configuration, names the offending package (fatal)
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// IO error during file operations
    #[error("IO error: {0}")]
    IoError(String),

    /// Failed to parse a requirements or metadata document
    #[error("parse error: {0}")]
    ParseError(String),

    /// Failed to reach or read the package index
    #[error("download error: {0}")]
    DownloadError(String),

    /// Requested template file does not exist
    #[error("template not found: {0}")]
    TemplateNotFound(String),

    /// HTTP client could not be constructed
    #[error("initialization error: {0}")]
    InitError(String),
}
