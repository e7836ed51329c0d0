//! Error types for registration, processing and building.

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned when registering a resource.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Invalid resource name `{name}`: {reason}")]
    InvalidName { name: String, reason: String },

    #[error(
        "Resource `{name}`, when sanitized, has the same file name as `{conflicting}` ({filename})"
    )]
    NameCollision {
        name: String,
        conflicting: String,
        filename: String,
    },
}

/// Errors from processing a single resource.
///
/// These never abort a build: the pipeline logs them and skips the resource.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to compress payload: {0}")]
    Compress(#[source] std::io::Error),

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors that abort a build.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Failed to clear output directory {path}: {source}")]
    ClearOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write index module {path}: {source}")]
    WriteIndex {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Processing task did not complete: {reason}")]
    TaskFailed { reason: String },
}

pub type BuildResult<T> = Result<T, BuildError>;
