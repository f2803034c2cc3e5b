//! # Error Handling
//!
//! This module defines the centralized error handling mechanism for the
//! `aug` application. It uses the `thiserror` library to create an
//! `Error` enum covering every anticipated failure mode of the overlay
//! pipeline, providing clear and descriptive error messages.
//!
//! ## Key Components
//!
//! - **`Error`**: The main enum that represents all possible errors that can
//!   occur within the application. Each variant corresponds to a specific
//!   type of error and carries the path (or context) that failed.
//!
//! - **`Result<T>`**: A type alias for `std::result::Result<T, Error>`, used
//!   throughout the application to simplify function signatures.
//!
//! Every I/O failure raised while listing, stating, reading a manifest,
//! copying, linking, or creating a directory aborts the whole run; there is
//! no retry and no partial-success mode. A half-written destination tree is
//! a possible outcome on failure and is not cleaned up automatically.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Main error type for aug operations
#[derive(Error, Debug)]
pub enum Error {
    /// An origin path (or one of its entries) does not exist.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Access to a path was denied by the operating system.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// A path expected to be a directory is not one.
    #[error("Not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// A destination entry already exists. Materialization uses
    /// exclusive-create semantics and never silently overwrites.
    #[error("Destination already exists: {path}")]
    AlreadyExists { path: PathBuf },

    /// An ignore manifest could not be read.
    ///
    /// Malformed manifest *lines* are skipped with a warning; this variant
    /// is for manifests that cannot be read at all.
    #[error("Ignore manifest error at {path}: {message}")]
    Manifest { path: PathBuf, message: String },

    /// Any other I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl Error {
    /// Classify an `io::Error` raised against a known path.
    ///
    /// Maps the error kinds the overlay pipeline cares about to their
    /// dedicated variants so callers (and tests) can match on them; anything
    /// else stays a wrapped `Io`.
    pub fn from_io(err: io::Error, path: &Path) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Error::NotFound {
                path: path.to_path_buf(),
            },
            io::ErrorKind::PermissionDenied => Error::PermissionDenied {
                path: path.to_path_buf(),
            },
            io::ErrorKind::NotADirectory => Error::NotADirectory {
                path: path.to_path_buf(),
            },
            io::ErrorKind::AlreadyExists => Error::AlreadyExists {
                path: path.to_path_buf(),
            },
            _ => Error::Io(err),
        }
    }
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
