//! Error types for the notas application.
//!
//! Everything fallible in the crate funnels into [`NotasError`], so the
//! shell can report any failure with one match-free `{}` print.

use std::io;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, NotasError>;

/// The main error type for the notas application.
#[derive(Error, Debug)]
pub enum NotasError {
    /// Reading or writing a file failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No stored note carries the requested id.
    #[error("Note not found: {id}")]
    NoteNotFound { id: String },

    /// The configuration file exists but could not be used.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    /// Editor launch or round-trip failed.
    #[error("{message}")]
    EditorError { message: String },

    /// Rendering, spooling, or dispatching a print document failed.
    #[error("Print failed: {message}")]
    PrintError { message: String },

    /// A line of shell input could not be tokenized.
    #[error("{message}")]
    CommandError { message: String },

    /// Catch-all for shell-level failures with their own message.
    #[error("{message}")]
    ApplicationError { message: String },
}
