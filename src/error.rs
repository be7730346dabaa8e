//! Unified error types for flipdeck with fail-open handling.
//!
//! Study progress must never be lost to an infrastructure hiccup. Storage
//! and config failures are logged and replaced with safe defaults (a fresh
//! deck, an empty queue) instead of aborting the session.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for flipdeck operations.
#[derive(Error, Debug)]
pub enum FlipdeckError {
    /// I/O errors from snapshot, deck or config files.
    #[error("storage error at {path}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// JSON or TOML (de)serialization errors.
    #[error("serialization error: {message}")]
    Serde { message: String },

    /// Configuration loading errors.
    #[error("config error: {message}")]
    Config { message: String },

    /// Source deck could not be read or is malformed.
    #[error("deck error: {message}")]
    Deck { message: String },

    /// Action not allowed in the current session phase.
    #[error("invalid state: {message}")]
    InvalidState { message: String },

    /// A destructive action was requested without confirmation.
    #[error("confirmation required: {action}")]
    ConfirmationRequired { action: String },
}

/// A specialized Result type for flipdeck operations.
pub type Result<T> = std::result::Result<T, FlipdeckError>;

impl FlipdeckError {
    /// Create a storage error from an I/O error.
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    /// Create a serialization error.
    pub fn serde(message: impl Into<String>) -> Self {
        Self::Serde {
            message: message.into(),
        }
    }

    /// Create a config error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a deck error.
    pub fn deck(message: impl Into<String>) -> Self {
        Self::Deck {
            message: message.into(),
        }
    }

    /// Create an invalid state error.
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a confirmation-required error for the named action.
    pub fn confirmation_required(action: impl Into<String>) -> Self {
        Self::ConfirmationRequired {
            action: action.into(),
        }
    }
}

impl From<io::Error> for FlipdeckError {
    fn from(err: io::Error) -> Self {
        Self::Storage {
            path: PathBuf::new(),
            source: err,
        }
    }
}

impl From<serde_json::Error> for FlipdeckError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Fail-open error handling: log the error and continue with a fallback.
pub trait FailOpen<T> {
    /// Handle an error by logging a warning and returning the default value.
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default;
}

impl<T> FailOpen<T> for Result<T> {
    fn fail_open_default(self, context: &str) -> T
    where
        T: Default,
    {
        match self {
            Ok(value) => value,
            Err(err) => {
                tracing::warn!("{}: {} (fail-open: using default)", context, err);
                T::default()
            }
        }
    }
}

/// Exit codes for the flipdeck CLI.
pub mod exit_codes {
    /// The command succeeded.
    pub const SUCCESS: i32 = 0;

    /// The command ran but reported a failure (e.g. unconfirmed reset).
    pub const ERROR: i32 = 1;

    /// The process panicked.
    pub const CRASH: i32 = 3;
}
