//! Error types for sfxdeck-core.

use thiserror::Error;

/// Message shown when a request fails for reasons the user cannot act on.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Main error type for the sfxdeck-core library.
#[derive(Error, Debug)]
pub enum Error {
    // List store errors
    #[error("{0}")]
    Validation(String),

    #[error("Sign in required")]
    AuthRequired,

    #[error("{0}")]
    NotFound(String),

    // Playback errors
    #[error("Failed to play sound: {0}")]
    Playback(String),

    #[error("No audio output device available")]
    NoAudioDevice,

    // Network errors
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Server error {0}: {1}")]
    Server(u16, String),

    // Tab storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Config errors
    #[error("Failed to load config '{0}': {1}")]
    ConfigLoad(String, String),

    #[error("Failed to parse config '{0}': {1}")]
    ConfigParse(String, String),

    #[error("Config validation error in '{0}': {1}")]
    ConfigValidation(String, String),

    // Generic errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Text a page shows for this error.
    ///
    /// Validation and not-found messages come from the server (or the local
    /// backend) verbatim; transport and server faults collapse to a generic
    /// message.
    pub fn user_message(&self) -> String {
        match self {
            Error::Validation(msg) | Error::NotFound(msg) => msg.clone(),
            Error::AuthRequired => "Log in to view your session lists.".to_string(),
            Error::Transport(_) | Error::Server(..) | Error::Other(_) => {
                GENERIC_FAILURE_MESSAGE.to_string()
            }
            other => other.to_string(),
        }
    }

    /// Returns true for errors that should send the user to sign in.
    pub fn is_auth_required(&self) -> bool {
        matches!(self, Error::AuthRequired)
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Transport(e.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Storage(e.to_string())
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
