//! Error types for R-APDU parsing.

use thiserror::Error;

use super::status::StatusWord;

/// A raw status word paired with an optional human-readable hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusError {
    /// The status word returned by the card.
    pub status: StatusWord,
    /// Optional static description of the failure.
    pub message: Option<&'static str>,
}

impl StatusError {
    /// Construct a new status error.
    pub const fn new(status: StatusWord, message: Option<&'static str>) -> Self {
        Self { status, message }
    }

    /// The status word that triggered this error.
    pub const fn status_word(&self) -> StatusWord {
        self.status
    }
}

impl core::fmt::Display for StatusError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.message {
            Some(msg) => write!(f, "status {}: {}", self.status, msg),
            None => write!(f, "status {}", self.status),
        }
    }
}

impl std::error::Error for StatusError {}

/// Errors that can occur while parsing an R-APDU.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// Fewer than two bytes were returned; no status word could be extracted.
    #[error("response too short to contain a status word")]
    BufferTooSmall,

    /// The response carried a non-success status word.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// A response-specific parsing failure with a static description.
    #[error("response parse error: {0}")]
    Parse(&'static str),

    /// A response-specific parsing failure with a dynamic description.
    #[error("{0}")]
    Message(String),
}

impl ResponseError {
    /// Build a parse error from a static message.
    pub const fn parse(message: &'static str) -> Self {
        Self::Parse(message)
    }
}
