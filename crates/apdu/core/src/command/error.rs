//! Errors for malformed C-APDU construction/parsing.

use thiserror::Error;

/// Errors raised while building or parsing a [`super::Command`].
#[derive(Debug, Error)]
pub enum CommandError {
    /// The raw bytes did not form a well-formed short-form C-APDU.
    #[error("invalid command length: {0}")]
    InvalidLength(usize),
}
