//! Transport-layer error types.

use thiserror::Error;

/// Errors surfaced by a [`super::CardTransport`] implementation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Failed to establish or maintain a connection to the reader.
    #[error("connection error: {0}")]
    Connection(String),

    /// The underlying driver rejected the transmission.
    #[error("transmission error: {0}")]
    Transmission(String),

    /// No card is present in the reader.
    #[error("no card present")]
    NoCard,

    /// The reader returned a response that could not fit the caller's buffer.
    #[error("response buffer too small")]
    BufferTooSmall,

    /// The transmit/connect operation timed out.
    #[error("operation timed out")]
    Timeout,

    /// Operation was cancelled before completion.
    #[error("operation cancelled")]
    Cancelled,

    /// Any other transport failure, with a free-form description.
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Build an `Other` error from anything `Display`-able.
    pub fn other<S: ToString>(message: S) -> Self {
        Self::Other(message.to_string())
    }
}
