//! Errors for command processors, including secure-channel processors.

use thiserror::Error;

use crate::response::error::ResponseError;
use crate::transport::error::TransportError;

/// Error type returned by a [`super::CommandProcessor`].
///
/// Named for the secure channel specifically (rather than `ProcessorError`)
/// because in this protocol the only non-trivial processor is the secure
/// channel; a plain pass-through processor never fails beyond transport.
#[derive(Debug, Error)]
pub enum SecureProtocolError {
    /// The underlying transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The raw R-APDU could not be parsed.
    #[error(transparent)]
    Response(#[from] ResponseError),

    /// Authentication (mutual authentication, pairing cryptogram) failed.
    #[error("authentication failed: {0}")]
    AuthenticationFailed(&'static str),

    /// Session/channel state was invalid for the requested operation.
    #[error("session error: {0}")]
    Session(&'static str),

    /// A protocol invariant was violated (bad length, bad MAC, bad padding).
    #[error("protocol error: {0}")]
    Protocol(&'static str),

    /// A GET RESPONSE chain exceeded its configured limit.
    #[error("chain limit exceeded")]
    ChainLimitExceeded,

    /// Any other failure with a dynamic description.
    #[error("{0}")]
    Other(String),
}

impl SecureProtocolError {
    /// Build a session error from a static message.
    pub const fn session(message: &'static str) -> Self {
        Self::Session(message)
    }

    /// Build a protocol error from a static message.
    pub const fn protocol(message: &'static str) -> Self {
        Self::Protocol(message)
    }
}
