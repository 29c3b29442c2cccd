//! Crate-level error type for GlobalPlatform operations

use thiserror::Error;

/// Result type for GlobalPlatform operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for GlobalPlatform operations
#[derive(Debug, Error)]
pub enum Error {
    /// The R-APDU could not be parsed
    #[error(transparent)]
    Response(#[from] nexum_apdu_core::ResponseError),

    /// The underlying processor or transport failed
    #[error(transparent)]
    SecureProtocol(#[from] nexum_apdu_core::SecureProtocolError),

    /// SELECT returned an error status or malformed FCI
    #[error(transparent)]
    Select(#[from] crate::commands::select::SelectError),
}
