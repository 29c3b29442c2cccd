//! Command processors: the seam between a typed executor and the transport,
//! used to layer secure-channel encryption/MAC over raw APDU bytes.

pub mod error;
pub mod processors;

pub use error::SecureProtocolError;
pub use processors::{GetResponseProcessor, IdentityProcessor};

use crate::command::Command;
use crate::response::Response;
use crate::secure_channel::SecurityLevel;
use crate::transport::CardTransport;

/// A layer that transforms a command on its way to the transport and/or a
/// response on its way back — most notably, the keycard secure channel.
pub trait CommandProcessor: core::fmt::Debug {
    /// Send `command` through `transport`, applying whatever transformation
    /// this processor is responsible for, and return the (decoded) response.
    fn do_process_command(
        &mut self,
        command: &Command,
        transport: &mut dyn CardTransport,
    ) -> Result<Response, SecureProtocolError>;

    /// The security level this processor currently provides.
    fn security_level(&self) -> SecurityLevel {
        SecurityLevel::none()
    }
}
