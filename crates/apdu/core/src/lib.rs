//! Core traits and types for constructing, transmitting, and parsing
//! ISO/IEC 7816-4 APDUs, independent of any particular transport or card
//! application.
//!
//! This crate defines the seams the rest of the stack plugs into:
//!
//! - [`command::ApduCommand`] / [`command::Command`] — typed and untyped C-APDUs.
//! - [`response::Response`] / [`response::ApduResponse`] — parsed R-APDUs.
//! - [`transport::CardTransport`] — the byte-level channel to a reader.
//! - [`processor::CommandProcessor`] — a layer between executor and transport,
//!   used to implement secure channels.
//! - [`secure_channel::SecurityLevel`] — what a command needs, and what a
//!   channel currently provides.
//! - [`Executor`] — drives a typed command through a processor and transport.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

pub mod command;
pub mod processor;
pub mod response;
pub mod secure_channel;
pub mod transport;

pub use bytes::Bytes;
pub use command::{ApduCommand, Command, ExpectedLength};
pub use processor::{CommandProcessor, SecureProtocolError};
pub use response::{ApduResponse, Response, ResponseError, StatusWord};
pub use secure_channel::{SecureChannel, SecureChannelProvider, SecurityLevel};
pub use transport::{CardTransport, MockTransport, TransportError};

use core::fmt;

/// Drives a typed [`ApduCommand`] through a [`CommandProcessor`] and a
/// [`CardTransport`], enforcing the command's required security level.
///
/// Every generated command error type carries the two `#[from]` variants
/// that let this trait's bound be satisfied: one wrapping [`ResponseError`]
/// (a malformed R-APDU) and one wrapping [`SecureProtocolError`] (a
/// processor/transport failure, including the secure channel).
pub trait Executor: fmt::Debug {
    /// Execute `command`, returning its typed success or its typed error.
    fn execute<C>(&mut self, command: &C) -> Result<C::Success, C::Error>
    where
        C: ApduCommand,
        C::Error: From<ResponseError> + From<SecureProtocolError>;

    /// The security level currently available to commands sent through this
    /// executor (e.g. from an established secure channel).
    fn security_level(&self) -> SecurityLevel {
        SecurityLevel::none()
    }

    /// Reset the underlying transport, e.g. after a card removal/reinsertion.
    fn reset(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// An [`Executor`] that layers a single, swappable [`CommandProcessor`] over
/// a boxed [`CardTransport`].
pub struct CardExecutor {
    transport: Box<dyn CardTransport>,
    processor: Box<dyn CommandProcessor>,
}

impl fmt::Debug for CardExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardExecutor")
            .field("processor", &self.processor)
            .finish_non_exhaustive()
    }
}

impl CardExecutor {
    /// Wrap `transport` with the identity processor (no secure channel).
    pub fn new(transport: impl CardTransport + 'static) -> Self {
        Self::with_processor(transport, Box::new(processor::IdentityProcessor))
    }

    /// Wrap `transport` with a specific processor, e.g. a secure channel.
    pub fn with_processor(
        transport: impl CardTransport + 'static,
        processor: Box<dyn CommandProcessor>,
    ) -> Self {
        Self {
            transport: Box::new(transport),
            processor,
        }
    }

    /// Replace the active processor, e.g. once a secure channel has been
    /// negotiated over a previously plain transport.
    pub fn set_processor(&mut self, processor: Box<dyn CommandProcessor>) {
        self.processor = processor;
    }

    /// The transport this executor currently drives.
    pub fn transport(&mut self) -> &mut dyn CardTransport {
        self.transport.as_mut()
    }
}

impl Executor for CardExecutor {
    fn execute<C>(&mut self, command: &C) -> Result<C::Success, C::Error>
    where
        C: ApduCommand,
        C::Error: From<ResponseError> + From<SecureProtocolError>,
    {
        let required = command.required_security_level();
        let apdu = command.to_command();

        // Commands that require no security level (e.g. GET DATA, pinless SIGN)
        // are sent in the clear, regardless of whatever processor is installed:
        // a command explicitly declaring `none()` is one the protocol defines
        // to bypass the secure channel, not one that happens to need less of it.
        let response = if required.is_none() {
            processor::IdentityProcessor.do_process_command(&apdu, self.transport.as_mut())?
        } else {
            let current = self.processor.security_level();
            if !current.satisfies(&required) {
                return Err(SecureProtocolError::protocol(
                    "command requires a security level the channel does not provide",
                )
                .into());
            }
            self.processor
                .do_process_command(&apdu, self.transport.as_mut())?
        };
        command.parse_response(response)
    }

    fn security_level(&self) -> SecurityLevel {
        self.processor.security_level()
    }

    fn reset(&mut self) -> Result<(), TransportError> {
        self.transport.reset()
    }
}

/// An [`Executor`] that also exposes [`SecureChannel`] lifecycle operations.
///
/// The keycard secure channel implements both [`CommandProcessor`] and
/// [`SecureChannel`]; this trait lets callers reach the latter through an
/// executor without downcasting.
pub trait SecureChannelExecutor: Executor {
    /// Whether the underlying secure channel is currently established.
    fn is_secure_channel_open(&self) -> bool;

    /// Install a freshly negotiated secure channel as this executor's
    /// processor.
    fn set_secure_channel(&mut self, channel: Box<dyn SecureChannel>);

    /// Tear down the secure channel, reverting to plain communication.
    fn close_secure_channel(&mut self) -> Result<(), SecureProtocolError>;
}

impl SecureChannelExecutor for CardExecutor {
    fn is_secure_channel_open(&self) -> bool {
        !self.processor.security_level().is_none()
    }

    fn set_secure_channel(&mut self, channel: Box<dyn SecureChannel>) {
        self.processor = channel;
    }

    fn close_secure_channel(&mut self) -> Result<(), SecureProtocolError> {
        self.processor = Box::new(processor::IdentityProcessor);
        Ok(())
    }
}

/// Re-exports the traits and types most callers need in scope to use a
/// generated `apdu_pair!` command end to end.
pub mod prelude {
    pub use crate::command::{ApduCommand, Command, ExpectedLength};
    pub use crate::processor::{CommandProcessor, SecureProtocolError};
    pub use crate::response::{ApduResponse, Response, ResponseError, StatusWord};
    pub use crate::secure_channel::{SecureChannel, SecureChannelProvider, SecurityLevel};
    pub use crate::transport::{CardTransport, TransportError};
    pub use crate::{CardExecutor, Executor, SecureChannelExecutor};
}
