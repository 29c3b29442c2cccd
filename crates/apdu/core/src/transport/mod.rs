//! The transport seam between typed commands and a physical (or mocked) reader.

pub mod error;

use bytes::Bytes;
use core::fmt;
use tracing::trace;

pub use error::TransportError;

/// A byte-level channel to a smart card.
///
/// Implementations own the underlying reader handle (a PC/SC card handle, or
/// a scripted queue of responses in tests). The core never constructs one of
/// these on its own; it is supplied by the embedder.
pub trait CardTransport: fmt::Debug + Send {
    /// Send a raw C-APDU and return the raw R-APDU bytes.
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError>;

    /// Reset the transport's connection to the card, if meaningful.
    fn reset(&mut self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Blanket helper so `&mut dyn CardTransport` calls can be traced uniformly.
pub fn transmit_traced(
    transport: &mut dyn CardTransport,
    command: &[u8],
) -> Result<Bytes, TransportError> {
    trace!(len = command.len(), "transmitting APDU");
    let response = transport.transmit_raw(command)?;
    trace!(len = response.len(), "received APDU response");
    Ok(response)
}

/// A scripted transport used by tests: returns queued responses in order and
/// records every command it was asked to send.
#[derive(Debug, Default)]
pub struct MockTransport {
    responses: std::collections::VecDeque<Bytes>,
    commands: Vec<Bytes>,
}

impl MockTransport {
    /// Create an empty mock transport.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw response to be returned by the next `transmit_raw` call.
    pub fn with_response(mut self, response: impl Into<Bytes>) -> Self {
        self.responses.push_back(response.into());
        self
    }

    /// Queue a bare `0x9000` success response.
    pub fn with_success(self) -> Self {
        self.with_response(Bytes::from_static(&[0x90, 0x00]))
    }

    /// All commands transmitted so far, in order.
    pub fn commands(&self) -> &[Bytes] {
        &self.commands
    }

    /// The most recently transmitted command, if any.
    pub fn last_command(&self) -> Option<&Bytes> {
        self.commands.last()
    }
}

impl CardTransport for MockTransport {
    fn transmit_raw(&mut self, command: &[u8]) -> Result<Bytes, TransportError> {
        self.commands.push(Bytes::copy_from_slice(command));
        self.responses
            .pop_front()
            .ok_or_else(|| TransportError::other("mock transport has no queued response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_queued_responses_in_order() {
        let mut transport = MockTransport::new()
            .with_response(Bytes::from_static(&[0x01, 0x90, 0x00]))
            .with_success();

        let first = transport.transmit_raw(&[0x00, 0xA4]).unwrap();
        assert_eq!(first, Bytes::from_static(&[0x01, 0x90, 0x00]));

        let second = transport.transmit_raw(&[0x80, 0xFD]).unwrap();
        assert_eq!(second, Bytes::from_static(&[0x90, 0x00]));

        assert_eq!(transport.commands().len(), 2);
    }

    #[test]
    fn errors_when_responses_run_out() {
        let mut transport = MockTransport::new();
        assert!(transport.transmit_raw(&[0x00]).is_err());
    }
}
