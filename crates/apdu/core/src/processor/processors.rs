//! Stock [`CommandProcessor`] implementations.

use tracing::trace;

use super::CommandProcessor;
use super::error::SecureProtocolError;
use crate::command::Command;
use crate::response::Response;
use crate::secure_channel::SecurityLevel;
use crate::transport::CardTransport;

/// A processor that forwards commands to the transport unmodified.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityProcessor;

impl CommandProcessor for IdentityProcessor {
    fn do_process_command(
        &mut self,
        command: &Command,
        transport: &mut dyn CardTransport,
    ) -> Result<Response, SecureProtocolError> {
        let bytes = transport.transmit_raw(&command.to_bytes())?;
        Ok(Response::from_bytes(&bytes)?)
    }
}

/// A processor that transparently follows `61xx` "more data available"
/// status words with `GET RESPONSE` (`0xC0`) commands, accumulating the
/// payload until the card signals completion or `max_chain` is exceeded.
#[derive(Debug, Clone, Copy)]
pub struct GetResponseProcessor {
    /// Maximum number of `GET RESPONSE` round-trips to follow.
    pub max_chain: usize,
    /// Class byte to use for the synthesized `GET RESPONSE` commands.
    pub cla: u8,
}

impl Default for GetResponseProcessor {
    fn default() -> Self {
        Self {
            max_chain: 10,
            cla: 0x00,
        }
    }
}

impl CommandProcessor for GetResponseProcessor {
    fn do_process_command(
        &mut self,
        command: &Command,
        transport: &mut dyn CardTransport,
    ) -> Result<Response, SecureProtocolError> {
        let bytes = transport.transmit_raw(&command.to_bytes())?;
        let mut response = Response::from_bytes(&bytes)?;

        let mut chained = 0;
        let mut data = response.payload().clone().unwrap_or_default();

        while response.status().sw1 == 0x61 {
            chained += 1;
            if chained > self.max_chain {
                return Err(SecureProtocolError::ChainLimitExceeded);
            }

            let le = response.status().sw2;
            let get_response = Command::new(self.cla, 0xC0, 0x00, 0x00).with_le(le);
            let bytes = transport.transmit_raw(&get_response.to_bytes())?;
            response = Response::from_bytes(&bytes)?;

            if let Some(chunk) = response.payload() {
                let mut combined = Vec::with_capacity(data.len() + chunk.len());
                combined.extend_from_slice(&data);
                combined.extend_from_slice(chunk);
                data = combined.into();
            }

            trace!(chained, "followed GET RESPONSE chain");
        }

        Ok(Response::new(
            if data.is_empty() { None } else { Some(data) },
            response.status(),
        ))
    }

    fn security_level(&self) -> SecurityLevel {
        SecurityLevel::none()
    }
}
