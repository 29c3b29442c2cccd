//! C-APDU construction and the [`ApduCommand`] trait implemented by every
//! generated command type.

pub mod error;

use bytes::Bytes;
use core::fmt;

pub use error::CommandError;

use crate::response::{Response, error::ResponseError};
use crate::secure_channel::SecurityLevel;

/// The wire type of the `Le` (expected response length) field.
///
/// Short-form APDUs encode `Le` in a single byte; the `longer_payloads`
/// feature widens this for extended-length APDUs, which this protocol does
/// not use but which the type is kept generic over for forward compatibility.
#[cfg(not(feature = "longer_payloads"))]
pub type ExpectedLength = u8;

/// The wire type of the `Le` (expected response length) field.
#[cfg(feature = "longer_payloads")]
pub type ExpectedLength = u16;

/// A command that can be encoded to a C-APDU and whose response can be
/// parsed into a typed success or error value.
///
/// Implementations are generated by the `apdu_pair!` macro; this trait is
/// the seam an [`crate::Executor`] dispatches through.
pub trait ApduCommand: fmt::Debug {
    /// The type produced when the card responds with a mapped success SW.
    type Success;
    /// The type produced when the card responds with a mapped error SW.
    type Error: fmt::Debug;

    /// Instruction class byte.
    fn class(&self) -> u8;
    /// Instruction byte.
    fn instruction(&self) -> u8;
    /// First parameter byte.
    fn p1(&self) -> u8;
    /// Second parameter byte.
    fn p2(&self) -> u8;
    /// Command data, if any.
    fn data(&self) -> Option<&[u8]>;
    /// Expected response length (`Le`), if the command sets one.
    fn expected_length(&self) -> Option<ExpectedLength> {
        None
    }

    /// The secure-channel security level this command requires before it may
    /// be sent. Defaults to no requirement.
    fn required_security_level(&self) -> SecurityLevel {
        SecurityLevel::none()
    }

    /// Encode this command as a generic [`Command`].
    fn to_command(&self) -> Command {
        let mut command = Command::new(self.class(), self.instruction(), self.p1(), self.p2());
        if let Some(data) = self.data() {
            command = command.with_data(data.to_vec());
        }
        if let Some(le) = self.expected_length() {
            command = command.with_le(le);
        }
        command
    }

    /// Parse a raw R-APDU into this command's typed result.
    fn parse_response_raw(
        &self,
        data: Bytes,
    ) -> Result<Self::Success, Self::Error>
    where
        Self::Error: From<ResponseError>,
    {
        let response = Response::from_bytes(&data).map_err(Self::Error::from)?;
        self.parse_response(response)
    }

    /// Parse a parsed [`Response`] into this command's typed result.
    fn parse_response(&self, response: Response) -> Result<Self::Success, Self::Error>;
}

/// A generic, untyped APDU command: `CLA INS P1 P2 [LC DATA] [LE]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    cla: u8,
    ins: u8,
    p1: u8,
    p2: u8,
    data: Option<Bytes>,
    le: Option<ExpectedLength>,
}

impl Command {
    /// Construct a command with no data and no `Le`.
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Construct a command carrying `data`.
    pub fn new_with_data(cla: u8, ins: u8, p1: u8, p2: u8, data: impl Into<Bytes>) -> Self {
        Self::new(cla, ins, p1, p2).with_data(data)
    }

    /// Set this command's data field.
    #[must_use]
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set this command's expected response length.
    #[must_use]
    pub const fn with_le(mut self, le: ExpectedLength) -> Self {
        self.le = Some(le);
        self
    }

    /// Instruction class byte.
    pub const fn class(&self) -> u8 {
        self.cla
    }

    /// Instruction byte.
    pub const fn instruction(&self) -> u8 {
        self.ins
    }

    /// First parameter byte.
    pub const fn p1(&self) -> u8 {
        self.p1
    }

    /// Second parameter byte.
    pub const fn p2(&self) -> u8 {
        self.p2
    }

    /// Command data, if any.
    pub fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Expected response length, if set.
    pub const fn expected_length(&self) -> Option<ExpectedLength> {
        self.le
    }

    /// The number of bytes [`Command::to_bytes`] will produce.
    pub fn command_length(&self) -> usize {
        4 + self.data.as_ref().map_or(0, |d| 1 + d.len()) + usize::from(self.le.is_some())
    }

    /// Serialize to a short-form C-APDU.
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = Vec::with_capacity(self.command_length());
        buf.push(self.cla);
        buf.push(self.ins);
        buf.push(self.p1);
        buf.push(self.p2);
        if let Some(data) = &self.data {
            buf.push(data.len() as u8);
            buf.extend_from_slice(data);
        }
        if let Some(le) = self.le {
            buf.push(le as u8);
        }
        Bytes::from(buf)
    }

    /// Parse a short-form C-APDU.
    pub fn from_bytes(data: &[u8]) -> Result<Self, CommandError> {
        if data.len() < 4 {
            return Err(CommandError::InvalidLength(data.len()));
        }

        let (cla, ins, p1, p2) = (data[0], data[1], data[2], data[3]);
        let rest = &data[4..];

        match rest.len() {
            0 => Ok(Self::new(cla, ins, p1, p2)),
            1 => Ok(Self::new(cla, ins, p1, p2).with_le(rest[0] as ExpectedLength)),
            _ => {
                let lc = rest[0] as usize;
                let body = &rest[1..];
                if body.len() == lc {
                    Ok(Self::new_with_data(cla, ins, p1, p2, body.to_vec()))
                } else if body.len() == lc + 1 {
                    Ok(Self::new_with_data(cla, ins, p1, p2, body[..lc].to_vec())
                        .with_le(body[lc] as ExpectedLength))
                } else {
                    Err(CommandError::InvalidLength(data.len()))
                }
            }
        }
    }
}

impl ApduCommand for Command {
    type Success = Response;
    type Error = ResponseError;

    fn class(&self) -> u8 {
        self.cla
    }

    fn instruction(&self) -> u8 {
        self.ins
    }

    fn p1(&self) -> u8 {
        self.p1
    }

    fn p2(&self) -> u8 {
        self.p2
    }

    fn data(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    fn expected_length(&self) -> Option<ExpectedLength> {
        self.le
    }

    fn to_command(&self) -> Command {
        self.clone()
    }

    fn parse_response(&self, response: Response) -> Result<Self::Success, Self::Error> {
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = Command::new_with_data(0x00, 0xA4, 0x04, 0x00, vec![0xA0, 0x00]);
        assert_eq!(cmd.to_bytes(), Bytes::from_static(&[0x00, 0xA4, 0x04, 0x00, 0x02, 0xA0, 0x00]));
    }

    #[test]
    fn test_command_length() {
        let cmd = Command::new(0x80, 0xFD, 0xAA, 0x55);
        assert_eq!(cmd.command_length(), 4);
        assert_eq!(cmd.to_bytes(), Bytes::from_static(&[0x80, 0xFD, 0xAA, 0x55]));
    }

    #[test]
    fn test_command_from_bytes() {
        let bare = Command::from_bytes(&[0x80, 0xFD, 0xAA, 0x55]).unwrap();
        assert!(bare.data().is_none());
        assert!(bare.expected_length().is_none());

        let with_le = Command::from_bytes(&[0x00, 0xCA, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(with_le.expected_length(), Some(0));

        let with_data = Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00, 0x02, 0xAA, 0xBB]).unwrap();
        assert_eq!(with_data.data(), Some(&[0xAA, 0xBB][..]));

        let with_data_and_le =
            Command::from_bytes(&[0x00, 0xA4, 0x04, 0x00, 0x02, 0xAA, 0xBB, 0x00]).unwrap();
        assert_eq!(with_data_and_le.data(), Some(&[0xAA, 0xBB][..]));
        assert_eq!(with_data_and_le.expected_length(), Some(0));

        assert!(Command::from_bytes(&[0x00, 0xA4]).is_err());
    }
}
