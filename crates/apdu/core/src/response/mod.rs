//! R-APDU response types.

pub mod error;
pub mod status;
pub mod utils;

use bytes::Bytes;

pub use error::ResponseError;
pub use status::StatusWord;

/// Common behavior shared by response-like types.
pub trait ApduResponse {
    /// The response payload, if any (everything but the trailing status word).
    fn payload(&self) -> &Option<Bytes>;

    /// The status word terminating the response.
    fn status(&self) -> StatusWord;

    /// Whether the status word indicates success (`0x9000`).
    fn is_success(&self) -> bool {
        self.status().is_success()
    }
}

/// A parsed R-APDU: optional payload plus a status word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    payload: Option<Bytes>,
    status: StatusWord,
}

impl Response {
    /// Construct a response from its parts.
    pub const fn new(payload: Option<Bytes>, status: StatusWord) -> Self {
        Self { payload, status }
    }

    /// Construct a successful (`0x9000`) response carrying `payload`.
    pub const fn success(payload: Option<Bytes>) -> Self {
        Self::new(payload, status::common::OK)
    }

    /// Construct a failing response with the given status word and no payload.
    pub const fn error(status: StatusWord) -> Self {
        Self::new(None, status)
    }

    /// Parse a raw R-APDU into a [`Response`].
    pub fn from_bytes(data: &[u8]) -> Result<Self, ResponseError> {
        let bytes = Bytes::copy_from_slice(data);
        let (status, payload) = utils::extract_status_and_payload(&bytes)?;
        Ok(Self::new(payload, status))
    }

    /// `(sw1, sw2)` of this response's status word.
    pub const fn status_tuple(&self) -> (u8, u8) {
        (self.status.sw1, self.status.sw2)
    }

    /// Turn this response into `Ok(payload)` on success or `Err(StatusError)` otherwise.
    pub fn into_bytes_result(self) -> Result<Option<Bytes>, error::StatusError> {
        if self.is_success() {
            Ok(self.payload)
        } else {
            Err(error::StatusError::new(self.status, None))
        }
    }
}

impl ApduResponse for Response {
    fn payload(&self) -> &Option<Bytes> {
        &self.payload
    }

    fn status(&self) -> StatusWord {
        self.status
    }
}

impl TryFrom<&[u8]> for Response {
    type Error = ResponseError;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(data)
    }
}

impl TryFrom<Bytes> for Response {
    type Error = ResponseError;

    fn try_from(data: Bytes) -> Result<Self, Self::Error> {
        Self::from_bytes(&data)
    }
}

impl From<Response> for Bytes {
    fn from(response: Response) -> Self {
        let mut buf = Vec::with_capacity(response.payload.as_ref().map_or(0, Bytes::len) + 2);
        if let Some(payload) = response.payload {
            buf.extend_from_slice(&payload);
        }
        buf.push(response.status.sw1);
        buf.push(response.status.sw2);
        Bytes::from(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_success_with_payload() {
        let response = Response::from_bytes(&[0xDE, 0xAD, 0x90, 0x00]).unwrap();
        assert!(response.is_success());
        assert_eq!(response.payload(), &Some(Bytes::from_static(&[0xDE, 0xAD])));
    }

    #[test]
    fn parses_failure_without_payload() {
        let response = Response::from_bytes(&[0x6A, 0x86]).unwrap();
        assert!(!response.is_success());
        assert_eq!(response.status(), StatusWord::new(0x6A, 0x86));
        assert!(response.payload().is_none());
    }

    #[test]
    fn round_trips_through_bytes() {
        let response = Response::success(Some(Bytes::from_static(&[0x01, 0x02])));
        let bytes: Bytes = response.clone().into();
        assert_eq!(Response::from_bytes(&bytes).unwrap(), response);
    }
}
