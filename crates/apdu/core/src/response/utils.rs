//! Helpers for splitting a raw R-APDU into payload and status word.

use bytes::Bytes;

use super::error::ResponseError;
use super::status::StatusWord;

/// Split a raw response into `(status, payload)`.
///
/// The last two bytes of `data` are the status word; anything preceding
/// them is the payload, or `None` if there is nothing but the status word.
pub fn extract_status_and_payload(
    data: &Bytes,
) -> Result<(StatusWord, Option<Bytes>), ResponseError> {
    if data.len() < 2 {
        return Err(ResponseError::BufferTooSmall);
    }

    let split = data.len() - 2;
    let status = StatusWord::new(data[split], data[split + 1]);
    let payload = if split == 0 {
        None
    } else {
        Some(data.slice(0..split))
    };

    Ok((status, payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_payload_and_status() {
        let data = Bytes::from_static(&[0x01, 0x02, 0x03, 0x90, 0x00]);
        let (status, payload) = extract_status_and_payload(&data).unwrap();
        assert!(status.is_success());
        assert_eq!(payload.unwrap(), Bytes::from_static(&[0x01, 0x02, 0x03]));
    }

    #[test]
    fn status_only_has_no_payload() {
        let data = Bytes::from_static(&[0x90, 0x00]);
        let (status, payload) = extract_status_and_payload(&data).unwrap();
        assert!(status.is_success());
        assert!(payload.is_none());
    }

    #[test]
    fn too_short_is_an_error() {
        let data = Bytes::from_static(&[0x90]);
        assert!(extract_status_and_payload(&data).is_err());
    }
}
