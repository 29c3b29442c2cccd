use std::fmt;

use iso7816_tlv::ber::{Tag, Tlv};
use nexum_apdu_globalplatform::commands::select::SelectOk;

use crate::constants::tags;
use crate::types::ApplicationInfo;

impl TryFrom<SelectOk> for ParsedSelectOk {
    type Error = crate::Error;

    fn try_from(response: SelectOk) -> Result<Self, Self::Error> {
        match response {
            SelectOk::Success { fci } => ParsedSelectOk::try_from(fci.as_slice()),
        }
    }
}

/// Outcome of parsing a SELECT response's FCI.
///
/// The card reports its state in the leading tag of the FCI: `0xA4` wraps a
/// full [`ApplicationInfo`] template (card has been through INIT), while a
/// bare `0x80` carries only the card's secure-channel public key (pre-INIT,
/// or no pairing slots have ever been used).
#[derive(Debug)]
pub enum ParsedSelectOk {
    /// Card has been initialized; full application info is available.
    Initialized(ApplicationInfo),
    /// Card has not been initialized yet; only the public key (if any) is known.
    Uninitialized(Option<k256::PublicKey>),
}

impl fmt::Display for ParsedSelectOk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParsedSelectOk::Initialized(info) => write!(f, "{}", info),
            ParsedSelectOk::Uninitialized(maybe_key) => {
                writeln!(f, "Uninitialized card:")?;
                match &maybe_key {
                    Some(key) => write!(f, "  Public Key: {:#?}", key),
                    None => write!(f, "  Public Key: None"),
                }
            }
        }
    }
}

impl TryFrom<&[u8]> for ParsedSelectOk {
    type Error = crate::Error;

    fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
        let fci = Tlv::from_bytes(value)?;

        let application_info = Tag::try_from(tags::TEMPLATE_APPLICATION_INFO)?;
        let ecc_public_key = Tag::try_from(tags::ECC_PUBLIC_KEY)?;

        if fci.tag() == &application_info {
            Ok(ParsedSelectOk::Initialized(ApplicationInfo::try_from(
                &fci,
            )?))
        } else if fci.tag() == &ecc_public_key {
            Ok(ParsedSelectOk::Uninitialized(
                *crate::types::PublicKey::try_from(&fci)?,
            ))
        } else {
            Err(Self::Error::InvalidData("Invalid Tag"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pre_init_response() {
        // secp256k1 generator point, uncompressed SEC1 encoding.
        let generator = alloy_primitives::hex!(
            "0479BE667EF9DCBBAC55A06295CE870B07029BFCDB2DCE28D959F2815B16F81798483ADA7726A3C4655DA4FBFC0E1108A8FD17B448A68554199C47D08FFB10D4B8"
        );
        let mut fci = vec![0x80, 0x41];
        fci.extend_from_slice(&generator);

        let parsed = ParsedSelectOk::try_from(fci.as_slice()).unwrap();
        match parsed {
            ParsedSelectOk::Uninitialized(Some(key)) => {
                assert_eq!(key.to_sec1_bytes().as_ref(), &generator[..]);
            }
            other => panic!("expected Uninitialized(Some(_)), got {other:?}"),
        }
    }
}
