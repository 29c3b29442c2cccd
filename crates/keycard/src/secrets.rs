use base64::prelude::*;
use bytes::{BufMut, Bytes, BytesMut};
use rand::{Rng, RngCore};

use crate::crypto::{PairingToken, generate_pairing_token};

const MAX_PUK_NUMBER: u64 = 999_999_999_999;
const MAX_PIN_NUMBER: u64 = 999_999;
const PIN_LENGTH: usize = 6;
const PUK_LENGTH: usize = 12;

/// Contains the secret data needed to pair a client with and initialize a card.
#[derive(Debug, Clone)]
pub struct Secrets {
    pin: String,
    puk: String,
    pairing_pass: String,
    pairing_token: PairingToken,
}

impl Secrets {
    /// Creates a new Secrets instance with the provided PIN, PUK and pairing password
    pub fn new(pin: &str, puk: &str, pairing_pass: &str) -> Self {
        // Validate input lengths
        assert_eq!(
            pin.len(),
            PIN_LENGTH,
            "PIN must be exactly {} digits",
            PIN_LENGTH
        );
        assert_eq!(
            puk.len(),
            PUK_LENGTH,
            "PUK must be exactly {} digits",
            PUK_LENGTH
        );

        Self {
            pin: pin.to_string(),
            puk: puk.to_string(),
            pairing_pass: pairing_pass.to_string(),
            pairing_token: generate_pairing_token(pairing_pass),
        }
    }

    /// Generates a new Secrets with random PIN, PUK and pairing password
    pub fn generate() -> Self {
        let pairing_pass = generate_pairing_pass();

        let mut rng = rand::rng();
        let puk = rng.random_range(0..MAX_PUK_NUMBER);
        let pin = rng.random_range(0..MAX_PIN_NUMBER);

        Self {
            pin: format!("{:06}", pin),  // Ensure 6 digits with zero padding
            puk: format!("{:012}", puk), // Ensure 12 digits with zero padding
            pairing_pass: pairing_pass.clone(),
            pairing_token: generate_pairing_token(&pairing_pass),
        }
    }

    /// Returns the PIN string
    pub fn pin(&self) -> &str {
        &self.pin
    }

    /// Returns the PUK string
    pub fn puk(&self) -> &str {
        &self.puk
    }

    /// Returns the pairing password string
    pub fn pairing_pass(&self) -> &str {
        &self.pairing_pass
    }

    /// Returns the pairing token generated from the random pairing password
    pub fn pairing_token(&self) -> &PairingToken {
        &self.pairing_token
    }

    /// Encodes the secrets to the exact plaintext INIT body: `pin‖puk‖pairingToken`.
    pub fn to_bytes(&self) -> Bytes {
        let capacity = PIN_LENGTH + PUK_LENGTH + std::mem::size_of::<PairingToken>();
        let mut buffer = BytesMut::with_capacity(capacity);

        debug_assert_eq!(
            self.pin.len(),
            PIN_LENGTH,
            "PIN must be exactly {} digits",
            PIN_LENGTH
        );
        buffer.put_slice(self.pin.as_bytes());

        debug_assert_eq!(
            self.puk.len(),
            PUK_LENGTH,
            "PUK must be exactly {} digits",
            PUK_LENGTH
        );
        buffer.put_slice(self.puk.as_bytes());

        debug_assert_eq!(
            self.pairing_token.len(),
            std::mem::size_of::<PairingToken>(),
            "Pairing token must be exactly {} bytes",
            std::mem::size_of::<PairingToken>()
        );
        buffer.put_slice(&self.pairing_token);

        debug_assert_eq!(buffer.len(), capacity, "Buffer length mismatch");

        buffer.freeze()
    }
}

fn generate_pairing_pass() -> String {
    let mut r = vec![0u8; 12];
    rand::rng().fill_bytes(&mut r);
    BASE64_URL_SAFE_NO_PAD.encode(&r)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secrets_new() {
        let secrets = Secrets::new("123456", "123456789012", "test-pairing-pass");
        assert_eq!(secrets.pin(), "123456");
        assert_eq!(secrets.puk(), "123456789012");
        assert_eq!(secrets.pairing_pass(), "test-pairing-pass");
        assert!(!secrets.pairing_token().is_empty());
    }

    #[test]
    #[should_panic(expected = "PIN must be exactly 6 digits")]
    fn test_invalid_pin_length() {
        Secrets::new("12345", "123456789012", "test-pairing-pass");
    }

    #[test]
    #[should_panic(expected = "PUK must be exactly 12 digits")]
    fn test_invalid_puk_length() {
        Secrets::new("123456", "12345678901", "test-pairing-pass");
    }

    #[test]
    fn test_secrets_generate() {
        let secrets = Secrets::generate();

        // Check PIN format
        assert_eq!(secrets.pin().len(), PIN_LENGTH);
        assert!(secrets.pin().parse::<u64>().is_ok());

        // Check PUK format
        assert_eq!(secrets.puk().len(), PUK_LENGTH);
        assert!(secrets.puk().parse::<u64>().is_ok());

        // Check pairing pass and token
        assert!(!secrets.pairing_pass().is_empty());
        assert_eq!(
            secrets.pairing_token().len(),
            std::mem::size_of::<PairingToken>()
        );
    }

    #[test]
    fn test_to_bytes() {
        let secrets = Secrets::new("123456", "123456789012", "test-pairing-pass");
        let bytes = secrets.to_bytes();

        // PIN (6) + PUK (12) + pairing token (32)
        let expected_length = PIN_LENGTH + PUK_LENGTH + std::mem::size_of::<PairingToken>();
        assert_eq!(bytes.len(), expected_length);

        // Verify PIN bytes
        assert_eq!(&bytes[0..PIN_LENGTH], "123456".as_bytes());

        // Verify PUK bytes
        assert_eq!(
            &bytes[PIN_LENGTH..(PIN_LENGTH + PUK_LENGTH)],
            "123456789012".as_bytes()
        );

        // Verify pairing token
        let token_start = PIN_LENGTH + PUK_LENGTH;
        let token_end = token_start + std::mem::size_of::<PairingToken>();
        assert_eq!(
            &bytes[token_start..token_end],
            secrets.pairing_token().as_slice()
        );
    }

    #[test]
    fn test_generate_pairing_pass() {
        let pass = generate_pairing_pass();
        assert!(!pass.is_empty());

        // Should be valid base64url
        assert!(BASE64_URL_SAFE_NO_PAD.decode(&pass).is_ok());
    }

    #[test]
    fn test_generate_pairing_token() {
        let token = generate_pairing_token("test-pass");
        assert_eq!(token.len(), std::mem::size_of::<PairingToken>());

        // Same input should generate same token
        let token2 = generate_pairing_token("test-pass");
        assert_eq!(token, token2);
    }
}
