use std::fmt;

use iso7816_tlv::ber::{Tlv, Value};

/// Capability flags for the keycard
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Capability {
    SecureChannel = 0x01,
    KeyManagement = 0x02,
    CredentialsManagement = 0x04,
    Ndef = 0x08,
}

/// Capabilities flags container
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capabilities(u8);

impl fmt::Display for Capabilities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut capabilities = Vec::new();
        if self.has_capability(Capability::SecureChannel) {
            capabilities.push("Secure Channel");
        }
        if self.has_capability(Capability::KeyManagement) {
            capabilities.push("Key Management");
        }
        if self.has_capability(Capability::CredentialsManagement) {
            capabilities.push("Credentials Management");
        }
        if self.has_capability(Capability::Ndef) {
            capabilities.push("NDEF");
        }
        write!(f, "{}", capabilities.join(", "))
    }
}

impl Capabilities {
    pub fn new(capabilities: &[Capability]) -> Self {
        Self(capabilities.iter().fold(0, |flags, &cap| flags | cap as u8))
    }

    /// No capabilities known yet (e.g. before SELECT has been parsed).
    pub fn empty() -> Self {
        Self(0)
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.0 & capability as u8 != 0
    }

    /// Fails with [`crate::Error::CapabilityNotSupported`] unless `capability` is present.
    pub fn require_capability(&self, capability: Capability) -> crate::Result<()> {
        if self.has_capability(capability) {
            Ok(())
        } else {
            Err(crate::Error::CapabilityNotSupported(capability.name()))
        }
    }
}

impl Capability {
    fn name(self) -> &'static str {
        match self {
            Capability::SecureChannel => "Secure Channel",
            Capability::KeyManagement => "Key Management",
            Capability::CredentialsManagement => "Credentials Management",
            Capability::Ndef => "NDEF",
        }
    }
}

impl TryFrom<&Tlv> for Capabilities {
    type Error = crate::Error;

    fn try_from(tlv: &Tlv) -> Result<Self, Self::Error> {
        match tlv.value() {
            Value::Primitive(data) => Ok(data[0].into()),
            _ => Err(Self::Error::InvalidData("Invalid TLV for Capabilities")),
        }
    }
}

impl From<u8> for Capabilities {
    fn from(value: u8) -> Self {
        Self(value)
    }
}
