//! Security-level accounting and the secure-channel seam.

use core::fmt;

use crate::processor::{CommandProcessor, error::SecureProtocolError};
use crate::transport::CardTransport;

/// The security properties a command requires, or a channel currently provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SecurityLevel {
    authentication: bool,
    mac: bool,
    encryption: bool,
}

impl SecurityLevel {
    /// No security: plain, unauthenticated, unprotected communication.
    pub const fn none() -> Self {
        Self {
            authentication: false,
            mac: false,
            encryption: false,
        }
    }

    /// MAC-protected integrity, no encryption, no prior authentication.
    pub const fn mac() -> Self {
        Self {
            authentication: false,
            mac: true,
            encryption: false,
        }
    }

    /// Alias for [`Self::mac`], matching command sites that read better this way.
    pub const fn mac_protected() -> Self {
        Self::mac()
    }

    /// MAC-protected and encrypted, no prior authentication.
    pub const fn enc_mac() -> Self {
        Self {
            authentication: false,
            mac: true,
            encryption: true,
        }
    }

    /// Alias for [`Self::enc_mac`].
    pub const fn encrypted() -> Self {
        Self::enc_mac()
    }

    /// MAC-protected, with prior authentication (e.g. PIN verified), not encrypted.
    pub const fn auth_mac() -> Self {
        Self {
            authentication: true,
            mac: true,
            encryption: false,
        }
    }

    /// Alias for [`Self::auth_mac`].
    pub const fn authenticated_mac() -> Self {
        Self::auth_mac()
    }

    /// Authenticated, MAC-protected, and encrypted: every property set.
    pub const fn full() -> Self {
        Self {
            authentication: true,
            mac: true,
            encryption: true,
        }
    }

    /// Alias for [`Self::full`].
    pub const fn authenticated_encrypted() -> Self {
        Self::full()
    }

    /// Alias for [`Self::full`].
    pub const fn full_security() -> Self {
        Self::full()
    }

    /// Whether `self` meets or exceeds every property `required` asks for.
    pub const fn satisfies(&self, required: &Self) -> bool {
        (!required.authentication || self.authentication)
            && (!required.mac || self.mac || self.encryption)
            && (!required.encryption || self.encryption)
    }

    /// Whether any security property is set.
    pub const fn is_none(&self) -> bool {
        !self.authentication && !self.mac && !self.encryption
    }
}

/// Produces a [`CommandProcessor`] that implements the keycard secure channel
/// for a freshly connected transport.
pub trait SecureChannelProvider: fmt::Debug {
    /// Establish a secure channel over `transport`.
    fn create_secure_channel(
        &self,
        transport: &mut dyn CardTransport,
    ) -> Result<Box<dyn CommandProcessor>, SecureProtocolError>;
}

/// A [`CommandProcessor`] that additionally tracks establishment/teardown of
/// a secure channel.
pub trait SecureChannel: CommandProcessor {
    /// Whether the channel is currently usable.
    fn is_established(&self) -> bool;

    /// Tear the channel down. Idempotent.
    fn close(&mut self) -> Result<(), SecureProtocolError>;

    /// Attempt to bring a closed channel back up.
    fn reestablish(&mut self) -> Result<(), SecureProtocolError>;

    /// The security level currently provided by this channel.
    fn current_security_level(&self) -> SecurityLevel {
        self.security_level()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enc_mac_satisfies_mac_only() {
        assert!(SecurityLevel::enc_mac().satisfies(&SecurityLevel::mac()));
    }

    #[test]
    fn mac_does_not_satisfy_encryption() {
        assert!(!SecurityLevel::mac().satisfies(&SecurityLevel::enc_mac()));
    }

    #[test]
    fn full_satisfies_everything() {
        let full = SecurityLevel::full();
        assert!(full.satisfies(&SecurityLevel::none()));
        assert!(full.satisfies(&SecurityLevel::mac()));
        assert!(full.satisfies(&SecurityLevel::enc_mac()));
        assert!(full.satisfies(&SecurityLevel::auth_mac()));
        assert!(full.satisfies(&SecurityLevel::full()));
    }
}
