mod application;
mod commands;
mod constants;
mod crypto;
mod error;
mod secrets;
mod secure_channel;
mod session;
mod types;

pub use application::{ConfirmationFn, CredentialType, InputRequestFn, Keycard};
pub use commands::*;
pub use crypto::Challenge;
pub use error::{Error, Result};
pub use secrets::Secrets;
pub use secure_channel::KeycardSCP;
pub use types::{
    ApplicationInfo, ApplicationStatus, ExportedKey, Keypair, PairingInfo, PublicKey, Signature,
};

pub use constants::*;

/// Create a Keycard instance AID with the specified index
pub fn keycard_instance_aid(index: u8) -> Vec<u8> {
    assert!(index >= 1);
    let mut aid = Vec::from(KEYCARD_AID);
    aid.push(index);
    aid
}
