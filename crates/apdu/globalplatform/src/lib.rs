//! Minimal GlobalPlatform support: selecting an application by AID.
//!
//! The Keycard applet is selected the same way any ISO 7816-4 application
//! is: a SELECT command (CLA `0x00`, INS `0xA4`) carrying the AID, whose
//! response FCI is then interpreted by the caller. This crate only
//! implements that one command plus the status words the Keycard command
//! layer matches against; CAP loading, INSTALL, and the other card-management
//! commands a full GlobalPlatform implementation provides are out of scope.
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

pub mod commands;
pub mod constants;
pub mod error;

pub use commands::select;
pub use error::{Error, Result};
