//! PC/SC transport implementation for APDU operations
//!
//! This crate implements [`nexum_apdu_core::transport::CardTransport`] using
//! the PC/SC API for communication with smart card readers.
//!
//! Reader and card insertion/removal eventing is explicitly out of scope
//! (see the keycard crate's design notes); this crate only connects,
//! transmits, and disconnects.
//!
//! # Examples
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use nexum_apdu_core::{CardExecutor, Command, prelude::Executor};
//! use nexum_apdu_transport_pcsc::PcscDeviceManager;
//!
//! let manager = PcscDeviceManager::new()?;
//! let readers = manager.list_readers()?;
//! let Some(reader) = readers.first() else {
//!     println!("No readers found");
//!     return Ok(());
//! };
//!
//! let transport = manager.open_reader(reader.name())?;
//! let mut executor = CardExecutor::new(transport);
//!
//! let aid = hex::decode("A000000003000000").unwrap();
//! let select_cmd = Command::new_with_data(0x00, 0xA4, 0x04, 0x00, aid);
//! let response = executor.execute(&select_cmd)?;
//! println!("Response: {:?}", response);
//! # Ok(())
//! # }
//! ```
#![cfg_attr(not(test), warn(unused_crate_dependencies))]
#![warn(missing_docs)]

mod config;
mod error;
mod manager;
mod reader;
mod transport;
mod util;

pub use config::{ConnectStrategy, PcscConfig, ShareMode, TransactionMode};
pub use error::PcscError;
pub use manager::PcscDeviceManager;
pub use reader::PcscReader;
pub use transport::PcscTransport;

pub use pcsc::{Protocol, Protocols, Status};
