//! GlobalPlatform command definitions

pub mod select;

pub use select::{SelectCommand, SelectError, SelectOk};
