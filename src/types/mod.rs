//! Core value types: addresses and native-currency amounts.

pub mod address;
pub mod amount;

pub use address::{Address, AddressError};
pub use amount::{Coins, NANOS_PER_TOKEN};
