//! # Relaygate
//!
//! A custodial value-forwarding contract for a message-driven ledger.
//!
//! ## Architecture
//!
//! The contract is a single state machine with three persistent fields:
//! - **Receiver**: fixed destination for forwarded funds
//! - **Admin**: sole principal allowed to suspend and resume forwarding
//! - **Lock flag**: gate on the forwarding operation
//!
//! Every inbound message is processed to completion before the next is
//! considered. A transition either fully applies (state update plus
//! emitted messages) or fully aborts with an exit code; refunds for
//! failed bounceable messages are generated by the host runtime, never
//! by the contract itself.
//!
//! ## Exit codes
//!
//! - 99: forwarding attempted while locked
//! - 100: attached value below the 1-token forwarding minimum
//! - 101: lock/unlock attempted by a non-admin sender

#![forbid(unsafe_code)]
#![deny(clippy::all, rust_2018_idioms)]
#![warn(clippy::pedantic, clippy::nursery, missing_docs)]
#![allow(
    clippy::module_name_repetitions,
    clippy::missing_errors_doc,
    // Intentional numeric casts - ledger amounts and counters are bounded
    clippy::cast_possible_truncation,
    clippy::cast_lossless,
    // Const fn not always beneficial for complex types
    clippy::missing_const_for_fn,
    // must_use on every fn is excessive
    clippy::must_use_candidate
)]

pub mod codec;
pub mod config;
pub mod contract;
pub mod message;
pub mod runtime;
pub mod types;

pub use codec::CodecError;
pub use config::{ConfigError, DeployConfigToml};
pub use contract::{
    get_is_locked, process_message, ContractError, ContractResult, ContractState, DeployConfig,
    Transition, EXIT_SUCCESS, MIN_FORWARD_VALUE,
};
pub use message::{
    IncomingMessage, MessageBody, OpCode, OutgoingMessage, SendMode, OP_FORWARD_FUNDS, OP_LOCK,
    OP_UNLOCK,
};
pub use runtime::{Account, Ledger, Receipt, RuntimeError};
pub use types::{Address, AddressError, Coins};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
