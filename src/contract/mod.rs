//! The forwarding contract state machine.
//!
//! This module is the core of the crate. The contract owns three
//! persistent fields (lock flag, receiver, admin) and a transition
//! function that maps `(state, message)` to `(new state, outgoing
//! messages)` or an abort with a stable exit code.
//!
//! ## Atomicity
//!
//! Either a transition fully applies or it fully aborts. No abort path
//! mutates the state, and the contract never constructs refund
//! messages itself: for bounceable inbound messages the host runtime
//! returns the attached value to the sender after an abort.

pub mod machine;
pub mod state;

pub use machine::{get_is_locked, process_message, MIN_FORWARD_VALUE};
pub use state::{ContractState, DeployConfig, StateDecodeError};

use crate::message::OutgoingMessage;
use crate::types::{Address, Coins};

/// Result type for contract transitions
pub type ContractResult<T> = Result<T, ContractError>;

/// Exit code reported for a successful transition
pub const EXIT_SUCCESS: u32 = 0;

/// Contract abort reasons, each with a stable exit code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    /// Forwarding attempted while the contract is locked (exit 99)
    #[error("forwarding is locked")]
    Locked,

    /// Attached value below the forwarding minimum (exit 100)
    #[error("attached value {value} below the {min} minimum")]
    BelowMinimum {
        /// Value the message carried
        value: Coins,
        /// Required minimum, inclusive
        min: Coins,
    },

    /// Lock/unlock from a sender other than the admin (exit 101)
    #[error("sender {sender} is not the admin")]
    Unauthorized {
        /// The rejected sender
        sender: Address,
    },

    /// Operation tag not recognized by this contract
    #[error("unrecognized operation {0:#010x}")]
    UnknownOp(u32),

    /// Non-empty body too short to carry an operation tag
    #[error("malformed message body: {0}")]
    MalformedBody(#[from] crate::codec::CodecError),
}

impl ContractError {
    /// Exit code surfaced to the host runtime
    #[must_use]
    pub const fn exit_code(&self) -> u32 {
        match self {
            Self::Locked => 99,
            Self::BelowMinimum { .. } => 100,
            Self::Unauthorized { .. } => 101,
            Self::UnknownOp(_) => 0xffff,
            Self::MalformedBody(_) => 9,
        }
    }
}

/// Result of a successful transition
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transition {
    /// Messages to dispatch, in emission order
    pub out_messages: Vec<OutgoingMessage>,
}
