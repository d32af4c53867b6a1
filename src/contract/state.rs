//! Persistent contract state and deployment configuration.
//!
//! The persistent record and the deployment record share one layout:
//! a flags byte (bit 0 = lock flag, remaining bits reserved zero),
//! then the receiver address, then the admin address. A deployment
//! record is simply the state record with the flags byte zero, and the
//! contract's address is derived from it.

use serde::{Deserialize, Serialize};

use crate::codec::{CodecError, RecordReader};
use crate::types::Address;

/// Bit 0 of the flags byte: forwarding is suspended
const FLAG_LOCKED: u8 = 0b0000_0001;

/// Persistent state of a deployed forwarding contract.
///
/// `receiver` and `admin` are fixed at deployment; only `is_locked`
/// changes afterwards, via authorized lock/unlock operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractState {
    /// Gate on the forwarding operation
    pub is_locked: bool,
    /// Fixed destination for forwarded funds
    pub receiver: Address,
    /// Sole principal allowed to lock and unlock
    pub admin: Address,
}

impl ContractState {
    /// Encoded size: flags byte plus two addresses
    pub const ENCODED_LEN: usize = 1 + 32 + 32;

    /// Encode to the persistent record layout
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::ENCODED_LEN);
        out.push(if self.is_locked { FLAG_LOCKED } else { 0 });
        out.extend_from_slice(self.receiver.as_bytes());
        out.extend_from_slice(self.admin.as_bytes());
        out
    }

    /// Decode from the persistent record layout.
    ///
    /// # Errors
    /// Rejects truncated records, trailing bytes, and nonzero reserved
    /// flag bits.
    pub fn decode(bytes: &[u8]) -> Result<Self, StateDecodeError> {
        let mut reader = RecordReader::new(bytes);
        let flags = reader.u8()?;
        if flags & !FLAG_LOCKED != 0 {
            return Err(StateDecodeError::ReservedFlags(flags));
        }
        let receiver = reader.address()?;
        let admin = reader.address()?;
        reader.finish()?;

        Ok(Self {
            is_locked: flags & FLAG_LOCKED != 0,
            receiver,
            admin,
        })
    }
}

/// State decoding errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StateDecodeError {
    /// Wire-level failure
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Reserved flag bits set
    #[error("reserved flag bits set: {0:#04x}")]
    ReservedFlags(u8),
}

/// Deployment configuration: the two fixed principals
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployConfig {
    /// Fixed destination for forwarded funds
    pub receiver: Address,
    /// Sole principal allowed to lock and unlock
    pub admin: Address,
}

impl DeployConfig {
    /// Initial state: unlocked, principals fixed
    #[must_use]
    pub const fn initial_state(&self) -> ContractState {
        ContractState {
            is_locked: false,
            receiver: self.receiver,
            admin: self.admin,
        }
    }

    /// The state-init record the contract address derives from
    #[must_use]
    pub fn encode(&self) -> Vec<u8> {
        self.initial_state().encode()
    }
}
