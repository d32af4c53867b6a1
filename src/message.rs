//! Message model and body codec.
//!
//! A message body is a tagged record: the first 32 bits are the
//! operation tag, big-endian. The operations this contract understands
//! carry no further payload, and any bytes after the tag are ignored.
//! An empty body is a plain value transfer.

use serde::{Deserialize, Serialize};

use crate::codec::{CodecError, RecordReader};
use crate::types::{Address, Coins};

/// Wire tag for the forward-funds operation
pub const OP_FORWARD_FUNDS: u32 = 0x6f07_4817;

/// Wire tag for the lock operation
pub const OP_LOCK: u32 = 0x878f_9b0e;

/// Wire tag for the unlock operation.
///
/// Deployment-coordination constant: must match the tag compiled into
/// the deployed contract build.
pub const OP_UNLOCK: u32 = 0x878f_9b0f;

/// Operations the contract dispatches on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpCode {
    /// Forward the attached value to the fixed receiver
    ForwardFunds,
    /// Suspend forwarding (admin only)
    Lock,
    /// Resume forwarding (admin only)
    Unlock,
}

impl OpCode {
    /// Wire tag of this operation
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::ForwardFunds => OP_FORWARD_FUNDS,
            Self::Lock => OP_LOCK,
            Self::Unlock => OP_UNLOCK,
        }
    }

    /// Look up a wire tag; `None` for unrecognized tags
    #[must_use]
    pub const fn from_value(tag: u32) -> Option<Self> {
        match tag {
            OP_FORWARD_FUNDS => Some(Self::ForwardFunds),
            OP_LOCK => Some(Self::Lock),
            OP_UNLOCK => Some(Self::Unlock),
            _ => None,
        }
    }
}

/// Parsed message body
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MessageBody {
    /// Zero-length body: a plain value transfer (also the deploy body)
    Empty,
    /// Tagged body; the tag may be one this contract does not recognize
    Op(u32),
}

impl MessageBody {
    /// Parse a raw body.
    ///
    /// # Errors
    /// A non-empty body shorter than the 32-bit tag is malformed.
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.is_empty() {
            return Ok(Self::Empty);
        }
        let mut reader = RecordReader::new(bytes);
        let tag = reader.u32_be()?;
        // Payload past the tag is not read by any of this contract's ops.
        Ok(Self::Op(tag))
    }

    /// Encode a tagged body
    #[must_use]
    pub fn encode_op(tag: u32) -> Vec<u8> {
        tag.to_be_bytes().to_vec()
    }

    /// Body of a forward-funds message
    #[must_use]
    pub fn forward_funds() -> Vec<u8> {
        Self::encode_op(OP_FORWARD_FUNDS)
    }

    /// Body of a lock message
    #[must_use]
    pub fn lock() -> Vec<u8> {
        Self::encode_op(OP_LOCK)
    }

    /// Body of an unlock message
    #[must_use]
    pub fn unlock() -> Vec<u8> {
        Self::encode_op(OP_UNLOCK)
    }

    /// The empty body
    #[must_use]
    pub fn empty() -> Vec<u8> {
        Vec::new()
    }
}

/// An inbound message as delivered by the host runtime
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IncomingMessage {
    /// Runtime-attested sender account
    pub sender: Address,
    /// Native currency attached to the message
    pub value: Coins,
    /// Whether an abort should trigger an automatic refund to the sender
    pub bounceable: bool,
    /// Raw body bytes
    pub body: Vec<u8>,
}

/// Fee treatment for an outbound transfer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendMode {
    /// The transfer fee is charged to the sending account on top of the value
    PayFeesSeparately,
    /// The transfer fee is deducted from the carried value
    DeductFeesFromValue,
}

/// An outbound message emitted by a contract transition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Destination account
    pub to: Address,
    /// Carried value
    pub value: Coins,
    /// Fee treatment
    pub mode: SendMode,
    /// Whether delivery failure should bounce back to this contract
    pub bounceable: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        assert_eq!(MessageBody::parse(&[]).unwrap(), MessageBody::Empty);
    }

    #[test]
    fn test_parse_ops() {
        assert_eq!(
            MessageBody::parse(&MessageBody::forward_funds()).unwrap(),
            MessageBody::Op(OP_FORWARD_FUNDS)
        );
        assert_eq!(
            MessageBody::parse(&MessageBody::lock()).unwrap(),
            MessageBody::Op(OP_LOCK)
        );
        assert_eq!(
            MessageBody::parse(&MessageBody::unlock()).unwrap(),
            MessageBody::Op(OP_UNLOCK)
        );
    }

    #[test]
    fn test_parse_ignores_extra_payload() {
        let mut body = MessageBody::lock();
        body.extend_from_slice(b"extra");
        assert_eq!(MessageBody::parse(&body).unwrap(), MessageBody::Op(OP_LOCK));
    }

    #[test]
    fn test_parse_truncated_tag() {
        assert!(MessageBody::parse(&[0x6f, 0x07]).is_err());
    }

    #[test]
    fn test_opcode_roundtrip() {
        for op in [OpCode::ForwardFunds, OpCode::Lock, OpCode::Unlock] {
            assert_eq!(OpCode::from_value(op.value()), Some(op));
        }
        assert_eq!(OpCode::from_value(0xdead_beef), None);
    }

    #[test]
    fn test_op_tags_distinct() {
        assert_ne!(OP_LOCK, OP_UNLOCK);
        assert_ne!(OP_FORWARD_FUNDS, OP_LOCK);
        assert_ne!(OP_FORWARD_FUNDS, OP_UNLOCK);
    }
}
