//! The message transition function.
//!
//! One message is processed to completion per invocation; the host
//! runtime serializes delivery, so no transition ever observes a
//! partially-applied peer. A transition either fully applies (state
//! update plus emitted messages, committed together by the host) or
//! aborts with an exit code and leaves the state untouched.

use tracing::debug;

use super::state::ContractState;
use super::{ContractError, ContractResult, Transition};
use crate::message::{IncomingMessage, MessageBody, OpCode, OutgoingMessage, SendMode};
use crate::types::Coins;

/// Minimum value a forward must carry, inclusive
pub const MIN_FORWARD_VALUE: Coins = Coins::ONE_TOKEN;

/// Process one inbound message against the contract state.
///
/// Empty bodies are plain value transfers and always succeed (this is
/// also how the empty deploy body succeeds). Tagged bodies dispatch on
/// the operation:
///
/// - `ForwardFunds` re-emits the full attached value to the fixed
///   receiver, transfer fee deducted from the forwarded amount. Aborts
///   with 99 while locked and 100 below the minimum; the lock check
///   runs first, so a locked contract reports 99 even when the value
///   is also below the minimum.
/// - `Lock`/`Unlock` set and clear the gate. Admin only (abort 101),
///   idempotent, no messages emitted.
/// - Unrecognized tags abort without touching anything.
///
/// # Errors
/// Every abort leaves `state` exactly as it was. Refunds for
/// bounceable messages are the host runtime's responsibility.
pub fn process_message(
    state: &mut ContractState,
    msg: &IncomingMessage,
) -> ContractResult<Transition> {
    let tag = match MessageBody::parse(&msg.body)? {
        MessageBody::Empty => return Ok(Transition::default()),
        MessageBody::Op(tag) => tag,
    };

    match OpCode::from_value(tag) {
        Some(OpCode::ForwardFunds) => forward_funds(state, msg),
        Some(OpCode::Lock) => set_locked(state, msg, true),
        Some(OpCode::Unlock) => set_locked(state, msg, false),
        None => Err(ContractError::UnknownOp(tag)),
    }
}

/// Read-only lock query: 1 when locked, 0 otherwise
#[must_use]
pub const fn get_is_locked(state: &ContractState) -> u64 {
    if state.is_locked {
        1
    } else {
        0
    }
}

fn forward_funds(state: &ContractState, msg: &IncomingMessage) -> ContractResult<Transition> {
    // Lock takes priority over the threshold check.
    if state.is_locked {
        return Err(ContractError::Locked);
    }
    if msg.value < MIN_FORWARD_VALUE {
        return Err(ContractError::BelowMinimum {
            value: msg.value,
            min: MIN_FORWARD_VALUE,
        });
    }

    debug!(receiver = %state.receiver, value = %msg.value, "forwarding funds");
    Ok(Transition {
        out_messages: vec![OutgoingMessage {
            to: state.receiver,
            value: msg.value,
            mode: SendMode::DeductFeesFromValue,
            bounceable: false,
        }],
    })
}

fn set_locked(
    state: &mut ContractState,
    msg: &IncomingMessage,
    locked: bool,
) -> ContractResult<Transition> {
    if msg.sender != state.admin {
        return Err(ContractError::Unauthorized { sender: msg.sender });
    }

    state.is_locked = locked;
    debug!(locked, "lock flag updated");
    Ok(Transition::default())
}
