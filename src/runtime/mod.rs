//! In-memory host ledger.
//!
//! A deterministic sandbox playing the role of the surrounding chain
//! runtime. It owns account balances, serializes message delivery
//! (first-in-first-out, one message processed to completion at a
//! time), charges a flat fee in place of gas, commits or rolls back
//! contract transitions atomically, and auto-generates bounce messages
//! for failed bounceable deliveries.
//!
//! Every delivered message produces a [`Receipt`]; a single `send` may
//! cascade into several deliveries (the inbound message, forwarded
//! transfers, a bounce) and returns the receipts in delivery order.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::contract::{self, ContractState, DeployConfig, EXIT_SUCCESS};
use crate::message::{IncomingMessage, MessageBody, SendMode};
use crate::types::{Address, Coins};

/// Default flat fee charged per delivered message (0.005 tokens).
/// Stands in for gas, which is opaque to the contract core.
pub const DEFAULT_MESSAGE_FEE: Coins = Coins::from_nanos(5_000_000);

/// Balance given to freshly created treasury wallets
const TREASURY_FUNDING: Coins = Coins::from_tokens(1_000_000);

/// A ledger account.
///
/// Plain wallet accounts carry no contract state and accept any
/// delivery as a balance credit; contract accounts run the forwarding
/// state machine on every delivery.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Current balance
    pub balance: Coins,
    /// State machine state, for deployed contract accounts
    pub contract: Option<ContractState>,
}

/// Per-message transaction record
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Sending account
    pub from: Address,
    /// Destination account
    pub to: Address,
    /// Face value the message carried
    pub value: Coins,
    /// Operation tag, when the body carried one
    pub op: Option<u32>,
    /// Whether the delivery succeeded
    pub success: bool,
    /// Exit code (0 on success)
    pub exit_code: u32,
    /// Messages emitted by the transition
    pub out_messages: u32,
    /// Set on the delivery that initialized a contract account
    pub deployed: bool,
    /// Set when the delivered message was an auto-generated bounce
    pub bounced: bool,
    /// Ledger logical time at delivery
    pub lt: u64,
}

/// Host runtime errors.
///
/// These are failures of the surrounding runtime, distinct from
/// contract aborts, which are reported through [`Receipt`]s.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// No account at the address
    #[error("unknown account {0}")]
    UnknownAccount(Address),

    /// The account exists but holds no contract state
    #[error("account {0} is not a deployed contract")]
    NotAContract(Address),

    /// Sender cannot cover value plus fee
    #[error("insufficient balance on {address}: need {need}, have {have}")]
    InsufficientBalance {
        /// Debited account
        address: Address,
        /// Amount required
        need: Coins,
        /// Amount available
        have: Coins,
    },

    /// The derived contract address is already occupied by a contract
    #[error("account {0} already deployed")]
    AlreadyDeployed(Address),

    /// Snapshot encode/decode failure
    #[error("snapshot failed: {0}")]
    Snapshot(#[from] bincode::Error),
}

/// A message in flight between accounts
#[derive(Clone, Debug)]
struct Delivery {
    from: Address,
    to: Address,
    /// Face value shown on the receipt
    value: Coins,
    /// Amount actually credited on delivery (face value net of any
    /// fee deducted from it)
    net: Coins,
    body: Vec<u8>,
    bounceable: bool,
    bounced: bool,
}

/// The ledger: accounts, fee policy, and logical time
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ledger {
    accounts: HashMap<Address, Account>,
    fee: Coins,
    lt: u64,
}

impl Ledger {
    /// Create a ledger with the default message fee
    #[must_use]
    pub fn new() -> Self {
        Self::with_fee(DEFAULT_MESSAGE_FEE)
    }

    /// Create a ledger with an explicit flat message fee
    #[must_use]
    pub fn with_fee(fee: Coins) -> Self {
        Self {
            accounts: HashMap::new(),
            fee,
            lt: 0,
        }
    }

    /// The flat per-message fee
    #[must_use]
    pub const fn fee(&self) -> Coins {
        self.fee
    }

    /// Create a funded wallet account derived from `seed`
    pub fn treasury(&mut self, seed: &str) -> Address {
        let address = Address::from_state_init(format!("wallet:{seed}").as_bytes());
        self.accounts.insert(
            address,
            Account {
                balance: TREASURY_FUNDING,
                contract: None,
            },
        );
        debug!(%address, seed, "created treasury wallet");
        address
    }

    /// Current balance of an account (zero for unknown accounts)
    #[must_use]
    pub fn balance(&self, address: Address) -> Coins {
        self.accounts.get(&address).map_or(Coins::ZERO, |a| a.balance)
    }

    /// Contract state of a deployed account
    #[must_use]
    pub fn contract_state(&self, address: Address) -> Option<ContractState> {
        self.accounts.get(&address).and_then(|a| a.contract)
    }

    /// Lock-flag query against a deployed contract
    pub fn get_is_locked(&self, address: Address) -> Result<u64, RuntimeError> {
        let account = self
            .accounts
            .get(&address)
            .ok_or(RuntimeError::UnknownAccount(address))?;
        let state = account
            .contract
            .as_ref()
            .ok_or(RuntimeError::NotAContract(address))?;
        Ok(contract::get_is_locked(state))
    }

    /// Deploy a forwarding contract.
    ///
    /// The contract address derives from the encoded deployment
    /// record; the deployer pays `value` (credited to the new account)
    /// plus the message fee. The deploy message carries an empty body,
    /// which the state machine treats as a no-op transfer.
    pub fn deploy(
        &mut self,
        config: &DeployConfig,
        deployer: Address,
        value: Coins,
    ) -> Result<(Address, Receipt), RuntimeError> {
        let address = Address::from_state_init(&config.encode());
        if self
            .accounts
            .get(&address)
            .is_some_and(|a| a.contract.is_some())
        {
            return Err(RuntimeError::AlreadyDeployed(address));
        }

        self.debit(deployer, value.saturating_add(self.fee))?;
        self.lt += 1;

        let account = self.accounts.entry(address).or_default();
        account.contract = Some(config.initial_state());
        account.balance = account.balance.saturating_add(value);

        info!(contract = %address, receiver = %config.receiver, admin = %config.admin, "deployed forwarding contract");

        Ok((
            address,
            Receipt {
                from: deployer,
                to: address,
                value,
                op: None,
                success: true,
                exit_code: EXIT_SUCCESS,
                out_messages: 0,
                deployed: true,
                bounced: false,
                lt: self.lt,
            },
        ))
    }

    /// Send a message and run the delivery cascade to completion.
    ///
    /// The sender pays `value` plus the message fee up front. Returns
    /// one receipt per delivered message, in delivery order: the
    /// inbound message first, then any transfers the transition
    /// emitted, then the auto-generated bounce if the transition
    /// aborted on a bounceable message.
    pub fn send(
        &mut self,
        from: Address,
        to: Address,
        value: Coins,
        body: Vec<u8>,
        bounceable: bool,
    ) -> Result<Vec<Receipt>, RuntimeError> {
        self.debit(from, value.saturating_add(self.fee))?;

        let mut queue = VecDeque::new();
        queue.push_back(Delivery {
            from,
            to,
            value,
            net: value,
            body,
            bounceable,
            bounced: false,
        });

        let mut receipts = Vec::new();
        while let Some(delivery) = queue.pop_front() {
            self.lt += 1;
            receipts.push(self.deliver(delivery, &mut queue));
        }
        Ok(receipts)
    }

    /// Serialize the full ledger
    pub fn snapshot(&self) -> Result<Vec<u8>, RuntimeError> {
        Ok(bincode::serialize(self)?)
    }

    /// Replace the ledger contents from a snapshot
    pub fn restore(&mut self, snapshot: &[u8]) -> Result<(), RuntimeError> {
        *self = bincode::deserialize(snapshot)?;
        Ok(())
    }

    fn debit(&mut self, address: Address, amount: Coins) -> Result<(), RuntimeError> {
        let account = self
            .accounts
            .get_mut(&address)
            .ok_or(RuntimeError::UnknownAccount(address))?;
        let have = account.balance;
        account.balance = have.checked_sub(amount).ok_or(RuntimeError::InsufficientBalance {
            address,
            need: amount,
            have,
        })?;
        Ok(())
    }

    /// Deliver one in-flight message, enqueueing any messages it causes
    fn deliver(&mut self, delivery: Delivery, queue: &mut VecDeque<Delivery>) -> Receipt {
        let fee = self.fee;
        let lt = self.lt;
        let op = match MessageBody::parse(&delivery.body) {
            Ok(MessageBody::Op(tag)) => Some(tag),
            _ => None,
        };

        let account = self.accounts.entry(delivery.to).or_default();

        // Bounce messages are refunds: credited, never dispatched.
        if delivery.bounced {
            account.balance = account.balance.saturating_add(delivery.net);
            debug!(to = %delivery.to, value = %delivery.net, "delivered bounce");
            return Receipt {
                from: delivery.from,
                to: delivery.to,
                value: delivery.value,
                op,
                success: true,
                exit_code: EXIT_SUCCESS,
                out_messages: 0,
                deployed: false,
                bounced: true,
                lt,
            };
        }

        let Some(state) = account.contract else {
            // Wallet account: plain credit.
            account.balance = account.balance.saturating_add(delivery.net);
            return Receipt {
                from: delivery.from,
                to: delivery.to,
                value: delivery.value,
                op,
                success: true,
                exit_code: EXIT_SUCCESS,
                out_messages: 0,
                deployed: false,
                bounced: false,
                lt,
            };
        };

        let msg = IncomingMessage {
            sender: delivery.from,
            value: delivery.value,
            bounceable: delivery.bounceable,
            body: delivery.body,
        };

        let mut working = state;
        match contract::process_message(&mut working, &msg) {
            Ok(transition) => {
                // Commit: state update and emitted messages apply together.
                account.contract = Some(working);
                account.balance = account.balance.saturating_add(delivery.net);

                let emitted = transition.out_messages.len() as u32;
                for out in transition.out_messages {
                    let charge = match out.mode {
                        SendMode::PayFeesSeparately => out.value.saturating_add(fee),
                        SendMode::DeductFeesFromValue => out.value,
                    };
                    account.balance = account.balance.saturating_sub(charge);

                    let net = match out.mode {
                        SendMode::PayFeesSeparately => out.value,
                        SendMode::DeductFeesFromValue => out.value.saturating_sub(fee),
                    };
                    queue.push_back(Delivery {
                        from: delivery.to,
                        to: out.to,
                        value: out.value,
                        net,
                        body: MessageBody::empty(),
                        bounceable: out.bounceable,
                        bounced: false,
                    });
                }

                info!(
                    contract = %delivery.to,
                    sender = %delivery.from,
                    value = %delivery.value,
                    out_messages = emitted,
                    "transition applied"
                );

                Receipt {
                    from: delivery.from,
                    to: delivery.to,
                    value: delivery.value,
                    op,
                    success: true,
                    exit_code: EXIT_SUCCESS,
                    out_messages: emitted,
                    deployed: false,
                    bounced: false,
                    lt,
                }
            }
            Err(e) => {
                // Abort: no state change, no credit; refund bounceable value.
                let exit_code = e.exit_code();
                warn!(
                    contract = %delivery.to,
                    sender = %delivery.from,
                    exit_code,
                    error = %e,
                    "transition aborted"
                );

                let refund = delivery.value.checked_sub(fee).filter(|r| !r.is_zero());
                if delivery.bounceable {
                    if let Some(refund) = refund {
                        queue.push_back(Delivery {
                            from: delivery.to,
                            to: delivery.from,
                            value: refund,
                            net: refund,
                            body: MessageBody::empty(),
                            bounceable: false,
                            bounced: true,
                        });
                    }
                }

                Receipt {
                    from: delivery.from,
                    to: delivery.to,
                    value: delivery.value,
                    op,
                    success: false,
                    exit_code,
                    out_messages: 0,
                    deployed: false,
                    bounced: false,
                    lt,
                }
            }
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}
