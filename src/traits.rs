//! Traits for storage abstraction and event observers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::types::*;

/// A set of balance and allowance writes applied as one unit
///
/// Writes are absolute values, not deltas, so applying the same batch twice
/// leaves the state unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDelta {
    pub balances: Vec<(Identity, u128)>,
    pub allowances: Vec<(Identity, Identity, u128)>,
}

impl StateDelta {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a holder's balance
    pub fn set_balance(mut self, holder: Identity, amount: u128) -> Self {
        self.balances.push((holder, amount));
        self
    }

    /// Set an owner's allowance for a spender
    pub fn set_allowance(mut self, owner: Identity, spender: Identity, amount: u128) -> Self {
        self.allowances.push((owner, spender, amount));
        self
    }

    /// Whether the batch contains no writes
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty() && self.allowances.is_empty()
    }
}

/// Storage abstraction for token balances and allowances
///
/// This trait allows the token to work with any backend by implementing
/// these methods. Unseen holders and unset allowances read as zero.
pub trait TokenStorage: Send + Sync {
    /// Get a holder's balance
    fn balance(&self, holder: &Identity) -> LedgerResult<u128>;

    /// Get the amount `spender` may still move out of `owner`'s balance
    fn allowance(&self, owner: &Identity, spender: &Identity) -> LedgerResult<u128>;

    /// List every holder with a recorded balance
    fn holders(&self) -> LedgerResult<Vec<(Identity, u128)>>;

    /// Apply all writes of a batch atomically; either every write lands or none does
    fn apply(&mut self, delta: &StateDelta) -> LedgerResult<()>;
}

/// Observer of committed events (audit logs, UIs)
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Publish the records of one committed call, in order
    async fn publish(&self, records: &[EventRecord]) -> LedgerResult<()>;
}
