//! In-memory storage and event sink implementations

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use crate::traits::*;
use crate::types::*;

fn poisoned<E>(_: E) -> LedgerError {
    LedgerError::Storage("lock poisoned".to_string())
}

#[derive(Debug, Default)]
struct TokenState {
    balances: HashMap<Identity, u128>,
    allowances: HashMap<(Identity, Identity), u128>,
}

/// In-memory storage implementation for testing and development
///
/// The storage is owned by exactly one token; it cannot be cloned, so
/// balances only change through the token's operations.
///
/// ```compile_fail
/// fn shared<T: Clone>() {}
/// shared::<token_sale_core::utils::MemoryStorage>();
/// ```
#[derive(Debug)]
pub struct MemoryStorage {
    state: RwLock<TokenState>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            state: RwLock::new(TokenState::default()),
        }
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl TokenStorage for MemoryStorage {
    fn balance(&self, holder: &Identity) -> LedgerResult<u128> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state.balances.get(holder).copied().unwrap_or(0))
    }

    fn allowance(&self, owner: &Identity, spender: &Identity) -> LedgerResult<u128> {
        let state = self.state.read().map_err(poisoned)?;
        Ok(state
            .allowances
            .get(&(*owner, *spender))
            .copied()
            .unwrap_or(0))
    }

    fn holders(&self) -> LedgerResult<Vec<(Identity, u128)>> {
        let state = self.state.read().map_err(poisoned)?;
        let mut holders: Vec<(Identity, u128)> = state
            .balances
            .iter()
            .map(|(holder, balance)| (*holder, *balance))
            .collect();
        holders.sort();
        Ok(holders)
    }

    fn apply(&mut self, delta: &StateDelta) -> LedgerResult<()> {
        let state = self.state.get_mut().map_err(poisoned)?;
        for (holder, amount) in &delta.balances {
            state.balances.insert(*holder, *amount);
        }
        for (owner, spender, amount) in &delta.allowances {
            state.allowances.insert((*owner, *spender), *amount);
        }
        Ok(())
    }
}

/// Event sink that keeps every published record in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryEventSink {
    records: Arc<Mutex<Vec<EventRecord>>>,
}

impl MemoryEventSink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, in publication order
    pub fn records(&self) -> LedgerResult<Vec<EventRecord>> {
        Ok(self.records.lock().map_err(poisoned)?.clone())
    }
}

#[async_trait]
impl EventSink for MemoryEventSink {
    async fn publish(&self, records: &[EventRecord]) -> LedgerResult<()> {
        self.records
            .lock()
            .map_err(poisoned)?
            .extend_from_slice(records);
        Ok(())
    }
}
