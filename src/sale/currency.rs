//! Native currency balances, the medium a sale is paid in

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::types::*;
use crate::utils::validation::checked_credit;

/// Per-identity native currency balances, in smallest units
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NativeCurrency {
    balances: HashMap<Identity, u128>,
    total_issued: u128,
}

impl NativeCurrency {
    /// Create an empty currency book
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit newly issued funds to `holder`, returning the new balance
    pub fn deposit(&mut self, holder: &Identity, amount: u128) -> LedgerResult<u128> {
        let total_issued = checked_credit(self.total_issued, amount, "total issued currency")?;
        let balance = checked_credit(self.balance_of(holder), amount, "currency balance")?;

        self.balances.insert(*holder, balance);
        self.total_issued = total_issued;
        debug!("Currency deposited: holder={}, amount={}", holder, amount);

        Ok(balance)
    }

    /// Balance of `holder`, zero when unseen
    pub fn balance_of(&self, holder: &Identity) -> u128 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Everything ever deposited; transfers never change it
    pub fn total_issued(&self) -> u128 {
        self.total_issued
    }

    /// Check whether `transfer` would succeed
    pub fn check_transfer(&self, from: &Identity, to: &Identity, amount: u128) -> LedgerResult<()> {
        let available = self.balance_of(from);
        if available < amount {
            warn!(
                "Currency transfer rejected: holder={}, balance={}, requested={}",
                from, available, amount
            );
            return Err(LedgerError::InsufficientFunds {
                holder: *from,
                available,
                requested: amount,
            });
        }

        if from != to {
            checked_credit(self.balance_of(to), amount, "currency balance")?;
        }

        Ok(())
    }

    /// Move `amount` from `from` to `to`
    pub fn transfer(&mut self, from: &Identity, to: &Identity, amount: u128) -> LedgerResult<()> {
        self.check_transfer(from, to, amount)?;
        if from == to {
            return Ok(());
        }

        let from_balance = self.balance_of(from) - amount;
        let to_balance = checked_credit(self.balance_of(to), amount, "currency balance")?;
        self.balances.insert(*from, from_balance);
        self.balances.insert(*to, to_balance);
        debug!(
            "Currency transferred: from={}, to={}, amount={}",
            from, to, amount
        );

        Ok(())
    }
}
