//! Fungible token ledger with delegated allowances

use tracing::{debug, info, warn};

use crate::ledger::EventJournal;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::{checked_credit, validate_metadata};

/// Token ledger owning total supply, balances and allowances
///
/// Every mutating operation takes `&mut self`, validates all of its
/// preconditions, then applies its writes as a single [`StateDelta`].
/// `sum(balances) == total_supply` holds after every successful call.
///
/// The token takes its storage by value and never hands it out, so no
/// caller can write balances except through the operations below.
///
/// ```compile_fail
/// use token_sale_core::utils::MemoryStorage;
/// use token_sale_core::{Identity, Token, TokenMetadata};
///
/// let metadata = TokenMetadata::new("RC Token".into(), "RC".into(), "RC Token v1.0".into());
/// let token = Token::new(metadata, 100, Identity::generate(), MemoryStorage::new()).unwrap();
/// let _ = token.storage();
/// ```
pub struct Token<S: TokenStorage> {
    address: Identity,
    metadata: TokenMetadata,
    total_supply: u128,
    storage: S,
    journal: EventJournal,
}

impl<S: TokenStorage> Token<S> {
    /// Create a token crediting the whole `initial_supply` to `deployer`
    ///
    /// The storage backend must not hold any balances yet.
    pub fn new(
        metadata: TokenMetadata,
        initial_supply: u128,
        deployer: Identity,
        mut storage: S,
    ) -> LedgerResult<Self> {
        validate_metadata(&metadata)?;

        if !storage.holders()?.is_empty() {
            return Err(LedgerError::Validation(
                "Token storage must be empty at creation".to_string(),
            ));
        }

        storage.apply(&StateDelta::new().set_balance(deployer, initial_supply))?;

        let address = Identity::generate();
        info!(
            "Token created: address={}, symbol={}, total_supply={}, deployer={}",
            address, metadata.symbol, initial_supply, deployer
        );

        Ok(Self {
            address,
            metadata,
            total_supply: initial_supply,
            storage,
            journal: EventJournal::new(address),
        })
    }

    /// Address of this token
    pub fn address(&self) -> Identity {
        self.address
    }

    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    pub fn symbol(&self) -> &str {
        &self.metadata.symbol
    }

    pub fn standard(&self) -> &str {
        &self.metadata.standard
    }

    pub fn metadata(&self) -> &TokenMetadata {
        &self.metadata
    }

    /// Total supply, fixed at creation
    pub fn total_supply(&self) -> u128 {
        self.total_supply
    }

    /// Balance of `holder`, zero when unseen
    pub fn balance_of(&self, holder: &Identity) -> LedgerResult<u128> {
        self.storage.balance(holder)
    }

    /// Remaining amount `spender` may move out of `owner`'s balance
    pub fn allowance(&self, owner: &Identity, spender: &Identity) -> LedgerResult<u128> {
        self.storage.allowance(owner, spender)
    }

    /// Events emitted by this token, oldest first
    pub fn events(&self) -> &[EventRecord] {
        self.journal.records()
    }

    /// Move `amount` from `caller` to `to`
    ///
    /// A zero amount or a transfer to oneself succeeds and still emits the event.
    pub fn transfer(
        &mut self,
        caller: &Identity,
        to: &Identity,
        amount: u128,
    ) -> LedgerResult<Receipt> {
        debug!(
            "Transfer requested: token={}, from={}, to={}, amount={}",
            self.address, caller, to, amount
        );

        let delta = self.transfer_delta(caller, to, amount)?;
        self.storage.apply(&delta)?;

        let record = self.journal.record(Event::Transfer {
            from: *caller,
            to: *to,
            amount,
        });
        info!(
            "Transfer committed: token={}, from={}, to={}, amount={}",
            self.address, caller, to, amount
        );

        Ok(Receipt::single(record))
    }

    /// Set `caller`'s allowance for `spender` to exactly `amount`
    ///
    /// Overwrites any previous allowance. No balance check is made.
    pub fn approve(
        &mut self,
        caller: &Identity,
        spender: &Identity,
        amount: u128,
    ) -> LedgerResult<Receipt> {
        debug!(
            "Approve requested: token={}, owner={}, spender={}, amount={}",
            self.address, caller, spender, amount
        );

        self.storage
            .apply(&StateDelta::new().set_allowance(*caller, *spender, amount))?;

        let record = self.journal.record(Event::Approval {
            owner: *caller,
            spender: *spender,
            amount,
        });
        info!(
            "Allowance set: token={}, owner={}, spender={}, amount={}",
            self.address, caller, spender, amount
        );

        Ok(Receipt::single(record))
    }

    /// Move `amount` from `owner` to `to` on behalf of `caller`, consuming allowance
    ///
    /// The owner's balance is checked before the allowance.
    pub fn transfer_from(
        &mut self,
        caller: &Identity,
        owner: &Identity,
        to: &Identity,
        amount: u128,
    ) -> LedgerResult<Receipt> {
        debug!(
            "Delegated transfer requested: token={}, spender={}, owner={}, to={}, amount={}",
            self.address, caller, owner, to, amount
        );

        let delta = self.transfer_from_delta(caller, owner, to, amount)?;
        self.storage.apply(&delta)?;

        let record = self.journal.record(Event::Transfer {
            from: *owner,
            to: *to,
            amount,
        });
        info!(
            "Delegated transfer committed: token={}, spender={}, owner={}, to={}, amount={}",
            self.address, caller, owner, to, amount
        );

        Ok(Receipt::single(record))
    }

    /// Check whether `transfer` would succeed, without mutating anything
    pub fn can_transfer(&self, caller: &Identity, to: &Identity, amount: u128) -> LedgerResult<bool> {
        self.transfer_delta(caller, to, amount).map(|_| true)
    }

    /// Check whether `transfer_from` would succeed, without mutating anything
    pub fn can_transfer_from(
        &self,
        caller: &Identity,
        owner: &Identity,
        to: &Identity,
        amount: u128,
    ) -> LedgerResult<bool> {
        self.transfer_from_delta(caller, owner, to, amount)
            .map(|_| true)
    }

    /// Compare the sum of all balances against total supply
    pub fn verify_supply(&self) -> LedgerResult<SupplyReport> {
        let holders = self.storage.holders()?;
        let mut issues = Vec::new();

        let mut sum_of_balances: u128 = 0;
        for (_, balance) in &holders {
            sum_of_balances = checked_credit(sum_of_balances, *balance, "sum of balances")?;
        }

        if sum_of_balances != self.total_supply {
            issues.push(format!(
                "Sum of balances {} does not equal total supply {}",
                sum_of_balances, self.total_supply
            ));
        }

        Ok(SupplyReport {
            total_supply: self.total_supply,
            sum_of_balances,
            holder_count: holders.iter().filter(|(_, balance)| *balance > 0).count(),
            is_valid: issues.is_empty(),
            issues,
        })
    }

    fn transfer_delta(
        &self,
        from: &Identity,
        to: &Identity,
        amount: u128,
    ) -> LedgerResult<StateDelta> {
        let from_balance = self.storage.balance(from)?;
        if from_balance < amount {
            warn!(
                "Transfer rejected: token={}, holder={}, balance={}, requested={}",
                self.address, from, from_balance, amount
            );
            return Err(LedgerError::InsufficientBalance {
                holder: *from,
                available: from_balance,
                requested: amount,
            });
        }

        if from == to {
            return Ok(StateDelta::new());
        }

        let to_balance = self.storage.balance(to)?;
        let credited = checked_credit(to_balance, amount, "recipient balance")?;

        Ok(StateDelta::new()
            .set_balance(*from, from_balance - amount)
            .set_balance(*to, credited))
    }

    fn transfer_from_delta(
        &self,
        caller: &Identity,
        owner: &Identity,
        to: &Identity,
        amount: u128,
    ) -> LedgerResult<StateDelta> {
        let delta = self.transfer_delta(owner, to, amount)?;

        let allowance = self.storage.allowance(owner, caller)?;
        if allowance < amount {
            warn!(
                "Delegated transfer rejected: token={}, owner={}, spender={}, allowance={}, requested={}",
                self.address, owner, caller, allowance, amount
            );
            return Err(LedgerError::InsufficientAllowance {
                owner: *owner,
                spender: *caller,
                available: allowance,
                requested: amount,
            });
        }

        Ok(delta.set_allowance(*owner, *caller, allowance - amount))
    }
}
