//! Fixed-price token sale bound to a single token

use tracing::{debug, info, warn};

use crate::ledger::{EventJournal, Token};
use crate::sale::NativeCurrency;
use crate::traits::*;
use crate::types::*;
use crate::utils::to_major_units;
use crate::utils::validation::{checked_credit, validate_payment, validate_positive_price};

/// Sale exchanging native currency for token units at a fixed price
///
/// The sale holds its unsold units as an ordinary token balance under its own
/// address and only ever moves them through [`Token::transfer`]. Proceeds are
/// held as the sale address's [`NativeCurrency`] balance until [`Sale::end_sale`].
///
/// A sale cannot be cloned: one address has one state machine, which closes
/// exactly once.
///
/// ```compile_fail
/// fn duplicate<T: Clone>() {}
/// duplicate::<token_sale_core::Sale>();
/// ```
#[derive(Debug)]
pub struct Sale {
    address: Identity,
    token_contract: Identity,
    admin: Identity,
    token_price: u128,
    tokens_sold: u128,
    state: SaleState,
    journal: EventJournal,
}

impl Sale {
    /// Create an open sale for `token`, administered by `admin`
    pub fn new<S: TokenStorage>(
        token: &Token<S>,
        admin: Identity,
        token_price: u128,
    ) -> LedgerResult<Self> {
        validate_positive_price(token_price)?;

        let address = Identity::generate();
        info!(
            "Sale created: address={}, token={}, admin={}, price={}",
            address,
            token.address(),
            admin,
            token_price
        );

        Ok(Self {
            address,
            token_contract: token.address(),
            admin,
            token_price,
            tokens_sold: 0,
            state: SaleState::Open,
            journal: EventJournal::new(address),
        })
    }

    /// Address of this sale; its token and currency balances live here
    pub fn address(&self) -> Identity {
        self.address
    }

    /// Address of the token this sale is bound to
    pub fn token_contract(&self) -> Identity {
        self.token_contract
    }

    pub fn admin(&self) -> Identity {
        self.admin
    }

    /// Price of one unit in smallest currency units
    pub fn token_price(&self) -> u128 {
        self.token_price
    }

    pub fn tokens_sold(&self) -> u128 {
        self.tokens_sold
    }

    pub fn state(&self) -> SaleState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == SaleState::Open
    }

    /// Events emitted by this sale, oldest first
    pub fn events(&self) -> &[EventRecord] {
        self.journal.records()
    }

    /// Check whether `buy_tokens` would succeed, without mutating anything
    ///
    /// Checks run in order: open state, exact payment, available supply,
    /// then the buyer's funds.
    pub fn check_purchase<S: TokenStorage>(
        &self,
        token: &Token<S>,
        currency: &NativeCurrency,
        buyer: &Identity,
        units: u128,
        paid: u128,
    ) -> LedgerResult<bool> {
        self.ensure_token(token)?;

        if !self.is_open() {
            warn!("Purchase rejected: sale={} is closed", self.address);
            return Err(LedgerError::AlreadyClosed);
        }

        if let Err(e) = validate_payment(units, self.token_price, paid) {
            warn!(
                "Purchase rejected: sale={}, units={}, paid={}, price={}",
                self.address, units, paid, self.token_price
            );
            return Err(e);
        }

        let available = token.balance_of(&self.address)?;
        if units > available {
            warn!(
                "Purchase rejected: sale={}, units={}, available={}",
                self.address, units, available
            );
            return Err(LedgerError::InsufficientSupply {
                available,
                requested: units,
            });
        }

        currency.check_transfer(buyer, &self.address, paid)?;
        checked_credit(self.tokens_sold, units, "tokens sold")?;

        Ok(true)
    }

    /// Buy `units` for exactly `units * token_price` of the buyer's currency
    pub fn buy_tokens<S: TokenStorage>(
        &mut self,
        token: &mut Token<S>,
        currency: &mut NativeCurrency,
        buyer: &Identity,
        units: u128,
        paid: u128,
    ) -> LedgerResult<Receipt> {
        debug!(
            "Purchase requested: sale={}, buyer={}, units={}, paid={}",
            self.address, buyer, units, paid
        );

        self.check_purchase(token, currency, buyer, units, paid)?;
        let tokens_sold = checked_credit(self.tokens_sold, units, "tokens sold")?;

        // Token first: the currency move is prechecked and cannot fail afterwards
        token.transfer(&self.address, buyer, units)?;
        currency.transfer(buyer, &self.address, paid)?;
        self.tokens_sold = tokens_sold;

        let record = self.journal.record(Event::Sell {
            buyer: *buyer,
            amount: units,
        });
        info!(
            "Purchase committed: sale={}, buyer={}, units={}, tokens_sold={}",
            self.address, buyer, units, self.tokens_sold
        );

        Ok(Receipt::single(record))
    }

    /// Close the sale and sweep unsold units and all proceeds to the admin
    ///
    /// Only the admin may call this, and only once.
    pub fn end_sale<S: TokenStorage>(
        &mut self,
        token: &mut Token<S>,
        currency: &mut NativeCurrency,
        caller: &Identity,
    ) -> LedgerResult<Receipt> {
        debug!("End of sale requested: sale={}, caller={}", self.address, caller);
        self.ensure_token(token)?;

        if *caller != self.admin {
            warn!(
                "End of sale rejected: sale={}, caller={} is not admin",
                self.address, caller
            );
            return Err(LedgerError::Unauthorized { caller: *caller });
        }

        if !self.is_open() {
            warn!("End of sale rejected: sale={} already closed", self.address);
            return Err(LedgerError::AlreadyClosed);
        }

        let unsold_units = token.balance_of(&self.address)?;
        let proceeds = currency.balance_of(&self.address);
        currency.check_transfer(&self.address, &self.admin, proceeds)?;

        token.transfer(&self.address, &self.admin, unsold_units)?;
        currency.transfer(&self.address, &self.admin, proceeds)?;
        self.state = SaleState::Closed;

        let record = self.journal.record(Event::SaleEnded {
            admin: self.admin,
            unsold_units,
            proceeds,
        });
        info!(
            "Sale ended: sale={}, unsold_units={}, proceeds={}, tokens_sold={}",
            self.address, unsold_units, proceeds, self.tokens_sold
        );

        Ok(Receipt::single(record))
    }

    /// Snapshot of the sale's figures, with currency also in major units
    pub fn report<S: TokenStorage>(
        &self,
        token: &Token<S>,
        currency: &NativeCurrency,
        currency_decimals: u32,
    ) -> LedgerResult<SaleReport> {
        self.ensure_token(token)?;
        let proceeds = currency.balance_of(&self.address);

        Ok(SaleReport {
            sale: self.address,
            token_contract: self.token_contract,
            state: self.state,
            token_price: self.token_price,
            tokens_sold: self.tokens_sold,
            tokens_available: token.balance_of(&self.address)?,
            proceeds,
            token_price_major: to_major_units(self.token_price, currency_decimals)?,
            proceeds_major: to_major_units(proceeds, currency_decimals)?,
        })
    }

    fn ensure_token<S: TokenStorage>(&self, token: &Token<S>) -> LedgerResult<()> {
        if token.address() != self.token_contract {
            return Err(LedgerError::TokenMismatch {
                expected: self.token_contract,
                actual: token.address(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;

    struct Fixture {
        admin: Identity,
        buyer: Identity,
        token: Token<MemoryStorage>,
        sale: Sale,
        currency: NativeCurrency,
    }

    fn fixture() -> Fixture {
        let admin = Identity::generate();
        let buyer = Identity::generate();
        let mut token = Token::new(
            TokenMetadata::new("RC Token".into(), "RC".into(), "RC Token v1.0".into()),
            1_000_000,
            admin,
            MemoryStorage::new(),
        )
        .unwrap();
        let sale = Sale::new(&token, admin, 10_000_000).unwrap();
        token.transfer(&admin, &sale.address(), 750_000).unwrap();

        let mut currency = NativeCurrency::new();
        currency.deposit(&buyer, 1_000_000_000).unwrap();

        Fixture {
            admin,
            buyer,
            token,
            sale,
            currency,
        }
    }

    #[test]
    fn test_new_sale_is_open_and_bound() {
        let f = fixture();
        assert!(f.sale.is_open());
        assert_eq!(f.sale.token_contract(), f.token.address());
        assert_eq!(f.sale.token_price(), 10_000_000);
        assert_eq!(f.sale.tokens_sold(), 0);
        assert_ne!(f.sale.address(), f.token.address());
    }

    #[test]
    fn test_zero_price_is_rejected() {
        let f = fixture();
        assert!(matches!(
            Sale::new(&f.token, f.admin, 0),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_purchase_moves_units_and_currency() {
        let mut f = fixture();
        let receipt = f
            .sale
            .buy_tokens(&mut f.token, &mut f.currency, &f.buyer, 10, 100_000_000)
            .unwrap();

        assert_eq!(
            receipt.event(),
            Some(&Event::Sell {
                buyer: f.buyer,
                amount: 10
            })
        );
        assert_eq!(f.sale.tokens_sold(), 10);
        assert_eq!(f.token.balance_of(&f.buyer).unwrap(), 10);
        assert_eq!(f.token.balance_of(&f.sale.address()).unwrap(), 749_990);
        assert_eq!(f.currency.balance_of(&f.sale.address()), 100_000_000);
        assert_eq!(f.currency.balance_of(&f.buyer), 900_000_000);
    }

    #[test]
    fn test_zero_unit_purchase_is_a_no_op_with_event() {
        let mut f = fixture();
        let sale_address = f.sale.address();

        let receipt = f
            .sale
            .buy_tokens(&mut f.token, &mut f.currency, &f.buyer, 0, 0)
            .unwrap();

        assert_eq!(receipt.logs.len(), 1);
        assert_eq!(
            receipt.event(),
            Some(&Event::Sell {
                buyer: f.buyer,
                amount: 0
            })
        );
        assert_eq!(f.sale.tokens_sold(), 0);
        assert_eq!(f.token.balance_of(&f.buyer).unwrap(), 0);
        assert_eq!(f.token.balance_of(&sale_address).unwrap(), 750_000);
        assert_eq!(f.currency.balance_of(&f.buyer), 1_000_000_000);
        assert_eq!(f.currency.balance_of(&sale_address), 0);
        assert_eq!(f.sale.events().len(), 1);
    }

    #[test]
    fn test_zero_units_with_payment_is_rejected() {
        let mut f = fixture();
        let err = f
            .sale
            .buy_tokens(&mut f.token, &mut f.currency, &f.buyer, 0, 1)
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::PaymentMismatch {
                expected: Some(0),
                paid: 1
            }
        );
        assert!(f.sale.events().is_empty());
    }

    #[test]
    fn test_buyer_without_funds_is_rejected() {
        let mut f = fixture();
        let broke = Identity::generate();
        let err = f
            .sale
            .buy_tokens(&mut f.token, &mut f.currency, &broke, 1, 10_000_000)
            .unwrap_err();

        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert_eq!(f.token.balance_of(&broke).unwrap(), 0);
        assert_eq!(f.sale.tokens_sold(), 0);
        assert!(f.sale.events().is_empty());
    }

    #[test]
    fn test_wrong_token_is_rejected() {
        let mut f = fixture();
        let mut other = Token::new(
            TokenMetadata::new("Other".into(), "OT".into(), "OT v1".into()),
            10,
            f.admin,
            MemoryStorage::new(),
        )
        .unwrap();

        let err = f
            .sale
            .end_sale(&mut other, &mut f.currency, &f.admin)
            .unwrap_err();
        assert!(matches!(err, LedgerError::TokenMismatch { .. }));
        assert!(f.sale.is_open());
    }

    #[test]
    fn test_end_sale_twice_fails() {
        let mut f = fixture();
        let admin = f.admin;
        f.sale
            .end_sale(&mut f.token, &mut f.currency, &admin)
            .unwrap();

        let err = f
            .sale
            .end_sale(&mut f.token, &mut f.currency, &admin)
            .unwrap_err();
        assert_eq!(err, LedgerError::AlreadyClosed);
        assert_eq!(f.sale.events().len(), 1);
    }

    #[test]
    fn test_report_in_major_units() {
        let mut f = fixture();
        f.sale
            .buy_tokens(&mut f.token, &mut f.currency, &f.buyer, 10, 100_000_000)
            .unwrap();

        let report = f.sale.report(&f.token, &f.currency, 18).unwrap();
        assert_eq!(report.tokens_available, 749_990);
        assert_eq!(report.proceeds, 100_000_000);
        assert_eq!(
            report.token_price_major,
            "0.00000000001".parse::<bigdecimal::BigDecimal>().unwrap()
        );
        assert_eq!(
            report.proceeds_major,
            "0.0000000001".parse::<bigdecimal::BigDecimal>().unwrap()
        );
    }
}
