//! Owned state bundle of a token, its sale and native currency balances

use tracing::info;

use crate::config::DeploymentConfig;
use crate::ledger::Token;
use crate::sale::{NativeCurrency, Sale};
use crate::traits::*;
use crate::types::*;

/// A deployed token with its sale
///
/// `Market` owns all state; every mutating call takes `&mut self`, so calls
/// against one market are totally ordered.
pub struct Market<S: TokenStorage> {
    token: Token<S>,
    sale: Sale,
    currency: NativeCurrency,
    currency_decimals: u32,
}

impl<S: TokenStorage> Market<S> {
    /// Deploy a token and sale per `config`, with `admin` as deployer
    ///
    /// The whole supply is credited to `admin`, who then provisions the sale
    /// with `tokens_available` units through an ordinary transfer.
    pub fn deploy(config: &DeploymentConfig, admin: Identity, storage: S) -> LedgerResult<Self> {
        config
            .validate()
            .map_err(|e| LedgerError::Validation(e.to_string()))?;

        let mut token = Token::new(
            config.token.metadata(),
            config.token.initial_supply,
            admin,
            storage,
        )?;
        let sale = Sale::new(&token, admin, config.sale.token_price)?;
        token.transfer(&admin, &sale.address(), config.sale.tokens_available)?;

        info!(
            "Market deployed: token={}, sale={}, provisioned={}",
            token.address(),
            sale.address(),
            config.sale.tokens_available
        );

        Ok(Self {
            token,
            sale,
            currency: NativeCurrency::new(),
            currency_decimals: config.sale.currency_decimals,
        })
    }

    pub fn token(&self) -> &Token<S> {
        &self.token
    }

    pub fn sale(&self) -> &Sale {
        &self.sale
    }

    pub fn currency(&self) -> &NativeCurrency {
        &self.currency
    }

    // Token operations
    pub fn balance_of(&self, holder: &Identity) -> LedgerResult<u128> {
        self.token.balance_of(holder)
    }

    pub fn allowance(&self, owner: &Identity, spender: &Identity) -> LedgerResult<u128> {
        self.token.allowance(owner, spender)
    }

    pub fn transfer(
        &mut self,
        caller: &Identity,
        to: &Identity,
        amount: u128,
    ) -> LedgerResult<Receipt> {
        self.token.transfer(caller, to, amount)
    }

    pub fn approve(
        &mut self,
        caller: &Identity,
        spender: &Identity,
        amount: u128,
    ) -> LedgerResult<Receipt> {
        self.token.approve(caller, spender, amount)
    }

    pub fn transfer_from(
        &mut self,
        caller: &Identity,
        owner: &Identity,
        to: &Identity,
        amount: u128,
    ) -> LedgerResult<Receipt> {
        self.token.transfer_from(caller, owner, to, amount)
    }

    // Sale operations
    pub fn buy_tokens(
        &mut self,
        buyer: &Identity,
        units: u128,
        paid: u128,
    ) -> LedgerResult<Receipt> {
        self.sale
            .buy_tokens(&mut self.token, &mut self.currency, buyer, units, paid)
    }

    pub fn end_sale(&mut self, caller: &Identity) -> LedgerResult<Receipt> {
        self.sale
            .end_sale(&mut self.token, &mut self.currency, caller)
    }

    // Currency operations
    /// Fund `holder` with native currency
    pub fn deposit(&mut self, holder: &Identity, amount: u128) -> LedgerResult<u128> {
        self.currency.deposit(holder, amount)
    }

    pub fn currency_balance(&self, holder: &Identity) -> u128 {
        self.currency.balance_of(holder)
    }

    // Reporting
    pub fn verify_supply(&self) -> LedgerResult<SupplyReport> {
        self.token.verify_supply()
    }

    pub fn sale_report(&self) -> LedgerResult<SaleReport> {
        self.sale
            .report(&self.token, &self.currency, self.currency_decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::memory_storage::MemoryStorage;

    #[test]
    fn test_deploy_provisions_sale() {
        let admin = Identity::generate();
        let market =
            Market::deploy(&DeploymentConfig::default(), admin, MemoryStorage::new()).unwrap();

        assert_eq!(market.balance_of(&admin).unwrap(), 250_000);
        assert_eq!(
            market.balance_of(&market.sale().address()).unwrap(),
            750_000
        );
        assert_eq!(market.sale().token_contract(), market.token().address());
        assert_eq!(market.token().events().len(), 1);
        assert!(market.verify_supply().unwrap().is_valid);
    }

    #[test]
    fn test_deploy_rejects_invalid_config() {
        let mut config = DeploymentConfig::default();
        config.sale.tokens_available = config.token.initial_supply + 1;

        let result = Market::deploy(&config, Identity::generate(), MemoryStorage::new());
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_sale_report_tracks_purchases() {
        let admin = Identity::generate();
        let buyer = Identity::generate();
        let mut market =
            Market::deploy(&DeploymentConfig::default(), admin, MemoryStorage::new()).unwrap();
        market.deposit(&buyer, 50_000_000).unwrap();
        market.buy_tokens(&buyer, 5, 50_000_000).unwrap();

        let report = market.sale_report().unwrap();
        assert_eq!(report.state, SaleState::Open);
        assert_eq!(report.tokens_sold, 5);
        assert_eq!(report.tokens_available, 749_995);
        assert_eq!(report.proceeds, 50_000_000);
        assert_eq!(market.currency_balance(&buyer), 0);
    }
}
