//! Shared, serialized access to a market from concurrent tasks

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::warn;

use crate::market::Market;
use crate::traits::*;
use crate::types::*;

/// Async front for a [`Market`] shared between tasks
///
/// Every mutation takes the single write guard, so all mutations are totally
/// ordered and none observes another half-applied. Events of each committed
/// call are published to the sink while the guard is still held, which keeps
/// the sink's order identical to commit order. Currency deposits change
/// state but emit no events, so they never reach the sink.
pub struct TokenSaleService<S: TokenStorage> {
    state: Arc<RwLock<Market<S>>>,
    sink: Arc<dyn EventSink>,
}

impl<S: TokenStorage> Clone for TokenSaleService<S> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
            sink: Arc::clone(&self.sink),
        }
    }
}

impl<S: TokenStorage> TokenSaleService<S> {
    /// Wrap a market, publishing committed events to `sink`
    pub fn new(market: Market<S>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            state: Arc::new(RwLock::new(market)),
            sink,
        }
    }

    // Reads
    pub async fn balance_of(&self, holder: Identity) -> LedgerResult<u128> {
        self.state.read().await.balance_of(&holder)
    }

    pub async fn allowance(&self, owner: Identity, spender: Identity) -> LedgerResult<u128> {
        self.state.read().await.allowance(&owner, &spender)
    }

    pub async fn total_supply(&self) -> u128 {
        self.state.read().await.token().total_supply()
    }

    pub async fn token_price(&self) -> u128 {
        self.state.read().await.sale().token_price()
    }

    pub async fn tokens_sold(&self) -> u128 {
        self.state.read().await.sale().tokens_sold()
    }

    pub async fn sale_address(&self) -> Identity {
        self.state.read().await.sale().address()
    }

    pub async fn currency_balance(&self, holder: Identity) -> u128 {
        self.state.read().await.currency_balance(&holder)
    }

    pub async fn verify_supply(&self) -> LedgerResult<SupplyReport> {
        self.state.read().await.verify_supply()
    }

    pub async fn sale_report(&self) -> LedgerResult<SaleReport> {
        self.state.read().await.sale_report()
    }

    // Mutations
    pub async fn transfer(
        &self,
        caller: Identity,
        to: Identity,
        amount: u128,
    ) -> LedgerResult<Receipt> {
        let mut market = self.state.write().await;
        let receipt = market.transfer(&caller, &to, amount)?;
        self.publish(&receipt.logs).await;
        Ok(receipt)
    }

    pub async fn approve(
        &self,
        caller: Identity,
        spender: Identity,
        amount: u128,
    ) -> LedgerResult<Receipt> {
        let mut market = self.state.write().await;
        let receipt = market.approve(&caller, &spender, amount)?;
        self.publish(&receipt.logs).await;
        Ok(receipt)
    }

    pub async fn transfer_from(
        &self,
        caller: Identity,
        owner: Identity,
        to: Identity,
        amount: u128,
    ) -> LedgerResult<Receipt> {
        let mut market = self.state.write().await;
        let receipt = market.transfer_from(&caller, &owner, &to, amount)?;
        self.publish(&receipt.logs).await;
        Ok(receipt)
    }

    /// Fund `holder` with native currency
    ///
    /// Deposits provision the external currency and are not part of the
    /// token or sale event stream; nothing is published to the sink.
    pub async fn deposit(&self, holder: Identity, amount: u128) -> LedgerResult<u128> {
        self.state.write().await.deposit(&holder, amount)
    }

    pub async fn buy_tokens(
        &self,
        buyer: Identity,
        units: u128,
        paid: u128,
    ) -> LedgerResult<Receipt> {
        let mut market = self.state.write().await;
        let mark = market.token().events().len();
        let receipt = market.buy_tokens(&buyer, units, paid)?;
        self.publish_with_token_events(&market, mark, &receipt)
            .await;
        Ok(receipt)
    }

    pub async fn end_sale(&self, caller: Identity) -> LedgerResult<Receipt> {
        let mut market = self.state.write().await;
        let mark = market.token().events().len();
        let receipt = market.end_sale(&caller)?;
        self.publish_with_token_events(&market, mark, &receipt)
            .await;
        Ok(receipt)
    }

    // Sale calls also emit token transfers; publish those first, as they happen first
    async fn publish_with_token_events(&self, market: &Market<S>, mark: usize, receipt: &Receipt) {
        let mut records = market.token().events()[mark..].to_vec();
        records.extend(receipt.logs.iter().cloned());
        self.publish(&records).await;
    }

    async fn publish(&self, records: &[EventRecord]) {
        if let Err(e) = self.sink.publish(records).await {
            warn!(
                "Event publication failed after commit: records={}, error={}",
                records.len(),
                e
            );
        }
    }
}
