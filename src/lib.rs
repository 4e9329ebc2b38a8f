//! # Token Sale Core
//!
//! A fungible token ledger with owner-delegated spending, and a fixed-price
//! sale that exchanges native currency for token units.
//!
//! ## Features
//!
//! - **Token ledger**: balances, transfers and a fixed total supply that always equals the sum of balances
//! - **Allowances**: owners approve spenders, who consume the allowance through delegated transfers
//! - **Token sale**: exact-payment purchases at a fixed price, admin-only finalization sweeping unsold units and proceeds
//! - **Typed events**: every successful mutating call returns a receipt with its event records
//! - **Storage abstraction**: balances and allowances live behind the `TokenStorage` trait
//! - **Serialized async access**: `TokenSaleService` orders concurrent callers behind a single lock
//!
//! ## Quick Start
//!
//! ```rust
//! use token_sale_core::utils::MemoryStorage;
//! use token_sale_core::{DeploymentConfig, Identity, Market};
//!
//! let admin = Identity::generate();
//! let buyer = Identity::generate();
//! let mut market = Market::deploy(&DeploymentConfig::default(), admin, MemoryStorage::new())?;
//!
//! market.deposit(&buyer, 100_000_000)?;
//! market.buy_tokens(&buyer, 10, 100_000_000)?;
//! assert_eq!(market.balance_of(&buyer)?, 10);
//! # Ok::<(), token_sale_core::LedgerError>(())
//! ```

pub mod config;
pub mod ledger;
pub mod market;
pub mod sale;
pub mod service;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::*;
pub use ledger::*;
pub use market::*;
pub use sale::*;
pub use service::*;
pub use traits::*;
pub use types::*;
