//! Ledger module containing the token and its event journal

pub mod journal;
pub mod token;

pub use journal::*;
pub use token::*;
