//! Sale module containing the fixed-price sale and native currency balances

pub mod core;
pub mod currency;

pub use self::core::*;
pub use currency::*;
