//! Conversion between smallest currency units and major units

use bigdecimal::BigDecimal;
use std::str::FromStr;

use crate::types::*;

/// Express `amount` smallest units as major units with `decimals` places
///
/// With 18 decimals, 10,000,000 smallest units is 0.00000000001.
pub fn to_major_units(amount: u128, decimals: u32) -> LedgerResult<BigDecimal> {
    let value = BigDecimal::from_str(&format!("{}E-{}", amount, decimals))
        .map_err(|e| LedgerError::Validation(format!("Invalid currency amount: {}", e)))?;
    Ok(value.normalized())
}
