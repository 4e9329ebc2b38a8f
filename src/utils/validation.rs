//! Validation utilities

use crate::types::*;

/// Validate a metadata field is present and of reasonable length
pub fn validate_metadata_field(field: &str, value: &str, max_len: usize) -> LedgerResult<()> {
    if value.trim().is_empty() {
        return Err(LedgerError::Validation(format!(
            "Token {} cannot be empty",
            field
        )));
    }

    if value.len() > max_len {
        return Err(LedgerError::Validation(format!(
            "Token {} cannot exceed {} characters",
            field, max_len
        )));
    }

    Ok(())
}

/// Validate token metadata
pub fn validate_metadata(metadata: &TokenMetadata) -> LedgerResult<()> {
    validate_metadata_field("name", &metadata.name, 100)?;
    validate_metadata_field("symbol", &metadata.symbol, 16)?;
    validate_metadata_field("standard", &metadata.standard, 100)?;
    Ok(())
}

/// Validate that a price is positive
pub fn validate_positive_price(price: u128) -> LedgerResult<()> {
    if price == 0 {
        Err(LedgerError::Validation(
            "Token price must be positive".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Exact payment owed for `units` at `price`, `None` when it overflows
pub fn required_payment(units: u128, price: u128) -> Option<u128> {
    units.checked_mul(price)
}

/// Check a payment equals `units * price` exactly
pub fn validate_payment(units: u128, price: u128, paid: u128) -> LedgerResult<()> {
    let expected = required_payment(units, price);
    if expected == Some(paid) {
        Ok(())
    } else {
        Err(LedgerError::PaymentMismatch { expected, paid })
    }
}

/// Add to a balance, failing instead of wrapping
pub fn checked_credit(balance: u128, amount: u128, what: &str) -> LedgerResult<u128> {
    balance
        .checked_add(amount)
        .ok_or_else(|| LedgerError::ArithmeticOverflow(format!("{} exceeds u128", what)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_validation() {
        let ok = TokenMetadata::new("RC Token".into(), "RC".into(), "RC Token v1.0".into());
        assert!(validate_metadata(&ok).is_ok());

        let blank = TokenMetadata::new("  ".into(), "RC".into(), "v1".into());
        assert!(matches!(
            validate_metadata(&blank),
            Err(LedgerError::Validation(_))
        ));

        let long_symbol = TokenMetadata::new("RC".into(), "R".repeat(17), "v1".into());
        assert!(validate_metadata(&long_symbol).is_err());
    }

    #[test]
    fn test_payment_must_match_exactly() {
        assert!(validate_payment(10, 10_000_000, 100_000_000).is_ok());
        assert_eq!(
            validate_payment(10, 10_000_000, 1),
            Err(LedgerError::PaymentMismatch {
                expected: Some(100_000_000),
                paid: 1
            })
        );
        // Overpayment is rejected too
        assert!(validate_payment(10, 10_000_000, 100_000_001).is_err());
        assert!(validate_payment(0, 10_000_000, 0).is_ok());
    }

    #[test]
    fn test_overflowing_payment_never_matches() {
        assert_eq!(required_payment(u128::MAX, 2), None);
        assert_eq!(
            validate_payment(u128::MAX, 2, u128::MAX),
            Err(LedgerError::PaymentMismatch {
                expected: None,
                paid: u128::MAX
            })
        );
    }

    #[test]
    fn test_checked_credit() {
        assert_eq!(checked_credit(1, 2, "balance").unwrap(), 3);
        assert!(matches!(
            checked_credit(u128::MAX, 1, "balance"),
            Err(LedgerError::ArithmeticOverflow(_))
        ));
        assert!(validate_positive_price(0).is_err());
    }
}
