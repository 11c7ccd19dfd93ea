//! Fixed-point currency helpers.
//!
//! Prices and balances are NUMERIC(10,2) columns surfaced as [`BigDecimal`];
//! payment gateways report amounts as integer minor units (cents). Conversion
//! between the two must be exact: a purchase is only valid when
//! `price * quantity` equals the confirmed amount to the cent.

use bigdecimal::{BigDecimal, ToPrimitive};

use crate::error::{Result, WristpassError};

/// Convert a decimal currency amount to integer minor units (cents).
///
/// Fails when the amount carries sub-cent precision or overflows i64, both of
/// which indicate corrupted pricing data rather than a user mistake.
pub fn to_minor_units(amount: &BigDecimal) -> Result<i64> {
    let scaled = amount * BigDecimal::from(100);
    // BigDecimal equality is value-based, so truncating the fractional digits
    // changes the value only when sub-cent precision was present.
    if scaled.with_scale(0) != scaled {
        return Err(WristpassError::Validation(format!(
            "amount {amount} has sub-cent precision"
        )));
    }
    scaled.with_scale(0).to_i64().ok_or_else(|| {
        WristpassError::Validation(format!("amount {amount} overflows minor units"))
    })
}

/// Line total for `quantity` units at `unit_price`.
pub fn line_total(unit_price: &BigDecimal, quantity: i32) -> BigDecimal {
    unit_price * BigDecimal::from(quantity)
}

/// True when `amount` is strictly positive.
pub fn is_positive(amount: &BigDecimal) -> bool {
    amount > &BigDecimal::from(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn whole_euros_to_cents() {
        let amount = BigDecimal::from_str("25.00").unwrap();
        assert_eq!(to_minor_units(&amount).unwrap(), 2500);
    }

    #[test]
    fn cents_preserved_exactly() {
        let amount = BigDecimal::from_str("19.99").unwrap();
        assert_eq!(to_minor_units(&amount).unwrap(), 1999);
    }

    #[test]
    fn sub_cent_precision_rejected() {
        let amount = BigDecimal::from_str("10.005").unwrap();
        assert!(matches!(
            to_minor_units(&amount),
            Err(WristpassError::Validation(_))
        ));
    }

    #[test]
    fn line_total_multiplies_exactly() {
        let price = BigDecimal::from_str("12.50").unwrap();
        assert_eq!(
            line_total(&price, 3),
            BigDecimal::from_str("37.50").unwrap()
        );
        assert_eq!(to_minor_units(&line_total(&price, 3)).unwrap(), 3750);
    }

    #[test]
    fn positivity() {
        assert!(is_positive(&BigDecimal::from_str("0.01").unwrap()));
        assert!(!is_positive(&BigDecimal::from(0)));
        assert!(!is_positive(&BigDecimal::from_str("-5.00").unwrap()));
    }
}
