//! Catalog pricing and charge arithmetic

use crate::error::CheckoutError;

/// Fixed decimal scale for charges: one micro-unit is 10^-6 of the display
/// currency.
const CHARGE_SCALE: u64 = 1_000_000;

/// Store catalog, prices in charge micro-units.
const CATALOG: &[(&str, u64)] = &[
    ("cookie", 1_500_000),
    ("box-of-cookies", 5_000_000),
    ("basket-of-cookies", 12_000_000),
];

/// An exact decimal amount owed, held as integer micro-units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Charge {
    micros: u64,
}

impl Charge {
    pub const fn from_micros(micros: u64) -> Self {
        Self { micros }
    }

    pub const fn micros(self) -> u64 {
        self.micros
    }

    pub const fn is_zero(self) -> bool {
        self.micros == 0
    }

    /// Convert to token smallest units at the mint's precision, optionally
    /// halved. One exact integer computation with the halving divisor folded
    /// into the same division; round-half-up at the final unit boundary.
    pub fn to_token_units(self, decimals: u8, halved: bool) -> Result<u64, CheckoutError> {
        let divisor = u128::from(CHARGE_SCALE) * if halved { 2 } else { 1 };
        let scale = 10u128
            .checked_pow(u32::from(decimals))
            .ok_or_else(|| CheckoutError::Network(format!("unsupported mint precision {decimals}")))?;
        let scaled = u128::from(self.micros)
            .checked_mul(scale)
            .ok_or_else(|| CheckoutError::InvalidRequest("charge too large".to_string()))?;
        let units = (scaled + divisor / 2) / divisor;
        u64::try_from(units)
            .map_err(|_| CheckoutError::InvalidRequest("charge too large".to_string()))
    }
}

/// Derive the charge from the request's repeatable item/quantity pairs.
/// Keys that are not catalog items (the reference parameter among them) are
/// skipped; quantities accumulate across repeated keys.
pub fn calculate_price(items: &[(String, String)]) -> Result<Charge, CheckoutError> {
    let mut total: u64 = 0;
    for (id, quantity) in items {
        let price = match CATALOG.iter().find(|(name, _)| *name == id.as_str()) {
            Some((_, price)) => *price,
            None => continue,
        };
        let quantity: u64 = quantity
            .parse()
            .map_err(|_| CheckoutError::InvalidRequest(format!("invalid quantity for {id}")))?;
        let line = price
            .checked_mul(quantity)
            .ok_or_else(|| CheckoutError::InvalidRequest("charge too large".to_string()))?;
        total = total
            .checked_add(line)
            .ok_or_else(|| CheckoutError::InvalidRequest("charge too large".to_string()))?;
    }
    Ok(Charge::from_micros(total))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn sums_catalog_items() {
        let charge = calculate_price(&pairs(&[("cookie", "2"), ("box-of-cookies", "1")])).unwrap();
        assert_eq!(charge.micros(), 8_000_000);
    }

    #[test]
    fn repeated_keys_accumulate() {
        let charge = calculate_price(&pairs(&[("cookie", "1"), ("cookie", "3")])).unwrap();
        assert_eq!(charge.micros(), 6_000_000);
    }

    #[test]
    fn skips_unknown_keys_and_reference() {
        let charge = calculate_price(&pairs(&[
            ("box-of-cookies", "1"),
            ("reference", "4HZCNvobxtDA3uezTGmDAEqVLp7oo73UrnbxNeUMszd4"),
            ("brownie", "7"),
        ]))
        .unwrap();
        assert_eq!(charge.micros(), 5_000_000);
    }

    #[test]
    fn empty_selection_is_zero() {
        let charge = calculate_price(&[]).unwrap();
        assert!(charge.is_zero());
    }

    #[test]
    fn bad_quantity_is_invalid() {
        let err = calculate_price(&pairs(&[("cookie", "many")])).unwrap_err();
        assert!(matches!(err, CheckoutError::InvalidRequest(_)));
    }

    #[test]
    fn full_charge_converts_exactly() {
        let units = Charge::from_micros(10_000_000).to_token_units(6, false).unwrap();
        assert_eq!(units, 10_000_000);
    }

    #[test]
    fn halved_charge_keeps_precision() {
        // 5.00 halved at 2 decimals: 2.50 -> 250 units, no loss.
        let units = Charge::from_micros(5_000_000).to_token_units(2, true).unwrap();
        assert_eq!(units, 250);
    }

    #[test]
    fn half_unit_rounds_up() {
        // 0.000005 halved at 6 decimals is 2.5 smallest units.
        let units = Charge::from_micros(5).to_token_units(6, true).unwrap();
        assert_eq!(units, 3);
    }

    #[test]
    fn below_half_unit_rounds_down() {
        // 0.000001 at 0 decimals is far below one unit.
        let units = Charge::from_micros(1).to_token_units(0, false).unwrap();
        assert_eq!(units, 0);
    }
}
