//! Menu price representation using decimal arithmetic.
//!
//! Prices travel as plain JSON numbers on the wire (the mobile app and the
//! Supabase `numeric` column both speak floats), but all arithmetic happens
//! on [`rust_decimal::Decimal`] to avoid binary-float drift.

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::status::CupSize;

/// A product price in the shop's single display currency.
///
/// Beverage prices are adjusted per cup size via [`SizePriceModifiers`];
/// dessert prices are always flat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(Decimal);

impl Price {
    /// Create a new price.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The raw decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is strictly greater than zero.
    ///
    /// Catalog validation rejects non-positive prices.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Apply a signed percentage adjustment, rounded to cents.
    ///
    /// A modifier of `10` raises the price by 10%, `-25` lowers it by 25%.
    #[must_use]
    pub fn with_modifier(&self, percent: Decimal) -> Self {
        let factor = Decimal::ONE + percent / Decimal::ONE_HUNDRED;
        Self((self.0 * factor).round_dp(2))
    }

    /// Price for a given cup size.
    ///
    /// Sizes without a configured modifier (and products without any
    /// modifiers at all) fall back to the flat price.
    #[must_use]
    pub fn for_size(&self, size: CupSize, modifiers: Option<&SizePriceModifiers>) -> Self {
        match modifiers.and_then(|m| m.modifier_for(size)) {
            Some(percent) => self.with_modifier(percent),
            None => *self,
        }
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        rust_decimal::serde::float::deserialize(deserializer).map(Self)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

/// Partial per-size percentage adjustments for beverage prices.
///
/// Keys on the wire are the capitalized size names (`Small`, `Medium`,
/// `Large`), matching the stored JSON column. Absent sizes use the flat
/// price.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SizePriceModifiers {
    /// Adjustment for a small cup, in percent.
    #[serde(
        rename = "Small",
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub small: Option<Decimal>,
    /// Adjustment for a medium cup, in percent.
    #[serde(
        rename = "Medium",
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub medium: Option<Decimal>,
    /// Adjustment for a large cup, in percent.
    #[serde(
        rename = "Large",
        default,
        skip_serializing_if = "Option::is_none",
        with = "rust_decimal::serde::float_option"
    )]
    pub large: Option<Decimal>,
}

impl SizePriceModifiers {
    /// The configured modifier for a size, if any.
    #[must_use]
    pub const fn modifier_for(&self, size: CupSize) -> Option<Decimal> {
        match size {
            CupSize::Small => self.small,
            CupSize::Medium => self.medium,
            CupSize::Large => self.large,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_is_positive() {
        assert!(Price::new(dec("0.01")).is_positive());
        assert!(!Price::new(Decimal::ZERO).is_positive());
        assert!(!Price::new(dec("-1")).is_positive());
    }

    #[test]
    fn test_with_modifier_raises_and_lowers() {
        let price = Price::new(dec("4.00"));
        assert_eq!(price.with_modifier(dec("10")).amount(), dec("4.40"));
        assert_eq!(price.with_modifier(dec("-25")).amount(), dec("3.00"));
    }

    #[test]
    fn test_with_modifier_rounds_to_cents() {
        let price = Price::new(dec("3.33"));
        // 3.33 * 1.1 = 3.663
        assert_eq!(price.with_modifier(dec("10")).amount(), dec("3.66"));
    }

    #[test]
    fn test_for_size_uses_configured_modifier() {
        let modifiers = SizePriceModifiers {
            small: Some(dec("-20")),
            medium: None,
            large: Some(dec("30")),
        };
        let price = Price::new(dec("5.00"));

        assert_eq!(
            price.for_size(CupSize::Small, Some(&modifiers)).amount(),
            dec("4.00")
        );
        assert_eq!(
            price.for_size(CupSize::Large, Some(&modifiers)).amount(),
            dec("6.50")
        );
    }

    #[test]
    fn test_for_size_falls_back_to_flat_price() {
        let modifiers = SizePriceModifiers {
            small: Some(dec("-20")),
            medium: None,
            large: None,
        };
        let price = Price::new(dec("5.00"));

        assert_eq!(price.for_size(CupSize::Medium, Some(&modifiers)), price);
        assert_eq!(price.for_size(CupSize::Large, None), price);
    }

    #[test]
    fn test_price_serializes_as_number() {
        let price = Price::new(dec("4.5"));
        let json = serde_json::to_string(&price).unwrap();
        assert_eq!(json, "4.5");

        let back: Price = serde_json::from_str("4.5").unwrap();
        assert_eq!(back.amount(), dec("4.5"));
    }

    #[test]
    fn test_modifiers_wire_keys_are_capitalized() {
        let modifiers = SizePriceModifiers {
            small: Some(dec("-10")),
            medium: None,
            large: Some(dec("15")),
        };
        let json = serde_json::to_value(modifiers).unwrap();
        assert_eq!(json, serde_json::json!({"Small": -10.0, "Large": 15.0}));

        let back: SizePriceModifiers =
            serde_json::from_value(serde_json::json!({"Medium": 5})).unwrap();
        assert_eq!(back.modifier_for(CupSize::Medium), Some(dec("5")));
        assert_eq!(back.modifier_for(CupSize::Small), None);
    }
}
