//! Type-safe price representation using decimal arithmetic.
//!
//! Prices are currency-agnostic at the data level. The currency label is
//! appended only when a price is formatted for display, e.g. `"25.50 MAD"`.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Errors that can occur when constructing a [`Price`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PriceError {
    /// The amount is below zero.
    #[error("price cannot be negative (got {0})")]
    Negative(Decimal),
    /// The input could not be parsed as a decimal number.
    #[error("invalid price: {0}")]
    Invalid(String),
    /// The amount is above [`Price::MAX`].
    #[error("price cannot exceed {max} (got {0})", max = Price::MAX.0)]
    TooLarge(Decimal),
    /// The amount has more than [`Price::MAX_SCALE`] decimal places.
    #[error("price cannot have more than {max_scale} decimal places (got {0})", max_scale = Price::MAX_SCALE)]
    TooPrecise(Decimal),
}

/// A non-negative unit price of at most [`Price::MAX`] with at most
/// [`Price::MAX_SCALE`] decimal places.
///
/// Serialized as a plain JSON number so the persisted cart keeps the
/// `{id, name, price, image, quantity}` shape. Within these bounds every
/// price has at most 15 significant digits and survives the `f64` round trip
/// exactly. Deserialization applies the same checks as [`Price::new`].
///
/// Sums and products of prices are totals, not unit prices, so they may
/// exceed [`Price::MAX`]. They saturate instead of overflowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Price(Decimal);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Most decimal places a price may carry.
    pub const MAX_SCALE: u32 = 2;

    /// Largest accepted unit price.
    pub const MAX: Self = Self(Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0));

    /// Create a new price.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Negative` if `amount` is below zero,
    /// `PriceError::TooLarge` if it is above [`Price::MAX`], or
    /// `PriceError::TooPrecise` if it has more than [`Price::MAX_SCALE`] decimal
    /// places after trailing zeros are dropped.
    pub fn new(amount: Decimal) -> Result<Self, PriceError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(PriceError::Negative(amount));
        }
        if amount > Self::MAX.0 {
            return Err(PriceError::TooLarge(amount));
        }
        let amount = amount.normalize();
        if amount.scale() > Self::MAX_SCALE {
            return Err(PriceError::TooPrecise(amount));
        }
        Ok(Self(amount))
    }

    /// Parse a price from user input such as `"19.99"`.
    ///
    /// # Errors
    ///
    /// Returns `PriceError::Invalid` if the input is not a decimal number, or
    /// any error of [`Price::new`].
    pub fn parse(input: &str) -> Result<Self, PriceError> {
        let amount = input
            .trim()
            .parse::<Decimal>()
            .map_err(|_| PriceError::Invalid(input.to_string()))?;
        Self::new(amount)
    }

    /// Get the underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Format with two decimal places and the given currency label.
    #[must_use]
    pub fn format(&self, currency: CurrencyCode) -> String {
        let rounded = self
            .0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        format!("{rounded:.2} {}", currency.label())
    }

    /// Add two prices, or `None` on overflow.
    #[must_use]
    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    /// Multiply by a quantity, or `None` on overflow.
    #[must_use]
    pub fn checked_mul(self, quantity: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(quantity)).map(Self)
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        rust_decimal::serde::float::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let amount = rust_decimal::serde::float::deserialize(deserializer)?;
        Self::new(amount).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(CurrencyCode::default()))
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Mul<u32> for Price {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(Decimal::from(quantity)))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = PriceError;

    fn try_from(amount: Decimal) -> Result<Self, Self::Error> {
        Self::new(amount)
    }
}

/// Display currency for prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CurrencyCode {
    /// Moroccan dirham.
    #[default]
    MAD,
    EUR,
    USD,
}

impl CurrencyCode {
    /// The label appended to formatted prices.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::MAD => "MAD",
            Self::EUR => "EUR",
            Self::USD => "USD",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_price_rejects_negative() {
        let result = Price::new(Decimal::new(-1, 2));
        assert!(matches!(result, Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_price_parse() {
        assert_eq!(Price::parse("19.99").unwrap().amount(), Decimal::new(1999, 2));
        assert!(matches!(Price::parse("abc"), Err(PriceError::Invalid(_))));
        assert!(matches!(Price::parse("-3"), Err(PriceError::Negative(_))));
    }

    #[test]
    fn test_price_format_pads_to_two_places() {
        let price = Price::parse("25.5").unwrap();
        assert_eq!(price.to_string(), "25.50 MAD");
        assert_eq!(Price::ZERO.to_string(), "0.00 MAD");
        assert_eq!(price.format(CurrencyCode::EUR), "25.50 EUR");
    }

    #[test]
    fn test_price_max_is_one_trillion() {
        assert_eq!(Price::MAX.amount(), Decimal::new(1_000_000_000_000, 0));
        assert_eq!(Price::parse("1000000000000").unwrap(), Price::MAX);
    }

    #[test]
    fn test_price_rejects_out_of_range_amounts() {
        assert!(matches!(
            Price::parse("79228162514264337593543950335"),
            Err(PriceError::TooLarge(_))
        ));
        assert!(matches!(
            Price::parse("1000000000000.01"),
            Err(PriceError::TooLarge(_))
        ));
        assert!(matches!(Price::parse("1.005"), Err(PriceError::TooPrecise(_))));
        assert_eq!(Price::parse("19.990").unwrap().to_string(), "19.99 MAD");
    }

    #[test]
    fn test_price_max_survives_float_round_trip() {
        let price = Price::parse("999999999999.99").unwrap();
        let json = serde_json::to_string(&price).unwrap();
        let back: Price = serde_json::from_str(&json).unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_price_deserialize_checks_bounds() {
        assert!(serde_json::from_str::<Price>("-1.5").is_err());
        assert!(serde_json::from_str::<Price>("7.922816251426434e28").is_err());
        assert!(serde_json::from_str::<Price>("0").is_ok());
    }

    #[test]
    fn test_price_arithmetic_does_not_panic() {
        let huge = Price(Decimal::MAX);
        assert_eq!(huge + huge, huge);
        assert_eq!(huge * 3, huge);
        assert!(huge.checked_add(huge).is_none());
        assert!(huge.checked_mul(2).is_none());
        assert_eq!(
            Price::MAX.checked_add(Price::MAX).unwrap().amount(),
            Decimal::new(2_000_000_000_000, 0)
        );
    }

    #[test]
    fn test_price_serializes_as_number() {
        let price = Price::parse("19.99").unwrap();
        assert_eq!(serde_json::to_string(&price).unwrap(), "19.99");

        let back: Price = serde_json::from_str("19.99").unwrap();
        assert_eq!(back, price);
    }

    #[test]
    fn test_price_sum_and_multiply() {
        let prices = [Price::parse("10.00").unwrap(), Price::parse("15.50").unwrap()];
        let total: Price = prices.into_iter().sum();
        assert_eq!(total.to_string(), "25.50 MAD");
        assert_eq!((Price::parse("2.25").unwrap() * 3).to_string(), "6.75 MAD");
    }
}
