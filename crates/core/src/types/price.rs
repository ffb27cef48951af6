//! Type-safe price representation using decimal arithmetic.
//!
//! All storefront prices are pounds sterling. The backend sends plain JSON
//! numbers, so the wire format is a float while arithmetic stays decimal.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, Mul};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::quantity::Quantity;

/// A price in pounds sterling.
///
/// # Examples
///
/// ```
/// use rust_decimal::Decimal;
/// use scamazon_core::{Price, Quantity};
///
/// let unit = Price::new(Decimal::new(1000, 2));
/// let line = unit * Quantity::new(2).unwrap();
/// assert_eq!(line.to_string(), "£20.00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl Price {
    /// A zero price.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Create a new price from an amount in pounds.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// The amount in pounds.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// The amount rounded to whole pence.
    #[must_use]
    pub fn rounded(&self) -> Decimal {
        self.0
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// The pounds part of the rounded price, e.g. `"12"` for £12.99.
    #[must_use]
    pub fn whole(&self) -> String {
        let formatted = format!("{:.2}", self.rounded());
        formatted
            .split_once('.')
            .map_or(formatted.clone(), |(whole, _)| whole.to_string())
    }

    /// The pence part of the rounded price, always two digits, e.g. `"99"`.
    #[must_use]
    pub fn pence(&self) -> String {
        let formatted = format!("{:.2}", self.rounded());
        formatted
            .split_once('.')
            .map_or_else(|| "00".to_string(), |(_, pence)| pence.to_string())
    }

    /// The recommended retail price this price was discounted from.
    ///
    /// `rrp = price / (1 - discount / 100)`, rounded to pence. Returns `None`
    /// for a discount of 100% or more, where no finite RRP exists.
    #[must_use]
    pub fn recommended_retail(&self, discount: DiscountPercentage) -> Option<Self> {
        let remaining = Decimal::ONE - discount.as_fraction();
        if remaining <= Decimal::ZERO {
            return None;
        }
        self.0.checked_div(remaining).map(|rrp| {
            Self(rrp.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
        })
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "£{:.2}", self.rounded())
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl Mul<Quantity> for Price {
    type Output = Self;

    fn mul(self, rhs: Quantity) -> Self::Output {
        Self(self.0 * Decimal::from(rhs.get()))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<Decimal> for Price {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

/// A discount expressed as a percentage of the recommended retail price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscountPercentage(#[serde(with = "rust_decimal::serde::float")] Decimal);

impl DiscountPercentage {
    /// Create a discount from a percentage, e.g. `12.5` for 12.5%.
    #[must_use]
    pub const fn new(percent: Decimal) -> Self {
        Self(percent)
    }

    /// The percentage value.
    #[must_use]
    pub const fn percent(&self) -> Decimal {
        self.0
    }

    /// The discount as a fraction in `0..=1` for sane inputs.
    #[must_use]
    pub fn as_fraction(&self) -> Decimal {
        self.0 / Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for DiscountPercentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0.normalize())
    }
}
