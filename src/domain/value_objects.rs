//! Value objects shared across the storefront.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Money value object. The shop trades in a single currency (MXN), so the
/// amount carries no currency tag.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    pub const CURRENCY: &'static str = "MXN";

    pub fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    pub fn amount(&self) -> Decimal {
        self.0
    }

    pub fn add(&self, other: Money) -> Money {
        Money(self.0 + other.0)
    }

    pub fn multiply(&self, quantity: u32) -> Money {
        Money(self.0 * Decimal::from(quantity))
    }

    /// es-MX display form: two decimals, comma thousands separators.
    /// This is the exact rendering used in the checkout message.
    pub fn format_mxn(&self) -> String {
        let rounded = self.0.round_dp(2);
        let negative = rounded.is_sign_negative();
        let raw = format!("{:.2}", rounded.abs());
        let mut parts = raw.splitn(2, '.');
        let int_part = parts.next().unwrap_or("0");
        let frac_part = parts.next().unwrap_or("00");

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if negative { "-" } else { "" };
        format!("{sign}{grouped}.{frac_part}")
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${} {}", self.format_mxn(), Self::CURRENCY)
    }
}

/// URL slug value object: lowercase alphanumerics and hyphens.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slug(String);

impl Slug {
    pub fn new(value: impl Into<String>) -> Result<Self, SlugError> {
        let value = value.into().trim().to_lowercase();
        if value.is_empty() {
            return Err(SlugError::Empty);
        }
        if value.len() > 120 {
            return Err(SlugError::TooLong);
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(SlugError::InvalidCharacter);
        }
        Ok(Self(value))
    }

    /// Derives a slug from a display name, collapsing runs of anything
    /// non-alphanumeric into single hyphens.
    pub fn from_name(name: &str) -> Result<Self, SlugError> {
        let mut slug = String::with_capacity(name.len());
        let mut last_hyphen = true;
        for c in name.trim().to_lowercase().chars() {
            if c.is_ascii_lowercase() || c.is_ascii_digit() {
                slug.push(c);
                last_hyphen = false;
            } else if !last_hyphen {
                slug.push('-');
                last_hyphen = true;
            }
        }
        while slug.ends_with('-') {
            slug.pop();
        }
        Self::new(slug)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Slug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug is empty")]
    Empty,
    #[error("slug is too long")]
    TooLong,
    #[error("slug may only contain lowercase letters, digits and hyphens")]
    InvalidCharacter,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_formats_with_thousands_separators() {
        assert_eq!(Money::new(Decimal::new(123456789, 2)).format_mxn(), "1,234,567.89");
        assert_eq!(Money::new(Decimal::new(100, 0)).format_mxn(), "100.00");
        assert_eq!(Money::new(Decimal::new(15995, 1)).format_mxn(), "1,599.50");
        assert_eq!(Money::zero().format_mxn(), "0.00");
    }

    #[test]
    fn money_formats_negative_balances() {
        assert_eq!(Money::new(Decimal::new(-250050, 2)).format_mxn(), "-2,500.50");
    }

    #[test]
    fn money_rounds_to_two_decimals() {
        assert_eq!(Money::new(Decimal::new(19999, 3)).format_mxn(), "20.00");
    }

    #[test]
    fn money_arithmetic() {
        let a = Money::new(Decimal::new(100, 0));
        let b = Money::new(Decimal::new(50, 0));
        assert_eq!(a.add(b).amount(), Decimal::new(150, 0));
        assert_eq!(a.multiply(3).amount(), Decimal::new(300, 0));
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::new(Decimal::new(1250, 0)).to_string(), "$1,250.00 MXN");
    }

    #[test]
    fn slug_normalizes_case() {
        let slug = Slug::new("Collar-Luna-2").unwrap();
        assert_eq!(slug.as_str(), "collar-luna-2");
    }

    #[test]
    fn slug_rejects_invalid_characters() {
        assert_eq!(Slug::new("aretes de plata"), Err(SlugError::InvalidCharacter));
        assert_eq!(Slug::new("  "), Err(SlugError::Empty));
    }

    #[test]
    fn slug_from_name_collapses_punctuation() {
        let slug = Slug::from_name("Collar Luna & Edición 2").unwrap();
        assert_eq!(slug.as_str(), "collar-luna-edici-n-2");
    }
}
