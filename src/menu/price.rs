//! Prices in soles, stored as integer céntimos

use std::fmt;
use std::iter::Sum;
use std::ops::Add;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// A non-negative amount in soles
///
/// Serialized as a JSON number with two decimals (e.g. `53.9`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price(u64);

impl Price {
    pub const ZERO: Self = Self(0);

    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    #[must_use]
    pub const fn cents(self) -> u64 {
        self.0
    }

    /// Convert from a decimal amount, rounding to the nearest céntimo
    ///
    /// Returns `None` for negative or non-finite amounts.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_soles(amount: f64) -> Option<Self> {
        if !amount.is_finite() || amount < 0.0 {
            return None;
        }
        Some(Self((amount * 100.0).round() as u64))
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_soles(self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Price of `quantity` units
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }

    /// Spoken form used in prompts: "53 con 90"
    #[must_use]
    pub fn spoken(self) -> String {
        format!("{} con {:02}", self.0 / 100, self.0 % 100)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl FromStr for Price {
    type Err = Error;

    /// Parse "53.90", "53,90", "9" or "S/ 53.90"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_start_matches("S/").trim().replace(',', ".");
        let (whole, frac) = trimmed.split_once('.').unwrap_or((trimmed.as_str(), ""));

        if whole.is_empty() || !whole.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::Menu(format!("invalid price: {s}")));
        }
        if frac.len() > 2 || !frac.chars().all(|c| c.is_ascii_digit()) {
            return Err(Error::Menu(format!("invalid price: {s}")));
        }

        let whole: u64 = whole
            .parse()
            .map_err(|_| Error::Menu(format!("invalid price: {s}")))?;
        let cents = match frac.len() {
            0 => 0,
            1 => frac.parse::<u64>().unwrap_or(0) * 10,
            _ => frac.parse::<u64>().unwrap_or(0),
        };

        whole
            .checked_mul(100)
            .and_then(|c| c.checked_add(cents))
            .map(Self)
            .ok_or_else(|| Error::Menu(format!("price out of range: {s}")))
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_soles())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(PriceVisitor)
    }
}

struct PriceVisitor;

impl Visitor<'_> for PriceVisitor {
    type Value = Price;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative amount in soles")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Price, E> {
        Price::from_soles(v).ok_or_else(|| E::custom(format!("invalid price: {v}")))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Price, E> {
        Ok(Price(v.saturating_mul(100)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Price, E> {
        u64::try_from(v)
            .map(|v| Price(v.saturating_mul(100)))
            .map_err(|_| E::custom(format!("invalid price: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Price, E> {
        v.parse().map_err(E::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!("53.90".parse::<Price>().unwrap(), Price::from_cents(5390));
        assert_eq!("S/9".parse::<Price>().unwrap(), Price::from_cents(900));
        assert_eq!("S/ 12.5".parse::<Price>().unwrap(), Price::from_cents(1250));
        assert_eq!("28,90".parse::<Price>().unwrap(), Price::from_cents(2890));
        assert!("abc".parse::<Price>().is_err());
        assert!("1.999".parse::<Price>().is_err());
        assert!("-3".parse::<Price>().is_err());
    }

    #[test]
    fn test_parse_out_of_range() {
        assert!(matches!(
            "S/ 184467440737095516".parse::<Price>(),
            Err(Error::Menu(_))
        ));
        assert!("99999999999999999999".parse::<Price>().is_err());
    }

    #[test]
    fn test_spoken_and_display() {
        let price = Price::from_cents(5390);
        assert_eq!(price.spoken(), "53 con 90");
        assert_eq!(price.to_string(), "53.90");
        assert_eq!(Price::from_cents(900).spoken(), "9 con 00");
    }

    #[test]
    fn test_from_soles_rounds() {
        assert_eq!(Price::from_soles(71.9), Some(Price::from_cents(7190)));
        assert_eq!(Price::from_soles(28.899_999), Some(Price::from_cents(2890)));
        assert_eq!(Price::from_soles(-1.0), None);
        assert_eq!(Price::from_soles(f64::NAN), None);
    }

    #[test]
    fn test_json_number() {
        let json = serde_json::to_string(&Price::from_cents(7190)).unwrap();
        assert_eq!(json, "71.9");

        let parsed: Price = serde_json::from_str("53.90").unwrap();
        assert_eq!(parsed, Price::from_cents(5390));
        let parsed: Price = serde_json::from_str("9").unwrap();
        assert_eq!(parsed, Price::from_cents(900));
    }

    #[test]
    fn test_sum() {
        let total: Price = [Price::from_cents(5390), Price::from_cents(900).times(2)]
            .into_iter()
            .sum();
        assert_eq!(total, Price::from_cents(7190));
    }
}
