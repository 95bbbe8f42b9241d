use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// A currency amount held as a scaled integer (cents), so that summing many
/// small shares never drifts. Serialized as a plain decimal number with
/// 2-decimal precision to keep the wire format unchanged.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Anything smaller than one cent is treated as settled.
    pub const NEGLIGIBLE: Money = Money(1);

    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    pub const fn from_major(units: i64) -> Self {
        Money(units * 100)
    }

    pub const fn cents(self) -> i64 {
        self.0
    }

    /// Converts a raw decimal amount, rounding to the nearest cent.
    /// Returns `None` for NaN or infinite input.
    pub fn from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Some(Money((value * 100.0).round() as i64))
    }

    pub fn to_f64(self) -> f64 {
        self.0 as f64 / 100.0
    }

    pub const fn abs(self) -> Self {
        Money(self.0.abs())
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Residue below one cent counts as settled.
    pub const fn is_negligible(self) -> bool {
        self.0.abs() < Self::NEGLIGIBLE.0
    }

    /// Splits the amount into `n` near-equal parts. The remainder cents go to
    /// the first parts so the pieces always sum back to the whole.
    pub fn split_evenly(self, n: usize) -> Vec<Money> {
        if n == 0 {
            return Vec::new();
        }
        let n = n as i64;
        let base = self.0 / n;
        let remainder = self.0 % n;
        (0..n)
            .map(|i| Money(base + if i < remainder.abs() { remainder.signum() } else { 0 }))
            .collect()
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Money) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        write!(f, "{}{}.{:02}", sign, cents / 100, cents % 100)
    }
}

impl fmt::Debug for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Money({})", self)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_f64())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Money::from_f64(value).ok_or_else(|| serde::de::Error::custom("amount must be a finite number"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_nearest_cent() {
        assert_eq!(Money::from_f64(10.01).unwrap().cents(), 1001);
        assert_eq!(Money::from_f64(19.99).unwrap().cents(), 1999);
        assert_eq!(Money::from_f64(0.1 + 0.2).unwrap().cents(), 30);
        assert!(Money::from_f64(f64::NAN).is_none());
        assert!(Money::from_f64(f64::INFINITY).is_none());
    }

    #[test]
    fn split_evenly_preserves_total() {
        let parts = Money::from_cents(1000).split_evenly(3);
        assert_eq!(parts, vec![Money::from_cents(334), Money::from_cents(333), Money::from_cents(333)]);
        assert_eq!(parts.into_iter().sum::<Money>(), Money::from_cents(1000));
    }

    #[test]
    fn split_evenly_handles_degenerate_counts() {
        assert!(Money::from_cents(500).split_evenly(0).is_empty());
        assert_eq!(Money::from_cents(500).split_evenly(1), vec![Money::from_cents(500)]);
    }

    #[test]
    fn negligible_threshold_is_one_cent() {
        assert!(Money::ZERO.is_negligible());
        assert!(!Money::from_cents(1).is_negligible());
        assert!(!Money::from_cents(-1).is_negligible());
    }

    #[test]
    fn displays_with_two_decimals() {
        assert_eq!(Money::from_cents(1005).to_string(), "10.05");
        assert_eq!(Money::from_cents(-5).to_string(), "-0.05");
    }
}
