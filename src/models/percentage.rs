//! Percentage type for category shares
//!
//! Stores shares as integer basis points (hundredths of a percent) so that
//! category percentages keep exactly two decimals and sums close without
//! floating-point drift. `100%` is `10_000` basis points.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Integer division rounding half away from zero
pub(crate) fn div_round(numerator: i128, denominator: i128) -> i128 {
    if denominator == 0 {
        return 0;
    }
    let (n, d) = if denominator < 0 {
        (-numerator, -denominator)
    } else {
        (numerator, denominator)
    };
    if n >= 0 {
        (n + d / 2) / d
    } else {
        -((-n + d / 2) / d)
    }
}

/// A share of the total budget, in basis points
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Percentage(i64);

impl Percentage {
    /// The whole budget
    pub const HUNDRED: Percentage = Percentage(10_000);

    /// Create a percentage from basis points
    pub const fn from_basis_points(bp: i64) -> Self {
        Self(bp)
    }

    /// Create a percentage from a percent value, rounded to two decimals
    ///
    /// # Examples
    /// ```
    /// use wedding_budget::models::Percentage;
    /// assert_eq!(Percentage::from_percent(2.5).basis_points(), 250);
    /// ```
    pub fn from_percent(percent: f64) -> Self {
        Self((percent * 100.0).round() as i64)
    }

    /// `part / whole` as a percentage; zero when `whole` is zero
    pub fn from_ratio(part: i64, whole: i64) -> Self {
        let bp = div_round(part as i128 * 10_000, whole as i128);
        Self(bp.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }

    /// Zero percent
    pub const fn zero() -> Self {
        Self(0)
    }

    /// Get the value in basis points
    pub const fn basis_points(&self) -> i64 {
        self.0
    }

    /// Get the value as a percent number (e.g. `30.0`)
    pub fn as_percent(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Check if the share is zero
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Check if the share is negative
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Absolute distance between two percentages
    pub const fn abs_diff(&self, other: Percentage) -> Percentage {
        Percentage((self.0 - other.0).abs())
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}{}.{:02}%", sign, abs / 100, abs % 100)
    }
}

impl Add for Percentage {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0 + other.0)
    }
}

impl AddAssign for Percentage {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Percentage {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0 - other.0)
    }
}

impl SubAssign for Percentage {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl std::iter::Sum for Percentage {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Percentage::zero(), |acc, p| acc + p)
    }
}

// Serialized as a plain percent number so snapshots read `"percentage": 30.0`.
impl Serialize for Percentage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_percent())
    }
}

impl<'de> Deserialize<'de> for Percentage {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let percent = f64::deserialize(deserializer)?;
        if !percent.is_finite() {
            return Err(serde::de::Error::custom("percentage must be a finite number"));
        }
        Ok(Self::from_percent(percent))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_div_round() {
        assert_eq!(div_round(5, 2), 3);
        assert_eq!(div_round(4, 2), 2);
        assert_eq!(div_round(-5, 2), -3);
        assert_eq!(div_round(7, -2), -4);
        assert_eq!(div_round(7, 0), 0);
    }

    #[test]
    fn test_from_percent_rounds_to_two_decimals() {
        assert_eq!(Percentage::from_percent(30.0).basis_points(), 3000);
        assert_eq!(Percentage::from_percent(2.064).basis_points(), 206);
        assert_eq!(Percentage::from_percent(2.066).basis_points(), 207);
    }

    #[test]
    fn test_from_ratio() {
        assert_eq!(Percentage::from_ratio(1, 3).basis_points(), 3333);
        assert_eq!(Percentage::from_ratio(2, 3).basis_points(), 6667);
        assert_eq!(Percentage::from_ratio(10, 0), Percentage::zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Percentage::from_basis_points(3000).to_string(), "30.00%");
        assert_eq!(Percentage::from_basis_points(206).to_string(), "2.06%");
        assert_eq!(Percentage::from_basis_points(-5).to_string(), "-0.05%");
    }

    #[test]
    fn test_sum_and_arithmetic() {
        let parts = vec![
            Percentage::from_percent(30.0),
            Percentage::from_percent(25.0),
            Percentage::from_percent(45.0),
        ];
        let total: Percentage = parts.into_iter().sum();
        assert_eq!(total, Percentage::HUNDRED);
        assert_eq!(
            (Percentage::HUNDRED - Percentage::from_percent(2.0)).basis_points(),
            9800
        );
    }

    #[test]
    fn test_serialization_as_percent_number() {
        let p = Percentage::from_basis_points(206);
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "2.06");

        let back: Percentage = serde_json::from_str("30").unwrap();
        assert_eq!(back.basis_points(), 3000);
    }
}
