//! Numeric formatting helpers.

use std::fmt;

/// Rounds to the provided number of decimal places.
///
/// The exact decimal value of `x` is rounded, with ties rounded to even. Scaling `x` before
/// rounding would instead round an inexact product, e.g. taking 0.025 (stored slightly above) to
/// 0.02 rather than 0.03.
pub fn round(x: f64, decimals: usize) -> f64 {
    // Fixed-precision formatting is exact, so parsing the digits back gives the nearest float
    format!("{x:.decimals$}").parse().unwrap_or(x)
}

/// A float displayed in shortest round-trip form, always with at least one decimal digit.
///
/// Integral values are written as e.g. `10.0` rather than `10`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Decimal(pub f64);

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_finite() && self.0.fract() == 0.0 {
            write!(f, "{:.1}", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Writes the items of an iterator separated by `sep`.
pub(crate) fn write_joined<I, T>(f: &mut fmt::Formatter<'_>, iter: I, sep: &str) -> fmt::Result
where
    I: IntoIterator<Item = T>,
    T: fmt::Display,
{
    let mut iter = iter.into_iter();

    if let Some(first) = iter.next() {
        write!(f, "{first}")?;

        for item in iter {
            write!(f, "{sep}{item}")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round() {
        assert_eq!(round(0.2, 2), 0.2);
        assert_eq!(round(1. / 3., 2), 0.33);
        assert_eq!(round(2. / 3., 2), 0.67);
        assert_eq!(round(1.0, 2), 1.0);
    }

    #[test]
    fn test_round_exact_decimal_value() {
        // 1/40 is stored slightly above 0.025, 3/40 slightly below 0.075
        assert_eq!(round(1. / 40., 2), 0.03);
        assert_eq!(round(3. / 40., 2), 0.07);
        assert_eq!(round(1. / 80., 2), 0.01);
        assert_eq!(round(39. / 40., 2), 0.97);
    }

    #[test]
    fn test_display_decimal() {
        assert_eq!(Decimal(10.0).to_string(), "10.0");
        assert_eq!(Decimal(0.0).to_string(), "0.0");
        assert_eq!(Decimal(0.25).to_string(), "0.25");
        assert_eq!(Decimal(20. / 3.).to_string(), "6.666666666666667");
        assert_eq!(Decimal(round(0.1, 2)).to_string(), "0.1");
    }
}
