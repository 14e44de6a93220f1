//! Parity-weighted average of matched values.
//!
//! Even values weigh 20, odd values weigh 10. The average is
//! `Σ(v·w) / Σw`, printed with exactly one fractional digit. Values that do
//! not parse as integers are left out of both sums. Integers have no size
//! limit and both sums stay exact; the quotient is rounded once to the
//! nearest double before formatting.

use std::str::FromStr;

use bigdecimal::num_bigint::BigInt;
use bigdecimal::num_traits::Zero;
use bigdecimal::{BigDecimal, RoundingMode};
use tracing::trace;

const EVEN_WEIGHT: u64 = 20;
const ODD_WEIGHT: u64 = 10;

pub fn weight(value: &BigInt) -> u64 {
    if (value % 2u32).is_zero() { EVEN_WEIGHT } else { ODD_WEIGHT }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct WeightedAverage {
    weighted_sum: BigInt,
    total_weight: u64,
    skipped: usize,
}

impl WeightedAverage {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn push(&mut self, value: BigInt) {
        let w = weight(&value);
        self.weighted_sum += value * w;
        self.total_weight += w;
    }
    /// Parses a trimmed field and adds it; returns false when it was not an integer.
    pub fn push_field(&mut self, field: &str) -> bool {
        match BigInt::from_str(field.trim()) {
            Ok(value) => {
                self.push(value);
                true
            }
            Err(_) => {
                trace!(field, "non-numeric value left out of the average");
                self.skipped += 1;
                false
            }
        }
    }
    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }
    pub fn skipped(&self) -> usize {
        self.skipped
    }
    /// `Σ(v·w) / Σw` as a decimal, `None` when nothing numeric was pushed.
    pub fn quotient(&self) -> Option<BigDecimal> {
        if self.total_weight == 0 {
            return None;
        }
        Some(BigDecimal::new(self.weighted_sum.clone(), 0) / BigDecimal::from(self.total_weight))
    }
    /// The quotient rounded to the nearest double.
    pub fn mean(&self) -> Option<f64> {
        self.quotient()?.to_string().parse().ok()
    }
    /// The mean with one fractional digit, e.g. `"10.3"`.
    pub fn formatted(&self) -> Option<String> {
        let quotient = self.quotient()?;
        match quotient.to_string().parse::<f64>() {
            Ok(mean) if mean.is_finite() => Some(format!("{mean:.1}")),
            // beyond the range of a double
            _ => Some(quotient.with_scale_round(1, RoundingMode::HalfEven).to_plain_string()),
        }
    }
}
