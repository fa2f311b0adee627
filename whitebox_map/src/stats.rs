// Copyright 2025 the Whitebox Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use alloc::vec::Vec;

/// Fixed-width histogram used to pick display ranges that ignore outliers.
#[derive(Clone, Debug)]
pub(crate) struct Histogram {
    min: f64,
    bin_size: f64,
    counts: Vec<usize>,
    total: usize,
}

impl Histogram {
    /// Bins `values` into `bins + 1` bins of width `(max - min) / bins`.
    ///
    /// Values outside `min..=max` and non-finite values are ignored.
    pub(crate) fn new(values: impl IntoIterator<Item = f64>, min: f64, max: f64, bins: usize) -> Self {
        let bins = bins.max(1);
        let bin_size = (max - min) / bins as f64;
        let mut counts = alloc::vec![0_usize; bins + 1];
        let mut total = 0;
        for v in values {
            if !v.is_finite() || v < min || v > max {
                continue;
            }
            let bin = if bin_size > 0.0 {
                truncate_index((v - min) / bin_size).min(bins)
            } else {
                0
            };
            counts[bin] += 1;
            total += 1;
        }
        Self {
            min,
            bin_size,
            counts,
            total,
        }
    }

    /// Number of binned values.
    pub(crate) fn total(&self) -> usize {
        self.total
    }

    /// Lower edge of the first bin at which at least `percent` of the values
    /// lie at or below it.
    pub(crate) fn lower_tail(&self, percent: f64) -> f64 {
        let target = self.target(percent);
        let mut sum = 0;
        for (i, c) in self.counts.iter().enumerate() {
            sum += c;
            if sum >= target {
                return self.edge(i);
            }
        }
        self.edge(self.counts.len() - 1)
    }

    /// Lower edge of the last bin at which at least `percent` of the values
    /// lie at or above it.
    pub(crate) fn upper_tail(&self, percent: f64) -> f64 {
        let target = self.target(percent);
        let mut sum = 0;
        for (i, c) in self.counts.iter().enumerate().rev() {
            sum += c;
            if sum >= target {
                return self.edge(i);
            }
        }
        self.min
    }

    fn target(&self, percent: f64) -> usize {
        truncate_index(self.total as f64 * percent / 100.0)
    }

    fn edge(&self, bin: usize) -> f64 {
        bin as f64 * self.bin_size + self.min
    }
}

/// Truncates a non-negative float toward zero. Negative and NaN inputs give 0.
#[allow(
    clippy::cast_possible_truncation,
    reason = "float to usize casts saturate, which is the intended clamp"
)]
pub(crate) fn truncate_index(v: f64) -> usize {
    v as usize
}

/// Truncates a float toward zero into a signed integer, saturating.
#[allow(
    clippy::cast_possible_truncation,
    reason = "float to i64 casts saturate, which is the intended clamp"
)]
pub(crate) fn truncate_signed(v: f64) -> i64 {
    v as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_percent_tails_skip_outliers() {
        // 98 values spread over 0..98 plus outliers at 1000 and -1000.
        let mut values: Vec<f64> = (0..98).map(f64::from).collect();
        values.push(1000.0);
        values.push(-1000.0);
        let h = Histogram::new(values, -1000.0, 1000.0, 200);
        assert_eq!(h.total(), 100);
        // Each outlier alone is exactly 1% of the values.
        assert!((h.lower_tail(1.0) + 1000.0).abs() < 1e-9);
        assert!((h.upper_tail(1.0) - 1000.0).abs() < 1e-9);
        // At 2% the tails move into the bulk.
        assert!((h.lower_tail(2.0) - 0.0).abs() < 1e-9);
        assert!((h.upper_tail(2.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn flat_data_collapses_to_min() {
        let h = Histogram::new([5.0, 5.0, 5.0], 5.0, 5.0, 10);
        assert_eq!(h.lower_tail(1.0), 5.0);
        assert_eq!(h.upper_tail(1.0), 5.0);
    }

    #[test]
    fn truncation_saturates() {
        assert_eq!(truncate_index(-3.7), 0);
        assert_eq!(truncate_index(f64::NAN), 0);
        assert_eq!(truncate_index(4.9), 4);
        assert_eq!(truncate_signed(-3.7), -3);
    }
}
