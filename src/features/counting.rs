//! Counting, location and occurrence features.

use super::basic::mean;
use std::collections::HashMap;

/// Fraction of values strictly above `t`.
pub fn count_above(x: &[f64], t: f64) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    x.iter().filter(|&&v| v > t).count() as f64 / x.len() as f64
}

/// Fraction of values strictly below `t`.
pub fn count_below(x: &[f64], t: f64) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    x.iter().filter(|&&v| v < t).count() as f64 / x.len() as f64
}

pub fn count_above_mean(x: &[f64]) -> f64 {
    let m = mean(x);
    x.iter().filter(|&&v| v > m).count() as f64
}

pub fn count_below_mean(x: &[f64]) -> f64 {
    let m = mean(x);
    x.iter().filter(|&&v| v < m).count() as f64
}

/// Relative position (0..1) of the first maximum.
pub fn first_location_of_maximum(x: &[f64]) -> f64 {
    relative_location(x, |a, b| a > b)
}

/// Relative position of the first minimum.
pub fn first_location_of_minimum(x: &[f64]) -> f64 {
    relative_location(x, |a, b| a < b)
}

/// Relative position just past the last maximum.
pub fn last_location_of_maximum(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    let rev: Vec<f64> = x.iter().rev().copied().collect();
    1.0 - relative_location(&rev, |a, b| a > b)
}

/// Relative position just past the last minimum.
pub fn last_location_of_minimum(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    let rev: Vec<f64> = x.iter().rev().copied().collect();
    1.0 - relative_location(&rev, |a, b| a < b)
}

fn relative_location<F>(x: &[f64], better: F) -> f64
where
    F: Fn(f64, f64) -> bool,
{
    if x.is_empty() {
        return f64::NAN;
    }
    let mut best = 0;
    for (i, &v) in x.iter().enumerate().skip(1) {
        if better(v, x[best]) {
            best = i;
        }
    }
    best as f64 / x.len() as f64
}

/// 1.0 when any value appears more than once.
pub fn has_duplicate(x: &[f64]) -> f64 {
    let mut sorted = x.to_vec();
    sorted.sort_by(f64::total_cmp);
    f64::from(u8::from(sorted.windows(2).any(|w| w[0] == w[1])))
}

/// 1.0 when the maximum is attained more than once.
pub fn has_duplicate_max(x: &[f64]) -> f64 {
    let max = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    f64::from(u8::from(x.iter().filter(|&&v| v == max).count() > 1))
}

/// 1.0 when the minimum is attained more than once.
pub fn has_duplicate_min(x: &[f64]) -> f64 {
    let min = x.iter().copied().fold(f64::INFINITY, f64::min);
    f64::from(u8::from(x.iter().filter(|&&v| v == min).count() > 1))
}

/// Relative index at which `q` of the absolute mass has accumulated.
pub fn index_mass_quantile(x: &[f64], q: f64) -> f64 {
    let total: f64 = x.iter().map(|v| v.abs()).sum();
    if x.is_empty() || total == 0.0 {
        return f64::NAN;
    }
    let mut acc = 0.0;
    for (i, v) in x.iter().enumerate() {
        acc += v.abs();
        if acc / total >= q {
            return (i + 1) as f64 / x.len() as f64;
        }
    }
    1.0
}

/// Longest run of consecutive values above the mean.
pub fn longest_strike_above_mean(x: &[f64]) -> f64 {
    let m = mean(x);
    longest_run(x, |v| v > m)
}

/// Longest run of consecutive values below the mean.
pub fn longest_strike_below_mean(x: &[f64]) -> f64 {
    let m = mean(x);
    longest_run(x, |v| v < m)
}

fn longest_run<F>(x: &[f64], pred: F) -> f64
where
    F: Fn(f64) -> bool,
{
    let mut best = 0usize;
    let mut current = 0usize;
    for &v in x {
        if pred(v) {
            current += 1;
            best = best.max(current);
        } else {
            current = 0;
        }
    }
    best as f64
}

/// Number of times the series crosses level `m`.
pub fn number_crossing_m(x: &[f64], m: f64) -> f64 {
    let signs: Vec<bool> = x.iter().map(|&v| v > m).collect();
    signs.windows(2).filter(|w| w[0] != w[1]).count() as f64
}

/// Number of peaks of support `n`: values larger than their `n` neighbours
/// on both sides.
pub fn number_peaks(x: &[f64], n: usize) -> f64 {
    if n == 0 || x.len() < 2 * n + 1 {
        return 0.0;
    }
    let peaks = (n..x.len() - n)
        .filter(|&i| (1..=n).all(|k| x[i] > x[i - k] && x[i] > x[i + k]))
        .count();
    peaks as f64
}

/// Count of values in `[min, max)`.
pub fn range_count(x: &[f64], min: f64, max: f64) -> f64 {
    x.iter().filter(|&&v| v >= min && v < max).count() as f64
}

/// Count of values equal to `value`.
pub fn value_count(x: &[f64], value: f64) -> f64 {
    x.iter().filter(|&&v| v == value).count() as f64
}

fn occurrences(x: &[f64]) -> HashMap<u64, usize> {
    let mut counts = HashMap::new();
    for &v in x {
        // -0.0 and 0.0 compare equal, so they must share a key
        let key = if v == 0.0 { 0.0_f64.to_bits() } else { v.to_bits() };
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Fraction of data points whose value occurs more than once.
pub fn percentage_of_reoccurring_datapoints_to_all_datapoints(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    let repeated: usize = occurrences(x).values().filter(|&&c| c > 1).sum();
    repeated as f64 / x.len() as f64
}

/// Fraction of distinct values that occur more than once.
pub fn percentage_of_reoccurring_values_to_all_values(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    let counts = occurrences(x);
    let repeated = counts.values().filter(|&&c| c > 1).count();
    repeated as f64 / counts.len() as f64
}

/// Sum of every data point whose value occurs more than once.
pub fn sum_of_reoccurring_data_points(x: &[f64]) -> f64 {
    let counts = occurrences(x);
    counts
        .iter()
        .filter(|(_, &c)| c > 1)
        .map(|(&bits, &c)| f64::from_bits(bits) * c as f64)
        .sum()
}

/// Sum of distinct values that occur more than once.
pub fn sum_of_reoccurring_values(x: &[f64]) -> f64 {
    occurrences(x)
        .iter()
        .filter(|(_, &c)| c > 1)
        .map(|(&bits, _)| f64::from_bits(bits))
        .sum()
}

/// Number of distinct values divided by length.
pub fn ratio_value_number_to_time_series_length(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    occurrences(x).len() as f64 / x.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn counts_around_mean() {
        let x = [1.0, 2.0, 3.0, 4.0, 10.0];
        assert_eq!(count_above_mean(&x), 1.0);
        assert_eq!(count_below_mean(&x), 4.0);
        assert_relative_eq!(count_above(&x, 2.0), 0.6);
        assert_relative_eq!(count_below(&x, 2.0), 0.2);
    }

    #[test]
    fn locations() {
        let x = [1.0, 5.0, 2.0, 5.0];
        assert_relative_eq!(first_location_of_maximum(&x), 0.25);
        assert_relative_eq!(last_location_of_maximum(&x), 1.0);
        assert_relative_eq!(first_location_of_minimum(&x), 0.0);
        assert_relative_eq!(last_location_of_minimum(&x), 0.25);
    }

    #[test]
    fn duplicates() {
        assert_eq!(has_duplicate(&[1.0, 2.0, 1.0]), 1.0);
        assert_eq!(has_duplicate(&[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(has_duplicate_max(&[3.0, 1.0, 3.0]), 1.0);
        assert_eq!(has_duplicate_min(&[3.0, 1.0, 3.0]), 0.0);
    }

    #[test]
    fn strikes() {
        let x = [1.0, 5.0, 6.0, 7.0, 1.0, 1.0];
        assert_eq!(longest_strike_above_mean(&x), 3.0);
        assert_eq!(longest_strike_below_mean(&x), 2.0);
    }

    #[test]
    fn peaks_and_crossings() {
        let x = [0.0, 3.0, 0.0, 1.0, 0.0, 5.0, 0.0];
        assert_eq!(number_peaks(&x, 1), 3.0);
        assert_eq!(number_peaks(&x, 2), 0.0);
        assert_eq!(number_peaks(&[0.0, 1.0, 5.0, 1.0, 0.0, 2.0, 0.0], 2), 1.0);
        assert_eq!(number_crossing_m(&x, 0.5), 6.0);
    }

    #[test]
    fn index_mass() {
        let x = [1.0, 1.0, 1.0, 1.0];
        assert_relative_eq!(index_mass_quantile(&x, 0.5), 0.5);
        assert!(index_mass_quantile(&[0.0, 0.0], 0.5).is_nan());
    }

    #[test]
    fn reoccurrence() {
        let x = [1.0, 1.0, 2.0, 3.0, 3.0, 3.0];
        assert_relative_eq!(
            percentage_of_reoccurring_datapoints_to_all_datapoints(&x),
            5.0 / 6.0
        );
        assert_relative_eq!(percentage_of_reoccurring_values_to_all_values(&x), 2.0 / 3.0);
        assert_relative_eq!(sum_of_reoccurring_data_points(&x), 11.0);
        assert_relative_eq!(sum_of_reoccurring_values(&x), 4.0);
        assert_relative_eq!(ratio_value_number_to_time_series_length(&x), 0.5);
    }

    #[test]
    fn range_and_value_counts() {
        let x = [-1.0, 0.0, 0.5, 1.0];
        assert_eq!(range_count(&x, -1.0, 1.0), 3.0);
        assert_eq!(value_count(&x, 0.0), 1.0);
    }
}
