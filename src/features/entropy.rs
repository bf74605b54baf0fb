//! Entropy and complexity features.

use super::basic::standard_deviation;
use std::collections::{HashMap, HashSet};

/// Entropy of a histogram with `max_bins` equal-width bins.
pub fn binned_entropy(x: &[f64], max_bins: usize) -> f64 {
    if x.is_empty() || max_bins == 0 {
        return f64::NAN;
    }
    let counts = histogram(x, max_bins);
    let n = x.len() as f64;
    -counts
        .iter()
        .filter(|&&c| c > 0)
        .map(|&c| {
            let p = c as f64 / n;
            p * p.ln()
        })
        .sum::<f64>()
}

fn histogram(x: &[f64], bins: usize) -> Vec<usize> {
    let lo = x.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut counts = vec![0usize; bins];
    let width = hi - lo;
    for &v in x {
        let idx = if width > 0.0 {
            (((v - lo) / width) * bins as f64) as usize
        } else {
            0
        };
        counts[idx.min(bins - 1)] += 1;
    }
    counts
}

/// Shannon entropy of the ordinal patterns of length `dimension` taken
/// with delay `tau`.
pub fn permutation_entropy(x: &[f64], tau: usize, dimension: usize) -> f64 {
    if tau == 0 || dimension < 2 {
        return f64::NAN;
    }
    let span = (dimension - 1) * tau;
    if x.len() <= span {
        return f64::NAN;
    }
    let mut patterns: HashMap<Vec<usize>, usize> = HashMap::new();
    let total = x.len() - span;
    for start in 0..total {
        let mut order: Vec<usize> = (0..dimension).collect();
        order.sort_by(|&a, &b| x[start + a * tau].total_cmp(&x[start + b * tau]));
        *patterns.entry(order).or_insert(0) += 1;
    }
    -patterns
        .values()
        .map(|&c| {
            let p = c as f64 / total as f64;
            p * p.ln()
        })
        .sum::<f64>()
}

/// Sample entropy with template length 2 and tolerance 0.2 * std.
pub fn sample_entropy(x: &[f64]) -> f64 {
    let r = 0.2 * standard_deviation(x);
    if x.len() < 4 || !r.is_finite() {
        return f64::NAN;
    }
    let b = count_template_pairs(x, 2, r);
    let a = count_template_pairs(x, 3, r);
    if a == 0 || b == 0 {
        return f64::NAN;
    }
    -(a as f64 / b as f64).ln()
}

fn count_template_pairs(x: &[f64], m: usize, r: f64) -> usize {
    // both template lengths share the n - 2 start positions
    let starts = x.len() - 2;
    (0..starts)
        .map(|i| {
            ((i + 1)..starts)
                .filter(|&j| chebyshev_within(x, i, j, m, r))
                .count()
        })
        .sum()
}

fn chebyshev_within(x: &[f64], i: usize, j: usize, m: usize, r: f64) -> bool {
    (0..m).all(|k| (x[i + k] - x[j + k]).abs() <= r)
}

/// Approximate entropy with template length `m` and tolerance `r * std`.
pub fn approximate_entropy(x: &[f64], m: usize, r: f64) -> f64 {
    let n = x.len();
    if m == 0 || n <= m + 1 {
        return 0.0;
    }
    let tolerance = r * standard_deviation(x);
    if !tolerance.is_finite() {
        return f64::NAN;
    }
    phi(x, m, tolerance) - phi(x, m + 1, tolerance)
}

fn phi(x: &[f64], m: usize, tolerance: f64) -> f64 {
    let count = x.len() - m + 1;
    let total: f64 = (0..count)
        .map(|i| {
            let matches = (0..count)
                .filter(|&j| chebyshev_within(x, i, j, m, tolerance))
                .count();
            (matches as f64 / count as f64).ln()
        })
        .sum();
    total / count as f64
}

/// Lempel-Ziv complexity of the series discretized into `bins` symbols,
/// normalized by length.
pub fn lempel_ziv_complexity(x: &[f64], bins: usize) -> f64 {
    if x.is_empty() || bins == 0 {
        return f64::NAN;
    }
    let lo = x.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = hi - lo;
    let symbols: Vec<usize> = x
        .iter()
        .map(|&v| {
            if width > 0.0 {
                ((((v - lo) / width) * bins as f64) as usize).min(bins - 1)
            } else {
                0
            }
        })
        .collect();

    let mut seen: HashSet<&[usize]> = HashSet::new();
    let mut start = 0;
    let mut end = 1;
    while end <= symbols.len() {
        let word = &symbols[start..end];
        if seen.insert(word) {
            start = end;
        }
        end += 1;
    }
    seen.len() as f64 / x.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn binned_entropy_constant_is_zero() {
        assert_relative_eq!(binned_entropy(&[2.0; 10], 10), 0.0);
    }

    #[test]
    fn binned_entropy_two_equal_bins() {
        let x = [0.0, 0.0, 1.0, 1.0];
        assert_relative_eq!(binned_entropy(&x, 2), 2.0_f64.ln(), epsilon = 1e-12);
    }

    #[test]
    fn permutation_entropy_monotonic_is_zero() {
        let x: Vec<f64> = (0..20).map(|v| v as f64).collect();
        assert_relative_eq!(permutation_entropy(&x, 1, 3), 0.0);
    }

    #[test]
    fn permutation_entropy_too_short() {
        assert!(permutation_entropy(&[1.0, 2.0], 1, 3).is_nan());
    }

    #[test]
    fn sample_entropy_regular_is_low() {
        use rand::{rngs::StdRng, Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(11);
        let x: Vec<f64> = (0..120).map(|i| (i % 4) as f64).collect();
        let noisy: Vec<f64> = (0..120).map(|_| rng.gen_range(0.0..1.0)).collect();
        assert_relative_eq!(sample_entropy(&x), 0.0, epsilon = 1e-12);
        assert!(sample_entropy(&noisy) > 0.5);
    }

    #[test]
    fn approximate_entropy_constant_is_zero() {
        assert_relative_eq!(approximate_entropy(&[1.0; 20], 2, 0.5), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn lempel_ziv_constant_vs_varied() {
        let constant = lempel_ziv_complexity(&[1.0; 16], 2);
        let varied: Vec<f64> = (0..16).map(|i| ((i * 5) % 7) as f64).collect();
        assert!(lempel_ziv_complexity(&varied, 5) > constant);
    }
}
