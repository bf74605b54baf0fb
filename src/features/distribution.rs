//! Distribution-shape features.

use super::basic::{mean, standard_deviation};

/// Linear-interpolated quantile (numpy "linear" method).
pub fn quantile(x: &[f64], q: f64) -> f64 {
    if x.is_empty() || !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }
    let mut sorted = x.to_vec();
    sorted.sort_by(f64::total_cmp);
    quantile_sorted(&sorted, q)
}

/// Quantile of data that is already sorted ascending.
pub(crate) fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// Adjusted Fisher-Pearson skewness (pandas convention).
pub fn skewness(x: &[f64]) -> f64 {
    let n = x.len();
    if n < 3 {
        return f64::NAN;
    }
    let m = mean(x);
    let nf = n as f64;
    let m2 = x.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3 = x.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;
    if m2 < 1e-14 {
        return 0.0;
    }
    let g1 = m3 / m2.powf(1.5);
    g1 * (nf * (nf - 1.0)).sqrt() / (nf - 2.0)
}

/// Bias-corrected excess kurtosis (pandas convention).
pub fn kurtosis(x: &[f64]) -> f64 {
    let n = x.len();
    if n < 4 {
        return f64::NAN;
    }
    let m = mean(x);
    let nf = n as f64;
    let m2 = x.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m4 = x.iter().map(|v| (v - m).powi(4)).sum::<f64>() / nf;
    if m2 < 1e-14 {
        return 0.0;
    }
    let g2 = m4 / (m2 * m2) - 3.0;
    ((nf + 1.0) * g2 + 6.0) * (nf - 1.0) / ((nf - 2.0) * (nf - 3.0))
}

/// Standard deviation divided by mean.
pub fn variation_coefficient(x: &[f64]) -> f64 {
    let m = mean(x);
    if m == 0.0 || m.is_nan() {
        return f64::NAN;
    }
    standard_deviation(x) / m
}

/// 1.0 when std > r * (max - min).
pub fn large_standard_deviation(x: &[f64], r: f64) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    let (lo, hi) = min_max(x);
    f64::from(u8::from(standard_deviation(x) > r * (hi - lo)))
}

/// 1.0 when |mean - median| < r * (max - min).
pub fn symmetry_looking(x: &[f64], r: f64) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    let (lo, hi) = min_max(x);
    let gap = (mean(x) - quantile(x, 0.5)).abs();
    f64::from(u8::from(gap < r * (hi - lo)))
}

/// Fraction of values farther than `r` standard deviations from the mean.
pub fn ratio_beyond_r_sigma(x: &[f64], r: f64) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    let m = mean(x);
    let s = standard_deviation(x);
    let beyond = x.iter().filter(|v| (*v - m).abs() > r * s).count();
    beyond as f64 / x.len() as f64
}

fn min_max(x: &[f64]) -> (f64, f64) {
    x.iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
