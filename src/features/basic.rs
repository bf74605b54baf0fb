//! Basic statistical features for subsequences.
//!
//! These make up the minimal extraction profile.

/// Sum of squared values.
pub fn abs_energy(x: &[f64]) -> f64 {
    x.iter().map(|v| v * v).sum()
}

/// Largest absolute value.
pub fn absolute_maximum(x: &[f64]) -> f64 {
    x.iter().map(|v| v.abs()).fold(f64::NAN, f64::max)
}

/// sum(|x\[i+1\] - x\[i\]|)
pub fn absolute_sum_of_changes(x: &[f64]) -> f64 {
    x.windows(2).map(|w| (w[1] - w[0]).abs()).sum()
}

pub fn length(x: &[f64]) -> f64 {
    x.len() as f64
}

pub fn maximum(x: &[f64]) -> f64 {
    x.iter().copied().fold(f64::NAN, f64::max)
}

pub fn minimum(x: &[f64]) -> f64 {
    x.iter().copied().fold(f64::NAN, f64::min)
}

/// Arithmetic mean; NaN for an empty input.
pub fn mean(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    x.iter().sum::<f64>() / x.len() as f64
}

/// Mean of |x\[i+1\] - x\[i\]|.
pub fn mean_abs_change(x: &[f64]) -> f64 {
    if x.len() < 2 {
        return f64::NAN;
    }
    absolute_sum_of_changes(x) / (x.len() - 1) as f64
}

/// Mean of x\[i+1\] - x\[i\], which telescopes to (last - first) / (n - 1).
pub fn mean_change(x: &[f64]) -> f64 {
    if x.len() < 2 {
        return f64::NAN;
    }
    (x[x.len() - 1] - x[0]) / (x.len() - 1) as f64
}

/// Mean of (x\[i+2\] - 2 x\[i+1\] + x\[i\]) / 2.
pub fn mean_second_derivative_central(x: &[f64]) -> f64 {
    if x.len() < 3 {
        return f64::NAN;
    }
    let total: f64 = x.windows(3).map(|w| (w[2] - 2.0 * w[1] + w[0]) / 2.0).sum();
    total / (x.len() - 2) as f64
}

/// Mean of the `n` largest absolute values.
pub fn mean_n_absolute_max(x: &[f64], n: usize) -> f64 {
    if n == 0 || x.len() < n {
        return f64::NAN;
    }
    let mut abs: Vec<f64> = x.iter().map(|v| v.abs()).collect();
    abs.sort_by(|a, b| b.total_cmp(a));
    abs[..n].iter().sum::<f64>() / n as f64
}

pub fn median(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    let mut sorted = x.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

pub fn root_mean_square(x: &[f64]) -> f64 {
    if x.is_empty() {
        return f64::NAN;
    }
    (abs_energy(x) / x.len() as f64).sqrt()
}

/// Population standard deviation.
pub fn standard_deviation(x: &[f64]) -> f64 {
    variance(x).sqrt()
}

pub fn sum_values(x: &[f64]) -> f64 {
    x.iter().sum()
}

/// Population variance (n denominator).
pub fn variance(x: &[f64]) -> f64 {
    let m = mean(x);
    if m.is_nan() {
        return f64::NAN;
    }
    x.iter().map(|v| (v - m).powi(2)).sum::<f64>() / x.len() as f64
}

/// 1.0 when the variance exceeds the standard deviation, else 0.0.
pub fn variance_larger_than_standard_deviation(x: &[f64]) -> f64 {
    let var = variance(x);
    if var.is_nan() {
        return f64::NAN;
    }
    f64::from(u8::from(var > var.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn minimal_statistics_known_values() {
        let x = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_relative_eq!(sum_values(&x), 15.0);
        assert_relative_eq!(mean(&x), 3.0);
        assert_relative_eq!(median(&x), 3.0);
        assert_relative_eq!(length(&x), 5.0);
        assert_relative_eq!(variance(&x), 2.0, epsilon = 1e-12);
        assert_relative_eq!(standard_deviation(&x), 2.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(root_mean_square(&x), 11.0_f64.sqrt(), epsilon = 1e-12);
        assert_relative_eq!(maximum(&x), 5.0);
        assert_relative_eq!(minimum(&x), 1.0);
    }

    #[test]
    fn absolute_maximum_uses_magnitude() {
        assert_relative_eq!(absolute_maximum(&[1.0, -10.0, 3.0]), 10.0);
    }

    #[test]
    fn median_even_length() {
        assert_relative_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn changes() {
        let x = [1.0, 3.0, 7.0, 4.0];
        assert_relative_eq!(absolute_sum_of_changes(&x), 9.0);
        assert_relative_eq!(mean_abs_change(&x), 3.0);
        assert_relative_eq!(mean_change(&x), 1.0);
    }

    #[test]
    fn second_derivative_of_quadratic() {
        let x = [0.0, 1.0, 4.0, 9.0, 16.0];
        assert_relative_eq!(mean_second_derivative_central(&x), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn mean_n_absolute_max_requires_enough_values() {
        assert_relative_eq!(mean_n_absolute_max(&[1.0, -5.0, 3.0, -2.0, 4.0], 3), 4.0);
        assert!(mean_n_absolute_max(&[1.0, 2.0], 7).is_nan());
    }

    #[test]
    fn empty_inputs_are_nan() {
        assert!(mean(&[]).is_nan());
        assert!(median(&[]).is_nan());
        assert!(variance(&[]).is_nan());
        assert!(maximum(&[]).is_nan());
        assert!(mean_change(&[1.0]).is_nan());
    }

    #[test]
    fn variance_vs_std_flag() {
        assert_eq!(variance_larger_than_standard_deviation(&[0.0, 10.0]), 1.0);
        assert_eq!(variance_larger_than_standard_deviation(&[0.0, 0.5]), 0.0);
    }
}
