//! Change-based and nonlinearity features.

use super::basic::{mean, standard_deviation, variance};
use super::distribution::quantile;

/// Aggregation of consecutive changes inside a quantile corridor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAggregate {
    Mean,
    Var,
}

impl ChangeAggregate {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeAggregate::Mean => "mean",
            ChangeAggregate::Var => "var",
        }
    }
}

/// Aggregate of consecutive changes where both endpoints lie inside the
/// corridor between the `ql` and `qh` quantiles.
pub fn change_quantiles(
    x: &[f64],
    ql: f64,
    qh: f64,
    is_abs: bool,
    aggregate: ChangeAggregate,
) -> f64 {
    if ql >= qh || x.len() < 2 {
        return 0.0;
    }
    let lo = quantile(x, ql);
    let hi = quantile(x, qh);
    let inside: Vec<bool> = x.iter().map(|&v| v >= lo && v <= hi).collect();

    let changes: Vec<f64> = x
        .windows(2)
        .zip(inside.windows(2))
        .filter(|(_, flags)| flags[0] && flags[1])
        .map(|(w, _)| {
            let d = w[1] - w[0];
            if is_abs {
                d.abs()
            } else {
                d
            }
        })
        .collect();

    if changes.is_empty() {
        return 0.0;
    }
    match aggregate {
        ChangeAggregate::Mean => mean(&changes),
        ChangeAggregate::Var => variance(&changes),
    }
}

/// Share of total energy held by chunk `focus` out of `segments` chunks.
pub fn energy_ratio_by_chunks(x: &[f64], segments: usize, focus: usize) -> f64 {
    if segments == 0 || focus >= segments || x.is_empty() {
        return f64::NAN;
    }
    let total: f64 = x.iter().map(|v| v * v).sum();
    if total == 0.0 {
        return f64::NAN;
    }
    // numpy.array_split: the first n % segments chunks get one extra element
    let base = x.len() / segments;
    let extra = x.len() % segments;
    let start = focus * base + focus.min(extra);
    let len = base + usize::from(focus < extra);
    let chunk = &x[start..start + len];
    chunk.iter().map(|v| v * v).sum::<f64>() / total
}

/// c3 nonlinearity statistic: E\[x\[t+2l\] x\[t+l\] x\[t\]\].
pub fn c3(x: &[f64], lag: usize) -> f64 {
    let n = x.len();
    if 2 * lag >= n {
        return 0.0;
    }
    let terms = n - 2 * lag;
    let sum: f64 = (0..terms).map(|i| x[i + 2 * lag] * x[i + lag] * x[i]).sum();
    sum / terms as f64
}

/// Complexity-invariant distance estimate sqrt(sum(diff^2)).
pub fn cid_ce(x: &[f64], normalize: bool) -> f64 {
    if normalize {
        let s = standard_deviation(x);
        if s.is_nan() || s == 0.0 {
            return 0.0;
        }
        let m = mean(x);
        let z: Vec<f64> = x.iter().map(|v| (v - m) / s).collect();
        return cid_ce(&z, false);
    }
    x.windows(2)
        .map(|w| (w[1] - w[0]).powi(2))
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn change_quantiles_full_corridor() {
        let x = [1.0, 3.0, 2.0, 5.0];
        // all points are inside [q0, q1]; changes 2, -1, 3
        assert_relative_eq!(
            change_quantiles(&x, 0.0, 1.0, false, ChangeAggregate::Mean),
            4.0 / 3.0,
            epsilon = 1e-12
        );
        assert_relative_eq!(
            change_quantiles(&x, 0.0, 1.0, true, ChangeAggregate::Mean),
            2.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn change_quantiles_invalid_corridor() {
        assert_eq!(
            change_quantiles(&[1.0, 2.0, 3.0], 0.8, 0.2, false, ChangeAggregate::Var),
            0.0
        );
    }

    #[test]
    fn energy_ratio_sums_to_one() {
        let x: Vec<f64> = (1..=23).map(|v| v as f64).collect();
        let total: f64 = (0..10).map(|f| energy_ratio_by_chunks(&x, 10, f)).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn c3_known() {
        let x = [1.0, 2.0, 3.0, 4.0];
        // lag 1: (3*2*1 + 4*3*2) / 2 = 15
        assert_relative_eq!(c3(&x, 1), 15.0);
    }

    #[test]
    fn cid_ce_known() {
        let x = [0.0, 3.0, 7.0];
        assert_relative_eq!(cid_ce(&x, false), 5.0);
        assert_eq!(cid_ce(&[1.0; 4], true), 0.0);
    }
}
