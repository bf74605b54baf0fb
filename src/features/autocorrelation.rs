//! Autocorrelation and autoregressive features.

use super::basic::{mean, median, variance};

/// Sample autocorrelation at `lag` (tsfresh normalization).
pub fn autocorrelation(x: &[f64], lag: usize) -> f64 {
    let n = x.len();
    if lag >= n {
        return f64::NAN;
    }
    let m = mean(x);
    let var = variance(x);
    if var.abs() < 1e-14 {
        return f64::NAN;
    }
    let sum: f64 = (0..n - lag).map(|i| (x[i] - m) * (x[i + lag] - m)).sum();
    sum / ((n - lag) as f64 * var)
}

/// Biased autocorrelation function for lags `0..=max_lag`.
fn acf(x: &[f64], max_lag: usize) -> Option<Vec<f64>> {
    let n = x.len();
    if n < 2 {
        return None;
    }
    let m = mean(x);
    let denom: f64 = x.iter().map(|v| (v - m).powi(2)).sum();
    if denom.abs() < 1e-14 {
        return None;
    }
    let max_lag = max_lag.min(n - 1);
    Some(
        (0..=max_lag)
            .map(|k| (0..n - k).map(|i| (x[i] - m) * (x[i + k] - m)).sum::<f64>() / denom)
            .collect(),
    )
}

/// Aggregation applied over the autocorrelation function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcfAggregate {
    Mean,
    Median,
    Var,
}

impl AcfAggregate {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcfAggregate::Mean => "mean",
            AcfAggregate::Median => "median",
            AcfAggregate::Var => "var",
        }
    }
}

/// Aggregate of autocorrelations for lags `1..=max_lag`.
pub fn agg_autocorrelation(x: &[f64], aggregate: AcfAggregate, max_lag: usize) -> f64 {
    let Some(r) = acf(x, max_lag) else {
        return f64::NAN;
    };
    let lags = &r[1..];
    if lags.is_empty() {
        return f64::NAN;
    }
    match aggregate {
        AcfAggregate::Mean => mean(lags),
        AcfAggregate::Median => median(lags),
        AcfAggregate::Var => variance(lags),
    }
}

/// Levinson-Durbin recursion on autocorrelations `r[0..=order]`.
///
/// Returns the AR coefficients of the final order and the partial
/// autocorrelations for orders `1..=order`.
fn levinson_durbin(r: &[f64], order: usize) -> Option<(Vec<f64>, Vec<f64>)> {
    let mut phi = vec![0.0; order + 1];
    let mut pacf = Vec::with_capacity(order);
    let mut err = r[0];

    for k in 1..=order {
        if err.abs() < 1e-14 {
            return None;
        }
        let acc: f64 = (1..k).map(|j| phi[j] * r[k - j]).sum();
        let reflection = (r[k] - acc) / err;
        let previous = phi.clone();
        phi[k] = reflection;
        for j in 1..k {
            phi[j] = previous[j] - reflection * previous[k - j];
        }
        err *= 1.0 - reflection * reflection;
        pacf.push(reflection);
    }
    Some((phi[1..].to_vec(), pacf))
}

/// Partial autocorrelation at `lag`; lag 0 is 1 by convention.
pub fn partial_autocorrelation(x: &[f64], lag: usize) -> f64 {
    if lag == 0 {
        return 1.0;
    }
    if lag >= x.len() / 2 {
        return f64::NAN;
    }
    let Some(r) = acf(x, lag) else {
        return f64::NAN;
    };
    if r.len() <= lag {
        return f64::NAN;
    }
    match levinson_durbin(&r, lag) {
        Some((_, pacf)) => pacf[lag - 1],
        None => f64::NAN,
    }
}

/// Yule-Walker AR(`k`) coefficients; element 0 is the intercept.
pub fn ar_coefficients(x: &[f64], k: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; k + 1];
    if k == 0 || x.len() <= k {
        return out;
    }
    let Some(r) = acf(x, k) else {
        return out;
    };
    if r.len() <= k {
        return out;
    }
    if let Some((phi, _)) = levinson_durbin(&r, k) {
        let m = mean(x);
        out[0] = m * (1.0 - phi.iter().sum::<f64>());
        out[1..].copy_from_slice(&phi);
    }
    out
}

/// E\[x\[t+2l\]^2 x\[t+l\] - x\[t+l\] x\[t\]^2\].
pub fn time_reversal_asymmetry_statistic(x: &[f64], lag: usize) -> f64 {
    let n = x.len();
    if lag == 0 || 2 * lag >= n {
        return 0.0;
    }
    let terms = n - 2 * lag;
    let sum: f64 = (0..terms)
        .map(|i| {
            let a = x[i];
            let b = x[i + lag];
            let c = x[i + 2 * lag];
            c * c * b - b * a * a
        })
        .sum();
    sum / terms as f64
}
