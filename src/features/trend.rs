//! Trend-based features.
//!
//! Least-squares line fits against the time index, both over the whole
//! window and over per-chunk aggregates.

use super::basic::{maximum, mean, minimum, variance};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Statistics of a least-squares line fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub slope: f64,
    pub intercept: f64,
    /// Pearson correlation between index and value
    pub rvalue: f64,
    /// Two-sided p-value for a zero slope (Student-t, n - 2 dof)
    pub pvalue: f64,
    /// Standard error of the slope
    pub stderr: f64,
}

impl LinearTrend {
    fn undefined() -> Self {
        Self {
            slope: f64::NAN,
            intercept: f64::NAN,
            rvalue: f64::NAN,
            pvalue: f64::NAN,
            stderr: f64::NAN,
        }
    }

    pub fn attribute(&self, attr: TrendAttribute) -> f64 {
        match attr {
            TrendAttribute::Pvalue => self.pvalue,
            TrendAttribute::Rvalue => self.rvalue,
            TrendAttribute::Intercept => self.intercept,
            TrendAttribute::Slope => self.slope,
            TrendAttribute::Stderr => self.stderr,
        }
    }
}

/// Selectable field of a [`LinearTrend`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrendAttribute {
    Pvalue,
    Rvalue,
    Intercept,
    Slope,
    Stderr,
}

impl TrendAttribute {
    pub const ALL: [TrendAttribute; 5] = [
        TrendAttribute::Pvalue,
        TrendAttribute::Rvalue,
        TrendAttribute::Intercept,
        TrendAttribute::Slope,
        TrendAttribute::Stderr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TrendAttribute::Pvalue => "pvalue",
            TrendAttribute::Rvalue => "rvalue",
            TrendAttribute::Intercept => "intercept",
            TrendAttribute::Slope => "slope",
            TrendAttribute::Stderr => "stderr",
        }
    }
}

/// Aggregation applied to each chunk before the trend fit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkAggregate {
    Max,
    Min,
    Mean,
    Var,
}

impl ChunkAggregate {
    pub const ALL: [ChunkAggregate; 4] = [
        ChunkAggregate::Max,
        ChunkAggregate::Min,
        ChunkAggregate::Mean,
        ChunkAggregate::Var,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ChunkAggregate::Max => "max",
            ChunkAggregate::Min => "min",
            ChunkAggregate::Mean => "mean",
            ChunkAggregate::Var => "var",
        }
    }

    fn apply(&self, chunk: &[f64]) -> f64 {
        match self {
            ChunkAggregate::Max => maximum(chunk),
            ChunkAggregate::Min => minimum(chunk),
            ChunkAggregate::Mean => mean(chunk),
            ChunkAggregate::Var => variance(chunk),
        }
    }
}

/// Fits `y = slope * t + intercept` with `t = 0, 1, ..., n-1`.
pub fn linear_trend(y: &[f64]) -> LinearTrend {
    let n = y.len();
    if n < 2 {
        return LinearTrend::undefined();
    }
    let nf = n as f64;
    let mean_t = (nf - 1.0) / 2.0;
    let mean_y = mean(y);

    let mut ss_t = 0.0;
    let mut ss_y = 0.0;
    let mut ss_ty = 0.0;
    for (i, &v) in y.iter().enumerate() {
        let dt = i as f64 - mean_t;
        let dy = v - mean_y;
        ss_t += dt * dt;
        ss_y += dy * dy;
        ss_ty += dt * dy;
    }

    let slope = ss_ty / ss_t;
    let intercept = mean_y - slope * mean_t;
    let rvalue = if ss_y == 0.0 {
        0.0
    } else {
        (ss_ty / (ss_t * ss_y).sqrt()).clamp(-1.0, 1.0)
    };

    if n == 2 {
        let pvalue = if y[0] == y[1] { 1.0 } else { 0.0 };
        return LinearTrend {
            slope,
            intercept,
            rvalue,
            pvalue,
            stderr: 0.0,
        };
    }

    let dof = nf - 2.0;
    let stderr = ((1.0 - rvalue * rvalue) * ss_y / ss_t / dof).sqrt();
    let t = rvalue * (dof / ((1.0 - rvalue) * (1.0 + rvalue) + 1e-20)).sqrt();
    let pvalue = match StudentsT::new(0.0, 1.0, dof) {
        Ok(dist) => 2.0 * (1.0 - dist.cdf(t.abs())),
        Err(_) => f64::NAN,
    };

    LinearTrend {
        slope,
        intercept,
        rvalue,
        pvalue,
        stderr,
    }
}

/// Trend over per-chunk aggregates.
///
/// The window is split into consecutive chunks of `chunk_len` values (the
/// last chunk may be shorter), each chunk is reduced with `aggregate`, and
/// a line is fitted through the reduced values.
pub fn agg_linear_trend(
    x: &[f64],
    chunk_len: usize,
    aggregate: ChunkAggregate,
    attr: TrendAttribute,
) -> f64 {
    if chunk_len == 0 || chunk_len > x.len() {
        return f64::NAN;
    }
    let reduced: Vec<f64> = x.chunks(chunk_len).map(|c| aggregate.apply(c)).collect();
    linear_trend(&reduced).attribute(attr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn exact_line() {
        let y: Vec<f64> = (0..10).map(|i| 3.0 + 2.0 * i as f64).collect();
        let fit = linear_trend(&y);
        assert_relative_eq!(fit.slope, 2.0, epsilon = 1e-12);
        assert_relative_eq!(fit.intercept, 3.0, epsilon = 1e-12);
        assert_relative_eq!(fit.rvalue, 1.0, epsilon = 1e-12);
        assert_relative_eq!(fit.stderr, 0.0, epsilon = 1e-12);
        assert!(fit.pvalue < 1e-6);
    }

    #[test]
    fn constant_has_no_trend() {
        let fit = linear_trend(&[4.0; 12]);
        assert_relative_eq!(fit.slope, 0.0);
        assert_relative_eq!(fit.rvalue, 0.0);
        assert_relative_eq!(fit.pvalue, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn noisy_flat_has_large_pvalue() {
        let y = [1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0, -1.0, 1.0];
        let fit = linear_trend(&y);
        assert!(fit.pvalue > 0.5, "pvalue = {}", fit.pvalue);
    }

    #[test]
    fn two_points() {
        let fit = linear_trend(&[1.0, 3.0]);
        assert_relative_eq!(fit.slope, 2.0);
        assert_eq!(fit.pvalue, 0.0);
    }

    #[test]
    fn agg_trend_over_chunk_means() {
        let x: Vec<f64> = (0..20).map(|i| i as f64).collect();
        // chunk means 2, 7, 12, 17
        let slope = agg_linear_trend(&x, 5, ChunkAggregate::Mean, TrendAttribute::Slope);
        assert_relative_eq!(slope, 5.0, epsilon = 1e-12);
        let intercept = agg_linear_trend(&x, 5, ChunkAggregate::Mean, TrendAttribute::Intercept);
        assert_relative_eq!(intercept, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn agg_trend_chunk_longer_than_window() {
        let x = [1.0, 2.0, 3.0];
        assert!(agg_linear_trend(&x, 5, ChunkAggregate::Max, TrendAttribute::Slope).is_nan());
    }
}
