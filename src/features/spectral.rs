//! Spectral features built on a real-input FFT.

use super::entropy::binned_entropy;
use rustfft::{num_complex::Complex64, FftPlanner};

/// Part of a Fourier coefficient to report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FftAttribute {
    Real,
    Imag,
    Abs,
    Angle,
}

impl FftAttribute {
    pub const ALL: [FftAttribute; 4] = [
        FftAttribute::Real,
        FftAttribute::Imag,
        FftAttribute::Abs,
        FftAttribute::Angle,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FftAttribute::Real => "real",
            FftAttribute::Imag => "imag",
            FftAttribute::Abs => "abs",
            FftAttribute::Angle => "angle",
        }
    }

    /// Extracts the attribute; angles are in degrees.
    pub fn of(&self, c: Complex64) -> f64 {
        match self {
            FftAttribute::Real => c.re,
            FftAttribute::Imag => c.im,
            FftAttribute::Abs => c.norm(),
            FftAttribute::Angle => c.arg().to_degrees(),
        }
    }
}

/// Moment of the absolute spectrum treated as a distribution over bins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectralMoment {
    Centroid,
    Variance,
    Skew,
    Kurtosis,
}

impl SpectralMoment {
    pub const ALL: [SpectralMoment; 4] = [
        SpectralMoment::Centroid,
        SpectralMoment::Variance,
        SpectralMoment::Skew,
        SpectralMoment::Kurtosis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpectralMoment::Centroid => "centroid",
            SpectralMoment::Variance => "variance",
            SpectralMoment::Skew => "skew",
            SpectralMoment::Kurtosis => "kurtosis",
        }
    }
}

/// Positive-frequency half of the FFT of a real signal (bins 0..=n/2).
pub fn rfft(signal: &[f64]) -> Vec<Complex64> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }
    let mut buffer: Vec<Complex64> = signal.iter().map(|&x| Complex64::new(x, 0.0)).collect();
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);
    fft.process(&mut buffer);
    buffer.truncate(n / 2 + 1);
    buffer
}

/// Attribute of coefficient `coeff` of a precomputed [`rfft`] spectrum.
///
/// Coefficients past the Nyquist bin are NaN.
pub fn fft_coefficient_of(spectrum: &[Complex64], coeff: usize, attr: FftAttribute) -> f64 {
    spectrum.get(coeff).map_or(f64::NAN, |&c| attr.of(c))
}

pub fn fft_coefficient(x: &[f64], coeff: usize, attr: FftAttribute) -> f64 {
    fft_coefficient_of(&rfft(x), coeff, attr)
}

/// Moment of a precomputed [`rfft`] spectrum.
pub fn fft_aggregated_of(spectrum: &[Complex64], moment: SpectralMoment) -> f64 {
    let amplitudes: Vec<f64> = spectrum.iter().map(|c| c.norm()).collect();
    let total: f64 = amplitudes.iter().sum();
    if total == 0.0 {
        return f64::NAN;
    }
    let raw = |k: i32| -> f64 {
        amplitudes
            .iter()
            .enumerate()
            .map(|(i, a)| (i as f64).powi(k) * a)
            .sum::<f64>()
            / total
    };

    let centroid = raw(1);
    let variance = raw(2) - centroid * centroid;
    match moment {
        SpectralMoment::Centroid => centroid,
        SpectralMoment::Variance => variance,
        SpectralMoment::Skew => {
            if variance < 0.5 {
                f64::NAN
            } else {
                (raw(3) - 3.0 * centroid * variance - centroid.powi(3)) / variance.powf(1.5)
            }
        }
        SpectralMoment::Kurtosis => {
            if variance < 0.5 {
                f64::NAN
            } else {
                (raw(4) - 4.0 * centroid * raw(3) + 6.0 * raw(2) * centroid * centroid
                    - 3.0 * centroid.powi(4))
                    / (variance * variance)
            }
        }
    }
}

pub fn fft_aggregated(x: &[f64], moment: SpectralMoment) -> f64 {
    fft_aggregated_of(&rfft(x), moment)
}

/// Binned entropy of the max-normalized periodogram.
pub fn fourier_entropy(x: &[f64], bins: usize) -> f64 {
    let power: Vec<f64> = rfft(x).iter().map(|c| c.norm_sqr()).collect();
    let peak = power.iter().copied().fold(0.0, f64::max);
    if power.is_empty() || peak == 0.0 {
        return f64::NAN;
    }
    let scaled: Vec<f64> = power.iter().map(|p| p / peak).collect();
    binned_entropy(&scaled, bins)
}
