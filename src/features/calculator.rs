//! Named feature calculators and the per-profile catalog.
//!
//! Every calculator maps one window to one value and carries its own
//! parameters, so a column name can be rebuilt from the calculator alone:
//! `value__<calculator>[__<param>_<value>]...` with parameters in
//! alphabetical order.

use super::autocorrelation::{self, AcfAggregate};
use super::change::{self, ChangeAggregate};
use super::spectral::{self, FftAttribute, SpectralMoment};
use super::trend::{self, ChunkAggregate, LinearTrend as TrendFit, TrendAttribute};
use super::{basic, counting, distribution, entropy, FeatureProfile};
use rustfft::num_complex::Complex64;
use std::cell::OnceCell;

/// AR order shared by every `ar_coefficient` column.
const AR_ORDER: usize = 10;

/// A single parameterized feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Calculator {
    SumValues,
    Median,
    Mean,
    Length,
    StandardDeviation,
    Variance,
    RootMeanSquare,
    Maximum,
    AbsoluteMaximum,
    Minimum,

    VarianceLargerThanStandardDeviation,
    HasDuplicateMax,
    HasDuplicateMin,
    HasDuplicate,
    AbsEnergy,
    MeanAbsChange,
    MeanChange,
    MeanSecondDerivativeCentral,
    Skewness,
    Kurtosis,
    AbsoluteSumOfChanges,
    LongestStrikeBelowMean,
    LongestStrikeAboveMean,
    CountAboveMean,
    CountBelowMean,
    LastLocationOfMaximum,
    FirstLocationOfMaximum,
    LastLocationOfMinimum,
    FirstLocationOfMinimum,
    PercentageOfReoccurringValues,
    PercentageOfReoccurringDatapoints,
    SumOfReoccurringValues,
    SumOfReoccurringDataPoints,
    RatioValueNumberToLength,
    VariationCoefficient,

    TimeReversalAsymmetry { lag: usize },
    C3 { lag: usize },
    CidCe { normalize: bool },
    SymmetryLooking { r: f64 },
    LargeStandardDeviation { r: f64 },
    Quantile { q: f64 },
    Autocorrelation { lag: usize },
    AggAutocorrelation { aggregate: AcfAggregate, max_lag: usize },
    PartialAutocorrelation { lag: usize },
    NumberCrossingM { m: f64 },
    NumberPeaks { n: usize },
    BinnedEntropy { max_bins: usize },
    IndexMassQuantile { q: f64 },
    ArCoefficient { coeff: usize, k: usize },
    ChangeQuantiles { aggregate: ChangeAggregate, is_abs: bool, qh: f64, ql: f64 },
    FftCoefficient { attr: FftAttribute, coeff: usize },
    FftAggregated { moment: SpectralMoment },
    ValueCount { value: f64 },
    RangeCount { max: f64, min: f64 },
    LinearTrend { attr: TrendAttribute },
    AggLinearTrend { attr: TrendAttribute, chunk_len: usize, aggregate: ChunkAggregate },
    EnergyRatioByChunks { segments: usize, focus: usize },
    RatioBeyondRSigma { r: f64 },
    CountAbove { t: f64 },
    CountBelow { t: f64 },
    PermutationEntropy { dimension: usize, tau: usize },
    LempelZivComplexity { bins: usize },
    FourierEntropy { bins: usize },
    MeanNAbsoluteMax { n: usize },

    SampleEntropy,
    ApproximateEntropy { m: usize, r: f64 },
}

/// Window plus lazily computed intermediates shared across calculators.
pub struct WindowContext<'a> {
    values: &'a [f64],
    spectrum: OnceCell<Vec<Complex64>>,
    ar: OnceCell<Vec<f64>>,
    trend: OnceCell<TrendFit>,
}

impl<'a> WindowContext<'a> {
    pub fn new(values: &'a [f64]) -> Self {
        Self {
            values,
            spectrum: OnceCell::new(),
            ar: OnceCell::new(),
            trend: OnceCell::new(),
        }
    }

    pub fn values(&self) -> &[f64] {
        self.values
    }

    fn spectrum(&self) -> &[Complex64] {
        self.spectrum.get_or_init(|| spectral::rfft(self.values))
    }

    fn ar_coefficients(&self) -> &[f64] {
        self.ar
            .get_or_init(|| autocorrelation::ar_coefficients(self.values, AR_ORDER))
    }

    fn trend(&self) -> &TrendFit {
        self.trend.get_or_init(|| trend::linear_trend(self.values))
    }
}

fn py_bool(b: bool) -> &'static str {
    if b {
        "True"
    } else {
        "False"
    }
}

impl Calculator {
    /// Column name, e.g. `value__quantile__q_0.1`.
    pub fn name(&self) -> String {
        format!("value__{}", self.descriptor())
    }

    fn descriptor(&self) -> String {
        use Calculator::*;
        match *self {
            SumValues => "sum_values".into(),
            Median => "median".into(),
            Mean => "mean".into(),
            Length => "length".into(),
            StandardDeviation => "standard_deviation".into(),
            Variance => "variance".into(),
            RootMeanSquare => "root_mean_square".into(),
            Maximum => "maximum".into(),
            AbsoluteMaximum => "absolute_maximum".into(),
            Minimum => "minimum".into(),
            VarianceLargerThanStandardDeviation => {
                "variance_larger_than_standard_deviation".into()
            }
            HasDuplicateMax => "has_duplicate_max".into(),
            HasDuplicateMin => "has_duplicate_min".into(),
            HasDuplicate => "has_duplicate".into(),
            AbsEnergy => "abs_energy".into(),
            MeanAbsChange => "mean_abs_change".into(),
            MeanChange => "mean_change".into(),
            MeanSecondDerivativeCentral => "mean_second_derivative_central".into(),
            Skewness => "skewness".into(),
            Kurtosis => "kurtosis".into(),
            AbsoluteSumOfChanges => "absolute_sum_of_changes".into(),
            LongestStrikeBelowMean => "longest_strike_below_mean".into(),
            LongestStrikeAboveMean => "longest_strike_above_mean".into(),
            CountAboveMean => "count_above_mean".into(),
            CountBelowMean => "count_below_mean".into(),
            LastLocationOfMaximum => "last_location_of_maximum".into(),
            FirstLocationOfMaximum => "first_location_of_maximum".into(),
            LastLocationOfMinimum => "last_location_of_minimum".into(),
            FirstLocationOfMinimum => "first_location_of_minimum".into(),
            PercentageOfReoccurringValues => {
                "percentage_of_reoccurring_values_to_all_values".into()
            }
            PercentageOfReoccurringDatapoints => {
                "percentage_of_reoccurring_datapoints_to_all_datapoints".into()
            }
            SumOfReoccurringValues => "sum_of_reoccurring_values".into(),
            SumOfReoccurringDataPoints => "sum_of_reoccurring_data_points".into(),
            RatioValueNumberToLength => "ratio_value_number_to_time_series_length".into(),
            VariationCoefficient => "variation_coefficient".into(),
            TimeReversalAsymmetry { lag } => {
                format!("time_reversal_asymmetry_statistic__lag_{lag}")
            }
            C3 { lag } => format!("c3__lag_{lag}"),
            CidCe { normalize } => format!("cid_ce__normalize_{}", py_bool(normalize)),
            SymmetryLooking { r } => format!("symmetry_looking__r_{r:?}"),
            LargeStandardDeviation { r } => format!("large_standard_deviation__r_{r:?}"),
            Quantile { q } => format!("quantile__q_{q:?}"),
            Autocorrelation { lag } => format!("autocorrelation__lag_{lag}"),
            AggAutocorrelation { aggregate, max_lag } => format!(
                "agg_autocorrelation__f_agg_\"{}\"__maxlag_{max_lag}",
                aggregate.as_str()
            ),
            PartialAutocorrelation { lag } => format!("partial_autocorrelation__lag_{lag}"),
            NumberCrossingM { m } => format!("number_crossing_m__m_{m}"),
            NumberPeaks { n } => format!("number_peaks__n_{n}"),
            BinnedEntropy { max_bins } => format!("binned_entropy__max_bins_{max_bins}"),
            IndexMassQuantile { q } => format!("index_mass_quantile__q_{q:?}"),
            ArCoefficient { coeff, k } => format!("ar_coefficient__coeff_{coeff}__k_{k}"),
            ChangeQuantiles {
                aggregate,
                is_abs,
                qh,
                ql,
            } => format!(
                "change_quantiles__f_agg_\"{}\"__isabs_{}__qh_{qh:?}__ql_{ql:?}",
                aggregate.as_str(),
                py_bool(is_abs)
            ),
            FftCoefficient { attr, coeff } => format!(
                "fft_coefficient__attr_\"{}\"__coeff_{coeff}",
                attr.as_str()
            ),
            FftAggregated { moment } => {
                format!("fft_aggregated__aggtype_\"{}\"", moment.as_str())
            }
            ValueCount { value } => format!("value_count__value_{value}"),
            RangeCount { max, min } => format!("range_count__max_{max}__min_{min}"),
            LinearTrend { attr } => format!("linear_trend__attr_\"{}\"", attr.as_str()),
            AggLinearTrend {
                attr,
                chunk_len,
                aggregate,
            } => format!(
                "agg_linear_trend__attr_\"{}\"__chunk_len_{chunk_len}__f_agg_\"{}\"",
                attr.as_str(),
                aggregate.as_str()
            ),
            EnergyRatioByChunks { segments, focus } => format!(
                "energy_ratio_by_chunks__num_segments_{segments}__segment_focus_{focus}"
            ),
            RatioBeyondRSigma { r } => format!("ratio_beyond_r_sigma__r_{r:?}"),
            CountAbove { t } => format!("count_above__t_{t}"),
            CountBelow { t } => format!("count_below__t_{t}"),
            PermutationEntropy { dimension, tau } => {
                format!("permutation_entropy__dimension_{dimension}__tau_{tau}")
            }
            LempelZivComplexity { bins } => format!("lempel_ziv_complexity__bins_{bins}"),
            FourierEntropy { bins } => format!("fourier_entropy__bins_{bins}"),
            MeanNAbsoluteMax { n } => format!("mean_n_absolute_max__number_of_maxima_{n}"),
            SampleEntropy => "sample_entropy".into(),
            ApproximateEntropy { m, r } => format!("approximate_entropy__m_{m}__r_{r:?}"),
        }
    }

    /// Evaluates the calculator on one window.
    pub fn compute(&self, ctx: &WindowContext<'_>) -> f64 {
        use Calculator::*;
        let x = ctx.values();
        match *self {
            SumValues => basic::sum_values(x),
            Median => basic::median(x),
            Mean => basic::mean(x),
            Length => basic::length(x),
            StandardDeviation => basic::standard_deviation(x),
            Variance => basic::variance(x),
            RootMeanSquare => basic::root_mean_square(x),
            Maximum => basic::maximum(x),
            AbsoluteMaximum => basic::absolute_maximum(x),
            Minimum => basic::minimum(x),
            VarianceLargerThanStandardDeviation => {
                basic::variance_larger_than_standard_deviation(x)
            }
            HasDuplicateMax => counting::has_duplicate_max(x),
            HasDuplicateMin => counting::has_duplicate_min(x),
            HasDuplicate => counting::has_duplicate(x),
            AbsEnergy => basic::abs_energy(x),
            MeanAbsChange => basic::mean_abs_change(x),
            MeanChange => basic::mean_change(x),
            MeanSecondDerivativeCentral => basic::mean_second_derivative_central(x),
            Skewness => distribution::skewness(x),
            Kurtosis => distribution::kurtosis(x),
            AbsoluteSumOfChanges => basic::absolute_sum_of_changes(x),
            LongestStrikeBelowMean => counting::longest_strike_below_mean(x),
            LongestStrikeAboveMean => counting::longest_strike_above_mean(x),
            CountAboveMean => counting::count_above_mean(x),
            CountBelowMean => counting::count_below_mean(x),
            LastLocationOfMaximum => counting::last_location_of_maximum(x),
            FirstLocationOfMaximum => counting::first_location_of_maximum(x),
            LastLocationOfMinimum => counting::last_location_of_minimum(x),
            FirstLocationOfMinimum => counting::first_location_of_minimum(x),
            PercentageOfReoccurringValues => {
                counting::percentage_of_reoccurring_values_to_all_values(x)
            }
            PercentageOfReoccurringDatapoints => {
                counting::percentage_of_reoccurring_datapoints_to_all_datapoints(x)
            }
            SumOfReoccurringValues => counting::sum_of_reoccurring_values(x),
            SumOfReoccurringDataPoints => counting::sum_of_reoccurring_data_points(x),
            RatioValueNumberToLength => counting::ratio_value_number_to_time_series_length(x),
            VariationCoefficient => distribution::variation_coefficient(x),
            TimeReversalAsymmetry { lag } => {
                autocorrelation::time_reversal_asymmetry_statistic(x, lag)
            }
            C3 { lag } => change::c3(x, lag),
            CidCe { normalize } => change::cid_ce(x, normalize),
            SymmetryLooking { r } => distribution::symmetry_looking(x, r),
            LargeStandardDeviation { r } => distribution::large_standard_deviation(x, r),
            Quantile { q } => distribution::quantile(x, q),
            Autocorrelation { lag } => autocorrelation::autocorrelation(x, lag),
            AggAutocorrelation { aggregate, max_lag } => {
                autocorrelation::agg_autocorrelation(x, aggregate, max_lag)
            }
            PartialAutocorrelation { lag } => autocorrelation::partial_autocorrelation(x, lag),
            NumberCrossingM { m } => counting::number_crossing_m(x, m),
            NumberPeaks { n } => counting::number_peaks(x, n),
            BinnedEntropy { max_bins } => entropy::binned_entropy(x, max_bins),
            IndexMassQuantile { q } => counting::index_mass_quantile(x, q),
            ArCoefficient { coeff, k } => {
                if k == AR_ORDER {
                    ctx.ar_coefficients().get(coeff).copied().unwrap_or(f64::NAN)
                } else {
                    autocorrelation::ar_coefficients(x, k)
                        .get(coeff)
                        .copied()
                        .unwrap_or(f64::NAN)
                }
            }
            ChangeQuantiles {
                aggregate,
                is_abs,
                qh,
                ql,
            } => change::change_quantiles(x, ql, qh, is_abs, aggregate),
            FftCoefficient { attr, coeff } => {
                spectral::fft_coefficient_of(ctx.spectrum(), coeff, attr)
            }
            FftAggregated { moment } => spectral::fft_aggregated_of(ctx.spectrum(), moment),
            ValueCount { value } => counting::value_count(x, value),
            RangeCount { max, min } => counting::range_count(x, min, max),
            LinearTrend { attr } => ctx.trend().attribute(attr),
            AggLinearTrend {
                attr,
                chunk_len,
                aggregate,
            } => trend::agg_linear_trend(x, chunk_len, aggregate, attr),
            EnergyRatioByChunks { segments, focus } => {
                change::energy_ratio_by_chunks(x, segments, focus)
            }
            RatioBeyondRSigma { r } => distribution::ratio_beyond_r_sigma(x, r),
            CountAbove { t } => counting::count_above(x, t),
            CountBelow { t } => counting::count_below(x, t),
            PermutationEntropy { dimension, tau } => {
                entropy::permutation_entropy(x, tau, dimension)
            }
            LempelZivComplexity { bins } => entropy::lempel_ziv_complexity(x, bins),
            FourierEntropy { bins } => spectral::fourier_entropy(x, bins),
            MeanNAbsoluteMax { n } => basic::mean_n_absolute_max(x, n),
            SampleEntropy => entropy::sample_entropy(x),
            ApproximateEntropy { m, r } => entropy::approximate_entropy(x, m, r),
        }
    }
}

fn minimal() -> Vec<Calculator> {
    use Calculator::*;
    vec![
        SumValues,
        Median,
        Mean,
        Length,
        StandardDeviation,
        Variance,
        RootMeanSquare,
        Maximum,
        AbsoluteMaximum,
        Minimum,
    ]
}

fn efficient() -> Vec<Calculator> {
    use Calculator::*;
    let mut out = minimal();
    out.extend([
        VarianceLargerThanStandardDeviation,
        HasDuplicateMax,
        HasDuplicateMin,
        HasDuplicate,
        AbsEnergy,
        MeanAbsChange,
        MeanChange,
        MeanSecondDerivativeCentral,
        Skewness,
        Kurtosis,
        AbsoluteSumOfChanges,
        LongestStrikeBelowMean,
        LongestStrikeAboveMean,
        CountAboveMean,
        CountBelowMean,
        LastLocationOfMaximum,
        FirstLocationOfMaximum,
        LastLocationOfMinimum,
        FirstLocationOfMinimum,
        PercentageOfReoccurringValues,
        PercentageOfReoccurringDatapoints,
        SumOfReoccurringValues,
        SumOfReoccurringDataPoints,
        RatioValueNumberToLength,
        VariationCoefficient,
    ]);

    out.extend((1..=3).map(|lag| TimeReversalAsymmetry { lag }));
    out.extend((1..=3).map(|lag| C3 { lag }));
    out.extend([true, false].map(|normalize| CidCe { normalize }));
    // hundredths keep the column names free of float noise
    out.extend((0..20).map(|i| SymmetryLooking {
        r: (i * 5) as f64 / 100.0,
    }));
    out.extend((1..20).map(|i| LargeStandardDeviation {
        r: (i * 5) as f64 / 100.0,
    }));
    let deciles = [0.1, 0.2, 0.3, 0.4, 0.6, 0.7, 0.8, 0.9];
    out.extend(deciles.map(|q| Quantile { q }));
    out.extend((0..10).map(|lag| Autocorrelation { lag }));
    out.extend(
        [AcfAggregate::Mean, AcfAggregate::Median, AcfAggregate::Var].map(|aggregate| {
            AggAutocorrelation {
                aggregate,
                max_lag: 40,
            }
        }),
    );
    out.extend((0..10).map(|lag| PartialAutocorrelation { lag }));
    out.extend([0.0, -1.0, 1.0].map(|m| NumberCrossingM { m }));
    out.extend([1, 3, 5, 10, 50].map(|n| NumberPeaks { n }));
    out.push(BinnedEntropy { max_bins: 10 });
    out.extend(deciles.map(|q| IndexMassQuantile { q }));
    out.extend((0..=AR_ORDER).map(|coeff| ArCoefficient { coeff, k: AR_ORDER }));

    let bounds = [0.0, 0.2, 0.4, 0.6, 0.8, 1.0];
    for &ql in &bounds {
        for &qh in &bounds {
            if ql >= qh {
                continue;
            }
            for is_abs in [false, true] {
                for aggregate in [ChangeAggregate::Mean, ChangeAggregate::Var] {
                    out.push(ChangeQuantiles {
                        aggregate,
                        is_abs,
                        qh,
                        ql,
                    });
                }
            }
        }
    }

    for attr in FftAttribute::ALL {
        out.extend((0..100).map(|coeff| FftCoefficient { attr, coeff }));
    }
    out.extend(SpectralMoment::ALL.map(|moment| FftAggregated { moment }));
    out.extend([0.0, 1.0, -1.0].map(|value| ValueCount { value }));
    out.extend([(1.0, -1.0), (1e12, 0.0), (0.0, -1e12)].map(|(max, min)| RangeCount { max, min }));
    out.extend(TrendAttribute::ALL.map(|attr| LinearTrend { attr }));
    for attr in TrendAttribute::ALL {
        for chunk_len in [5, 10, 50] {
            for aggregate in ChunkAggregate::ALL {
                out.push(AggLinearTrend {
                    attr,
                    chunk_len,
                    aggregate,
                });
            }
        }
    }
    out.extend((0..10).map(|focus| EnergyRatioByChunks {
        segments: 10,
        focus,
    }));
    out.extend([0.5, 1.0, 1.5, 2.0, 2.5, 3.0, 5.0, 6.0, 7.0, 10.0].map(|r| RatioBeyondRSigma { r }));
    out.push(CountAbove { t: 0.0 });
    out.push(CountBelow { t: 0.0 });
    out.extend((3..=7).map(|dimension| PermutationEntropy { dimension, tau: 1 }));
    out.extend([2, 3, 5, 10, 100].map(|bins| LempelZivComplexity { bins }));
    out.extend([2, 3, 5, 10, 100].map(|bins| FourierEntropy { bins }));
    out.extend([3, 5, 7].map(|n| MeanNAbsoluteMax { n }));
    out
}

fn comprehensive() -> Vec<Calculator> {
    use Calculator::*;
    let mut out = efficient();
    out.push(SampleEntropy);
    out.extend([0.1, 0.3, 0.5, 0.7, 0.9].map(|r| ApproximateEntropy { m: 2, r }));
    out
}

/// Ordered calculator list of a profile.
pub fn catalog(profile: FeatureProfile) -> Vec<Calculator> {
    match profile {
        FeatureProfile::Minimal => minimal(),
        FeatureProfile::Efficient => efficient(),
        FeatureProfile::Comprehensive => comprehensive(),
    }
}
