//! Summary statistics of a simulated ensemble
//!
//! Reduces per-trial final returns and final prices to the result record
//! returned across the engine boundary. Everything here is a pure function
//! of its inputs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Final-price level at one percentile
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentilePoint {
    /// Percentile in percent, e.g. 5.0
    pub level: f64,
    pub price: f64,
}

/// Aggregate outcome of one simulation request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Canonical model name, or the unrecognized name that fell back to a
    /// flat path
    pub model: String,
    /// Calibrated moments and model constants actually used
    pub parameters: BTreeMap<String, f64>,
    pub start_price: f64,
    pub holding_days: usize,
    pub simulation_count: usize,
    /// Mean simple return, final / start - 1
    pub expected_return: f64,
    /// Population standard deviation of simple returns
    pub std_dev: f64,
    /// Share of trials with a strictly positive return
    pub prob_gain: f64,
    /// 5th percentile of simple returns
    pub var_95: f64,
    /// 1st percentile of simple returns
    pub var_99: f64,
    pub skewness: f64,
    /// Fourth standardized moment (3 for a normal distribution)
    pub kurtosis: f64,
    pub excess_kurtosis: f64,
    /// Mean and standard deviation of ln(final / start)
    pub log_return_mean: f64,
    pub log_return_std: f64,
    pub final_prices: Vec<f64>,
    pub mean_final_price: f64,
    pub price_percentiles: Vec<PercentilePoint>,
    /// Full paths of the first few trials, for display
    pub sample_paths: Vec<Vec<f64>>,
}

impl SimulationResult {
    /// Final price at a configured percentile level
    pub fn percentile(&self, level: f64) -> Option<f64> {
        self.price_percentiles
            .iter()
            .find(|p| (p.level - level).abs() < 1e-9)
            .map(|p| p.price)
    }
}

/// Population moments of a sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Moments {
    pub mean: f64,
    pub std_dev: f64,
    pub skewness: f64,
    pub kurtosis: f64,
}

impl Moments {
    /// Computes mean, population standard deviation, skewness and kurtosis
    ///
    /// A sample without dispersion has zero skewness and zero kurtosis.
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                mean: 0.0,
                std_dev: 0.0,
                skewness: 0.0,
                kurtosis: 0.0,
            };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
        for &x in values {
            let d = x - mean;
            let d2 = d * d;
            m2 += d2;
            m3 += d2 * d;
            m4 += d2 * d2;
        }
        m2 /= n;
        m3 /= n;
        m4 /= n;

        let std_dev = m2.sqrt();
        let scale = mean.abs().max(1.0);
        if std_dev <= 1e-14 * scale {
            return Self {
                mean,
                std_dev,
                skewness: 0.0,
                kurtosis: 0.0,
            };
        }

        Self {
            mean,
            std_dev,
            skewness: m3 / (m2 * std_dev),
            kurtosis: m4 / (m2 * m2),
        }
    }
}

/// Linear-interpolated percentile of an ascending sorted slice
///
/// Uses the (n - 1) · p rank convention, so level 0 is the minimum and
/// level 100 the maximum.
pub fn percentile(sorted: &[f64], level: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let rank = (level / 100.0).clamp(0.0, 1.0) * (n - 1) as f64;
            let lower = rank.floor() as usize;
            let upper = rank.ceil() as usize;
            let weight = rank - lower as f64;
            sorted[lower] + (sorted[upper] - sorted[lower]) * weight
        }
    }
}

fn sorted_copy(values: &[f64]) -> Vec<f64> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Distribution summary of an ensemble's final returns and prices
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleSummary {
    pub expected_return: f64,
    pub std_dev: f64,
    pub prob_gain: f64,
    pub var_95: f64,
    pub var_99: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub excess_kurtosis: f64,
    pub log_return_mean: f64,
    pub log_return_std: f64,
    pub mean_final_price: f64,
    pub price_percentiles: Vec<PercentilePoint>,
}

/// Summarises final returns and final prices
///
/// `final_returns[i]` must be `final_prices[i] / start_price - 1`.
pub fn summarize(
    final_returns: &[f64],
    final_prices: &[f64],
    start_price: f64,
    percentile_levels: &[f64],
) -> EnsembleSummary {
    let moments = Moments::from_values(final_returns);

    let gains = final_returns.iter().filter(|&&r| r > 0.0).count();
    let prob_gain = if final_returns.is_empty() {
        0.0
    } else {
        gains as f64 / final_returns.len() as f64
    };

    let sorted_returns = sorted_copy(final_returns);
    let var_95 = percentile(&sorted_returns, 5.0);
    let var_99 = percentile(&sorted_returns, 1.0);

    let log_returns: Vec<f64> = final_prices.iter().map(|p| (p / start_price).ln()).collect();
    let log_moments = Moments::from_values(&log_returns);

    let mean_final_price = if final_prices.is_empty() {
        start_price
    } else {
        final_prices.iter().sum::<f64>() / final_prices.len() as f64
    };

    let sorted_prices = sorted_copy(final_prices);
    let price_percentiles = percentile_levels
        .iter()
        .map(|&level| PercentilePoint {
            level,
            price: percentile(&sorted_prices, level),
        })
        .collect();

    EnsembleSummary {
        expected_return: moments.mean,
        std_dev: moments.std_dev,
        prob_gain,
        var_95,
        var_99,
        skewness: moments.skewness,
        kurtosis: moments.kurtosis,
        // Zero kurtosis only arises from a sample without dispersion
        excess_kurtosis: if moments.kurtosis == 0.0 {
            0.0
        } else {
            moments.kurtosis - 3.0
        },
        log_return_mean: log_moments.mean,
        log_return_std: log_moments.std_dev,
        mean_final_price,
        price_percentiles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    #[test]
    fn test_percentile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&sorted, 0.0), 1.0);
        assert_eq!(percentile(&sorted, 50.0), 3.0);
        assert_eq!(percentile(&sorted, 100.0), 5.0);
        assert_relative_eq!(percentile(&sorted, 10.0), 1.4, epsilon = 1e-12);
        assert_relative_eq!(percentile(&sorted, 62.5), 3.5, epsilon = 1e-12);
        assert_eq!(percentile(&[7.0], 95.0), 7.0);
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_moments_of_known_sample() {
        let m = Moments::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_relative_eq!(m.mean, 5.0, epsilon = 1e-12);
        assert_relative_eq!(m.std_dev, 2.0, epsilon = 1e-12);
        // m3 = 42 / 8, m4 = 356 / 8
        assert_relative_eq!(m.skewness, 5.25 / 8.0, epsilon = 1e-12);
        assert_relative_eq!(m.kurtosis, 44.5 / 16.0, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_moments() {
        let m = Moments::from_values(&[0.0; 6]);
        assert_eq!(m.std_dev, 0.0);
        assert_eq!(m.skewness, 0.0);
        assert_eq!(m.kurtosis, 0.0);
    }

    #[test]
    fn test_normal_sample_shape() {
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let values: Vec<f64> = (0..200_000).map(|_| normal.sample(&mut rng)).collect();

        let m = Moments::from_values(&values);
        assert!(m.skewness.abs() < 0.03, "skewness {}", m.skewness);
        assert!((m.kurtosis - 3.0).abs() < 0.06, "kurtosis {}", m.kurtosis);
    }

    #[test]
    fn test_summary_fields() {
        let prices = [90.0, 95.0, 100.0, 110.0, 120.0];
        let returns: Vec<f64> = prices.iter().map(|p| p / 100.0 - 1.0).collect();

        let summary = summarize(&returns, &prices, 100.0, &[50.0, 25.0]);

        assert_relative_eq!(summary.expected_return, 0.03, epsilon = 1e-12);
        assert_relative_eq!(summary.prob_gain, 0.4, epsilon = 1e-12);
        assert_relative_eq!(summary.mean_final_price, 103.0, epsilon = 1e-12);
        assert!(summary.var_99 <= summary.var_95);
        assert_relative_eq!(summary.var_95, -0.09, epsilon = 1e-12);
        assert_eq!(summary.price_percentiles[0], PercentilePoint { level: 50.0, price: 100.0 });
        assert_eq!(summary.price_percentiles[1], PercentilePoint { level: 25.0, price: 95.0 });
    }

    #[test]
    fn test_flat_ensemble_summary() {
        let prices = [50.0; 4];
        let returns = [0.0; 4];
        let summary = summarize(&returns, &prices, 50.0, &[5.0, 95.0]);

        assert_eq!(summary.expected_return, 0.0);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.prob_gain, 0.0);
        assert_eq!(summary.var_95, 0.0);
        assert_eq!(summary.var_99, 0.0);
        assert_eq!(summary.log_return_mean, 0.0);
        assert_eq!(summary.excess_kurtosis, 0.0);
        assert!(summary.price_percentiles.iter().all(|p| p.price == 50.0));
    }
}
