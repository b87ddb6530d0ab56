//! Historical price series and return calibration
//!
//! Derives the daily log-return sample r_t = ln(P_t / P_{t-1}) from a
//! close-price series and estimates the drift μ and volatility σ every
//! process model is driven by.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// Minimum number of usable closes a series must carry before calibration
pub const MIN_OBSERVATIONS: usize = 30;

/// Minimum number of usable log returns needed for a standard deviation
pub const MIN_RETURNS: usize = 2;

/// One daily close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    /// Observation time (milliseconds since the Unix epoch, or a day index)
    pub timestamp: i64,
    /// Close price; non-positive or non-finite values mark a missing close
    pub close: f64,
}

impl PricePoint {
    pub fn new(timestamp: i64, close: f64) -> Self {
        Self { timestamp, close }
    }

    fn is_usable(&self) -> bool {
        self.close.is_finite() && self.close > 0.0
    }
}

/// Time-ordered close-price history, strictly increasing in time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalSeries {
    points: Vec<PricePoint>,
}

impl HistoricalSeries {
    /// Builds a series, rejecting timestamps that are not strictly increasing
    ///
    /// # Example
    /// ```
    /// use price_forecast::returns::{HistoricalSeries, PricePoint};
    ///
    /// let series = HistoricalSeries::new(vec![
    ///     PricePoint::new(1, 100.0),
    ///     PricePoint::new(2, 101.0),
    /// ]).unwrap();
    /// assert_eq!(series.len(), 2);
    /// ```
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        if let Some(w) = points.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
            return Err(SimulationError::InvalidSeries(format!(
                "timestamp {} does not follow {}",
                w[1].timestamp, w[0].timestamp
            )));
        }
        Ok(Self { points })
    }

    /// Builds a series from bare closes, indexing them by day
    pub fn from_closes(closes: &[f64]) -> Self {
        let points = closes
            .iter()
            .enumerate()
            .map(|(day, &close)| PricePoint::new(day as i64, close))
            .collect();
        Self { points }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of closes that are finite and positive
    pub fn usable_len(&self) -> usize {
        self.points.iter().filter(|p| p.is_usable()).count()
    }

    /// Most recent usable close
    pub fn last_close(&self) -> Option<f64> {
        self.points
            .iter()
            .rev()
            .find(|p| p.is_usable())
            .map(|p| p.close)
    }

    /// The most recent `n` observations (the whole series when shorter)
    pub fn tail(&self, n: usize) -> Self {
        let start = self.points.len().saturating_sub(n);
        Self {
            points: self.points[start..].to_vec(),
        }
    }

    /// Consecutive-pair log returns, skipping pairs with a missing close
    pub fn log_returns(&self) -> Vec<f64> {
        self.points
            .windows(2)
            .filter(|w| w[0].is_usable() && w[1].is_usable())
            .map(|w| (w[1].close / w[0].close).ln())
            .collect()
    }
}

/// Sample moments of the daily log-return sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibratedParameters {
    /// Mean daily log return
    pub mu: f64,
    /// Sample standard deviation of daily log returns (always >= 0)
    pub sigma: f64,
}

impl CalibratedParameters {
    pub fn new(mu: f64, sigma: f64) -> Self {
        Self {
            mu,
            sigma: sigma.max(0.0),
        }
    }

    /// Estimates μ and σ from a log-return sample
    ///
    /// Uses the sample (n - 1) standard deviation.
    pub fn from_returns(returns: &[f64]) -> Result<Self> {
        if returns.len() < MIN_RETURNS {
            return Err(SimulationError::InsufficientData {
                required: MIN_RETURNS,
                actual: returns.len(),
            });
        }

        let n = returns.len() as f64;
        let mu = returns.iter().sum::<f64>() / n;
        let variance = returns.iter().map(|r| (r - mu).powi(2)).sum::<f64>() / (n - 1.0);

        Ok(Self::new(mu, variance.sqrt()))
    }
}

/// Output of calibration: the return sample plus its moments
#[derive(Debug, Clone, PartialEq)]
pub struct Calibration {
    pub returns: Vec<f64>,
    pub params: CalibratedParameters,
}

/// Calibrates a series, enforcing the minimum-data-quality gate
///
/// Fails with [`SimulationError::InsufficientData`] when fewer than
/// [`MIN_OBSERVATIONS`] usable closes or fewer than [`MIN_RETURNS`] usable
/// log returns exist.
pub fn calibrate(series: &HistoricalSeries) -> Result<Calibration> {
    let usable = series.usable_len();
    if usable < MIN_OBSERVATIONS {
        return Err(SimulationError::InsufficientData {
            required: MIN_OBSERVATIONS,
            actual: usable,
        });
    }

    let returns = series.log_returns();
    let params = CalibratedParameters::from_returns(&returns)?;

    Ok(Calibration { returns, params })
}

/// Expected number of days for the calibrated drift to compound to a
/// target simple return, `ln(1 + target) / μ`
///
/// Returns `None` when the drift is zero, points away from the target, or
/// the target is a total loss (`target <= -1`).
pub fn estimate_target_days(params: &CalibratedParameters, target_return: f64) -> Option<f64> {
    if target_return <= -1.0 || params.mu == 0.0 {
        return None;
    }

    let days = (1.0 + target_return).ln() / params.mu;
    if days.is_finite() && days >= 0.0 {
        Some(days)
    } else {
        None
    }
}
