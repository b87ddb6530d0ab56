//! Historical bootstrap
//!
//! Each day's log return is resampled with replacement from the observed
//! log-return sample, so the simulated distribution is the empirical one
//! rather than a parametric fit.

use crate::error::{Result, SimulationError};
use crate::process::PriceProcess;
use crate::returns::MIN_RETURNS;
use crate::random::VariateSource;

#[derive(Debug, Clone)]
pub struct HistoricalBootstrap {
    returns: Vec<f64>,
}

impl HistoricalBootstrap {
    /// Builds a resampler over a non-empty log-return sample
    pub fn new(returns: Vec<f64>) -> Result<Self> {
        if returns.len() < MIN_RETURNS {
            return Err(SimulationError::InsufficientData {
                required: MIN_RETURNS,
                actual: returns.len(),
            });
        }
        Ok(Self { returns })
    }

    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Draws one historical log return
    pub fn resample<V: VariateSource + ?Sized>(&self, rng: &mut V) -> f64 {
        self.returns[rng.index(self.returns.len())]
    }
}

impl PriceProcess for HistoricalBootstrap {
    type State = ();
    const MEMORYLESS: bool = true;

    fn initial_state<V: VariateSource + ?Sized>(&self, _rng: &mut V) {}

    fn step<V: VariateSource + ?Sized>(&self, rng: &mut V, price: f64, _state: &mut ()) -> f64 {
        price * self.resample(rng).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ConstantShocks;
    use crate::process::PRICE_FLOOR;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_requires_returns() {
        assert!(HistoricalBootstrap::new(vec![]).is_err());
        assert!(HistoricalBootstrap::new(vec![0.01]).is_err());
        assert!(HistoricalBootstrap::new(vec![0.01, -0.02]).is_ok());
    }

    #[test]
    fn test_steps_only_use_historical_returns() {
        let sample = vec![-0.03, -0.01, 0.0, 0.02, 0.05];
        let model = HistoricalBootstrap::new(sample.clone()).unwrap();
        let mut rng = StdRng::seed_from_u64(1);

        let path = model.generate_path(&mut rng, 100.0, 50);
        for w in path.windows(2) {
            let r = (w[1] / w[0]).ln();
            assert!(
                sample.iter().any(|s| (s - r).abs() < 1e-12),
                "return {} not in the historical sample",
                r
            );
        }
    }

    #[test]
    fn test_final_return_within_aggregated_range() {
        let sample = vec![-0.04, -0.01, 0.01, 0.03];
        let model = HistoricalBootstrap::new(sample).unwrap();
        let mut rng = StdRng::seed_from_u64(2);
        let days = 10;

        for _ in 0..500 {
            let path = model.generate_path(&mut rng, 100.0, days);
            let total = (path[days] / 100.0).ln();
            assert!(total >= -0.04 * days as f64 - 1e-12);
            assert!(total <= 0.03 * days as f64 + 1e-12);
        }
    }

    #[test]
    fn test_every_return_is_drawn() {
        let model = HistoricalBootstrap::new(vec![0.1, 0.2, 0.3]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let mut seen = [false; 3];
        for _ in 0..300 {
            let r = model.resample(&mut rng);
            let i = model.returns().iter().position(|&x| x == r).unwrap();
            seen[i] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_crash_shocks_hit_floor() {
        // Scripted index draws always pick the first return
        let model = HistoricalBootstrap::new(vec![-5.0, 0.01]).unwrap();
        let path = model.generate_path(&mut ConstantShocks::crash(), 100.0, 10);

        assert_eq!(path.len(), 11);
        assert!(path.iter().all(|&p| p >= PRICE_FLOOR));
        assert!(path.windows(2).all(|w| w[1] <= w[0]));
        assert_eq!(path[10], PRICE_FLOOR);
    }
}
