//! Geometric Brownian Motion (GBM)
//!
//! dS_t = μ S_t dt + σ S_t dW_t
//!
//! Stepped with the exact solution:
//! S_{t+dt} = S_t exp((μ - σ²/2)dt + σ√dt Z)

use crate::process::{PriceProcess, DT};
use crate::random::VariateSource;

/// Geometric Brownian Motion model
///
/// Memoryless: each step is an independent lognormal multiplier.
#[derive(Debug, Clone)]
pub struct GeometricBrownianMotion {
    /// Daily drift μ
    pub mu: f64,
    /// Daily volatility σ
    pub sigma: f64,
}

impl GeometricBrownianMotion {
    /// Creates a new GBM model
    ///
    /// # Arguments
    /// * `mu` - Daily log-return drift
    /// * `sigma` - Daily volatility (negative values are treated as zero)
    pub fn new(mu: f64, sigma: f64) -> Self {
        Self {
            mu,
            sigma: sigma.max(0.0),
        }
    }

    /// Log-space drift per step, (μ - σ²/2)dt
    pub fn drift_per_step(&self) -> f64 {
        (self.mu - 0.5 * self.sigma * self.sigma) * DT
    }

    /// Expected value E[S_t] = S_0 * exp(μt)
    pub fn expected_value(&self, s0: f64, t: f64) -> f64 {
        s0 * (self.mu * t).exp()
    }

    /// Variance Var[S_t] = E[S_t]² * (exp(σ²t) - 1)
    pub fn variance(&self, s0: f64, t: f64) -> f64 {
        let e_s = self.expected_value(s0, t);
        e_s * e_s * ((self.sigma * self.sigma * t).exp() - 1.0)
    }
}

impl PriceProcess for GeometricBrownianMotion {
    type State = ();
    const MEMORYLESS: bool = true;

    fn initial_state<V: VariateSource + ?Sized>(&self, _rng: &mut V) {}

    fn step<V: VariateSource + ?Sized>(&self, rng: &mut V, price: f64, _state: &mut ()) -> f64 {
        let z = rng.standard_normal();
        price * (self.drift_per_step() + self.sigma * DT.sqrt() * z).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ConstantShocks;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_gbm_positive_prices() {
        let gbm = GeometricBrownianMotion::new(-0.05, 0.5);
        let mut rng = StdRng::seed_from_u64(1);

        let path = gbm.generate_path(&mut rng, 100.0, 1000);

        assert!(path.iter().all(|&p| p > 0.0), "All prices should be positive");
    }

    #[test]
    fn test_zero_volatility_zero_drift_is_flat() {
        let gbm = GeometricBrownianMotion::new(0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(2);

        let path = gbm.generate_path(&mut rng, 250.0, 20);

        assert!(path.iter().all(|&p| (p - 250.0).abs() < 1e-9));
    }

    #[test]
    fn test_gbm_expected_value() {
        let gbm = GeometricBrownianMotion::new(0.001, 0.02);
        let mut rng = StdRng::seed_from_u64(3);
        let n_paths = 20_000;
        let n_steps = 30;

        let mean = (0..n_paths)
            .map(|_| *gbm.generate_path(&mut rng, 100.0, n_steps).last().unwrap())
            .sum::<f64>()
            / n_paths as f64;

        let expected = gbm.expected_value(100.0, n_steps as f64);
        let relative_error = (mean - expected).abs() / expected;
        assert!(
            relative_error < 0.01,
            "Mean: {:.4}, Expected: {:.4}, Error: {:.2}%",
            mean,
            expected,
            relative_error * 100.0
        );
    }

    #[test]
    fn test_log_returns_follow_drift() {
        let gbm = GeometricBrownianMotion::new(0.002, 0.01);
        let mut rng = StdRng::seed_from_u64(4);

        let path = gbm.generate_path(&mut rng, 100.0, 5000);
        let log_returns: Vec<f64> = path.windows(2).map(|w| (w[1] / w[0]).ln()).collect();

        let actual_mean = log_returns.iter().sum::<f64>() / log_returns.len() as f64;
        assert!(
            (actual_mean - gbm.drift_per_step()).abs() < 0.001,
            "Log return mean: {}, expected: {}",
            actual_mean,
            gbm.drift_per_step()
        );
    }

    #[test]
    fn test_crash_shocks_hit_floor() {
        let gbm = GeometricBrownianMotion::new(0.0, 0.5);
        let path = gbm.generate_path(&mut ConstantShocks::crash(), 100.0, 10);

        assert_eq!(path.len(), 11);
        assert!(path.iter().all(|&p| p >= crate::process::PRICE_FLOOR));
    }

    #[test]
    fn test_variance_formula() {
        let gbm = GeometricBrownianMotion::new(0.0, 0.1);
        let expected = 100.0f64.powi(2) * (0.01f64.exp() - 1.0);
        assert!((gbm.variance(100.0, 1.0) - expected).abs() < 1e-9);
    }
}
