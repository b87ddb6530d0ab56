//! Brownian motion in log-price
//!
//! ln S_t = ln S_0 + Σ X_i, with X_i ~ N(μ dt, σ² dt)
//!
//! Unlike GBM there is no Itô correction: the drift is applied to the log
//! price directly, so the median path grows at μ rather than μ - σ²/2.

use crate::process::{PriceProcess, DT};
use crate::random::VariateSource;

/// Arithmetic Brownian motion on the log price
#[derive(Debug, Clone)]
pub struct BrownianMotion {
    /// Mean of each log increment per unit time
    pub mu: f64,
    /// Standard deviation of each log increment per unit √time
    pub sigma: f64,
}

impl BrownianMotion {
    /// Creates a log-price Brownian motion
    pub fn new(mu: f64, sigma: f64) -> Self {
        Self {
            mu,
            sigma: sigma.max(0.0),
        }
    }

    /// Draws one log increment N(μ dt, σ√dt)
    pub fn increment<V: VariateSource + ?Sized>(&self, rng: &mut V) -> f64 {
        self.mu * DT + self.sigma * DT.sqrt() * rng.standard_normal()
    }
}

impl PriceProcess for BrownianMotion {
    type State = ();
    const MEMORYLESS: bool = true;

    fn initial_state<V: VariateSource + ?Sized>(&self, _rng: &mut V) {}

    fn step<V: VariateSource + ?Sized>(&self, rng: &mut V, price: f64, _state: &mut ()) -> f64 {
        price * self.increment(rng).exp()
    }
}

/// Computes the quadratic variation of a log-price path
///
/// For a log-price Brownian motion, the sum of squared log increments
/// approaches n (σ² + μ²) dt².
pub fn quadratic_variation(path: &[f64]) -> f64 {
    path.windows(2)
        .map(|w| {
            let diff = (w[1] / w[0]).ln();
            diff * diff
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::testing::ConstantShocks;
    use crate::process::PRICE_FLOOR;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_starts_at_initial() {
        let bm = BrownianMotion::new(0.001, 0.02);
        let mut rng = StdRng::seed_from_u64(1);
        let path = bm.generate_path(&mut rng, 5.0, 100);
        assert_eq!(path[0], 5.0);
        assert_eq!(path.len(), 101);
    }

    #[test]
    fn test_zero_parameters_are_flat() {
        let bm = BrownianMotion::new(0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(2);
        let path = bm.generate_path(&mut rng, 80.0, 15);
        assert!(path.iter().all(|&p| (p - 80.0).abs() < 1e-9));
    }

    #[test]
    fn test_quadratic_variation_matches_sigma() {
        let bm = BrownianMotion::new(0.0, 0.02);
        let mut rng = StdRng::seed_from_u64(3);

        let n_steps = 10_000;
        let path = bm.generate_path(&mut rng, 100.0, n_steps);
        let qv = quadratic_variation(&path);
        let expected = n_steps as f64 * 0.02 * 0.02;

        assert!(
            (qv - expected).abs() / expected < 0.05,
            "QV = {}, expected ≈ {}",
            qv,
            expected
        );
    }

    #[test]
    fn test_median_log_growth_uses_raw_drift() {
        let bm = BrownianMotion::new(0.01, 0.03);
        let mut rng = StdRng::seed_from_u64(4);

        let n_paths = 5000;
        let n_steps = 20;
        let mean_log = (0..n_paths)
            .map(|_| (bm.generate_path(&mut rng, 1.0, n_steps)[n_steps]).ln())
            .sum::<f64>()
            / n_paths as f64;

        assert!(
            (mean_log - 0.2).abs() < 0.01,
            "mean log return {}, expected 0.2",
            mean_log
        );
    }

    #[test]
    fn test_crash_shocks_hit_floor() {
        let bm = BrownianMotion::new(0.0, 0.5);
        let path = bm.generate_path(&mut ConstantShocks::crash(), 100.0, 10);

        assert_eq!(path.len(), 11);
        assert!(path.iter().all(|&p| p >= PRICE_FLOOR));
        assert_eq!(path[1], PRICE_FLOOR);
        assert_eq!(path[10], PRICE_FLOOR);
    }
}
