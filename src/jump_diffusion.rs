//! Merton Jump-Diffusion Model
//!
//! Extends GBM with random jumps:
//! dS_t = μ S_t dt + σ S_t dW_t + S_t dJ_t
//!
//! where J_t is a compound Poisson process with lognormal jump sizes
//! Y = exp(μ_J + σ_J Z).

use crate::process::{PriceProcess, DT};
use crate::random::VariateSource;

/// Merton Jump-Diffusion Model
///
/// Models asset prices with both continuous diffusion and discrete jumps.
/// Each step draws a Poisson(λ dt) jump count; with daily steps and a small
/// intensity this gates a jump with probability ≈ λ dt.
#[derive(Debug, Clone)]
pub struct MertonJumpDiffusion {
    /// Daily drift
    pub mu: f64,
    /// Diffusion volatility
    pub sigma: f64,
    /// Jump intensity (expected number of jumps per day)
    pub lambda: f64,
    /// Mean of log jump size (μ_J)
    pub mu_j: f64,
    /// Standard deviation of log jump size (σ_J)
    pub sigma_j: f64,
}

impl MertonJumpDiffusion {
    /// Creates a new Merton jump-diffusion model
    ///
    /// # Arguments
    /// * `mu` - Daily drift
    /// * `sigma` - Diffusion volatility
    /// * `lambda` - Jump intensity (jumps per day)
    /// * `mu_j` - Mean of log jump size
    /// * `sigma_j` - Std dev of log jump size
    ///
    /// # Example
    /// ```
    /// use price_forecast::MertonJumpDiffusion;
    ///
    /// // One jump every ten days on average, mean jump -2%, jump vol 10%
    /// let model = MertonJumpDiffusion::new(0.0005, 0.02, 0.1, -0.02, 0.1);
    /// ```
    pub fn new(mu: f64, sigma: f64, lambda: f64, mu_j: f64, sigma_j: f64) -> Self {
        Self {
            mu,
            sigma: sigma.max(0.0),
            lambda: lambda.max(0.0),
            mu_j,
            sigma_j: sigma_j.max(0.0),
        }
    }

    /// Expected jump multiplier: E[Y - 1] where Y = exp(μ_J + σ_J * Z)
    pub fn kappa(&self) -> f64 {
        (self.mu_j + 0.5 * self.sigma_j * self.sigma_j).exp() - 1.0
    }

    /// Expected log return per step, diffusion plus jumps
    pub fn expected_log_drift(&self) -> f64 {
        (self.mu - 0.5 * self.sigma * self.sigma) * DT + self.lambda * DT * self.mu_j
    }

    /// Sum of the log jump sizes arriving in one step
    fn log_jumps<V: VariateSource + ?Sized>(&self, rng: &mut V) -> f64 {
        let n_jumps = rng.poisson(self.lambda * DT);
        (0..n_jumps)
            .map(|_| self.mu_j + self.sigma_j * rng.standard_normal())
            .sum()
    }
}

impl PriceProcess for MertonJumpDiffusion {
    type State = ();
    const MEMORYLESS: bool = true;

    fn initial_state<V: VariateSource + ?Sized>(&self, _rng: &mut V) {}

    fn step<V: VariateSource + ?Sized>(&self, rng: &mut V, price: f64, _state: &mut ()) -> f64 {
        let diffusion = (self.mu - 0.5 * self.sigma * self.sigma) * DT
            + self.sigma * DT.sqrt() * rng.standard_normal();
        price * (diffusion + self.log_jumps(rng)).exp()
    }
}
