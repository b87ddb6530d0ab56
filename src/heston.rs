//! Heston Stochastic Volatility Model
//!
//! The Heston model allows volatility to be stochastic:
//!
//! dS_t = μ S_t dt + √V_t S_t dW^S_t
//! dV_t = κ(θ - V_t) dt + ξ √V_t dW^V_t
//!
//! where Corr(dW^S, dW^V) = ρ

use crate::process::{PriceProcess, DT};
use crate::random::VariateSource;

/// Heston stochastic volatility model
#[derive(Debug, Clone)]
pub struct HestonModel {
    /// Initial variance V_0
    pub v0: f64,
    /// Drift (expected daily return)
    pub mu: f64,
    /// Mean reversion speed (κ)
    pub kappa: f64,
    /// Long-term variance level (θ)
    pub theta: f64,
    /// Volatility of volatility (ξ)
    pub xi: f64,
    /// Correlation between price and variance shocks (ρ)
    pub rho: f64,
    /// Smallest variance the CIR step may leave behind
    pub variance_floor: f64,
}

/// Per-trial state: the current instantaneous variance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HestonState {
    pub variance: f64,
}

impl HestonModel {
    /// Creates a new Heston model
    ///
    /// # Arguments
    /// * `v0` - Initial variance
    /// * `mu` - Expected daily return
    /// * `kappa` - Mean reversion speed
    /// * `theta` - Long-term variance
    /// * `xi` - Volatility of volatility
    /// * `rho` - Correlation, clamped to [-1, 1]
    /// * `variance_floor` - Positive lower bound for the variance
    pub fn new(
        v0: f64,
        mu: f64,
        kappa: f64,
        theta: f64,
        xi: f64,
        rho: f64,
        variance_floor: f64,
    ) -> Self {
        let variance_floor = variance_floor.max(f64::MIN_POSITIVE);
        Self {
            v0: v0.max(variance_floor),
            mu,
            kappa,
            theta,
            xi,
            rho: rho.clamp(-1.0, 1.0),
            variance_floor,
        }
    }

    /// Checks if the Feller condition is satisfied
    ///
    /// The Feller condition 2κθ > ξ² keeps the continuous variance process
    /// away from zero.
    pub fn feller_condition_satisfied(&self) -> bool {
        2.0 * self.kappa * self.theta > self.xi * self.xi
    }

    /// One Euler step of the CIR variance, floored at `variance_floor`
    fn next_variance(&self, variance: f64, dw_v: f64) -> f64 {
        let sqrt_v = variance.max(0.0).sqrt();
        let dv = self.kappa * (self.theta - variance) * DT + self.xi * sqrt_v * dw_v;
        (variance + dv).max(self.variance_floor)
    }
}

impl PriceProcess for HestonModel {
    type State = HestonState;
    const MEMORYLESS: bool = false;

    fn initial_state<V: VariateSource + ?Sized>(&self, _rng: &mut V) -> HestonState {
        HestonState { variance: self.v0 }
    }

    fn step<V: VariateSource + ?Sized>(
        &self,
        rng: &mut V,
        price: f64,
        state: &mut HestonState,
    ) -> f64 {
        let sqrt_dt = DT.sqrt();

        // Correlated Brownian increments
        let z1 = rng.standard_normal();
        let z2 = rng.standard_normal();
        let dw_s = sqrt_dt * z1;
        let dw_v = sqrt_dt * (self.rho * z1 + (1.0 - self.rho * self.rho).sqrt() * z2);

        state.variance = self.next_variance(state.variance, dw_v);

        price + price * (self.mu * DT + state.variance.sqrt() * dw_s)
    }
}
