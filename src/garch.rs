//! GARCH(1,1) volatility clustering
//!
//! Conditional variance:
//!     σ²_t = ω + α · r²_{t-1} + β · σ²_{t-1}
//!
//! Return and price:
//!     r_t = μ dt + σ_t √dt Z
//!     S_t = S_{t-1} · exp(r_t)
//!
//! Covariance stationary when α + β < 1, with long-run variance
//! ω / (1 - α - β).

use crate::process::{PriceProcess, DT};
use crate::random::VariateSource;

#[derive(Debug, Clone)]
pub struct Garch11 {
    /// Daily drift μ
    pub mu: f64,
    /// Variance at the start of every trial
    pub initial_variance: f64,
    /// ω: constant variance term
    pub omega: f64,
    /// α: ARCH (shock) coefficient
    pub alpha: f64,
    /// β: GARCH (persistence) coefficient
    pub beta: f64,
}

/// Running variance plus the last realised return of one trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GarchState {
    pub variance: f64,
    pub last_return: f64,
}

impl Garch11 {
    pub fn new(mu: f64, initial_variance: f64, omega: f64, alpha: f64, beta: f64) -> Self {
        Self {
            mu,
            initial_variance: initial_variance.max(0.0),
            omega: omega.max(0.0),
            alpha: alpha.max(0.0),
            beta: beta.max(0.0),
        }
    }

    pub fn is_stationary(&self) -> bool {
        self.alpha + self.beta < 1.0
    }

    /// ω / (1 - α - β), or `None` when the process is not stationary
    pub fn long_run_variance(&self) -> Option<f64> {
        if self.is_stationary() {
            Some(self.omega / (1.0 - self.alpha - self.beta))
        } else {
            None
        }
    }
}

impl PriceProcess for Garch11 {
    type State = GarchState;
    const MEMORYLESS: bool = false;

    fn initial_state<V: VariateSource + ?Sized>(&self, _rng: &mut V) -> GarchState {
        GarchState {
            variance: self.initial_variance,
            last_return: 0.0,
        }
    }

    fn step<V: VariateSource + ?Sized>(&self, rng: &mut V, price: f64, state: &mut GarchState) -> f64 {
        state.variance = self.omega
            + self.alpha * state.last_return * state.last_return
            + self.beta * state.variance;

        let ret = self.mu * DT + state.variance.sqrt() * DT.sqrt() * rng.standard_normal();
        state.last_return = ret;

        price * ret.exp()
    }
}
