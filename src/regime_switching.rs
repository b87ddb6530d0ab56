//! Two-state Markov regime-switching model
//!
//! A latent regime ∈ {bull, bear} evolves as a Markov chain with fixed
//! self-transition probabilities p_bull and p_bear. Each regime scales the
//! calibrated drift and volatility; the price then takes an Euler step
//!
//! dS = S (μ_r dt + σ_r √dt Z)
//!
//! The chain's stationary share of bull days is
//! (1 - p_bear) / ((1 - p_bull) + (1 - p_bear)).

use serde::{Deserialize, Serialize};

use crate::process::{PriceProcess, DT};
use crate::random::VariateSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    Bull,
    Bear,
}

/// Drift and volatility in force during one regime
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegimeDynamics {
    pub drift: f64,
    pub volatility: f64,
}

#[derive(Debug, Clone)]
pub struct RegimeSwitching {
    pub bull: RegimeDynamics,
    pub bear: RegimeDynamics,
    /// Probability of staying in the bull regime for another day
    pub p_bull: f64,
    /// Probability of staying in the bear regime for another day
    pub p_bear: f64,
}

impl RegimeSwitching {
    pub fn new(bull: RegimeDynamics, bear: RegimeDynamics, p_bull: f64, p_bear: f64) -> Self {
        Self {
            bull: RegimeDynamics {
                volatility: bull.volatility.max(0.0),
                ..bull
            },
            bear: RegimeDynamics {
                volatility: bear.volatility.max(0.0),
                ..bear
            },
            p_bull: p_bull.clamp(0.0, 1.0),
            p_bear: p_bear.clamp(0.0, 1.0),
        }
    }

    /// Long-run fraction of days spent in the bull regime
    ///
    /// Returns 0.5 for a chain that never leaves its starting regime.
    pub fn stationary_bull_share(&self) -> f64 {
        let leave_bull = 1.0 - self.p_bull;
        let leave_bear = 1.0 - self.p_bear;
        if leave_bull + leave_bear == 0.0 {
            0.5
        } else {
            leave_bear / (leave_bull + leave_bear)
        }
    }

    /// Draws the next regime from the current one
    pub fn transition<V: VariateSource + ?Sized>(&self, rng: &mut V, regime: Regime) -> Regime {
        let u = rng.uniform();
        match regime {
            Regime::Bull if u < self.p_bull => Regime::Bull,
            Regime::Bull => Regime::Bear,
            Regime::Bear if u < self.p_bear => Regime::Bear,
            Regime::Bear => Regime::Bull,
        }
    }

    pub fn dynamics(&self, regime: Regime) -> RegimeDynamics {
        match regime {
            Regime::Bull => self.bull,
            Regime::Bear => self.bear,
        }
    }
}

impl PriceProcess for RegimeSwitching {
    type State = Regime;
    const MEMORYLESS: bool = false;

    /// Starts in either regime with equal probability
    fn initial_state<V: VariateSource + ?Sized>(&self, rng: &mut V) -> Regime {
        if rng.uniform() < 0.5 {
            Regime::Bull
        } else {
            Regime::Bear
        }
    }

    fn step<V: VariateSource + ?Sized>(&self, rng: &mut V, price: f64, regime: &mut Regime) -> f64 {
        *regime = self.transition(rng, *regime);
        let RegimeDynamics { drift, volatility } = self.dynamics(*regime);

        price + price * (drift * DT + volatility * DT.sqrt() * rng.standard_normal())
    }
}
