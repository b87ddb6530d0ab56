//! Heavy-tailed log returns from an α-stable law
//!
//! r_t = drift · dt + scale · √dt · X,   X ~ S(α, β, 1, 0)
//! S_t = S_{t-1} · exp(r_t)
//!
//! The process ignores the calibrated moments: a stable law with α < 2 has
//! no finite variance to match them against.
//!
//! A single draw is unbounded, so each daily log return is truncated to
//! ±[`MAX_LOG_RETURN`] to keep the price finite.

use crate::error::Result;
use crate::process::{PriceProcess, DT};
use crate::random::{StableLevy, VariateSource};

/// Largest absolute daily log return a stable draw may produce
pub const MAX_LOG_RETURN: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct StableLevyProcess {
    /// Fixed daily drift of the log price
    pub drift: f64,
    /// Scale applied to each stable draw
    pub scale: f64,
    /// Law of the standardised shock
    pub law: StableLevy,
}

impl StableLevyProcess {
    /// Creates the process, validating the stable parameters
    pub fn new(drift: f64, scale: f64, alpha: f64, beta: f64) -> Result<Self> {
        Ok(Self {
            drift,
            scale: scale.max(0.0),
            law: StableLevy::new(alpha, beta)?,
        })
    }
}

impl PriceProcess for StableLevyProcess {
    type State = ();
    const MEMORYLESS: bool = true;

    fn initial_state<V: VariateSource + ?Sized>(&self, _rng: &mut V) {}

    fn step<V: VariateSource + ?Sized>(&self, rng: &mut V, price: f64, _state: &mut ()) -> f64 {
        let ret = self.drift * DT + self.scale * DT.sqrt() * rng.stable(&self.law);
        price * ret.clamp(-MAX_LOG_RETURN, MAX_LOG_RETURN).exp()
    }
}
