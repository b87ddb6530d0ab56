//! Random variate generation for the process models
//!
//! Models draw randomness through [`VariateSource`] instead of touching a
//! global generator. Every `rand::Rng` is a `VariateSource`, so a seeded
//! `StdRng` gives reproducible ensembles and tests can substitute scripted
//! shock sequences.

use std::f64::consts::{FRAC_PI_2, PI};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp1, Poisson, StandardNormal};

use crate::error::{Result, SimulationError};

/// Source of the variates the process models consume
pub trait VariateSource {
    /// An i.i.d. N(0, 1) draw
    fn standard_normal(&mut self) -> f64;

    /// A uniform draw on [0, 1)
    fn uniform(&mut self) -> f64;

    /// A Poisson(λ) count; zero when λ is not positive
    fn poisson(&mut self, lambda: f64) -> u64;

    /// A draw from an α-stable law
    fn stable(&mut self, law: &StableLevy) -> f64;

    /// A uniform index in `0..len` (`len` must be non-zero)
    fn index(&mut self, len: usize) -> usize;
}

impl<R: Rng + ?Sized> VariateSource for R {
    fn standard_normal(&mut self) -> f64 {
        self.sample(StandardNormal)
    }

    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn poisson(&mut self, lambda: f64) -> u64 {
        if !(lambda > 0.0) {
            return 0;
        }
        match Poisson::new(lambda) {
            Ok(poisson) => {
                let count: f64 = poisson.sample(self);
                count as u64
            }
            Err(_) => 0,
        }
    }

    fn stable(&mut self, law: &StableLevy) -> f64 {
        law.sample(self)
    }

    fn index(&mut self, len: usize) -> usize {
        self.gen_range(0..len)
    }
}

/// Standard α-stable distribution S(α, β, 1, 0)
///
/// Sampled with the Chambers–Mallows–Stuck construction: a uniform angle
/// V ~ U(-π/2, π/2) and an exponential W ~ Exp(1) are pushed through a
/// closed-form transform, with a separate branch for α = 1.
///
/// α = 2 gives a Gaussian with variance 2; α < 2 gives power-law tails
/// P(|X| > x) ~ x^(-α).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StableLevy {
    /// Stability index α in (0, 2]
    pub alpha: f64,
    /// Skewness β in [-1, 1]
    pub beta: f64,
}

impl StableLevy {
    /// Creates a stable law, validating α ∈ (0, 2] and β ∈ [-1, 1]
    ///
    /// # Example
    /// ```
    /// use price_forecast::random::StableLevy;
    ///
    /// assert!(StableLevy::new(1.7, 0.0).is_ok());
    /// assert!(StableLevy::new(2.5, 0.0).is_err());
    /// ```
    pub fn new(alpha: f64, beta: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha <= 2.0) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "stable index alpha must lie in (0, 2], got {}",
                alpha
            )));
        }
        if !(-1.0..=1.0).contains(&beta) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "stable skew beta must lie in [-1, 1], got {}",
                beta
            )));
        }
        Ok(Self { alpha, beta })
    }

    /// Applies the CMS transform to a given angle and exponential draw
    pub fn transform(&self, v: f64, w: f64) -> f64 {
        let (alpha, beta) = (self.alpha, self.beta);
        let w = w.max(f64::MIN_POSITIVE);

        if (alpha - 1.0).abs() < 1e-12 {
            let shifted = FRAC_PI_2 + beta * v;
            return (2.0 / PI)
                * (shifted * v.tan() - beta * ((FRAC_PI_2 * w * v.cos()) / shifted).ln());
        }

        let zeta = beta * (PI * alpha / 2.0).tan();
        let b = zeta.atan() / alpha;
        let s = (1.0 + zeta * zeta).powf(1.0 / (2.0 * alpha));

        let av = alpha * (v + b);
        s * av.sin() / v.cos().powf(1.0 / alpha) * ((v - av).cos() / w).powf((1.0 - alpha) / alpha)
    }
}

impl Distribution<f64> for StableLevy {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        let v = rng.gen_range(-FRAC_PI_2..FRAC_PI_2);
        let w: f64 = rng.sample(Exp1);
        self.transform(v, w)
    }
}

/// Master generator: seeded when a seed is given, from entropy otherwise
pub fn master_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// Draws one seed per independent stream from the master generator
///
/// Seeds are drawn sequentially before any parallel work starts, so each
/// worker's stream is fixed regardless of scheduling.
pub fn stream_seeds<R: Rng + ?Sized>(master: &mut R, n_streams: usize) -> Vec<u64> {
    (0..n_streams).map(|_| master.gen::<u64>()).collect()
}
