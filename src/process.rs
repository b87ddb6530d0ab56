//! Step-function framework shared by every price process
//!
//! A process advances one trial by one day: given the current price and
//! the trial's carried state, it returns the next price and updates the
//! state in place. Memoryless processes carry `()` and may be simulated
//! step-major across a whole batch; stateful ones are simulated one full
//! path at a time.

use crate::random::VariateSource;

/// Lowest price any step may produce
///
/// Applied after every step of every model so additive-noise overshoot can
/// never yield a zero or negative price.
pub const PRICE_FLOOR: f64 = 0.01;

/// Highest price any step may produce
///
/// Keeps compounded heavy-tailed draws finite so ensemble statistics stay
/// well defined.
pub const PRICE_CEILING: f64 = 1.0e12;

/// Time step in days
pub const DT: f64 = 1.0;

/// Trait implemented by every price model
pub trait PriceProcess: Send + Sync {
    /// Per-trial state carried from one step to the next
    type State: Clone + Send;

    /// Whether the process carries no information across steps
    const MEMORYLESS: bool;

    /// Fresh state for a new trial
    fn initial_state<V: VariateSource + ?Sized>(&self, rng: &mut V) -> Self::State;

    /// Advances one step and returns the unfloored next price
    fn step<V: VariateSource + ?Sized>(
        &self,
        rng: &mut V,
        price: f64,
        state: &mut Self::State,
    ) -> f64;

    /// Advances one step and clamps the price to [`PRICE_FLOOR`, `PRICE_CEILING`]
    fn next_price<V: VariateSource + ?Sized>(
        &self,
        rng: &mut V,
        price: f64,
        state: &mut Self::State,
    ) -> f64 {
        clamp_price(self.step(rng, price, state))
    }

    /// Generates a full path of `n_steps + 1` prices starting at `s0`
    ///
    /// # Example
    /// ```
    /// use price_forecast::gbm::GeometricBrownianMotion;
    /// use price_forecast::process::PriceProcess;
    ///
    /// let gbm = GeometricBrownianMotion::new(0.0005, 0.02);
    /// let mut rng = rand::thread_rng();
    /// let path = gbm.generate_path(&mut rng, 100.0, 30);
    /// assert_eq!(path.len(), 31);
    /// assert_eq!(path[0], 100.0);
    /// ```
    fn generate_path<V: VariateSource + ?Sized>(&self, rng: &mut V, s0: f64, n_steps: usize) -> Vec<f64> {
        let mut path = Vec::with_capacity(n_steps + 1);
        path.push(s0);

        let mut state = self.initial_state(rng);
        let mut price = s0;
        for _ in 0..n_steps {
            price = self.next_price(rng, price, &mut state);
            path.push(price);
        }

        path
    }
}

/// Clamps a price to [`PRICE_FLOOR`, `PRICE_CEILING`]
///
/// NaN maps to the floor and +inf to the ceiling.
pub fn clamp_price(price: f64) -> f64 {
    if price > PRICE_CEILING {
        PRICE_CEILING
    } else if price > PRICE_FLOOR {
        price
    } else {
        PRICE_FLOOR
    }
}

/// Degenerate process that never moves the price
///
/// Stands in for an unrecognized model under the flat fallback policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatProcess;

impl PriceProcess for FlatProcess {
    type State = ();
    const MEMORYLESS: bool = true;

    fn initial_state<V: VariateSource + ?Sized>(&self, _rng: &mut V) {}

    fn step<V: VariateSource + ?Sized>(&self, _rng: &mut V, price: f64, _state: &mut ()) -> f64 {
        price
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_price() {
        assert_eq!(clamp_price(5.0), 5.0);
        assert_eq!(clamp_price(-3.0), PRICE_FLOOR);
        assert_eq!(clamp_price(0.0), PRICE_FLOOR);
        assert_eq!(clamp_price(f64::NAN), PRICE_FLOOR);
        assert_eq!(clamp_price(f64::NEG_INFINITY), PRICE_FLOOR);
        assert_eq!(clamp_price(f64::INFINITY), PRICE_CEILING);
        assert_eq!(clamp_price(1.0e300), PRICE_CEILING);
    }

    #[test]
    fn test_flat_process_path() {
        let mut rng = rand::thread_rng();
        let path = FlatProcess.generate_path(&mut rng, 42.0, 5);
        assert_eq!(path, vec![42.0; 6]);
    }
}
