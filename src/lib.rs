//! # Monte Carlo Price Forecasting
//!
//! This crate estimates the distribution of an instrument's future price
//! from its close history. A daily log-return sample calibrates drift and
//! volatility, one of several stochastic process models is simulated over
//! many independent trials, and the ensemble is reduced to risk and return
//! statistics.
//!
//! ## Modules
//!
//! - [`returns`] - Historical series, log returns and calibration
//! - [`random`] - Variate sources, stable laws and seeding
//! - [`process`] - Step-function framework shared by every model
//! - [`gbm`] - Geometric Brownian motion
//! - [`brownian`] - Brownian motion on log prices
//! - [`jump_diffusion`] - Merton jump-diffusion
//! - [`heston`] - Heston stochastic volatility
//! - [`garch`] - GARCH(1,1) volatility clustering
//! - [`stable_levy`] - Heavy-tailed α-stable returns
//! - [`regime_switching`] - Two-state Markov regimes
//! - [`bootstrap`] - Historical return resampling
//! - [`monte_carlo`] - Batched ensembles and the `simulate` entry point
//! - [`statistics`] - Ensemble summary statistics
//!
//! ## Example
//!
//! ```rust
//! use price_forecast::{simulate, HistoricalSeries, ModelVariant, SimulationConfig};
//!
//! let closes: Vec<f64> = (0..90).map(|i| 50.0 * (1.0 + 0.01 * (i as f64).cos())).collect();
//! let series = HistoricalSeries::from_closes(&closes);
//!
//! let config = SimulationConfig::new(ModelVariant::JumpDiffusion, 30, 2_000).with_seed(42);
//! let result = simulate(&series, &config).unwrap();
//!
//! println!("P(gain) = {:.2}, VaR95 = {:.4}", result.prob_gain, result.var_95);
//! assert!(result.var_99 <= result.var_95);
//! ```

pub mod bootstrap;
pub mod brownian;
pub mod config;
pub mod error;
pub mod garch;
pub mod gbm;
pub mod heston;
pub mod jump_diffusion;
pub mod monte_carlo;
pub mod process;
pub mod random;
pub mod regime_switching;
pub mod returns;
pub mod stable_levy;
pub mod statistics;

pub use bootstrap::HistoricalBootstrap;
pub use brownian::BrownianMotion;
pub use config::{ModelSelection, ModelVariant, SimulationConfig, UnknownModelPolicy};
pub use error::{Result, SimulationError};
pub use garch::Garch11;
pub use gbm::GeometricBrownianMotion;
pub use heston::HestonModel;
pub use jump_diffusion::MertonJumpDiffusion;
pub use monte_carlo::{run_ensemble, simulate, Ensemble, RunPlan};
pub use process::{FlatProcess, PriceProcess, PRICE_CEILING, PRICE_FLOOR};
pub use regime_switching::RegimeSwitching;
pub use returns::{calibrate, HistoricalSeries, PricePoint};
pub use stable_levy::StableLevyProcess;
pub use statistics::{PercentilePoint, SimulationResult};
