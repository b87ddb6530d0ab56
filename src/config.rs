//! Simulation configuration
//!
//! Everything a caller can tune about one simulation request: the model,
//! the horizon and trial count, reproducibility, batching, reporting, and
//! the fixed constants each process model runs with.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimulationError};

/// The closed set of supported process models
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelVariant {
    Gbm,
    Brownian,
    JumpDiffusion,
    Heston,
    Garch,
    StableLevy,
    RegimeSwitching,
    Bootstrap,
}

impl ModelVariant {
    pub const ALL: [ModelVariant; 8] = [
        ModelVariant::Gbm,
        ModelVariant::Brownian,
        ModelVariant::JumpDiffusion,
        ModelVariant::Heston,
        ModelVariant::Garch,
        ModelVariant::StableLevy,
        ModelVariant::RegimeSwitching,
        ModelVariant::Bootstrap,
    ];

    /// Canonical snake_case name
    pub fn name(&self) -> &'static str {
        match self {
            ModelVariant::Gbm => "gbm",
            ModelVariant::Brownian => "brownian",
            ModelVariant::JumpDiffusion => "jump_diffusion",
            ModelVariant::Heston => "heston",
            ModelVariant::Garch => "garch",
            ModelVariant::StableLevy => "stable_levy",
            ModelVariant::RegimeSwitching => "regime_switching",
            ModelVariant::Bootstrap => "bootstrap",
        }
    }
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelVariant {
    type Err = SimulationError;

    /// Parses canonical names and the display names used by older clients
    ///
    /// Matching ignores case and treats `-` and spaces like `_`.
    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        let variant = match key.as_str() {
            "gbm" | "geometric_brownian_motion" | "geometric_brownian_motion_(gbm)" => {
                ModelVariant::Gbm
            }
            "brownian" | "standard_brownian_motion" | "brownian_motion" => ModelVariant::Brownian,
            "jump_diffusion" | "merton" | "merton_jump_diffusion" => ModelVariant::JumpDiffusion,
            "heston" | "stochastic_volatility" => ModelVariant::Heston,
            "garch" | "garch_+_gbm_hybrid" | "garch_gbm" => ModelVariant::Garch,
            "stable_levy" | "levy" => ModelVariant::StableLevy,
            "regime_switching" => ModelVariant::RegimeSwitching,
            "bootstrap" | "historical_bootstrap" => ModelVariant::Bootstrap,
            _ => return Err(SimulationError::UnrecognizedModel(s.to_string())),
        };
        Ok(variant)
    }
}

/// A requested model: one of the supported variants, or a name the engine
/// does not know
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ModelSelection {
    Variant(ModelVariant),
    Unrecognized(String),
}

impl ModelSelection {
    pub fn parse(name: &str) -> Self {
        match name.parse::<ModelVariant>() {
            Ok(variant) => ModelSelection::Variant(variant),
            Err(_) => ModelSelection::Unrecognized(name.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ModelSelection::Variant(variant) => variant.name(),
            ModelSelection::Unrecognized(name) => name,
        }
    }
}

impl From<String> for ModelSelection {
    fn from(name: String) -> Self {
        ModelSelection::parse(&name)
    }
}

impl From<ModelSelection> for String {
    fn from(selection: ModelSelection) -> Self {
        selection.name().to_string()
    }
}

impl From<ModelVariant> for ModelSelection {
    fn from(variant: ModelVariant) -> Self {
        ModelSelection::Variant(variant)
    }
}

/// What to do when the requested model is not recognised
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownModelPolicy {
    /// Simulate a flat path held at the start price
    #[default]
    Flat,
    /// Fail with `UnrecognizedModel` before any simulation work
    Reject,
}

/// Merton jump constants (per-day units)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpConstants {
    /// Expected jumps per day
    pub intensity: f64,
    /// Mean log jump size
    pub mean: f64,
    /// Log jump size standard deviation
    pub std_dev: f64,
}

impl Default for JumpConstants {
    fn default() -> Self {
        Self {
            intensity: 0.1,
            mean: -0.02,
            std_dev: 0.1,
        }
    }
}

/// Heston constants; the long-run and initial variance default to σ²
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HestonConstants {
    pub kappa: f64,
    /// Long-run variance θ; `None` uses the calibrated σ²
    pub theta: Option<f64>,
    /// Volatility of variance σ_v
    pub vol_of_vol: f64,
    pub rho: f64,
    pub variance_floor: f64,
}

impl Default for HestonConstants {
    fn default() -> Self {
        Self {
            kappa: 2.0,
            theta: None,
            vol_of_vol: 0.3,
            rho: -0.7,
            variance_floor: 1e-4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GarchConstants {
    pub omega: f64,
    pub alpha: f64,
    pub beta: f64,
}

impl Default for GarchConstants {
    fn default() -> Self {
        Self {
            omega: 1e-5,
            alpha: 0.1,
            beta: 0.85,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StableConstants {
    /// Stability index α in (0, 2]
    pub alpha: f64,
    /// Skewness β in [-1, 1]
    pub beta: f64,
    pub drift: f64,
    pub scale: f64,
}

impl Default for StableConstants {
    fn default() -> Self {
        Self {
            alpha: 1.7,
            beta: 0.0,
            drift: 1e-4,
            scale: 0.02,
        }
    }
}

/// Regime self-transition probabilities and multipliers of μ and σ
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegimeConstants {
    pub p_bull: f64,
    pub p_bear: f64,
    pub bull_drift: f64,
    pub bull_vol: f64,
    pub bear_drift: f64,
    pub bear_vol: f64,
}

impl Default for RegimeConstants {
    fn default() -> Self {
        Self {
            p_bull: 0.95,
            p_bear: 0.90,
            bull_drift: 2.0,
            bull_vol: 0.8,
            bear_drift: -1.0,
            bear_vol: 1.5,
        }
    }
}

/// Fixed constants of every model
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConstants {
    pub jump: JumpConstants,
    pub heston: HestonConstants,
    pub garch: GarchConstants,
    pub stable: StableConstants,
    pub regime: RegimeConstants,
}

impl ModelConstants {
    fn validate(&self) -> Result<()> {
        let probability = |name: &str, p: f64| {
            if (0.0..=1.0).contains(&p) {
                Ok(())
            } else {
                Err(SimulationError::InvalidConfiguration(format!(
                    "{} must lie in [0, 1], got {}",
                    name, p
                )))
            }
        };
        probability("regime.p_bull", self.regime.p_bull)?;
        probability("regime.p_bear", self.regime.p_bear)?;

        if !(-1.0..=1.0).contains(&self.heston.rho) {
            return Err(SimulationError::InvalidConfiguration(format!(
                "heston.rho must lie in [-1, 1], got {}",
                self.heston.rho
            )));
        }
        if !(self.heston.variance_floor > 0.0) {
            return Err(SimulationError::InvalidConfiguration(
                "heston.variance_floor must be positive".to_string(),
            ));
        }
        if self.jump.intensity < 0.0 || self.jump.std_dev < 0.0 {
            return Err(SimulationError::InvalidConfiguration(
                "jump intensity and std_dev must be non-negative".to_string(),
            ));
        }
        if self.garch.omega < 0.0 || self.garch.alpha < 0.0 || self.garch.beta < 0.0 {
            return Err(SimulationError::InvalidConfiguration(
                "garch coefficients must be non-negative".to_string(),
            ));
        }
        crate::random::StableLevy::new(self.stable.alpha, self.stable.beta)?;
        Ok(())
    }
}

pub const DEFAULT_BATCH_SIZE: usize = 5000;
pub const DEFAULT_SAMPLE_PATHS: usize = 10;
pub const DEFAULT_PERCENTILES: [f64; 9] = [5.0, 10.0, 25.0, 40.0, 50.0, 60.0, 75.0, 90.0, 95.0];

/// One simulation request
///
/// # Example
/// ```
/// use price_forecast::config::{ModelVariant, SimulationConfig};
///
/// let config = SimulationConfig::new(ModelVariant::Heston, 30, 10_000).with_seed(7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub model: ModelSelection,
    pub holding_days: usize,
    pub simulation_count: usize,
    /// Overrides the last historical close as the starting price
    #[serde(default)]
    pub start_price: Option<f64>,
    /// Fixed seed for reproducible runs; entropy-seeded when absent
    #[serde(default)]
    pub seed: Option<u64>,
    /// Trials per batch; bounds peak memory of one batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Number of leading trials whose full paths are returned
    #[serde(default = "default_sample_paths")]
    pub sample_paths: usize,
    /// Final-price percentile levels, in percent
    #[serde(default = "default_percentiles")]
    pub percentile_levels: Vec<f64>,
    /// Calibrate on the most recent N closes only
    #[serde(default)]
    pub lookback: Option<usize>,
    /// Run batches on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    #[serde(default)]
    pub unknown_model: UnknownModelPolicy,
    #[serde(default)]
    pub constants: ModelConstants,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_sample_paths() -> usize {
    DEFAULT_SAMPLE_PATHS
}

fn default_percentiles() -> Vec<f64> {
    DEFAULT_PERCENTILES.to_vec()
}

fn default_parallel() -> bool {
    true
}

impl SimulationConfig {
    pub fn new(model: impl Into<ModelSelection>, holding_days: usize, simulation_count: usize) -> Self {
        Self {
            model: model.into(),
            holding_days,
            simulation_count,
            start_price: None,
            seed: None,
            batch_size: DEFAULT_BATCH_SIZE,
            sample_paths: DEFAULT_SAMPLE_PATHS,
            percentile_levels: default_percentiles(),
            lookback: None,
            parallel: true,
            unknown_model: UnknownModelPolicy::default(),
            constants: ModelConstants::default(),
        }
    }

    /// Config for a model given by name; unknown names are kept as
    /// [`ModelSelection::Unrecognized`]
    pub fn for_model_name(name: &str, holding_days: usize, simulation_count: usize) -> Self {
        Self::new(ModelSelection::parse(name), holding_days, simulation_count)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_start_price(mut self, start_price: f64) -> Self {
        self.start_price = Some(start_price);
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_unknown_model(mut self, policy: UnknownModelPolicy) -> Self {
        self.unknown_model = policy;
        self
    }

    /// Checks every hard precondition that does not depend on the data
    pub fn validate(&self) -> Result<()> {
        if self.holding_days == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "holding_days must be positive".to_string(),
            ));
        }
        if self.simulation_count == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "simulation_count must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(SimulationError::InvalidConfiguration(
                "batch_size must be positive".to_string(),
            ));
        }
        if let Some(price) = self.start_price {
            if !(price.is_finite() && price > 0.0) {
                return Err(SimulationError::InvalidConfiguration(format!(
                    "start_price must be positive and finite, got {}",
                    price
                )));
            }
        }
        if let Some(level) = self
            .percentile_levels
            .iter()
            .find(|l| !(0.0..=100.0).contains(*l))
        {
            return Err(SimulationError::InvalidConfiguration(format!(
                "percentile level {} outside [0, 100]",
                level
            )));
        }
        if let (ModelSelection::Unrecognized(name), UnknownModelPolicy::Reject) =
            (&self.model, self.unknown_model)
        {
            return Err(SimulationError::UnrecognizedModel(name.clone()));
        }
        self.constants.validate()
    }
}
