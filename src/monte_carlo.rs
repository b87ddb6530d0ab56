//! Monte Carlo path ensembles
//!
//! Runs many independent trials of one process model and reduces them to a
//! [`SimulationResult`]:
//! - Trials are split into batches of at most `batch_size`
//! - Each batch owns an RNG stream seeded from the master generator
//! - Batches run on the rayon pool (or sequentially, with identical output)
//! - Memoryless models are stepped across the whole batch one day at a
//!   time; stateful models are simulated one full path at a time

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::bootstrap::HistoricalBootstrap;
use crate::brownian::BrownianMotion;
use crate::config::{ModelConstants, ModelSelection, ModelVariant, SimulationConfig};
use crate::error::{Result, SimulationError};
use crate::garch::Garch11;
use crate::gbm::GeometricBrownianMotion;
use crate::heston::HestonModel;
use crate::jump_diffusion::MertonJumpDiffusion;
use crate::process::{FlatProcess, PriceProcess};
use crate::random::{master_rng, stream_seeds};
use crate::regime_switching::{RegimeDynamics, RegimeSwitching};
use crate::returns::{calibrate, Calibration, HistoricalSeries, MIN_OBSERVATIONS};
use crate::stable_levy::StableLevyProcess;
use crate::statistics::{summarize, SimulationResult};

/// Shape of one ensemble run
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub trials: usize,
    pub holding_days: usize,
    pub start_price: f64,
    pub batch_size: usize,
    /// Number of leading trials whose full paths are kept
    pub sample_paths: usize,
    pub parallel: bool,
}

impl RunPlan {
    pub fn from_config(config: &SimulationConfig, start_price: f64) -> Self {
        Self {
            trials: config.simulation_count,
            holding_days: config.holding_days,
            start_price,
            batch_size: config.batch_size.max(1),
            sample_paths: config.sample_paths,
            parallel: config.parallel,
        }
    }

    /// Half-open trial ranges, one per batch; a zero batch size counts as one
    fn batches(&self) -> Vec<(usize, usize)> {
        let size = self.batch_size.max(1);
        (0..self.trials)
            .step_by(size)
            .map(|start| (start, (start + size).min(self.trials)))
            .collect()
    }
}

/// Raw output of an ensemble, in trial order
#[derive(Debug, Clone, PartialEq)]
pub struct Ensemble {
    pub final_prices: Vec<f64>,
    /// `final_price / start_price - 1` per trial
    pub final_returns: Vec<f64>,
    pub sample_paths: Vec<Vec<f64>>,
}

struct BatchOutcome {
    final_prices: Vec<f64>,
    sample_paths: Vec<Vec<f64>>,
}

/// Runs `plan.trials` independent trials of `process`
///
/// Per-batch seeds are drawn from `master` before any batch runs, so the
/// output depends only on the master state, never on thread scheduling.
pub fn run_ensemble<P: PriceProcess, R: Rng + ?Sized>(
    process: &P,
    plan: &RunPlan,
    master: &mut R,
) -> Ensemble {
    let batches = plan.batches();
    let seeds = stream_seeds(master, batches.len());

    let run = |(&(start, end), &seed): (&(usize, usize), &u64)| {
        let mut rng = StdRng::seed_from_u64(seed);
        debug!(start, end, "simulating batch");
        simulate_batch(process, plan, start, end, &mut rng)
    };

    let outcomes: Vec<BatchOutcome> = if plan.parallel {
        batches.par_iter().zip(seeds.par_iter()).map(run).collect()
    } else {
        batches.iter().zip(seeds.iter()).map(run).collect()
    };

    let mut final_prices = Vec::with_capacity(plan.trials);
    let mut sample_paths = Vec::with_capacity(plan.sample_paths.min(plan.trials));
    for outcome in outcomes {
        final_prices.extend(outcome.final_prices);
        sample_paths.extend(outcome.sample_paths);
    }

    let final_returns = final_prices
        .iter()
        .map(|p| p / plan.start_price - 1.0)
        .collect();

    Ensemble {
        final_prices,
        final_returns,
        sample_paths,
    }
}

fn simulate_batch<P: PriceProcess>(
    process: &P,
    plan: &RunPlan,
    start: usize,
    end: usize,
    rng: &mut StdRng,
) -> BatchOutcome {
    let n = end - start;
    // Trials of this batch that fall inside the global sample prefix
    let keep = plan.sample_paths.saturating_sub(start).min(n);

    if P::MEMORYLESS {
        simulate_step_major(process, plan, n, keep, rng)
    } else {
        simulate_path_major(process, plan, n, keep, rng)
    }
}

/// Advances every trial of the batch by one day before moving to the next
fn simulate_step_major<P: PriceProcess>(
    process: &P,
    plan: &RunPlan,
    n: usize,
    keep: usize,
    rng: &mut StdRng,
) -> BatchOutcome {
    let mut prices = vec![plan.start_price; n];
    let mut states: Vec<P::State> = (0..n).map(|_| process.initial_state(rng)).collect();
    let mut sample_paths: Vec<Vec<f64>> = (0..keep)
        .map(|_| {
            let mut path = Vec::with_capacity(plan.holding_days + 1);
            path.push(plan.start_price);
            path
        })
        .collect();

    for _ in 0..plan.holding_days {
        for (i, (price, state)) in prices.iter_mut().zip(states.iter_mut()).enumerate() {
            *price = process.next_price(rng, *price, state);
            if i < keep {
                sample_paths[i].push(*price);
            }
        }
    }

    BatchOutcome {
        final_prices: prices,
        sample_paths,
    }
}

/// Simulates each trial's full path before starting the next
fn simulate_path_major<P: PriceProcess>(
    process: &P,
    plan: &RunPlan,
    n: usize,
    keep: usize,
    rng: &mut StdRng,
) -> BatchOutcome {
    let mut final_prices = Vec::with_capacity(n);
    let mut sample_paths = Vec::with_capacity(keep);

    for i in 0..n {
        if i < keep {
            let path = process.generate_path(rng, plan.start_price, plan.holding_days);
            final_prices.push(path[plan.holding_days]);
            sample_paths.push(path);
        } else {
            let mut state = process.initial_state(rng);
            let mut price = plan.start_price;
            for _ in 0..plan.holding_days {
                price = process.next_price(rng, price, &mut state);
            }
            final_prices.push(price);
        }
    }

    BatchOutcome {
        final_prices,
        sample_paths,
    }
}

/// Runs the selected model and reports the parameters it used
fn run_variant<R: Rng + ?Sized>(
    variant: ModelVariant,
    calibration: &Calibration,
    constants: &ModelConstants,
    plan: &RunPlan,
    master: &mut R,
) -> Result<(Ensemble, BTreeMap<String, f64>)> {
    let mu = calibration.params.mu;
    let sigma = calibration.params.sigma;

    let mut parameters = BTreeMap::new();
    parameters.insert("mu".to_string(), mu);
    parameters.insert("sigma".to_string(), sigma);
    let mut report = |entries: &[(&str, f64)]| {
        for &(name, value) in entries {
            parameters.insert(name.to_string(), value);
        }
    };

    let ensemble = match variant {
        ModelVariant::Gbm => run_ensemble(&GeometricBrownianMotion::new(mu, sigma), plan, master),
        ModelVariant::Brownian => run_ensemble(&BrownianMotion::new(mu, sigma), plan, master),
        ModelVariant::JumpDiffusion => {
            let c = constants.jump;
            report(&[
                ("jump_intensity", c.intensity),
                ("jump_mean", c.mean),
                ("jump_std", c.std_dev),
            ]);
            let model = MertonJumpDiffusion::new(mu, sigma, c.intensity, c.mean, c.std_dev);
            run_ensemble(&model, plan, master)
        }
        ModelVariant::Heston => {
            let c = constants.heston;
            let v0 = sigma * sigma;
            let theta = c.theta.unwrap_or(v0);
            report(&[
                ("kappa", c.kappa),
                ("theta", theta),
                ("vol_of_vol", c.vol_of_vol),
                ("rho", c.rho),
                ("v0", v0),
            ]);
            let model = HestonModel::new(v0, mu, c.kappa, theta, c.vol_of_vol, c.rho, c.variance_floor);
            run_ensemble(&model, plan, master)
        }
        ModelVariant::Garch => {
            let c = constants.garch;
            report(&[("omega", c.omega), ("alpha", c.alpha), ("beta", c.beta)]);
            let model = Garch11::new(mu, sigma * sigma, c.omega, c.alpha, c.beta);
            run_ensemble(&model, plan, master)
        }
        ModelVariant::StableLevy => {
            let c = constants.stable;
            report(&[
                ("alpha", c.alpha),
                ("beta", c.beta),
                ("drift", c.drift),
                ("scale", c.scale),
            ]);
            let model = StableLevyProcess::new(c.drift, c.scale, c.alpha, c.beta)?;
            run_ensemble(&model, plan, master)
        }
        ModelVariant::RegimeSwitching => {
            let c = constants.regime;
            report(&[("p_bull", c.p_bull), ("p_bear", c.p_bear)]);
            let model = RegimeSwitching::new(
                RegimeDynamics {
                    drift: c.bull_drift * mu,
                    volatility: c.bull_vol * sigma,
                },
                RegimeDynamics {
                    drift: c.bear_drift * mu,
                    volatility: c.bear_vol * sigma,
                },
                c.p_bull,
                c.p_bear,
            );
            run_ensemble(&model, plan, master)
        }
        ModelVariant::Bootstrap => {
            report(&[("sample_size", calibration.returns.len() as f64)]);
            let model = HistoricalBootstrap::new(calibration.returns.clone())?;
            run_ensemble(&model, plan, master)
        }
    };

    Ok((ensemble, parameters))
}

/// Simulates the future price distribution of an instrument
///
/// Calibrates μ and σ from `series` (optionally its trailing `lookback`
/// window), runs `simulation_count` trials of the configured model over
/// `holding_days`, and summarises the ensemble.
///
/// Fails before any simulation work when the configuration is invalid or
/// the series holds fewer than 30 usable closes. An unrecognized model
/// yields flat paths held at the start price unless the config's
/// unknown-model policy is `Reject`.
///
/// # Example
/// ```
/// use price_forecast::config::{ModelVariant, SimulationConfig};
/// use price_forecast::monte_carlo::simulate;
/// use price_forecast::returns::HistoricalSeries;
///
/// let closes: Vec<f64> = (0..60).map(|i| 100.0 + (i as f64 * 0.3).sin()).collect();
/// let series = HistoricalSeries::from_closes(&closes);
/// let config = SimulationConfig::new(ModelVariant::Gbm, 10, 500).with_seed(1);
///
/// let result = simulate(&series, &config).unwrap();
/// assert_eq!(result.final_prices.len(), 500);
/// assert!((0.0..=1.0).contains(&result.prob_gain));
/// ```
pub fn simulate(series: &HistoricalSeries, config: &SimulationConfig) -> Result<SimulationResult> {
    config.validate()?;

    let window = match config.lookback {
        Some(n) => series.tail(n),
        None => series.clone(),
    };
    let calibration = calibrate(&window)?;

    let start_price = match config.start_price {
        Some(price) => price,
        None => series
            .last_close()
            .ok_or(SimulationError::InsufficientData {
                required: MIN_OBSERVATIONS,
                actual: 0,
            })?,
    };

    info!(
        model = config.model.name(),
        trials = config.simulation_count,
        holding_days = config.holding_days,
        mu = calibration.params.mu,
        sigma = calibration.params.sigma,
        start_price,
        "starting simulation"
    );

    let plan = RunPlan::from_config(config, start_price);
    let mut master = master_rng(config.seed);

    let (ensemble, parameters) = match &config.model {
        ModelSelection::Variant(variant) => {
            run_variant(*variant, &calibration, &config.constants, &plan, &mut master)?
        }
        ModelSelection::Unrecognized(name) => {
            warn!(model = %name, "unrecognized model, simulating flat paths");
            (run_ensemble(&FlatProcess, &plan, &mut master), BTreeMap::new())
        }
    };

    let summary = summarize(
        &ensemble.final_returns,
        &ensemble.final_prices,
        start_price,
        &config.percentile_levels,
    );

    info!(
        expected_return = summary.expected_return,
        prob_gain = summary.prob_gain,
        var_95 = summary.var_95,
        "simulation finished"
    );

    Ok(SimulationResult {
        model: config.model.name().to_string(),
        parameters,
        start_price,
        holding_days: config.holding_days,
        simulation_count: config.simulation_count,
        expected_return: summary.expected_return,
        std_dev: summary.std_dev,
        prob_gain: summary.prob_gain,
        var_95: summary.var_95,
        var_99: summary.var_99,
        skewness: summary.skewness,
        kurtosis: summary.kurtosis,
        excess_kurtosis: summary.excess_kurtosis,
        log_return_mean: summary.log_return_mean,
        log_return_std: summary.log_return_std,
        final_prices: ensemble.final_prices,
        mean_final_price: summary.mean_final_price,
        price_percentiles: summary.price_percentiles,
        sample_paths: ensemble.sample_paths,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnknownModelPolicy;
    use crate::process::PRICE_FLOOR;

    fn noisy_series(n: usize) -> HistoricalSeries {
        let closes: Vec<f64> = (0..n)
            .map(|i| 100.0 * (1.0 + 0.002 * i as f64) * (1.0 + 0.03 * (i as f64 * 1.7).sin()))
            .collect();
        HistoricalSeries::from_closes(&closes)
    }

    fn plan(trials: usize, batch_size: usize, parallel: bool) -> RunPlan {
        RunPlan {
            trials,
            holding_days: 12,
            start_price: 50.0,
            batch_size,
            sample_paths: 10,
            parallel,
        }
    }

    #[test]
    fn test_batches_cover_all_trials() {
        assert_eq!(plan(12_001, 5000, true).batches(), vec![(0, 5000), (5000, 10_000), (10_000, 12_001)]);
        assert_eq!(plan(3, 5000, true).batches(), vec![(0, 3)]);
    }

    #[test]
    fn test_memoryless_split() {
        assert!(GeometricBrownianMotion::MEMORYLESS);
        assert!(BrownianMotion::MEMORYLESS);
        assert!(MertonJumpDiffusion::MEMORYLESS);
        assert!(StableLevyProcess::MEMORYLESS);
        assert!(HistoricalBootstrap::MEMORYLESS);
        assert!(!HestonModel::MEMORYLESS);
        assert!(!Garch11::MEMORYLESS);
        assert!(!RegimeSwitching::MEMORYLESS);
    }

    #[test]
    fn test_zero_batch_size_runs_single_trial_batches() {
        assert_eq!(plan(3, 0, true).batches(), vec![(0, 1), (1, 2), (2, 3)]);

        let model = GeometricBrownianMotion::new(0.0, 0.02);
        let ensemble = run_ensemble(&model, &plan(5, 0, false), &mut master_rng(Some(4)));
        assert_eq!(ensemble.final_prices.len(), 5);
        assert_eq!(ensemble.sample_paths.len(), 5);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let model = GeometricBrownianMotion::new(0.001, 0.02);
        let parallel = run_ensemble(&model, &plan(2500, 300, true), &mut master_rng(Some(9)));
        let sequential = run_ensemble(&model, &plan(2500, 300, false), &mut master_rng(Some(9)));
        assert_eq!(parallel, sequential);

        let heston = HestonModel::new(4e-4, 0.0, 2.0, 4e-4, 0.3, -0.7, 1e-4);
        let parallel = run_ensemble(&heston, &plan(700, 64, true), &mut master_rng(Some(9)));
        let sequential = run_ensemble(&heston, &plan(700, 64, false), &mut master_rng(Some(9)));
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn test_sample_paths_span_small_batches() {
        let model = GeometricBrownianMotion::new(0.0, 0.02);
        let ensemble = run_ensemble(&model, &plan(40, 3, true), &mut master_rng(Some(1)));

        assert_eq!(ensemble.final_prices.len(), 40);
        assert_eq!(ensemble.sample_paths.len(), 10);
        for (i, path) in ensemble.sample_paths.iter().enumerate() {
            assert_eq!(path.len(), 13);
            assert_eq!(path[0], 50.0);
            assert_eq!(path[12], ensemble.final_prices[i]);
        }
    }

    #[test]
    fn test_sample_paths_match_final_prices_for_stateful_models() {
        let model = Garch11::new(0.0, 4e-4, 1e-5, 0.1, 0.85);
        let ensemble = run_ensemble(&model, &plan(25, 4, false), &mut master_rng(Some(2)));

        assert_eq!(ensemble.sample_paths.len(), 10);
        for (i, path) in ensemble.sample_paths.iter().enumerate() {
            assert_eq!(path[12], ensemble.final_prices[i]);
        }
    }

    #[test]
    fn test_final_returns_follow_prices() {
        let model = BrownianMotion::new(0.0, 0.01);
        let ensemble = run_ensemble(&model, &plan(100, 30, true), &mut master_rng(Some(3)));
        for (r, p) in ensemble.final_returns.iter().zip(&ensemble.final_prices) {
            assert!((r - (p / 50.0 - 1.0)).abs() < 1e-15);
        }
    }

    #[test]
    fn test_every_model_respects_path_invariants() {
        let series = noisy_series(120);
        for variant in ModelVariant::ALL {
            let config = SimulationConfig::new(variant, 15, 300).with_seed(5);
            let result = simulate(&series, &config).unwrap();

            assert_eq!(result.model, variant.name());
            assert_eq!(result.final_prices.len(), 300);
            assert_eq!(result.sample_paths.len(), 10);
            assert!((0.0..=1.0).contains(&result.prob_gain));
            assert!(result.var_99 <= result.var_95);
            for path in &result.sample_paths {
                assert_eq!(path.len(), 16);
                assert_eq!(path[0], result.start_price);
                assert!(path.iter().all(|&p| p >= PRICE_FLOOR), "{}", variant);
            }
            assert!(result.final_prices.iter().all(|&p| p >= PRICE_FLOOR && p.is_finite()));
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let series = noisy_series(80);
        for variant in ModelVariant::ALL {
            let config = SimulationConfig::new(variant, 10, 200).with_seed(77);
            let first = simulate(&series, &config).unwrap();
            let second = simulate(&series, &config).unwrap();
            assert_eq!(first, second, "{}", variant);
        }
    }

    #[test]
    fn test_unknown_model_flat_fallback() {
        let series = noisy_series(40);
        let config = SimulationConfig::for_model_name("gmb", 5, 1).with_seed(1);
        let result = simulate(&series, &config).unwrap();

        let start = series.last_close().unwrap();
        assert_eq!(result.model, "gmb");
        assert_eq!(result.sample_paths, vec![vec![start; 6]]);
        assert_eq!(result.expected_return, 0.0);
        assert_eq!(result.prob_gain, 0.0);
        assert!(result.parameters.is_empty());
    }

    #[test]
    fn test_unknown_model_rejected_under_strict_policy() {
        let series = noisy_series(40);
        let config = SimulationConfig::for_model_name("gmb", 5, 1)
            .with_unknown_model(UnknownModelPolicy::Reject);
        assert_eq!(
            simulate(&series, &config),
            Err(SimulationError::UnrecognizedModel("gmb".to_string()))
        );
    }

    #[test]
    fn test_lookback_window_gates_data() {
        let series = noisy_series(300);
        let mut config = SimulationConfig::new(ModelVariant::Gbm, 5, 10).with_seed(1);

        config.lookback = Some(20);
        assert!(matches!(
            simulate(&series, &config),
            Err(SimulationError::InsufficientData { required: 30, actual: 20 })
        ));

        config.lookback = Some(252);
        let windowed = simulate(&series, &config).unwrap();
        config.lookback = None;
        let full = simulate(&series, &config).unwrap();
        assert_ne!(windowed.parameters["mu"], full.parameters["mu"]);
    }

    #[test]
    fn test_start_price_override() {
        let series = noisy_series(60);
        let config = SimulationConfig::new(ModelVariant::Garch, 5, 50)
            .with_seed(4)
            .with_start_price(1234.5);
        let result = simulate(&series, &config).unwrap();

        assert_eq!(result.start_price, 1234.5);
        assert!(result.sample_paths.iter().all(|p| p[0] == 1234.5));
    }

    #[test]
    fn test_reports_model_parameters() {
        let series = noisy_series(60);
        let config = SimulationConfig::new(ModelVariant::Heston, 5, 20).with_seed(4);
        let result = simulate(&series, &config).unwrap();

        for key in ["mu", "sigma", "kappa", "theta", "vol_of_vol", "rho", "v0"] {
            assert!(result.parameters.contains_key(key), "missing {}", key);
        }
        let sigma = result.parameters["sigma"];
        assert!((result.parameters["theta"] - sigma * sigma).abs() < 1e-15);
    }

    #[test]
    fn test_invalid_config_fails_before_calibration() {
        let short = noisy_series(5);
        let config = SimulationConfig::new(ModelVariant::Gbm, 0, 10);
        assert!(matches!(
            simulate(&short, &config),
            Err(SimulationError::InvalidConfiguration(_))
        ));
    }
}
