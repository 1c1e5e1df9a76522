// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Time Dilation Simulation Suite - Monte Carlo Sweep

//! N seeded runs of one parameter set, aggregated into mean ± 95% CI.
//!
//! Run `i` uses seed `base_seed + i`, so a sweep is reproducible from its
//! base seed alone.

use serde::Serialize;
use tracing::debug;

use crate::params::SimulationParameters;
use crate::simulation::{DualRateSimulator, SimulationError};
use crate::types::SimulationResult;

// ─── Statistics ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stats {
    pub mean: f64,
    pub std_dev: f64,
    pub ci_lower: f64,
    pub ci_upper: f64,
    pub min: f64,
    pub max: f64,
    pub n: usize,
}

/// z-score of a two-sided 95% interval.
const Z_95: f64 = 1.96;

impl Stats {
    pub fn from_samples(samples: &[f64]) -> Self {
        Self::from_values(samples.iter().copied())
    }

    /// Single pass (Welford) over the samples: sample std-dev, 95% CI of
    /// the mean, extremes. All zeros for an empty input.
    pub fn from_values<I: IntoIterator<Item = f64>>(samples: I) -> Self {
        let mut n = 0usize;
        let mut mean = 0.0;
        let mut m2 = 0.0;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for x in samples {
            n += 1;
            let delta = x - mean;
            mean += delta / n as f64;
            m2 += delta * (x - mean);
            min = min.min(x);
            max = max.max(x);
        }
        if n == 0 {
            return Self { mean: 0.0, std_dev: 0.0, ci_lower: 0.0, ci_upper: 0.0, min: 0.0, max: 0.0, n };
        }

        let std_dev = if n > 1 { (m2 / (n - 1) as f64).sqrt() } else { 0.0 };
        let half_width = Z_95 * std_dev / (n as f64).sqrt();
        Self {
            mean,
            std_dev,
            ci_lower: mean - half_width,
            ci_upper: mean + half_width,
            min,
            max,
            n,
        }
    }

    pub fn half_width(&self) -> f64 {
        (self.ci_upper - self.ci_lower) / 2.0
    }
}

// ─── Sweep Report ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct SweepReport {
    pub parameters: SimulationParameters,
    pub base_seed: u64,
    pub n_runs: usize,
    pub flat_accumulated: Stats,
    pub dilated_accumulated: Stats,
    /// Finite ratios only; see `infinite_ratio_count`.
    pub performance_ratio: Stats,
    pub infinite_ratio_count: usize,
    /// Share of runs where the dilated zone out-accumulated the flat zone.
    pub dilated_win_rate: f64,
    pub individual_runs: Vec<SimulationResult>,
}

/// Run the stock simulator once per seed and aggregate.
pub fn run_sweep(
    params: &SimulationParameters,
    n_runs: usize,
    base_seed: u64,
) -> Result<SweepReport, SimulationError> {
    params.validate()?;
    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed.wrapping_add(i as u64);
        results.push(run_single(params, seed)?);
    }
    Ok(aggregate(params, base_seed, results))
}

/// One run with `seed` overriding whatever `params` carries.
pub fn run_single(params: &SimulationParameters, seed: u64) -> Result<SimulationResult, SimulationError> {
    let mut sim = DualRateSimulator::new(params.clone().with_seed(Some(seed)))?;
    let result = sim.run(None)?;
    debug!(seed, ratio = result.performance_ratio_vs_flat(), "sweep run");
    Ok(result)
}

/// Aggregate individual runs into a [`SweepReport`].
pub fn aggregate(params: &SimulationParameters, base_seed: u64, results: Vec<SimulationResult>) -> SweepReport {
    let n = results.len();

    let flat_accumulated = Stats::from_values(results.iter().map(|r| r.flat.accumulated_computation));
    let dilated_accumulated =
        Stats::from_values(results.iter().map(|r| r.dilated.zone.accumulated_computation));
    let performance_ratio = Stats::from_values(
        results.iter()
            .map(|r| r.performance_ratio_vs_flat())
            .filter(|r| r.is_finite()),
    );
    let infinite_ratio_count = n - performance_ratio.n;

    let wins = results.iter()
        .filter(|r| r.dilated.zone.accumulated_computation > r.flat.accumulated_computation)
        .count();
    let dilated_win_rate = if n > 0 { wins as f64 / n as f64 } else { 0.0 };

    SweepReport {
        parameters: params.clone(),
        base_seed,
        n_runs: n,
        flat_accumulated,
        dilated_accumulated,
        performance_ratio,
        infinite_ratio_count,
        dilated_win_rate,
        individual_runs: results,
    }
}
