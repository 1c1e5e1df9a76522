// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Time Dilation Simulation Suite - Simulation Core

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::StandardNormal;
use tracing::{debug, info, trace};

use crate::params::{ConfigError, SimulationParameters};
use crate::stats::{PatternSummary, StepStatistic};
use crate::transform::{DecayNoiseTransform, PropagationTransform, TransformError};
use crate::types::*;

/// Distance covered by one flat step, and by one full external step of the
/// dilated zone.
pub const FLAT_DISTANCE: f64 = 1.0;

const INITIAL_SCALE: f64 = 0.3;
const INITIAL_OFFSET: f64 = 0.5;

// ─── Errors ─────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Transform failure, passed through as-is.
    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error("initial pattern has {actual} elements, expected {expected}")]
    PatternLength { expected: usize, actual: usize },

    #[error("transform returned {actual} elements in the {zone:?} zone, expected {expected}")]
    TransformLength {
        zone: Zone,
        expected: usize,
        actual: usize,
    },
}

// ─── Step observation ───────────────────────────────────────────────────────

/// Receives one [`StepRecord`] per transform invocation, in call order.
pub trait StepObserver {
    fn on_step(&mut self, record: &StepRecord);
}

impl<F: FnMut(&StepRecord)> StepObserver for F {
    fn on_step(&mut self, record: &StepRecord) {
        self(record)
    }
}

// ─── DualRateSimulator ──────────────────────────────────────────────────────

/// Drives the flat and dilated zones over the same initial pattern.
///
/// The simulator owns its generator: the seed is applied once at
/// construction and every [`generate_initial_pattern`](Self::generate_initial_pattern)
/// call advances it. Instances never share random state.
pub struct DualRateSimulator<T: PropagationTransform = DecayNoiseTransform> {
    params: SimulationParameters,
    seed: u64,
    rng: ChaCha8Rng,
    transform: T,
}

impl DualRateSimulator<DecayNoiseTransform> {
    /// Build with the stock [`DecayNoiseTransform`], seeded from the same
    /// seed as the pattern generator (on its own stream).
    pub fn new(params: SimulationParameters) -> Result<Self, ConfigError> {
        params.validate()?;
        let seed = resolve_seed(params.seed);
        let transform = DecayNoiseTransform::from_seed(params.transform, seed);
        Ok(Self::assemble(params, seed, transform))
    }
}

impl<T: PropagationTransform> DualRateSimulator<T> {
    /// Build around a caller-supplied transform. `params.transform` is not
    /// consulted; the caller configured `transform` already.
    pub fn with_transform(params: SimulationParameters, transform: T) -> Result<Self, ConfigError> {
        params.validate()?;
        let seed = resolve_seed(params.seed);
        Ok(Self::assemble(params, seed, transform))
    }

    fn assemble(params: SimulationParameters, seed: u64, transform: T) -> Self {
        Self {
            params,
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
            transform,
        }
    }

    pub fn params(&self) -> &SimulationParameters {
        &self.params
    }

    /// The seed actually in use (drawn from entropy if none was given).
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn transform(&self) -> &T {
        &self.transform
    }

    pub fn into_transform(self) -> T {
        self.transform
    }

    /// `N(0, 1) · 0.3 + 0.5` per cell.
    pub fn generate_initial_pattern(&mut self) -> Pattern {
        (0..self.params.pattern_size)
            .map(|_| self.rng.sample::<f64, _>(StandardNormal) * INITIAL_SCALE + INITIAL_OFFSET)
            .collect()
    }

    pub fn run(&mut self, initial_pattern: Option<&[f64]>) -> Result<SimulationResult, SimulationError> {
        self.run_observed(initial_pattern, &mut |_: &StepRecord| {})
    }

    /// Same as [`run`](Self::run), reporting every invocation to `observer`.
    pub fn run_observed<O: StepObserver>(
        &mut self,
        initial_pattern: Option<&[f64]>,
        observer: &mut O,
    ) -> Result<SimulationResult, SimulationError> {
        let initial: Pattern = match initial_pattern {
            Some(p) => {
                if p.len() != self.params.pattern_size {
                    return Err(SimulationError::PatternLength {
                        expected: self.params.pattern_size,
                        actual: p.len(),
                    });
                }
                p.to_vec()
            }
            None => self.generate_initial_pattern(),
        };

        info!(
            seed = self.seed,
            pattern_size = self.params.pattern_size,
            external_steps = self.params.num_external_steps,
            dilation_factor = self.params.dilation_factor,
            "starting dual-rate run"
        );

        let summary = PatternSummary::of(&initial);

        let flat = self.run_zone(Zone::Flat, &initial, observer)?;
        let dilated = self.run_zone(Zone::Dilated, &initial, observer)?;

        let ratio = performance_ratio(dilated.accumulated_computation, flat.accumulated_computation);
        info!(
            flat = flat.accumulated_computation,
            dilated = dilated.accumulated_computation,
            ratio,
            "run complete"
        );

        Ok(SimulationResult {
            seed: self.seed,
            initial_mean_abs: summary.mean_abs,
            initial_variance: summary.variance,
            flat,
            dilated: DilatedZoneResult {
                zone: dilated,
                performance_ratio_vs_flat: ratio,
            },
        })
    }

    /// One zone over its own copy of `initial`. The flat zone is a dilated
    /// zone with one inner step at full distance.
    fn run_zone<O: StepObserver>(
        &mut self,
        zone: Zone,
        initial: &[f64],
        observer: &mut O,
    ) -> Result<ZoneResult, SimulationError> {
        let (inner_steps, distance, position_ratio) = match zone {
            Zone::Flat => (1, FLAT_DISTANCE, self.params.flat_position_ratio),
            Zone::Dilated => (
                self.params.dilation_factor,
                FLAT_DISTANCE / self.params.dilation_factor as f64,
                self.params.dilated_position_ratio,
            ),
        };

        let expected = initial.len();
        let mut pattern = initial.to_vec();
        let mut accumulated = 0.0;
        let mut invocations = 0;

        for external_step in 0..self.params.num_external_steps {
            for inner_step in 0..inner_steps {
                let next = self.transform.propagate(&pattern, distance, position_ratio)?;
                if next.len() != expected {
                    return Err(SimulationError::TransformLength {
                        zone,
                        expected,
                        actual: next.len(),
                    });
                }
                pattern = next;

                let stat = StepStatistic::of(&pattern);
                accumulated += stat.value();
                invocations += 1;

                let record = StepRecord {
                    zone,
                    external_step,
                    inner_step,
                    mean_abs: stat.mean_abs,
                    structure_bonus: stat.structure_bonus,
                    accumulated,
                };
                trace!(zone = zone.label(), external_step, inner_step, accumulated, "step");
                observer.on_step(&record);
            }
        }

        debug!(zone = zone.label(), invocations, accumulated, "zone complete");
        Ok(ZoneResult::new(&pattern, accumulated, invocations))
    }
}

fn resolve_seed(seed: Option<u64>) -> u64 {
    seed.unwrap_or_else(|| ChaCha8Rng::from_entropy().gen())
}
