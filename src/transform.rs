// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Time Dilation Simulation Suite - Propagation Transform

//! The propagation step applied to a pattern on every simulator invocation.
//!
//! The simulator only depends on [`PropagationTransform`]; any type that maps
//! `(pattern, distance, position_ratio)` to a new pattern of the same length
//! can drive a run. [`DecayNoiseTransform`] is the stock implementation used
//! when no other transform is injected.

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};

use crate::params::TransformConfig;

/// ChaCha stream reserved for transform noise, so it never overlaps the
/// simulator's pattern draws under the same seed.
pub const TRANSFORM_STREAM: u64 = 1;

/// Standard deviation of injected noise for a unit distance.
pub const NOISE_SCALE: f64 = 0.01;

/// Output values are clipped into `[-CLIP_BOUND, CLIP_BOUND]`.
pub const CLIP_BOUND: f64 = 1.0;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransformError {
    #[error("pattern element {index} is not finite")]
    NonFinite { index: usize },

    #[error("cannot build noise distribution: {0}")]
    InvalidNoise(String),
}

// ---------------------------------------------------------------------------
// Trait
// ---------------------------------------------------------------------------

/// One propagation step: `pattern -> pattern'`, same length as the input.
///
/// Implementations may hold their own random state; they are called in a
/// fixed order by the simulator so seeded state stays reproducible.
pub trait PropagationTransform {
    fn propagate(
        &mut self,
        pattern: &[f64],
        distance: f64,
        position_ratio: f64,
    ) -> Result<Vec<f64>, TransformError>;
}

impl<T: PropagationTransform + ?Sized> PropagationTransform for &mut T {
    fn propagate(
        &mut self,
        pattern: &[f64],
        distance: f64,
        position_ratio: f64,
    ) -> Result<Vec<f64>, TransformError> {
        (**self).propagate(pattern, distance, position_ratio)
    }
}

impl<T: PropagationTransform + ?Sized> PropagationTransform for Box<T> {
    fn propagate(
        &mut self,
        pattern: &[f64],
        distance: f64,
        position_ratio: f64,
    ) -> Result<Vec<f64>, TransformError> {
        (**self).propagate(pattern, distance, position_ratio)
    }
}

// ---------------------------------------------------------------------------
// DecayNoiseTransform
// ---------------------------------------------------------------------------

/// Damped, noisy propagation.
///
/// Each call computes
///
/// ```text
/// δ      = |position_ratio| ^ scale_factor
/// decay  = exp(-distance · δ) · (1 + axion_mass · sin(phase))
/// out_i  = clamp(p_i · decay + N(0, NOISE_SCALE · √distance), -1, 1)
/// ```
///
/// and then advances `phase` by `2π · distance`. Lower position ratios give
/// a smaller deviation and therefore slower decay.
#[derive(Debug, Clone)]
pub struct DecayNoiseTransform {
    config: TransformConfig,
    rng: ChaCha8Rng,
    phase: f64,
}

impl DecayNoiseTransform {
    pub fn new(config: TransformConfig, rng: ChaCha8Rng) -> Self {
        Self {
            config,
            rng,
            phase: 0.0,
        }
    }

    /// Seed the noise generator on [`TRANSFORM_STREAM`].
    pub fn from_seed(config: TransformConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(TRANSFORM_STREAM);
        Self::new(config, rng)
    }

    pub fn config(&self) -> &TransformConfig {
        &self.config
    }

    pub fn phase(&self) -> f64 {
        self.phase
    }

    pub fn deviation(&self, position_ratio: f64) -> f64 {
        position_ratio.abs().powf(self.config.scale_factor)
    }

    /// Multiplicative decay at the current phase.
    pub fn decay_factor(&self, distance: f64, position_ratio: f64) -> f64 {
        let modulation = 1.0 + self.config.axion_mass * self.phase.sin();
        (-distance * self.deviation(position_ratio)).exp() * modulation
    }
}

impl PropagationTransform for DecayNoiseTransform {
    fn propagate(
        &mut self,
        pattern: &[f64],
        distance: f64,
        position_ratio: f64,
    ) -> Result<Vec<f64>, TransformError> {
        if let Some(index) = pattern.iter().position(|x| !x.is_finite()) {
            return Err(TransformError::NonFinite { index });
        }
        if !distance.is_finite() {
            return Err(TransformError::InvalidNoise(format!(
                "distance {} is not finite",
                distance
            )));
        }

        let noise = Normal::new(0.0, NOISE_SCALE * distance.abs().sqrt())
            .map_err(|e| TransformError::InvalidNoise(e.to_string()))?;
        let decay = self.decay_factor(distance, position_ratio);

        let out = pattern
            .iter()
            .map(|&x| (x * decay + noise.sample(&mut self.rng)).clamp(-CLIP_BOUND, CLIP_BOUND))
            .collect();

        self.phase = (self.phase + std::f64::consts::TAU * distance) % std::f64::consts::TAU;
        Ok(out)
    }
}
