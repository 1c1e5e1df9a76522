// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Time Dilation Simulation Suite - Simulation Parameters

//! Immutable configuration for a dual-rate run.
//!
//! [`SimulationParameters`] carries the loop shape (pattern size, external
//! steps, dilation factor), the position ratio handed to the transform in
//! each zone, and the [`TransformConfig`] forwarded once to the transform at
//! construction.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Raised at construction when a loop dimension is zero.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid configuration: pattern_size must be at least 1")]
    ZeroPatternSize,

    #[error("invalid configuration: num_external_steps must be at least 1")]
    ZeroExternalSteps,

    #[error("invalid configuration: dilation_factor must be at least 1")]
    ZeroDilationFactor,

    #[error("unknown preset `{0}`")]
    UnknownPreset(String),
}

// ---------------------------------------------------------------------------
// TransformConfig
// ---------------------------------------------------------------------------

/// Strength/amplitude parameters passed through to the transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Exponent applied to the position ratio when computing deviation.
    pub scale_factor: f64,
    /// Amplitude of the oscillatory decay modulation.
    pub axion_mass: f64,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            scale_factor: 4.0,
            axion_mass: 0.05,
        }
    }
}

// ---------------------------------------------------------------------------
// SimulationParameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub pattern_size: usize,
    pub num_external_steps: usize,
    /// Inner transform calls per external step in the dilated zone.
    pub dilation_factor: usize,
    pub flat_position_ratio: f64,
    pub dilated_position_ratio: f64,
    pub transform: TransformConfig,
    /// `None` draws a fresh seed from OS entropy at construction.
    pub seed: Option<u64>,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            pattern_size: 200,
            num_external_steps: 20,
            dilation_factor: 10,
            flat_position_ratio: 0.5,
            dilated_position_ratio: 0.2,
            transform: TransformConfig::default(),
            seed: Some(42),
        }
    }
}

impl SimulationParameters {
    pub fn with_pattern_size(mut self, pattern_size: usize) -> Self {
        self.pattern_size = pattern_size;
        self
    }

    pub fn with_external_steps(mut self, steps: usize) -> Self {
        self.num_external_steps = steps;
        self
    }

    pub fn with_dilation_factor(mut self, factor: usize) -> Self {
        self.dilation_factor = factor;
        self
    }

    pub fn with_position_ratios(mut self, flat: f64, dilated: f64) -> Self {
        self.flat_position_ratio = flat;
        self.dilated_position_ratio = dilated;
        self
    }

    pub fn with_transform(mut self, transform: TransformConfig) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Reject zero loop dimensions. Ratios and transform strengths are
    /// accepted as given; the transform decides how to interpret them.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pattern_size == 0 {
            return Err(ConfigError::ZeroPatternSize);
        }
        if self.num_external_steps == 0 {
            return Err(ConfigError::ZeroExternalSteps);
        }
        if self.dilation_factor == 0 {
            return Err(ConfigError::ZeroDilationFactor);
        }
        Ok(())
    }

    /// Transform calls made by one run: `N` flat plus `N × dilation` dilated.
    pub fn total_invocations(&self) -> usize {
        self.num_external_steps * (1 + self.dilation_factor)
    }

    /// Distance handed to each inner step so a full external step in the
    /// dilated zone covers the same distance (1.0) as one flat step.
    pub fn dilated_distance(&self) -> f64 {
        1.0 / self.dilation_factor as f64
    }
}

// ---------------------------------------------------------------------------
// Presets
// ---------------------------------------------------------------------------

/// Named parameter sets for quick comparison runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Preset {
    Baseline,
    DeepDilation,
    Inverted,
    LongHorizon,
    Wide,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Baseline,
        Preset::DeepDilation,
        Preset::Inverted,
        Preset::LongHorizon,
        Preset::Wide,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Baseline => "baseline",
            Self::DeepDilation => "deep-dilation",
            Self::Inverted => "inverted",
            Self::LongHorizon => "long-horizon",
            Self::Wide => "wide",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Baseline => "Default shape: 200 cells, 20 steps, 10x dilation, ratios 0.5/0.2",
            Self::DeepDilation => "50 inner steps per external step",
            Self::Inverted => "Dilated zone runs at the higher position ratio (0.2/0.5)",
            Self::LongHorizon => "100 external steps",
            Self::Wide => "1000-cell pattern",
        }
    }

    pub fn parameters(&self) -> SimulationParameters {
        let base = SimulationParameters::default();
        match self {
            Self::Baseline => base,
            Self::DeepDilation => base.with_dilation_factor(50),
            Self::Inverted => base.with_position_ratios(0.2, 0.5),
            Self::LongHorizon => base.with_external_steps(100),
            Self::Wide => base.with_pattern_size(1000),
        }
    }

    pub fn from_name(name: &str) -> Result<Self, ConfigError> {
        let lower = name.to_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|p| p.name() == lower)
            .ok_or_else(|| ConfigError::UnknownPreset(name.to_string()))
    }
}
