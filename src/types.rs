// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Time Dilation Simulation Suite - Type Definitions

use serde::{Deserialize, Serialize};

use crate::stats::PatternSummary;

pub type Pattern = Vec<f64>;

// ─── Zone ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Zone {
    Flat,
    Dilated,
}

impl Zone {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Dilated => "dilated",
        }
    }
}

// ─── Per-step record (observer feed) ────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct StepRecord {
    pub zone: Zone,
    pub external_step: usize,
    /// Always 0 in the flat zone.
    pub inner_step: usize,
    pub mean_abs: f64,
    pub structure_bonus: f64,
    /// Zone accumulator after this step.
    pub accumulated: f64,
}

// ─── Zone results ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ZoneResult {
    pub final_mean_abs: f64,
    pub final_variance: f64,
    pub accumulated_computation: f64,
    /// Transform calls made in this zone.
    pub invocations: usize,
}

impl ZoneResult {
    pub fn new(final_pattern: &[f64], accumulated_computation: f64, invocations: usize) -> Self {
        let summary = PatternSummary::of(final_pattern);
        Self {
            final_mean_abs: summary.mean_abs,
            final_variance: summary.variance,
            accumulated_computation,
            invocations,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DilatedZoneResult {
    #[serde(flatten)]
    pub zone: ZoneResult,
    /// Dilated over flat accumulated computation; `+∞` when flat is zero.
    /// Non-finite values are written as `"inf"`, `"-inf"` or `"nan"`.
    #[serde(with = "ratio_repr")]
    pub performance_ratio_vs_flat: f64,
}

/// Accumulated-computation ratio. `+∞` unless `flat` is strictly positive,
/// so a zero or NaN flat total never divides. A NaN `dilated` over a
/// positive `flat` still yields NaN.
pub fn performance_ratio(dilated: f64, flat: f64) -> f64 {
    if !(flat > 0.0) {
        f64::INFINITY
    } else {
        dilated / flat
    }
}

/// JSON numbers cannot hold `inf`/`nan`; those travel as strings.
mod ratio_repr {
    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            s.serialize_f64(*value)
        } else if value.is_nan() {
            s.serialize_str("nan")
        } else if value.is_sign_positive() {
            s.serialize_str("inf")
        } else {
            s.serialize_str("-inf")
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
        match Repr::deserialize(d)? {
            Repr::Number(v) => Ok(v),
            Repr::Text(t) => match t.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(D::Error::custom(format!("invalid ratio `{}`", other))),
            },
        }
    }
}

// ─── Run result ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationResult {
    /// Seed the run's generators were derived from.
    pub seed: u64,
    pub initial_mean_abs: f64,
    pub initial_variance: f64,
    pub flat: ZoneResult,
    pub dilated: DilatedZoneResult,
}

impl SimulationResult {
    pub fn performance_ratio_vs_flat(&self) -> f64 {
        self.dilated.performance_ratio_vs_flat
    }
}
