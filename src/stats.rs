// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Time Dilation Simulation Suite - Pattern Statistics

//! Summary statistics over a pattern.
//!
//! Every transform invocation is scored with a [`StepStatistic`]: the mean
//! absolute value of the pattern plus a structure bonus of
//! `sqrt(variance + ε)`. Zones keep only the running sum of these scores.

use serde::{Deserialize, Serialize};

/// Floor added under the square root so a flat pattern still scores.
pub const STRUCTURE_EPSILON: f64 = 1e-12;

/// Mean of `|x|` over the pattern. Zero for an empty pattern.
pub fn mean_abs(pattern: &[f64]) -> f64 {
    if pattern.is_empty() {
        return 0.0;
    }
    pattern.iter().map(|x| x.abs()).sum::<f64>() / pattern.len() as f64
}

/// Population variance (divides by N). Zero for an empty pattern.
pub fn variance(pattern: &[f64]) -> f64 {
    let n = pattern.len();
    if n == 0 {
        return 0.0;
    }
    let mean = pattern.iter().sum::<f64>() / n as f64;
    pattern.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64
}

/// `sqrt(variance + ε)`
pub fn structure_bonus(variance: f64) -> f64 {
    (variance + STRUCTURE_EPSILON).sqrt()
}

/// Mean-abs and variance of one pattern snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub mean_abs: f64,
    pub variance: f64,
}

impl PatternSummary {
    pub fn of(pattern: &[f64]) -> Self {
        Self {
            mean_abs: mean_abs(pattern),
            variance: variance(pattern),
        }
    }
}

/// Score of a single propagation step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepStatistic {
    pub mean_abs: f64,
    pub structure_bonus: f64,
}

impl StepStatistic {
    pub fn of(pattern: &[f64]) -> Self {
        let summary = PatternSummary::of(pattern);
        Self {
            mean_abs: summary.mean_abs,
            structure_bonus: structure_bonus(summary.variance),
        }
    }

    /// Contribution of this step to a zone's accumulated computation.
    pub fn value(&self) -> f64 {
        self.mean_abs + self.structure_bonus
    }
}
