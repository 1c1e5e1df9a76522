// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Time Dilation Simulation Suite

pub mod types;
pub mod stats;
pub mod params;
pub mod transform;
pub mod simulation;
pub mod monte_carlo;

pub use types::*;
pub use params::{ConfigError, Preset, SimulationParameters, TransformConfig};
pub use transform::{DecayNoiseTransform, PropagationTransform, TransformError};
pub use simulation::{DualRateSimulator, SimulationError, StepObserver};

use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

/// Browser handle around a [`DualRateSimulator`] with the stock transform.
#[wasm_bindgen]
pub struct WasmSimulator {
    inner: DualRateSimulator,
}

#[wasm_bindgen]
impl WasmSimulator {
    #[wasm_bindgen(constructor)]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        pattern_size: u32,
        num_external_steps: u32,
        dilation_factor: u32,
        flat_position_ratio: f64,
        dilated_position_ratio: f64,
        scale_factor: f64,
        axion_mass: f64,
        seed: Option<u64>,
    ) -> Result<WasmSimulator, JsValue> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let params = SimulationParameters {
            pattern_size: pattern_size as usize,
            num_external_steps: num_external_steps as usize,
            dilation_factor: dilation_factor as usize,
            flat_position_ratio,
            dilated_position_ratio,
            transform: TransformConfig { scale_factor, axion_mass },
            seed,
        };
        let inner = DualRateSimulator::new(params).map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }

    /// Simulator with the baseline parameters.
    pub fn baseline() -> Result<WasmSimulator, JsValue> {
        let inner = DualRateSimulator::new(SimulationParameters::default())
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self { inner })
    }

    pub fn seed(&self) -> u64 {
        self.inner.seed()
    }

    pub fn generate_initial_pattern(&mut self) -> Vec<f64> {
        self.inner.generate_initial_pattern()
    }

    pub fn run(&mut self) -> Result<JsValue, JsValue> {
        let result = self.inner.run(None).map_err(|e| JsValue::from_str(&e.to_string()))?;
        serde_wasm_bindgen::to_value(&result).map_err(Into::into)
    }

    pub fn run_with_pattern(&mut self, pattern: Vec<f64>) -> Result<JsValue, JsValue> {
        let result = self
            .inner
            .run(Some(&pattern))
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        serde_wasm_bindgen::to_value(&result).map_err(Into::into)
    }
}
