// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ring Road Traffic Suite - Nagel–Schreckenberg cellular automaton

pub mod types;
pub mod builder;
pub mod gap;
pub mod update;
pub mod observables;
pub mod simulation;

pub use types::*;
pub use builder::{construct_highway, HighwayBuilder};
pub use gap::gap_ahead;
pub use update::step;
pub use observables::Observables;
pub use simulation::{simulate, History, RingRoadSimulation, TickResult};

use wasm_bindgen::prelude::*;

// ─── WASM Interface ──────────────────────────────────────────────────────────

#[wasm_bindgen]
impl RingRoadSimulation {
    #[wasm_bindgen(constructor)]
    pub fn new(
        number_of_cells: u32,
        frequency: u32,
        initial_speed: i32,
        max_speed: u32,
        probability: f64,
        seed: u64,
    ) -> Result<RingRoadSimulation, JsError> {
        #[cfg(target_arch = "wasm32")]
        std::panic::set_hook(Box::new(console_error_panic_hook::hook));

        let builder = HighwayBuilder::new(number_of_cells as usize, frequency as usize, initial_speed as i64)
            .max_speed(max_speed);
        Ok(Self::from_builder(builder, probability, seed)?)
    }

    pub fn tick(&mut self) -> Result<JsValue, JsError> {
        let result = self.tick_core()?;
        Ok(serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL))
    }

    /// Run N ticks without returning snapshots (fast batch mode)
    pub fn run_batch(&mut self, ticks: u32) -> Result<(), JsError> {
        Ok(self.run_batch_core(ticks)?)
    }

    /// Current ring as an array of speeds, `null` for empty cells
    pub fn get_highway(&self) -> JsValue {
        serde_wasm_bindgen::to_value(self.highway.cells()).unwrap_or(JsValue::NULL)
    }

    pub fn get_observables(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.observables()).unwrap_or(JsValue::NULL)
    }

    pub fn get_tick(&self) -> u64 {
        self.current_tick
    }

    /// Reset simulation to initial state
    pub fn reset(&mut self) -> Result<(), JsError> {
        Ok(self.reset_core()?)
    }
}
