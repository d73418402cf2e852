// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Ring Road Traffic Suite - Macroscopic Observables

use serde::{Deserialize, Serialize};

use crate::types::Highway;

/// Aggregate traffic quantities of one snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observables {
    pub tick: u64,
    pub vehicle_count: usize,
    /// Vehicles per cell.
    pub density: f64,
    /// Mean speed over vehicles, zero on an empty ring.
    pub mean_speed: f64,
    /// Vehicles passing a fixed point per step, averaged over the ring.
    pub flow: f64,
    pub stopped_count: usize,
}

impl Observables {
    pub fn from_highway(highway: &Highway, tick: u64) -> Self {
        let cells = highway.len().max(1) as f64;
        let (count, speed_sum, stopped) = highway.vehicles().fold(
            (0usize, 0u64, 0usize),
            |(count, sum, stopped), (_, v)| (count + 1, sum + v as u64, stopped + (v == 0) as usize),
        );

        Self {
            tick,
            vehicle_count: count,
            density: count as f64 / cells,
            mean_speed: if count > 0 { speed_sum as f64 / count as f64 } else { 0.0 },
            flow: speed_sum as f64 / cells,
            stopped_count: stopped,
        }
    }
}
