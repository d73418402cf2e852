// Per-Tick Metric Trackers — steady-state flow and ring invariants

use nasch_engine::*;

// ─── Steady-State Flow Tracker ──────────────────────────────────────────────

/// Averages flow and speed over ticks past the warmup window.
pub struct FlowTracker {
    pub warmup: u64,
    pub samples: u64,
    pub flow_sum: f64,
    pub speed_sum: f64,
    pub peak_stopped: usize,
}

impl FlowTracker {
    pub fn new(warmup: u64) -> Self {
        Self {
            warmup,
            samples: 0,
            flow_sum: 0.0,
            speed_sum: 0.0,
            peak_stopped: 0,
        }
    }

    pub fn record_tick(&mut self, obs: &Observables) {
        self.peak_stopped = self.peak_stopped.max(obs.stopped_count);
        if obs.tick <= self.warmup {
            return;
        }
        self.samples += 1;
        self.flow_sum += obs.flow;
        self.speed_sum += obs.mean_speed;
    }

    pub fn mean_flow(&self) -> f64 {
        if self.samples == 0 { return 0.0; }
        self.flow_sum / self.samples as f64
    }

    pub fn mean_speed(&self) -> f64 {
        if self.samples == 0 { return 0.0; }
        self.speed_sum / self.samples as f64
    }
}

// ─── Invariant Tracker ──────────────────────────────────────────────────────

/// Counts ticks that break vehicle conservation or the speed bound.
/// Collisions never reach here: the engine refuses to produce them.
pub struct InvariantTracker {
    pub expected_vehicles: usize,
    pub max_speed: Speed,
    pub conservation_violations: u32,
    pub speed_violations: u32,
}

impl InvariantTracker {
    pub fn new(initial: &Highway, max_speed: Speed) -> Self {
        Self {
            expected_vehicles: initial.vehicle_count(),
            max_speed,
            conservation_violations: 0,
            speed_violations: 0,
        }
    }

    pub fn record_tick(&mut self, highway: &Highway) {
        if highway.vehicle_count() != self.expected_vehicles {
            self.conservation_violations += 1;
        }
        if highway.vehicles().any(|(_, v)| v > self.max_speed) {
            self.speed_violations += 1;
        }
    }

    pub fn conservation_holds(&self) -> bool {
        self.conservation_violations == 0
    }

    pub fn speed_bounds_hold(&self) -> bool {
        self.speed_violations == 0
    }
}
