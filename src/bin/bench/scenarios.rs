// Benchmark Scenarios — density / noise points along the fundamental diagram

use nasch_engine::{HighwayBuilder, Speed};

// ─── Scenario Configuration ──────────────────────────────────────────────────

pub struct Scenario {
    pub name: &'static str,
    pub label: &'static str,
    pub category: &'static str,
    pub cells: usize,
    /// Placement stride; density is roughly `1 / frequency`.
    pub frequency: usize,
    pub initial_speed: i64,
    pub randomize_frequency: bool,
    pub randomize_speed: bool,
    pub max_speed: Speed,
    pub probability: f64,
    pub ticks: u64,
    /// Ticks discarded before steady-state averages are taken.
    pub warmup: u64,
    pub criteria: PassCriteria,
}

pub struct PassCriteria {
    pub min_mean_flow: Option<f64>,
    pub max_mean_flow: Option<f64>,
    pub max_mean_speed: Option<f64>,
    pub require_conservation: bool,
    pub require_speed_bounds: bool,
}

impl Default for PassCriteria {
    fn default() -> Self {
        Self {
            min_mean_flow: None,
            max_mean_flow: None,
            max_mean_speed: None,
            require_conservation: true,
            require_speed_bounds: true,
        }
    }
}

impl Scenario {
    pub fn builder(&self) -> HighwayBuilder {
        HighwayBuilder::new(self.cells, self.frequency, self.initial_speed)
            .randomize_frequency(self.randomize_frequency)
            .randomize_speed(self.randomize_speed)
            .max_speed(self.max_speed)
    }
}

// ─── Scenario Catalogue ──────────────────────────────────────────────────────

pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: "FREE_FLOW_DETERMINISTIC",
            label: "Free flow, p=0 (rho=0.1)",
            category: "free-flow",
            cells: 1000,
            frequency: 10,
            initial_speed: 0,
            randomize_frequency: false,
            randomize_speed: false,
            max_speed: 5,
            probability: 0.0,
            ticks: 500,
            warmup: 100,
            // Every vehicle reaches Vmax: J = rho * Vmax
            criteria: PassCriteria {
                min_mean_flow: Some(0.499),
                max_mean_flow: Some(0.501),
                ..PassCriteria::default()
            },
        },
        Scenario {
            name: "FREE_FLOW_NOISY",
            label: "Free flow, p=0.25 (rho=0.1)",
            category: "free-flow",
            cells: 1000,
            frequency: 10,
            initial_speed: 0,
            randomize_frequency: false,
            randomize_speed: false,
            max_speed: 5,
            probability: 0.25,
            ticks: 1000,
            warmup: 200,
            criteria: PassCriteria {
                min_mean_flow: Some(0.30),
                max_mean_flow: Some(0.50),
                ..PassCriteria::default()
            },
        },
        Scenario {
            name: "CRITICAL_DENSITY",
            label: "Near-critical, p=0.1 (rho~0.14)",
            category: "critical",
            cells: 1000,
            frequency: 7,
            initial_speed: 2,
            randomize_frequency: false,
            randomize_speed: false,
            max_speed: 5,
            probability: 0.1,
            ticks: 1500,
            warmup: 300,
            criteria: PassCriteria {
                min_mean_flow: Some(0.30),
                ..PassCriteria::default()
            },
        },
        Scenario {
            name: "STOP_AND_GO",
            label: "Congested, p=0.1 (rho=0.5)",
            category: "jam",
            cells: 1000,
            frequency: 2,
            initial_speed: 0,
            randomize_frequency: false,
            randomize_speed: false,
            max_speed: 5,
            probability: 0.1,
            ticks: 1000,
            warmup: 200,
            // Congested branch: J <= 1 - rho
            criteria: PassCriteria {
                max_mean_flow: Some(0.5),
                max_mean_speed: Some(1.0),
                ..PassCriteria::default()
            },
        },
        Scenario {
            name: "FULL_SLOWDOWN",
            label: "Always brake, p=1 (rho=0.1)",
            category: "noise",
            cells: 1000,
            frequency: 10,
            // From rest, p=1 pins every vehicle at zero; start at Vmax instead
            initial_speed: 5,
            randomize_frequency: false,
            randomize_speed: false,
            max_speed: 5,
            probability: 1.0,
            ticks: 500,
            warmup: 100,
            // Effective Vmax drops by one
            criteria: PassCriteria {
                max_mean_flow: Some(0.4 + 1e-9),
                max_mean_speed: Some(4.0 + 1e-9),
                ..PassCriteria::default()
            },
        },
        Scenario {
            name: "RANDOM_START",
            label: "Random placement and speeds, p=0.1",
            category: "mixed",
            cells: 1000,
            frequency: 8,
            initial_speed: 0,
            randomize_frequency: true,
            randomize_speed: true,
            max_speed: 5,
            probability: 0.1,
            ticks: 1000,
            warmup: 200,
            criteria: PassCriteria::default(),
        },
    ]
}
