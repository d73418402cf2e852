// Per-Tick JSONL Time Series Recorder
// Outputs one JSON line per tick for independent analysis

use nasch_engine::Observables;
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Serialize)]
pub struct TickSnapshot {
    pub tick: u64,
    pub vehicle_count: usize,
    pub density: f64,
    pub mean_speed: f64,
    pub flow: f64,
    pub stopped_count: usize,
    pub stopped_fraction: f64,
    /// Space-time row, `.` for empty cells
    pub ring: String,
}

impl TickSnapshot {
    pub fn from_tick(obs: &Observables, ring: String) -> Self {
        let stopped_fraction = if obs.vehicle_count > 0 {
            obs.stopped_count as f64 / obs.vehicle_count as f64
        } else {
            0.0
        };

        Self {
            tick: obs.tick,
            vehicle_count: obs.vehicle_count,
            density: obs.density,
            mean_speed: obs.mean_speed,
            flow: obs.flow,
            stopped_count: obs.stopped_count,
            stopped_fraction,
            ring,
        }
    }
}

/// Time series recorder that accumulates snapshots and writes JSONL
pub struct TimeSeriesRecorder {
    snapshots: Vec<TickSnapshot>,
}

impl TimeSeriesRecorder {
    pub fn new() -> Self {
        Self { snapshots: Vec::new() }
    }

    pub fn record(&mut self, obs: &Observables, ring: String) {
        self.snapshots.push(TickSnapshot::from_tick(obs, ring));
    }

    /// Write all snapshots to a JSONL file
    pub fn write_jsonl(&self, path: &std::path::Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::File::create(path)?;
        for snapshot in &self.snapshots {
            let line = serde_json::to_string(snapshot)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            writeln!(file, "{}", line)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }
}
