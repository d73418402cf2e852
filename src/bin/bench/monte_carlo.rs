// Monte Carlo Infrastructure — N runs per scenario with statistical aggregation
// Each scenario runs N times with seeds base..base+N, computing mean ± 95% CI

use nasch_engine::*;

use crate::metrics::{FlowTracker, InvariantTracker};
use crate::report::*;
use crate::scenarios::Scenario;
use crate::time_series::TimeSeriesRecorder;

use std::time::Instant;

/// Run a single scenario iteration with a specific seed.
pub fn run_single(
    scenario: &Scenario,
    seed: u64,
    time_series_dir: Option<&std::path::Path>,
) -> BenchResult {
    let start = Instant::now();
    let mut result = BenchResult {
        scenario: scenario.label.to_string(),
        name: scenario.name.to_string(),
        category: scenario.category.to_string(),
        seed,
        pass: false,
        error: None,
        cells: scenario.cells,
        vehicle_count: 0,
        density: 0.0,
        probability: scenario.probability,
        max_speed: scenario.max_speed,
        mean_flow: 0.0,
        mean_speed: 0.0,
        final_stopped: 0,
        peak_stopped: 0,
        conservation_holds: false,
        speed_bounds_hold: false,
        ticks: scenario.ticks,
        elapsed_ms: 0,
        throughput_per_sec: 0.0,
    };

    let mut sim = match RingRoadSimulation::from_builder(scenario.builder(), scenario.probability, seed) {
        Ok(sim) => sim,
        Err(e) => {
            tracing::warn!(scenario = scenario.name, seed, "setup failed: {}", e);
            result.error = Some(e.to_string());
            return result;
        }
    };

    let initial = sim.observables();
    result.vehicle_count = initial.vehicle_count;
    result.density = initial.density;

    let mut flow = FlowTracker::new(scenario.warmup);
    let mut invariants = InvariantTracker::new(sim.highway(), scenario.max_speed);
    let mut time_series = time_series_dir.map(|_| TimeSeriesRecorder::new());
    if let Some(ts) = time_series.as_mut() {
        ts.record(&initial, sim.highway().to_ascii());
    }

    for _ in 0..scenario.ticks {
        let tick = match sim.tick_core() {
            Ok(tick) => tick,
            Err(e) => {
                tracing::warn!(scenario = scenario.name, seed, tick = sim.current_tick(), "run aborted: {}", e);
                result.error = Some(e.to_string());
                break;
            }
        };

        flow.record_tick(&tick.observables);
        invariants.record_tick(&tick.highway);
        if let Some(ts) = time_series.as_mut() {
            ts.record(&tick.observables, tick.highway.to_ascii());
        }
    }

    if let (Some(ts), Some(dir)) = (&time_series, time_series_dir) {
        let path = dir.join(format!("seed-{}.jsonl", seed));
        if let Err(e) = ts.write_jsonl(&path) {
            tracing::warn!("failed to write time series {}: {}", path.display(), e);
        }
    }

    let elapsed = start.elapsed();
    let elapsed_secs = elapsed.as_secs_f64().max(0.001);

    result.mean_flow = flow.mean_flow();
    result.mean_speed = flow.mean_speed();
    result.final_stopped = sim.observables().stopped_count;
    result.peak_stopped = flow.peak_stopped;
    result.conservation_holds = invariants.conservation_holds();
    result.speed_bounds_hold = invariants.speed_bounds_hold();
    result.elapsed_ms = elapsed.as_millis();
    result.throughput_per_sec = sim.current_tick() as f64 / elapsed_secs;
    result.pass = evaluate(scenario, &result);
    result
}

/// Evaluate pass/fail against the scenario criteria.
fn evaluate(scenario: &Scenario, result: &BenchResult) -> bool {
    let criteria = &scenario.criteria;
    if result.error.is_some() {
        return false;
    }
    if criteria.require_conservation && !result.conservation_holds {
        return false;
    }
    if criteria.require_speed_bounds && !result.speed_bounds_hold {
        return false;
    }
    if let Some(min) = criteria.min_mean_flow {
        if result.mean_flow < min {
            return false;
        }
    }
    if let Some(max) = criteria.max_mean_flow {
        if result.mean_flow > max {
            return false;
        }
    }
    if let Some(max) = criteria.max_mean_speed {
        if result.mean_speed > max {
            return false;
        }
    }
    true
}

/// Run Monte Carlo: N runs of a scenario, aggregate stats.
pub fn run_monte_carlo(
    scenario: &Scenario,
    n_runs: usize,
    base_seed: u64,
    time_series_base: Option<&std::path::Path>,
) -> MonteCarloReport {
    let ts_dir = time_series_base.map(|base| base.join(scenario.name.to_lowercase()));

    let mut results = Vec::with_capacity(n_runs);
    for i in 0..n_runs {
        let seed = base_seed + i as u64;
        results.push(run_single(scenario, seed, ts_dir.as_deref()));
    }

    aggregate(scenario, results)
}

/// Aggregate individual runs into a MonteCarloReport.
fn aggregate(scenario: &Scenario, results: Vec<BenchResult>) -> MonteCarloReport {
    let n = results.len();
    let passed = results.iter().filter(|r| r.pass).count();
    let pass_rate = if n > 0 { passed as f64 / n as f64 } else { 0.0 };
    let density = results.first().map(|r| r.density).unwrap_or(0.0);

    let stat = |f: fn(&BenchResult) -> f64| {
        Stats::from_samples(&results.iter().map(f).collect::<Vec<_>>())
    };

    MonteCarloReport {
        scenario_name: scenario.name.to_string(),
        label: scenario.label.to_string(),
        category: scenario.category.to_string(),
        n_runs: n,
        pass_rate,
        density,
        mean_flow: stat(|r| r.mean_flow),
        mean_speed: stat(|r| r.mean_speed),
        peak_stopped: stat(|r| r.peak_stopped as f64),
        elapsed_ms: stat(|r| r.elapsed_ms as f64),
        throughput_per_sec: stat(|r| r.throughput_per_sec),
        individual_runs: results,
    }
}
