// Ring Road Benchmark Runner — fundamental diagram validation
// Monte Carlo (N=30), seedable PRNG, per-tick invariant audit
//
// Usage:
//   cargo run --release --bin bench                     # Run all scenarios (30 runs each)
//   cargo run --release --bin bench -- --runs 5         # Quick mode (5 runs each)
//   cargo run --release --bin bench -- STOP_AND_GO      # Filter by name
//   cargo run --release --bin bench -- --time-series    # Enable JSONL output
//   cargo run --release --bin bench -- --seed 42        # Custom base seed

mod report;
mod scenarios;
mod monte_carlo;
mod metrics;
mod time_series;

use clap::Parser;
use report::*;
use scenarios::*;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

// ─── CLI ────────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(about = "Monte Carlo benchmark of the ring road traffic model")]
struct CliArgs {
    /// Runs per scenario
    #[arg(long, default_value_t = 30)]
    runs: usize,
    /// Base seed; run i uses seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Write one JSONL file per run
    #[arg(long)]
    time_series: bool,
    #[arg(long, default_value = "benchmark-results")]
    output_dir: PathBuf,
    /// Only run scenarios whose name, label or category contains this
    filter: Option<String>,
}

const PASS_THRESHOLD: f64 = 0.933;

// ─── Main ───────────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = CliArgs::parse();
    let all_scenarios = scenarios();

    let to_run: Vec<&Scenario> = match &cli.filter {
        Some(f) => {
            let f_lower = f.to_lowercase();
            all_scenarios.iter()
                .filter(|s| s.name.to_lowercase().contains(&f_lower)
                          || s.label.to_lowercase().contains(&f_lower)
                          || s.category.to_lowercase().contains(&f_lower))
                .collect()
        }
        None => all_scenarios.iter().collect(),
    };

    if to_run.is_empty() {
        eprintln!("No scenarios match filter: {:?}", cli.filter);
        return ExitCode::FAILURE;
    }

    let ts_dir = cli.time_series.then(|| cli.output_dir.join("time-series"));

    println!("\n  Ring Road Benchmark Runner v0.1.0");
    println!("  PRNG: ChaCha8Rng | Runs/scenario: {} | Base seed: {}", cli.runs, cli.seed);
    println!("  Running {} scenario(s)...\n", to_run.len());
    println!("  {:<36} {:>5} {:>7} {:>14} {:>14} {:>7}",
        "Scenario", "Pass%", "Rho", "Flow", "Speed", "Time");
    println!("  {}", "-".repeat(90));

    let suite_start = Instant::now();
    let mut mc_reports = Vec::new();

    for scenario in &to_run {
        let report = monte_carlo::run_monte_carlo(
            scenario,
            cli.runs,
            cli.seed,
            ts_dir.as_deref(),
        );

        let pass_pct = report.pass_rate * 100.0;
        let flow_ci = (report.mean_flow.ci_upper - report.mean_flow.ci_lower) / 2.0;
        let speed_ci = (report.mean_speed.ci_upper - report.mean_speed.ci_lower) / 2.0;
        let status = if report.pass_rate >= PASS_THRESHOLD { "PASS" } else { "FAIL" };

        println!("  {:<36} {:>4}% {:>7.3} {:>7.3}±{:<6.3} {:>7.3}±{:<6.3} {:>5.0}ms  {}",
            report.label,
            pass_pct as u32,
            report.density,
            report.mean_flow.mean, flow_ci,
            report.mean_speed.mean, speed_ci,
            report.elapsed_ms.mean,
            status,
        );

        mc_reports.push(report);
    }

    let suite_elapsed = suite_start.elapsed();

    // ─── Summary ────────────────────────────────────────────────────────

    let total = mc_reports.len();
    let passed = mc_reports.iter().filter(|r| r.pass_rate >= PASS_THRESHOLD).count();
    let failed = total - passed;

    println!("  {}", "-".repeat(90));
    println!("  Total: {}  Passed: {}  Failed: {}  Suite time: {:.1}s\n",
        total, passed, failed, suite_elapsed.as_secs_f64());

    // ─── Write JSON Report ──────────────────────────────────────────────

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let timestamp = format!("{}", ts);

    let report = BenchReport {
        timestamp: timestamp.clone(),
        version: "0.1.0",
        prng: "ChaCha8Rng",
        n_runs_per_scenario: cli.runs,
        summary: Summary {
            total,
            passed,
            failed,
            pass_rate: passed as f64 / total as f64,
        },
        scenarios: mc_reports,
    };

    let path = cli.output_dir.join(format!("bench-{}.json", timestamp));
    if let Err(e) = write_report(&report, &path) {
        tracing::error!("failed to write {}: {}", path.display(), e);
        return ExitCode::FAILURE;
    }
    println!("  Results saved to: {}\n", path.display());

    if failed > 0 {
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn write_report(report: &BenchReport, path: &std::path::Path) -> std::io::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    std::fs::write(path, json)
}
