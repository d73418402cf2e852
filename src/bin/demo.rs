// Ring road demo: build a highway, run it, print every snapshot.
//
// Usage:
//   cargo run --bin demo                                  # 100 cells, 10 updates, p = 0.1
//   cargo run --bin demo -- --ascii --updates 40          # space-time diagram
//   cargo run --bin demo -- --random-speed --seed 7       # randomized start

use clap::Parser;
use nasch_engine::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(about = "Nagel–Schreckenberg traffic on a circular road")]
struct Args {
    #[arg(long, default_value_t = 100)]
    cells: usize,
    #[arg(long, default_value_t = 5)]
    frequency: usize,
    #[arg(long, default_value_t = 2, allow_hyphen_values = true)]
    initial_speed: i64,
    #[arg(long)]
    random_frequency: bool,
    #[arg(long)]
    random_speed: bool,
    #[arg(long, default_value_t = DEFAULT_MAX_SPEED)]
    max_speed: Speed,
    #[arg(long, default_value_t = 0.1)]
    probability: f64,
    #[arg(long, default_value_t = 10)]
    updates: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Print a space-time diagram instead of speed lists
    #[arg(long)]
    ascii: bool,
}

fn run(args: &Args) -> Result<History, NaschError> {
    let params = SimulationParams {
        number_of_cells: args.cells,
        max_speed: args.max_speed,
        probability: args.probability,
        number_of_updates: args.updates,
    };
    params.validate()?;

    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);
    let initial = construct_highway(
        params.number_of_cells,
        args.frequency,
        args.initial_speed,
        args.random_frequency,
        args.random_speed,
        params.max_speed,
        &mut rng,
    )?;
    simulate(initial, params.number_of_updates, params.probability, params.max_speed, &mut rng)
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(history) => {
            if args.ascii {
                print!("{}", history.space_time_diagram());
            } else {
                for state in &history {
                    println!("{}", state);
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
