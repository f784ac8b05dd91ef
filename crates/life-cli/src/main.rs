use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use life_core::{CalculatorKind, RunSummary, Topology, Universe, UniverseConfig, PATTERNS};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

const WARMUP_GENERATIONS: u64 = 10;
const BENCHMARK_GENERATIONS: u64 = 200;
const BENCHMARK_FILL_PERCENT: usize = 35;

#[derive(Parser)]
#[command(name = "life")]
#[command(about = "Game of Life generation engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a universe for a number of generations
    Run {
        /// Path to config file (JSON). Uses the default universe when omitted
        #[arg(long)]
        config: Option<PathBuf>,

        /// Wrap the grid into a torus
        #[arg(long)]
        toroidal: bool,

        /// Track only the live total, not per-age counters
        #[arg(long)]
        no_stats: bool,

        /// Number of generations to compute
        #[arg(long, default_value_t = 1000)]
        generations: u64,

        /// Record a stats sample every K generations
        #[arg(long, default_value_t = 100)]
        sample_every: u64,

        /// Output directory for summary.json and final.txt (optional)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Dump the default configuration to stdout
    DumpDefaultConfig,
    /// List the built-in seed patterns
    Patterns,
    /// Time every calculator on a few grid sizes
    Benchmark,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn load_config(path: Option<&Path>) -> Result<UniverseConfig> {
    let Some(path) = path else {
        return Ok(UniverseConfig::default());
    };
    let file = File::open(path).context("failed to open config file")?;
    let reader = BufReader::new(file);
    serde_json::from_reader(reader).context("failed to parse config")
}

fn apply_overrides(config: &mut UniverseConfig, toroidal: bool, no_stats: bool) {
    if toroidal {
        config.topology = Topology::Toroidal;
        config.calculator = None;
    }
    if no_stats {
        config.stats_enabled = false;
    }
}

fn write_outputs(out_dir: &Path, summary: &RunSummary) -> Result<()> {
    std::fs::create_dir_all(out_dir).context("failed to create output directory")?;
    let file =
        File::create(out_dir.join("summary.json")).context("failed to create summary file")?;
    serde_json::to_writer_pretty(file, summary).context("failed to write summary")?;
    std::fs::write(out_dir.join("final.txt"), &summary.final_snapshot)
        .context("failed to write final snapshot")?;
    Ok(())
}

fn run_benchmark(topology: Topology, calculator: CalculatorKind, rows: usize, cols: usize) -> Result<()> {
    let config = UniverseConfig {
        calculator: Some(calculator),
        random_cells: rows * cols * BENCHMARK_FILL_PERCENT / 100,
        ..UniverseConfig::empty(topology, rows, cols)
    };
    let mut universe = Universe::new(config).context("benchmark universe setup failed")?;
    universe.advance(WARMUP_GENERATIONS);

    let timings = universe.advance(BENCHMARK_GENERATIONS);
    let per_gen = |us: u64| us as f64 / BENCHMARK_GENERATIONS as f64;
    let avg_total = per_gen(timings.total_us);
    let gens_per_sec = if avg_total > 0.0 {
        1_000_000.0 / avg_total
    } else {
        f64::INFINITY
    };

    println!("--- {} on {rows}x{cols} ({topology:?}) ---", calculator.name());
    println!("  Avg generation: {avg_total:.0} us ({gens_per_sec:.1} generations/sec)");
    println!(
        "  Breakdown:      compute={:.0} us, overlay+stats={:.0} us",
        per_gen(timings.compute_us),
        per_gen(timings.overlay_us),
    );
    println!("  Alive at end:   {}", universe.stats().total_alive);
    println!();
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::DumpDefaultConfig => {
            let config = UniverseConfig::default();
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        Commands::Patterns => {
            for pattern in PATTERNS {
                println!(
                    "{:<20} {:>2}x{:<2} {:>3} cells",
                    pattern.name,
                    pattern.height(),
                    pattern.width(),
                    pattern.population()
                );
            }
        }
        Commands::Benchmark => {
            if cfg!(debug_assertions) {
                eprintln!("WARNING: running in debug mode. Results are not representative.");
                eprintln!("         Use: cargo run -p life-cli --release -- benchmark");
                eprintln!();
            }
            println!("Warmup: {WARMUP_GENERATIONS} generations, Benchmark: {BENCHMARK_GENERATIONS} generations");
            println!();
            let sizes = [(90, 137), (256, 256), (1024, 1024)];
            for calculator in CalculatorKind::ALL {
                let topology = if calculator.supports(Topology::Flat) {
                    Topology::Flat
                } else {
                    Topology::Toroidal
                };
                for (rows, cols) in sizes {
                    run_benchmark(topology, calculator, rows, cols)?;
                }
            }
        }
        Commands::Run {
            config,
            toroidal,
            no_stats,
            generations,
            sample_every,
            out,
        } => {
            let mut universe_config = load_config(config.as_deref())?;
            apply_overrides(&mut universe_config, toroidal, no_stats);
            let mut universe =
                Universe::new(universe_config).context("failed to initialize universe")?;
            info!(
                rows = universe.grid().rows(),
                cols = universe.grid().cols(),
                calculator = universe.calculator().name(),
                generations,
                "running universe"
            );

            let target = universe.generation().saturating_add(generations);
            let summary = universe
                .run_until(target, sample_every)
                .context("run failed")?;

            if let Some(out_dir) = out {
                write_outputs(&out_dir, &summary)?;
                println!("Run complete. Results saved to {:?}", out_dir);
            } else {
                println!(
                    "Run complete. Generation {}, alive: {}",
                    summary.final_generation, summary.final_alive
                );
            }
        }
    }
    Ok(())
}
