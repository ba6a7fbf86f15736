//! `bv_benchmark` binary: runs the Bernstein-Vazirani benchmark sweep.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin bv_benchmark -- --max-qubits 8 --method 2
//! cargo run --bin bv_benchmark -- --config bv.toml --backend noisy_simulator
//! ```

use bvbench::{BenchmarkConfig, BenchmarkDriver, Construction};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

/// Command-line arguments; every option overrides the configuration file.
#[derive(Parser, Debug)]
#[command(
    name = "bv_benchmark",
    version,
    about = "Bernstein-Vazirani benchmark",
    long_about = None
)]
struct Args {
    /// Path to a TOML configuration file.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Lower bound of the qubit sweep.
    #[arg(long)]
    min_qubits: Option<usize>,

    /// Upper bound of the qubit sweep.
    #[arg(long)]
    max_qubits: Option<usize>,

    /// Most circuits per qubit count.
    #[arg(long)]
    max_circuits: Option<usize>,

    /// Shots per circuit.
    #[arg(long)]
    num_shots: Option<u64>,

    /// Circuit construction: 1 (parallel) or 2 (sequential).
    #[arg(short, long)]
    method: Option<u8>,

    /// Execution target (local_simulator, qasm_simulator, statevector_simulator, noisy_simulator).
    #[arg(long, value_name = "ID")]
    backend: Option<String>,

    /// Seed for secret sampling.
    #[arg(long)]
    seed: Option<u64>,

    /// Log counts and fidelity of every trial.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() {
    let args = Args::parse();

    let log_level_filter = args
        .log_level
        .parse::<tracing_subscriber::filter::LevelFilter>()
        .unwrap_or(tracing_subscriber::filter::LevelFilter::INFO);

    tracing_subscriber::fmt()
        .with_max_level(log_level_filter)
        .with_target(false)
        .with_thread_ids(false)
        .init();

    let config = match build_config(&args) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    let (min_qubits, max_qubits) = config.clamped_bounds();
    info!("  qubits       : {}..={}", min_qubits, max_qubits);
    info!("  max circuits : {}", config.max_circuits);
    info!("  shots        : {}", config.num_shots);
    info!("  method       : {}", config.method);
    info!("  backend      : {}", config.backend_id);

    let report = match BenchmarkDriver::new(config).and_then(|mut driver| driver.run()) {
        Ok(report) => report,
        Err(e) => {
            error!("Benchmark failed: {e}");
            std::process::exit(1);
        }
    };
    println!("{}", report);
}

fn build_config(args: &Args) -> bvbench::Result<BenchmarkConfig> {
    let mut config = match args.config.as_deref() {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            BenchmarkConfig::load(path)?
        }
        None => BenchmarkConfig::default(),
    };

    if let Some(n) = args.min_qubits {
        config.min_qubits = n;
    }
    if let Some(n) = args.max_qubits {
        config.max_qubits = n;
    }
    if let Some(n) = args.max_circuits {
        config.max_circuits = n;
    }
    if let Some(n) = args.num_shots {
        config.num_shots = n;
    }
    if let Some(method) = args.method {
        config.method = Construction::try_from(method)?;
    }
    if let Some(backend) = &args.backend {
        config.backend_id = backend.clone();
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.verbose |= args.verbose;

    config.validate()?;
    Ok(config)
}
