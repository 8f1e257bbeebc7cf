// Two-Centre Output Analysis Runner
// Finite horizon: N replications, mean ± t-interval over completed runs
// Infinite horizon: one batched steady-state run + convergence plots
//
// Usage:
//   cargo run --release --bin analyze -- 64 finite --trace runs.json
//   cargo run --release --bin analyze -- 0 infinite --trace steady.json
//   cargo run --release --bin analyze -- 64 finite --trace runs.json --json report.json
//   cargo run --release --bin analyze -- 0 infinite --trace steady.json --out-dir plots -v

mod cli;

use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use tracing::{error, info, warn};

use qos_analysis::artifacts::{write_steady_state_artifacts, ArtifactPaths};
use qos_analysis::{ExperimentOrchestrator, HorizonMode, TraceEngine};

use cli::{init_logging, Args};

fn run(args: &Args) -> qos_analysis::Result<()> {
    let config = args.experiment()?;
    let mut engine = TraceEngine::load(&args.trace)?;
    let finite = matches!(config.horizon, HorizonMode::Finite { .. });

    let start = Instant::now();
    let outcome = ExperimentOrchestrator::new(&mut engine, config)?.run()?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "analysis finished");
    if finite && engine.remaining() > 0 {
        warn!(unused = engine.remaining(), "trace holds more replications than were requested");
    }

    println!("{}", outcome.report);

    if let Some(diagnostics) = &outcome.diagnostics {
        let paths = ArtifactPaths {
            plot_dir: args.out_dir.clone(),
            series_file: args.series_file.clone(),
        };
        write_steady_state_artifacts(diagnostics, &paths)?;
    }

    if let Some(path) = &args.json {
        outcome.report.write_json(path)?;
        println!("Report saved to: {}", path.display());
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "analysis aborted");
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
