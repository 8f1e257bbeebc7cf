// CLI Arguments — positional replication count and horizon mode
// Missing or malformed arguments exit through clap with usage and status 2

use clap::Parser;
use std::path::PathBuf;

use qos_analysis::{AnalysisSettings, ExperimentConfig, ModeKind};

/// Confidence-interval analysis of Monitor/Plan simulation output
#[derive(Parser, Debug)]
#[command(name = "analyze")]
#[command(about = "Estimate Monitor and Plan centre metrics from recorded simulation output")]
#[command(version)]
pub struct Args {
    /// Number of replications (finite mode only)
    pub count: usize,

    /// Experimental design: finite | infinite
    pub mode: ModeKind,

    /// Recorded simulator output to replay (JSON)
    #[arg(short, long)]
    pub trace: PathBuf,

    /// JSON settings file (seed, alpha, stop times, batch size)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the base seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Directory for convergence plots (created if absent)
    #[arg(long, default_value = "plots")]
    pub out_dir: PathBuf,

    /// Response-time-1 series file, overwritten each infinite run
    #[arg(long, default_value = "acs.dat")]
    pub series_file: PathBuf,

    /// Also write the report as JSON
    #[arg(long)]
    pub json: Option<PathBuf>,

    /// Debug-level logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Defaults, then the settings file, then command-line overrides.
    pub fn experiment(&self) -> qos_analysis::Result<ExperimentConfig> {
        let mut settings = match &self.config {
            Some(path) => AnalysisSettings::load(path)?,
            None => AnalysisSettings::default(),
        };
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        Ok(settings.experiment(self.mode, self.count))
    }
}

pub fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose { "qos_analysis=debug,analyze=debug" } else { "qos_analysis=info,analyze=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
