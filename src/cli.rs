use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "minebench")]
#[command(about = "Benchmark harness for process mining algorithms", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate miners against a folder of event logs
    Run {
        /// Folder containing the event logs (defaults to the current folder)
        #[arg(long = "logs", visible_alias = "ext")]
        logs: Option<PathBuf>,

        /// Miners to evaluate, by acronym or listing index
        #[arg(long = "miners", value_delimiter = ',', required = true)]
        miners: Vec<String>,

        /// Mining deadline: milliseconds, or hours with an `h` suffix
        #[arg(long = "miner-timeout")]
        miner_timeout: Option<String>,

        /// Per-metric deadline: milliseconds, or hours with an `h` suffix
        #[arg(long = "metric-timeout")]
        metric_timeout: Option<String>,

        /// Number of cross-validation folds
        #[arg(short = 'k', long = "folds")]
        folds: Option<usize>,

        /// Thread-count hint for the fitness collaborator
        #[arg(long = "fitness-threads")]
        fitness_threads: Option<usize>,

        /// Sweep one miner setting over a range
        #[arg(
            long = "parameter-range",
            num_args = 4,
            value_names = ["NAME", "START", "STOP", "STEP"]
        )]
        parameter_range: Option<Vec<String>>,

        /// Output directory for the result documents
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Configuration file (TOML); flags override its values
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// List the available mining algorithms
    List,
}
