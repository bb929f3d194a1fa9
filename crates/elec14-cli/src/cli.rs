use clap::{Args, Parser, Subcommand};
use elec14::engine::config::BackendSelection;
use elec14::engine::decomposition::PairDecomposition;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu",
    version,
    about = "elec14 CLI - Intramolecular electrostatic energy with 1-2/1-3/1-4 exclusions, evaluated serially and on a parallel accelerator.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Number of worker threads of the host accelerator.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compute the electrostatic energy of a molecule described by text input files.
    Evaluate(EvaluateArgs),
    /// List the compute platforms and devices available to the parallel backend.
    Devices,
}

/// Arguments for the `evaluate` subcommand.
#[derive(Args, Debug)]
pub struct EvaluateArgs {
    // --- Input ---
    /// Directory holding atoms.txt, charges.txt and bonds.txt.
    #[arg(short = 'd', long, value_name = "DIR", default_value = ".")]
    pub input_dir: PathBuf,

    /// Override the coordinate file (x y z per atom).
    #[arg(long, value_name = "PATH")]
    pub atoms: Option<PathBuf>,

    /// Override the charge file (one charge per atom).
    #[arg(long, value_name = "PATH")]
    pub charges: Option<PathBuf>,

    /// Override the bond file (pairs of zero-based atom ids).
    #[arg(long, value_name = "PATH")]
    pub bonds: Option<PathBuf>,

    /// Path to an optional configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    // --- Backend Overrides ---
    /// Backends to run: 'serial', 'parallel' or 'both' (cross-validated).
    #[arg(short, long, value_name = "BACKEND")]
    pub backend: Option<BackendSelection>,

    /// Index of the compute platform used by the parallel backend.
    #[arg(short, long, value_name = "INDEX")]
    pub platform: Option<usize>,

    /// Index of the device on the selected platform.
    #[arg(long, value_name = "INDEX")]
    pub device: Option<usize>,

    /// Number of work items per work group.
    #[arg(long, value_name = "INT")]
    pub work_group_size: Option<usize>,

    /// Layout of the pair space over the output buffer: 'dense' or 'triangular'.
    #[arg(long, value_name = "LAYOUT")]
    pub decomposition: Option<PairDecomposition>,

    // --- Electrostatics Overrides ---
    /// Energy units: 'kj-mol', 'kcal-mol' or 'ev'. Selects the Coulomb constant.
    #[arg(short, long, value_name = "UNITS", conflicts_with = "coulomb_constant")]
    pub units: Option<String>,

    /// Use an explicit Coulomb constant instead of a named unit system.
    #[arg(long, value_name = "FLOAT")]
    pub coulomb_constant: Option<f64>,

    /// Maximum relative difference accepted between the two backends.
    #[arg(long, value_name = "FLOAT")]
    pub tolerance: Option<f64>,

    // --- Output ---
    /// Write the per-pair contributions to a CSV file.
    #[arg(long, value_name = "PATH")]
    pub pairs_csv: Option<PathBuf>,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S electrostatics.scaling.third=0.8333
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}
