use crate::cli::EvaluateArgs;
use crate::config::{AppConfig, build_config};
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use elec14::core::io::pairs::{PairTableError, write_pair_table_to_path};
use elec14::core::io::text::{InputFile, InputPaths, TextInput, TextInputError};
use elec14::core::topology::exclusion::ExclusionClass;
use elec14::engine::error::EngineError;
use elec14::engine::progress::ProgressReporter;
use elec14::workflows::evaluate::{self, EvaluationReport};
use std::fmt::Write;
use std::path::Path;
use tracing::info;

pub fn run(args: EvaluateArgs, threads: Option<usize>) -> Result<()> {
    info!("Merging configuration from defaults, file and CLI arguments...");
    let AppConfig {
        inputs,
        pairs_csv,
        units_label,
        core_config,
    } = build_config(&args, threads)?;

    info!("Loading input system from {:?}", &inputs);
    let system = TextInput::read_from_paths(&inputs).map_err(|e| input_error(&inputs, e))?;
    println!(
        "Loaded {} atoms and {} bonds.",
        system.atom_count(),
        system.bonds().len()
    );

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    info!("Invoking the evaluation workflow...");
    let report = evaluate::run(&system, &core_config, &reporter)?;
    print!("{}", format_report(&report, &units_label));

    if let Some(path) = pairs_csv {
        let rows = write_pair_table_to_path(&system, &core_config.electrostatics.scaling, &path)
            .map_err(|e| pair_table_error(&path, e))?;
        info!(rows, "Pair table written.");
        println!("✓ {} pair contributions written to: {}", rows, path.display());
    }

    Ok(())
}

fn input_error(paths: &InputPaths, error: TextInputError) -> CliError {
    let path = match error {
        TextInputError::System(source) => return EngineError::InvalidInput(source).into(),
        TextInputError::Open { ref path, .. } => path.clone(),
        TextInputError::Io { file, .. } | TextInputError::InvalidNumber { file, .. } => {
            match file {
                InputFile::Atoms => paths.atoms.clone(),
                InputFile::Charges => paths.charges.clone(),
                InputFile::Bonds => paths.bonds.clone(),
            }
        }
        TextInputError::DanglingBondToken { .. } => paths.bonds.clone(),
    };
    CliError::FileParsing {
        path,
        source: error.into(),
    }
}

fn pair_table_error(path: &Path, error: PairTableError) -> CliError {
    match error {
        PairTableError::Energy(source) => EngineError::DegenerateGeometry(source).into(),
        other => CliError::FileParsing {
            path: path.to_path_buf(),
            source: other.into(),
        },
    }
}

fn format_report(report: &EvaluationReport, units_label: &str) -> String {
    let census = &report.census;
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Pairs: {} total ({} {}, {} {}, {} {}, {} {})",
        census.total(),
        census.direct,
        ExclusionClass::Direct,
        census.second,
        ExclusionClass::Second,
        census.third,
        ExclusionClass::Third,
        census.far,
        ExclusionClass::Far,
    );
    for result in &report.results {
        let device = result
            .device
            .as_deref()
            .map(|name| format!(" on {}", name))
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "{:<8} time: {:>10.3} ms{}",
            result.backend,
            result.elapsed.as_secs_f64() * 1e3,
            device
        );
        let _ = writeln!(
            out,
            "{:<8} energy: {:.6} ({})",
            result.backend, result.energy, units_label
        );
    }
    if let Some(difference) = report.relative_difference {
        let _ = writeln!(out, "Backends agree (relative difference {:e}).", difference);
    }
    out
}
