use super::defaults::DefaultsConfig;
use super::file::{FileConfig, FileElectrostaticsConfig, FileScalingConfig};
use super::models::AppConfig;
use crate::cli::EvaluateArgs;
use crate::error::{CliError, Result};
use elec14::core::forcefield::params::{ExclusionScaling, coulomb_constant_for, known_units};
use elec14::core::io::text::InputPaths;
use elec14::engine::config::{BackendSelection, EvaluationConfigBuilder};
use elec14::engine::decomposition::PairDecomposition;
use elec14::engine::error::EngineError;
use std::str::FromStr;

const CUSTOM_UNITS: &str = "custom";

pub fn build_config(args: &EvaluateArgs, threads: Option<usize>) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = if let Some(config_path) = &args.config {
        FileConfig::from_file(config_path)?
    } else {
        FileConfig::default()
    };

    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let backend = match (args.backend, file_config.backend.as_deref()) {
        (Some(backend), _) => backend,
        (None, Some(name)) => BackendSelection::from_str(name)
            .map_err(|e| CliError::Config(e.to_string()))?,
        (None, None) => defaults.backend,
    };

    let es_file = file_config.electrostatics.take().unwrap_or_default();
    let (coulomb_constant, units_label) = resolve_coulomb_constant(args, &es_file, &defaults)?;
    let scaling = merge_scaling(es_file.scaling);

    let acc_file = file_config.accelerator.take().unwrap_or_default();
    let decomposition = match (args.decomposition, acc_file.decomposition.as_deref()) {
        (Some(decomposition), _) => decomposition,
        (None, Some(name)) => PairDecomposition::from_str(name)
            .map_err(|e| CliError::Config(e.to_string()))?,
        (None, None) => defaults.decomposition,
    };

    let relative_tolerance = args
        .tolerance
        .or(file_config
            .validation
            .as_ref()
            .and_then(|v| v.relative_tolerance))
        .unwrap_or(defaults.relative_tolerance);

    let mut builder = EvaluationConfigBuilder::new()
        .backends(backend)
        .coulomb_constant(coulomb_constant)
        .scaling(scaling)
        .platform_index(args.platform.or(acc_file.platform).unwrap_or(defaults.platform))
        .device_index(args.device.or(acc_file.device).unwrap_or(defaults.device))
        .work_group_size(
            args.work_group_size
                .or(acc_file.work_group_size)
                .unwrap_or(defaults.work_group_size),
        )
        .decomposition(decomposition)
        .relative_tolerance(relative_tolerance);
    if let Some(threads) = threads.or(acc_file.threads) {
        builder = builder.threads(threads);
    }
    let core_config = builder.build().map_err(EngineError::from)?;

    let in_dir = InputPaths::in_dir(&args.input_dir);
    let inputs = InputPaths {
        atoms: args.atoms.clone().unwrap_or(in_dir.atoms),
        charges: args.charges.clone().unwrap_or(in_dir.charges),
        bonds: args.bonds.clone().unwrap_or(in_dir.bonds),
    };

    Ok(AppConfig {
        inputs,
        pairs_csv: args.pairs_csv.clone(),
        units_label,
        core_config,
    })
}

fn resolve_coulomb_constant(
    args: &EvaluateArgs,
    file: &FileElectrostaticsConfig,
    defaults: &DefaultsConfig,
) -> Result<(f64, String)> {
    if let Some(constant) = args.coulomb_constant {
        return Ok((constant, CUSTOM_UNITS.to_string()));
    }
    if let Some(units) = &args.units {
        return named_units(units);
    }
    match (file.coulomb_constant, file.units.as_deref()) {
        (Some(_), Some(_)) => Err(CliError::Config(
            "`electrostatics.units` and `electrostatics.coulomb-constant` are mutually exclusive."
                .to_string(),
        )),
        (Some(constant), None) => Ok((constant, CUSTOM_UNITS.to_string())),
        (None, Some(units)) => named_units(units),
        (None, None) => named_units(&defaults.units),
    }
}

fn named_units(units: &str) -> Result<(f64, String)> {
    let constant = coulomb_constant_for(units).ok_or_else(|| {
        CliError::Argument(format!(
            "Unknown units '{}'. Expected one of: {}.",
            units,
            known_units().join(", ")
        ))
    })?;
    Ok((constant, units.to_lowercase()))
}

fn merge_scaling(file_val: Option<FileScalingConfig>) -> ExclusionScaling {
    let defaults = ExclusionScaling::default();
    let file_val = file_val.unwrap_or_default();
    ExclusionScaling {
        direct: file_val.direct.unwrap_or(defaults.direct),
        second: file_val.second.unwrap_or(defaults.second),
        third: file_val.third.unwrap_or(defaults.third),
        far: file_val.far.unwrap_or(defaults.far),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value.parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value))
    })
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value_str)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{}'. Expected KEY=VALUE.",
                kv_pair
            )));
        };

        match key {
            "backend" => config.backend = Some(value_str.to_string()),
            // `units` and `coulomb-constant` are alternatives; an override replaces both.
            "electrostatics.units" => {
                let electrostatics = config.electrostatics.get_or_insert_with(Default::default);
                electrostatics.units = Some(value_str.to_string());
                electrostatics.coulomb_constant = None;
            }
            "electrostatics.coulomb-constant" => {
                let electrostatics = config.electrostatics.get_or_insert_with(Default::default);
                electrostatics.coulomb_constant = Some(parse_value(key, value_str)?);
                electrostatics.units = None;
            }
            "electrostatics.scaling.direct"
            | "electrostatics.scaling.second"
            | "electrostatics.scaling.third"
            | "electrostatics.scaling.far" => {
                let factor = Some(parse_value(key, value_str)?);
                let scaling = config
                    .electrostatics
                    .get_or_insert_with(Default::default)
                    .scaling
                    .get_or_insert_with(Default::default);
                match key.rsplit('.').next() {
                    Some("direct") => scaling.direct = factor,
                    Some("second") => scaling.second = factor,
                    Some("third") => scaling.third = factor,
                    _ => scaling.far = factor,
                }
            }
            "accelerator.platform" => {
                config.accelerator.get_or_insert_with(Default::default).platform =
                    Some(parse_value(key, value_str)?);
            }
            "accelerator.device" => {
                config.accelerator.get_or_insert_with(Default::default).device =
                    Some(parse_value(key, value_str)?);
            }
            "accelerator.work-group-size" => {
                config
                    .accelerator
                    .get_or_insert_with(Default::default)
                    .work_group_size = Some(parse_value(key, value_str)?);
            }
            "accelerator.decomposition" => {
                config
                    .accelerator
                    .get_or_insert_with(Default::default)
                    .decomposition = Some(value_str.to_string());
            }
            "accelerator.threads" => {
                config.accelerator.get_or_insert_with(Default::default).threads =
                    Some(parse_value(key, value_str)?);
            }
            "validation.relative-tolerance" => {
                config
                    .validation
                    .get_or_insert_with(Default::default)
                    .relative_tolerance = Some(parse_value(key, value_str)?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{}'",
                    key
                )));
            }
        }
    }
    Ok(config)
}
