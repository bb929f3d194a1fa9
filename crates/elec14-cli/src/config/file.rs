use crate::error::{CliError, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileScalingConfig {
    pub direct: Option<f64>,
    pub second: Option<f64>,
    pub third: Option<f64>,
    pub far: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileElectrostaticsConfig {
    pub units: Option<String>,
    #[serde(rename = "coulomb-constant")]
    pub coulomb_constant: Option<f64>,
    pub scaling: Option<FileScalingConfig>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileAcceleratorConfig {
    pub platform: Option<usize>,
    pub device: Option<usize>,
    #[serde(rename = "work-group-size")]
    pub work_group_size: Option<usize>,
    pub decomposition: Option<String>,
    pub threads: Option<usize>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileValidationConfig {
    #[serde(rename = "relative-tolerance")]
    pub relative_tolerance: Option<f64>,
}

#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub backend: Option<String>,
    pub electrostatics: Option<FileElectrostaticsConfig>,
    pub accelerator: Option<FileAcceleratorConfig>,
    pub validation: Option<FileValidationConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }
}
