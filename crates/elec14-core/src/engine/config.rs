use super::decomposition::PairDecomposition;
use crate::core::forcefield::params::ExclusionScaling;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_WORK_GROUP_SIZE: usize = 128;
pub const DEFAULT_RELATIVE_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for parameter '{parameter}': {reason}")]
    InvalidParameter {
        parameter: &'static str,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    Serial,
    Parallel,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(match self {
            Self::Serial => "serial",
            Self::Parallel => "parallel",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BackendSelection {
    Serial,
    Parallel,
    /// Run both and cross-validate.
    #[default]
    Both,
}

impl BackendSelection {
    pub fn backends(self) -> &'static [Backend] {
        match self {
            Self::Serial => &[Backend::Serial],
            Self::Parallel => &[Backend::Parallel],
            Self::Both => &[Backend::Serial, Backend::Parallel],
        }
    }

    pub fn includes(self, backend: Backend) -> bool {
        self.backends().contains(&backend)
    }
}

#[derive(Debug, Error)]
#[error("Invalid backend '{0}'. Expected 'serial', 'parallel' or 'both'.")]
pub struct ParseBackendError(String);

impl FromStr for BackendSelection {
    type Err = ParseBackendError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "serial" | "cpu" => Ok(Self::Serial),
            "parallel" | "accelerator" => Ok(Self::Parallel),
            "both" => Ok(Self::Both),
            _ => Err(ParseBackendError(s.to_string())),
        }
    }
}

impl fmt::Display for BackendSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Serial => "serial",
            Self::Parallel => "parallel",
            Self::Both => "both",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ElectrostaticsConfig {
    pub coulomb_constant: f64,
    pub scaling: ExclusionScaling,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceleratorConfig {
    pub platform_index: usize,
    pub device_index: usize,
    pub work_group_size: usize,
    /// Worker threads of the host device; `None` uses one per logical core.
    pub threads: Option<usize>,
}

impl Default for AcceleratorConfig {
    fn default() -> Self {
        Self {
            platform_index: 0,
            device_index: 0,
            work_group_size: DEFAULT_WORK_GROUP_SIZE,
            threads: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationConfig {
    pub backends: BackendSelection,
    pub electrostatics: ElectrostaticsConfig,
    pub accelerator: AcceleratorConfig,
    pub decomposition: PairDecomposition,
    pub relative_tolerance: f64,
}

#[derive(Default)]
pub struct EvaluationConfigBuilder {
    backends: Option<BackendSelection>,
    coulomb_constant: Option<f64>,
    scaling: Option<ExclusionScaling>,
    platform_index: Option<usize>,
    device_index: Option<usize>,
    work_group_size: Option<usize>,
    threads: Option<usize>,
    decomposition: Option<PairDecomposition>,
    relative_tolerance: Option<f64>,
}

impl EvaluationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backends(mut self, selection: BackendSelection) -> Self {
        self.backends = Some(selection);
        self
    }
    pub fn coulomb_constant(mut self, constant: f64) -> Self {
        self.coulomb_constant = Some(constant);
        self
    }
    pub fn scaling(mut self, scaling: ExclusionScaling) -> Self {
        self.scaling = Some(scaling);
        self
    }
    pub fn platform_index(mut self, index: usize) -> Self {
        self.platform_index = Some(index);
        self
    }
    pub fn device_index(mut self, index: usize) -> Self {
        self.device_index = Some(index);
        self
    }
    pub fn work_group_size(mut self, size: usize) -> Self {
        self.work_group_size = Some(size);
        self
    }
    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }
    pub fn decomposition(mut self, decomposition: PairDecomposition) -> Self {
        self.decomposition = Some(decomposition);
        self
    }
    pub fn relative_tolerance(mut self, tolerance: f64) -> Self {
        self.relative_tolerance = Some(tolerance);
        self
    }

    pub fn build(self) -> Result<EvaluationConfig, ConfigError> {
        let coulomb_constant = self
            .coulomb_constant
            .ok_or(ConfigError::MissingParameter("coulomb_constant"))?;
        if !(coulomb_constant.is_finite() && coulomb_constant > 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "coulomb_constant",
                reason: format!("must be a positive finite number, got {coulomb_constant}"),
            });
        }

        let scaling = self.scaling.unwrap_or_default();
        if let Some(class) = scaling.first_invalid() {
            return Err(ConfigError::InvalidParameter {
                parameter: "scaling",
                reason: format!("factor for {class} pairs is not finite"),
            });
        }

        let work_group_size = self.work_group_size.unwrap_or(DEFAULT_WORK_GROUP_SIZE);
        if work_group_size == 0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "work_group_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.threads == Some(0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "threads",
                reason: "must be at least 1".to_string(),
            });
        }

        let relative_tolerance = self
            .relative_tolerance
            .unwrap_or(DEFAULT_RELATIVE_TOLERANCE);
        if !(relative_tolerance.is_finite() && relative_tolerance >= 0.0) {
            return Err(ConfigError::InvalidParameter {
                parameter: "relative_tolerance",
                reason: format!("must be a non-negative finite number, got {relative_tolerance}"),
            });
        }

        Ok(EvaluationConfig {
            backends: self.backends.unwrap_or_default(),
            electrostatics: ElectrostaticsConfig {
                coulomb_constant,
                scaling,
            },
            accelerator: AcceleratorConfig {
                platform_index: self.platform_index.unwrap_or(0),
                device_index: self.device_index.unwrap_or(0),
                work_group_size,
                threads: self.threads,
            },
            decomposition: self.decomposition.unwrap_or_default(),
            relative_tolerance,
        })
    }
}
