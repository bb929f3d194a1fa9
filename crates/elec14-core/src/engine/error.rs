use thiserror::Error;

use super::accelerator::AcceleratorError;
use super::config::ConfigError;
use crate::core::forcefield::energy::PairEnergyError;
use crate::core::models::system::SystemError;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Invalid input: {0}")]
    InvalidInput(#[from] SystemError),

    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(#[from] PairEnergyError),

    #[error("Total energy is not finite ({energy}); charges or the Coulomb constant overflow f64")]
    NonFiniteEnergy { energy: f64 },

    #[error("Accelerator setup failed: {0}")]
    AcceleratorSetup(#[from] AcceleratorError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error(
        "Serial ({serial}) and parallel ({parallel}) energies differ by a relative {relative_difference:e}, above the tolerance of {tolerance:e}"
    )]
    BackendDisagreement {
        serial: f64,
        parallel: f64,
        relative_difference: f64,
        tolerance: f64,
    },

    #[error("Internal logic error: {0}")]
    Internal(String),
}
