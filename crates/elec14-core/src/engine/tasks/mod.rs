//! Energy evaluation tasks.
//!
//! Both tasks compute the same quantity over the same immutable system. The
//! serial task is the single-threaded reference; the parallel task expresses the
//! pair loop as a kernel and hands it to an [`Accelerator`](super::accelerator::Accelerator).

use crate::engine::error::EngineError;

pub mod parallel;
pub mod serial;

/// Applies the Coulomb constant to a reduced sum, rejecting overflow.
fn scaled_energy(coulomb_constant: f64, sum: f64) -> Result<f64, EngineError> {
    let energy = coulomb_constant * sum;
    if energy.is_finite() {
        Ok(energy)
    } else {
        Err(EngineError::NonFiniteEnergy { energy })
    }
}
