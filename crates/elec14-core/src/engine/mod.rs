//! # Engine Module
//!
//! Runs the electrostatic evaluation over a validated [`ChargedSystem`](crate::core::models::system::ChargedSystem).
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - Backend selection, electrostatic constants and accelerator settings
//! - **Accelerator** ([`accelerator`]) - Platform/device selection and work-group dispatch of kernels
//! - **Decomposition** ([`decomposition`]) - Mapping of the pair space onto output slots
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress reporting
//! - **Error Handling** ([`error`]) - Engine-level error aggregation
//! - **Tasks** ([`tasks`]) - The serial reference evaluator and the parallel pair kernel
//!
//! Both evaluators accumulate pair contributions in `f64` in the same row-major
//! order and multiply by the Coulomb constant once, so they agree exactly.

pub mod accelerator;
pub mod config;
pub mod decomposition;
pub mod error;
pub mod progress;
pub mod tasks;
