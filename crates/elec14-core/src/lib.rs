//! # elec14 Core Library
//!
//! Intramolecular electrostatic energy of a bonded, point-charge molecule, with
//! the 1-2, 1-3 and 1-4 exclusion rules applied from the bond topology.
//!
//! ## Architectural Philosophy
//!
//! The library follows a three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Immutable data models (`ChargedSystem`, the
//!   compressed `BondGraph`), the topological classifier, the pair-energy function
//!   and file I/O.
//!
//! - **[`engine`]: The Evaluators.** Configuration, the serial reference
//!   evaluator, and the parallel evaluator that expresses the pair loop as a kernel
//!   dispatched in work groups by an `Accelerator`.
//!
//! - **[`workflows`]: The Public API.** Runs the configured backends, times them,
//!   and cross-validates their results.
//!
//! ## Example
//!
//! ```no_run
//! use elec14::core::forcefield::params::DEFAULT_COULOMB_CONSTANT;
//! use elec14::engine::config::EvaluationConfigBuilder;
//! use elec14::engine::progress::ProgressReporter;
//! use elec14::workflows::evaluate;
//!
//! let config = EvaluationConfigBuilder::new()
//!     .coulomb_constant(DEFAULT_COULOMB_CONSTANT)
//!     .build()?;
//! let report = evaluate::run_from_raw(
//!     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
//!     &[1.0, 1.0],
//!     &[],
//!     &config,
//!     &ProgressReporter::new(),
//! )?;
//! println!("{:.4}", report.energy());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod core;
pub mod engine;
pub mod workflows;
