//! # Force Field Module
//!
//! Electrostatic pair energy with topology-dependent scaling.
//!
//! ## Overview
//!
//! Every unordered atom pair contributes `scale(class) × qi × qk / r`, where the
//! class comes from the bond graph (see [`crate::core::topology`]) and the scale
//! factors default to the usual 1-2/1-3/1-4 scheme: 0, 0, 0.5 and 1 for pairs
//! further apart. Contributions are kept in reduced units; the Coulomb constant
//! converts the accumulated sum once, at the end of an evaluation.
//!
//! ## Key Components
//!
//! - [`params`] - Scale factors and the Coulomb constant of named unit systems
//! - [`energy`] - [`energy::EnergyCalculator`], the per-pair contribution with
//!   coincident-atom rejection
//!
//! ```ignore
//! use elec14::core::forcefield::{energy::EnergyCalculator, params::ExclusionScaling};
//!
//! let e = EnergyCalculator::contribution(class, qi, qk, dist, &ExclusionScaling::default())?;
//! ```

pub mod energy;
pub mod params;
pub(crate) mod potentials;
