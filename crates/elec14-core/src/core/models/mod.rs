//! # Core Models Module
//!
//! Immutable data structures describing the charged system under evaluation.
//!
//! ## Key Components
//!
//! - [`topology`] - Bonds and the compressed [`topology::BondGraph`] adjacency
//! - [`system`] - [`system::ChargedSystem`], the validated snapshot of positions,
//!   charges and bonds consumed by both evaluators
//!
//! ## Usage
//!
//! ```ignore
//! use elec14::core::models::{system::ChargedSystem, topology::Bond};
//!
//! let system = ChargedSystem::from_flat(
//!     &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0],
//!     vec![1.0, 1.0],
//!     vec![Bond::new(0, 1)],
//! )?;
//! ```

pub mod system;
pub mod topology;
