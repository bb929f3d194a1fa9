//! # Core Module
//!
//! The stateless foundation of elec14: data models, topological classification,
//! the electrostatic pair function and file I/O.
//!
//! ## Architecture
//!
//! - **Molecular Representation** ([`models`]) - Charged atoms and the compressed bond graph
//! - **Topological Distance** ([`topology`]) - 1-2/1-3/1-4 classification bounded to three bonds
//! - **Energy Function** ([`forcefield`]) - Scaled Coulomb contribution of a single pair
//! - **File I/O** ([`io`]) - Text input loading and CSV pair tables
//!
//! Everything here is immutable once built and safe to share across threads,
//! which is what lets the serial and parallel evaluators in [`crate::engine`] run
//! over the same snapshot in any order.

pub mod forcefield;
pub mod io;
pub mod models;
pub mod topology;
