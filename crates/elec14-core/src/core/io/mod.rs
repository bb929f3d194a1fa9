//! Provides input/output for the plain-text system description and for
//! per-pair contribution tables.
//!
//! [`text`] reads the three whitespace-separated input streams (coordinates,
//! charges, bonds) into a validated system; [`pairs`] writes a CSV table of the
//! scaled pair contributions for inspection.

pub mod pairs;
pub mod text;
