use super::topology::{Bond, BondGraph, TopologyError};
use nalgebra::Point3;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SystemError {
    #[error("Coordinate sequence has {len} values, which is not a multiple of 3")]
    CoordinateLength { len: usize },
    #[error("Atom count ({atoms}) does not match charge count ({charges})")]
    CountMismatch { atoms: usize, charges: usize },
    #[error("Atom {atom} has a non-finite coordinate")]
    NonFiniteCoordinate { atom: usize },
    #[error("Atom {atom} has a non-finite charge ({charge})")]
    NonFiniteCharge { atom: usize, charge: f64 },
    #[error("Invalid bond topology: {0}")]
    Topology(#[from] TopologyError),
}

/// An immutable snapshot of charged point atoms and their bond graph.
///
/// Positions and charges are index-aligned: atom `a` sits at `positions[a]` and
/// carries `charges[a]`. The compressed [`BondGraph`] is built once in the
/// constructor, so every topology error surfaces before any evaluation starts.
#[derive(Debug, Clone)]
pub struct ChargedSystem {
    positions: Vec<Point3<f64>>,
    charges: Vec<f64>,
    bonds: Vec<Bond>,
    graph: BondGraph,
}

impl ChargedSystem {
    /// Creates a validated system from positions, charges and bonds.
    ///
    /// # Errors
    ///
    /// Returns [`SystemError`] if the atom and charge counts differ, if any
    /// coordinate or charge is not finite, or if the bonds do not form a valid
    /// topology for `positions.len()` atoms.
    pub fn new(
        positions: Vec<Point3<f64>>,
        charges: Vec<f64>,
        bonds: Vec<Bond>,
    ) -> Result<Self, SystemError> {
        if positions.len() != charges.len() {
            return Err(SystemError::CountMismatch {
                atoms: positions.len(),
                charges: charges.len(),
            });
        }
        if let Some(atom) = positions
            .iter()
            .position(|p| !p.coords.iter().all(|c| c.is_finite()))
        {
            return Err(SystemError::NonFiniteCoordinate { atom });
        }
        if let Some(atom) = charges.iter().position(|q| !q.is_finite()) {
            return Err(SystemError::NonFiniteCharge {
                atom,
                charge: charges[atom],
            });
        }

        let graph = BondGraph::build(positions.len(), &bonds)?;

        Ok(Self {
            positions,
            charges,
            bonds,
            graph,
        })
    }

    /// Creates a system from a flat `x y z` coordinate sequence of length `3 × N`.
    pub fn from_flat(
        coordinates: &[f64],
        charges: Vec<f64>,
        bonds: Vec<Bond>,
    ) -> Result<Self, SystemError> {
        if coordinates.len() % 3 != 0 {
            return Err(SystemError::CoordinateLength {
                len: coordinates.len(),
            });
        }
        let positions = coordinates
            .chunks_exact(3)
            .map(|xyz| Point3::new(xyz[0], xyz[1], xyz[2]))
            .collect();
        Self::new(positions, charges, bonds)
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn position(&self, atom: usize) -> &Point3<f64> {
        &self.positions[atom]
    }

    #[inline]
    pub fn charge(&self, atom: usize) -> f64 {
        self.charges[atom]
    }

    pub fn positions(&self) -> &[Point3<f64>] {
        &self.positions
    }

    pub fn charges(&self) -> &[f64] {
        &self.charges
    }

    pub fn bonds(&self) -> &[Bond] {
        &self.bonds
    }

    pub fn graph(&self) -> &BondGraph {
        &self.graph
    }

    /// Euclidean distance between two atoms in Angstroms.
    #[inline]
    pub fn distance(&self, a: usize, b: usize) -> f64 {
        nalgebra::distance(&self.positions[a], &self.positions[b])
    }

    /// Number of unordered atom pairs, `N(N-1)/2`.
    pub fn pair_count(&self) -> usize {
        let n = self.atom_count();
        n * n.saturating_sub(1) / 2
    }
}
