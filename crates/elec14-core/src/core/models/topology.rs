use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Bond #{bond_index} references atom {atom}, but the system only has {atom_count} atoms")]
    BondOutOfRange {
        bond_index: usize,
        atom: usize,
        atom_count: usize,
    },
    #[error("Bond #{bond_index} connects atom {atom} to itself")]
    SelfBond { bond_index: usize, atom: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bond {
    pub i: usize, // Lower atom index
    pub j: usize, // Higher atom index
}

impl Bond {
    pub fn new(a: usize, b: usize) -> Self {
        if a <= b {
            Self { i: a, j: b }
        } else {
            Self { i: b, j: a }
        }
    }

    pub fn contains(&self, atom: usize) -> bool {
        self.i == atom || self.j == atom
    }

    pub fn is_self_bond(&self) -> bool {
        self.i == self.j
    }
}

impl From<(usize, usize)> for Bond {
    fn from((a, b): (usize, usize)) -> Self {
        Self::new(a, b)
    }
}

/// Compressed, read-only adjacency of the bond graph.
///
/// Neighbors of atom `a` occupy `neighbors[offsets[a]..offsets[a + 1]]`. The offset
/// sequence always has `atom_count + 1` entries, so the range of the last atom is
/// as well-defined as any other. Each bond contributes one entry to both of its
/// endpoints, in the order the bonds were supplied; duplicate bonds are kept as
/// duplicate entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BondGraph {
    neighbors: Vec<usize>,
    offsets: Vec<usize>,
}

impl BondGraph {
    /// Builds the compressed adjacency from raw bonds.
    ///
    /// # Errors
    ///
    /// Returns [`TopologyError::BondOutOfRange`] if a bond references an atom id
    /// `>= atom_count`, and [`TopologyError::SelfBond`] for a bond whose two ends
    /// are the same atom.
    pub fn build(atom_count: usize, bonds: &[Bond]) -> Result<Self, TopologyError> {
        let mut degrees = vec![0usize; atom_count];
        for (bond_index, bond) in bonds.iter().enumerate() {
            if bond.is_self_bond() {
                return Err(TopologyError::SelfBond {
                    bond_index,
                    atom: bond.i,
                });
            }
            // `j` is the larger endpoint, so checking it covers both.
            if bond.j >= atom_count {
                return Err(TopologyError::BondOutOfRange {
                    bond_index,
                    atom: bond.j,
                    atom_count,
                });
            }
            degrees[bond.i] += 1;
            degrees[bond.j] += 1;
        }

        let mut offsets = Vec::with_capacity(atom_count + 1);
        let mut running = 0usize;
        offsets.push(running);
        for degree in &degrees {
            running += degree;
            offsets.push(running);
        }

        let mut cursor: Vec<usize> = offsets[..atom_count].to_vec();
        let mut neighbors = vec![0usize; running];
        for bond in bonds {
            neighbors[cursor[bond.i]] = bond.j;
            cursor[bond.i] += 1;
            neighbors[cursor[bond.j]] = bond.i;
            cursor[bond.j] += 1;
        }

        Ok(Self { neighbors, offsets })
    }

    #[inline]
    pub fn atom_count(&self) -> usize {
        self.offsets.len() - 1
    }

    #[inline]
    pub fn bond_count(&self) -> usize {
        self.neighbors.len() / 2
    }

    /// Neighbor ids of `atom`. Panics if `atom >= atom_count()`.
    #[inline]
    pub fn neighbors(&self, atom: usize) -> &[usize] {
        &self.neighbors[self.offsets[atom]..self.offsets[atom + 1]]
    }

    #[inline]
    pub fn degree(&self, atom: usize) -> usize {
        self.offsets[atom + 1] - self.offsets[atom]
    }

    pub fn flat_neighbors(&self) -> &[usize] {
        &self.neighbors
    }

    pub fn offsets(&self) -> &[usize] {
        &self.offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bonds(pairs: &[(usize, usize)]) -> Vec<Bond> {
        pairs.iter().copied().map(Bond::from).collect()
    }

    #[test]
    fn bond_new_normalizes_endpoint_order() {
        let bond = Bond::new(7, 3);
        assert_eq!(bond.i, 3);
        assert_eq!(bond.j, 7);
        assert_eq!(bond, Bond::new(3, 7));
    }

    #[test]
    fn bond_contains_returns_true_for_both_atoms() {
        let bond = Bond::new(10, 20);
        assert!(bond.contains(10));
        assert!(bond.contains(20));
        assert!(!bond.contains(30));
    }

    #[test]
    fn build_produces_offsets_of_length_atom_count_plus_one() {
        let graph = BondGraph::build(4, &bonds(&[(0, 1), (1, 2), (2, 3)])).unwrap();
        assert_eq!(graph.offsets(), &[0, 1, 3, 5, 6]);
        assert_eq!(graph.atom_count(), 4);
        assert_eq!(graph.bond_count(), 3);
    }

    #[test]
    fn neighbor_sequence_length_is_twice_the_bond_count() {
        let graph = BondGraph::build(5, &bonds(&[(0, 1), (0, 2), (0, 3), (3, 4)])).unwrap();
        assert_eq!(graph.flat_neighbors().len(), 8);
    }

    #[test]
    fn neighbors_follow_bond_input_order() {
        let graph = BondGraph::build(4, &bonds(&[(0, 3), (0, 1), (2, 0)])).unwrap();
        assert_eq!(graph.neighbors(0), &[3, 1, 2]);
        assert_eq!(graph.neighbors(3), &[0]);
    }

    #[test]
    fn last_atom_has_a_well_defined_neighbor_range() {
        let graph = BondGraph::build(3, &bonds(&[(0, 2), (1, 2)])).unwrap();
        assert_eq!(graph.neighbors(2), &[0, 1]);
        assert_eq!(graph.degree(2), 2);
    }

    #[test]
    fn isolated_atoms_have_empty_neighbor_ranges() {
        let graph = BondGraph::build(3, &[]).unwrap();
        for atom in 0..3 {
            assert!(graph.neighbors(atom).is_empty());
        }
        assert_eq!(graph.offsets(), &[0, 0, 0, 0]);
    }

    #[test]
    fn duplicate_bonds_produce_duplicate_entries() {
        let graph = BondGraph::build(2, &bonds(&[(0, 1), (1, 0)])).unwrap();
        assert_eq!(graph.neighbors(0), &[1, 1]);
        assert_eq!(graph.neighbors(1), &[0, 0]);
        assert_eq!(graph.bond_count(), 2);
    }

    #[test]
    fn build_rejects_out_of_range_bond() {
        let result = BondGraph::build(3, &bonds(&[(0, 1), (1, 3)]));
        assert_eq!(
            result,
            Err(TopologyError::BondOutOfRange {
                bond_index: 1,
                atom: 3,
                atom_count: 3,
            })
        );
    }

    #[test]
    fn build_rejects_self_bond() {
        let result = BondGraph::build(3, &bonds(&[(2, 2)]));
        assert_eq!(
            result,
            Err(TopologyError::SelfBond {
                bond_index: 0,
                atom: 2,
            })
        );
    }

    #[test]
    fn build_handles_empty_system() {
        let graph = BondGraph::build(0, &[]).unwrap();
        assert_eq!(graph.atom_count(), 0);
        assert_eq!(graph.offsets(), &[0]);
    }
}
