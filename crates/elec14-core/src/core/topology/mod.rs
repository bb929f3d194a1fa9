//! Topological distance between atoms of the bond graph.
//!
//! The [`exclusion`] module classifies atom pairs into 1-2, 1-3, 1-4 and far
//! classes with a search bounded to three bonds, either one pair at a time
//! ([`exclusion::classify`]) or one atom's whole neighborhood at a time
//! ([`exclusion::ExclusionShells`]).

pub mod exclusion;
