/// Pairs closer than this (in Angstroms) are treated as coincident.
pub const MIN_PAIR_DISTANCE: f64 = 1e-6;

/// Coulomb interaction without the unit-conversion constant: `q1 * q2 / dist`.
///
/// The constant is applied once to the accumulated sum by the evaluators.
#[inline]
pub fn reduced_coulomb(dist: f64, q1: f64, q2: f64) -> f64 {
    q1 * q2 / dist
}

#[inline]
pub fn is_coincident(dist: f64) -> bool {
    !(dist >= MIN_PAIR_DISTANCE)
}
