use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// How the pair space of `N` atoms is laid out over the slots of the parallel
/// output buffer. Both layouts give every unordered pair `i < j` exactly one slot
/// and visit pairs in row-major order, so summing the buffer front to back adds
/// the same terms in the same order as the serial evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PairDecomposition {
    /// `N²` slots, slot `p` ↦ `(p / N, p % N)`; slots with `i >= k` hold zero.
    /// Wastes half the buffer in exchange for a uniform, branch-free mapping.
    #[default]
    Dense,
    /// `N(N-1)/2` slots, one per unordered pair, with no idle work items.
    Triangular,
}

#[derive(Debug, Error)]
#[error("Invalid pair decomposition '{0}'. Expected 'dense' or 'triangular'.")]
pub struct ParseDecompositionError(String);

impl FromStr for PairDecomposition {
    type Err = ParseDecompositionError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "dense" => Ok(Self::Dense),
            "triangular" | "packed" => Ok(Self::Triangular),
            _ => Err(ParseDecompositionError(s.to_string())),
        }
    }
}

impl fmt::Display for PairDecomposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Dense => "dense",
            Self::Triangular => "triangular",
        })
    }
}

impl PairDecomposition {
    /// Number of output slots for `n` atoms, or `None` if it overflows `usize`.
    pub fn slot_count(self, n: usize) -> Option<usize> {
        match self {
            Self::Dense => n.checked_mul(n),
            Self::Triangular => n
                .checked_mul(n.saturating_sub(1))
                .map(|twice| twice / 2),
        }
    }

    /// The pair written to `slot`, or `None` for a dense slot that holds no pair.
    #[inline]
    pub fn pair_for_slot(self, slot: usize, n: usize) -> Option<(usize, usize)> {
        match self {
            Self::Dense => {
                let (i, k) = (slot / n, slot % n);
                (i < k).then_some((i, k))
            }
            Self::Triangular => Some(triangular_pair(slot, n)),
        }
    }

    /// The slot owned by pair `i < j`.
    pub fn slot_for_pair(self, i: usize, j: usize, n: usize) -> usize {
        debug_assert!(i < j && j < n);
        match self {
            Self::Dense => i * n + j,
            Self::Triangular => row_start(i, n) + (j - i - 1),
        }
    }
}

#[inline]
fn row_start(i: usize, n: usize) -> usize {
    i * (2 * n - i - 1) / 2
}

// Inverts `row_start`: estimate the row from the quadratic, then correct the
// estimate against the exact integer row bounds.
fn triangular_pair(slot: usize, n: usize) -> (usize, usize) {
    let b = (2 * n - 1) as f64;
    let estimate = ((b - (b * b - 8.0 * slot as f64).max(0.0).sqrt()) / 2.0).floor();
    let mut i = (estimate.max(0.0) as usize).min(n.saturating_sub(2));
    while i > 0 && row_start(i, n) > slot {
        i -= 1;
    }
    while i + 1 < n && row_start(i + 1, n) <= slot {
        i += 1;
    }
    let j = slot - row_start(i, n) + i + 1;
    (i, j)
}
