use crate::core::models::topology::BondGraph;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, AddAssign};

/// Deepest bond separation that still changes how a pair interacts.
pub const MAX_EXCLUSION_DEPTH: u8 = 3;

/// Topological separation of two atoms, following the 1-2/1-3/1-4 scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ExclusionClass {
    /// 1-2 pair: the atoms share a bond.
    Direct,
    /// 1-3 pair: two bonds apart.
    Second,
    /// 1-4 pair: three bonds apart.
    Third,
    /// More than three bonds apart, or not connected at all.
    Far,
}

impl ExclusionClass {
    pub const ALL: [ExclusionClass; 4] = [Self::Direct, Self::Second, Self::Third, Self::Far];

    /// Maps a bond separation to its class; anything beyond three bonds is `Far`.
    pub fn from_hops(hops: u8) -> Self {
        match hops {
            1 => Self::Direct,
            2 => Self::Second,
            3 => Self::Third,
            _ => Self::Far,
        }
    }

    pub fn hops(self) -> Option<u8> {
        match self {
            Self::Direct => Some(1),
            Self::Second => Some(2),
            Self::Third => Some(3),
            Self::Far => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "1-2",
            Self::Second => "1-3",
            Self::Third => "1-4",
            Self::Far => "far",
        }
    }
}

impl fmt::Display for ExclusionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classifies the topological separation of atoms `i` and `k` (`i != k`).
///
/// The search is level ordered: level `d` asks whether `k` can be reached from `i`
/// by a walk of exactly `d` bonds, for `d = 1..=3`, and returns as soon as one
/// level hits. Since the shorter levels are tested first, the first hit is the
/// shortest bond path, which makes the result symmetric. Every expansion reads the
/// neighbor range of the node being expanded, and the search allocates nothing,
/// so it can run as the body of an independent work item.
pub fn classify(graph: &BondGraph, i: usize, k: usize) -> ExclusionClass {
    debug_assert_ne!(i, k, "an atom has no exclusion class with itself");
    for depth in 1..=MAX_EXCLUSION_DEPTH {
        if walk_reaches(graph, i, k, depth) {
            return ExclusionClass::from_hops(depth);
        }
    }
    ExclusionClass::Far
}

fn walk_reaches(graph: &BondGraph, node: usize, target: usize, steps: u8) -> bool {
    let neighbors = graph.neighbors(node);
    if steps == 1 {
        return neighbors.contains(&target);
    }
    neighbors
        .iter()
        .any(|&next| walk_reaches(graph, next, target, steps - 1))
}

/// The hop-1, hop-2 and hop-3 neighbor sets of a single atom.
///
/// Built with an explicit frontier expansion so a whole row of pairs can be
/// classified with one search. The origin itself is never a member; every atom
/// not listed is [`ExclusionClass::Far`] from the origin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionShells {
    origin: usize,
    members: Vec<(usize, ExclusionClass)>,
}

impl ExclusionShells {
    pub fn around(graph: &BondGraph, origin: usize) -> Self {
        let mut reached: BTreeMap<usize, ExclusionClass> = BTreeMap::new();
        let mut frontier = vec![origin];

        for depth in 1..=MAX_EXCLUSION_DEPTH {
            let class = ExclusionClass::from_hops(depth);
            let mut next = Vec::new();
            for &node in &frontier {
                for &neighbor in graph.neighbors(node) {
                    if neighbor == origin || reached.contains_key(&neighbor) {
                        continue;
                    }
                    reached.insert(neighbor, class);
                    next.push(neighbor);
                }
            }
            if next.is_empty() {
                break;
            }
            frontier = next;
        }

        Self {
            origin,
            members: reached.into_iter().collect(),
        }
    }

    pub fn origin(&self) -> usize {
        self.origin
    }

    pub fn class_of(&self, atom: usize) -> ExclusionClass {
        match self.members.binary_search_by_key(&atom, |&(member, _)| member) {
            Ok(idx) => self.members[idx].1,
            Err(_) => ExclusionClass::Far,
        }
    }

    /// Members in ascending atom order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, ExclusionClass)> + '_ {
        self.members.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Number of unordered atom pairs in each exclusion class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PairCensus {
    pub direct: usize,
    pub second: usize,
    pub third: usize,
    pub far: usize,
}

impl PairCensus {
    /// Counts the pairs of every class without enumerating all `N(N-1)/2` pairs;
    /// only shell members are visited and the remainder is `Far`.
    pub fn tally(graph: &BondGraph) -> Self {
        let n = graph.atom_count();
        let mut census = Self::default();
        for i in 0..n {
            let shells = ExclusionShells::around(graph, i);
            for (atom, class) in shells.iter() {
                if atom > i {
                    census.record(class);
                }
            }
        }
        let total = n * n.saturating_sub(1) / 2;
        census.far = total - (census.direct + census.second + census.third);
        census
    }

    pub fn record(&mut self, class: ExclusionClass) {
        match class {
            ExclusionClass::Direct => self.direct += 1,
            ExclusionClass::Second => self.second += 1,
            ExclusionClass::Third => self.third += 1,
            ExclusionClass::Far => self.far += 1,
        }
    }

    pub fn count(&self, class: ExclusionClass) -> usize {
        match class {
            ExclusionClass::Direct => self.direct,
            ExclusionClass::Second => self.second,
            ExclusionClass::Third => self.third,
            ExclusionClass::Far => self.far,
        }
    }

    #[inline]
    pub fn total(&self) -> usize {
        self.direct + self.second + self.third + self.far
    }
}

impl Add for PairCensus {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            direct: self.direct + rhs.direct,
            second: self.second + rhs.second,
            third: self.third + rhs.third,
            far: self.far + rhs.far,
        }
    }
}

impl AddAssign for PairCensus {
    fn add_assign(&mut self, rhs: Self) {
        self.direct += rhs.direct;
        self.second += rhs.second;
        self.third += rhs.third;
        self.far += rhs.far;
    }
}
