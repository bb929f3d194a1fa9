use crate::core::topology::exclusion::ExclusionClass;
use phf::{Map, phf_map};

pub const DEFAULT_COULOMB_CONSTANT: f64 = 1389.38757; // In kJ·Å/(mol·e²)

static COULOMB_CONSTANTS: Map<&'static str, f64> = phf_map! {
    "kj-mol" => 1389.38757,
    "kcal-mol" => 332.0637,
    "ev" => 14.399645,
};

/// Looks up the Coulomb constant of a named unit system (case-insensitive).
pub fn coulomb_constant_for(units: &str) -> Option<f64> {
    COULOMB_CONSTANTS
        .get(units.to_ascii_lowercase().as_str())
        .copied()
}

/// Names accepted by [`coulomb_constant_for`], sorted.
pub fn known_units() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = COULOMB_CONSTANTS.keys().copied().collect();
    names.sort_unstable();
    names
}

/// Scale factors applied to a pair's Coulomb term by exclusion class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExclusionScaling {
    pub direct: f64,
    pub second: f64,
    pub third: f64,
    pub far: f64,
}

impl Default for ExclusionScaling {
    fn default() -> Self {
        Self {
            direct: 0.0,
            second: 0.0,
            third: 0.5,
            far: 1.0,
        }
    }
}

impl ExclusionScaling {
    #[inline]
    pub fn factor(&self, class: ExclusionClass) -> f64 {
        match class {
            ExclusionClass::Direct => self.direct,
            ExclusionClass::Second => self.second,
            ExclusionClass::Third => self.third,
            ExclusionClass::Far => self.far,
        }
    }

    /// Returns the first class whose factor is not finite.
    pub fn first_invalid(&self) -> Option<ExclusionClass> {
        ExclusionClass::ALL
            .into_iter()
            .find(|&class| !self.factor(class).is_finite())
    }
}
