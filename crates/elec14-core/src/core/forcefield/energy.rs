use super::params::ExclusionScaling;
use super::potentials;
use crate::core::models::system::ChargedSystem;
use crate::core::topology::exclusion::ExclusionClass;
use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum EnergyCalculationError {
    #[error("Atoms are coincident (distance {distance:e} Å)")]
    CoincidentAtoms { distance: f64 },

    #[error("Pair energy overflows f64 ({value})")]
    NonFinite { value: f64 },
}

#[derive(Debug, Error, Clone, Copy, PartialEq)]
#[error("Pair ({i}, {k}): {source}")]
pub struct PairEnergyError {
    pub i: usize,
    pub k: usize,
    #[source]
    pub source: EnergyCalculationError,
}

pub struct EnergyCalculator;

impl EnergyCalculator {
    /// Scaled, reduced Coulomb contribution of one pair: `scale(class) × qi × qk / dist`.
    ///
    /// Coincident atoms are rejected for every class, including the excluded
    /// ones, and so is a product that overflows, so no infinity or NaN ever
    /// reaches an accumulator. Pairs whose scale factor is zero contribute
    /// exactly `0.0`.
    pub fn contribution(
        class: ExclusionClass,
        qi: f64,
        qk: f64,
        dist: f64,
        scaling: &ExclusionScaling,
    ) -> Result<f64, EnergyCalculationError> {
        if potentials::is_coincident(dist) {
            return Err(EnergyCalculationError::CoincidentAtoms { distance: dist });
        }
        let scale = scaling.factor(class);
        if scale == 0.0 {
            return Ok(0.0);
        }
        let value = scale * potentials::reduced_coulomb(dist, qi, qk);
        if !value.is_finite() {
            return Err(EnergyCalculationError::NonFinite { value });
        }
        Ok(value)
    }

    /// Contribution of atoms `i` and `k` of `system`, whose class is already known.
    #[inline]
    pub fn pair(
        system: &ChargedSystem,
        i: usize,
        k: usize,
        class: ExclusionClass,
        scaling: &ExclusionScaling,
    ) -> Result<f64, PairEnergyError> {
        let dist = system.distance(i, k);
        Self::contribution(class, system.charge(i), system.charge(k), dist, scaling)
            .map_err(|source| PairEnergyError { i, k, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::Bond;
    use nalgebra::Point3;

    const TOLERANCE: f64 = 1e-12;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() < TOLERANCE
    }

    #[test]
    fn excluded_classes_contribute_exactly_zero() {
        let scaling = ExclusionScaling::default();
        for class in [ExclusionClass::Direct, ExclusionClass::Second] {
            let energy = EnergyCalculator::contribution(class, 1.0, -1.0, 1.5, &scaling).unwrap();
            assert_eq!(energy, 0.0);
        }
    }

    #[test]
    fn third_class_is_halved() {
        let scaling = ExclusionScaling::default();
        let energy =
            EnergyCalculator::contribution(ExclusionClass::Third, 1.0, 1.0, 2.0, &scaling).unwrap();
        assert!(f64_approx_equal(energy, 0.25));
    }

    #[test]
    fn far_class_is_unscaled() {
        let scaling = ExclusionScaling::default();
        let energy =
            EnergyCalculator::contribution(ExclusionClass::Far, 0.5, -0.8, 4.0, &scaling).unwrap();
        assert!(f64_approx_equal(energy, -0.1));
    }

    #[test]
    fn custom_scaling_is_respected() {
        let scaling = ExclusionScaling {
            third: 1.0 / 1.2,
            ..Default::default()
        };
        let energy =
            EnergyCalculator::contribution(ExclusionClass::Third, 1.2, 1.0, 1.0, &scaling).unwrap();
        assert!(f64_approx_equal(energy, 1.0));
    }

    #[test]
    fn overflowing_products_are_rejected() {
        let scaling = ExclusionScaling::default();
        let result = EnergyCalculator::contribution(ExclusionClass::Far, 1e200, -1e200, 1.0, &scaling);
        assert!(matches!(
            result,
            Err(EnergyCalculationError::NonFinite { value }) if value == f64::NEG_INFINITY
        ));
    }

    #[test]
    fn coincident_atoms_are_rejected_even_when_excluded() {
        let scaling = ExclusionScaling::default();
        for class in ExclusionClass::ALL {
            let result = EnergyCalculator::contribution(class, 1.0, 1.0, 0.0, &scaling);
            assert_eq!(
                result,
                Err(EnergyCalculationError::CoincidentAtoms { distance: 0.0 })
            );
        }
    }

    #[test]
    fn pair_uses_system_geometry_and_charges() {
        let system = ChargedSystem::new(
            vec![Point3::origin(), Point3::new(0.0, 2.0, 0.0)],
            vec![1.0, 0.5],
            vec![],
        )
        .unwrap();
        let energy = EnergyCalculator::pair(
            &system,
            0,
            1,
            ExclusionClass::Far,
            &ExclusionScaling::default(),
        )
        .unwrap();
        assert!(f64_approx_equal(energy, 0.25));
    }

    #[test]
    fn pair_error_names_both_atoms() {
        let system = ChargedSystem::new(
            vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0), Point3::origin()],
            vec![1.0, 1.0, 1.0],
            vec![Bond::new(0, 2)],
        )
        .unwrap();
        let err = EnergyCalculator::pair(
            &system,
            0,
            2,
            ExclusionClass::Direct,
            &ExclusionScaling::default(),
        )
        .unwrap_err();
        assert_eq!((err.i, err.k), (0, 2));
        assert!(err.to_string().contains("coincident"));
    }
}
