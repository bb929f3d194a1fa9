use crate::core::forcefield::energy::{EnergyCalculator, PairEnergyError};
use crate::core::forcefield::params::ExclusionScaling;
use crate::core::models::system::ChargedSystem;
use crate::core::topology::exclusion::ExclusionShells;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use tracing::{info, instrument};

/// Reference evaluator: a single thread walks the pairs `i < j` in row-major
/// order and accumulates the scaled contributions in `f64`.
#[instrument(skip_all, name = "serial_energy_task")]
pub fn run(
    system: &ChargedSystem,
    scaling: &ExclusionScaling,
    coulomb_constant: f64,
    reporter: &ProgressReporter,
) -> Result<f64, EngineError> {
    let n = system.atom_count();
    info!(atom_count = n, "Starting serial evaluation.");
    reporter.start_task(n);
    let sum = accumulate(system, scaling, reporter);
    reporter.finish_task();

    let energy = super::scaled_energy(coulomb_constant, sum?)?;
    info!(energy, "Serial evaluation finished.");
    Ok(energy)
}

fn accumulate(
    system: &ChargedSystem,
    scaling: &ExclusionScaling,
    reporter: &ProgressReporter,
) -> Result<f64, PairEnergyError> {
    let n = system.atom_count();
    let mut sum = 0.0;
    for i in 0..n {
        let shells = ExclusionShells::around(system.graph(), i);
        for k in (i + 1)..n {
            sum += EnergyCalculator::pair(system, i, k, shells.class_of(k), scaling)?;
        }
        reporter.advance(1);
    }
    Ok(sum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::energy::EnergyCalculationError;
    use crate::core::forcefield::params::DEFAULT_COULOMB_CONSTANT;
    use crate::core::models::topology::Bond;
    use crate::engine::progress::Progress;
    use nalgebra::Point3;

    const C: f64 = DEFAULT_COULOMB_CONSTANT;

    fn f64_approx_equal(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    fn line_system(charges: Vec<f64>, bonds: &[(usize, usize)]) -> ChargedSystem {
        let positions = (0..charges.len())
            .map(|a| Point3::new(a as f64, 0.0, 0.0))
            .collect();
        let bonds = bonds.iter().copied().map(Bond::from).collect();
        ChargedSystem::new(positions, charges, bonds).unwrap()
    }

    fn energy(system: &ChargedSystem) -> Result<f64, EngineError> {
        run(
            system,
            &ExclusionScaling::default(),
            C,
            &ProgressReporter::new(),
        )
    }

    #[test]
    fn two_unbonded_unit_charges_one_angstrom_apart() {
        let system = line_system(vec![1.0, 1.0], &[]);
        assert_eq!(energy(&system).unwrap(), 1389.38757);
    }

    #[test]
    fn single_bonded_pair_is_excluded() {
        let system = line_system(vec![1.0, -1.0], &[(0, 1)]);
        assert_eq!(energy(&system).unwrap(), 0.0);
    }

    #[test]
    fn four_atom_chain_keeps_only_the_half_scaled_one_four_pair() {
        let system = line_system(vec![1.0; 4], &[(0, 1), (1, 2), (2, 3)]);
        let expected = C * 0.5 * (1.0 / 3.0);
        assert!(f64_approx_equal(energy(&system).unwrap(), expected));
    }

    #[test]
    fn five_atom_chain_adds_the_far_pair_unscaled() {
        let system = line_system(vec![1.0; 5], &[(0, 1), (1, 2), (2, 3), (3, 4)]);
        let expected = C * (0.5 / 3.0 + 0.5 / 3.0 + 1.0 / 4.0);
        assert!(f64_approx_equal(energy(&system).unwrap(), expected));
    }

    #[test]
    fn unbonded_system_equals_plain_coulomb_sum() {
        let charges = vec![0.4, -0.8, 0.3, 0.1];
        let system = line_system(charges.clone(), &[]);
        let mut expected = 0.0;
        for i in 0..charges.len() {
            for k in (i + 1)..charges.len() {
                expected += charges[i] * charges[k] / (k - i) as f64;
            }
        }
        assert!(f64_approx_equal(energy(&system).unwrap(), C * expected));
    }

    #[test]
    fn duplicate_bonds_match_single_bonds() {
        let single = line_system(vec![1.0; 4], &[(0, 1), (1, 2), (2, 3)]);
        let doubled = line_system(vec![1.0; 4], &[(0, 1), (1, 0), (1, 2), (2, 3), (2, 3)]);
        assert_eq!(energy(&single).unwrap(), energy(&doubled).unwrap());
    }

    #[test]
    fn empty_and_single_atom_systems_have_zero_energy() {
        assert_eq!(energy(&line_system(vec![], &[])).unwrap(), 0.0);
        assert_eq!(energy(&line_system(vec![2.0], &[])).unwrap(), 0.0);
    }

    #[test]
    fn coincident_atoms_fail_with_the_offending_pair() {
        let positions = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        let system = ChargedSystem::new(positions, vec![1.0; 3], vec![]).unwrap();
        match energy(&system) {
            Err(EngineError::DegenerateGeometry(PairEnergyError { i, k, source })) => {
                assert_eq!((i, k), (1, 2));
                assert!(matches!(
                    source,
                    EnergyCalculationError::CoincidentAtoms { .. }
                ));
            }
            other => panic!("expected degenerate geometry, got {other:?}"),
        }
    }

    #[test]
    fn reports_one_step_per_row() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicU64, Ordering};

        let steps = Arc::new(AtomicU64::new(0));
        let counter = steps.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            if let Progress::TaskIncrement { amount } = event {
                counter.fetch_add(amount, Ordering::Relaxed);
            }
        }));
        let system = line_system(vec![1.0; 6], &[(0, 1)]);
        run(&system, &ExclusionScaling::default(), C, &reporter).unwrap();
        assert_eq!(steps.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn overflowing_pair_products_are_rejected() {
        let system = line_system(vec![1e200, 1e200, -1e200], &[]);
        match energy(&system) {
            Err(EngineError::DegenerateGeometry(PairEnergyError { i, k, source })) => {
                assert_eq!((i, k), (0, 1));
                assert!(matches!(source, EnergyCalculationError::NonFinite { .. }));
            }
            other => panic!("expected a non-finite pair energy, got {other:?}"),
        }
    }

    #[test]
    fn overflow_from_the_coulomb_constant_is_rejected() {
        let system = line_system(vec![1e153, 1e153], &[]);
        assert!(matches!(
            energy(&system),
            Err(EngineError::NonFiniteEnergy { energy }) if energy.is_infinite()
        ));
    }

    #[test]
    fn task_is_finished_when_a_pair_fails() {
        use std::sync::{Arc, Mutex};

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let reporter = ProgressReporter::with_callback(Box::new(move |event| {
            sink.lock().unwrap().push(event);
        }));
        let positions = vec![Point3::origin(), Point3::origin()];
        let system = ChargedSystem::new(positions, vec![1.0; 2], vec![]).unwrap();

        assert!(run(&system, &ExclusionScaling::default(), C, &reporter).is_err());
        let events = events.lock().unwrap();
        assert!(matches!(events.first(), Some(Progress::TaskStart { total_steps: 2 })));
        assert!(matches!(events.last(), Some(Progress::TaskFinish)));
    }
}
