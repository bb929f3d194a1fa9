use crate::core::forcefield::energy::{EnergyCalculator, PairEnergyError};
use crate::core::forcefield::params::ExclusionScaling;
use crate::core::models::system::ChargedSystem;
use crate::core::models::topology::BondGraph;
use crate::core::topology::exclusion::classify;
use crate::engine::accelerator::{Accelerator, AcceleratorError, DispatchError, Kernel};
use crate::engine::decomposition::PairDecomposition;
use crate::engine::error::EngineError;
use crate::engine::progress::ProgressReporter;
use nalgebra::Point3;
use tracing::{debug, info, instrument};

/// One work item per slot of the chosen decomposition. Each item recovers its
/// pair from the slot index, classifies it with the allocation-free walk search
/// and writes the scaled, reduced contribution.
pub struct PairKernel<'a> {
    positions: &'a [Point3<f64>],
    charges: &'a [f64],
    graph: &'a BondGraph,
    scaling: &'a ExclusionScaling,
    decomposition: PairDecomposition,
    atom_count: usize,
    slots: usize,
}

impl<'a> PairKernel<'a> {
    pub fn build(
        system: &'a ChargedSystem,
        scaling: &'a ExclusionScaling,
        decomposition: PairDecomposition,
    ) -> Result<Self, AcceleratorError> {
        let atom_count = system.atom_count();
        let graph = system.graph();
        if system.charges().len() != atom_count
            || graph.atom_count() != atom_count
            || graph.offsets().len() != atom_count + 1
        {
            return Err(AcceleratorError::KernelBuild(format!(
                "inconsistent buffers: {} positions, {} charges, {} adjacency offsets",
                atom_count,
                system.charges().len(),
                graph.offsets().len()
            )));
        }
        let slots = decomposition.slot_count(atom_count).ok_or_else(|| {
            AcceleratorError::KernelBuild(format!(
                "{atom_count} atoms overflow the {decomposition} slot index"
            ))
        })?;

        Ok(Self {
            positions: system.positions(),
            charges: system.charges(),
            graph,
            scaling,
            decomposition,
            atom_count,
            slots,
        })
    }
}

impl Kernel for PairKernel<'_> {
    type Error = PairEnergyError;

    fn work_items(&self) -> usize {
        self.slots
    }

    #[inline]
    fn execute(&self, work_item: usize) -> Result<f64, PairEnergyError> {
        let Some((i, k)) = self.decomposition.pair_for_slot(work_item, self.atom_count) else {
            return Ok(0.0);
        };
        let class = classify(self.graph, i, k);
        let dist = nalgebra::distance(&self.positions[i], &self.positions[k]);
        EnergyCalculator::contribution(class, self.charges[i], self.charges[k], dist, self.scaling)
            .map_err(|source| PairEnergyError { i, k, source })
    }
}

#[instrument(skip_all, name = "parallel_energy_task")]
pub fn run<A: Accelerator>(
    system: &ChargedSystem,
    scaling: &ExclusionScaling,
    coulomb_constant: f64,
    decomposition: PairDecomposition,
    accelerator: &A,
    reporter: &ProgressReporter,
) -> Result<f64, EngineError> {
    info!(
        atom_count = system.atom_count(),
        %decomposition,
        device = %accelerator.device().name,
        "Starting parallel evaluation."
    );
    let kernel = PairKernel::build(system, scaling, decomposition)?;
    let slots = kernel.work_items();

    let mut output: Vec<f64> = Vec::new();
    output.try_reserve_exact(slots).map_err(|e| {
        AcceleratorError::KernelBuild(format!("cannot allocate {slots} output slots: {e}"))
    })?;
    output.resize(slots, 0.0);
    debug!(
        slots,
        bytes = slots * size_of::<f64>(),
        work_group_size = accelerator.work_group_size(),
        "Allocated output buffer."
    );

    accelerator
        .dispatch(&kernel, &mut output, reporter)
        .map_err(|e| match e {
            DispatchError::Launch(err) => EngineError::AcceleratorSetup(err),
            DispatchError::Kernel { source, .. } => EngineError::DegenerateGeometry(source),
        })?;

    // Sequential reduction in slot order; both decompositions are row-major.
    let sum = output.iter().fold(0.0, |acc, &value| acc + value);
    let energy = super::scaled_energy(coulomb_constant, sum)?;
    info!(energy, "Parallel evaluation finished.");
    Ok(energy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::forcefield::energy::EnergyCalculationError;
    use crate::core::forcefield::params::DEFAULT_COULOMB_CONSTANT;
    use crate::core::models::topology::Bond;
    use crate::engine::accelerator::HostAccelerator;
    use crate::engine::config::AcceleratorConfig;
    use crate::engine::tasks::serial;

    const C: f64 = DEFAULT_COULOMB_CONSTANT;
    const DECOMPOSITIONS: [PairDecomposition; 2] =
        [PairDecomposition::Dense, PairDecomposition::Triangular];

    fn host(work_group_size: usize) -> HostAccelerator {
        HostAccelerator::select(&AcceleratorConfig {
            work_group_size,
            threads: Some(4),
            ..Default::default()
        })
        .unwrap()
    }

    // Deterministic pseudo-random molecule: jittered lattice positions, mixed
    // charges and a bond set with chains, rings and duplicates.
    fn tangled_system(atom_count: usize, bond_count: usize, seed: u64) -> ChargedSystem {
        let mut state = seed;
        let mut next = || {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 33) as f64 / (1u64 << 31) as f64
        };
        let positions = (0..atom_count)
            .map(|a| {
                Point3::new(
                    (a % 5) as f64 * 1.5 + next() * 0.4,
                    (a / 5 % 5) as f64 * 1.5 + next() * 0.4,
                    (a / 25) as f64 * 1.5 + next() * 0.4,
                )
            })
            .collect();
        let charges = (0..atom_count).map(|_| next() * 1.6 - 0.8).collect();
        let mut bonds = Vec::new();
        while bonds.len() < bond_count {
            let a = (next() * atom_count as f64) as usize % atom_count;
            let b = (next() * atom_count as f64) as usize % atom_count;
            if a != b {
                bonds.push(Bond::new(a, b));
            }
        }
        ChargedSystem::new(positions, charges, bonds).unwrap()
    }

    fn parallel_energy(
        system: &ChargedSystem,
        decomposition: PairDecomposition,
        work_group_size: usize,
    ) -> Result<f64, EngineError> {
        run(
            system,
            &ExclusionScaling::default(),
            C,
            decomposition,
            &host(work_group_size),
            &ProgressReporter::new(),
        )
    }

    fn serial_energy(system: &ChargedSystem) -> f64 {
        serial::run(system, &ExclusionScaling::default(), C, &ProgressReporter::new()).unwrap()
    }

    #[test]
    fn matches_serial_bit_for_bit_on_tangled_systems() {
        for seed in 0..3 {
            let system = tangled_system(60, 70, seed);
            let expected = serial_energy(&system);
            for decomposition in DECOMPOSITIONS {
                for group in [1, 7, 128] {
                    let actual = parallel_energy(&system, decomposition, group).unwrap();
                    assert_eq!(
                        actual, expected,
                        "seed {seed}, {decomposition}, work group {group}"
                    );
                }
            }
        }
    }

    #[test]
    fn repeated_runs_are_identical() {
        let system = tangled_system(45, 50, 11);
        for decomposition in DECOMPOSITIONS {
            let first = parallel_energy(&system, decomposition, 7).unwrap();
            let second = parallel_energy(&system, decomposition, 7).unwrap();
            assert_eq!(first.to_bits(), second.to_bits());
        }
    }

    #[test]
    fn two_unbonded_unit_charges_one_angstrom_apart() {
        let system =
            ChargedSystem::from_flat(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0], vec![1.0, 1.0], vec![])
                .unwrap();
        for decomposition in DECOMPOSITIONS {
            assert_eq!(parallel_energy(&system, decomposition, 128).unwrap(), 1389.38757);
        }
    }

    #[test]
    fn tiny_systems_produce_zero_without_work_items() {
        for atoms in [0usize, 1] {
            let system =
                ChargedSystem::from_flat(&vec![0.0; 3 * atoms], vec![1.0; atoms], vec![]).unwrap();
            for decomposition in DECOMPOSITIONS {
                assert_eq!(parallel_energy(&system, decomposition, 128).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn coincident_atoms_fail_with_the_offending_pair() {
        let system = ChargedSystem::from_flat(
            &[0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 3.0, 0.0, 0.0, 1.0, 1.0, 1.0],
            vec![0.5; 4],
            vec![Bond::new(1, 3)],
        )
        .unwrap();
        for decomposition in DECOMPOSITIONS {
            match parallel_energy(&system, decomposition, 2) {
                Err(EngineError::DegenerateGeometry(err)) => assert_eq!((err.i, err.k), (1, 3)),
                other => panic!("expected degenerate geometry, got {other:?}"),
            }
        }
    }

    #[test]
    fn kernel_writes_zero_into_idle_dense_slots() {
        let system = tangled_system(6, 4, 3);
        let scaling = ExclusionScaling::default();
        let kernel = PairKernel::build(&system, &scaling, PairDecomposition::Dense).unwrap();
        assert_eq!(kernel.work_items(), 36);
        for i in 0..6 {
            for k in 0..=i {
                assert_eq!(kernel.execute(i * 6 + k).unwrap(), 0.0);
            }
        }
    }

    #[test]
    fn overflowing_pair_products_are_rejected() {
        let system = ChargedSystem::from_flat(
            &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0],
            vec![1e200, 1e200, -1e200],
            vec![],
        )
        .unwrap();
        for decomposition in DECOMPOSITIONS {
            match parallel_energy(&system, decomposition, 1) {
                Err(EngineError::DegenerateGeometry(err)) => {
                    assert!(matches!(err.source, EnergyCalculationError::NonFinite { .. }));
                }
                other => panic!("expected a non-finite pair energy, got {other:?}"),
            }
        }
    }

    #[test]
    fn overflow_from_the_coulomb_constant_is_rejected() {
        let system =
            ChargedSystem::from_flat(&[0.0, 0.0, 0.0, 1.0, 0.0, 0.0], vec![1e153, 1e153], vec![])
                .unwrap();
        for decomposition in DECOMPOSITIONS {
            assert!(matches!(
                parallel_energy(&system, decomposition, 128),
                Err(EngineError::NonFiniteEnergy { .. })
            ));
        }
    }
}
