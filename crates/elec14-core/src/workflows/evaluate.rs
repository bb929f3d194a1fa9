use crate::core::models::system::ChargedSystem;
use crate::core::models::topology::Bond;
use crate::core::topology::exclusion::PairCensus;
use crate::engine::accelerator::{Accelerator, HostAccelerator};
use crate::engine::config::{Backend, EvaluationConfig};
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::tasks;
use std::time::{Duration, Instant};
use tracing::{info, instrument, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct BackendResult {
    pub backend: Backend,
    pub energy: f64,
    /// Wall-clock time of the evaluation itself, excluding input loading.
    pub elapsed: Duration,
    /// Name of the device that ran the kernel, for accelerated backends.
    pub device: Option<String>,
}

#[derive(Debug, Clone)]
pub struct EvaluationReport {
    /// One entry per backend, in execution order (serial first).
    pub results: Vec<BackendResult>,
    pub census: PairCensus,
    pub atom_count: usize,
    pub bond_count: usize,
    /// Relative difference between the backends when both ran.
    pub relative_difference: Option<f64>,
}

impl EvaluationReport {
    /// Energy of the first backend that ran, in the units of the Coulomb constant.
    pub fn energy(&self) -> f64 {
        self.results.first().map_or(0.0, |r| r.energy)
    }

    pub fn result(&self, backend: Backend) -> Option<&BackendResult> {
        self.results.iter().find(|r| r.backend == backend)
    }
}

/// `|a - b| / max(|a|, |b|)`, defined as zero when both are zero.
pub fn relative_difference(a: f64, b: f64) -> f64 {
    let scale = a.abs().max(b.abs());
    if scale == 0.0 {
        0.0
    } else {
        (a - b).abs() / scale
    }
}

/// Evaluates `system` with the configured backends, selecting the host
/// accelerator when the parallel backend is requested.
#[instrument(skip_all, name = "evaluation_workflow")]
pub fn run(
    system: &ChargedSystem,
    config: &EvaluationConfig,
    reporter: &ProgressReporter,
) -> Result<EvaluationReport, EngineError> {
    let accelerator = if config.backends.includes(Backend::Parallel) {
        Some(HostAccelerator::select(&config.accelerator)?)
    } else {
        None
    };
    evaluate(system, config, accelerator.as_ref(), reporter)
}

/// Same as [`run`] but dispatches the parallel backend to a caller-provided device.
#[instrument(skip_all, name = "evaluation_workflow")]
pub fn run_with_accelerator<A: Accelerator>(
    system: &ChargedSystem,
    config: &EvaluationConfig,
    accelerator: &A,
    reporter: &ProgressReporter,
) -> Result<EvaluationReport, EngineError> {
    evaluate(system, config, Some(accelerator), reporter)
}

/// Validates flat inputs (`3N` coordinates, `N` charges, index pairs) and evaluates them.
pub fn run_from_raw(
    coordinates: &[f64],
    charges: &[f64],
    bonds: &[(usize, usize)],
    config: &EvaluationConfig,
    reporter: &ProgressReporter,
) -> Result<EvaluationReport, EngineError> {
    let bonds = bonds.iter().copied().map(Bond::from).collect();
    let system = ChargedSystem::from_flat(coordinates, charges.to_vec(), bonds)?;
    run(&system, config, reporter)
}

fn evaluate<A: Accelerator>(
    system: &ChargedSystem,
    config: &EvaluationConfig,
    accelerator: Option<&A>,
    reporter: &ProgressReporter,
) -> Result<EvaluationReport, EngineError> {
    let atom_count = system.atom_count();
    let bond_count = system.bonds().len();
    info!(
        atom_count,
        bond_count,
        backends = %config.backends,
        "Starting evaluation workflow."
    );
    if atom_count < 2 {
        warn!(atom_count, "System has no atom pairs; the energy is zero.");
    }

    let census = reporter.phase("Topology Census", || PairCensus::tally(system.graph()));
    info!(
        direct = census.direct,
        second = census.second,
        third = census.third,
        far = census.far,
        "Classified atom pairs."
    );

    let electrostatics = &config.electrostatics;
    let mut results = Vec::with_capacity(2);
    for &backend in config.backends.backends() {
        let (energy, elapsed, device) = match backend {
            Backend::Serial => reporter.phase("Serial Evaluation", || {
                let start = Instant::now();
                let energy = tasks::serial::run(
                    system,
                    &electrostatics.scaling,
                    electrostatics.coulomb_constant,
                    reporter,
                )?;
                Ok::<_, EngineError>((energy, start.elapsed(), None::<String>))
            })?,
            Backend::Parallel => {
                let accelerator = accelerator.ok_or_else(|| {
                    EngineError::Internal(
                        "parallel backend requested without an accelerator".to_string(),
                    )
                })?;
                reporter.phase("Parallel Evaluation", || {
                    let start = Instant::now();
                    let energy = tasks::parallel::run(
                        system,
                        &electrostatics.scaling,
                        electrostatics.coulomb_constant,
                        config.decomposition,
                        accelerator,
                        reporter,
                    )?;
                    let elapsed = start.elapsed();
                    let device = accelerator.device().name.clone();
                    Ok::<_, EngineError>((energy, elapsed, Some(device)))
                })?
            }
        };

        info!(
            %backend,
            energy,
            elapsed_ms = elapsed.as_secs_f64() * 1e3,
            "Backend finished."
        );
        results.push(BackendResult {
            backend,
            energy,
            elapsed,
            device,
        });
    }

    let mut report = EvaluationReport {
        results,
        census,
        atom_count,
        bond_count,
        relative_difference: None,
    };

    if let (Some(serial), Some(parallel)) = (
        report.result(Backend::Serial).map(|r| r.energy),
        report.result(Backend::Parallel).map(|r| r.energy),
    ) {
        let difference = relative_difference(serial, parallel);
        // Written so that a NaN difference counts as disagreement.
        if !(difference <= config.relative_tolerance) {
            return Err(EngineError::BackendDisagreement {
                serial,
                parallel,
                relative_difference: difference,
                tolerance: config.relative_tolerance,
            });
        }
        reporter.report(Progress::Message(format!(
            "Backends agree (relative difference {difference:e})"
        )));
        report.relative_difference = Some(difference);
    }

    info!(energy = report.energy(), "Evaluation workflow complete.");
    Ok(report)
}
