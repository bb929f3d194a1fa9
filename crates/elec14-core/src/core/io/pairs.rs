use crate::core::forcefield::energy::{EnergyCalculator, PairEnergyError};
use crate::core::forcefield::params::ExclusionScaling;
use crate::core::models::system::ChargedSystem;
use crate::core::topology::exclusion::ExclusionShells;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PairTableError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Energy(#[from] PairEnergyError),
}

#[derive(Debug, Serialize)]
struct PairRow {
    i: usize,
    j: usize,
    class: &'static str,
    distance: f64,
    scale: f64,
    contribution: f64,
}

/// Writes one CSV row per unordered pair `i < j` that is not fully excluded.
///
/// Contributions are in reduced units (`e²/Å`); multiply their sum by the Coulomb
/// constant to obtain the energy. Returns the number of rows written.
pub fn write_pair_table<W: Write>(
    system: &ChargedSystem,
    scaling: &ExclusionScaling,
    writer: W,
) -> Result<usize, PairTableError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    let n = system.atom_count();
    let mut rows = 0usize;

    for i in 0..n {
        let shells = ExclusionShells::around(system.graph(), i);
        for j in (i + 1)..n {
            let class = shells.class_of(j);
            let scale = scaling.factor(class);
            let contribution = EnergyCalculator::pair(system, i, j, class, scaling)?;
            if scale == 0.0 {
                continue;
            }
            csv_writer.serialize(PairRow {
                i,
                j,
                class: class.as_str(),
                distance: system.distance(i, j),
                scale,
                contribution,
            })?;
            rows += 1;
        }
    }

    csv_writer.flush()?;
    Ok(rows)
}

pub fn write_pair_table_to_path<P: AsRef<Path>>(
    system: &ChargedSystem,
    scaling: &ExclusionScaling,
    path: P,
) -> Result<usize, PairTableError> {
    let file = std::fs::File::create(path)?;
    write_pair_table(system, scaling, std::io::BufWriter::new(file))
}
