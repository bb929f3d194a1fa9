use crate::core::models::system::{ChargedSystem, SystemError};
use crate::core::models::topology::Bond;
use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ATOMS_FILE: &str = "atoms.txt";
pub const DEFAULT_CHARGES_FILE: &str = "charges.txt";
pub const DEFAULT_BONDS_FILE: &str = "bonds.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFile {
    Atoms,
    Charges,
    Bonds,
}

impl fmt::Display for InputFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Atoms => "atoms",
            Self::Charges => "charges",
            Self::Bonds => "bonds",
        })
    }
}

#[derive(Debug, Error)]
pub enum TextInputError {
    #[error("Failed to open '{path}': {source}", path = path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error while reading {file} input: {source}")]
    Io {
        file: InputFile,
        #[source]
        source: io::Error,
    },
    #[error("Invalid number '{value}' at token {token} of {file} input")]
    InvalidNumber {
        file: InputFile,
        token: usize,
        value: String,
    },
    #[error("Bond input has an odd number of atom ids ({count}); the last bond is incomplete")]
    DanglingBondToken { count: usize },
    #[error("Inconsistent input: {0}")]
    System(#[from] SystemError),
}

/// Paths of the three whitespace-separated input files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub atoms: PathBuf,
    pub charges: PathBuf,
    pub bonds: PathBuf,
}

impl InputPaths {
    /// The default file names inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            atoms: dir.join(DEFAULT_ATOMS_FILE),
            charges: dir.join(DEFAULT_CHARGES_FILE),
            bonds: dir.join(DEFAULT_BONDS_FILE),
        }
    }
}

/// Reader for the plain-text system description.
///
/// The input is split over three streams of whitespace-separated tokens: atom
/// coordinates (`x y z` per atom), one charge per atom, and bonds as pairs of
/// zero-based atom ids. Line breaks carry no meaning.
pub struct TextInput;

impl TextInput {
    /// Reads and validates a system from three buffered readers.
    ///
    /// # Errors
    ///
    /// Returns an error if a token is not a number, if the bond stream ends in the
    /// middle of a pair, or if the assembled system violates a count or topology
    /// invariant.
    pub fn read_from(
        atoms: &mut impl BufRead,
        charges: &mut impl BufRead,
        bonds: &mut impl BufRead,
    ) -> Result<ChargedSystem, TextInputError> {
        let coordinates: Vec<f64> = read_tokens(atoms, InputFile::Atoms)?;
        let charges: Vec<f64> = read_tokens(charges, InputFile::Charges)?;
        let bond_ids: Vec<usize> = read_tokens(bonds, InputFile::Bonds)?;

        if bond_ids.len() % 2 != 0 {
            return Err(TextInputError::DanglingBondToken {
                count: bond_ids.len(),
            });
        }
        let bonds: Vec<Bond> = bond_ids
            .chunks_exact(2)
            .map(|pair| Bond::new(pair[0], pair[1]))
            .collect();

        debug!(
            coordinates = coordinates.len(),
            charges = charges.len(),
            bonds = bonds.len(),
            "Parsed text input."
        );
        Ok(ChargedSystem::from_flat(&coordinates, charges, bonds)?)
    }

    pub fn read_from_paths(paths: &InputPaths) -> Result<ChargedSystem, TextInputError> {
        let mut atoms = open(&paths.atoms)?;
        let mut charges = open(&paths.charges)?;
        let mut bonds = open(&paths.bonds)?;
        Self::read_from(&mut atoms, &mut charges, &mut bonds)
    }

    /// Reads `atoms.txt`, `charges.txt` and `bonds.txt` from `dir`.
    pub fn read_from_dir<P: AsRef<Path>>(dir: P) -> Result<ChargedSystem, TextInputError> {
        Self::read_from_paths(&InputPaths::in_dir(dir.as_ref()))
    }
}

fn open(path: &Path) -> Result<BufReader<File>, TextInputError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| TextInputError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn read_tokens<T: FromStr>(
    reader: &mut impl BufRead,
    file: InputFile,
) -> Result<Vec<T>, TextInputError> {
    let mut values = Vec::new();
    let mut token = 0usize;
    for line in reader.lines() {
        let line = line.map_err(|source| TextInputError::Io { file, source })?;
        for raw in line.split_whitespace() {
            let value = raw.parse().map_err(|_| TextInputError::InvalidNumber {
                file,
                token,
                value: raw.to_string(),
            })?;
            values.push(value);
            token += 1;
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::topology::TopologyError;
    use std::fs;
    use std::io::Cursor;
    use tempfile::tempdir;

    fn read(atoms: &str, charges: &str, bonds: &str) -> Result<ChargedSystem, TextInputError> {
        TextInput::read_from(
            &mut Cursor::new(atoms),
            &mut Cursor::new(charges),
            &mut Cursor::new(bonds),
        )
    }

    #[test]
    fn reads_whitespace_separated_streams_regardless_of_line_breaks() {
        let system = read(
            "0.0 0.0 0.0\n1.5 0.0\n0.0\n",
            "0.4\n-0.4",
            "0 1\n",
        )
        .unwrap();
        assert_eq!(system.atom_count(), 2);
        assert_eq!(system.position(1).x, 1.5);
        assert_eq!(system.charges(), &[0.4, -0.4]);
        assert_eq!(system.bonds(), &[Bond::new(0, 1)]);
    }

    #[test]
    fn empty_bond_stream_means_no_bonds() {
        let system = read("0 0 0 1 0 0", "1 1", "").unwrap();
        assert!(system.bonds().is_empty());
    }

    #[test]
    fn reports_invalid_number_with_position() {
        let err = read("0 0 0 1 x 0", "1 1", "").unwrap_err();
        match err {
            TextInputError::InvalidNumber { file, token, value } => {
                assert_eq!(file, InputFile::Atoms);
                assert_eq!(token, 4);
                assert_eq!(value, "x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_bond_ids() {
        let err = read("0 0 0 1 0 0", "1 1", "0 -1").unwrap_err();
        assert!(matches!(
            err,
            TextInputError::InvalidNumber {
                file: InputFile::Bonds,
                ..
            }
        ));
    }

    #[test]
    fn rejects_dangling_bond_token() {
        let err = read("0 0 0 1 0 0", "1 1", "0 1 1").unwrap_err();
        assert!(matches!(err, TextInputError::DanglingBondToken { count: 3 }));
    }

    #[test]
    fn rejects_mismatched_charge_count() {
        let err = read("0 0 0 1 0 0", "1", "").unwrap_err();
        assert!(matches!(
            err,
            TextInputError::System(SystemError::CountMismatch {
                atoms: 2,
                charges: 1,
            })
        ));
    }

    #[test]
    fn rejects_out_of_range_bond() {
        let err = read("0 0 0 1 0 0", "1 1", "0 2").unwrap_err();
        assert!(matches!(
            err,
            TextInputError::System(SystemError::Topology(
                TopologyError::BondOutOfRange { atom: 2, .. }
            ))
        ));
    }

    #[test]
    fn read_from_dir_uses_default_file_names() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(DEFAULT_ATOMS_FILE), "0 0 0\n0 0 1\n0 0 2\n").unwrap();
        fs::write(dir.path().join(DEFAULT_CHARGES_FILE), "1\n-1\n1\n").unwrap();
        fs::write(dir.path().join(DEFAULT_BONDS_FILE), "0 1\n1 2\n").unwrap();

        let system = TextInput::read_from_dir(dir.path()).unwrap();
        assert_eq!(system.atom_count(), 3);
        assert_eq!(system.graph().bond_count(), 2);
    }

    #[test]
    fn missing_file_reports_its_path() {
        let dir = tempdir().unwrap();
        let err = TextInput::read_from_dir(dir.path()).unwrap_err();
        match err {
            TextInputError::Open { path, .. } => {
                assert!(path.ends_with(DEFAULT_ATOMS_FILE));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
