use std::fmt;
use std::fs;
use std::path::Path;

use anyhow::{self, ensure, format_err};

use crate::auxiliary::atom::{Atom, ElementMap};

#[cfg(test)]
#[path = "molecule_tests.rs"]
mod molecule_tests;

/// A struct containing the atoms constituting a molecule, as attached to a driver result.
#[derive(Clone, Debug, PartialEq)]
pub struct Molecule {
    /// The atoms constituting this molecule.
    pub atoms: Vec<Atom>,

    /// The total charge of the molecule.
    pub charge: i32,

    /// The spin multiplicity of the molecule.
    pub multiplicity: u32,

    /// A threshold for approximate equality comparisons.
    pub threshold: f64,
}

impl Molecule {
    /// Parses an `xyz` file to construct a neutral singlet molecule.
    ///
    /// # Arguments
    ///
    /// * `filename` - The `xyz` file to be parsed.
    /// * `thresh` - A threshold for approximate equality comparisons.
    ///
    /// # Returns
    ///
    /// The parsed [`Molecule`] struct.
    pub fn from_xyz<P: AsRef<Path>>(filename: P, thresh: f64) -> Result<Molecule, anyhow::Error> {
        let contents = fs::read_to_string(filename.as_ref()).map_err(|err| {
            format_err!(
                "Unable to read file {}: {err}",
                filename.as_ref().display()
            )
        })?;

        let emap = ElementMap::new();
        let mut lines = contents.lines();
        let n_atoms = lines
            .next()
            .ok_or_else(|| format_err!("Empty xyz file."))?
            .trim()
            .parse::<usize>()
            .map_err(|err| format_err!(err))?;
        let atoms = lines
            .skip(1)
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                Atom::from_xyz(line, &emap, thresh)
                    .ok_or_else(|| format_err!("Unable to parse the atom line `{line}`."))
            })
            .collect::<Result<Vec<_>, _>>()?;
        ensure!(
            atoms.len() == n_atoms,
            "Expected {} atoms, got {} instead.",
            n_atoms,
            atoms.len()
        );
        Ok(Molecule::from_atoms(&atoms, thresh))
    }

    /// Constructs a neutral singlet molecule from an array of atoms.
    ///
    /// # Arguments
    ///
    /// * `all_atoms` - The atoms (of all types) constituting this molecule.
    /// * `thresh` - A threshold for approximate equality comparisons.
    pub fn from_atoms(all_atoms: &[Atom], thresh: f64) -> Molecule {
        Molecule {
            atoms: all_atoms.to_vec(),
            charge: 0,
            multiplicity: 1,
            threshold: thresh,
        }
    }

    /// Sets the charge and spin multiplicity of this molecule.
    #[must_use]
    pub fn with_charge_multiplicity(mut self, charge: i32, multiplicity: u32) -> Molecule {
        self.charge = charge;
        self.multiplicity = multiplicity;
        self
    }

    /// Returns the number of electrons of this molecule given its charge.
    pub fn n_electrons(&self) -> i64 {
        self.atoms
            .iter()
            .map(|atom| i64::from(atom.atomic_number))
            .sum::<i64>()
            - i64::from(self.charge)
    }
}

impl fmt::Display for Molecule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Molecule (charge {:+}, multiplicity {}):",
            self.charge, self.multiplicity
        )?;
        for atom in self.atoms.iter() {
            writeln!(f, "{atom}")?;
        }
        Ok(())
    }
}
