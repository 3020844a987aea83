//! Reduction of an electronic property tree by freezing core orbitals and removing selected
//! orbitals.

use std::fmt;

use anyhow;
use derive_builder::Builder;
use itertools::Itertools;
use ndarray::LinalgScalar;
use num_complex::ComplexFloat;
use serde::{Deserialize, Serialize};

use crate::auxiliary::molecule::Molecule;
use crate::io::format::{nice_bool, nice_indices};
use crate::properties::particle_number::ParticleNumber;
use crate::properties::GroupedProperty;
use crate::transformers::{infeasible, Transformer};


// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

const fn default_true() -> bool {
    true
}

/// Structure containing the parameters of a freeze-core reduction.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
pub struct FreezeCoreParams {
    /// Boolean indicating if the core orbitals of the molecule are to be frozen.
    #[builder(default = "true")]
    #[serde(default = "default_true")]
    pub freeze_core: bool,

    /// Indices of further orbitals to be removed, typically high-lying virtual orbitals.
    #[builder(setter(strip_option), default = "None")]
    #[serde(default)]
    pub remove_orbitals: Option<Vec<usize>>,
}

impl FreezeCoreParams {
    /// Returns a builder to construct a [`FreezeCoreParams`] structure.
    pub fn builder() -> FreezeCoreParamsBuilder {
        FreezeCoreParamsBuilder::default()
    }
}

impl Default for FreezeCoreParams {
    fn default() -> Self {
        Self {
            freeze_core: true,
            remove_orbitals: None,
        }
    }
}

impl fmt::Display for FreezeCoreParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Freeze core orbitals: {}", nice_bool(self.freeze_core))?;
        if let Some(remove_orbitals) = self.remove_orbitals.as_ref() {
            writeln!(f, "Removed orbitals: {}", nice_indices(remove_orbitals))?;
        }
        Ok(())
    }
}

// -----------
// Transformer
// -----------

/// Returns the number of core spatial orbitals of an atom with atomic number `atomic_number`,
/// *i.e.* the number of orbitals in the completely filled noble-gas shells below it.
pub fn count_core_orbitals_of_atom(atomic_number: u32) -> usize {
    [(2, 1), (10, 4), (18, 4), (36, 9), (54, 9), (86, 16)]
        .iter()
        .filter(|(z_noble, _)| atomic_number > *z_noble)
        .map(|(_, n_orbs)| n_orbs)
        .sum()
}

/// Returns the number of core spatial orbitals of a molecule.
pub fn count_core_orbitals(molecule: &Molecule) -> usize {
    molecule
        .atoms
        .iter()
        .map(|atom| count_core_orbitals_of_atom(atom.atomic_number))
        .sum()
}

/// Checks that the electron count and spin multiplicity of a molecule agree with the particle
/// number of the property tree it is attached to.
fn check_molecule(
    molecule: &Molecule,
    particle_number: &ParticleNumber,
) -> Result<(), anyhow::Error> {
    let nelec = i64::try_from(particle_number.num_electrons())?;
    if molecule.n_electrons() != nelec {
        return Err(infeasible(&format!(
            "The molecule has {} electrons, but the particle number has {nelec}.",
            molecule.n_electrons()
        )));
    }
    let n_unpaired = particle_number.num_alpha().abs_diff(particle_number.num_beta());
    if usize::try_from(molecule.multiplicity)? != n_unpaired + 1 {
        return Err(infeasible(&format!(
            "The molecule has multiplicity {}, but the particle number has {n_unpaired} unpaired electrons.",
            molecule.multiplicity
        )));
    }
    Ok(())
}

/// Transformer removing the core orbitals of a molecule, and optionally further orbitals, from an
/// electronic property tree.
///
/// Freezing the core requires the top-level group to carry the molecule, whose electron count and
/// multiplicity must match the particle number.
#[derive(Clone, Debug, Default)]
pub struct FreezeCoreTransformer {
    params: FreezeCoreParams,
}

impl FreezeCoreTransformer {
    /// The name under which energy shifts from this transformer are recorded.
    pub const NAME: &'static str = "FreezeCoreTransformer";

    /// Creates a new freeze-core transformer.
    pub fn new(params: FreezeCoreParams) -> Self {
        Self { params }
    }

    /// Returns the parameters of the transformer.
    pub fn params(&self) -> &FreezeCoreParams {
        &self.params
    }
}

impl<T> Transformer<T> for FreezeCoreTransformer
where
    T: ComplexFloat<Real = f64> + LinalgScalar + fmt::Debug,
{
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn determine_active_space(
        &self,
        group: &GroupedProperty<T>,
        particle_number: &ParticleNumber,
    ) -> Result<(Vec<usize>, Vec<usize>), anyhow::Error> {
        let n_spatial = particle_number.num_spatial_orbitals();
        let core = if self.params.freeze_core {
            let molecule = group.molecule().ok_or_else(|| {
                infeasible("Freezing core orbitals requires a molecule on the property group.")
            })?;
            check_molecule(molecule, particle_number)?;
            let n_core = count_core_orbitals(molecule);
            if n_core > n_spatial {
                return Err(infeasible("More orbitals requested than available."));
            }
            0..n_core
        } else {
            0..0
        };
        let removed = self.params.remove_orbitals.as_deref().unwrap_or_default();
        if removed.iter().any(|i| *i >= n_spatial) {
            return Err(infeasible("More orbitals requested than available."));
        }
        let inactive = core.chain(removed.iter().copied()).unique().collect::<Vec<_>>();
        let active = (0..n_spatial)
            .filter(|i| !inactive.contains(i))
            .collect::<Vec<_>>();
        Ok((active, inactive))
    }
}
