//! Reduction of an electronic property tree to a chosen active space.

use std::fmt;

use anyhow::{self, format_err, Context};
use derive_builder::Builder;
use ndarray::LinalgScalar;
use num_complex::ComplexFloat;
use serde::{Deserialize, Serialize};

use crate::io::format::nice_indices;
use crate::properties::particle_number::ParticleNumber;
use crate::properties::GroupedProperty;
use crate::transformers::{ActiveSpaceError, Transformer};

pub mod active_space_selection;

use active_space_selection::{check_configuration, select_active_space, NumElectrons};


// ==================
// Struct definitions
// ==================

// ----------
// Parameters
// ----------

/// Structure containing the parameters that define an active space.
#[derive(Clone, Builder, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct ActiveSpaceParams {
    /// The number of active electrons. A single number is split equally between the alpha and
    /// beta spin channels and must therefore be even.
    pub num_electrons: NumElectrons,

    /// The number of active spatial orbitals.
    pub num_molecular_orbitals: i64,

    /// Explicit indices of the active orbitals. If `None`, the active orbitals are chosen
    /// around the Fermi level.
    #[builder(setter(strip_option), default = "None")]
    #[serde(default)]
    pub active_orbitals: Option<Vec<usize>>,
}

impl ActiveSpaceParamsBuilder {
    fn validate(&self) -> Result<(), String> {
        let num_electrons = self
            .num_electrons
            .ok_or("No number of active electrons found.".to_string())?;
        let num_molecular_orbitals = self
            .num_molecular_orbitals
            .ok_or("No number of active orbitals found.".to_string())?;
        let active_orbitals = self
            .active_orbitals
            .as_ref()
            .and_then(|active_orbitals| active_orbitals.as_deref());
        check_configuration(&num_electrons, num_molecular_orbitals, active_orbitals)
    }
}

impl ActiveSpaceParams {
    /// Returns a builder to construct an [`ActiveSpaceParams`] structure.
    pub fn builder() -> ActiveSpaceParamsBuilder {
        ActiveSpaceParamsBuilder::default()
    }

    /// Checks these parameters, *e.g.* after they have been deserialised.
    ///
    /// # Errors
    ///
    /// Errors with an [`ActiveSpaceError::Configuration`] carrying the first violation found.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        check_configuration(
            &self.num_electrons,
            self.num_molecular_orbitals,
            self.active_orbitals.as_deref(),
        )
        .map_err(ActiveSpaceError::Configuration)
        .context("Incorrect active-space configuration.")
    }
}

impl fmt::Display for ActiveSpaceParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Number of active electrons: {}", self.num_electrons)?;
        writeln!(
            f,
            "Number of active orbitals: {}",
            self.num_molecular_orbitals
        )?;
        writeln!(
            f,
            "Active orbitals: {}",
            self.active_orbitals
                .as_ref()
                .map(|active_orbitals| nice_indices(active_orbitals))
                .unwrap_or_else(|| "around the Fermi level".to_string())
        )?;
        Ok(())
    }
}

// -----------
// Transformer
// -----------

/// Transformer reducing an electronic property tree to a configured active space.
///
/// The transformer requires a [`ParticleNumber`] and an AO → MO basis transform in the tree, as
/// well as integrals in the AO basis for every integral property to be reduced.
#[derive(Clone, Debug)]
pub struct ActiveSpaceTransformer {
    params: ActiveSpaceParams,
}

impl ActiveSpaceTransformer {
    /// The name under which energy shifts from this transformer are recorded.
    pub const NAME: &'static str = "ActiveSpaceTransformer";

    /// Creates a new active-space transformer.
    ///
    /// # Arguments
    ///
    /// * `num_electrons` - The number of active electrons.
    /// * `num_molecular_orbitals` - The number of active orbitals.
    /// * `active_orbitals` - Optional explicit indices of the active orbitals. These should only
    /// be given to enforce an active space that is not chosen around the Fermi level.
    ///
    /// # Errors
    ///
    /// Errors with an [`ActiveSpaceError::Configuration`] if the configuration is invalid.
    pub fn new(
        num_electrons: NumElectrons,
        num_molecular_orbitals: i64,
        active_orbitals: Option<Vec<usize>>,
    ) -> Result<Self, anyhow::Error> {
        Self::from_params(ActiveSpaceParams {
            num_electrons,
            num_molecular_orbitals,
            active_orbitals,
        })
    }

    /// Creates a new active-space transformer from a set of parameters.
    ///
    /// # Errors
    ///
    /// Errors with an [`ActiveSpaceError::Configuration`] if the parameters are invalid.
    pub fn from_params(params: ActiveSpaceParams) -> Result<Self, anyhow::Error> {
        params.validate()?;
        Ok(Self { params })
    }

    /// Returns the parameters of the transformer.
    pub fn params(&self) -> &ActiveSpaceParams {
        &self.params
    }
}

impl<T> Transformer<T> for ActiveSpaceTransformer
where
    T: ComplexFloat<Real = f64> + LinalgScalar + fmt::Debug,
{
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn determine_active_space(
        &self,
        _: &GroupedProperty<T>,
        particle_number: &ParticleNumber,
    ) -> Result<(Vec<usize>, Vec<usize>), anyhow::Error> {
        let num_molecular_orbitals = usize::try_from(self.params.num_molecular_orbitals)
            .map_err(|err| format_err!(err))?;
        select_active_space(
            &self.params.num_electrons,
            num_molecular_orbitals,
            self.params.active_orbitals.as_deref(),
            particle_number,
        )
    }
}
