//! Transformers reducing electronic property trees to an active space of orbitals.
//!
//! Every transformer in this module follows the same recipe. The orbitals of the system are
//! partitioned into *active* and *inactive* sets; the inactive orbitals are eliminated by folding
//! their mean-field effect into an effective one-body operator and a constant energy shift; every
//! node of the property tree is then rewritten in the space spanned by the active orbitals. The
//! transformers differ only in how the orbital partitioning is determined.

use std::error::Error;
use std::fmt;

use anyhow::{self, format_err, Context};
use itertools::Itertools;
use ndarray::{Array1, Array2, Axis, LinalgScalar};
use num_complex::{Complex, ComplexFloat};
use num_traits::NumCast;

use crate::basis::{ElectronicBasis, ElectronicBasisTransform};
use crate::integrals::{ElectronicIntegrals, OneBodyElectronicIntegrals};
use crate::io::format::{
    log_subtitle, nice_indices, qas_output, qas_warn, write_subtitle, write_title, QasOutput,
};
use crate::properties::integral_property::IntegralProperty;
use crate::properties::particle_number::ParticleNumber;
use crate::properties::{GroupedProperty, Property};

pub mod active_space;
pub mod freeze_core;

#[cfg(test)]
#[path = "transformers_tests.rs"]
pub(crate) mod transformers_tests;

// ======
// Errors
// ======

/// An enumerated type for the errors raised by active-space transformers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveSpaceError {
    /// Variant for an invalid transformer configuration, detected at construction.
    Configuration(String),

    /// Variant for a configuration that cannot be realised for a given property tree.
    Feasibility(String),

    /// Variant for a property that the transformer does not know how to reduce.
    UnsupportedProperty {
        /// The name of the offending property.
        name: String,

        /// The kind of the offending property.
        kind: String,
    },
}

impl fmt::Display for ActiveSpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "Configuration error: {msg}"),
            Self::Feasibility(msg) => write!(f, "Feasibility error: {msg}"),
            Self::UnsupportedProperty { name, kind } => write!(
                f,
                "Property `{name}` of kind {kind} is not supported by this transformer."
            ),
        }
    }
}

impl Error for ActiveSpaceError {}

/// Shorthand for a feasibility error converted into an [`anyhow::Error`].
pub(crate) fn infeasible(msg: &str) -> anyhow::Error {
    ActiveSpaceError::Feasibility(msg.to_string()).into()
}

// ======
// Result
// ======

/// Structure containing the outcome of an active-space reduction.
#[derive(Clone, Debug)]
pub struct ActiveSpaceTransformResult<T>
where
    T: ComplexFloat + fmt::Debug,
{
    /// The name of the transformer that produced this result.
    transformer: &'static str,

    /// The reduced property tree.
    reduced: GroupedProperty<T>,

    /// The indices of the active spatial orbitals.
    active_orbitals: Vec<usize>,

    /// The indices of the inactive spatial orbitals.
    inactive_orbitals: Vec<usize>,

    /// The AO → MO transform restricted to the active orbitals.
    active_transform: ElectronicBasisTransform<T>,

    /// The density of the inactive electrons in the AO basis.
    inactive_density: OneBodyElectronicIntegrals<T>,

    /// The warnings raised while rewriting the property tree.
    warnings: Vec<String>,
}

impl<T> ActiveSpaceTransformResult<T>
where
    T: ComplexFloat + fmt::Debug,
{
    /// Returns the name of the transformer that produced this result.
    pub fn transformer(&self) -> &'static str {
        self.transformer
    }

    /// Returns the reduced property tree.
    pub fn reduced(&self) -> &GroupedProperty<T> {
        &self.reduced
    }

    /// Consumes the result and returns the reduced property tree.
    pub fn into_reduced(self) -> GroupedProperty<T> {
        self.reduced
    }

    /// Returns the indices of the active spatial orbitals.
    pub fn active_orbitals(&self) -> &[usize] {
        &self.active_orbitals
    }

    /// Returns the indices of the inactive spatial orbitals.
    pub fn inactive_orbitals(&self) -> &[usize] {
        &self.inactive_orbitals
    }

    /// Returns the AO → MO transform restricted to the active orbitals.
    pub fn active_transform(&self) -> &ElectronicBasisTransform<T> {
        &self.active_transform
    }

    /// Returns the inactive density in the AO basis.
    pub fn inactive_density(&self) -> &OneBodyElectronicIntegrals<T> {
        &self.inactive_density
    }

    /// Returns the warnings raised while rewriting the property tree.
    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }
}

impl<T> fmt::Display for ActiveSpaceTransformResult<T>
where
    T: ComplexFloat + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_title(f, &format!("{} Result", self.transformer))?;
        writeln!(f)?;
        writeln!(f, "Active orbitals: {}", nice_indices(&self.active_orbitals))?;
        writeln!(
            f,
            "Inactive orbitals: {}",
            nice_indices(&self.inactive_orbitals)
        )?;
        writeln!(f, "Active-space transform: {}", self.active_transform)?;
        writeln!(f)?;
        write_subtitle(f, "Reduced property tree")?;
        writeln!(f, "{}", self.reduced)?;
        if !self.warnings.is_empty() {
            write_subtitle(f, "Warnings")?;
            for warning in self.warnings.iter() {
                writeln!(f, "{warning}")?;
            }
        }
        Ok(())
    }
}

// =====
// Trait
// =====

/// Trait for transformers that reduce an electronic property tree to a subset of its orbitals.
pub trait Transformer<T>
where
    T: ComplexFloat<Real = f64> + LinalgScalar + fmt::Debug,
{
    /// Returns the name under which this transformer records energy shifts.
    fn name(&self) -> &'static str;

    /// Partitions the spatial orbitals of a property tree into active and inactive sets.
    ///
    /// # Arguments
    ///
    /// * `group` - The top-level property group being transformed.
    /// * `particle_number` - The orbital occupations of the system.
    ///
    /// # Returns
    ///
    /// A tuple of the active and inactive orbital indices.
    fn determine_active_space(
        &self,
        group: &GroupedProperty<T>,
        particle_number: &ParticleNumber,
    ) -> Result<(Vec<usize>, Vec<usize>), anyhow::Error>;

    /// Reduces a property tree to the active space determined by this transformer.
    ///
    /// The input must be an electronic property group containing exactly one
    /// [`ParticleNumber`] and exactly one basis transform out of the AO basis.
    ///
    /// # Errors
    ///
    /// Errors with an [`ActiveSpaceError`] if the input is not an electronic property group, if
    /// the required properties cannot be found, or if the active space cannot be realised.
    fn transform(
        &self,
        property: &Property<T>,
    ) -> Result<ActiveSpaceTransformResult<T>, anyhow::Error> {
        reduce(self, property).with_context(|| {
            format!(
                "Unable to reduce `{}` with {}.",
                property.name(),
                self.name()
            )
        })
    }
}

// ======================
// Shared reduction steps
// ======================

/// Performs the reduction of a property tree with the orbital partitioning of `transformer`.
fn reduce<T, R>(
    transformer: &R,
    property: &Property<T>,
) -> Result<ActiveSpaceTransformResult<T>, anyhow::Error>
where
    T: ComplexFloat<Real = f64> + LinalgScalar + fmt::Debug,
    R: Transformer<T> + ?Sized,
{
    let group = match property {
        Property::Group(group) if group.kind().is_electronic() => group,
        _ => {
            return Err(ActiveSpaceError::UnsupportedProperty {
                name: property.name(),
                kind: property.kind_name(),
            })
            .context("Only electronic property groups can be reduced to an active space.")
        }
    };

    let particle_number = match property.particle_numbers().as_slice() {
        [pn] => *pn,
        pns => {
            return Err(infeasible(&format!(
                "Exactly one `ParticleNumber` property is required, but {} were found.",
                pns.len()
            )))
        }
    };
    let transform = match property.basis_transforms(ElectronicBasis::AO).as_slice() {
        [bt] => *bt,
        bts => {
            return Err(infeasible(&format!(
                "Exactly one basis transform out of the AO basis is required, but {} were found.",
                bts.len()
            )))
        }
    };
    let n_spatial = particle_number.num_spatial_orbitals();
    if transform.n_final() != n_spatial {
        return Err(infeasible(&format!(
            "The basis transform yields {} orbitals, but the occupations describe {n_spatial} orbitals.",
            transform.n_final()
        )));
    }

    let (active, inactive) = transformer.determine_active_space(group, particle_number)?;
    check_partition(&active, &inactive, n_spatial)?;

    log_subtitle(&format!("Orbital partitioning by {}", transformer.name()));
    qas_output!("Active orbitals  : {}", nice_indices(&active));
    qas_output!("Inactive orbitals: {}", nice_indices(&inactive));
    qas_output!("");

    let active_transform = transform.restrict(&active)?;
    let inactive_density = inactive_density(transform, particle_number, &inactive)?;

    let mut reduction = Reduction {
        name: transformer.name(),
        active: &active,
        density: &inactive_density,
        transform: &active_transform,
        warnings: Vec::new(),
    };
    let reduced = match reduction.rewrite_group(group)? {
        Some(reduced) => reduced,
        None => GroupedProperty::builder()
            .kind(group.kind())
            .name(group.name())
            .build()?,
    };
    let warnings = reduction.warnings;

    let result = ActiveSpaceTransformResult {
        transformer: transformer.name(),
        reduced,
        active_orbitals: active,
        inactive_orbitals: inactive,
        active_transform,
        inactive_density,
        warnings,
    };
    result.log_output_display();
    Ok(result)
}

/// Checks that active and inactive orbital indices are in range, duplicate-free and disjoint.
fn check_partition(
    active: &[usize],
    inactive: &[usize],
    n_spatial: usize,
) -> Result<(), anyhow::Error> {
    if active.iter().chain(inactive.iter()).any(|i| *i >= n_spatial) {
        return Err(infeasible("More orbitals requested than available."));
    }
    if let Some(i) = active.iter().chain(inactive.iter()).duplicates().next() {
        return Err(infeasible(&format!(
            "Orbital {i} appears more than once across the active and inactive orbitals."
        )));
    }
    Ok(())
}

/// Constructs the AO-basis density of the electrons occupying the inactive orbitals,
/// $`\mathbf{D}^{\sigma} = \mathbf{C}^{\sigma}_{\mathrm{inact}}\,
/// \mathrm{diag}(\mathbf{n}^{\sigma}_{\mathrm{inact}})\,
/// (\mathbf{C}^{\sigma}_{\mathrm{inact}})^{\mathsf{T}}`$.
fn inactive_density<T>(
    transform: &ElectronicBasisTransform<T>,
    particle_number: &ParticleNumber,
    inactive: &[usize],
) -> Result<OneBodyElectronicIntegrals<T>, anyhow::Error>
where
    T: ComplexFloat + LinalgScalar,
{
    let spin_density = |coeff: &Array2<T>, occ: &Array1<f64>| -> Result<Array2<T>, anyhow::Error> {
        let c_inactive = coeff.select(Axis(1), inactive);
        let occ_inactive = inactive
            .iter()
            .map(|i| {
                <T as NumCast>::from(occ[*i]).ok_or_else(|| {
                    format_err!("Unable to convert occupation number {} into a scalar.", occ[*i])
                })
            })
            .collect::<Result<Array1<T>, _>>()?;
        Ok((&c_inactive * &occ_inactive).dot(&c_inactive.t()))
    };

    let density_alpha = spin_density(
        transform.coeff_alpha(),
        particle_number.occupation_alpha(),
    )?;
    let mut builder = OneBodyElectronicIntegrals::builder();
    builder.basis(ElectronicBasis::AO);
    if !transform.is_alpha_equal_beta()
        || particle_number.occupation_alpha() != particle_number.occupation_beta()
    {
        builder.beta(spin_density(
            transform.coeff_beta(),
            particle_number.occupation_beta(),
        )?);
    }
    builder.alpha(density_alpha).build().map_err(|err| format_err!(err))
}

/// Structure carrying the quantities needed to rewrite every node of a property tree.
struct Reduction<'a, T>
where
    T: ComplexFloat,
{
    /// The name under which energy shifts are recorded.
    name: &'static str,

    /// The active orbital indices.
    active: &'a [usize],

    /// The inactive density in the AO basis.
    density: &'a OneBodyElectronicIntegrals<T>,

    /// The AO → MO transform restricted to the active orbitals.
    transform: &'a ElectronicBasisTransform<T>,

    /// The warnings collected so far.
    warnings: Vec<String>,
}

impl<'a, T> Reduction<'a, T>
where
    T: ComplexFloat<Real = f64> + LinalgScalar + fmt::Debug,
{
    /// Rewrites a single node. `Ok(None)` means the node vanishes from the reduced tree.
    fn rewrite(&mut self, property: &Property<T>) -> Result<Option<Property<T>>, anyhow::Error> {
        match property {
            Property::Group(group) => Ok(self.rewrite_group(group)?.map(Property::Group)),
            Property::Integrals(prop) => Ok(Some(Property::Integrals(
                self.rewrite_integrals(prop)?,
            ))),
            Property::ParticleNumber(pn) => Ok(Some(Property::ParticleNumber(
                self.rewrite_particle_number(pn)?,
            ))),
            Property::RegisterSized(prop) => Ok(Some(Property::RegisterSized(
                prop.resized(2 * self.active.len()),
            ))),
            Property::BasisTransform(_) | Property::Metadata(_) => Ok(Some(property.clone())),
            Property::Vibrational(_) => Err(ActiveSpaceError::UnsupportedProperty {
                name: property.name(),
                kind: property.kind_name(),
            }
            .into()),
        }
    }

    fn rewrite_group(
        &mut self,
        group: &GroupedProperty<T>,
    ) -> Result<Option<GroupedProperty<T>>, anyhow::Error> {
        if !group.kind().is_electronic() {
            return Err(ActiveSpaceError::UnsupportedProperty {
                name: group.name().to_string(),
                kind: group.kind().to_string(),
            }
            .into());
        }
        let mut builder = GroupedProperty::builder();
        builder.kind(group.kind()).name(group.name());
        if let Some(mol) = group.molecule() {
            builder.molecule(mol.clone());
        }
        let mut reduced = builder.build()?;

        for (name, child) in group.iter() {
            match self.rewrite(child) {
                Ok(Some(reduced_child)) => reduced.add_property(reduced_child),
                Ok(None) => {}
                Err(err) => match err.downcast_ref::<ActiveSpaceError>() {
                    Some(ActiveSpaceError::UnsupportedProperty { kind, .. }) => {
                        let warning = format!(
                            "The property `{name}` of kind {kind} could not be transformed and has been dropped."
                        );
                        qas_warn!("{warning}");
                        self.warnings.push(warning);
                    }
                    _ => return Err(err),
                },
            }
        }

        if reduced.is_empty() {
            Ok(None)
        } else {
            Ok(Some(reduced))
        }
    }

    fn rewrite_integrals(
        &self,
        prop: &IntegralProperty<T>,
    ) -> Result<IntegralProperty<T>, anyhow::Error> {
        let fock = prop.integral_operator(self.density)?;
        let one_body = prop.one_body(ElectronicBasis::AO).ok_or_else(|| {
            format_err!("Property `{}` has no one-body integrals in the AO basis.", prop.name())
        })?;
        let e_inactive = one_body.try_add(&fock)?.compose(self.density)?;
        let e_inactive = Complex::new(0.5 * e_inactive.re(), 0.5 * e_inactive.im());

        let mut builder = IntegralProperty::builder();
        builder
            .name(prop.name())
            .kind(prop.kind().clone())
            .shift(prop.shift().clone());
        prop.integrals().for_each(|ints| {
            builder.integral(ints.clone());
        });
        builder.integral(ElectronicIntegrals::OneBody(fock));
        Ok(builder
            .build()?
            .transform_basis(self.transform)?
            .with_shift(self.name, e_inactive))
    }

    fn rewrite_particle_number(&self, pn: &ParticleNumber) -> Result<ParticleNumber, anyhow::Error> {
        let occupation_alpha = pn.occupation_alpha().select(Axis(0), self.active);
        let occupation_beta = pn.occupation_beta().select(Axis(0), self.active);
        ParticleNumber::builder()
            .num_spin_orbitals(2 * self.active.len())
            .num_alpha(occupation_alpha.sum().round() as usize)
            .num_beta(occupation_beta.sum().round() as usize)
            .occupation_alpha(occupation_alpha)
            .occupation_beta(occupation_beta)
            .build()
            .map_err(|err| format_err!(err))
    }
}
