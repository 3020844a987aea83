//! Physical quantities expressed through one- and two-electron integrals.

use std::fmt;

use anyhow::{self, format_err};
use derive_builder::Builder;
use indexmap::IndexMap;
use ndarray::{Array1, LinalgScalar};
use num_complex::{Complex, ComplexFloat};

use crate::basis::{ElectronicBasis, ElectronicBasisTransform};
use crate::integrals::{ElectronicIntegrals, OneBodyElectronicIntegrals, TwoBodyElectronicIntegrals};

#[cfg(test)]
#[path = "integral_property_tests.rs"]
mod integral_property_tests;

// ================
// Enum definitions
// ================

/// An enumerated type for Cartesian axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DipoleAxis {
    X,
    Y,
    Z,
}

impl fmt::Display for DipoleAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => write!(f, "x"),
            Self::Y => write!(f, "y"),
            Self::Z => write!(f, "z"),
        }
    }
}

/// An enumerated type for the physical quantities that are described by electronic integrals.
#[derive(Clone, Debug, PartialEq)]
pub enum IntegralPropertyKind {
    /// Variant for the electronic energy, whose integrals are the core Hamiltonian and the
    /// electron-repulsion integrals.
    ElectronicEnergy {
        /// The nuclear repulsion energy.
        nuclear_repulsion_energy: Option<f64>,

        /// The reference (*e.g.* Hartree–Fock) energy.
        reference_energy: Option<f64>,

        /// The orbital energies.
        orbital_energies: Option<Array1<f64>>,
    },

    /// Variant for one Cartesian component of the electronic dipole moment.
    DipoleMoment {
        /// The Cartesian component.
        axis: DipoleAxis,
    },
}

impl fmt::Display for IntegralPropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElectronicEnergy { .. } => write!(f, "ElectronicEnergy"),
            Self::DipoleMoment { axis } => write!(f, "DipoleMoment({axis})"),
        }
    }
}

// ==================
// Struct definitions
// ==================

/// Structure for a physical quantity described by electronic integrals in one or more bases.
///
/// At most one set of integrals is stored per basis and interaction order. Constant energy
/// contributions removed by transformers are recorded in [`Self::shift`] keyed by the name of the
/// transformer responsible.
#[derive(Builder, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct IntegralProperty<T>
where
    T: ComplexFloat,
{
    /// The name of the property.
    #[builder(setter(into))]
    name: String,

    /// The physical quantity described.
    kind: IntegralPropertyKind,

    /// The integrals keyed by basis and interaction order.
    #[builder(setter(custom))]
    integrals: IndexMap<(ElectronicBasis, usize), ElectronicIntegrals<T>>,

    /// Additive constant shifts keyed by the name of the transformer that introduced them.
    #[builder(default = "IndexMap::new()")]
    shift: IndexMap<String, Complex<f64>>,
}

impl<T> IntegralPropertyBuilder<T>
where
    T: ComplexFloat,
{
    /// Adds a set of integrals, replacing any previously added set with the same basis and
    /// interaction order.
    pub fn integral(&mut self, integrals: ElectronicIntegrals<T>) -> &mut Self {
        self.integrals
            .get_or_insert_with(IndexMap::new)
            .insert((integrals.basis(), integrals.order()), integrals);
        self
    }

    fn validate(&self) -> Result<(), String> {
        let integrals = self
            .integrals
            .as_ref()
            .filter(|integrals| !integrals.is_empty())
            .ok_or("No integrals found.".to_string())?;
        let kind = self.kind.as_ref().ok_or("No kind found.".to_string())?;
        if matches!(kind, IntegralPropertyKind::DipoleMoment { .. })
            && integrals.keys().any(|(_, order)| *order != 1)
        {
            return Err("Dipole moment integrals must be one-body integrals.".to_string());
        }
        for basis in [ElectronicBasis::AO, ElectronicBasis::MO] {
            let dims = integrals
                .values()
                .filter(|ints| ints.basis() == basis)
                .map(|ints| ints.n_funcs())
                .collect::<Vec<_>>();
            if dims.windows(2).any(|w| w[0] != w[1]) {
                return Err(format!(
                    "Integrals in the {basis} basis have inconsistent dimensions: {dims:?}."
                ));
            }
        }
        Ok(())
    }
}

impl<T> IntegralProperty<T>
where
    T: ComplexFloat,
{
    /// Returns a builder to construct a new [`IntegralProperty`].
    pub fn builder() -> IntegralPropertyBuilder<T> {
        IntegralPropertyBuilder::default()
    }

    /// Returns the name of the property.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the physical quantity described by the property.
    pub fn kind(&self) -> &IntegralPropertyKind {
        &self.kind
    }

    /// Returns an iterator over all stored integrals.
    pub fn integrals(&self) -> impl Iterator<Item = &ElectronicIntegrals<T>> {
        self.integrals.values()
    }

    /// Retrieves the integrals of a given interaction order in a given basis, if present.
    pub fn get_electronic_integral(
        &self,
        basis: ElectronicBasis,
        order: usize,
    ) -> Option<&ElectronicIntegrals<T>> {
        self.integrals.get(&(basis, order))
    }

    /// Retrieves the one-body integrals in a given basis, if present.
    pub fn one_body(&self, basis: ElectronicBasis) -> Option<&OneBodyElectronicIntegrals<T>> {
        match self.get_electronic_integral(basis, 1) {
            Some(ElectronicIntegrals::OneBody(ints)) => Some(ints),
            _ => None,
        }
    }

    /// Retrieves the two-body integrals in a given basis, if present.
    pub fn two_body(&self, basis: ElectronicBasis) -> Option<&TwoBodyElectronicIntegrals<T>> {
        match self.get_electronic_integral(basis, 2) {
            Some(ElectronicIntegrals::TwoBody(ints)) => Some(ints),
            _ => None,
        }
    }

    /// Adds a set of integrals, replacing any existing set with the same basis and interaction
    /// order.
    pub fn add_electronic_integral(&mut self, integrals: ElectronicIntegrals<T>) {
        self.integrals
            .insert((integrals.basis(), integrals.order()), integrals);
    }

    /// Returns the recorded constant shifts.
    pub fn shift(&self) -> &IndexMap<String, Complex<f64>> {
        &self.shift
    }

    /// Returns the sum of all recorded constant shifts.
    pub fn total_shift(&self) -> Complex<f64> {
        self.shift.values().sum()
    }

    /// Consumes this property and returns it with a constant shift recorded under `key`.
    pub fn with_shift(mut self, key: &str, value: Complex<f64>) -> Self {
        self.shift.insert(key.to_string(), value);
        self
    }
}

impl<T> IntegralProperty<T>
where
    T: ComplexFloat + LinalgScalar,
{
    /// Computes the one-body operator of this quantity in the AO basis in the presence of a
    /// fixed electron density.
    ///
    /// For the electronic energy this is the Fock-like matrix $`\mathbf{h} + \mathbf{J} -
    /// \mathbf{K}^{\sigma}`$; without two-electron integrals it is $`\mathbf{h}`$ alone. For a
    /// dipole moment component it is the dipole integral matrix itself.
    ///
    /// # Arguments
    ///
    /// * `density` - The density matrix in the AO basis.
    ///
    /// # Returns
    ///
    /// The one-body operator in the AO basis.
    pub fn integral_operator(
        &self,
        density: &OneBodyElectronicIntegrals<T>,
    ) -> Result<OneBodyElectronicIntegrals<T>, anyhow::Error> {
        let one_body = self.one_body(ElectronicBasis::AO).ok_or_else(|| {
            format_err!(
                "Property `{}` has no one-body integrals in the AO basis.",
                self.name
            )
        })?;
        match self.kind {
            IntegralPropertyKind::ElectronicEnergy { .. } => {
                match self.two_body(ElectronicBasis::AO) {
                    Some(two_body) => one_body.try_add(&two_body.integral_operator(density)?),
                    None => Ok(one_body.clone()),
                }
            }
            IntegralPropertyKind::DipoleMoment { .. } => Ok(one_body.clone()),
        }
    }

    /// Transforms all integrals in the initial basis of `transform` into its final basis.
    ///
    /// Integrals already stored in the final basis are discarded and replaced by the transformed
    /// ones; integrals in the initial basis are kept.
    pub fn transform_basis(
        &self,
        transform: &ElectronicBasisTransform<T>,
    ) -> Result<Self, anyhow::Error> {
        let mut integrals = self
            .integrals
            .iter()
            .filter(|((basis, _), _)| *basis != transform.final_basis())
            .map(|(key, ints)| (*key, ints.clone()))
            .collect::<IndexMap<_, _>>();
        for ints in self
            .integrals
            .values()
            .filter(|ints| ints.basis() == transform.initial_basis())
        {
            let transformed = ints.transform_basis(transform)?;
            integrals.insert((transformed.basis(), transformed.order()), transformed);
        }
        Ok(Self {
            name: self.name.clone(),
            kind: self.kind.clone(),
            integrals,
            shift: self.shift.clone(),
        })
    }
}

impl<T> fmt::Debug for IntegralProperty<T>
where
    T: ComplexFloat + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegralProperty")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("integrals", &self.integrals.values().collect::<Vec<_>>())
            .field("shift", &self.shift)
            .finish()
    }
}

impl<T> fmt::Display for IntegralProperty<T>
where
    T: ComplexFloat + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.name, self.kind)?;
        if let IntegralPropertyKind::ElectronicEnergy {
            nuclear_repulsion_energy,
            reference_energy,
            ..
        } = &self.kind
        {
            if let Some(e_nuc) = nuclear_repulsion_energy {
                writeln!(f, "  Nuclear repulsion energy: {e_nuc:+.7}")?;
            }
            if let Some(e_ref) = reference_energy {
                writeln!(f, "  Reference energy: {e_ref:+.7}")?;
            }
        }
        for ints in self.integrals.values() {
            writeln!(f, "  {ints:?}")?;
        }
        for (key, value) in self.shift.iter() {
            writeln!(f, "  Shift ({key}): {:+.7} {:+.7}i", value.re, value.im)?;
        }
        Ok(())
    }
}
