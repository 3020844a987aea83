//! Property trees describing the results of electronic-structure calculations.

use std::fmt;

use derive_builder::Builder;
use indexmap::IndexMap;
use num_complex::ComplexFloat;

use crate::auxiliary::molecule::Molecule;
use crate::basis::{ElectronicBasis, ElectronicBasisTransform};

pub mod driver_metadata;
pub mod integral_property;
pub mod particle_number;
pub mod register_sized;
pub mod vibrational;

use driver_metadata::DriverMetadata;
use integral_property::IntegralProperty;
use particle_number::ParticleNumber;
use register_sized::RegisterSizedProperty;
use vibrational::VibrationalProperty;

#[cfg(test)]
#[path = "properties_tests.rs"]
mod properties_tests;

// ================
// Enum definitions
// ================

/// An enumerated type for the kinds of property groups.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GroupKind {
    /// Variant for the complete result of an electronic-structure driver.
    ElectronicStructureDriverResult,

    /// Variant for the Cartesian components of the electronic dipole moment.
    ElectronicDipoleMoment,

    /// Variant for the complete result of a vibrational-structure driver.
    VibrationalStructureDriverResult,
}

impl GroupKind {
    /// Returns `true` if groups of this kind describe electronic properties.
    pub fn is_electronic(&self) -> bool {
        matches!(
            self,
            Self::ElectronicStructureDriverResult | Self::ElectronicDipoleMoment
        )
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElectronicStructureDriverResult => write!(f, "ElectronicStructureDriverResult"),
            Self::ElectronicDipoleMoment => write!(f, "ElectronicDipoleMoment"),
            Self::VibrationalStructureDriverResult => {
                write!(f, "VibrationalStructureDriverResult")
            }
        }
    }
}

/// An enumerated type for the nodes of a property tree.
#[derive(Clone, Debug)]
pub enum Property<T>
where
    T: ComplexFloat + fmt::Debug,
{
    /// Variant for a named group of child properties.
    Group(GroupedProperty<T>),

    /// Variant for orbital occupations and particle counts.
    ParticleNumber(ParticleNumber),

    /// Variant for a quantity described by electronic integrals.
    Integrals(IntegralProperty<T>),

    /// Variant for a quantity defined only by the size of the spin-orbital register.
    RegisterSized(RegisterSizedProperty),

    /// Variant for a change of basis.
    BasisTransform(ElectronicBasisTransform<T>),

    /// Variant for driver provenance.
    Metadata(DriverMetadata),

    /// Variant for a property of a vibrational structure problem.
    Vibrational(VibrationalProperty),
}

impl<T> Property<T>
where
    T: ComplexFloat + fmt::Debug,
{
    /// Returns the name under which this property is stored in a group.
    pub fn name(&self) -> String {
        match self {
            Self::Group(group) => group.name().to_string(),
            Self::ParticleNumber(_) => "ParticleNumber".to_string(),
            Self::Integrals(prop) => prop.name().to_string(),
            Self::RegisterSized(prop) => prop.kind().to_string(),
            Self::BasisTransform(_) => "ElectronicBasisTransform".to_string(),
            Self::Metadata(_) => "DriverMetadata".to_string(),
            Self::Vibrational(prop) => prop.kind().to_string(),
        }
    }

    /// Returns a description of the concrete kind of this property.
    pub fn kind_name(&self) -> String {
        match self {
            Self::Group(group) => group.kind().to_string(),
            Self::ParticleNumber(_) => "ParticleNumber".to_string(),
            Self::Integrals(prop) => prop.kind().to_string(),
            Self::RegisterSized(prop) => prop.kind().to_string(),
            Self::BasisTransform(_) => "ElectronicBasisTransform".to_string(),
            Self::Metadata(_) => "DriverMetadata".to_string(),
            Self::Vibrational(prop) => prop.kind().to_string(),
        }
    }

    /// Collects, in depth-first order, everything that `f` extracts from this property and its
    /// descendants.
    pub fn find_all<'a, U, F>(&'a self, f: F) -> Vec<U>
    where
        F: Fn(&'a Property<T>) -> Option<U>,
    {
        let mut found = Vec::new();
        self.find_all_into(&f, &mut found);
        found
    }

    fn find_all_into<'a, U, F>(&'a self, f: &F, found: &mut Vec<U>)
    where
        F: Fn(&'a Property<T>) -> Option<U>,
    {
        if let Some(item) = f(self) {
            found.push(item);
        }
        if let Self::Group(group) = self {
            group
                .properties
                .values()
                .for_each(|child| child.find_all_into(f, found));
        }
    }

    /// Returns all [`ParticleNumber`] leaves in this tree.
    pub fn particle_numbers(&self) -> Vec<&ParticleNumber> {
        self.find_all(|prop| match prop {
            Self::ParticleNumber(pn) => Some(pn),
            _ => None,
        })
    }

    /// Returns all basis transforms in this tree whose initial basis is `initial_basis`.
    pub fn basis_transforms(
        &self,
        initial_basis: ElectronicBasis,
    ) -> Vec<&ElectronicBasisTransform<T>> {
        self.find_all(|prop| match prop {
            Self::BasisTransform(bt) if bt.initial_basis() == initial_basis => Some(bt),
            _ => None,
        })
    }
}

impl<T> fmt::Display for Property<T>
where
    T: ComplexFloat + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Group(group) => write!(f, "{group}"),
            Self::ParticleNumber(pn) => write!(f, "{pn}"),
            Self::Integrals(prop) => write!(f, "{prop}"),
            Self::RegisterSized(prop) => write!(f, "{prop}"),
            Self::BasisTransform(bt) => write!(f, "{bt}"),
            Self::Metadata(metadata) => write!(f, "{metadata}"),
            Self::Vibrational(prop) => write!(f, "{prop}"),
        }
    }
}

// ----
// From
// ----

impl<T> From<GroupedProperty<T>> for Property<T>
where
    T: ComplexFloat + fmt::Debug,
{
    fn from(group: GroupedProperty<T>) -> Self {
        Self::Group(group)
    }
}

impl<T> From<ParticleNumber> for Property<T>
where
    T: ComplexFloat + fmt::Debug,
{
    fn from(pn: ParticleNumber) -> Self {
        Self::ParticleNumber(pn)
    }
}

impl<T> From<IntegralProperty<T>> for Property<T>
where
    T: ComplexFloat + fmt::Debug,
{
    fn from(prop: IntegralProperty<T>) -> Self {
        Self::Integrals(prop)
    }
}

impl<T> From<RegisterSizedProperty> for Property<T>
where
    T: ComplexFloat + fmt::Debug,
{
    fn from(prop: RegisterSizedProperty) -> Self {
        Self::RegisterSized(prop)
    }
}

impl<T> From<ElectronicBasisTransform<T>> for Property<T>
where
    T: ComplexFloat + fmt::Debug,
{
    fn from(bt: ElectronicBasisTransform<T>) -> Self {
        Self::BasisTransform(bt)
    }
}

impl<T> From<DriverMetadata> for Property<T>
where
    T: ComplexFloat + fmt::Debug,
{
    fn from(metadata: DriverMetadata) -> Self {
        Self::Metadata(metadata)
    }
}

impl<T> From<VibrationalProperty> for Property<T>
where
    T: ComplexFloat + fmt::Debug,
{
    fn from(prop: VibrationalProperty) -> Self {
        Self::Vibrational(prop)
    }
}

// ==================
// Struct definitions
// ==================

/// Structure for a named group of uniquely named child properties, kept in insertion order.
#[derive(Builder, Clone, Debug)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct GroupedProperty<T>
where
    T: ComplexFloat + fmt::Debug,
{
    /// The kind of the group.
    kind: GroupKind,

    /// The name of the group.
    #[builder(setter(into))]
    name: String,

    /// The molecule described by the group. Only driver-result groups carry a molecule.
    #[builder(setter(strip_option), default = "None")]
    molecule: Option<Molecule>,

    /// The child properties keyed by their names.
    #[builder(setter(custom), default = "IndexMap::new()")]
    properties: IndexMap<String, Property<T>>,
}

impl<T> GroupedPropertyBuilder<T>
where
    T: ComplexFloat + fmt::Debug,
{
    /// Adds a child property under its own name, replacing any existing child of the same name.
    pub fn property<P: Into<Property<T>>>(&mut self, property: P) -> &mut Self {
        let property = property.into();
        self.properties
            .get_or_insert_with(IndexMap::new)
            .insert(property.name(), property);
        self
    }

    fn validate(&self) -> Result<(), String> {
        let kind = self.kind.ok_or("No group kind found.".to_string())?;
        if matches!(self.molecule, Some(Some(_)))
            && kind != GroupKind::ElectronicStructureDriverResult
        {
            return Err(format!("A group of kind {kind} cannot carry a molecule."));
        }
        Ok(())
    }
}

impl<T> GroupedProperty<T>
where
    T: ComplexFloat + fmt::Debug,
{
    /// Returns a builder to construct a new [`GroupedProperty`].
    pub fn builder() -> GroupedPropertyBuilder<T> {
        GroupedPropertyBuilder::default()
    }

    /// Returns the kind of the group.
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Returns the name of the group.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the molecule carried by the group, if any.
    pub fn molecule(&self) -> Option<&Molecule> {
        self.molecule.as_ref()
    }

    /// Adds a child property under its own name, replacing any existing child of the same name.
    pub fn add_property<P: Into<Property<T>>>(&mut self, property: P) {
        let property = property.into();
        self.properties.insert(property.name(), property);
    }

    /// Consumes the group and returns it with an additional child property.
    pub fn with_property<P: Into<Property<T>>>(mut self, property: P) -> Self {
        self.add_property(property);
        self
    }

    /// Retrieves a child property by name.
    pub fn get_property(&self, name: &str) -> Option<&Property<T>> {
        self.properties.get(name)
    }

    /// Returns an iterator over the named children in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Property<T>)> {
        self.properties.iter()
    }

    /// Returns the number of children.
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Returns `true` if the group has no children.
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

impl<T> fmt::Display for GroupedProperty<T>
where
    T: ComplexFloat + fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} [{}]", self.name, self.kind)?;
        if let Some(mol) = self.molecule.as_ref() {
            writeln!(f, "  Molecule: {} atoms, charge {}", mol.atoms.len(), mol.charge)?;
        }
        for child in self.properties.values() {
            for line in child.to_string().lines() {
                writeln!(f, "  {line}")?;
            }
        }
        Ok(())
    }
}
