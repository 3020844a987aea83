use nalgebra::Point3;
use ndarray::Array2;

use crate::auxiliary::atom::{Atom, ElementMap};
use crate::auxiliary::molecule::Molecule;
use crate::basis::{ElectronicBasis, ElectronicBasisTransform};
use crate::properties::driver_metadata::DriverMetadata;
use crate::properties::particle_number::ParticleNumber;
use crate::properties::register_sized::{RegisterSizedKind, RegisterSizedProperty};
use crate::properties::vibrational::{VibrationalProperty, VibrationalPropertyKind};
use crate::properties::{GroupKind, GroupedProperty, Property};

fn particle_number(n: usize) -> ParticleNumber {
    ParticleNumber::builder()
        .num_spin_orbitals(2 * n)
        .num_alpha(1)
        .num_beta(1)
        .build()
        .unwrap()
}

fn ao_mo(n: usize) -> ElectronicBasisTransform<f64> {
    ElectronicBasisTransform::builder()
        .initial_basis(ElectronicBasis::AO)
        .final_basis(ElectronicBasis::MO)
        .coeff_alpha(Array2::eye(n))
        .build()
        .unwrap()
}

#[test]
fn test_grouped_property_children() {
    let mut group = GroupedProperty::<f64>::builder()
        .kind(GroupKind::ElectronicStructureDriverResult)
        .name("ElectronicStructureDriverResult")
        .property(particle_number(2))
        .property(RegisterSizedProperty::new(
            RegisterSizedKind::Magnetization,
            4,
        ))
        .build()
        .unwrap();
    assert_eq!(group.len(), 2);
    assert!(group.molecule().is_none());

    // Same name: replaced in place.
    group.add_property(particle_number(3));
    assert_eq!(group.len(), 2);
    let names = group.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
    assert_eq!(names, vec!["ParticleNumber", "Magnetization"]);
    match group.get_property("ParticleNumber") {
        Some(Property::ParticleNumber(pn)) => assert_eq!(pn.num_spin_orbitals(), 6),
        _ => panic!("ParticleNumber child not found."),
    }

    let group = group.with_property(
        DriverMetadata::builder()
            .program("PYSCF")
            .version("2.1.1")
            .build()
            .unwrap(),
    );
    assert_eq!(group.len(), 3);
    assert!(group.get_property("DriverMetadata").is_some());
    assert!(group.get_property("ElectronicEnergy").is_none());
}

#[test]
fn test_grouped_property_molecule() {
    let emap = ElementMap::new();
    let atoms = vec![
        Atom::new_ordinary("H", Point3::new(0.0, 0.0, 0.0), &emap, 1e-7).unwrap(),
        Atom::new_ordinary("H", Point3::new(0.0, 0.0, 0.74), &emap, 1e-7).unwrap(),
    ];
    let mol = Molecule::from_atoms(&atoms, 1e-7);
    let group = GroupedProperty::<f64>::builder()
        .kind(GroupKind::ElectronicStructureDriverResult)
        .name("H2")
        .molecule(mol.clone())
        .build()
        .unwrap();
    assert_eq!(group.molecule(), Some(&mol));
    assert!(group.is_empty());

    assert!(GroupedProperty::<f64>::builder()
        .kind(GroupKind::ElectronicDipoleMoment)
        .name("ElectronicDipoleMoment")
        .molecule(mol)
        .build()
        .is_err());
    assert!(GroupedProperty::<f64>::builder().name("Nameless").build().is_err());
}

#[test]
fn test_property_find_all_depth_first() {
    let inner = GroupedProperty::<f64>::builder()
        .kind(GroupKind::ElectronicDipoleMoment)
        .name("ElectronicDipoleMoment")
        .property(ao_mo(3))
        .build()
        .unwrap();
    let tree = Property::from(
        GroupedProperty::<f64>::builder()
            .kind(GroupKind::ElectronicStructureDriverResult)
            .name("ElectronicStructureDriverResult")
            .property(particle_number(2))
            .property(inner)
            .property(VibrationalProperty::new(
                VibrationalPropertyKind::OccupiedModals,
                vec![2, 2],
            ))
            .build()
            .unwrap(),
    );
    assert_eq!(tree.particle_numbers().len(), 1);
    let bts = tree.basis_transforms(ElectronicBasis::AO);
    assert_eq!(bts.len(), 1);
    assert_eq!(bts[0].n_final(), 3);
    assert!(tree.basis_transforms(ElectronicBasis::MO).is_empty());

    let names = tree.find_all(|prop| Some(prop.name()));
    assert_eq!(
        names,
        vec![
            "ElectronicStructureDriverResult",
            "ParticleNumber",
            "ElectronicDipoleMoment",
            "ElectronicBasisTransform",
            "OccupiedModals",
        ]
    );
    assert_eq!(tree.kind_name(), "ElectronicStructureDriverResult");
}

#[test]
fn test_group_kind_is_electronic() {
    assert!(GroupKind::ElectronicStructureDriverResult.is_electronic());
    assert!(GroupKind::ElectronicDipoleMoment.is_electronic());
    assert!(!GroupKind::VibrationalStructureDriverResult.is_electronic());
}
