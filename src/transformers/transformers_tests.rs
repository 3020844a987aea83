use ndarray::{Array2, Array4};
use num_complex::ComplexFloat;
use num_traits::NumCast;

use crate::auxiliary::molecule::Molecule;
use crate::basis::{ElectronicBasis, ElectronicBasisTransform};
use crate::integrals::{ElectronicIntegrals, OneBodyElectronicIntegrals, TwoBodyElectronicIntegrals};
use crate::properties::driver_metadata::DriverMetadata;
use crate::properties::integral_property::{DipoleAxis, IntegralProperty, IntegralPropertyKind};
use crate::properties::particle_number::ParticleNumber;
use crate::properties::register_sized::{RegisterSizedKind, RegisterSizedProperty};
use crate::properties::vibrational::{VibrationalProperty, VibrationalPropertyKind};
use crate::properties::{GroupKind, GroupedProperty, Property};
use crate::transformers::active_space::active_space_selection::NumElectrons;
use crate::transformers::active_space::ActiveSpaceTransformer;
use crate::transformers::{check_partition, ActiveSpaceError, Transformer};

// ==============
// Model fixtures
// ==============

fn cast<T: ComplexFloat>(x: f64) -> T {
    <T as NumCast>::from(x).unwrap()
}

pub(crate) fn model_core_hamiltonian(n: usize) -> Array2<f64> {
    Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            -2.0 + 0.3 * i as f64
        } else {
            0.1 / (1.0 + (i + j) as f64)
        }
    })
}

pub(crate) fn model_eri(n: usize) -> Array4<f64> {
    let s = |i: usize, j: usize| 0.5 / (1.0 + i.abs_diff(j) as f64) + 0.02 * (i + j) as f64;
    Array4::from_shape_fn((n, n, n, n), |(i, j, k, l)| {
        s(i, j) * s(k, l) + 0.05 * (s(i, j) + s(k, l))
    })
}

pub(crate) fn model_dipole(n: usize, axis: usize) -> Array2<f64> {
    Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            0.2 * (i + axis) as f64
        } else {
            0.05 * (axis + 1) as f64 / (1.0 + (i + j) as f64)
        }
    })
}

pub(crate) fn model_coefficients(n: usize) -> Array2<f64> {
    Array2::from_shape_fn((n, n), |(mu, p)| {
        if mu == p {
            1.0
        } else {
            0.05 * ((mu + 2 * p) as f64).sin()
        }
    })
}

pub(crate) fn model_particle_number(n: usize, n_occ: usize) -> ParticleNumber {
    ParticleNumber::builder()
        .num_spin_orbitals(2 * n)
        .num_alpha(n_occ)
        .num_beta(n_occ)
        .build()
        .unwrap()
}

/// Builds a closed-shell driver result with `n` orbitals, the lowest `n_occ` of which are doubly
/// occupied.
pub(crate) fn model_driver_result<T>(
    n: usize,
    n_occ: usize,
    molecule: Option<Molecule>,
) -> GroupedProperty<T>
where
    T: ComplexFloat + std::fmt::Debug,
{
    let energy = IntegralProperty::<T>::builder()
        .name("ElectronicEnergy")
        .kind(IntegralPropertyKind::ElectronicEnergy {
            nuclear_repulsion_energy: Some(1.2),
            reference_energy: None,
            orbital_energies: None,
        })
        .integral(ElectronicIntegrals::OneBody(
            OneBodyElectronicIntegrals::builder()
                .basis(ElectronicBasis::AO)
                .alpha(model_core_hamiltonian(n).map(|x| cast(*x)))
                .build()
                .unwrap(),
        ))
        .integral(ElectronicIntegrals::TwoBody(
            TwoBodyElectronicIntegrals::builder()
                .basis(ElectronicBasis::AO)
                .alpha_alpha(model_eri(n).map(|x| cast(*x)))
                .build()
                .unwrap(),
        ))
        .build()
        .unwrap();

    let mut dipole_builder = GroupedProperty::<T>::builder();
    dipole_builder
        .kind(GroupKind::ElectronicDipoleMoment)
        .name("ElectronicDipoleMoment");
    for (i, (name, axis)) in [
        ("DipoleMomentX", DipoleAxis::X),
        ("DipoleMomentY", DipoleAxis::Y),
        ("DipoleMomentZ", DipoleAxis::Z),
    ]
    .into_iter()
    .enumerate()
    {
        dipole_builder.property(
            IntegralProperty::<T>::builder()
                .name(name)
                .kind(IntegralPropertyKind::DipoleMoment { axis })
                .integral(ElectronicIntegrals::OneBody(
                    OneBodyElectronicIntegrals::builder()
                        .basis(ElectronicBasis::AO)
                        .alpha(model_dipole(n, i).map(|x| cast(*x)))
                        .build()
                        .unwrap(),
                ))
                .build()
                .unwrap(),
        );
    }
    let dipole = dipole_builder.build().unwrap();

    let transform = ElectronicBasisTransform::<T>::builder()
        .initial_basis(ElectronicBasis::AO)
        .final_basis(ElectronicBasis::MO)
        .coeff_alpha(model_coefficients(n).map(|x| cast(*x)))
        .build()
        .unwrap();

    let mut builder = GroupedProperty::<T>::builder();
    builder
        .kind(GroupKind::ElectronicStructureDriverResult)
        .name("ElectronicStructureDriverResult")
        .property(model_particle_number(n, n_occ))
        .property(energy)
        .property(dipole)
        .property(RegisterSizedProperty::new(
            RegisterSizedKind::AngularMomentum,
            2 * n,
        ))
        .property(RegisterSizedProperty::new(
            RegisterSizedKind::Magnetization,
            2 * n,
        ))
        .property(transform)
        .property(
            DriverMetadata::builder()
                .program("MODEL")
                .version("1.0")
                .config("basis: sto-3g")
                .build()
                .unwrap(),
        );
    if let Some(mol) = molecule {
        builder.molecule(mol);
    }
    builder.build().unwrap()
}

fn error_of(err: &anyhow::Error) -> ActiveSpaceError {
    err.downcast_ref::<ActiveSpaceError>()
        .cloned()
        .expect("Error is not an `ActiveSpaceError`.")
}

// =====
// Tests
// =====

#[test]
fn test_transformers_reject_non_electronic_input() {
    let transformer = ActiveSpaceTransformer::new(NumElectrons::Total(2), 2, None).unwrap();

    let leaf = Property::<f64>::from(model_particle_number(4, 2));
    let err = transformer.transform(&leaf).unwrap_err();
    assert!(matches!(
        error_of(&err),
        ActiveSpaceError::UnsupportedProperty { kind, .. } if kind == "ParticleNumber"
    ));

    let vib = Property::<f64>::from(
        GroupedProperty::<f64>::builder()
            .kind(GroupKind::VibrationalStructureDriverResult)
            .name("VibrationalStructureDriverResult")
            .property(VibrationalProperty::new(
                VibrationalPropertyKind::OccupiedModals,
                vec![2, 2, 3],
            ))
            .build()
            .unwrap(),
    );
    let err = transformer.transform(&vib).unwrap_err();
    assert!(matches!(
        error_of(&err),
        ActiveSpaceError::UnsupportedProperty { kind, .. } if kind == "VibrationalStructureDriverResult"
    ));
}

#[test]
fn test_transformers_missing_required_properties() {
    let transformer = ActiveSpaceTransformer::new(NumElectrons::Total(2), 2, None).unwrap();

    let no_pn = Property::from(
        GroupedProperty::<f64>::builder()
            .kind(GroupKind::ElectronicStructureDriverResult)
            .name("ElectronicStructureDriverResult")
            .property(
                ElectronicBasisTransform::<f64>::builder()
                    .initial_basis(ElectronicBasis::AO)
                    .final_basis(ElectronicBasis::MO)
                    .coeff_alpha(Array2::eye(4))
                    .build()
                    .unwrap(),
            )
            .build()
            .unwrap(),
    );
    let err = transformer.transform(&no_pn).unwrap_err();
    assert!(matches!(error_of(&err), ActiveSpaceError::Feasibility(_)));

    let no_bt = Property::from(
        GroupedProperty::<f64>::builder()
            .kind(GroupKind::ElectronicStructureDriverResult)
            .name("ElectronicStructureDriverResult")
            .property(model_particle_number(4, 2))
            .build()
            .unwrap(),
    );
    let err = transformer.transform(&no_bt).unwrap_err();
    assert!(matches!(error_of(&err), ActiveSpaceError::Feasibility(_)));

    // A second `ParticleNumber` nested in a subgroup makes the input ambiguous.
    let mut driver_result = model_driver_result::<f64>(4, 2, None);
    driver_result.add_property(
        GroupedProperty::<f64>::builder()
            .kind(GroupKind::ElectronicDipoleMoment)
            .name("Extra")
            .property(model_particle_number(4, 2))
            .build()
            .unwrap(),
    );
    let err = transformer
        .transform(&Property::from(driver_result))
        .unwrap_err();
    assert!(matches!(error_of(&err), ActiveSpaceError::Feasibility(_)));

    // Mismatched orbital counts between occupations and transform.
    let mut driver_result = model_driver_result::<f64>(4, 2, None);
    driver_result.add_property(model_particle_number(5, 2));
    let err = transformer
        .transform(&Property::from(driver_result))
        .unwrap_err();
    assert!(matches!(error_of(&err), ActiveSpaceError::Feasibility(_)));
}

#[test]
fn test_transformers_unsupported_children_are_dropped() {
    let transformer = ActiveSpaceTransformer::new(NumElectrons::Total(2), 2, None).unwrap();
    let mut driver_result = model_driver_result::<f64>(4, 2, None);
    driver_result.add_property(VibrationalProperty::new(
        VibrationalPropertyKind::VibrationalEnergy,
        vec![3],
    ));
    driver_result.add_property(
        GroupedProperty::<f64>::builder()
            .kind(GroupKind::ElectronicDipoleMoment)
            .name("OnlyVibrational")
            .property(VibrationalProperty::new(
                VibrationalPropertyKind::OccupiedModals,
                vec![2],
            ))
            .build()
            .unwrap(),
    );
    let n_children = driver_result.len();

    let result = transformer
        .transform(&Property::from(driver_result))
        .unwrap();
    let reduced = result.reduced();
    assert_eq!(result.warnings().len(), 2);
    assert!(result.warnings()[0].contains("VibrationalEnergy"));
    assert!(result.warnings()[1].contains("OccupiedModals"));
    assert!(reduced.get_property("VibrationalEnergy").is_none());
    // The subgroup left without children vanishes.
    assert!(reduced.get_property("OnlyVibrational").is_none());
    assert_eq!(reduced.len(), n_children - 2);
}

#[test]
fn test_transformers_passthrough_and_resized_leaves() {
    let transformer = ActiveSpaceTransformer::new(NumElectrons::Total(2), 3, None).unwrap();
    let driver_result = model_driver_result::<f64>(6, 3, None);
    let result = transformer
        .transform(&Property::from(driver_result.clone()))
        .unwrap();
    let reduced = result.reduced();
    assert_eq!(reduced.kind(), GroupKind::ElectronicStructureDriverResult);
    assert_eq!(reduced.name(), "ElectronicStructureDriverResult");
    let names = reduced.iter().map(|(name, _)| name.as_str()).collect::<Vec<_>>();
    let original_names = driver_result
        .iter()
        .map(|(name, _)| name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, original_names);

    match (
        reduced.get_property("DriverMetadata"),
        driver_result.get_property("DriverMetadata"),
    ) {
        (Some(Property::Metadata(new)), Some(Property::Metadata(old))) => assert_eq!(new, old),
        _ => panic!("DriverMetadata not passed through."),
    }
    match reduced.get_property("ElectronicBasisTransform") {
        Some(Property::BasisTransform(bt)) => assert_eq!(bt.n_final(), 6),
        _ => panic!("ElectronicBasisTransform not passed through."),
    }
    for kind in ["AngularMomentum", "Magnetization"] {
        match reduced.get_property(kind) {
            Some(Property::RegisterSized(prop)) => assert_eq!(prop.num_spin_orbitals(), 6),
            _ => panic!("{kind} not resized."),
        }
    }
    assert_eq!(result.active_transform().n_final(), 3);
    assert_eq!(result.inactive_density().basis(), ElectronicBasis::AO);
    assert!(!result.inactive_density().has_distinct_beta());
}

#[test]
fn test_transformers_check_partition() {
    assert!(check_partition(&[2, 3], &[0, 1], 4).is_ok());
    assert!(check_partition(&[2, 4], &[0, 1], 4).is_err());
    assert!(check_partition(&[1, 2], &[0, 1], 4).is_err());
    assert!(check_partition(&[], &[], 0).is_ok());
}
