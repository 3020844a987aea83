use nalgebra::Point3;

use crate::auxiliary::atom::{Atom, ElementMap};
use crate::auxiliary::molecule::Molecule;

const ROOT: &str = env!("CARGO_MANIFEST_DIR");

#[test]
fn test_molecule_from_xyz_h2o() {
    let mol = Molecule::from_xyz(format!("{ROOT}/tests/xyz/h2o.xyz"), 1e-7).unwrap();
    assert_eq!(mol.atoms.len(), 3);
    assert_eq!(mol.atoms[0].atomic_symbol, "O");
    assert_eq!(mol.atoms[0].atomic_number, 8);
    assert_eq!(mol.atoms[1].atomic_number, 1);
    assert_eq!(mol.n_electrons(), 10);

    let emap = ElementMap::new();
    let h = Atom::new_ordinary("H", Point3::new(0.0, 0.7572, -0.4692), &emap, 1e-7).unwrap();
    assert_eq!(mol.atoms[1], h);
}

#[test]
fn test_molecule_from_xyz_truncated() {
    assert!(Molecule::from_xyz(format!("{ROOT}/tests/xyz/truncated.xyz"), 1e-7).is_err());
    assert!(Molecule::from_xyz(format!("{ROOT}/tests/xyz/missing.xyz"), 1e-7).is_err());
}

#[test]
fn test_molecule_charge() {
    let emap = ElementMap::new();
    let li = Atom::from_xyz("Li 0.0 0.0 0.0", &emap, 1e-7).unwrap();
    let h = Atom::from_xyz("H 0.0 0.0 1.6", &emap, 1e-7).unwrap();
    let lih_cation = Molecule::from_atoms(&[li, h], 1e-7).with_charge_multiplicity(1, 2);
    assert_eq!(lih_cation.n_electrons(), 3);
    assert!(Atom::from_xyz("Xx 0.0 0.0 0.0", &emap, 1e-7).is_none());
    assert!(Atom::from_xyz("H 0.0 0.0", &emap, 1e-7).is_none());
}
