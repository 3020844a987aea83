use approx::assert_abs_diff_eq;
use ndarray::{array, Array2, Array4};
use num_complex::Complex;

use crate::basis::{ElectronicBasis, ElectronicBasisTransform};
use crate::integrals::{ElectronicIntegrals, OneBodyElectronicIntegrals, TwoBodyElectronicIntegrals};

type C128 = Complex<f64>;

fn model_eri(n: usize) -> Array4<f64> {
    let s = Array2::from_shape_fn((n, n), |(i, j)| {
        1.0 / (1.0 + (i + j) as f64) + 0.1 * (i * j) as f64
    });
    Array4::from_shape_fn((n, n, n, n), |(i, j, k, l)| {
        s[(i, j)] * s[(k, l)] + 0.05 * (s[(i, j)] + s[(k, l)])
    })
}

#[test]
fn test_one_body_builder_validation() {
    assert!(OneBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha(array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]])
        .build()
        .is_err());
    assert!(OneBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha(array![[1.0, 0.0], [0.0, 1.0]])
        .beta(array![[1.0]])
        .build()
        .is_err());
}

#[test]
fn test_one_body_transform_basis() {
    let h = OneBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha(array![[1.0, 0.5], [0.5, 2.0]])
        .build()
        .unwrap();
    let s = 1.0 / 2.0f64.sqrt();
    let bt = ElectronicBasisTransform::<f64>::builder()
        .initial_basis(ElectronicBasis::AO)
        .final_basis(ElectronicBasis::MO)
        .coeff_alpha(array![[s, s], [s, -s]])
        .build()
        .unwrap();
    let h_mo = h.transform_basis(&bt).unwrap();
    assert_eq!(h_mo.basis(), ElectronicBasis::MO);
    assert!(!h_mo.has_distinct_beta());
    assert_abs_diff_eq!(h_mo.alpha(), &array![[2.0, -0.5], [-0.5, 1.0]], epsilon = 1e-12);

    // Already in the final basis: unchanged.
    let h_mo_again = h_mo.transform_basis(&bt).unwrap();
    assert_abs_diff_eq!(h_mo_again.alpha(), h_mo.alpha(), epsilon = 1e-14);

    // Restricting the transform shrinks the integrals.
    let h_mo_1 = h.transform_basis(&bt.restrict(&[1]).unwrap()).unwrap();
    assert_eq!(h_mo_1.n_funcs(), 1);
    assert_abs_diff_eq!(h_mo_1.alpha()[(0, 0)], 1.0, epsilon = 1e-12);

    // Unrestricted transform gives distinct beta integrals.
    let bt_u = ElectronicBasisTransform::<f64>::builder()
        .initial_basis(ElectronicBasis::AO)
        .final_basis(ElectronicBasis::MO)
        .coeff_alpha(array![[s, s], [s, -s]])
        .coeff_beta(array![[1.0, 0.0], [0.0, 1.0]])
        .build()
        .unwrap();
    let h_mo_u = h.transform_basis(&bt_u).unwrap();
    assert!(h_mo_u.has_distinct_beta());
    assert_abs_diff_eq!(h_mo_u.beta(), &array![[1.0, 0.5], [0.5, 2.0]], epsilon = 1e-12);
}

#[test]
fn test_one_body_compose() {
    let h = OneBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha(array![[1.0, 0.5], [0.5, 2.0]])
        .build()
        .unwrap();
    let d_closed = OneBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha(array![[1.0, 0.0], [0.0, 0.0]])
        .build()
        .unwrap();
    assert_abs_diff_eq!(h.compose(&d_closed).unwrap(), 2.0, epsilon = 1e-14);

    let d_open = OneBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha(array![[1.0, 0.0], [0.0, 0.0]])
        .beta(array![[0.0, 0.0], [0.0, 1.0]])
        .build()
        .unwrap();
    assert_abs_diff_eq!(h.compose(&d_open).unwrap(), 3.0, epsilon = 1e-14);

    let d_mo = OneBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::MO)
        .alpha(array![[1.0, 0.0], [0.0, 0.0]])
        .build()
        .unwrap();
    assert!(h.compose(&d_mo).is_err());

    let sum = h.try_add(&d_open).unwrap();
    assert!(sum.has_distinct_beta());
    assert_abs_diff_eq!(sum.alpha(), &array![[2.0, 0.5], [0.5, 2.0]], epsilon = 1e-14);
    assert_abs_diff_eq!(sum.beta(), &array![[1.0, 0.5], [0.5, 3.0]], epsilon = 1e-14);
}

#[test]
fn test_one_body_compose_complex() {
    let h = OneBodyElectronicIntegrals::<C128>::builder()
        .basis(ElectronicBasis::AO)
        .alpha(array![
            [C128::new(1.0, 0.0), C128::new(0.0, 0.5)],
            [C128::new(0.0, -0.5), C128::new(2.0, 0.0)]
        ])
        .build()
        .unwrap();
    let d = OneBodyElectronicIntegrals::<C128>::builder()
        .basis(ElectronicBasis::AO)
        .alpha(array![
            [C128::new(0.5, 0.0), C128::new(0.5, 0.0)],
            [C128::new(0.5, 0.0), C128::new(0.5, 0.0)]
        ])
        .build()
        .unwrap();
    // Per spin: 0.5 + 0.5i·0.5 − 0.5i·0.5 + 1.0 = 1.5
    let e = h.compose(&d).unwrap();
    assert_abs_diff_eq!(e.re, 3.0, epsilon = 1e-14);
    assert_abs_diff_eq!(e.im, 0.0, epsilon = 1e-14);
}

#[test]
fn test_two_body_builder_validation() {
    assert!(TwoBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha_alpha(Array4::zeros((2, 2, 2, 3)))
        .build()
        .is_err());
    assert!(TwoBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha_alpha(Array4::zeros((2, 2, 2, 2)))
        .beta_beta(Array4::zeros((3, 3, 3, 3)))
        .build()
        .is_err());
}

#[test]
fn test_two_body_transform_basis_permutation() {
    let eri = model_eri(3);
    let g = TwoBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha_alpha(eri.clone())
        .build()
        .unwrap();
    // Final function p is initial function π(p), with π = (1 0 2).
    #[rustfmt::skip]
    let perm = array![
        [0.0, 1.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 0.0, 1.0],
    ];
    let bt = ElectronicBasisTransform::<f64>::builder()
        .initial_basis(ElectronicBasis::AO)
        .final_basis(ElectronicBasis::MO)
        .coeff_alpha(perm)
        .build()
        .unwrap();
    let g_mo = g.transform_basis(&bt).unwrap();
    assert_eq!(g_mo.basis(), ElectronicBasis::MO);
    assert!(!g_mo.has_distinct_spin_blocks());
    let pi = [1, 0, 2];
    for (p, q, r, s) in [(0, 0, 0, 0), (0, 1, 2, 1), (2, 2, 1, 0), (1, 2, 0, 2)] {
        assert_abs_diff_eq!(
            g_mo.alpha_alpha()[(p, q, r, s)],
            eri[(pi[p], pi[q], pi[r], pi[s])],
            epsilon = 1e-12
        );
    }

    let g_small = g.transform_basis(&bt.restrict(&[2, 0]).unwrap()).unwrap();
    assert_eq!(g_small.alpha_alpha().shape(), &[2, 2, 2, 2]);
    assert_abs_diff_eq!(
        g_small.alpha_alpha()[(0, 1, 1, 0)],
        eri[(2, 1, 1, 2)],
        epsilon = 1e-12
    );
}

#[test]
fn test_two_body_transform_basis_unrestricted() {
    let eri = model_eri(2);
    let g = TwoBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha_alpha(eri.clone())
        .build()
        .unwrap();
    let bt = ElectronicBasisTransform::<f64>::builder()
        .initial_basis(ElectronicBasis::AO)
        .final_basis(ElectronicBasis::MO)
        .coeff_alpha(array![[1.0, 0.0], [0.0, 1.0]])
        .coeff_beta(array![[0.0, 1.0], [1.0, 0.0]])
        .build()
        .unwrap();
    let g_mo = g.transform_basis(&bt).unwrap();
    assert!(g_mo.has_distinct_spin_blocks());
    // (β β | α α) block: first pair swapped, second pair unchanged.
    assert_abs_diff_eq!(g_mo.beta_alpha()[(0, 0, 0, 1)], eri[(1, 1, 0, 1)], epsilon = 1e-12);
    assert_abs_diff_eq!(g_mo.alpha_beta()[(0, 0, 0, 1)], eri[(0, 0, 1, 0)], epsilon = 1e-12);
    assert_abs_diff_eq!(g_mo.beta_beta()[(0, 0, 0, 1)], eri[(1, 1, 1, 0)], epsilon = 1e-12);
    assert_abs_diff_eq!(g_mo.alpha_alpha()[(0, 0, 0, 1)], eri[(0, 0, 0, 1)], epsilon = 1e-12);
}

#[test]
fn test_two_body_integral_operator_closed_shell() {
    let n = 4;
    let eri = model_eri(n);
    let g = TwoBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha_alpha(eri.clone())
        .build()
        .unwrap();
    // Orbitals 0 and 1 singly occupied in each spin channel.
    let mut d = Array2::<f64>::zeros((n, n));
    d[(0, 0)] = 1.0;
    d[(1, 1)] = 1.0;
    let density = OneBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha(d)
        .build()
        .unwrap();
    let fock = g.integral_operator(&density).unwrap();
    assert!(!fock.has_distinct_beta());
    for p in 0..n {
        for q in 0..n {
            let expected = (0..2)
                .map(|i| 2.0 * eri[(i, i, p, q)] - eri[(i, q, p, i)])
                .sum::<f64>();
            assert_abs_diff_eq!(fock.alpha()[(p, q)], expected, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_two_body_integral_operator_open_shell() {
    let n = 3;
    let eri = model_eri(n);
    let g = TwoBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha_alpha(eri.clone())
        .build()
        .unwrap();
    let mut da = Array2::<f64>::zeros((n, n));
    da[(0, 0)] = 1.0;
    da[(1, 1)] = 1.0;
    let mut db = Array2::<f64>::zeros((n, n));
    db[(0, 0)] = 1.0;
    let density = OneBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::AO)
        .alpha(da)
        .beta(db)
        .build()
        .unwrap();
    let fock = g.integral_operator(&density).unwrap();
    assert!(fock.has_distinct_beta());
    for p in 0..n {
        for q in 0..n {
            let coulomb = 2.0 * eri[(0, 0, p, q)] + eri[(1, 1, p, q)];
            let fa = coulomb - eri[(p, 0, 0, q)] - eri[(p, 1, 1, q)];
            let fb = coulomb - eri[(p, 0, 0, q)];
            assert_abs_diff_eq!(fock.alpha()[(p, q)], fa, epsilon = 1e-12);
            assert_abs_diff_eq!(fock.beta()[(p, q)], fb, epsilon = 1e-12);
        }
    }

    // Not defined outside the AO basis.
    let g_mo = TwoBodyElectronicIntegrals::<f64>::builder()
        .basis(ElectronicBasis::MO)
        .alpha_alpha(eri)
        .build()
        .unwrap();
    assert!(g_mo.integral_operator(&density).is_err());
}

#[test]
fn test_electronic_integrals_wrapper() {
    let ints = ElectronicIntegrals::OneBody(
        OneBodyElectronicIntegrals::<f64>::builder()
            .basis(ElectronicBasis::AO)
            .alpha(array![[1.0, 0.0], [0.0, 1.0]])
            .build()
            .unwrap(),
    );
    assert_eq!(ints.order(), 1);
    assert_eq!(ints.basis(), ElectronicBasis::AO);
    let ints = ElectronicIntegrals::TwoBody(
        TwoBodyElectronicIntegrals::<f64>::builder()
            .basis(ElectronicBasis::AO)
            .alpha_alpha(model_eri(2))
            .build()
            .unwrap(),
    );
    assert_eq!(ints.order(), 2);
    assert_eq!(ints.n_funcs(), 2);
}
