//! One- and two-electron integrals in a given electronic basis.

use std::fmt;

use anyhow::{self, ensure, format_err};
use derive_builder::Builder;
use ndarray::{Array2, Array4, Ix0, Ix2, Ix4, LinalgScalar};
use ndarray_einsum_beta::einsum;
use num_complex::ComplexFloat;

use crate::basis::{ElectronicBasis, ElectronicBasisTransform};

#[cfg(test)]
#[path = "integrals_tests.rs"]
mod integrals_tests;

// ==================
// Struct definitions
// ==================

// --------
// One-body
// --------

/// Structure managing one-electron integrals, or any one-body matrix such as a density matrix, in a
/// given electronic basis.
#[derive(Builder, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct OneBodyElectronicIntegrals<T>
where
    T: ComplexFloat,
{
    /// The basis in which the matrices are expressed.
    basis: ElectronicBasis,

    /// The alpha-spin matrix.
    alpha: Array2<T>,

    /// The beta-spin matrix. If `None`, this is the same as [`Self::alpha`].
    #[builder(setter(strip_option), default = "None")]
    beta: Option<Array2<T>>,
}

impl<T> OneBodyElectronicIntegralsBuilder<T>
where
    T: ComplexFloat,
{
    fn validate(&self) -> Result<(), String> {
        let alpha = self
            .alpha
            .as_ref()
            .ok_or("No alpha matrix found.".to_string())?;
        if alpha.nrows() != alpha.ncols() {
            return Err(format!(
                "The alpha matrix must be square, but has dimensions {:?}.",
                alpha.shape()
            ));
        }
        if let Some(Some(beta)) = self.beta.as_ref() {
            if beta.shape() != alpha.shape() {
                return Err(format!(
                    "The beta matrix dimensions ({:?}) do not match the alpha matrix dimensions ({:?}).",
                    beta.shape(),
                    alpha.shape()
                ));
            }
        }
        Ok(())
    }
}

impl<T> OneBodyElectronicIntegrals<T>
where
    T: ComplexFloat,
{
    /// Returns a builder to construct a new [`OneBodyElectronicIntegrals`].
    pub fn builder() -> OneBodyElectronicIntegralsBuilder<T> {
        OneBodyElectronicIntegralsBuilder::default()
    }

    /// Returns the basis in which the matrices are expressed.
    pub fn basis(&self) -> ElectronicBasis {
        self.basis
    }

    /// Returns the alpha-spin matrix.
    pub fn alpha(&self) -> &Array2<T> {
        &self.alpha
    }

    /// Returns the beta-spin matrix.
    pub fn beta(&self) -> &Array2<T> {
        self.beta.as_ref().unwrap_or(&self.alpha)
    }

    /// Returns `true` if a distinct beta-spin matrix is stored.
    pub fn has_distinct_beta(&self) -> bool {
        self.beta.is_some()
    }

    /// Returns the number of basis functions.
    pub fn n_funcs(&self) -> usize {
        self.alpha.nrows()
    }
}

impl<T> OneBodyElectronicIntegrals<T>
where
    T: ComplexFloat + LinalgScalar,
{
    /// Transforms these integrals into the final basis of a basis transform.
    ///
    /// Each spin matrix $`\mathbf{h}^{\sigma}`$ becomes
    /// $`(\mathbf{C}^{\sigma})^{\mathsf{T}} \mathbf{h}^{\sigma} \mathbf{C}^{\sigma}`$. Integrals
    /// already in the final basis of an AO → MO transform are returned unchanged.
    ///
    /// # Arguments
    ///
    /// * `transform` - The basis transform.
    ///
    /// # Returns
    ///
    /// The transformed integrals.
    pub fn transform_basis(
        &self,
        transform: &ElectronicBasisTransform<T>,
    ) -> Result<Self, anyhow::Error> {
        if self.basis == transform.final_basis() && self.basis != transform.initial_basis() {
            return Ok(self.clone());
        }
        ensure!(
            self.basis == transform.initial_basis(),
            "One-body integrals in the {} basis cannot be transformed by a {} → {} transform.",
            self.basis,
            transform.initial_basis(),
            transform.final_basis()
        );
        ensure!(
            self.n_funcs() == transform.n_initial(),
            "One-body integrals of dimension {} cannot be transformed by a transform from {} functions.",
            self.n_funcs(),
            transform.n_initial()
        );
        let ca = transform.coeff_alpha();
        let alpha = ca.t().dot(&self.alpha).dot(ca);
        let beta = if self.has_distinct_beta() || !transform.is_alpha_equal_beta() {
            let cb = transform.coeff_beta();
            Some(cb.t().dot(self.beta()).dot(cb))
        } else {
            None
        };
        Ok(Self {
            basis: transform.final_basis(),
            alpha,
            beta,
        })
    }

    /// Contracts these integrals fully with a density matrix, summing over both spin channels:
    /// ```math
    ///     \sum_{\sigma} \sum_{ij} h^{\sigma}_{ij} D^{\sigma}_{ji}.
    /// ```
    ///
    /// # Arguments
    ///
    /// * `density` - The density matrix, expressed in the same basis.
    ///
    /// # Returns
    ///
    /// The scalar contraction.
    pub fn compose(&self, density: &Self) -> Result<T, anyhow::Error> {
        ensure!(
            self.basis == density.basis,
            "Unable to contract integrals in the {} basis with a density in the {} basis.",
            self.basis,
            density.basis
        );
        ensure!(
            self.n_funcs() == density.n_funcs(),
            "Mismatched dimensions between integrals ({}) and density ({}).",
            self.n_funcs(),
            density.n_funcs()
        );
        [
            (self.alpha(), density.alpha()),
            (self.beta(), density.beta()),
        ]
        .into_iter()
        .try_fold(T::zero(), |acc, (h, d)| -> Result<T, anyhow::Error> {
            // i = μ, j = ν
            einsum("ij,ji->", &[h, d])
                .map_err(|err| format_err!(err))?
                .into_dimensionality::<Ix0>()?
                .into_iter()
                .next()
                .ok_or_else(|| format_err!("Unable to extract the result of the einsum contraction."))
                .map(|v| acc + v)
        })
    }

    /// Adds another set of one-body integrals in the same basis to these.
    pub fn try_add(&self, other: &Self) -> Result<Self, anyhow::Error> {
        ensure!(
            self.basis == other.basis && self.n_funcs() == other.n_funcs(),
            "Unable to add one-body integrals in the {} basis ({} functions) to those in the {} basis ({} functions).",
            self.basis,
            self.n_funcs(),
            other.basis,
            other.n_funcs()
        );
        let beta = if self.has_distinct_beta() || other.has_distinct_beta() {
            Some(self.beta() + other.beta())
        } else {
            None
        };
        Ok(Self {
            basis: self.basis,
            alpha: &self.alpha + &other.alpha,
            beta,
        })
    }
}

impl<T> fmt::Debug for OneBodyElectronicIntegrals<T>
where
    T: ComplexFloat,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OneBodyElectronicIntegrals[{} basis, {}×{}{}]",
            self.basis,
            self.n_funcs(),
            self.n_funcs(),
            if self.has_distinct_beta() {
                ", spin-unrestricted"
            } else {
                ""
            }
        )
    }
}

// --------
// Two-body
// --------

/// Structure managing two-electron repulsion integrals $`(ij|kl)`$ in chemists' notation.
///
/// The spin blocks are labelled by the spins of the first and second index pairs, so that
/// [`Self::beta_alpha`] holds $`(i_{\beta} j_{\beta} | k_{\alpha} l_{\alpha})`$. Absent blocks are
/// the same as [`Self::alpha_alpha`].
#[derive(Builder, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct TwoBodyElectronicIntegrals<T>
where
    T: ComplexFloat,
{
    /// The basis in which the tensors are expressed.
    basis: ElectronicBasis,

    /// The alpha-alpha block.
    alpha_alpha: Array4<T>,

    /// The beta-alpha block.
    #[builder(setter(strip_option), default = "None")]
    beta_alpha: Option<Array4<T>>,

    /// The beta-beta block.
    #[builder(setter(strip_option), default = "None")]
    beta_beta: Option<Array4<T>>,

    /// The alpha-beta block.
    #[builder(setter(strip_option), default = "None")]
    alpha_beta: Option<Array4<T>>,
}

impl<T> TwoBodyElectronicIntegralsBuilder<T>
where
    T: ComplexFloat,
{
    fn validate(&self) -> Result<(), String> {
        let alpha_alpha = self
            .alpha_alpha
            .as_ref()
            .ok_or("No alpha-alpha tensor found.".to_string())?;
        let n = alpha_alpha.shape()[0];
        if alpha_alpha.shape().iter().any(|dim| *dim != n) {
            return Err(format!(
                "The shape of the alpha-alpha tensor is invalid: all four dimensions must have the same length, but {:?} found.",
                alpha_alpha.shape()
            ));
        }
        let blocks_consistent = [&self.beta_alpha, &self.beta_beta, &self.alpha_beta]
            .into_iter()
            .all(|block| match block {
                Some(Some(tensor)) => tensor.shape() == alpha_alpha.shape(),
                _ => true,
            });
        if blocks_consistent {
            Ok(())
        } else {
            Err("The spin blocks of the two-electron tensor have inconsistent shapes.".to_string())
        }
    }
}

impl<T> TwoBodyElectronicIntegrals<T>
where
    T: ComplexFloat,
{
    /// Returns a builder to construct a new [`TwoBodyElectronicIntegrals`].
    pub fn builder() -> TwoBodyElectronicIntegralsBuilder<T> {
        TwoBodyElectronicIntegralsBuilder::default()
    }

    /// Returns the basis in which the tensors are expressed.
    pub fn basis(&self) -> ElectronicBasis {
        self.basis
    }

    /// Returns the number of basis functions.
    pub fn n_funcs(&self) -> usize {
        self.alpha_alpha.shape()[0]
    }

    /// Returns the alpha-alpha block.
    pub fn alpha_alpha(&self) -> &Array4<T> {
        &self.alpha_alpha
    }

    /// Returns the beta-alpha block.
    pub fn beta_alpha(&self) -> &Array4<T> {
        self.beta_alpha.as_ref().unwrap_or(&self.alpha_alpha)
    }

    /// Returns the beta-beta block.
    pub fn beta_beta(&self) -> &Array4<T> {
        self.beta_beta.as_ref().unwrap_or(&self.alpha_alpha)
    }

    /// Returns the alpha-beta block.
    pub fn alpha_beta(&self) -> &Array4<T> {
        self.alpha_beta.as_ref().unwrap_or(&self.alpha_alpha)
    }

    /// Returns `true` if any spin block differs from the alpha-alpha block.
    pub fn has_distinct_spin_blocks(&self) -> bool {
        self.beta_alpha.is_some() || self.beta_beta.is_some() || self.alpha_beta.is_some()
    }
}

impl<T> TwoBodyElectronicIntegrals<T>
where
    T: ComplexFloat + LinalgScalar,
{
    /// Transforms these integrals into the final basis of a basis transform.
    ///
    /// Every tensor index is transformed with the coefficient matrix of the spin channel that the
    /// index belongs to:
    /// ```math
    ///     (pq|rs) = \sum_{ijkl} C_{ip} C_{jq} (ij|kl) C_{kr} C_{ls}.
    /// ```
    ///
    /// # Arguments
    ///
    /// * `transform` - The basis transform.
    ///
    /// # Returns
    ///
    /// The transformed integrals.
    pub fn transform_basis(
        &self,
        transform: &ElectronicBasisTransform<T>,
    ) -> Result<Self, anyhow::Error> {
        if self.basis == transform.final_basis() && self.basis != transform.initial_basis() {
            return Ok(self.clone());
        }
        ensure!(
            self.basis == transform.initial_basis(),
            "Two-body integrals in the {} basis cannot be transformed by a {} → {} transform.",
            self.basis,
            transform.initial_basis(),
            transform.final_basis()
        );
        ensure!(
            self.n_funcs() == transform.n_initial(),
            "Two-body integrals of dimension {} cannot be transformed by a transform from {} functions.",
            self.n_funcs(),
            transform.n_initial()
        );
        let ca = transform.coeff_alpha();
        let cb = transform.coeff_beta();
        let transform_block = |eri: &Array4<T>,
                               c12: &Array2<T>,
                               c34: &Array2<T>|
         -> Result<Array4<T>, anyhow::Error> {
            // i, j, k, l: initial basis; p, q, r, s: final basis
            einsum("ijkl,ip,jq,kr,ls->pqrs", &[eri, c12, c12, c34, c34])
                .map_err(|err| format_err!(err))?
                .into_dimensionality::<Ix4>()
                .map_err(|err| format_err!(err))
        };
        let alpha_alpha = transform_block(&self.alpha_alpha, ca, ca)?;
        if !self.has_distinct_spin_blocks() && transform.is_alpha_equal_beta() {
            return Ok(Self {
                basis: transform.final_basis(),
                alpha_alpha,
                beta_alpha: None,
                beta_beta: None,
                alpha_beta: None,
            });
        }
        Ok(Self {
            basis: transform.final_basis(),
            alpha_alpha,
            beta_alpha: Some(transform_block(self.beta_alpha(), cb, ca)?),
            beta_beta: Some(transform_block(self.beta_beta(), cb, cb)?),
            alpha_beta: Some(transform_block(self.alpha_beta(), ca, cb)?),
        })
    }

    /// Computes the effective one-body operator induced by a fixed density through these
    /// two-electron integrals.
    ///
    /// For spin $`\sigma`$ the operator is $`\mathbf{J} - \mathbf{K}^{\sigma}`$ with
    /// ```math
    ///     J_{kl} = \sum_{ij} (ij|kl) (D^{\alpha}_{ji} + D^{\beta}_{ji}),
    ///     \qquad
    ///     K^{\sigma}_{il} = \sum_{jk} (ij|kl) D^{\sigma}_{jk}.
    /// ```
    /// This is only defined in the atomic-orbital basis, where all spin blocks coincide.
    ///
    /// # Arguments
    ///
    /// * `density` - The density matrix in the atomic-orbital basis.
    ///
    /// # Returns
    ///
    /// The effective one-body operator in the atomic-orbital basis.
    pub fn integral_operator(
        &self,
        density: &OneBodyElectronicIntegrals<T>,
    ) -> Result<OneBodyElectronicIntegrals<T>, anyhow::Error> {
        ensure!(
            self.basis == ElectronicBasis::AO && density.basis() == ElectronicBasis::AO,
            "Effective operators can only be computed in the AO basis, not from integrals in the {} basis and a density in the {} basis.",
            self.basis,
            density.basis()
        );
        ensure!(
            self.n_funcs() == density.n_funcs(),
            "Mismatched dimensions between two-electron integrals ({}) and density ({}).",
            self.n_funcs(),
            density.n_funcs()
        );
        let eri = &self.alpha_alpha;
        let contract = |subscripts: &str, d: &Array2<T>| -> Result<Array2<T>, anyhow::Error> {
            einsum(subscripts, &[eri, d])
                .map_err(|err| format_err!(err))?
                .into_dimensionality::<Ix2>()
                .map_err(|err| format_err!(err))
        };
        let total_density = density.alpha() + density.beta();
        // i = μ, j = μ', k = ν, l = ν'
        let coulomb = contract("ijkl,ji->kl", &total_density)?;
        let exchange_alpha = contract("ijkl,jk->il", density.alpha())?;
        let alpha = &coulomb - &exchange_alpha;
        let beta = if density.has_distinct_beta() {
            let exchange_beta = contract("ijkl,jk->il", density.beta())?;
            Some(&coulomb - &exchange_beta)
        } else {
            None
        };
        Ok(OneBodyElectronicIntegrals {
            basis: ElectronicBasis::AO,
            alpha,
            beta,
        })
    }
}

impl<T> fmt::Debug for TwoBodyElectronicIntegrals<T>
where
    T: ComplexFloat,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.n_funcs();
        write!(
            f,
            "TwoBodyElectronicIntegrals[{} basis, {n}×{n}×{n}×{n}{}]",
            self.basis,
            if self.has_distinct_spin_blocks() {
                ", spin-unrestricted"
            } else {
                ""
            }
        )
    }
}

// ================
// Enum definitions
// ================

/// An enumerated type wrapping integrals of either interaction order.
#[derive(Clone, Debug)]
pub enum ElectronicIntegrals<T>
where
    T: ComplexFloat,
{
    /// Variant for one-body integrals.
    OneBody(OneBodyElectronicIntegrals<T>),

    /// Variant for two-body integrals.
    TwoBody(TwoBodyElectronicIntegrals<T>),
}

impl<T> ElectronicIntegrals<T>
where
    T: ComplexFloat,
{
    /// Returns the interaction order of the integrals (`1` or `2`).
    pub fn order(&self) -> usize {
        match self {
            Self::OneBody(_) => 1,
            Self::TwoBody(_) => 2,
        }
    }

    /// Returns the basis in which the integrals are expressed.
    pub fn basis(&self) -> ElectronicBasis {
        match self {
            Self::OneBody(ints) => ints.basis(),
            Self::TwoBody(ints) => ints.basis(),
        }
    }

    /// Returns the number of basis functions along every tensor dimension.
    pub fn n_funcs(&self) -> usize {
        match self {
            Self::OneBody(ints) => ints.n_funcs(),
            Self::TwoBody(ints) => ints.n_funcs(),
        }
    }
}

impl<T> ElectronicIntegrals<T>
where
    T: ComplexFloat + LinalgScalar,
{
    /// Transforms the wrapped integrals into the final basis of a basis transform.
    pub fn transform_basis(
        &self,
        transform: &ElectronicBasisTransform<T>,
    ) -> Result<Self, anyhow::Error> {
        match self {
            Self::OneBody(ints) => ints.transform_basis(transform).map(Self::OneBody),
            Self::TwoBody(ints) => ints.transform_basis(transform).map(Self::TwoBody),
        }
    }
}
