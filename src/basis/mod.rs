//! Electronic bases and transformations between them.

use std::fmt;

use anyhow::{self, ensure, format_err};
use derive_builder::Builder;
use ndarray::{Array2, Axis, LinalgScalar};
use num_complex::ComplexFloat;
use serde::{Deserialize, Serialize};


// ================
// Enum definitions
// ================

/// An enumerated type for the bases in which electronic integrals can be expressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ElectronicBasis {
    /// Variant for the atomic-orbital basis.
    AO,

    /// Variant for the (spatial) molecular-orbital basis.
    MO,
}

impl fmt::Display for ElectronicBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AO => write!(f, "AO"),
            Self::MO => write!(f, "MO"),
        }
    }
}

// ==================
// Struct definitions
// ==================

/// Structure managing a linear change of basis for both spin channels.
///
/// Each coefficient matrix has shape `(n_initial, n_final)`, so that the $`p`$-th function of the
/// final basis is given by
/// ```math
///     \phi_p = \sum_{\mu} \chi_{\mu} C_{\mu p}.
/// ```
#[derive(Builder, Clone)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct ElectronicBasisTransform<T>
where
    T: ComplexFloat,
{
    /// The basis in which the transformed quantities are initially expressed.
    initial_basis: ElectronicBasis,

    /// The basis into which the quantities are transformed.
    final_basis: ElectronicBasis,

    /// The coefficient matrix for the alpha spin channel.
    coeff_alpha: Array2<T>,

    /// The coefficient matrix for the beta spin channel. If `None`, this is the same as
    /// [`Self::coeff_alpha`].
    #[builder(setter(strip_option), default = "None")]
    coeff_beta: Option<Array2<T>>,
}

impl<T> ElectronicBasisTransformBuilder<T>
where
    T: ComplexFloat,
{
    fn validate(&self) -> Result<(), String> {
        let coeff_alpha = self
            .coeff_alpha
            .as_ref()
            .ok_or("No alpha coefficient matrix found.".to_string())?;
        if let Some(Some(coeff_beta)) = self.coeff_beta.as_ref() {
            if coeff_beta.shape() != coeff_alpha.shape() {
                return Err(format!(
                    "The beta coefficient matrix dimensions ({:?}) do not match the alpha coefficient matrix dimensions ({:?}).",
                    coeff_beta.shape(),
                    coeff_alpha.shape()
                ));
            }
        }
        Ok(())
    }
}

impl<T> ElectronicBasisTransform<T>
where
    T: ComplexFloat,
{
    /// Returns a builder to construct a new [`ElectronicBasisTransform`].
    pub fn builder() -> ElectronicBasisTransformBuilder<T> {
        ElectronicBasisTransformBuilder::default()
    }

    /// Returns the initial basis of the transform.
    pub fn initial_basis(&self) -> ElectronicBasis {
        self.initial_basis
    }

    /// Returns the final basis of the transform.
    pub fn final_basis(&self) -> ElectronicBasis {
        self.final_basis
    }

    /// Returns the alpha coefficient matrix.
    pub fn coeff_alpha(&self) -> &Array2<T> {
        &self.coeff_alpha
    }

    /// Returns the beta coefficient matrix.
    pub fn coeff_beta(&self) -> &Array2<T> {
        self.coeff_beta.as_ref().unwrap_or(&self.coeff_alpha)
    }

    /// Returns `true` if no distinct beta coefficient matrix has been specified.
    pub fn is_alpha_equal_beta(&self) -> bool {
        self.coeff_beta.is_none()
    }

    /// Returns the number of functions in the initial basis.
    pub fn n_initial(&self) -> usize {
        self.coeff_alpha.nrows()
    }

    /// Returns the number of functions in the final basis.
    pub fn n_final(&self) -> usize {
        self.coeff_alpha.ncols()
    }
}

impl<T> ElectronicBasisTransform<T>
where
    T: ComplexFloat + LinalgScalar,
{
    /// Restricts the final basis of this transform to a subset of its functions.
    ///
    /// # Arguments
    ///
    /// * `indices` - The indices of the final-basis functions (columns) to be kept, in order.
    ///
    /// # Returns
    ///
    /// The restricted transform.
    pub fn restrict(&self, indices: &[usize]) -> Result<Self, anyhow::Error> {
        ensure!(
            indices.iter().all(|i| *i < self.n_final()),
            "Column indices {:?} out of range for a transform into {} functions.",
            indices,
            self.n_final()
        );
        Ok(Self {
            initial_basis: self.initial_basis,
            final_basis: self.final_basis,
            coeff_alpha: self.coeff_alpha.select(Axis(1), indices),
            coeff_beta: self
                .coeff_beta
                .as_ref()
                .map(|coeff_beta| coeff_beta.select(Axis(1), indices)),
        })
    }

    /// Chains this transform `A → B` with another transform `B → C` to give `A → C`.
    ///
    /// # Arguments
    ///
    /// * `other` - The transform to be applied after this one.
    ///
    /// # Returns
    ///
    /// The composite transform.
    pub fn compose(&self, other: &Self) -> Result<Self, anyhow::Error> {
        ensure!(
            self.final_basis == other.initial_basis,
            "Unable to chain a transform into the {} basis with a transform from the {} basis.",
            self.final_basis,
            other.initial_basis
        );
        if self.n_final() != other.n_initial() {
            return Err(format_err!(
                "Non-conformable transforms: {} final functions vs. {} initial functions.",
                self.n_final(),
                other.n_initial()
            ));
        }
        let coeff_beta = if self.is_alpha_equal_beta() && other.is_alpha_equal_beta() {
            None
        } else {
            Some(self.coeff_beta().dot(other.coeff_beta()))
        };
        Ok(Self {
            initial_basis: self.initial_basis,
            final_basis: other.final_basis,
            coeff_alpha: self.coeff_alpha.dot(&other.coeff_alpha),
            coeff_beta,
        })
    }
}

impl<T> fmt::Debug for ElectronicBasisTransform<T>
where
    T: ComplexFloat,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ElectronicBasisTransform[{} → {}, {}×{}{}]",
            self.initial_basis,
            self.final_basis,
            self.n_initial(),
            self.n_final(),
            if self.is_alpha_equal_beta() {
                ""
            } else {
                ", spin-unrestricted"
            }
        )
    }
}

impl<T> fmt::Display for ElectronicBasisTransform<T>
where
    T: ComplexFloat,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
