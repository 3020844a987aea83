//! Orbital occupations and particle counts of an electronic system.

use std::fmt;

use approx::abs_diff_eq;
use derive_builder::Builder;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::io::format::qas_warn;

#[cfg(test)]
#[path = "particle_number_tests.rs"]
mod particle_number_tests;

/// Tolerance for comparing occupation sums against electron counts.
const OCCUPATION_SUM_THRESHOLD: f64 = 1e-6;

/// Structure containing the per-spin orbital occupation numbers and particle counts of an
/// electronic system.
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct ParticleNumber {
    /// The number of spin-orbitals, which is always twice the number of spatial orbitals.
    num_spin_orbitals: usize,

    /// The number of alpha electrons.
    num_alpha: usize,

    /// The number of beta electrons.
    num_beta: usize,

    /// The occupation numbers of the spatial orbitals in the alpha spin channel. If not given,
    /// the lowest [`Self::num_alpha`] orbitals are singly occupied.
    #[builder(default = "self.aufbau_occupations(self.num_alpha)?")]
    occupation_alpha: Array1<f64>,

    /// The occupation numbers of the spatial orbitals in the beta spin channel. If not given,
    /// the lowest [`Self::num_beta`] orbitals are singly occupied.
    #[builder(default = "self.aufbau_occupations(self.num_beta)?")]
    occupation_beta: Array1<f64>,
}

impl ParticleNumberBuilder {
    fn aufbau_occupations(&self, num_electrons: Option<usize>) -> Result<Array1<f64>, String> {
        let n_spatial = self
            .num_spin_orbitals
            .ok_or("No number of spin-orbitals found.".to_string())?
            / 2;
        let num_electrons =
            num_electrons.ok_or("No number of electrons found for a spin channel.".to_string())?;
        Ok(Array1::from_shape_fn(n_spatial, |i| {
            if i < num_electrons {
                1.0
            } else {
                0.0
            }
        }))
    }

    fn validate(&self) -> Result<(), String> {
        let num_spin_orbitals = self
            .num_spin_orbitals
            .ok_or("No number of spin-orbitals found.".to_string())?;
        if num_spin_orbitals % 2 != 0 {
            return Err(format!(
                "The number of spin-orbitals must be even, not {num_spin_orbitals}."
            ));
        }
        let n_spatial = num_spin_orbitals / 2;
        let num_alpha = self
            .num_alpha
            .ok_or("No number of alpha electrons found.".to_string())?;
        let num_beta = self
            .num_beta
            .ok_or("No number of beta electrons found.".to_string())?;
        if num_alpha > n_spatial || num_beta > n_spatial {
            return Err(format!(
                "({num_alpha}α, {num_beta}β) electrons cannot be accommodated in {n_spatial} spatial orbitals."
            ));
        }
        for (spin, num_electrons, occ) in [
            ("alpha", num_alpha, self.occupation_alpha.as_ref()),
            ("beta", num_beta, self.occupation_beta.as_ref()),
        ] {
            if let Some(occ) = occ {
                if occ.len() != n_spatial {
                    return Err(format!(
                        "The {spin} occupation vector has length {}, but there are {n_spatial} spatial orbitals.",
                        occ.len()
                    ));
                }
                let occ_sum = occ.sum();
                if !abs_diff_eq!(
                    occ_sum,
                    num_electrons as f64,
                    epsilon = OCCUPATION_SUM_THRESHOLD
                ) {
                    qas_warn!(
                        "The {spin} occupation numbers sum to {occ_sum:.7}, which differs from the number of {spin} electrons ({num_electrons})."
                    );
                }
            }
        }
        Ok(())
    }
}

impl ParticleNumber {
    /// Returns a builder to construct a new [`ParticleNumber`].
    pub fn builder() -> ParticleNumberBuilder {
        ParticleNumberBuilder::default()
    }

    /// Returns the number of spin-orbitals.
    pub fn num_spin_orbitals(&self) -> usize {
        self.num_spin_orbitals
    }

    /// Returns the number of spatial orbitals.
    pub fn num_spatial_orbitals(&self) -> usize {
        self.num_spin_orbitals / 2
    }

    /// Returns the number of alpha electrons.
    pub fn num_alpha(&self) -> usize {
        self.num_alpha
    }

    /// Returns the number of beta electrons.
    pub fn num_beta(&self) -> usize {
        self.num_beta
    }

    /// Returns the numbers of alpha and beta electrons.
    pub fn num_particles(&self) -> (usize, usize) {
        (self.num_alpha, self.num_beta)
    }

    /// Returns the total number of electrons.
    pub fn num_electrons(&self) -> usize {
        self.num_alpha + self.num_beta
    }

    /// Returns the alpha occupation numbers.
    pub fn occupation_alpha(&self) -> &Array1<f64> {
        &self.occupation_alpha
    }

    /// Returns the beta occupation numbers.
    pub fn occupation_beta(&self) -> &Array1<f64> {
        &self.occupation_beta
    }

    /// Returns the total occupation numbers of the spatial orbitals, summed over both spin
    /// channels.
    pub fn total_occupation(&self) -> Array1<f64> {
        &self.occupation_alpha + &self.occupation_beta
    }
}

impl fmt::Display for ParticleNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ParticleNumber")?;
        writeln!(f, "  Number of spin-orbitals: {}", self.num_spin_orbitals)?;
        writeln!(
            f,
            "  Number of electrons: {}α, {}β",
            self.num_alpha, self.num_beta
        )?;
        writeln!(f, "  α occupations: {}", self.occupation_alpha)?;
        write!(f, "  β occupations: {}", self.occupation_beta)
    }
}
