//! Selection of the active and inactive orbitals around the Fermi level or from explicit indices.

use std::fmt;

use anyhow;
use approx::abs_diff_eq;
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::properties::particle_number::ParticleNumber;
use crate::transformers::infeasible;

#[cfg(test)]
#[path = "active_space_selection_tests.rs"]
mod active_space_selection_tests;

/// Tolerance for comparing the electron count of explicitly selected orbitals with the requested
/// number of active electrons.
const ACTIVE_ELECTRON_THRESHOLD: f64 = 1e-8;

/// An enumerated type for the specification of the number of active electrons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumElectrons {
    /// Variant for a total number of electrons, shared equally between the two spin channels.
    Total(i64),

    /// Variant for explicit numbers of alpha and beta electrons.
    AlphaBeta(i64, i64),
}

impl NumElectrons {
    /// Returns the numbers of active alpha and beta electrons.
    pub fn per_spin(&self) -> (i64, i64) {
        match self {
            Self::Total(n) => (n / 2, n / 2),
            Self::AlphaBeta(n_alpha, n_beta) => (*n_alpha, *n_beta),
        }
    }

    /// Returns the total number of active electrons, or `None` if it overflows.
    pub fn total(&self) -> Option<i64> {
        match self {
            Self::Total(n) => Some(*n),
            Self::AlphaBeta(n_alpha, n_beta) => n_alpha.checked_add(*n_beta),
        }
    }
}

impl fmt::Display for NumElectrons {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Total(n) => write!(f, "{n}"),
            Self::AlphaBeta(n_alpha, n_beta) => write!(f, "{n_alpha}α + {n_beta}β"),
        }
    }
}

/// Checks an active-space configuration independently of any system.
///
/// # Returns
///
/// A description of the first violation found, if any.
pub(crate) fn check_configuration(
    num_electrons: &NumElectrons,
    num_molecular_orbitals: i64,
    active_orbitals: Option<&[usize]>,
) -> Result<(), String> {
    match num_electrons {
        NumElectrons::Total(n) => {
            if n % 2 != 0 {
                return Err(format!(
                    "The total number of active electrons must be even, not {n}."
                ));
            }
            if *n < 0 {
                return Err(format!(
                    "The number of active electrons cannot be negative, not {n}."
                ));
            }
        }
        NumElectrons::AlphaBeta(n_alpha, n_beta) => {
            if *n_alpha < 0 || *n_beta < 0 {
                return Err(format!(
                    "Neither the number of alpha, nor the number of beta electrons can be negative, not ({n_alpha}, {n_beta})."
                ));
            }
        }
    }
    if num_molecular_orbitals < 0 {
        return Err(format!(
            "The number of active orbitals cannot be negative, not {num_molecular_orbitals}."
        ));
    }
    if let Some(active_orbitals) = active_orbitals {
        if !active_orbitals.iter().all_unique() {
            return Err(format!(
                "The active orbital indices {active_orbitals:?} contain duplicates."
            ));
        }
    }
    Ok(())
}

/// Partitions the spatial orbitals of a system into active and inactive orbitals.
///
/// Without explicit `active_orbitals`, the inactive orbitals are the lowest orbitals holding the
/// electrons not requested to be active, and the active orbitals are the
/// `num_molecular_orbitals` orbitals directly above them. With explicit `active_orbitals`, the
/// inactive orbitals are the remaining occupied orbitals below the Fermi level.
///
/// # Arguments
///
/// * `num_electrons` - The number of active electrons.
/// * `num_molecular_orbitals` - The number of active orbitals.
/// * `active_orbitals` - Optional explicit indices of the active orbitals.
/// * `particle_number` - The orbital occupations of the system.
///
/// # Returns
///
/// A tuple of the active and inactive orbital indices.
///
/// # Errors
///
/// Errors with a feasibility error if the requested active space cannot be accommodated by the
/// system.
pub fn select_active_space(
    num_electrons: &NumElectrons,
    num_molecular_orbitals: usize,
    active_orbitals: Option<&[usize]>,
    particle_number: &ParticleNumber,
) -> Result<(Vec<usize>, Vec<usize>), anyhow::Error> {
    let (num_alpha, num_beta) = num_electrons.per_spin();
    let nelec_total = i64::try_from(particle_number.num_electrons())?;
    let nelec_active = num_alpha
        .checked_add(num_beta)
        .ok_or_else(|| infeasible("More electrons requested than available."))?;
    let nelec_inactive = nelec_total
        .checked_sub(nelec_active)
        .filter(|n| *n >= 0)
        .ok_or_else(|| infeasible("More electrons requested than available."))?;
    if nelec_inactive % 2 != 0 {
        return Err(infeasible("The number of inactive electrons must be even."));
    }
    let n_spatial = particle_number.num_spatial_orbitals();

    match active_orbitals {
        None => {
            let norbs_inactive = usize::try_from(nelec_inactive / 2)?;
            if norbs_inactive + num_molecular_orbitals > n_spatial {
                return Err(infeasible("More orbitals requested than available."));
            }
            let inactive = (0..norbs_inactive).collect::<Vec<_>>();
            let active = (norbs_inactive..norbs_inactive + num_molecular_orbitals)
                .collect::<Vec<_>>();
            Ok((active, inactive))
        }
        Some(active_orbitals) => {
            if active_orbitals.len() != num_molecular_orbitals {
                return Err(infeasible(
                    "The number of selected active orbital indices does not match the specified number of active orbitals.",
                ));
            }
            if active_orbitals.iter().any(|i| *i >= n_spatial) {
                return Err(infeasible("More orbitals requested than available."));
            }
            let occ_total = particle_number.total_occupation();
            let active_occ = active_orbitals.iter().map(|i| occ_total[*i]).sum::<f64>();
            if !abs_diff_eq!(
                active_occ,
                nelec_active as f64,
                epsilon = ACTIVE_ELECTRON_THRESHOLD
            ) {
                return Err(infeasible(
                    "The number of electrons in the selected active orbitals does not match the specified number of active electrons.",
                ));
            }
            let n_below_fermi = usize::try_from(nelec_total / 2)?.min(n_spatial);
            let inactive = (0..n_below_fermi)
                .filter(|o| !active_orbitals.contains(o) && occ_total[*o] > 0.0)
                .collect::<Vec<_>>();
            Ok((active_orbitals.to_vec(), inactive))
        }
    }
}
