//! Properties of vibrational structure problems.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An enumerated type for the kinds of vibrational properties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VibrationalPropertyKind {
    /// Variant for the occupied modals of each vibrational mode.
    OccupiedModals,

    /// Variant for the vibrational energy expansion.
    VibrationalEnergy,
}

impl fmt::Display for VibrationalPropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OccupiedModals => write!(f, "OccupiedModals"),
            Self::VibrationalEnergy => write!(f, "VibrationalEnergy"),
        }
    }
}

/// Structure for a vibrational property, described by the number of modals per mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VibrationalProperty {
    kind: VibrationalPropertyKind,
    num_modals: Vec<usize>,
}

impl VibrationalProperty {
    pub fn new(kind: VibrationalPropertyKind, num_modals: Vec<usize>) -> Self {
        Self { kind, num_modals }
    }

    pub fn kind(&self) -> VibrationalPropertyKind {
        self.kind
    }

    /// Returns the number of modals in each vibrational mode.
    pub fn num_modals(&self) -> &[usize] {
        &self.num_modals
    }
}

impl fmt::Display for VibrationalProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (modals per mode: {:?})", self.kind, self.num_modals)
    }
}
