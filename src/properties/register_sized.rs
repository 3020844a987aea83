//! Second-quantized properties defined purely by the size of the spin-orbital register.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An enumerated type for the kinds of properties that carry no data other than the number of
/// spin-orbitals they act on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RegisterSizedKind {
    /// Variant for the total spin angular momentum $`\hat{S}^2`$.
    AngularMomentum,

    /// Variant for the spin projection $`\hat{S}_z`$.
    Magnetization,
}

impl fmt::Display for RegisterSizedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AngularMomentum => write!(f, "AngularMomentum"),
            Self::Magnetization => write!(f, "Magnetization"),
        }
    }
}

/// Structure for a property whose operator is fully determined by the number of spin-orbitals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSizedProperty {
    kind: RegisterSizedKind,
    num_spin_orbitals: usize,
}

impl RegisterSizedProperty {
    /// Creates a new property of the given kind acting on `num_spin_orbitals` spin-orbitals.
    pub fn new(kind: RegisterSizedKind, num_spin_orbitals: usize) -> Self {
        Self {
            kind,
            num_spin_orbitals,
        }
    }

    /// Returns the kind of this property.
    pub fn kind(&self) -> RegisterSizedKind {
        self.kind
    }

    /// Returns the number of spin-orbitals this property acts on.
    pub fn num_spin_orbitals(&self) -> usize {
        self.num_spin_orbitals
    }

    /// Returns a fresh property of the same kind resized to `num_spin_orbitals`.
    pub fn resized(&self, num_spin_orbitals: usize) -> Self {
        Self::new(self.kind, num_spin_orbitals)
    }
}

impl fmt::Display for RegisterSizedProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({} spin-orbitals)",
            self.kind, self.num_spin_orbitals
        )
    }
}
