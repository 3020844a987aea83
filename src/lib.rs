//! # QAS: Quantum Active Spaces
//!
//! QAS is a library for reducing the electronic-structure description of a molecule to an
//! *active space* of orbitals. The inactive orbitals are eliminated by folding their mean-field
//! effect into an effective one-body operator and a constant energy shift, so that subsequent
//! correlated treatments only need to deal with the active orbitals. The following reductions
//! are available:
//! - selection of a number of active electrons and orbitals around the Fermi level, or from
//!   explicitly specified orbital indices, and
//! - freezing of chemical core orbitals, optionally together with the removal of further
//!   selected orbitals.
//!
//! Reductions act on trees of electronic properties ([`properties::Property`]): energies, dipole
//! moments, particle numbers, spin-related operators, and the basis transform from atomic to
//! molecular orbitals. Leaves that a reduction does not know how to handle are dropped from the
//! reduced tree with a warning.
//!
//! ## Getting started
//!
//! A reduction can be described by a YAML input file containing exactly one of the two
//! following sections:
//!
//! ```yaml
//! active_space:
//!   num_electrons: 4
//!   num_molecular_orbitals: 2
//! ```
//!
//! ```yaml
//! freeze_core:
//!   freeze_core: true
//!   remove_orbitals: [5]
//! ```
//!
//! which is read in with [`io::read_qas_yaml`] into an [`interfaces::input::Input`] and then run
//! on a property tree. Alternatively, the transformers in [`transformers`] can be constructed
//! directly.
//!
//! ## Logging
//!
//! QAS writes its main output to the `qas-output` log target via the [`log`] facade. Any
//! logger implementation can be used to capture it.

pub mod auxiliary;
pub mod basis;
pub mod integrals;
pub mod interfaces;
pub mod io;
pub mod properties;
pub mod transformers;
