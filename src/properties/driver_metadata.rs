//! Provenance of a driver result.

use std::fmt;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Structure recording the program that produced a driver result.
#[derive(Builder, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DriverMetadata {
    /// The name of the program.
    #[builder(setter(into))]
    program: String,

    /// The version of the program.
    #[builder(setter(into))]
    version: String,

    /// The configuration with which the program was run.
    #[builder(setter(into), default = "String::new()")]
    config: String,
}

impl DriverMetadata {
    /// Returns a builder to construct a new [`DriverMetadata`].
    pub fn builder() -> DriverMetadataBuilder {
        DriverMetadataBuilder::default()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn config(&self) -> &str {
        &self.config
    }
}

impl fmt::Display for DriverMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DriverMetadata ({} {})", self.program, self.version)?;
        if !self.config.is_empty() {
            write!(f, "\n  Config:")?;
            for line in self.config.lines() {
                write!(f, "\n    {line}")?;
            }
        }
        Ok(())
    }
}
