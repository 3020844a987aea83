//! YAML input specification for active-space reductions.

use std::fmt;

use anyhow::{self, bail, Context};
use ndarray::LinalgScalar;
use num_complex::ComplexFloat;
use serde::{Deserialize, Serialize};

use crate::io::format::{log_subtitle, QasOutput};
use crate::properties::Property;
use crate::transformers::active_space::{ActiveSpaceParams, ActiveSpaceTransformer};
use crate::transformers::freeze_core::{FreezeCoreParams, FreezeCoreTransformer};
use crate::transformers::{ActiveSpaceTransformResult, Transformer};


/// A structure containing QAS input parameters which can be serialised into and deserialised
/// from a YAML input file.
///
/// Exactly one of the two sections must be given.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Input {
    /// Parameters for a reduction to an active space.
    ///
    /// # Default
    ///
    /// If not specified, this will be taken to be `None`.
    #[serde(default)]
    pub active_space: Option<ActiveSpaceParams>,

    /// Parameters for a freeze-core reduction.
    ///
    /// # Default
    ///
    /// If not specified, this will be taken to be `None`.
    #[serde(default)]
    pub freeze_core: Option<FreezeCoreParams>,
}

impl Input {
    /// Checks that exactly one reduction has been specified and that its parameters are valid.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match (self.active_space.as_ref(), self.freeze_core.as_ref()) {
            (Some(params), None) => params.validate(),
            (None, Some(_)) => Ok(()),
            (Some(_), Some(_)) => {
                bail!("Only one of `active_space` and `freeze_core` can be specified.")
            }
            (None, None) => bail!("One of `active_space` and `freeze_core` must be specified."),
        }
    }

    /// Constructs the transformer specified by this input.
    pub fn transformer<T>(&self) -> Result<Box<dyn Transformer<T>>, anyhow::Error>
    where
        T: ComplexFloat<Real = f64> + LinalgScalar + fmt::Debug,
    {
        self.validate()?;
        match (self.active_space.as_ref(), self.freeze_core.as_ref()) {
            (Some(params), _) => {
                log_subtitle("Active-space parameters");
                params.log_output_display();
                Ok(Box::new(ActiveSpaceTransformer::from_params(
                    params.clone(),
                )?))
            }
            (None, Some(params)) => {
                log_subtitle("Freeze-core parameters");
                params.log_output_display();
                Ok(Box::new(FreezeCoreTransformer::new(params.clone())))
            }
            (None, None) => bail!("No transformer has been specified."),
        }
    }

    /// Reduces a property tree with the transformer specified by this input.
    pub fn run<T>(&self, property: &Property<T>) -> Result<ActiveSpaceTransformResult<T>, anyhow::Error>
    where
        T: ComplexFloat<Real = f64> + LinalgScalar + fmt::Debug,
    {
        self.transformer::<T>()
            .context("Invalid QAS input.")?
            .transform(property)
    }
}
