//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use landmark::prelude::*;
//! ```

pub use crate::{Image, LandmarkSet, Slice};

pub use crate::{
    Config, Error, InterpolationMethod, ModelError, PairwiseRegistration, Registered, ScaleTarget,
    Transform, TransformType, register,
};
