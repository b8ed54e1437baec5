//! Landmark registration engine.
//!
//! Aligns a set of images onto one reference frame using the landmark
//! correspondences attached to each image, then resamples every other
//! image into that frame.
//!
//! # Transformation Models
//!
//! | Type | DOF | Min points | Description |
//! |------|-----|------------|-------------|
//! | Translation | 2 | 1 | X/Y offset only |
//! | Rigid | 3 | 2 | Translation + rotation |
//! | Similarity | 4 | 2 | Translation + rotation + uniform scale |
//! | Affine | 6 | 3 | Handles shear and differential scaling |
//!
//! # Pipeline
//!
//! 1. **Build pairs** - fit one transform per image pair from its landmarks
//! 2. **Rank sizes** (biggest/smallest only) - vote for the reference image
//! 3. **Select reference**
//! 4. **Resample** - inverse-warp every pair that ends at the reference
//! 5. **Assemble** - index-aligned output, the reference copied unchanged

pub(crate) mod config;
pub(crate) mod correspondence;
pub(crate) mod error;
pub(crate) mod fit;
pub(crate) mod interpolation;
pub(crate) mod pairwise;
pub(crate) mod pipeline;
pub(crate) mod ranking;
pub(crate) mod resample;
pub(crate) mod transform;


pub use config::{Config, InterpolationMethod, ScaleTarget};
pub use correspondence::PointCorrespondenceSet;
pub use error::{Error, ModelError, Stage};
pub use fit::fit_transform;
pub use pairwise::{Orientation, PairwiseRegistration};
pub use pipeline::{Registered, register};
pub use ranking::WinTally;
pub use resample::{ResampleParams, resample};
pub use transform::{Transform, TransformType};
