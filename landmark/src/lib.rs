//! Landmark - multi-image registration from user-placed landmarks.
//!
//! Each image carries an ordered set of landmark points; point `i` in one
//! image corresponds to point `i` in every other. The engine:
//! - fits a 2D transform (translation, rigid, similarity or affine) per image pair
//! - picks a reference image, explicitly or by a biggest/smallest vote
//! - resamples every other image into the reference frame with an inverse warp
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use landmark::{Config, Image, ScaleTarget, register};
//!
//! let config = Config::default().with_scale_target(ScaleTarget::Biggest);
//! let registered = register(&images, &config)?;
//!
//! for image in &registered.images {
//!     println!("{} {}x{}", image.label(), image.width(), image.height());
//! }
//! ```

mod image;
pub(crate) mod registration;

#[cfg(test)]
pub(crate) mod testing;

pub mod prelude;

// ============================================================================
// Core image types
// ============================================================================

pub use image::{Image, LandmarkSet, Slice};

// ============================================================================
// Registration
// ============================================================================

pub use registration::{
    // Configuration
    Config,
    InterpolationMethod,
    ScaleTarget,
    // Errors
    Error,
    ModelError,
    Stage,
    // Core types
    Orientation,
    PairwiseRegistration,
    PointCorrespondenceSet,
    Registered,
    ResampleParams,
    Transform,
    TransformType,
    WinTally,
    // Top-level functions
    fit_transform,
    register,
    resample,
};
