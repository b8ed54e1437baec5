//! Configuration types for the registration module.

use serde::{Deserialize, Serialize};

use crate::registration::resample::ResampleParams;
use crate::registration::transform::TransformType;

/// Default discontinuity threshold, in raw sample units.
pub const DEFAULT_DISCONTINUITY_THRESHOLD: f32 = 128.0;

// =============================================================================
// Interpolation configuration
// =============================================================================

/// Interpolation method for image resampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InterpolationMethod {
    /// Read the source pixel containing the mapped point; no sampling
    #[default]
    None,
    /// Nearest neighbor - rounds to the closest source pixel
    Nearest,
    /// Bilinear interpolation over the 2x2 neighbourhood
    Bilinear,
    /// Bicubic (Catmull-Rom) interpolation over the 4x4 neighbourhood
    Bicubic,
}

// =============================================================================
// Reference selection
// =============================================================================

/// Which image every other image is resampled onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScaleTarget {
    /// A specific input index.
    Index(usize),
    /// The image that wins the most pairwise "is larger" comparisons.
    #[default]
    Biggest,
    /// The image that wins the most pairwise "is smaller" comparisons.
    Smallest,
}

// =============================================================================
// Top-level configuration
// =============================================================================

/// Registration configuration.
///
/// Defaults mirror the usual interactive setup: no interpolation, similarity
/// model, discontinuity suppression on at a threshold of 128, scale to the
/// biggest image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Interpolation used when sampling the source image.
    pub interpolation: InterpolationMethod,
    /// Transform family fitted to each landmark pair.
    pub transform_type: TransformType,
    /// Fall back to the raw nearest sample next to sharp value jumps.
    pub stop_at_discontinuity: bool,
    /// Minimum absolute neighbour difference that counts as a discontinuity.
    pub discontinuity_threshold: f32,
    /// Reference image selection.
    pub scale_target: ScaleTarget,
    /// Log every fitted 2x3 matrix at info level.
    pub log_transforms: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interpolation: InterpolationMethod::default(),
            transform_type: TransformType::Similarity,
            stop_at_discontinuity: true,
            discontinuity_threshold: DEFAULT_DISCONTINUITY_THRESHOLD,
            scale_target: ScaleTarget::default(),
            log_transforms: false,
        }
    }
}

impl Config {
    pub fn with_interpolation(mut self, method: InterpolationMethod) -> Self {
        self.interpolation = method;
        self
    }

    pub fn with_transform_type(mut self, transform_type: TransformType) -> Self {
        self.transform_type = transform_type;
        self
    }

    /// Enable discontinuity suppression at the given threshold.
    pub fn with_discontinuity_threshold(mut self, threshold: f32) -> Self {
        self.stop_at_discontinuity = true;
        self.discontinuity_threshold = threshold;
        self
    }

    pub fn without_discontinuity_suppression(mut self) -> Self {
        self.stop_at_discontinuity = false;
        self
    }

    pub fn with_scale_target(mut self, target: ScaleTarget) -> Self {
        self.scale_target = target;
        self
    }

    pub fn with_transform_log(mut self, enabled: bool) -> Self {
        self.log_transforms = enabled;
        self
    }

    /// Validate configuration parameters.
    pub fn validate(&self) {
        assert!(
            self.discontinuity_threshold.is_finite() && self.discontinuity_threshold >= 0.0,
            "discontinuity_threshold must be finite and non-negative, got {}",
            self.discontinuity_threshold
        );
    }

    /// Per-pixel sampling parameters derived from this configuration.
    pub fn resample_params(&self) -> ResampleParams {
        ResampleParams {
            method: self.interpolation,
            stop_at_discontinuity: self.stop_at_discontinuity,
            discontinuity_threshold: self.discontinuity_threshold,
        }
    }
}
