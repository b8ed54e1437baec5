//! Fitted pairwise registrations with normalized direction.

use crate::image::Image;
use crate::registration::config::ScaleTarget;
use crate::registration::correspondence::PointCorrespondenceSet;
use crate::registration::error::ModelError;
use crate::registration::fit::fit_transform;
use crate::registration::transform::{Transform, TransformType};

/// Direction policy applied after a pair's transform is fitted.
///
/// The linear-part determinant of the fitted map is its area scale. When the
/// policy asks for the opposite direction the map is inverted and the
/// source/target roles are exchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Keep maps that enlarge (`det >= 1`); the target is the bigger image.
    Enlarge,
    /// Keep maps that shrink (`det <= 1`); the target is the smaller image.
    Shrink,
    /// Never swap; the pair is kept in the order it was requested.
    Fixed,
}

impl Orientation {
    /// Whether a fitted map with this determinant must be inverted.
    #[inline]
    pub fn should_swap(&self, determinant: f64) -> bool {
        match self {
            Orientation::Enlarge => determinant < 1.0,
            Orientation::Shrink => determinant > 1.0,
            Orientation::Fixed => false,
        }
    }
}

impl From<ScaleTarget> for Orientation {
    fn from(target: ScaleTarget) -> Self {
        match target {
            ScaleTarget::Biggest => Orientation::Enlarge,
            ScaleTarget::Smallest => Orientation::Shrink,
            ScaleTarget::Index(_) => Orientation::Fixed,
        }
    }
}

/// A transform mapping `source` pixel coordinates onto `target` pixel
/// coordinates, with both roles already normalized.
///
/// Immutable once built; [`build`](Self::build) performs any role swap
/// before the value exists.
#[derive(Debug, Clone, PartialEq)]
pub struct PairwiseRegistration {
    source: usize,
    target: usize,
    transform: Transform,
    source_dims: (usize, usize),
    target_dims: (usize, usize),
    swapped: bool,
}

impl PairwiseRegistration {
    /// Fit `images[from] -> images[to]` and normalize the direction.
    ///
    /// Dimensions are taken from the images in their final roles, so the
    /// resampler bounds-checks against the image it actually reads from.
    pub fn build(
        images: &[Image],
        from: usize,
        to: usize,
        transform_type: TransformType,
        orientation: Orientation,
    ) -> Result<Self, ModelError> {
        let correspondences =
            PointCorrespondenceSet::pair(images[from].landmarks(), images[to].landmarks());
        let fitted = fit_transform(transform_type, &correspondences)?;

        let swapped = orientation.should_swap(fitted.linear_determinant());
        let (source, target, transform) = if swapped {
            (to, from, fitted.inverse()?)
        } else {
            (from, to, fitted)
        };

        Ok(Self {
            source,
            target,
            transform,
            source_dims: images[source].dimensions(),
            target_dims: images[target].dimensions(),
            swapped,
        })
    }

    /// Input index of the image being mapped.
    #[inline]
    pub fn source(&self) -> usize {
        self.source
    }

    /// Input index of the image whose frame the map lands in.
    #[inline]
    pub fn target(&self) -> usize {
        self.target
    }

    #[inline]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// `(width, height)` of the source image.
    #[inline]
    pub fn source_dims(&self) -> (usize, usize) {
        self.source_dims
    }

    /// `(width, height)` of the target image.
    #[inline]
    pub fn target_dims(&self) -> (usize, usize) {
        self.target_dims
    }

    /// True when the pair was requested as `(target, source)` and inverted.
    #[inline]
    pub fn was_swapped(&self) -> bool {
        self.swapped
    }

    /// The same pair mapped the other way: roles exchanged, transform inverted.
    pub fn reversed(&self) -> Result<Self, ModelError> {
        Ok(Self {
            source: self.target,
            target: self.source,
            transform: self.transform.inverse()?,
            source_dims: self.target_dims,
            target_dims: self.source_dims,
            swapped: !self.swapped,
        })
    }
}
