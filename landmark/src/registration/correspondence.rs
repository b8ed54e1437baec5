//! Landmark correspondences between two images.

use glam::DVec2;

use crate::image::LandmarkSet;

/// Paired landmark positions: `source[i]` corresponds to `target[i]`.
///
/// Built by position in the two landmark lists. When the lists differ in
/// length the extra points of the longer one are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointCorrespondenceSet {
    source: Vec<DVec2>,
    target: Vec<DVec2>,
}

impl PointCorrespondenceSet {
    /// Pair two landmark sets by index.
    pub fn pair(source: &LandmarkSet, target: &LandmarkSet) -> Self {
        Self::from_points(source.points(), target.points())
    }

    /// Pair two point lists by index, truncating to the shorter one.
    pub fn from_points(source: &[DVec2], target: &[DVec2]) -> Self {
        let n = source.len().min(target.len());
        Self {
            source: source[..n].to_vec(),
            target: target[..n].to_vec(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.source.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    #[inline]
    pub fn source_points(&self) -> &[DVec2] {
        &self.source
    }

    #[inline]
    pub fn target_points(&self) -> &[DVec2] {
        &self.target
    }

    /// Iterate `(source, target)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        self.source.iter().copied().zip(self.target.iter().copied())
    }

    /// The same correspondences with source and target exchanged.
    pub fn reversed(&self) -> Self {
        Self {
            source: self.target.clone(),
            target: self.source.clone(),
        }
    }
}
