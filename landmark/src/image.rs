//! Multi-slice scalar images with attached landmark sets.

use common::Buffer2;
use glam::DVec2;

/// Ordered landmark points placed on an image.
///
/// Order defines correspondence: point `i` here pairs with point `i` of
/// every other image's set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LandmarkSet {
    points: Vec<DVec2>,
}

impl LandmarkSet {
    pub fn new(points: Vec<DVec2>) -> Self {
        Self { points }
    }

    #[inline]
    pub fn points(&self) -> &[DVec2] {
        &self.points
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl From<Vec<DVec2>> for LandmarkSet {
    fn from(points: Vec<DVec2>) -> Self {
        Self::new(points)
    }
}

impl FromIterator<DVec2> for LandmarkSet {
    fn from_iter<I: IntoIterator<Item = DVec2>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl From<&[(f64, f64)]> for LandmarkSet {
    fn from(points: &[(f64, f64)]) -> Self {
        points.iter().map(|&(x, y)| DVec2::new(x, y)).collect()
    }
}

/// One plane of an image stack.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    /// Optional per-slice label, carried through resampling.
    pub label: Option<String>,
    pub data: Buffer2<f32>,
}

impl Slice {
    pub fn new(data: Buffer2<f32>) -> Self {
        Self { label: None, data }
    }

    pub fn with_label(data: Buffer2<f32>, label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            data,
        }
    }
}

/// A stack of equally sized scalar slices plus its landmarks.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    label: String,
    width: usize,
    height: usize,
    slices: Vec<Slice>,
    landmarks: LandmarkSet,
}

impl Image {
    /// Create an image from a non-empty list of slices sharing one size.
    ///
    /// # Panics
    /// Panics if `slices` is empty, a slice has zero area, or the slices
    /// differ in size.
    pub fn new(label: impl Into<String>, slices: Vec<Slice>, landmarks: LandmarkSet) -> Self {
        assert!(!slices.is_empty(), "Image must have at least one slice");
        let (width, height) = slices[0].data.dimensions();
        assert!(width > 0, "Width must be positive");
        assert!(height > 0, "Height must be positive");
        for (i, slice) in slices.iter().enumerate() {
            assert_eq!(
                slice.data.dimensions(),
                (width, height),
                "slice {} is {:?}, expected {:?}",
                i,
                slice.data.dimensions(),
                (width, height)
            );
        }

        Self {
            label: label.into(),
            width,
            height,
            slices,
            landmarks,
        }
    }

    /// Single-slice convenience constructor.
    pub fn from_plane(
        label: impl Into<String>,
        data: Buffer2<f32>,
        landmarks: impl Into<LandmarkSet>,
    ) -> Self {
        Self::new(label, vec![Slice::new(data)], landmarks.into())
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    #[inline]
    pub fn slice_count(&self) -> usize {
        self.slices.len()
    }

    #[inline]
    pub fn slice(&self, index: usize) -> &Buffer2<f32> {
        &self.slices[index].data
    }

    #[inline]
    pub fn landmarks(&self) -> &LandmarkSet {
        &self.landmarks
    }

    /// Copy with a new label; pixels and landmarks are unchanged.
    pub fn relabeled(&self, label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..self.clone()
        }
    }
}
