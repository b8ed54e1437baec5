//! Synthetic fixtures shared by unit and scenario tests.

use common::Buffer2;
use glam::DVec2;

use crate::image::{Image, LandmarkSet, Slice};

/// Well-spread, non-colinear base landmarks inside a 50x50 frame.
const BASE_LANDMARKS: [(f64, f64); 4] = [(5.0, 5.0), (40.0, 8.0), (20.0, 42.0), (35.0, 30.0)];

/// Base landmarks uniformly scaled about the origin.
pub(crate) fn spread_landmarks(scale: f64) -> LandmarkSet {
    BASE_LANDMARKS
        .iter()
        .map(|&(x, y)| DVec2::new(x * scale, y * scale))
        .collect()
}

/// Smooth ramp sampled in the scale-normalized frame; steps stay well below
/// the default discontinuity threshold.
pub(crate) fn ramp(x: f64, y: f64) -> f32 {
    (1.5 * x + 0.5 * y) as f32
}

/// `width x height` image whose content and landmarks are the base frame
/// scaled by `scale`.
pub(crate) fn scaled_image(label: &str, width: usize, height: usize, scale: f64) -> Image {
    let data = Buffer2::from_fn(width, height, |x, y| {
        ramp(x as f64 / scale, y as f64 / scale)
    });
    Image::from_plane(label, data, spread_landmarks(scale))
}

/// Multi-slice variant of [`scaled_image`]; slice `k` is offset by `100 * k`
/// and labelled `"slice k"`.
pub(crate) fn scaled_stack(
    label: &str,
    width: usize,
    height: usize,
    scale: f64,
    slices: usize,
) -> Image {
    let slices = (0..slices)
        .map(|k| {
            let data = Buffer2::from_fn(width, height, |x, y| {
                ramp(x as f64 / scale, y as f64 / scale) + 100.0 * k as f32
            });
            Slice::with_label(data, format!("slice {k}"))
        })
        .collect();
    Image::new(label, slices, spread_landmarks(scale))
}

/// Horizontal gradient `value = x * step`.
pub(crate) fn gradient(width: usize, height: usize, step: f32) -> Buffer2<f32> {
    Buffer2::from_fn(width, height, |x, _| x as f32 * step)
}

/// Check two planes agree sample by sample within `tolerance`.
pub(crate) fn assert_planes_close(actual: &Buffer2<f32>, expected: &Buffer2<f32>, tolerance: f32) {
    assert_eq!(actual.dimensions(), expected.dimensions());
    for y in 0..actual.height() {
        for x in 0..actual.width() {
            let (a, e) = (actual[(x, y)], expected[(x, y)]);
            assert!(
                (a - e).abs() <= tolerance,
                "pixel ({x}, {y}): expected {e}, got {a}"
            );
        }
    }
}
