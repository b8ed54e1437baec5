//! Inverse-warp resampling of a registered image into its target frame.
//!
//! Every output pixel is mapped back through the inverse transform and
//! sampled from the source, so each pixel is written at most once. Pixels
//! whose source coordinate falls outside the source plane keep the
//! background value `0.0`.

use common::Buffer2;
use common::parallel::rows_per_chunk;
use glam::DVec2;
use rayon::prelude::*;

use crate::image::{Image, Slice};
use crate::registration::config::{DEFAULT_DISCONTINUITY_THRESHOLD, InterpolationMethod};
use crate::registration::error::ModelError;
use crate::registration::interpolation::{containing_pixel, interpolate};
use crate::registration::pairwise::PairwiseRegistration;
use crate::registration::transform::Transform;

/// Slack on the lower bounds check so coordinates that should be exactly
/// zero but carry rounding noise still land on the first row/column.
const BOUNDS_EPSILON: f64 = 1e-9;

/// Per-pixel sampling parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResampleParams {
    pub method: InterpolationMethod,
    /// Fall back to the raw sample where the source has a sharp jump.
    pub stop_at_discontinuity: bool,
    /// Absolute neighbour difference above which a jump is detected.
    pub discontinuity_threshold: f32,
}

impl Default for ResampleParams {
    fn default() -> Self {
        Self {
            method: InterpolationMethod::default(),
            stop_at_discontinuity: true,
            discontinuity_threshold: DEFAULT_DISCONTINUITY_THRESHOLD,
        }
    }
}

/// Resample `source` into the frame of `target` through `registration`.
///
/// The output has the target's size and `min(source, target)` slices, each
/// carrying the source slice's label. The image is labelled
/// `"<source label> final"`.
pub fn resample(
    registration: &PairwiseRegistration,
    source: &Image,
    target: &Image,
    params: &ResampleParams,
) -> Result<Image, ModelError> {
    debug_assert_eq!(source.dimensions(), registration.source_dims());
    debug_assert_eq!(target.dimensions(), registration.target_dims());

    let inverse = registration.transform().inverse()?;
    let slice_count = source.slice_count().min(target.slice_count());
    let output_dims = registration.target_dims();

    tracing::debug!(
        "Resampling '{}' onto '{}' ({}x{}, {} slices, {:?})",
        source.label(),
        target.label(),
        output_dims.0,
        output_dims.1,
        slice_count,
        params.method
    );

    let slices = source.slices()[..slice_count]
        .iter()
        .map(|slice| Slice {
            label: slice.label.clone(),
            data: resample_plane(&slice.data, output_dims, &inverse, params),
        })
        .collect();

    Ok(Image::new(
        format!("{} final", source.label()),
        slices,
        source.landmarks().clone(),
    ))
}

/// Fill a `width x height` plane by sampling `input` at `inverse(x, y)`.
///
/// Rows are processed in parallel chunks. Along a row the source coordinate
/// advances by the inverse map's first column instead of a full matrix
/// multiply per pixel.
pub(crate) fn resample_plane(
    input: &Buffer2<f32>,
    (width, height): (usize, usize),
    inverse: &Transform,
    params: &ResampleParams,
) -> Buffer2<f32> {
    let mut output = Buffer2::new_default(width, height);
    if width == 0 || height == 0 {
        return output;
    }

    let rows_per_chunk = rows_per_chunk(height);
    let step = inverse.affine.matrix2.x_axis;

    output
        .pixels_mut()
        .par_chunks_mut(width * rows_per_chunk)
        .enumerate()
        .for_each(|(chunk_idx, chunk): (usize, &mut [f32])| {
            let start_y = chunk_idx * rows_per_chunk;

            for (row_in_chunk, row) in chunk.chunks_mut(width).enumerate() {
                let y = start_y + row_in_chunk;
                let mut src = inverse.apply(DVec2::new(0.0, y as f64));

                for out_pixel in row.iter_mut() {
                    if let Some(value) = sample_source(input, src.x, src.y, params) {
                        *out_pixel = value;
                    }
                    src += step;
                }
            }
        });

    output
}

/// Value for one output pixel, or `None` to keep the background.
#[inline]
fn sample_source(input: &Buffer2<f32>, sx: f64, sy: f64, params: &ResampleParams) -> Option<f32> {
    if !in_source_bounds(sx, sy, input.width(), input.height()) {
        return None;
    }
    let sx = sx.max(0.0);
    let sy = sy.max(0.0);

    if params.stop_at_discontinuity {
        let (px, py) = containing_pixel(sx, sy);
        if has_discontinuity(input, px, py, params.discontinuity_threshold) {
            return Some(input[(px, py)]);
        }
    }

    Some(interpolate(input, sx, sy, params.method))
}

/// `0 <= s` and `s + 0.5 < size` on both axes. NaN is out of bounds.
#[inline]
pub(crate) fn in_source_bounds(sx: f64, sy: f64, width: usize, height: usize) -> bool {
    sx > -BOUNDS_EPSILON
        && sx + 0.5 < width as f64
        && sy > -BOUNDS_EPSILON
        && sy + 0.5 < height as f64
}

/// Whether any 8-neighbour of `(px, py)` inside the plane differs from the
/// centre by more than `threshold`.
fn has_discontinuity(input: &Buffer2<f32>, px: usize, py: usize, threshold: f32) -> bool {
    let center = input[(px, py)];
    let x_range = px.saturating_sub(1)..=(px + 1).min(input.width() - 1);

    for ny in py.saturating_sub(1)..=(py + 1).min(input.height() - 1) {
        for nx in x_range.clone() {
            if nx == px && ny == py {
                continue;
            }
            if (center - input[(nx, ny)]).abs() > threshold {
                return true;
            }
        }
    }
    false
}
