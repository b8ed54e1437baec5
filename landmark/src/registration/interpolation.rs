//! Sub-pixel sampling of a single slice.
//!
//! Pixel centres sit on integer coordinates. Neighbour fetches outside the
//! plane clamp to the nearest edge sample, so kernels near the border never
//! blend in background values.
//!
//! # Interpolation Methods
//!
//! - **None**: the pixel whose centre is closest, found by truncating
//!   `x + 0.5`. No kernel is evaluated.
//! - **Nearest**: rounds each coordinate and fetches with edge clamping.
//! - **Bilinear**: linear blend of the 2x2 neighbourhood.
//! - **Bicubic**: Catmull-Rom cubic over the 4x4 neighbourhood.

use common::Buffer2;

use crate::registration::config::InterpolationMethod;

/// Bicubic kernel value (Catmull-Rom spline).
///
/// W(x) = (a+2)|x|^3 - (a+3)|x|^2 + 1       for |x| <= 1
/// W(x) = a|x|^3 - 5a|x|^2 + 8a|x| - 4a     for 1 < |x| < 2
/// W(x) = 0                                  otherwise
///
/// with a = -0.5.
#[inline]
pub(crate) fn bicubic_kernel(x: f32) -> f32 {
    const A: f32 = -0.5;

    let abs_x = x.abs();

    if abs_x <= 1.0 {
        ((A + 2.0) * abs_x - (A + 3.0)) * abs_x * abs_x + 1.0
    } else if abs_x < 2.0 {
        ((A * abs_x - 5.0 * A) * abs_x + 8.0 * A) * abs_x - 4.0 * A
    } else {
        0.0
    }
}

/// Integer pixel containing `(x, y)` for non-negative coordinates.
#[inline]
pub(crate) fn containing_pixel(x: f64, y: f64) -> (usize, usize) {
    ((x + 0.5) as usize, (y + 0.5) as usize)
}

#[inline]
fn sample_none(data: &Buffer2<f32>, x: f64, y: f64) -> f32 {
    let (px, py) = containing_pixel(x.max(0.0), y.max(0.0));
    data.get_clamped(px as i64, py as i64)
}

#[inline]
fn interpolate_nearest(data: &Buffer2<f32>, x: f64, y: f64) -> f32 {
    data.get_clamped(x.round() as i64, y.round() as i64)
}

#[inline]
fn interpolate_bilinear(data: &Buffer2<f32>, x: f64, y: f64) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = (x - x0) as f32;
    let fy = (y - y0) as f32;
    let x0 = x0 as i64;
    let y0 = y0 as i64;

    let p00 = data.get_clamped(x0, y0);
    let p10 = data.get_clamped(x0 + 1, y0);
    let p01 = data.get_clamped(x0, y0 + 1);
    let p11 = data.get_clamped(x0 + 1, y0 + 1);

    let top = p00 + fx * (p10 - p00);
    let bottom = p01 + fx * (p11 - p01);

    top + fy * (bottom - top)
}

fn interpolate_bicubic(data: &Buffer2<f32>, x: f64, y: f64) -> f32 {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = (x - x0) as f32;
    let fy = (y - y0) as f32;
    let x0 = x0 as i64;
    let y0 = y0 as i64;

    let wx = [
        bicubic_kernel(fx + 1.0),
        bicubic_kernel(fx),
        bicubic_kernel(fx - 1.0),
        bicubic_kernel(fx - 2.0),
    ];

    let wy = [
        bicubic_kernel(fy + 1.0),
        bicubic_kernel(fy),
        bicubic_kernel(fy - 1.0),
        bicubic_kernel(fy - 2.0),
    ];

    let mut sum = 0.0;

    for (j, &wyj) in wy.iter().enumerate() {
        let py = y0 - 1 + j as i64;
        for (i, &wxi) in wx.iter().enumerate() {
            let px = x0 - 1 + i as i64;
            sum += data.get_clamped(px, py) * wxi * wyj;
        }
    }

    sum
}

/// Sample `data` at continuous coordinates with the given method.
#[inline]
pub fn interpolate(data: &Buffer2<f32>, x: f64, y: f64, method: InterpolationMethod) -> f32 {
    match method {
        InterpolationMethod::None => sample_none(data, x, y),
        InterpolationMethod::Nearest => interpolate_nearest(data, x, y),
        InterpolationMethod::Bilinear => interpolate_bilinear(data, x, y),
        InterpolationMethod::Bicubic => interpolate_bicubic(data, x, y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::gradient;

    const EPSILON: f32 = 1e-5;

    const ALL_METHODS: [InterpolationMethod; 4] = [
        InterpolationMethod::None,
        InterpolationMethod::Nearest,
        InterpolationMethod::Bilinear,
        InterpolationMethod::Bicubic,
    ];

    fn checker() -> Buffer2<f32> {
        Buffer2::from_fn(4, 4, |x, y| ((x + y) % 2) as f32 * 10.0)
    }

    #[test]
    fn test_bicubic_kernel_properties() {
        assert!((bicubic_kernel(0.0) - 1.0).abs() < EPSILON);
        assert!(bicubic_kernel(1.0).abs() < EPSILON);
        assert!(bicubic_kernel(2.0).abs() < EPSILON);
        assert!((bicubic_kernel(0.5) - bicubic_kernel(-0.5)).abs() < EPSILON);
        // Partition of unity
        for f in [0.0f32, 0.25, 0.5, 0.9] {
            let sum = bicubic_kernel(f + 1.0)
                + bicubic_kernel(f)
                + bicubic_kernel(f - 1.0)
                + bicubic_kernel(f - 2.0);
            assert!((sum - 1.0).abs() < EPSILON, "f={f}: {sum}");
        }
    }

    #[test]
    fn test_integer_positions_are_exact_for_every_method() {
        let data = checker();
        for method in ALL_METHODS {
            for y in 0..4 {
                for x in 0..4 {
                    let v = interpolate(&data, x as f64, y as f64, method);
                    assert!(
                        (v - data[(x, y)]).abs() < EPSILON,
                        "{method:?} at ({x}, {y}): {v}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_none_picks_containing_pixel() {
        let data = gradient(4, 1, 1.0);
        assert_eq!(interpolate(&data, 1.49, 0.0, InterpolationMethod::None), 1.0);
        assert_eq!(interpolate(&data, 1.5, 0.0, InterpolationMethod::None), 2.0);
        assert_eq!(interpolate(&data, 0.0, 0.0, InterpolationMethod::None), 0.0);
    }

    #[test]
    fn test_nearest_rounds() {
        let data = gradient(4, 1, 1.0);
        assert_eq!(interpolate(&data, 2.4, 0.0, InterpolationMethod::Nearest), 2.0);
        assert_eq!(interpolate(&data, 2.6, 0.0, InterpolationMethod::Nearest), 3.0);
    }

    #[test]
    fn test_bilinear_midpoint() {
        // 2x2 image: [0, 10; 20, 30]
        let data = Buffer2::new(2, 2, vec![0.0, 10.0, 20.0, 30.0]);
        let v = interpolate(&data, 0.5, 0.5, InterpolationMethod::Bilinear);
        assert!((v - 15.0).abs() < EPSILON);
        let v = interpolate(&data, 0.25, 0.0, InterpolationMethod::Bilinear);
        assert!((v - 2.5).abs() < EPSILON);
    }

    #[test]
    fn test_linear_gradient_is_reproduced() {
        let data = gradient(8, 4, 2.0);
        for method in [InterpolationMethod::Bilinear, InterpolationMethod::Bicubic] {
            let v = interpolate(&data, 3.3, 1.7, method);
            assert!((v - 6.6).abs() < 1e-4, "{method:?}: {v}");
        }
    }

    #[test]
    fn test_edge_clamping_replicates_border() {
        let data = gradient(4, 2, 1.0);
        // Right of the last column the bilinear blend sees the edge twice.
        let v = interpolate(&data, 3.4, 0.0, InterpolationMethod::Bilinear);
        assert!((v - 3.0).abs() < EPSILON);
        let v = interpolate(&data, 0.0, 1.4, InterpolationMethod::Bicubic);
        assert!(v.abs() < EPSILON);
    }

    #[test]
    fn test_containing_pixel() {
        assert_eq!(containing_pixel(0.0, 0.0), (0, 0));
        assert_eq!(containing_pixel(0.49, 2.5), (0, 3));
    }
}
