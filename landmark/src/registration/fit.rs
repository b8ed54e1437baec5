//! Least-squares transform fitting from landmark correspondences.
//!
//! Closed-form solutions per family: translation (mean displacement),
//! rigid and similarity (Procrustes on centred points), affine (normal
//! equations on centred points).

use glam::{DAffine2, DMat2, DVec2};

use crate::registration::correspondence::PointCorrespondenceSet;
use crate::registration::error::ModelError;
use crate::registration::transform::{Transform, TransformType};

/// Point spreads (sum of squared distances to the centroid) below this are
/// treated as all points coinciding.
const MIN_SPREAD: f64 = 1e-10;

/// Relative bound on `det(C) / trace(C)^2` of the centred covariance below
/// which the source points are considered colinear.
const MIN_RELATIVE_COVARIANCE_DET: f64 = 1e-10;

/// Fit `transform_type` so it maps the source points onto the target points
/// with minimal total squared error.
pub fn fit_transform(
    transform_type: TransformType,
    correspondences: &PointCorrespondenceSet,
) -> Result<Transform, ModelError> {
    let required = transform_type.min_points();
    if correspondences.len() < required {
        return Err(ModelError::NotEnoughDataPoints {
            transform_type,
            required,
            found: correspondences.len(),
        });
    }

    let source = correspondences.source_points();
    let target = correspondences.target_points();
    let ill_defined = ModelError::IllDefinedDataPoints { transform_type };

    let fitted = match transform_type {
        TransformType::Translation => Some(estimate_translation(source, target)),
        TransformType::Rigid => estimate_rigid(source, target),
        TransformType::Similarity => estimate_similarity(source, target),
        TransformType::Affine => estimate_affine(source, target),
    };
    fitted.ok_or(ill_defined)
}

/// Estimate translation (average displacement).
fn estimate_translation(source: &[DVec2], target: &[DVec2]) -> Transform {
    let mut d_sum = DVec2::ZERO;
    for (s, t) in source.iter().zip(target.iter()) {
        d_sum += *t - *s;
    }
    Transform::translation(d_sum / source.len() as f64)
}

/// Centred cross-covariance terms shared by the rigid and similarity fits.
struct Procrustes {
    source_centroid: DVec2,
    target_centroid: DVec2,
    sxx: f64,
    sxy: f64,
    syx: f64,
    syy: f64,
    source_spread: f64,
    target_spread: f64,
}

impl Procrustes {
    fn new(source: &[DVec2], target: &[DVec2]) -> Self {
        let source_centroid = centroid(source);
        let target_centroid = centroid(target);

        let mut p = Self {
            source_centroid,
            target_centroid,
            sxx: 0.0,
            sxy: 0.0,
            syx: 0.0,
            syy: 0.0,
            source_spread: 0.0,
            target_spread: 0.0,
        };
        for (s, t) in source.iter().zip(target.iter()) {
            let sc = *s - source_centroid;
            let tc = *t - target_centroid;
            p.sxx += sc.x * tc.x;
            p.sxy += sc.x * tc.y;
            p.syx += sc.y * tc.x;
            p.syy += sc.y * tc.y;
            p.source_spread += sc.length_squared();
            p.target_spread += tc.length_squared();
        }
        p
    }

    /// Both point clouds must span more than a single location for the
    /// rotation to be determined.
    fn is_degenerate(&self) -> bool {
        self.source_spread < MIN_SPREAD || self.target_spread < MIN_SPREAD
    }

    fn angle(&self) -> f64 {
        (self.sxy - self.syx).atan2(self.sxx + self.syy)
    }

    /// Translation placing the scaled, rotated source centroid on the target centroid.
    fn translation(&self, angle: f64, scale: f64) -> DVec2 {
        let (sin_a, cos_a) = angle.sin_cos();
        let c = self.source_centroid;
        DVec2::new(
            self.target_centroid.x - scale * (cos_a * c.x - sin_a * c.y),
            self.target_centroid.y - scale * (sin_a * c.x + cos_a * c.y),
        )
    }
}

/// Estimate rigid transform (translation + rotation, scale fixed at 1.0).
fn estimate_rigid(source: &[DVec2], target: &[DVec2]) -> Option<Transform> {
    let p = Procrustes::new(source, target);
    if p.is_degenerate() {
        return None;
    }

    let angle = p.angle();
    Some(Transform::rigid(p.translation(angle, 1.0), angle))
}

/// Estimate similarity transform (translation + rotation + uniform scale).
fn estimate_similarity(source: &[DVec2], target: &[DVec2]) -> Option<Transform> {
    let p = Procrustes::new(source, target);
    if p.is_degenerate() {
        return None;
    }

    let angle = p.angle();
    let (sin_a, cos_a) = angle.sin_cos();
    let scale = ((p.sxx + p.syy) * cos_a + (p.sxy - p.syx) * sin_a) / p.source_spread;

    // Zero cross-covariance: every rotation fits equally badly.
    if scale <= f64::EPSILON {
        return None;
    }

    Some(Transform::similarity(
        p.translation(angle, scale),
        angle,
        scale,
    ))
}

/// Estimate affine transform using least squares.
///
/// Solves `A = D · C⁻¹` with `C = Σ s̃ s̃ᵀ` and `D = Σ t̃ s̃ᵀ` over centred
/// points, then `b = t̄ − A s̄`.
fn estimate_affine(source: &[DVec2], target: &[DVec2]) -> Option<Transform> {
    let source_centroid = centroid(source);
    let target_centroid = centroid(target);

    let mut cxx = 0.0;
    let mut cxy = 0.0;
    let mut cyy = 0.0;
    let mut dxx = 0.0;
    let mut dxy = 0.0;
    let mut dyx = 0.0;
    let mut dyy = 0.0;

    for (s, t) in source.iter().zip(target.iter()) {
        let sc = *s - source_centroid;
        let tc = *t - target_centroid;
        cxx += sc.x * sc.x;
        cxy += sc.x * sc.y;
        cyy += sc.y * sc.y;
        dxx += tc.x * sc.x;
        dxy += tc.x * sc.y;
        dyx += tc.y * sc.x;
        dyy += tc.y * sc.y;
    }

    let trace = cxx + cyy;
    if trace < MIN_SPREAD {
        return None;
    }
    let det = cxx * cyy - cxy * cxy;
    if det <= MIN_RELATIVE_COVARIANCE_DET * trace * trace {
        return None;
    }

    let covariance = DMat2::from_cols(DVec2::new(cxx, cxy), DVec2::new(cxy, cyy));
    let cross = DMat2::from_cols(DVec2::new(dxx, dyx), DVec2::new(dxy, dyy));
    let linear = cross * covariance.inverse();
    let translation = target_centroid - linear * source_centroid;

    Some(Transform::from_affine(
        DAffine2::from_mat2_translation(linear, translation),
        TransformType::Affine,
    ))
}

/// Compute centroid of points.
pub(crate) fn centroid(points: &[DVec2]) -> DVec2 {
    if points.is_empty() {
        return DVec2::ZERO;
    }

    let mut sum = DVec2::ZERO;
    for p in points {
        sum += *p;
    }
    sum / points.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;
    use strum::IntoEnumIterator;

    const EPSILON: f64 = 1e-9;

    fn spread_points() -> Vec<DVec2> {
        vec![
            DVec2::new(10.0, 12.0),
            DVec2::new(80.0, 15.0),
            DVec2::new(45.0, 70.0),
            DVec2::new(20.0, 55.0),
        ]
    }

    fn mapped(points: &[DVec2], t: &Transform) -> PointCorrespondenceSet {
        let target: Vec<DVec2> = points.iter().map(|&p| t.apply(p)).collect();
        PointCorrespondenceSet::from_points(points, &target)
    }

    fn assert_transform_eq(actual: &Transform, expected: &Transform) {
        for (a, e) in actual.to_array().iter().zip(expected.to_array().iter()) {
            assert!(
                (a - e).abs() < EPSILON,
                "expected {:?}, got {:?}",
                expected.to_array(),
                actual.to_array()
            );
        }
    }

    #[test]
    fn test_identity_for_every_family() {
        let points = spread_points();
        let pairs = PointCorrespondenceSet::from_points(&points, &points);
        for tt in TransformType::iter() {
            let fitted = fit_transform(tt, &pairs).unwrap();
            assert_eq!(fitted.transform_type, tt);
            assert_transform_eq(&fitted, &Transform::identity());
        }
    }

    #[test]
    fn test_translation_is_mean_displacement() {
        let pairs = PointCorrespondenceSet::from_points(
            &[DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)],
            &[DVec2::new(1.0, 2.0), DVec2::new(13.0, 4.0)],
        );
        let t = fit_transform(TransformType::Translation, &pairs).unwrap();
        // displacements (1,2) and (3,4) average to (2,3)
        assert_transform_eq(&t, &Transform::translation(DVec2::new(2.0, 3.0)));
    }

    #[test]
    fn test_translation_needs_one_point() {
        let pairs = PointCorrespondenceSet::from_points(
            &[DVec2::new(4.0, 4.0)],
            &[DVec2::new(1.0, 9.0)],
        );
        let t = fit_transform(TransformType::Translation, &pairs).unwrap();
        assert_transform_eq(&t, &Transform::translation(DVec2::new(-3.0, 5.0)));
    }

    #[test]
    fn test_rigid_recovers_rotation() {
        let truth = Transform::rigid(DVec2::new(7.0, -3.0), 0.3);
        let t = fit_transform(TransformType::Rigid, &mapped(&spread_points(), &truth)).unwrap();
        assert_transform_eq(&t, &truth);
        assert!((t.linear_determinant() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_rigid_ignores_scale() {
        let truth = Transform::similarity(DVec2::ZERO, 0.0, 2.0);
        let t = fit_transform(TransformType::Rigid, &mapped(&spread_points(), &truth)).unwrap();
        assert!((t.scale_factor() - 1.0).abs() < EPSILON);
    }

    #[test]
    fn test_similarity_recovers_scale_and_rotation() {
        let truth = Transform::similarity(DVec2::new(20.0, 15.0), PI / 6.0, 1.75);
        let t =
            fit_transform(TransformType::Similarity, &mapped(&spread_points(), &truth)).unwrap();
        assert_transform_eq(&t, &truth);
    }

    #[test]
    fn test_similarity_from_two_points() {
        let pairs = PointCorrespondenceSet::from_points(
            &[DVec2::new(0.0, 0.0), DVec2::new(10.0, 0.0)],
            &[DVec2::new(5.0, 5.0), DVec2::new(5.0, 25.0)],
        );
        let t = fit_transform(TransformType::Similarity, &pairs).unwrap();
        assert!((t.scale_factor() - 2.0).abs() < EPSILON);
        assert!((t.rotation_angle() - PI / 2.0).abs() < EPSILON);
        assert!((t.apply(DVec2::new(10.0, 0.0)) - DVec2::new(5.0, 25.0)).length() < EPSILON);
    }

    #[test]
    fn test_affine_recovers_shear() {
        let truth = Transform::affine([1.2, 0.3, 5.0, -0.1, 0.9, -4.0]);
        let t = fit_transform(TransformType::Affine, &mapped(&spread_points(), &truth)).unwrap();
        assert_transform_eq(&t, &truth);
    }

    #[test]
    fn test_affine_least_squares_averages_noise() {
        // A saddle-shaped perturbation is orthogonal to every affine term.
        let truth = Transform::affine([2.0, 0.0, 1.0, 0.0, 2.0, 1.0]);
        let source = vec![
            DVec2::new(0.0, 0.0),
            DVec2::new(10.0, 0.0),
            DVec2::new(0.0, 10.0),
            DVec2::new(10.0, 10.0),
        ];
        let mut target: Vec<DVec2> = source.iter().map(|&p| truth.apply(p)).collect();
        target[0].x += 0.5;
        target[3].x += 0.5;
        target[1].x -= 0.5;
        target[2].x -= 0.5;
        let t = fit_transform(
            TransformType::Affine,
            &PointCorrespondenceSet::from_points(&source, &target),
        )
        .unwrap();
        let [a, _, _, c, d, _] = t.to_array();
        assert!((a - 2.0).abs() < EPSILON);
        assert!(c.abs() < EPSILON);
        assert!((d - 2.0).abs() < EPSILON);
    }

    #[test]
    fn test_affine_with_two_points_is_not_enough() {
        let pairs = PointCorrespondenceSet::from_points(
            &[DVec2::new(0.0, 0.0), DVec2::new(1.0, 1.0)],
            &[DVec2::new(0.0, 0.0), DVec2::new(2.0, 2.0)],
        );
        assert_eq!(
            fit_transform(TransformType::Affine, &pairs),
            Err(ModelError::NotEnoughDataPoints {
                transform_type: TransformType::Affine,
                required: 3,
                found: 2,
            })
        );
    }

    #[test]
    fn test_affine_with_colinear_points_is_ill_defined() {
        let source = [
            DVec2::new(0.0, 0.0),
            DVec2::new(5.0, 5.0),
            DVec2::new(10.0, 10.0),
        ];
        let target = [
            DVec2::new(1.0, 0.0),
            DVec2::new(3.0, 7.0),
            DVec2::new(9.0, 2.0),
        ];
        assert_eq!(
            fit_transform(
                TransformType::Affine,
                &PointCorrespondenceSet::from_points(&source, &target)
            ),
            Err(ModelError::IllDefinedDataPoints {
                transform_type: TransformType::Affine
            })
        );
    }

    #[test]
    fn test_similarity_with_coincident_points_is_ill_defined() {
        let pairs = PointCorrespondenceSet::from_points(
            &[DVec2::new(3.0, 3.0), DVec2::new(3.0, 3.0)],
            &[DVec2::new(1.0, 1.0), DVec2::new(8.0, 2.0)],
        );
        assert_eq!(
            fit_transform(TransformType::Similarity, &pairs),
            Err(ModelError::IllDefinedDataPoints {
                transform_type: TransformType::Similarity
            })
        );
    }

    #[test]
    fn test_rigid_with_coincident_targets_is_ill_defined() {
        let pairs = PointCorrespondenceSet::from_points(
            &[DVec2::new(0.0, 0.0), DVec2::new(4.0, 0.0)],
            &[DVec2::new(2.0, 2.0), DVec2::new(2.0, 2.0)],
        );
        assert!(matches!(
            fit_transform(TransformType::Rigid, &pairs),
            Err(ModelError::IllDefinedDataPoints { .. })
        ));
    }

    #[test]
    fn test_empty_set_is_not_enough_for_every_family() {
        let empty = PointCorrespondenceSet::default();
        for tt in TransformType::iter() {
            assert!(matches!(
                fit_transform(tt, &empty),
                Err(ModelError::NotEnoughDataPoints { found: 0, .. })
            ));
        }
    }

    #[test]
    fn test_centroid() {
        assert_eq!(centroid(&[]), DVec2::ZERO);
        assert_eq!(
            centroid(&[DVec2::new(0.0, 0.0), DVec2::new(4.0, 2.0)]),
            DVec2::new(2.0, 1.0)
        );
    }
}
