//! Transformation matrix for landmark registration.

use glam::{DAffine2, DMat2, DVec2};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::registration::error::ModelError;

/// Determinants below this magnitude are treated as singular.
const SINGULAR_DETERMINANT: f64 = 1e-12;

/// Supported transformation models with increasing degrees of freedom.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, Serialize, Deserialize,
)]
pub enum TransformType {
    /// Translation only (2 DOF: dx, dy)
    Translation,
    /// Translation + Rotation (3 DOF: dx, dy, angle)
    Rigid,
    /// Translation + Rotation + Uniform Scale (4 DOF)
    #[default]
    Similarity,
    /// Full affine (6 DOF: handles differential scaling and shear)
    Affine,
}

impl TransformType {
    /// Minimum number of point correspondences required to estimate this transform.
    pub fn min_points(&self) -> usize {
        match self {
            TransformType::Translation => 1,
            TransformType::Rigid => 2,
            TransformType::Similarity => 2,
            TransformType::Affine => 3,
        }
    }
}

/// 2D affine map `y = A·x + b`, tagged with the family it was fitted as.
///
/// Row-major parameter layout used by [`to_array`](Self::to_array):
/// ```text
/// | a  b  tx |
/// | c  d  ty |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub affine: DAffine2,
    pub transform_type: TransformType,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::fmt::Display for Transform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let t = self.translation_components();
        let rotation_deg = self.rotation_angle().to_degrees();

        match self.transform_type {
            TransformType::Translation => {
                write!(f, "Translation(dx={:.2}, dy={:.2})", t.x, t.y)
            }
            TransformType::Rigid => {
                write!(
                    f,
                    "Rigid(dx={:.2}, dy={:.2}, rot={:.3}°)",
                    t.x, t.y, rotation_deg
                )
            }
            TransformType::Similarity => {
                write!(
                    f,
                    "Similarity(dx={:.2}, dy={:.2}, rot={:.3}°, scale={:.4})",
                    t.x,
                    t.y,
                    rotation_deg,
                    self.scale_factor()
                )
            }
            TransformType::Affine => {
                write!(
                    f,
                    "Affine(dx={:.2}, dy={:.2}, det={:.4})",
                    t.x,
                    t.y,
                    self.linear_determinant()
                )
            }
        }
    }
}

impl Transform {
    /// Create identity transform.
    pub fn identity() -> Self {
        Self {
            affine: DAffine2::IDENTITY,
            transform_type: TransformType::Translation,
        }
    }

    /// Create translation transform.
    pub fn translation(t: DVec2) -> Self {
        Self {
            affine: DAffine2::from_translation(t),
            transform_type: TransformType::Translation,
        }
    }

    /// Create rigid transform (translation + rotation).
    pub fn rigid(t: DVec2, angle: f64) -> Self {
        Self {
            affine: DAffine2::from_angle_translation(angle, t),
            transform_type: TransformType::Rigid,
        }
    }

    /// Create similarity transform (translation + rotation + uniform scale).
    pub fn similarity(t: DVec2, angle: f64, scale: f64) -> Self {
        Self {
            affine: DAffine2::from_scale_angle_translation(DVec2::splat(scale), angle, t),
            transform_type: TransformType::Similarity,
        }
    }

    /// Create affine transform from 6 row-major parameters [a, b, tx, c, d, ty].
    pub fn affine(params: [f64; 6]) -> Self {
        let [a, b, tx, c, d, ty] = params;
        Self {
            affine: DAffine2::from_mat2_translation(
                DMat2::from_cols(DVec2::new(a, c), DVec2::new(b, d)),
                DVec2::new(tx, ty),
            ),
            transform_type: TransformType::Affine,
        }
    }

    /// Wrap an existing affine map.
    pub fn from_affine(affine: DAffine2, transform_type: TransformType) -> Self {
        Self {
            affine,
            transform_type,
        }
    }

    /// Map a point from source coordinates to target coordinates.
    #[inline]
    pub fn apply(&self, p: DVec2) -> DVec2 {
        self.affine.transform_point2(p)
    }

    /// Determinant of the 2x2 linear part; the area scale of the mapping.
    #[inline]
    pub fn linear_determinant(&self) -> f64 {
        self.affine.matrix2.determinant()
    }

    /// Compute the inverse map.
    ///
    /// Fails with [`ModelError::NoninvertibleModel`] when the linear part is
    /// singular or not finite.
    pub fn inverse(&self) -> Result<Self, ModelError> {
        if !self.is_valid() {
            return Err(ModelError::NoninvertibleModel {
                determinant: self.linear_determinant(),
            });
        }
        Ok(Self {
            affine: self.affine.inverse(),
            transform_type: self.transform_type,
        })
    }

    /// Row-major parameters [a, b, tx, c, d, ty].
    pub fn to_array(&self) -> [f64; 6] {
        let m = self.affine.matrix2;
        let t = self.affine.translation;
        [m.x_axis.x, m.y_axis.x, t.x, m.x_axis.y, m.y_axis.y, t.y]
    }

    /// Extract translation components as DVec2.
    pub fn translation_components(&self) -> DVec2 {
        self.affine.translation
    }

    /// Extract rotation angle in radians (valid for rigid/similarity transforms).
    pub fn rotation_angle(&self) -> f64 {
        let m = self.affine.matrix2;
        m.x_axis.y.atan2(m.x_axis.x)
    }

    /// Extract scale factor (valid for similarity transforms).
    pub fn scale_factor(&self) -> f64 {
        self.affine.matrix2.x_axis.length()
    }

    /// Check if this is a valid (non-degenerate) transformation.
    pub fn is_valid(&self) -> bool {
        let det = self.linear_determinant();
        det.abs() >= SINGULAR_DETERMINANT && det.is_finite()
    }

    /// The three-row matrix listing used by the transform log.
    ///
    /// Column-major like the flattened `[m00, m10, m01, m11, m02, m12]`
    /// layout: each linear column on its own row, then the translation.
    /// ```text
    /// [a, c]
    /// [b, d]
    /// [tx, ty]
    /// ```
    pub fn matrix_rows(&self) -> String {
        let [a, b, tx, c, d, ty] = self.to_array();
        format!("[{a}, {c}]\n[{b}, {d}]\n[{tx}, {ty}]")
    }
}
