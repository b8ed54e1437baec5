//! Error types for landmark registration.

use strum_macros::Display;
use thiserror::Error;

use crate::registration::transform::TransformType;

/// Failures of fitting or inverting a single transform.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ModelError {
    #[error("Not enough data points to fit {transform_type}: need {required}, got {found}")]
    NotEnoughDataPoints {
        transform_type: TransformType,
        required: usize,
        found: usize,
    },

    #[error("Ill-defined data points for {transform_type}: no unique solution")]
    IllDefinedDataPoints { transform_type: TransformType },

    #[error("Non-invertible model (linear determinant {determinant:e})")]
    NoninvertibleModel { determinant: f64 },
}

/// Pipeline state in which a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Stage {
    #[strum(to_string = "building pairs")]
    BuildPairs,
    #[strum(to_string = "ranking sizes")]
    RankSizes,
    #[strum(to_string = "resampling")]
    Resample,
}

/// Errors surfaced by [`register`](crate::register).
///
/// Every failure aborts the whole run; no partial output is produced.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("Reference index {index} is out of range for {count} images")]
    ReferenceOutOfRange { index: usize, count: usize },

    #[error("Failed while {stage}: '{from_label}' (#{from}) onto '{to_label}' (#{to}): {source}")]
    Pair {
        stage: Stage,
        from: usize,
        to: usize,
        from_label: String,
        to_label: String,
        #[source]
        source: ModelError,
    },
}

impl Error {
    /// The underlying model failure, if this error came from a pair.
    pub fn model_error(&self) -> Option<ModelError> {
        match self {
            Error::Pair { source, .. } => Some(*source),
            Error::ReferenceOutOfRange { .. } => None,
        }
    }

    /// `(from, to)` input indices of the failing pair.
    pub fn pair(&self) -> Option<(usize, usize)> {
        match self {
            Error::Pair { from, to, .. } => Some((*from, *to)),
            Error::ReferenceOutOfRange { .. } => None,
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Error::Pair { stage, .. } => Some(*stage),
            Error::ReferenceOutOfRange { .. } => None,
        }
    }
}
