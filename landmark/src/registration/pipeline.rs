//! Full multi-image registration run.
//!
//! # Pipeline Stages
//!
//! 1. **Build pairs** - `n - 1` pairs onto an explicit reference, or all
//!    `n(n-1)/2` unordered pairs when the reference is voted
//! 2. **Rank sizes** - tally which image each voted pair ends at
//! 3. **Select reference**
//! 4. **Resample** - every pair ending at the reference, in parallel
//! 5. **Assemble** - index-aligned output with the reference copied unchanged
//!
//! Any failure aborts the run; no partial output is returned.

use std::time::Instant;

use common::parallel::unordered_pairs;
use rayon::prelude::*;

use crate::image::Image;
use crate::registration::config::{Config, ScaleTarget};
use crate::registration::error::{Error, ModelError, Stage};
use crate::registration::pairwise::{Orientation, PairwiseRegistration};
use crate::registration::ranking::WinTally;
use crate::registration::resample::resample;
use crate::registration::transform::TransformType;

/// Output of [`register`].
#[derive(Debug, Clone)]
pub struct Registered {
    /// One image per input, index aligned. Slot `reference` holds a copy of
    /// the reference; every other slot holds that input resampled into the
    /// reference frame.
    pub images: Vec<Image>,
    /// Input index of the reference image.
    pub reference: usize,
    /// Every pair that was built, in build order.
    pub registrations: Vec<PairwiseRegistration>,
}

/// Register every image onto one reference frame.
///
/// # Panics
/// Panics if `config` fails [`Config::validate`].
pub fn register(images: &[Image], config: &Config) -> Result<Registered, Error> {
    config.validate();
    let start = Instant::now();
    let count = images.len();

    tracing::debug!(
        "Registering {} images ({}, target {:?})",
        count,
        config.transform_type,
        config.scale_target
    );

    let (registrations, reference) = match config.scale_target {
        ScaleTarget::Index(reference) => {
            if reference >= count {
                return Err(Error::ReferenceOutOfRange {
                    index: reference,
                    count,
                });
            }
            let registrations = build_onto(images, reference, config.transform_type)?;
            (registrations, reference)
        }
        ScaleTarget::Biggest | ScaleTarget::Smallest => {
            if count == 0 {
                return Err(Error::ReferenceOutOfRange { index: 0, count });
            }
            let (registrations, tally) = build_and_rank(
                images,
                config.transform_type,
                Orientation::from(config.scale_target),
            )?;
            tracing::debug!("Win counts: {:?}", tally.wins());
            (registrations, tally.winner().unwrap_or(0))
        }
    };

    tracing::info!(
        "Reference image: '{}' (#{}, {}x{})",
        images[reference].label(),
        reference,
        images[reference].width(),
        images[reference].height()
    );

    if config.log_transforms {
        for reg in &registrations {
            log_transform(images, reg);
        }
    }

    let resampled = resample_onto(images, &registrations, reference, config)?;

    let mut slots: Vec<Option<Image>> = vec![None; count];
    for (index, image) in resampled {
        slots[index] = Some(image);
    }
    let reference_image = &images[reference];
    let reference_label = format!("{} final", reference_image.label());
    slots[reference] = Some(reference_image.relabeled(reference_label));

    let images = slots.into_iter().flatten().collect::<Vec<_>>();
    debug_assert_eq!(images.len(), count);

    tracing::debug!(
        "Registration finished in {:.1} ms",
        start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(Registered {
        images,
        reference,
        registrations,
    })
}

/// Build `(k, reference)` for every `k != reference`, never swapping.
fn build_onto(
    images: &[Image],
    reference: usize,
    transform_type: TransformType,
) -> Result<Vec<PairwiseRegistration>, Error> {
    tracing::debug!("Building {} pairs onto #{}", images.len().saturating_sub(1), reference);

    let sources: Vec<usize> = (0..images.len()).filter(|&k| k != reference).collect();
    sources
        .par_iter()
        .map(|&k| {
            PairwiseRegistration::build(images, k, reference, transform_type, Orientation::Fixed)
                .inspect(log_fitted)
                .map_err(|e| pair_error(images, Stage::BuildPairs, k, reference, e))
        })
        .collect()
}

/// Build every unordered pair and count, per image, the pairs it ends up
/// the target of.
fn build_and_rank(
    images: &[Image],
    transform_type: TransformType,
    orientation: Orientation,
) -> Result<(Vec<PairwiseRegistration>, WinTally), Error> {
    let count = images.len();
    let pairs = unordered_pairs(count);
    tracing::debug!("Ranking sizes over {} pairs ({:?})", pairs.len(), orientation);

    let empty = || (Vec::new(), WinTally::new(count));

    pairs
        .par_iter()
        .try_fold(empty, |(mut built, mut tally), &(i, j)| {
            let reg = PairwiseRegistration::build(images, i, j, transform_type, orientation)
                .map_err(|e| pair_error(images, Stage::RankSizes, i, j, e))?;
            log_fitted(&reg);
            tally.record(reg.target());
            built.push(reg);
            Ok::<_, Error>((built, tally))
        })
        .try_reduce(empty, |(mut built, tally), (more, other)| {
            built.extend(more);
            Ok((built, tally.merge(other)))
        })
}

/// Resample every non-reference image onto `reference`.
///
/// A voted reference can lose an individual pairwise comparison when votes
/// are cyclic. Such a pair ends at the other image and is reversed here so
/// that every slot still gets filled.
fn resample_onto(
    images: &[Image],
    registrations: &[PairwiseRegistration],
    reference: usize,
    config: &Config,
) -> Result<Vec<(usize, Image)>, Error> {
    tracing::debug!("Resampling onto #{}", reference);
    let params = config.resample_params();

    registrations
        .par_iter()
        .filter(|reg| reg.target() == reference || reg.source() == reference)
        .map(|reg| {
            let fail = |e: ModelError| {
                pair_error(images, Stage::Resample, reg.source(), reg.target(), e)
            };
            let onto_reference = if reg.target() == reference {
                reg.clone()
            } else {
                reg.reversed().map_err(fail)?
            };
            let source = onto_reference.source();
            let image = resample(&onto_reference, &images[source], &images[reference], &params)
                .map_err(fail)?;
            Ok::<_, Error>((source, image))
        })
        .collect()
}

fn pair_error(images: &[Image], stage: Stage, from: usize, to: usize, source: ModelError) -> Error {
    tracing::debug!(
        "Pair #{} -> #{} failed while {}: {}",
        from,
        to,
        stage,
        source
    );
    Error::Pair {
        stage,
        from,
        to,
        from_label: images[from].label().to_string(),
        to_label: images[to].label().to_string(),
        source,
    }
}

fn log_fitted(reg: &PairwiseRegistration) {
    tracing::debug!(
        "Pair #{} -> #{}{}: {}",
        reg.source(),
        reg.target(),
        if reg.was_swapped() { " (swapped)" } else { "" },
        reg.transform()
    );
}

fn log_transform(images: &[Image], reg: &PairwiseRegistration) {
    tracing::info!(
        "Transforming from {} to {} has the following matrix:\n{}",
        images[reg.source()].label(),
        images[reg.target()].label(),
        reg.transform().matrix_rows()
    );
}
