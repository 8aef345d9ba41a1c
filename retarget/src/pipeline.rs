//! End-to-end retargeting run

use crate::config::RetargetConfig;
use crate::curve::{CurveEmitter, CurveSet};
use crate::error::{Diagnostic, RetargetError};
use crate::remap::CoordinateRemapper;
use crate::resample::FrameRateResampler;
use crate::rotation::RotationConverter;
use crate::skeleton::{Skeleton, SkeletonIndex};
use crate::track::{merge_tracks, AnimationSet, TrackMerge};

/// Curves produced by a successful run, plus everything that was tolerated
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetargetOutput {
    pub curves: CurveSet,
    pub diagnostics: Vec<Diagnostic>,
}

impl RetargetOutput {
    /// Skeleton bones that had no track and emitted nothing
    pub fn skipped_bones(&self) -> impl Iterator<Item = &str> {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::MissingBoneTrack { bone } => Some(bone.as_str()),
            _ => None,
        })
    }

    /// Tracks dropped because the skeleton has no such bone
    pub fn dropped_tracks(&self) -> impl Iterator<Item = &str> {
        self.diagnostics.iter().filter_map(|d| match d {
            Diagnostic::UnmatchedAnimationBone { bone } => Some(bone.as_str()),
            _ => None,
        })
    }
}

/// Retarget `animation` onto `skeleton`
///
/// All-or-nothing: any error returns no curves at all. That covers a bad
/// hierarchy, bad rates, a track too long for the target frame range, and a
/// degenerate rotation in strict mode.
pub fn retarget(
    skeleton: &Skeleton,
    animation: &AnimationSet,
    config: &RetargetConfig,
) -> Result<RetargetOutput, RetargetError> {
    let source_rate = animation.source_rate();
    let resampler = FrameRateResampler::new(source_rate, config.target_rate_for(source_rate))?;
    let index = SkeletonIndex::build(skeleton)?;

    let TrackMerge {
        bones,
        mut diagnostics,
    } = merge_tracks(&index, animation);

    let converter = RotationConverter::new(config.degenerate_policy());
    let emitter = CurveEmitter::new(resampler);
    let mut curves = CurveSet::default();

    for merged in &bones {
        let Some(track) = merged.track else {
            continue;
        };
        let name = merged.bone.name.as_str();
        resampler.check_sample_count(track.len())?;
        let remapper = CoordinateRemapper::for_role(merged.bone.role);

        let mut samples = Vec::with_capacity(track.len());
        for (frame, sample) in track.samples().iter().enumerate() {
            let (euler, diagnostic) = converter.convert(name, frame, sample.rotation)?;
            diagnostics.extend(diagnostic);
            samples.push(remapper.sample(sample, euler));
        }

        tracing::debug!(
            "Bone '{}' ({:?}): {} samples, remap {:?}",
            name,
            merged.bone.role,
            samples.len(),
            remapper
        );

        curves.extend(emitter.emit_bone(name, &samples));
    }

    tracing::debug!(
        "Retargeted {} bones at ratio {:.4}: {} curves, {} keys, {} diagnostics",
        bones.len(),
        resampler.ratio(),
        curves.len(),
        curves.keyframe_count(),
        diagnostics.len()
    );

    Ok(RetargetOutput { curves, diagnostics })
}
