//! Root bone axis convention conversion
//!
//! ssbh_data root transforms are Y-up and X-major. The retarget core passes
//! root bones through untouched, so their samples are converted here first by
//! full matrix composition: `y_up_to_z_up * M * x_major_to_y_major`.
//! Child bones are left alone; the core remaps them.

use anyhow::{Context, Result};
use glam::{Mat4, Quat, Vec3};
use nethercore_retarget::{AnimationSample, AnimationSet, BoneTrack, Skeleton, SkeletonIndex};

/// Quaternions shorter than this are left for the core to report
const DEGENERATE_NORM: f32 = 1e-8;

fn convert_matrix(m: Mat4) -> Mat4 {
    // Hard coded for exact 0/1 entries.
    // rotate x +90 degrees
    let y_up_to_z_up = Mat4::from_cols_array_2d(&[
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    // rotate z -90 degrees
    let x_major_to_y_major = Mat4::from_cols_array_2d(&[
        [0.0, -1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]);

    y_up_to_z_up * m * x_major_to_y_major
}

/// Convert one root sample to the target convention
///
/// A degenerate rotation is kept as-is (translation and scale are still
/// converted) so the retarget run can apply its degenerate-rotation policy.
pub fn convert_root_sample(sample: &AnimationSample) -> AnimationSample {
    let rotation = Quat::from_array(sample.rotation);
    let length = rotation.length();
    let degenerate = !length.is_finite() || length < DEGENERATE_NORM;

    let m = Mat4::from_scale_rotation_translation(
        Vec3::from_array(sample.scale),
        if degenerate { Quat::IDENTITY } else { rotation / length },
        Vec3::from_array(sample.translation),
    );
    let (scale, converted, translation) = convert_matrix(m).to_scale_rotation_translation();

    AnimationSample::new(
        translation.to_array(),
        if degenerate { sample.rotation } else { converted.to_array() },
        scale.to_array(),
    )
}

/// Copy of `animation` with every root bone's track converted
pub fn convert_root_tracks(skeleton: &Skeleton, animation: &AnimationSet) -> Result<AnimationSet> {
    let index = SkeletonIndex::build(skeleton).context("Invalid bone hierarchy")?;

    let mut converted = animation.clone();
    for bone in index.roots() {
        let Some(track) = animation.get(&bone.name) else {
            continue;
        };
        let track: BoneTrack = track.samples().iter().map(convert_root_sample).collect();
        tracing::debug!("Converted root '{}' ({} samples)", bone.name, track.len());
        converted.insert(bone.name.clone(), track);
    }

    Ok(converted)
}
