//! nethercore-retarget
//!
//! Retargets sampled skeletal animation (quaternion rotations, fixed source
//! rate) into per-channel keyframe curves (Euler XYZ degrees, target rate,
//! remapped axes) ready for a curve-based animation writer.
//!
//! The pipeline is a one-shot batch transform:
//!
//! 1. [`SkeletonIndex`] orders bones so every parent precedes its children.
//! 2. [`merge_tracks`] pairs each bone with its sample track (if any).
//! 3. Each sample is converted ([`quat_to_euler_xyz`]) and remapped
//!    ([`CoordinateRemapper`]) according to the bone's [`BoneRole`].
//! 4. [`FrameRateResampler`] maps source indices to target frames and drops
//!    duplicate frames per channel.
//! 5. [`CurveEmitter`] produces nine [`Curve`]s per animated bone.
//!
//! No I/O happens here; loading and writing live in the export tools.
//!
//! # Example
//!
//! ```
//! use nethercore_retarget::{
//!     retarget, AnimationSample, AnimationSet, Bone, BoneTrack, RetargetConfig, Skeleton,
//! };
//!
//! let skeleton = Skeleton::new(vec![Bone::root("Trans"), Bone::child_of("Hip", "Trans")]);
//!
//! let mut animation = AnimationSet::new(60.0);
//! animation.insert("Hip", BoneTrack::static_pose(AnimationSample::IDENTITY));
//!
//! let output = retarget(&skeleton, &animation, &RetargetConfig::default()).unwrap();
//! assert_eq!(output.curves.len(), 9);
//! ```

pub mod config;
pub mod curve;
pub mod error;
pub mod pipeline;
pub mod remap;
pub mod resample;
pub mod rotation;
pub mod skeleton;
pub mod track;

pub use config::{RetargetConfig, DEFAULT_SOURCE_RATE};
pub use curve::{Axis, Channel, ComponentKind, Curve, CurveEmitter, CurveSet, Keyframe, UnitKind};
pub use error::{Diagnostic, RetargetError};
pub use pipeline::{retarget, RetargetOutput};
pub use remap::{CoordinateRemapper, RemappedSample};
pub use resample::{FrameRateResampler, FrameTracker, RetainedSample};
pub use rotation::{quat_to_euler_xyz, DegeneratePolicy, EulerDegrees, RotationConverter};
pub use skeleton::{Bone, BoneRole, IndexedBone, ParentRef, Skeleton, SkeletonIndex};
pub use track::{merge_tracks, AnimationSample, AnimationSet, BoneTrack, MergedBone, TrackMerge};
