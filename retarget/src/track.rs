//! Animation samples and track merging
//!
//! Tracks are keyed by bone name and may cover only part of the skeleton.
//! [`merge_tracks`] lines them up with the skeleton's hierarchy order, which is
//! authoritative for output.

use std::collections::BTreeMap;

use crate::error::Diagnostic;
use crate::skeleton::{IndexedBone, SkeletonIndex};

/// Transform (TRS) for a single bone at a single instant
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationSample {
    pub translation: [f32; 3],
    /// Quaternion rotation [x, y, z, w]
    pub rotation: [f32; 4],
    pub scale: [f32; 3],
}

impl AnimationSample {
    pub const IDENTITY: Self = Self {
        translation: [0.0, 0.0, 0.0],
        rotation: [0.0, 0.0, 0.0, 1.0],
        scale: [1.0, 1.0, 1.0],
    };

    pub const fn new(translation: [f32; 3], rotation: [f32; 4], scale: [f32; 3]) -> Self {
        Self {
            translation,
            rotation,
            scale,
        }
    }
}

impl Default for AnimationSample {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Per-frame samples for one bone, one sample per source frame
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BoneTrack {
    samples: Vec<AnimationSample>,
}

impl BoneTrack {
    pub fn new(samples: Vec<AnimationSample>) -> Self {
        Self { samples }
    }

    /// Single-sample track for a bone that holds one pose
    pub fn static_pose(sample: AnimationSample) -> Self {
        Self {
            samples: vec![sample],
        }
    }

    pub fn samples(&self) -> &[AnimationSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn is_static(&self) -> bool {
        self.samples.len() == 1
    }
}

impl FromIterator<AnimationSample> for BoneTrack {
    fn from_iter<I: IntoIterator<Item = AnimationSample>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Sparse set of bone tracks sampled at one source rate
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationSet {
    source_rate: f64,
    frame_count: Option<usize>,
    tracks: BTreeMap<String, BoneTrack>,
}

impl AnimationSet {
    pub fn new(source_rate: f64) -> Self {
        Self {
            source_rate,
            frame_count: None,
            tracks: BTreeMap::new(),
        }
    }

    /// Declared sample rate of every track, in frames per second
    pub fn source_rate(&self) -> f64 {
        self.source_rate
    }

    /// Declared frame count, or the longest track when none was declared
    pub fn frame_count(&self) -> usize {
        self.frame_count
            .unwrap_or_else(|| self.tracks.values().map(BoneTrack::len).max().unwrap_or(0))
    }

    pub fn set_frame_count(&mut self, frame_count: usize) {
        self.frame_count = Some(frame_count);
    }

    /// Add a track, returning the one it replaced
    pub fn insert(&mut self, bone: impl Into<String>, track: BoneTrack) -> Option<BoneTrack> {
        self.tracks.insert(bone.into(), track)
    }

    pub fn get(&self, bone: &str) -> Option<&BoneTrack> {
        self.tracks.get(bone)
    }

    /// Tracks in ascending bone-name order
    pub fn tracks(&self) -> impl Iterator<Item = (&str, &BoneTrack)> {
        self.tracks.iter().map(|(name, track)| (name.as_str(), track))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// A skeleton bone paired with its track, if it has one
#[derive(Clone, Copy, Debug)]
pub struct MergedBone<'a> {
    /// Position in hierarchy order
    pub position: usize,
    pub bone: &'a IndexedBone,
    pub track: Option<&'a BoneTrack>,
}

/// Result of [`merge_tracks`]
#[derive(Clone, Debug)]
pub struct TrackMerge<'a> {
    /// One entry per skeleton bone, in hierarchy order
    pub bones: Vec<MergedBone<'a>>,
    pub diagnostics: Vec<Diagnostic>,
}

impl<'a> TrackMerge<'a> {
    /// Bones that will produce curves
    pub fn animated(&self) -> impl Iterator<Item = &MergedBone<'a>> {
        self.bones.iter().filter(|b| b.track.is_some())
    }
}

/// Pair every skeleton bone with its track by exact, case-sensitive name
///
/// Bones without a track (or with an empty one) get `None` and a
/// [`Diagnostic::MissingBoneTrack`]. Tracks naming unknown bones are dropped
/// with a [`Diagnostic::UnmatchedAnimationBone`], reported in name order.
pub fn merge_tracks<'a>(index: &'a SkeletonIndex, animation: &'a AnimationSet) -> TrackMerge<'a> {
    let mut diagnostics = Vec::new();

    let bones: Vec<MergedBone<'a>> = index
        .iter()
        .enumerate()
        .map(|(position, bone)| {
            let track = animation.get(&bone.name).filter(|t| !t.is_empty());
            if track.is_none() {
                tracing::debug!("Bone '{}' has no animation track, skipping", bone.name);
                diagnostics.push(Diagnostic::MissingBoneTrack {
                    bone: bone.name.clone(),
                });
            }
            MergedBone {
                position,
                bone,
                track,
            }
        })
        .collect();

    for (name, _) in animation.tracks() {
        if index.position_of(name).is_none() {
            tracing::warn!("Animation track '{}' has no matching skeleton bone, dropped", name);
            diagnostics.push(Diagnostic::UnmatchedAnimationBone {
                bone: name.to_string(),
            });
        }
    }

    TrackMerge { bones, diagnostics }
}
