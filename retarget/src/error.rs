//! Error and diagnostic types
//!
//! [`RetargetError`] aborts a run; no partial curve set is produced.
//! [`Diagnostic`] records conditions that were tolerated and reported
//! alongside a successful run.

use std::fmt;

use crate::curve::ComponentKind;
use crate::skeleton::ParentRef;

/// Fatal retargeting error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RetargetError {
    /// A bone's parent reference does not resolve to a bone in the skeleton
    #[error("bone '{bone}' references parent {parent}, which is not in the skeleton")]
    InvalidHierarchyReference { bone: String, parent: ParentRef },

    /// Following parent references from this bone never reaches a root
    #[error("bone '{bone}' is part of a parent cycle")]
    CyclicHierarchy { bone: String },

    /// Two bones share a name, so name lookups would be ambiguous
    #[error("bone name '{0}' appears more than once in the skeleton")]
    DuplicateBoneName(String),

    /// Quaternion too close to zero to normalize (strict mode only)
    #[error("degenerate rotation on bone '{bone}' at frame {frame} ({component} channels, norm {norm:e})")]
    DegenerateRotation {
        bone: String,
        frame: usize,
        component: ComponentKind,
        norm: f64,
    },

    /// Source or target rate is zero, negative, or not finite
    #[error("invalid {which} frame rate {rate} (must be finite and positive)")]
    InvalidFrameRate { which: &'static str, rate: f64 },

    /// Rates are valid on their own but `target / source` is zero or infinite
    #[error("frame rate ratio {target_rate} / {source_rate} is not a finite positive number")]
    InvalidRateRatio { source_rate: f64, target_rate: f64 },

    /// The last sample of a track maps past the largest representable frame
    #[error("{samples} samples at ratio {ratio} overflow the target frame range")]
    FrameOverflow { samples: usize, ratio: f64 },
}

impl RetargetError {
    /// Whether the error comes from the bone hierarchy rather than sample data
    pub fn is_hierarchy_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidHierarchyReference { .. }
                | Self::CyclicHierarchy { .. }
                | Self::DuplicateBoneName(_)
        )
    }
}

/// Non-fatal condition reported by a successful run
#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Skeleton bone without animation data; it emits no curves
    MissingBoneTrack { bone: String },

    /// Animation track naming a bone the skeleton does not have; dropped
    UnmatchedAnimationBone { bone: String },

    /// Degenerate quaternion replaced by the identity rotation
    DegenerateRotationSubstituted {
        bone: String,
        frame: usize,
        component: ComponentKind,
        norm: f64,
    },
}

impl Diagnostic {
    /// Bone the diagnostic refers to
    pub fn bone(&self) -> &str {
        match self {
            Self::MissingBoneTrack { bone }
            | Self::UnmatchedAnimationBone { bone }
            | Self::DegenerateRotationSubstituted { bone, .. } => bone,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingBoneTrack { bone } => {
                write!(f, "bone '{}' has no animation track, skipped", bone)
            }
            Self::UnmatchedAnimationBone { bone } => {
                write!(f, "track '{}' has no matching skeleton bone, dropped", bone)
            }
            Self::DegenerateRotationSubstituted {
                bone,
                frame,
                component,
                norm,
            } => write!(
                f,
                "bone '{}' frame {}: degenerate rotation (norm {:e}) replaced by identity on {} channels",
                bone, frame, norm, component
            ),
        }
    }
}
