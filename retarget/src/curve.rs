//! Keyframe curves
//!
//! Each animated bone produces nine curves, in this order: translate X/Y/Z,
//! rotate X/Y/Z, scale X/Y/Z. Keys carry no tangents; writers are expected to
//! apply their own constant/default tangent policy.

use std::fmt;

use crate::remap::RemappedSample;
use crate::resample::FrameRateResampler;

/// Which transform component a channel belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    Translate,
    Rotate,
    Scale,
}

impl ComponentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Rotate => "rotate",
            Self::Scale => "scale",
        }
    }

    /// Unit of every channel in this component
    pub fn unit(self) -> UnitKind {
        match self {
            Self::Translate => UnitKind::Linear,
            Self::Rotate => UnitKind::Angular,
            Self::Scale => UnitKind::Unitless,
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Value unit of a curve
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// Distance (translation)
    Linear,
    /// Degrees (rotation)
    Angular,
    /// Dimensionless (scale)
    Unitless,
}

impl UnitKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Angular => "angular",
            Self::Unitless => "unitless",
        }
    }
}

/// One of the nine semantic channels of a bone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Channel {
    pub component: ComponentKind,
    pub axis: Axis,
}

impl Channel {
    /// Emission order within a bone
    pub const ALL: [Channel; 9] = [
        Channel::new(ComponentKind::Translate, Axis::X),
        Channel::new(ComponentKind::Translate, Axis::Y),
        Channel::new(ComponentKind::Translate, Axis::Z),
        Channel::new(ComponentKind::Rotate, Axis::X),
        Channel::new(ComponentKind::Rotate, Axis::Y),
        Channel::new(ComponentKind::Rotate, Axis::Z),
        Channel::new(ComponentKind::Scale, Axis::X),
        Channel::new(ComponentKind::Scale, Axis::Y),
        Channel::new(ComponentKind::Scale, Axis::Z),
    ];

    pub const fn new(component: ComponentKind, axis: Axis) -> Self {
        Self { component, axis }
    }

    pub fn unit(self) -> UnitKind {
        self.component.unit()
    }

    /// Attribute name, e.g. `rotateY`
    pub fn attribute_name(self) -> &'static str {
        use Axis::*;
        use ComponentKind::*;
        match (self.component, self.axis) {
            (Translate, X) => "translateX",
            (Translate, Y) => "translateY",
            (Translate, Z) => "translateZ",
            (Rotate, X) => "rotateX",
            (Rotate, Y) => "rotateY",
            (Rotate, Z) => "rotateZ",
            (Scale, X) => "scaleX",
            (Scale, Y) => "scaleY",
            (Scale, Z) => "scaleZ",
        }
    }

    /// Attribute path, e.g. `rotate.rotateY`
    pub fn attribute_path(self) -> String {
        format!("{}.{}", self.component.as_str(), self.attribute_name())
    }

    /// This channel's value in a remapped sample
    pub fn value_of(self, sample: &RemappedSample) -> f64 {
        let values = match self.component {
            ComponentKind::Translate => &sample.translate,
            ComponentKind::Rotate => &sample.rotate,
            ComponentKind::Scale => &sample.scale,
        };
        values[self.axis.index()]
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.attribute_name())
    }
}

/// A single (frame, value) key
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub frame: i64,
    pub value: f64,
}

/// Keyframes for one (bone, channel) pair
///
/// Frames are strictly increasing. Curves are only built by
/// [`CurveEmitter`], which guarantees this through the resampler.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    bone: String,
    channel: Channel,
    keys: Vec<Keyframe>,
}

impl Curve {
    pub fn bone(&self) -> &str {
        &self.bone
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn unit(&self) -> UnitKind {
        self.channel.unit()
    }

    pub fn keys(&self) -> &[Keyframe] {
        &self.keys
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Ordered output of a retargeting run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveSet {
    curves: Vec<Curve>,
}

impl CurveSet {
    pub fn curves(&self) -> &[Curve] {
        &self.curves
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Curve> {
        self.curves.iter()
    }

    pub fn len(&self) -> usize {
        self.curves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.curves.is_empty()
    }

    /// Curves of one bone, in channel order
    pub fn for_bone<'a>(&'a self, bone: &'a str) -> impl Iterator<Item = &'a Curve> + 'a {
        self.curves.iter().filter(move |c| c.bone == bone)
    }

    pub fn get(&self, bone: &str, channel: Channel) -> Option<&Curve> {
        self.curves
            .iter()
            .find(|c| c.bone == bone && c.channel == channel)
    }

    /// Total number of keys across all curves
    pub fn keyframe_count(&self) -> usize {
        self.curves.iter().map(Curve::len).sum()
    }

    /// First and last keyed frame over all curves
    pub fn frame_range(&self) -> Option<(i64, i64)> {
        let mut frames = self.curves.iter().flat_map(|c| c.keys.iter().map(|k| k.frame));
        let first = frames.next()?;
        Some(frames.fold((first, first), |(lo, hi), f| (lo.min(f), hi.max(f))))
    }

    pub(crate) fn extend(&mut self, curves: impl IntoIterator<Item = Curve>) {
        self.curves.extend(curves);
    }
}

impl<'a> IntoIterator for &'a CurveSet {
    type Item = &'a Curve;
    type IntoIter = std::slice::Iter<'a, Curve>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Builds a bone's nine curves from its remapped samples
#[derive(Debug, Clone, Copy)]
pub struct CurveEmitter {
    resampler: FrameRateResampler,
}

impl CurveEmitter {
    pub fn new(resampler: FrameRateResampler) -> Self {
        Self { resampler }
    }

    pub fn resampler(&self) -> &FrameRateResampler {
        &self.resampler
    }

    /// One curve per channel, in [`Channel::ALL`] order
    pub fn emit_bone(&self, bone: &str, samples: &[RemappedSample]) -> Vec<Curve> {
        Channel::ALL
            .iter()
            .map(|&channel| Curve {
                bone: bone.to_string(),
                channel,
                keys: self
                    .resampler
                    .resample(samples.iter().map(|s| channel.value_of(s))),
            })
            .collect()
    }
}
