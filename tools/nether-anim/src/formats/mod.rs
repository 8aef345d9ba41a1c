//! Maya ASCII `.anim` writer
//!
//! Writes a curve set as `animVersion 1.1` text: a header with units and the
//! keyed time range, then one `anim`/`animData` block per curve.

use anyhow::Result;
use nethercore_retarget::{ComponentKind, Curve, CurveSet, Keyframe};
use std::fmt;
use std::io::Write;

/// Default `mayaVersion` header value
pub const DEFAULT_MAYA_VERSION: &str = "2020";

/// Maya named time units and the frame rate each stands for
const TIME_UNITS: [(f64, &str); 9] = [
    (15.0, "game"),
    (24.0, "film"),
    (25.0, "pal"),
    (29.97, "ntsc"),
    (30.0, "ntsc"),
    (48.0, "show"),
    (50.0, "palf"),
    (59.94, "ntscf"),
    (60.0, "ntscf"),
];

/// Closest Maya time unit for a frame rate
pub fn time_unit_for_rate(fps: f64) -> &'static str {
    TIME_UNITS
        .iter()
        .min_by(|a, b| (a.0 - fps).abs().total_cmp(&(b.0 - fps).abs()))
        .map(|(_, unit)| *unit)
        .unwrap_or("ntsc")
}

/// Header values for a `.anim` file
#[derive(Debug, Clone, PartialEq)]
pub struct MayaAnimHeader {
    pub maya_version: String,
    pub time_unit: &'static str,
}

impl MayaAnimHeader {
    pub fn new(maya_version: impl Into<String>, fps: f64) -> Self {
        Self {
            maya_version: maya_version.into(),
            time_unit: time_unit_for_rate(fps),
        }
    }
}

/// `anim` line output type: 1 for rotation, 0 otherwise
fn output_type(curve: &Curve) -> u8 {
    match curve.channel().component {
        ComponentKind::Rotate => 1,
        ComponentKind::Translate | ComponentKind::Scale => 0,
    }
}

/// Write a complete Maya `.anim` file
///
/// Curve indices count up from 0 within each bone, following channel order.
pub fn write_maya_anim<W: Write>(w: &mut W, header: &MayaAnimHeader, curves: &CurveSet) -> Result<()> {
    let (start, end) = curves.frame_range().unwrap_or((0, 0));

    writeln!(w, "animVersion 1.1;")?;
    writeln!(w, "mayaVersion {};", header.maya_version)?;
    writeln!(w, "timeUnit {};", header.time_unit)?;
    writeln!(w, "linearUnit cm;")?;
    writeln!(w, "angularUnit deg;")?;
    writeln!(w, "startTime {};", start)?;
    writeln!(w, "endTime {};", end)?;

    let mut index = 0usize;
    let mut previous_bone: Option<&str> = None;
    for curve in curves {
        if previous_bone != Some(curve.bone()) {
            index = 0;
            previous_bone = Some(curve.bone());
        }
        write_curve(w, curve, index)?;
        index += 1;
    }

    Ok(())
}

fn write_curve<W: Write>(w: &mut W, curve: &Curve, index: usize) -> Result<()> {
    let channel = curve.channel();
    writeln!(
        w,
        "anim {} {} {} 0 {} {};",
        channel.attribute_path(),
        channel.attribute_name(),
        curve.bone(),
        output_type(curve),
        index
    )?;
    writeln!(w, "animData {{")?;
    writeln!(w, "  input time;")?;
    writeln!(w, "  output {};", curve.unit().as_str())?;
    writeln!(w, "  weighted 0;")?;
    writeln!(w, "  preInfinity constant;")?;
    writeln!(w, "  postInfinity constant;")?;

    if !curve.is_empty() {
        writeln!(w, "  keys {{")?;
        for key in curve.keys() {
            write_key(w, key)?;
        }
        writeln!(w, "  }}")?;
    }

    writeln!(w, "}}")?;
    Ok(())
}

fn write_key<W: Write>(w: &mut W, key: &Keyframe) -> Result<()> {
    writeln!(w, "    {} {} auto auto 1 0 0;", key.frame, KeyValue(key.value))?;
    Ok(())
}

/// Shortest text for a key value
///
/// Values widened from f32 sample data print their f32 form (0.1, not
/// 0.10000000149011612). Anything f32 can't hold exactly keeps full precision.
struct KeyValue(f64);

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let narrow = self.0 as f32;
        if f64::from(narrow) == self.0 {
            write!(f, "{}", narrow)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nethercore_retarget::{
        retarget, AnimationSample, AnimationSet, Bone, BoneTrack, RetargetConfig, Skeleton,
    };

    #[test]
    fn test_time_unit_for_rate() {
        assert_eq!(time_unit_for_rate(24.0), "film");
        assert_eq!(time_unit_for_rate(29.97), "ntsc");
        assert_eq!(time_unit_for_rate(30.0), "ntsc");
        assert_eq!(time_unit_for_rate(60.0), "ntscf");
        assert_eq!(time_unit_for_rate(12.0), "game");
        assert_eq!(time_unit_for_rate(26.0), "pal");
        assert_eq!(time_unit_for_rate(240.0), "ntscf");
    }

    #[test]
    fn test_key_values_print_shortest_form() {
        assert_eq!(KeyValue(f64::from(0.1f32)).to_string(), "0.1");
        assert_eq!(KeyValue(f64::from(-81.00001f32)).to_string(), "-81.00001");
        assert_eq!(KeyValue(-2.0).to_string(), "-2");
        assert_eq!(KeyValue(0.1).to_string(), "0.1");
        assert_eq!(KeyValue(1.0 / 3.0).to_string(), "0.3333333333333333");

        let mut out = Vec::new();
        write_key(&mut out, &Keyframe { frame: 4, value: f64::from(0.1f32) }).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "    4 0.1 auto auto 1 0 0;\n");
    }

    #[test]
    fn test_write_empty_curve_set() {
        let mut out = Vec::new();
        write_maya_anim(&mut out, &MayaAnimHeader::new("2020", 29.97), &CurveSet::default()).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "animVersion 1.1;\nmayaVersion 2020;\ntimeUnit ntsc;\nlinearUnit cm;\n\
             angularUnit deg;\nstartTime 0;\nendTime 0;\n"
        );
    }

    #[test]
    fn test_write_curves() {
        let skeleton = Skeleton::new(vec![Bone::root("Trans"), Bone::child_of("Hip", "Trans")]);
        let mut animation = AnimationSet::new(60.0);
        let sample = AnimationSample::new([1.0, 2.0, 3.0], [0.0, 0.0, 0.0, 1.0], [1.0, 1.0, 1.0]);
        animation.insert("Trans", BoneTrack::new(vec![sample; 3]));
        animation.insert("Hip", BoneTrack::static_pose(sample));

        let output = retarget(&skeleton, &animation, &RetargetConfig::default()).unwrap();
        let mut out = Vec::new();
        write_maya_anim(&mut out, &MayaAnimHeader::new("2022", 60.0), &output.curves).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("mayaVersion 2022;\ntimeUnit ntscf;"));
        assert!(text.contains("startTime 0;\nendTime 2;"));
        assert_eq!(text.matches("animData {").count(), 18);

        // Indices restart for each bone
        assert!(text.contains("anim translate.translateX translateX Trans 0 0 0;"));
        assert!(text.contains("anim rotate.rotateX rotateX Trans 0 1 3;"));
        assert!(text.contains("anim scale.scaleZ scaleZ Trans 0 0 8;"));
        assert!(text.contains("anim translate.translateX translateX Hip 0 0 0;"));

        // Hip is a child: translation (1, 2, 3) is written as (1, 3, -2)
        let hip_translate_z = text
            .split("anim translate.translateZ translateZ Hip")
            .nth(1)
            .unwrap();
        assert!(hip_translate_z.contains("  output linear;"));
        assert!(hip_translate_z.contains("    0 -2 auto auto 1 0 0;"));

        let rotate = text.split("anim rotate.rotateY rotateY Trans").nth(1).unwrap();
        assert!(rotate.contains("  output angular;"));
        let scale = text.split("anim scale.scaleX scaleX Trans").nth(1).unwrap();
        assert!(scale.contains("  output unitless;"));
    }
}
