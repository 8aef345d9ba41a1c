//! Animation JSON + skeleton JSON -> Maya .anim

use anyhow::{Context, Result};
use nethercore_retarget::{retarget, AnimationSet, RetargetConfig, RetargetOutput, Skeleton};
use std::path::{Path, PathBuf};

use crate::animation::load_animation;
use crate::convention::convert_root_tracks;
use crate::formats::{write_maya_anim, MayaAnimHeader};
use crate::manifest::load_manifest;
use crate::skeleton::load_skeleton;

/// Command-line overrides for a conversion
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Target frame rate (overrides config)
    pub fps: Option<f64>,
    /// Keep the source frame rate; wins over `fps`
    pub no_fps_conversion: bool,
    /// Rate the animation JSON was sampled at (overrides config)
    pub source_fps: Option<f64>,
    /// `mayaVersion` header value (overrides config)
    pub maya_version: Option<String>,
    /// Abort on degenerate rotations
    pub strict: bool,
    /// Optional retarget.toml
    pub config: Option<PathBuf>,
}

/// Fully resolved settings for one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertSettings {
    pub source_rate: f64,
    pub retarget: RetargetConfig,
    pub maya_version: String,
}

impl ConvertSettings {
    /// Rate the output curves are keyed at
    pub fn target_rate(&self) -> f64 {
        self.retarget.target_rate_for(self.source_rate)
    }
}

impl ConvertOptions {
    /// Merge config file values with command-line overrides
    pub fn resolve(&self) -> Result<ConvertSettings> {
        let manifest = load_manifest(self.config.as_deref())?;

        let source_rate = self.source_fps.unwrap_or(manifest.input.source_rate);
        let target_rate = if self.no_fps_conversion {
            source_rate
        } else {
            self.fps.unwrap_or_else(|| manifest.target_rate())
        };

        Ok(ConvertSettings {
            source_rate,
            retarget: RetargetConfig {
                target_rate: Some(target_rate),
                strict_rotations: self.strict || manifest.retarget.strict_rotations,
            },
            maya_version: self
                .maya_version
                .clone()
                .unwrap_or(manifest.output.maya_version),
        })
    }
}

/// Retarget and serialize to an in-memory .anim document
///
/// Root tracks are converted to the target axis convention before the
/// retarget run, which then remaps the child bones.
pub fn convert_to_memory(
    skeleton: &Skeleton,
    animation: &AnimationSet,
    settings: &ConvertSettings,
) -> Result<(String, RetargetOutput)> {
    let animation = convert_root_tracks(skeleton, animation)?;
    let output =
        retarget(skeleton, &animation, &settings.retarget).context("Retargeting failed")?;

    let header = MayaAnimHeader::new(settings.maya_version.clone(), settings.target_rate());
    let mut buf = Vec::new();
    write_maya_anim(&mut buf, &header, &output.curves)?;
    let text = String::from_utf8(buf).context(".anim output is not UTF-8")?;

    Ok((text, output))
}

/// Convert an animation JSON file to a Maya .anim file
pub fn convert(
    animation_path: &Path,
    skeleton_path: &Path,
    output_path: &Path,
    options: &ConvertOptions,
) -> Result<()> {
    let settings = options.resolve()?;
    check_extension(animation_path, "json");
    check_extension(skeleton_path, "json");
    check_extension(output_path, "anim");

    let skeleton = load_skeleton(skeleton_path)?;
    let animation = load_animation(animation_path, settings.source_rate)?;

    tracing::info!(
        "Retargeting {} tracks onto {} bones ({} fps -> {} fps)",
        animation.len(),
        skeleton.len(),
        settings.source_rate,
        settings.target_rate()
    );

    let (text, output) = convert_to_memory(&skeleton, &animation, &settings)?;

    for diagnostic in &output.diagnostics {
        tracing::debug!("{}", diagnostic);
    }
    let skipped = output.skipped_bones().count();
    let dropped: Vec<&str> = output.dropped_tracks().collect();
    if !dropped.is_empty() {
        tracing::warn!(
            "{} animation tracks had no skeleton bone: {}",
            dropped.len(),
            dropped.join(", ")
        );
    }

    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {:?}", parent))?;
    }
    std::fs::write(output_path, text)
        .with_context(|| format!("Failed to write output: {:?}", output_path))?;

    let range = output
        .curves
        .frame_range()
        .map(|(start, end)| format!("frames {}..={}", start, end))
        .unwrap_or_else(|| "no keys".to_string());
    tracing::info!(
        "Wrote {:?}: {} curves, {} keys, {} ({} bones without tracks)",
        output_path,
        output.curves.len(),
        output.curves.keyframe_count(),
        range,
        skipped
    );

    Ok(())
}

fn check_extension(path: &Path, expected: &str) {
    let matches = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(expected));
    if !matches {
        tracing::warn!("{:?} does not have a .{} extension", path, expected);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nethercore_retarget::{AnimationSample, Bone, BoneTrack};

    #[test]
    fn test_resolve_defaults_to_ntsc() {
        let settings = ConvertOptions::default().resolve().unwrap();
        assert_eq!(settings.source_rate, 60.0);
        assert_eq!(settings.target_rate(), 29.97);
        assert_eq!(settings.maya_version, "2020");
        assert!(!settings.retarget.strict_rotations);
    }

    #[test]
    fn test_no_fps_conversion_wins_over_fps() {
        let options = ConvertOptions {
            fps: Some(24.0),
            no_fps_conversion: true,
            source_fps: Some(50.0),
            ..Default::default()
        };
        let settings = options.resolve().unwrap();
        assert_eq!(settings.target_rate(), 50.0);
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("retarget.toml");
        std::fs::write(
            &config,
            "[retarget]\ntarget_rate = 24.0\nstrict_rotations = true\n[output]\nmaya_version = \"2018\"\n",
        )
        .unwrap();

        let from_file = ConvertOptions {
            config: Some(config.clone()),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(from_file.target_rate(), 24.0);
        assert!(from_file.retarget.strict_rotations);
        assert_eq!(from_file.maya_version, "2018");

        let overridden = ConvertOptions {
            fps: Some(30.0),
            maya_version: Some("2024".to_string()),
            config: Some(config),
            ..Default::default()
        }
        .resolve()
        .unwrap();
        assert_eq!(overridden.target_rate(), 30.0);
        assert_eq!(overridden.maya_version, "2024");
    }

    #[test]
    fn test_convert_to_memory() {
        let skeleton = Skeleton::new(vec![Bone::root("Trans"), Bone::child_of("Hip", "Trans")]);
        let mut animation = AnimationSet::new(60.0);
        animation.insert("Hip", BoneTrack::new(vec![AnimationSample::IDENTITY; 4]));

        let settings = ConvertOptions::default().resolve().unwrap();
        let (text, output) = convert_to_memory(&skeleton, &animation, &settings).unwrap();

        assert!(text.starts_with("animVersion 1.1;\nmayaVersion 2020;\ntimeUnit ntsc;\n"));
        // 4 samples at 60 fps land on frames 0, 0, 0, 1 at 29.97 fps
        assert!(text.contains("startTime 0;\nendTime 1;"));
        assert_eq!(output.curves.len(), 9);
        assert_eq!(output.skipped_bones().collect::<Vec<_>>(), ["Trans"]);
    }

    #[test]
    fn test_convert_to_memory_propagates_hierarchy_errors() {
        let skeleton = Skeleton::new(vec![Bone::child_of_index("Hip", 7)]);
        let animation = AnimationSet::new(60.0);
        let settings = ConvertOptions::default().resolve().unwrap();

        let err = convert_to_memory(&skeleton, &animation, &settings).unwrap_err();
        assert!(format!("{:#}", err).contains("Hip"));
    }
}
