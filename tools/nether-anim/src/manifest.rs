//! retarget.toml parsing
//!
//! ```toml
//! [input]
//! source_rate = 60.0
//!
//! [retarget]
//! target_rate = 24.0
//! strict_rotations = true
//!
//! [output]
//! maya_version = "2022"
//! ```
//!
//! Every section and field is optional.

use anyhow::{Context, Result};
use nethercore_retarget::{FrameRateResampler, RetargetConfig, DEFAULT_SOURCE_RATE};
use serde::Deserialize;
use std::path::Path;

use crate::formats::DEFAULT_MAYA_VERSION;

/// Frame rate the tool converts to when nothing else is given (NTSC)
pub const DEFAULT_TARGET_RATE: f64 = 29.97;

/// retarget.toml structure
#[derive(Debug, Default, Deserialize)]
pub struct RetargetManifest {
    #[serde(default)]
    pub input: InputSection,
    #[serde(default)]
    pub retarget: RetargetConfig,
    #[serde(default)]
    pub output: OutputSection,
}

/// Source data settings
#[derive(Debug, Deserialize)]
pub struct InputSection {
    /// Rate the animation JSON was sampled at.
    /// Default: 60
    #[serde(default = "default_source_rate")]
    pub source_rate: f64,
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            source_rate: default_source_rate(),
        }
    }
}

/// .anim output settings
#[derive(Debug, Deserialize)]
pub struct OutputSection {
    /// Written to the `mayaVersion` header line.
    /// Default: "2020"
    #[serde(default = "default_maya_version")]
    pub maya_version: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            maya_version: default_maya_version(),
        }
    }
}

fn default_source_rate() -> f64 {
    DEFAULT_SOURCE_RATE
}

fn default_maya_version() -> String {
    DEFAULT_MAYA_VERSION.to_string()
}

impl RetargetManifest {
    /// Load manifest from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config: {}", path.display()))
    }

    /// Parse manifest from string
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse retarget.toml")
    }

    /// Target rate the tool converts to, defaulting to NTSC
    pub fn target_rate(&self) -> f64 {
        self.retarget.target_rate.unwrap_or(DEFAULT_TARGET_RATE)
    }

    /// Check that the configured rates form a usable conversion
    pub fn validate(&self) -> Result<()> {
        FrameRateResampler::new(self.input.source_rate, self.target_rate())
            .context("Invalid frame rates")?;
        if self.output.maya_version.trim().is_empty() {
            anyhow::bail!("output.maya_version must not be empty");
        }
        Ok(())
    }
}

/// Load a manifest, or the defaults when no path is given
pub fn load_manifest(path: Option<&Path>) -> Result<RetargetManifest> {
    match path {
        Some(path) => {
            let manifest = RetargetManifest::load(path)?;
            tracing::debug!("Loaded config {:?}: {:?}", path, manifest);
            Ok(manifest)
        }
        None => Ok(RetargetManifest::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_empty_manifest_uses_defaults() {
        let manifest = RetargetManifest::parse("").unwrap();
        assert_eq!(manifest.input.source_rate, 60.0);
        assert_eq!(manifest.retarget, RetargetConfig::default());
        assert_eq!(manifest.output.maya_version, "2020");
        assert_eq!(manifest.target_rate(), DEFAULT_TARGET_RATE);
        manifest.validate().unwrap();
    }

    #[test]
    fn test_parse_all_sections() {
        let manifest = RetargetManifest::parse(
            r#"
            [input]
            source_rate = 30.0

            [retarget]
            target_rate = 24.0
            strict_rotations = true

            [output]
            maya_version = "2022"
            "#,
        )
        .unwrap();

        assert_eq!(manifest.input.source_rate, 30.0);
        assert_eq!(manifest.target_rate(), 24.0);
        assert!(manifest.retarget.strict_rotations);
        assert_eq!(manifest.output.maya_version, "2022");
    }

    #[test]
    fn test_partial_section_keeps_field_defaults() {
        let manifest = RetargetManifest::parse("[retarget]\nstrict_rotations = true\n").unwrap();
        assert_eq!(manifest.retarget.target_rate, None);
        assert_eq!(manifest.target_rate(), DEFAULT_TARGET_RATE);
        assert_eq!(manifest.input.source_rate, 60.0);
    }

    #[test]
    fn test_validate_rejects_bad_rates() {
        let manifest = RetargetManifest::parse("[input]\nsource_rate = 0.0\n").unwrap();
        assert!(manifest.validate().is_err());

        let manifest = RetargetManifest::parse("[retarget]\ntarget_rate = -24.0\n").unwrap();
        assert!(manifest.validate().is_err());

        let manifest = RetargetManifest::parse("[output]\nmaya_version = \"\"\n").unwrap();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_parse_rejects_wrong_types() {
        assert!(RetargetManifest::parse("[retarget]\ntarget_rate = \"fast\"\n").is_err());
    }

    #[test]
    fn test_load_manifest_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("retarget.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "[output]\nmaya_version = \"2019\"").unwrap();

        let manifest = load_manifest(Some(&path)).unwrap();
        assert_eq!(manifest.output.maya_version, "2019");

        assert!(load_manifest(Some(&dir.path().join("missing.toml"))).is_err());
        assert_eq!(load_manifest(None).unwrap().output.maya_version, "2020");
    }
}
