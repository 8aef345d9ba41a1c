//! Retargeting configuration

use serde::{Deserialize, Serialize};

use crate::rotation::DegeneratePolicy;

/// Sample rate of source animations when the input does not declare one
pub const DEFAULT_SOURCE_RATE: f64 = 60.0;

/// Options for a retargeting run
///
/// Root bones are always identified structurally (no parent).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetargetConfig {
    /// Output frame rate. `None` keeps the source rate (1:1 frame mapping).
    pub target_rate: Option<f64>,

    /// Fail on degenerate quaternions instead of substituting the identity.
    pub strict_rotations: bool,
}

impl RetargetConfig {
    /// Config that resamples to `target_rate`
    pub fn with_target_rate(target_rate: f64) -> Self {
        Self {
            target_rate: Some(target_rate),
            ..Self::default()
        }
    }

    /// Effective target rate for an animation sampled at `source_rate`
    pub fn target_rate_for(&self, source_rate: f64) -> f64 {
        self.target_rate.unwrap_or(source_rate)
    }

    pub fn degenerate_policy(&self) -> DegeneratePolicy {
        if self.strict_rotations {
            DegeneratePolicy::Abort
        } else {
            DegeneratePolicy::SubstituteIdentity
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_source_rate() {
        let config = RetargetConfig::default();
        assert_eq!(config.target_rate_for(DEFAULT_SOURCE_RATE), 60.0);
        assert_eq!(config.degenerate_policy(), DegeneratePolicy::SubstituteIdentity);
    }

    #[test]
    fn test_parse_from_toml() {
        let config: RetargetConfig = toml::from_str(
            r#"
            target_rate = 29.97
            strict_rotations = true
            "#,
        )
        .unwrap();
        assert_eq!(config.target_rate_for(60.0), 29.97);
        assert_eq!(config.degenerate_policy(), DegeneratePolicy::Abort);

        let empty: RetargetConfig = toml::from_str("").unwrap();
        assert_eq!(empty, RetargetConfig::default());
    }
}
