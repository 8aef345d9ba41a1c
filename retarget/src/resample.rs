//! Frame-rate resampling with duplicate elision
//!
//! Source index `i` lands on target frame `floor(i * ρ)` where
//! `ρ = target_rate / source_rate`. When several source samples land on the
//! same target frame the first one wins; later ones are discarded.

use crate::curve::Keyframe;
use crate::error::RetargetError;

/// `i64::MAX` as f64 (2^63); frames at or above it saturate
const MAX_FRAME: f64 = i64::MAX as f64;

/// Maps source sample indices to target frames
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRateResampler {
    ratio: f64,
}

/// A source sample kept by the resampler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetainedSample {
    pub source_index: usize,
    pub target_frame: i64,
}

impl FrameRateResampler {
    /// Create a resampler from source and target rates (frames per second)
    pub fn new(source_rate: f64, target_rate: f64) -> Result<Self, RetargetError> {
        validate_rate("source", source_rate)?;
        validate_rate("target", target_rate)?;

        let ratio = target_rate / source_rate;
        if !ratio.is_finite() || ratio <= 0.0 {
            return Err(RetargetError::InvalidRateRatio {
                source_rate,
                target_rate,
            });
        }
        Ok(Self { ratio })
    }

    /// Check that every index of a `sample_count` track maps to a frame
    /// without saturating, so retained frames stay strictly increasing
    pub fn check_sample_count(&self, sample_count: usize) -> Result<(), RetargetError> {
        let last = sample_count.saturating_sub(1) as f64 * self.ratio;
        if last < MAX_FRAME {
            Ok(())
        } else {
            Err(RetargetError::FrameOverflow {
                samples: sample_count,
                ratio: self.ratio,
            })
        }
    }

    /// `target_rate / source_rate`
    pub fn ratio(&self) -> f64 {
        self.ratio
    }

    pub fn is_identity(&self) -> bool {
        self.ratio == 1.0
    }

    /// Target frame for a source sample index
    ///
    /// Saturates past `i64::MAX`; see [`Self::check_sample_count`].
    pub fn target_frame(&self, source_index: usize) -> i64 {
        (source_index as f64 * self.ratio).floor() as i64
    }

    /// Source samples kept out of `sample_count`, in order
    pub fn retained(&self, sample_count: usize) -> Vec<RetainedSample> {
        let mut tracker = FrameTracker::new();
        (0..sample_count)
            .filter_map(|source_index| {
                let target_frame = self.target_frame(source_index);
                tracker.admit(target_frame).then_some(RetainedSample {
                    source_index,
                    target_frame,
                })
            })
            .collect()
    }

    /// Resample one channel's per-source-frame values into keyframes
    ///
    /// Each call runs its own [`FrameTracker`], so channels never share state.
    pub fn resample<I>(&self, values: I) -> Vec<Keyframe>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut tracker = FrameTracker::new();
        values
            .into_iter()
            .enumerate()
            .filter_map(|(source_index, value)| {
                let frame = self.target_frame(source_index);
                tracker.admit(frame).then_some(Keyframe { frame, value })
            })
            .collect()
    }
}

fn validate_rate(which: &'static str, rate: f64) -> Result<(), RetargetError> {
    if rate.is_finite() && rate > 0.0 {
        Ok(())
    } else {
        Err(RetargetError::InvalidFrameRate { which, rate })
    }
}

/// First-writer-wins accumulator: remembers the last admitted target frame
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTracker {
    last: Option<i64>,
}

impl FrameTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Admit `frame` unless it repeats the last admitted frame
    pub fn admit(&mut self, frame: i64) -> bool {
        if self.last == Some(frame) {
            return false;
        }
        self.last = Some(frame);
        true
    }

    pub fn last(&self) -> Option<i64> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frames(retained: &[RetainedSample]) -> Vec<i64> {
        retained.iter().map(|r| r.target_frame).collect()
    }

    #[test]
    fn test_identity_keeps_every_sample() {
        let resampler = FrameRateResampler::new(60.0, 60.0).unwrap();
        assert!(resampler.is_identity());

        let retained = resampler.retained(25);
        assert_eq!(retained.len(), 25);
        for (i, sample) in retained.iter().enumerate() {
            assert_eq!(sample.source_index, i);
            assert_eq!(sample.target_frame, i as i64);
        }
    }

    #[test]
    fn test_ntsc_downsample_matches_floor_image() {
        let resampler = FrameRateResampler::new(60.0, 29.97).unwrap();
        let ratio = 29.97 / 60.0;

        let mut expected: Vec<i64> = (0..12usize).map(|i| (i as f64 * ratio).floor() as i64).collect();
        expected.dedup();

        assert_eq!(frames(&resampler.retained(12)), expected);
    }

    #[test]
    fn test_first_writer_wins() {
        let resampler = FrameRateResampler::new(60.0, 30.0).unwrap();
        let keys = resampler.resample([10.0, 11.0, 20.0, 21.0, 30.0]);

        assert_eq!(
            keys,
            vec![
                Keyframe { frame: 0, value: 10.0 },
                Keyframe { frame: 1, value: 20.0 },
                Keyframe { frame: 2, value: 30.0 },
            ]
        );
    }

    #[test]
    fn test_upsample_spreads_frames_without_collisions() {
        let resampler = FrameRateResampler::new(30.0, 60.0).unwrap();
        assert_eq!(frames(&resampler.retained(4)), vec![0, 2, 4, 6]);
    }

    #[test]
    fn test_single_sample_track() {
        let resampler = FrameRateResampler::new(60.0, 24.0).unwrap();
        assert_eq!(resampler.resample([1.5]), vec![Keyframe { frame: 0, value: 1.5 }]);
        assert!(resampler.resample(std::iter::empty()).is_empty());
    }

    #[test]
    fn test_frames_strictly_increase() {
        for target in [12.0, 23.976, 24.0, 25.0, 29.97, 30.0, 59.94, 60.0, 120.0] {
            let resampler = FrameRateResampler::new(60.0, target).unwrap();
            let retained = resampler.retained(500);
            assert!(
                retained.windows(2).all(|w| w[0].target_frame < w[1].target_frame),
                "frames not strictly increasing at {} fps",
                target
            );
        }
    }

    #[test]
    fn test_pure_for_same_inputs() {
        let a = FrameRateResampler::new(60.0, 29.97).unwrap();
        let b = FrameRateResampler::new(60.0, 29.97).unwrap();
        assert_eq!(a.retained(300), b.retained(300));
    }

    #[test]
    fn test_invalid_rates() {
        for (source, target) in [(0.0, 30.0), (60.0, -1.0), (f64::NAN, 30.0), (60.0, f64::INFINITY)] {
            assert!(matches!(
                FrameRateResampler::new(source, target),
                Err(RetargetError::InvalidFrameRate { .. })
            ));
        }
    }

    #[test]
    fn test_ratio_must_be_finite() {
        // Each rate is fine alone; 1e200 / 1e-200 is infinite
        assert!(matches!(
            FrameRateResampler::new(1e-200, 1e200),
            Err(RetargetError::InvalidRateRatio { .. })
        ));
        // and 1e-200 / 1e200 underflows to zero
        assert!(matches!(
            FrameRateResampler::new(1e200, 1e-200),
            Err(RetargetError::InvalidRateRatio { .. })
        ));
    }

    #[test]
    fn test_sample_count_overflow() {
        let resampler = FrameRateResampler::new(1.0, 1e300).unwrap();
        assert!(resampler.check_sample_count(0).is_ok());
        assert!(resampler.check_sample_count(1).is_ok());
        assert_eq!(
            resampler.check_sample_count(4),
            Err(RetargetError::FrameOverflow {
                samples: 4,
                ratio: 1e300
            })
        );

        let resampler = FrameRateResampler::new(60.0, 29.97).unwrap();
        assert!(resampler.check_sample_count(1_000_000).is_ok());
    }

    #[test]
    fn test_tracker() {
        let mut tracker = FrameTracker::new();
        assert!(tracker.admit(0));
        assert!(!tracker.admit(0));
        assert!(tracker.admit(1));
        assert_eq!(tracker.last(), Some(1));
    }
}
