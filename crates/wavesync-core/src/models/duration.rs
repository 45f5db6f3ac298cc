use serde::{Deserialize, Serialize};

use crate::constants::PLACEHOLDER_DURATION_SECS;

/// Whole-second duration determined by probing an audio resource.
///
/// `minutes` and `seconds` are `total_seconds` decomposed for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DurationProbeResult {
    pub total_seconds: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl DurationProbeResult {
    pub fn from_total_seconds(total_seconds: u64) -> Self {
        Self {
            total_seconds,
            minutes: total_seconds / 60,
            seconds: total_seconds % 60,
        }
    }

    /// Floors a fractional duration. Returns `None` for negative or non-finite input.
    pub fn from_secs_f64(secs: f64) -> Option<Self> {
        if !secs.is_finite() || secs < 0.0 {
            return None;
        }
        Some(Self::from_total_seconds(secs.floor() as u64))
    }

    /// `M:SS`, minutes unpadded.
    pub fn formatted(&self) -> String {
        format!("{}:{:02}", self.minutes, self.seconds)
    }
}

/// True when a stored duration is absent, zero or the historic placeholder.
pub fn needs_fix(duration_seconds: Option<u64>) -> bool {
    match duration_seconds {
        None | Some(0) => true,
        Some(secs) => secs == PLACEHOLDER_DURATION_SECS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decomposes_total_seconds() {
        let result = DurationProbeResult::from_total_seconds(185);
        assert_eq!(result.minutes, 3);
        assert_eq!(result.seconds, 5);
        assert_eq!(result.formatted(), "3:05");

        assert_eq!(DurationProbeResult::from_total_seconds(3725).formatted(), "62:05");
    }

    #[test]
    fn floors_fractional_seconds() {
        let result = DurationProbeResult::from_secs_f64(185.9).unwrap();
        assert_eq!(result.total_seconds, 185);
        assert_eq!(DurationProbeResult::from_secs_f64(0.4).unwrap().total_seconds, 0);
        assert!(DurationProbeResult::from_secs_f64(-1.0).is_none());
        assert!(DurationProbeResult::from_secs_f64(f64::NAN).is_none());
    }

    #[test]
    fn needs_fix_flags_missing_zero_and_placeholder() {
        assert!(needs_fix(None));
        assert!(needs_fix(Some(0)));
        assert!(needs_fix(Some(180)));
    }

    #[test]
    fn needs_fix_accepts_other_positive_durations() {
        for secs in [1, 179, 181, 185, 3600] {
            assert!(!needs_fix(Some(secs)), "{} should not need a fix", secs);
        }
    }
}
