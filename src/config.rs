use serde::Deserialize;
use std::collections::HashMap;

use crate::logging::LogLevel;
use crate::motion::{LeavePolicy, SmoothScrollConfig};

pub const MOTION_OVERRIDES_KEY: &str = "portfolio-motion";
pub const LOG_LEVEL_KEY: &str = "portfolio-log-level";

const DEFAULT_SCROLL_DURATION_SECONDS: f64 = 1.2;
const DEFAULT_SCROLL_LERP: f64 = 0.08;
const DEFAULT_SMOOTH_WHEEL: bool = true;
const DEFAULT_SMOOTH_TOUCH: bool = false;
const DEFAULT_MAGNETIC_STRENGTH: f64 = 40.0;
const DEFAULT_PARALLAX_DEPTH: f64 = 10.0;
const DEFAULT_PARALLAX_RESET_ON_LEAVE: bool = true;
const DEFAULT_SKILLS_THRESHOLD: f64 = 0.3;
const DEFAULT_LOG_LEVEL: LogLevel = LogLevel::Info;

const SCROLL_DURATION_SECONDS_BOUNDS: (f64, f64) = (0.1, 5.0);
const SCROLL_LERP_BOUNDS: (f64, f64) = (0.01, 1.0);
const MAGNETIC_STRENGTH_BOUNDS: (f64, f64) = (1.0, 400.0);
const PARALLAX_DEPTH_BOUNDS: (f64, f64) = (0.0, 200.0);
const SKILLS_THRESHOLD_BOUNDS: (f64, f64) = (0.0, 1.0);

/// Where optional overrides are read from.
pub trait SettingSource {
    fn setting(&self, key: &str) -> Option<String>;
}

impl SettingSource for HashMap<String, String> {
    fn setting(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MotionOverrides {
    duration: Option<f64>,
    lerp: Option<f64>,
    smooth_wheel: Option<bool>,
    smooth_touch: Option<bool>,
    magnetic_strength: Option<f64>,
    parallax_depth: Option<f64>,
    parallax_reset_on_leave: Option<bool>,
    skills_threshold: Option<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MotionConfig {
    pub scroll: SmoothScrollConfig,
    pub magnetic_strength: f64,
    pub parallax_depth: f64,
    pub parallax_leave: LeavePolicy,
    pub skills_threshold: f64,
    pub reduced_motion: bool,
    pub log_level: LogLevel,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            scroll: SmoothScrollConfig {
                duration: DEFAULT_SCROLL_DURATION_SECONDS,
                lerp: DEFAULT_SCROLL_LERP,
                smooth_wheel: DEFAULT_SMOOTH_WHEEL,
                smooth_touch: DEFAULT_SMOOTH_TOUCH,
                ..SmoothScrollConfig::default()
            },
            magnetic_strength: DEFAULT_MAGNETIC_STRENGTH,
            parallax_depth: DEFAULT_PARALLAX_DEPTH,
            parallax_leave: leave_policy(DEFAULT_PARALLAX_RESET_ON_LEAVE),
            skills_threshold: DEFAULT_SKILLS_THRESHOLD,
            reduced_motion: false,
            log_level: DEFAULT_LOG_LEVEL,
        }
    }
}

impl MotionConfig {
    /// Defaults overlaid with whatever valid overrides `source` holds.
    pub fn from_source(source: &impl SettingSource) -> Self {
        let overrides = source
            .setting(MOTION_OVERRIDES_KEY)
            .and_then(|raw| serde_json::from_str::<MotionOverrides>(&raw).ok())
            .unwrap_or_default();
        let log_level = source
            .setting(LOG_LEVEL_KEY)
            .and_then(|raw| LogLevel::parse(&raw))
            .unwrap_or(DEFAULT_LOG_LEVEL);

        let mut config = Self {
            log_level,
            ..Self::default()
        };

        config.scroll.duration = within_bounds(
            overrides.duration,
            DEFAULT_SCROLL_DURATION_SECONDS,
            SCROLL_DURATION_SECONDS_BOUNDS,
        );
        config.scroll.lerp = within_bounds(overrides.lerp, DEFAULT_SCROLL_LERP, SCROLL_LERP_BOUNDS);
        config.scroll.smooth_wheel = overrides.smooth_wheel.unwrap_or(DEFAULT_SMOOTH_WHEEL);
        config.scroll.smooth_touch = overrides.smooth_touch.unwrap_or(DEFAULT_SMOOTH_TOUCH);
        config.magnetic_strength = within_bounds(
            overrides.magnetic_strength,
            DEFAULT_MAGNETIC_STRENGTH,
            MAGNETIC_STRENGTH_BOUNDS,
        );
        config.parallax_depth = within_bounds(
            overrides.parallax_depth,
            DEFAULT_PARALLAX_DEPTH,
            PARALLAX_DEPTH_BOUNDS,
        );
        config.parallax_leave = leave_policy(
            overrides
                .parallax_reset_on_leave
                .unwrap_or(DEFAULT_PARALLAX_RESET_ON_LEAVE),
        );
        config.skills_threshold = within_bounds(
            overrides.skills_threshold,
            DEFAULT_SKILLS_THRESHOLD,
            SKILLS_THRESHOLD_BOUNDS,
        );

        config
    }

    /// Honors `prefers-reduced-motion`: native scrolling, no tweening.
    pub fn with_reduced_motion(mut self, reduced: bool) -> Self {
        self.reduced_motion = reduced;
        if reduced {
            self.scroll.smooth_wheel = false;
            self.scroll.smooth_touch = false;
        }
        self
    }
}

fn within_bounds(value: Option<f64>, default: f64, bounds: (f64, f64)) -> f64 {
    value
        .filter(|value| value.is_finite())
        .filter(|value| (bounds.0..=bounds.1).contains(value))
        .unwrap_or(default)
}

fn leave_policy(reset: bool) -> LeavePolicy {
    if reset {
        LeavePolicy::Reset
    } else {
        LeavePolicy::Persist
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn empty_source_yields_defaults() {
        let config = MotionConfig::from_source(&HashMap::<String, String>::new());

        assert_eq!(config, MotionConfig::default());
        assert_eq!(config.scroll.lerp, 0.08);
        assert_eq!(config.scroll.duration, 1.2);
        assert!(config.scroll.smooth_wheel);
        assert!(!config.scroll.smooth_touch);
        assert_eq!(config.magnetic_strength, 40.0);
        assert_eq!(config.parallax_leave, LeavePolicy::Reset);
    }

    #[test]
    fn valid_overrides_apply_and_out_of_bounds_fall_back() {
        let config = MotionConfig::from_source(&source(&[
            (
                MOTION_OVERRIDES_KEY,
                r#"{"lerp": 0.2, "duration": 60, "magneticStrength": 80, "parallaxResetOnLeave": false}"#,
            ),
            (LOG_LEVEL_KEY, "debug"),
        ]));

        assert_eq!(config.scroll.lerp, 0.2);
        assert_eq!(config.scroll.duration, 1.2);
        assert_eq!(config.magnetic_strength, 80.0);
        assert_eq!(config.parallax_leave, LeavePolicy::Persist);
        assert_eq!(config.log_level, LogLevel::Debug);
    }

    #[test]
    fn malformed_json_is_ignored() {
        let config = MotionConfig::from_source(&source(&[(MOTION_OVERRIDES_KEY, "{lerp:")]));
        assert_eq!(config, MotionConfig::default());
    }

    #[test]
    fn reduced_motion_disables_smoothing() {
        let config = MotionConfig::default().with_reduced_motion(true);

        assert!(config.reduced_motion);
        assert!(!config.scroll.smooth_wheel);
        assert!(!config.scroll.smooth_touch);
    }
}
