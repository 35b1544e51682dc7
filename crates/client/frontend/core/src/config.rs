//! Frontend configuration structures and loaders.
//!
//! This module contains presentation settings shared by every scene variant:
//! how far a card must travel before it counts as a drag, and how long each
//! beat of a fate reveal lasts.

use std::env;
use std::time::Duration;

/// Frontend-specific configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct FrontendConfig {
    /// Pointer travel, in points, at which a press becomes a drag.
    pub drag_threshold: f32,
    pub reveal: RevealTimings,
}

impl FrontendConfig {
    pub const DEFAULT_DRAG_THRESHOLD: f32 = 12.0;

    pub const fn new(drag_threshold: f32, reveal: RevealTimings) -> Self {
        Self {
            drag_threshold,
            reveal,
        }
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `ENCOUNTER_DRAG_THRESHOLD` - Drag threshold in points (default: 12.0)
    /// - `ENCOUNTER_REVEAL_ANTICIPATION_MS` - Anticipation beat (default: 450)
    /// - `ENCOUNTER_REVEAL_FLIP_MS` - Card flip (default: 300)
    /// - `ENCOUNTER_INSTANT_REVEALS` - Collapse every beat to zero (default: false)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(threshold) = read_env::<f32>("ENCOUNTER_DRAG_THRESHOLD")
            && threshold.is_finite()
        {
            config.drag_threshold = threshold.max(0.0);
        }

        if let Some(ms) = read_env::<u64>("ENCOUNTER_REVEAL_ANTICIPATION_MS") {
            config.reveal.anticipation = Duration::from_millis(ms);
        }
        if let Some(ms) = read_env::<u64>("ENCOUNTER_REVEAL_FLIP_MS") {
            config.reveal.flip = Duration::from_millis(ms);
        }
        if read_env_bool("ENCOUNTER_INSTANT_REVEALS") == Some(true) {
            config.reveal = RevealTimings::instant();
        }

        config
    }
}

impl Default for FrontendConfig {
    fn default() -> Self {
        Self {
            drag_threshold: Self::DEFAULT_DRAG_THRESHOLD,
            reveal: RevealTimings::default(),
        }
    }
}

/// Duration of each beat of a fate reveal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RevealTimings {
    pub anticipation: Duration,
    pub flip: Duration,
    pub suit_match: Duration,
    pub keyword: Duration,
    /// Critical cards hold the anticipation beat this many times longer.
    pub critical_anticipation_factor: u32,
}

impl RevealTimings {
    /// Every beat is skipped through on the next tick.
    pub const fn instant() -> Self {
        Self {
            anticipation: Duration::ZERO,
            flip: Duration::ZERO,
            suit_match: Duration::ZERO,
            keyword: Duration::ZERO,
            critical_anticipation_factor: 1,
        }
    }

    pub fn anticipation_for(&self, critical: bool) -> Duration {
        if critical {
            self.anticipation
                .saturating_mul(self.critical_anticipation_factor.max(1))
        } else {
            self.anticipation
        }
    }
}

impl Default for RevealTimings {
    fn default() -> Self {
        Self {
            anticipation: Duration::from_millis(450),
            flip: Duration::from_millis(300),
            suit_match: Duration::from_millis(350),
            keyword: Duration::from_millis(400),
            critical_anticipation_factor: 2,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

fn read_env_bool(key: &str) -> Option<bool> {
    match env::var(key).ok()?.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
