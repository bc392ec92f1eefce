use core::fmt;
use std::{fs, path::Path};

use serde::Deserialize;

use crate::gesture::Direction;

/// 96 dpi, used until the host reports the real display density.
pub const DEFAULT_PIXELS_PER_MM: f32 = 96.0 / 25.4;
pub const DISTANCE_THRESHOLD_MM: f32 = 4.0;
pub const MAX_DISTANCE_MM: f32 = 10.0;
pub const DEFAULT_COMPOSITION_TIME_MS: u64 = 60;
pub const DEFAULT_MAX_TIME_MS: u64 = 400;
/// `max_time_ms` installed by [`SwipeConfig::remove_time_constraints`].
pub const UNCONSTRAINED_MAX_TIME_MS: u64 = 60 * 60 * 1_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Validation(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(msg) => write!(f, "io error: {msg}"),
            ConfigError::Parse(msg) => write!(f, "parse error: {msg}"),
            ConfigError::Validation(msg) => write!(f, "validation error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Threshold ordering broken while disambiguation is enabled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigViolation {
    DistanceThresholdNotBelowMaxDistance,
    CompositionTimeNotBelowMaxTime,
}

impl fmt::Display for ConfigViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigViolation::DistanceThresholdNotBelowMaxDistance => {
                f.write_str("swipe.distance_threshold must be < swipe.max_distance")
            }
            ConfigViolation::CompositionTimeNotBelowMaxTime => {
                f.write_str("swipe.composition_time_ms must be < swipe.max_time_ms")
            }
        }
    }
}

/// Recognition thresholds of one swipe area.
///
/// Distances are in pixels. Unless overridden they follow the display
/// density: the threshold is 4 mm and the maximum distance 10 mm.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SwipeConfig {
    pub direction: Direction,
    pub pixels_per_mm: f32,
    distance_threshold: Option<f32>,
    max_distance: Option<f32>,
    pub composition_time_ms: u64,
    pub max_time_ms: u64,
    pub immediate_recognition: bool,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            direction: Direction::default(),
            pixels_per_mm: DEFAULT_PIXELS_PER_MM,
            distance_threshold: None,
            max_distance: None,
            composition_time_ms: DEFAULT_COMPOSITION_TIME_MS,
            max_time_ms: DEFAULT_MAX_TIME_MS,
            immediate_recognition: false,
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    swipe: SwipeConfig,
}

impl SwipeConfig {
    pub fn new(direction: Direction) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    pub fn with_thresholds(mut self, distance_threshold: f32, max_distance: f32) -> Self {
        self.distance_threshold = Some(distance_threshold);
        self.max_distance = Some(max_distance);
        self
    }

    pub fn with_times(mut self, composition_time_ms: u64, max_time_ms: u64) -> Self {
        self.composition_time_ms = composition_time_ms;
        self.max_time_ms = max_time_ms;
        self
    }

    pub fn with_immediate_recognition(mut self, immediate: bool) -> Self {
        self.immediate_recognition = immediate;
        self
    }

    pub fn distance_threshold(&self) -> f32 {
        self.distance_threshold
            .unwrap_or(DISTANCE_THRESHOLD_MM * self.pixels_per_mm)
    }

    pub fn set_distance_threshold(&mut self, pixels: f32) {
        self.distance_threshold = Some(pixels);
    }

    pub fn max_distance(&self) -> f32 {
        self.max_distance
            .unwrap_or(MAX_DISTANCE_MM * self.pixels_per_mm)
    }

    pub fn set_max_distance(&mut self, pixels: f32) {
        self.max_distance = Some(pixels);
    }

    /// Drops explicit distance overrides so both follow `pixels_per_mm` again.
    pub fn reset_distances(&mut self) {
        self.distance_threshold = None;
        self.max_distance = None;
    }

    /// Makes the area grab on press: no time limit and no composition window.
    pub fn remove_time_constraints(&mut self) {
        self.max_time_ms = UNCONSTRAINED_MAX_TIME_MS;
        self.composition_time_ms = 0;
    }

    /// With recognition disabled the area claims any single touch on press.
    pub fn recognition_disabled(&self) -> bool {
        self.immediate_recognition
            || (self.distance_threshold() <= 0.0 && self.composition_time_ms == 0)
    }

    pub fn check_recognition_invariants(&self) -> Result<(), ConfigViolation> {
        if self.recognition_disabled() {
            return Ok(());
        }
        // Written as a negated `<` so NaN thresholds are refused too.
        if !(self.distance_threshold() < self.max_distance()) {
            return Err(ConfigViolation::DistanceThresholdNotBelowMaxDistance);
        }
        if self.composition_time_ms >= self.max_time_ms {
            return Err(ConfigViolation::CompositionTimeNotBelowMaxTime);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.pixels_per_mm.is_finite() && self.pixels_per_mm > 0.0) {
            return Err(ConfigError::Validation(
                "swipe.pixels_per_mm must be a positive number".into(),
            ));
        }
        for (name, value) in [
            ("swipe.distance_threshold", self.distance_threshold()),
            ("swipe.max_distance", self.max_distance()),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Validation(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.max_time_ms == 0 {
            return Err(ConfigError::Validation(
                "swipe.max_time_ms must be > 0".into(),
            ));
        }
        self.check_recognition_invariants()
            .map_err(|violation| ConfigError::Validation(violation.to_string()))
    }

    /// Parses and validates a document holding a `[swipe]` table.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        file.swipe.validate()?;
        Ok(file.swipe)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("failed to read {}: {e}", path.display())))?;
        Self::from_toml_str(&source)
    }
}
