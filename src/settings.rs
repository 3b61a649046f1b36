//! Gate settings
//!
//! Every constant in `consts` can be overridden from a JSON file. Missing
//! fields fall back to their defaults, so a file only needs the values it
//! changes.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Square region the user drags an answer into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DropZone {
    /// Top-left corner
    pub x: f32,
    pub y: f32,
    /// Side length
    pub size: f32,
}

impl DropZone {
    /// Whether a point lies inside the zone (edges inclusive)
    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.size
            && point.y >= self.y
            && point.y <= self.y + self.size
    }
}

impl Default for DropZone {
    fn default() -> Self {
        // Centered horizontally, resting on the bottom of the arena
        Self {
            x: (ARENA_WIDTH - DROP_ZONE_SIZE) / 2.0,
            y: ARENA_HEIGHT - DROP_ZONE_SIZE - 10.0,
            size: DROP_ZONE_SIZE,
        }
    }
}

/// Gate tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    // === Targets ===
    /// Number of answers (targets) shown per question
    pub max_targets: usize,
    /// Target diameter in points
    pub target_diameter: f32,
    /// Speed range in points per second
    pub min_speed: f32,
    pub max_speed: f32,

    // === Attempt policy ===
    /// Countdown length per session
    pub attempt_seconds: u32,
    /// Incorrect answers in one session before it closes
    pub attempts_before_close: u32,
    /// Failed answers across sessions before lockout
    pub attempts_before_wait: u32,
    /// Lockout length
    pub lockout_minutes: u32,
    /// Outcome alert auto-dismiss delay
    pub alert_dismiss_seconds: u32,

    // === Decoys ===
    /// Decoys are drawn from `correct ± decoy_spread`
    pub decoy_spread: i64,
    /// Lowest decoy allowed (`None` permits any value)
    pub decoy_floor: Option<i64>,

    // === Layout ===
    pub arena_width: f32,
    pub arena_height: f32,
    pub drop_zone: DropZone,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            max_targets: MAX_TARGETS,
            target_diameter: TARGET_DIAMETER,
            min_speed: MIN_SPEED,
            max_speed: MAX_SPEED,

            attempt_seconds: ATTEMPT_SECONDS,
            attempts_before_close: ATTEMPTS_BEFORE_CLOSE,
            attempts_before_wait: ATTEMPTS_BEFORE_WAIT,
            lockout_minutes: LOCKOUT_MINUTES,
            alert_dismiss_seconds: ALERT_DISMISS_SECONDS,

            decoy_spread: DECOY_SPREAD,
            decoy_floor: Some(DECOY_FLOOR),

            arena_width: ARENA_WIDTH,
            arena_height: ARENA_HEIGHT,
            drop_zone: DropZone::default(),
        }
    }
}

impl GateSettings {
    /// Parse settings from JSON and validate them
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = Self::from_json_str(&json)?;
        log::info!("Loaded gate settings from {}", path.display());
        Ok(settings)
    }

    /// Reject settings the gate cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.max_targets == 0 {
            return invalid("max_targets must be at least 1");
        }
        if !(self.target_diameter > 0.0) {
            return invalid("target_diameter must be positive");
        }
        if !(self.min_speed >= 0.0) || !(self.min_speed <= self.max_speed) {
            return invalid("speed range must satisfy 0 <= min_speed <= max_speed");
        }
        if self.attempt_seconds == 0 {
            return invalid("attempt_seconds must be at least 1");
        }
        if self.attempts_before_close == 0 || self.attempts_before_wait == 0 {
            return invalid("attempt limits must be at least 1");
        }
        if self.decoy_spread < 0 {
            return invalid("decoy_spread must not be negative");
        }
        if self.arena_width < self.target_diameter || self.arena_height < self.target_diameter {
            return invalid("arena must be at least one target wide and tall");
        }
        Ok(())
    }

    /// Target radius
    #[inline]
    pub fn target_radius(&self) -> f32 {
        self.target_diameter / 2.0
    }

    /// Lockout length as a chrono delta
    pub fn lockout_duration(&self) -> chrono::TimeDelta {
        chrono::TimeDelta::seconds(i64::from(self.lockout_minutes) * 60)
    }
}
