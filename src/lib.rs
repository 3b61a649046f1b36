//! Parental Gate - a kinetic age-gating challenge
//!
//! Core modules:
//! - `gate`: Challenge state machine (question, countdown, attempt policy, lockout)
//! - `sim`: Motion simulation for the bouncing answer targets
//! - `controller`: Thin orchestrator wiring input to `gate` and `sim`
//! - `questions`: Question bank loaded from external config
//! - `persistence`: Process-wide lockout storage
//! - `platform`: Clock abstraction (wall time vs simulated time)
//! - `settings`: Overridable gate tuning

pub mod controller;
pub mod error;
pub mod gate;
pub mod persistence;
pub mod platform;
pub mod questions;
pub mod settings;
pub mod sim;

pub use controller::GateController;
pub use error::{ConfigError, GateError, StoreError};
pub use gate::{ChallengeStateMachine, GateEvent, GatePhase, ValidationState};
pub use questions::{Question, QuestionBank};
pub use settings::{DropZone, GateSettings};
pub use sim::{Arena, MotionSimulator, Target};

/// Gate configuration defaults
pub mod consts {
    /// How many answer targets are on screen at once
    pub const MAX_TARGETS: usize = 8;
    /// Target diameter in points (44 is the smallest comfortable touch size)
    pub const TARGET_DIAMETER: f32 = 44.0;

    /// Target speed range in points per second
    pub const MIN_SPEED: f32 = 75.0;
    pub const MAX_SPEED: f32 = 125.0;

    /// Seconds allowed to answer before the gate closes
    pub const ATTEMPT_SECONDS: u32 = 15;
    /// Incorrect answers per session before the gate closes
    pub const ATTEMPTS_BEFORE_CLOSE: u32 = 3;
    /// Failed answers across sessions before the user is locked out
    pub const ATTEMPTS_BEFORE_WAIT: u32 = 5;
    /// Lockout length in minutes
    pub const LOCKOUT_MINUTES: u32 = 5;
    /// Seconds an outcome alert stays up before auto-dismissing
    pub const ALERT_DISMISS_SECONDS: u32 = 5;

    /// Decoys are drawn from `correct ± DECOY_SPREAD`
    pub const DECOY_SPREAD: i64 = 10;
    /// Lowest decoy value (answers are non-negative by default)
    pub const DECOY_FLOOR: i64 = 0;

    /// Gate dimensions (portrait)
    pub const ARENA_WIDTH: f32 = 300.0;
    pub const ARENA_HEIGHT: f32 = 420.0;
    /// Side of the square the user drags an answer into
    pub const DROP_ZONE_SIZE: f32 = 80.0;
}
