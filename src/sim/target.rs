//! Answer targets
//!
//! Each target carries one answer value and moves at constant speed until
//! it hits a wall or the user grabs it.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Target state - moving freely or held by the user
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TargetState {
    Free,
    /// Position is driven by the user's drag; velocity is parked here
    Held { resume_velocity: Vec2 },
}

/// A bouncing answer target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    pub answer_value: i64,
    /// Center, in arena coordinates (origin top-left)
    pub pos: Vec2,
    /// Points per second
    pub vel: Vec2,
    pub radius: f32,
    pub state: TargetState,
}

impl Target {
    pub fn new(id: u32, answer_value: i64, pos: Vec2, vel: Vec2, radius: f32) -> Self {
        Self {
            id,
            answer_value,
            pos,
            vel,
            radius,
            state: TargetState::Free,
        }
    }

    pub fn is_held(&self) -> bool {
        matches!(self.state, TargetState::Held { .. })
    }

    /// Current speed (zero while held)
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }

    /// Whether `point` falls on the target
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.pos.distance_squared(point) <= self.radius * self.radius
    }

    /// Stop moving on its own. No-op if already held.
    pub fn hold(&mut self) {
        if let TargetState::Free = self.state {
            self.state = TargetState::Held {
                resume_velocity: self.vel,
            };
            self.vel = Vec2::ZERO;
        }
    }

    /// Drop at `pos` and resume the pre-hold velocity
    pub fn release(&mut self, pos: Vec2) {
        if let TargetState::Held { resume_velocity } = self.state {
            self.vel = resume_velocity;
        }
        self.state = TargetState::Free;
        self.pos = pos;
    }
}

/// Random direction, speed uniform in `[min_speed, max_speed]`
pub fn random_velocity<R: Rng + ?Sized>(rng: &mut R, min_speed: f32, max_speed: f32) -> Vec2 {
    let angle = rng.random_range(0.0..std::f32::consts::TAU);
    let speed = if max_speed > min_speed {
        rng.random_range(min_speed..=max_speed)
    } else {
        min_speed
    };
    Vec2::from_angle(angle) * speed
}
