//! Variable timestep motion
//!
//! Targets advance by the real elapsed interval supplied by the host each
//! frame, so motion stays correct when the frame rate varies.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::{Arena, reflect_off_walls};
use super::target::{Target, random_velocity};
use crate::error::GateError;
use crate::settings::GateSettings;

/// Advance every free target by `dt` seconds and bounce it off the walls.
/// Held targets are left where the user put them.
pub fn step(targets: &mut [Target], dt: f32, arena: &Arena) {
    let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };

    for target in targets.iter_mut().filter(|t| !t.is_held()) {
        target.pos += target.vel * dt;
        let hit = reflect_off_walls(&mut target.pos, &mut target.vel, target.radius, arena);
        if hit.any() {
            log::trace!("Target {} bounced ({:?}) at {}", target.id, hit, target.pos);
        }
    }
}

/// Owns the targets for one gate session
#[derive(Debug, Clone)]
pub struct MotionSimulator {
    arena: Arena,
    radius: f32,
    min_speed: f32,
    max_speed: f32,
    targets: Vec<Target>,
    rng: Pcg32,
    next_id: u32,
}

impl MotionSimulator {
    pub fn new(settings: &GateSettings) -> Self {
        Self {
            arena: Arena::new(settings.arena_width, settings.arena_height),
            radius: settings.target_radius(),
            min_speed: settings.min_speed,
            max_speed: settings.max_speed,
            targets: Vec::new(),
            rng: Pcg32::seed_from_u64(rand::rng().random()),
            next_id: 1,
        }
    }

    /// Seed spawn positions and velocities
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg32::seed_from_u64(seed);
        self
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn target(&self, id: u32) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    fn target_mut(&mut self, id: u32) -> Result<&mut Target, GateError> {
        self.targets
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(GateError::UnknownTarget(id))
    }

    /// Replace all targets with one per answer, in answer order
    pub fn seed(&mut self, answers: &[i64]) {
        self.targets.clear();
        for &answer_value in answers {
            let id = self.next_id;
            self.next_id += 1;
            let pos = self.arena.random_position(&mut self.rng, self.radius);
            let vel = random_velocity(&mut self.rng, self.min_speed, self.max_speed);
            self.targets
                .push(Target::new(id, answer_value, pos, vel, self.radius));
        }
        log::debug!("Spawned {} targets", self.targets.len());
    }

    /// Remove every target (session over)
    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Advance by the real frame interval
    pub fn step(&mut self, dt: f32) {
        step(&mut self.targets, dt, &self.arena);
    }

    /// Topmost target under `point` (later targets draw on top)
    pub fn target_at(&self, point: Vec2) -> Option<u32> {
        self.targets
            .iter()
            .rev()
            .find(|t| t.contains_point(point))
            .map(|t| t.id)
    }

    /// User grabbed a target; it stops moving on its own
    pub fn begin_hold(&mut self, id: u32) -> Result<(), GateError> {
        self.target_mut(id)?.hold();
        Ok(())
    }

    /// Move a held target by the user's drag delta
    pub fn drag_by(&mut self, id: u32, delta: Vec2) -> Result<(), GateError> {
        let target = self.target_mut(id)?;
        if target.is_held() {
            target.pos += delta;
        } else {
            log::warn!("Ignoring drag on target {id}: not held");
        }
        Ok(())
    }

    /// User let go at `release`. The fling estimate is ignored: the target
    /// resumes its original velocity. Returns the target's answer value.
    pub fn end_hold(&mut self, id: u32, release: Vec2, fling: Vec2) -> Result<i64, GateError> {
        let target = self.target_mut(id)?;
        target.release(release);
        log::trace!("Target {id} released at {release} (fling {fling} ignored)");
        Ok(target.answer_value)
    }
}
