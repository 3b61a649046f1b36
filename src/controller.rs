//! Gate controller
//!
//! Glue between user input, the motion simulator and the state machine.
//! The host forwards show/dismiss, per-frame updates and drag gestures;
//! it renders `targets()` and the events returned by `update`.

use glam::Vec2;

use crate::error::GateError;
use crate::gate::{ChallengeStateMachine, GateEvent};
use crate::questions::QuestionBank;
use crate::settings::{DropZone, GateSettings};
use crate::sim::{MotionSimulator, Target};

#[derive(Debug)]
pub struct GateController {
    gate: ChallengeStateMachine,
    sim: MotionSimulator,
    drop_zone: DropZone,
    alert_dismiss_seconds: f32,
    /// Seconds until an outcome alert closes the gate
    alert_timer: Option<f32>,
    presented: bool,
}

impl GateController {
    pub fn new(gate: ChallengeStateMachine, sim: MotionSimulator) -> Self {
        let settings = gate.settings();
        let drop_zone = settings.drop_zone;
        let alert_dismiss_seconds = settings.alert_dismiss_seconds as f32;
        Self {
            gate,
            sim,
            drop_zone,
            alert_dismiss_seconds,
            alert_timer: None,
            presented: false,
        }
    }

    /// Controller on wall-clock time with default collaborators
    pub fn from_settings(bank: QuestionBank, settings: GateSettings) -> Self {
        let sim = MotionSimulator::new(&settings);
        Self::new(ChallengeStateMachine::new(bank, settings), sim)
    }

    pub fn gate(&self) -> &ChallengeStateMachine {
        &self.gate
    }

    pub fn simulator(&self) -> &MotionSimulator {
        &self.sim
    }

    pub fn targets(&self) -> &[Target] {
        self.sim.targets()
    }

    pub fn drop_zone(&self) -> DropZone {
        self.drop_zone
    }

    pub fn is_presented(&self) -> bool {
        self.presented
    }

    /// Pick a question, spawn its targets and start the countdown.
    /// Fails with `LockedOut` while the user is locked out.
    pub fn show(&mut self) -> Result<(), GateError> {
        if self.presented {
            log::debug!("Gate already presented");
            return Ok(());
        }
        self.gate.select_question()?;
        let answers = self.gate.answers_for_current_question()?;
        self.sim.seed(&answers);
        self.gate.begin_user_attempt()?;
        self.alert_timer = None;
        self.presented = true;
        Ok(())
    }

    /// Close the gate and drop all targets
    pub fn dismiss(&mut self) {
        self.gate.end_user_attempt();
        self.sim.clear();
        self.alert_timer = None;
        if self.presented {
            log::debug!("Gate dismissed");
        }
        self.presented = false;
    }

    /// Per-frame update with the real elapsed interval
    pub fn update(&mut self, dt: f32) -> Vec<GateEvent> {
        if !self.presented {
            return Vec::new();
        }

        self.sim.step(dt);
        self.gate.advance(dt);
        let events = self.gate.drain_events();

        if events
            .iter()
            .any(|e| matches!(e, GateEvent::StateChanged { .. }))
        {
            self.alert_timer = Some(self.alert_dismiss_seconds);
        } else if let Some(timer) = self.alert_timer.as_mut() {
            *timer -= dt.max(0.0);
            if *timer <= 0.0 {
                self.dismiss();
            }
        }
        events
    }

    /// Touch down. Returns the grabbed target, if any.
    pub fn drag_began(&mut self, point: Vec2) -> Option<u32> {
        if !self.gate.is_active() {
            return None;
        }
        let id = self.sim.target_at(point)?;
        self.sim.begin_hold(id).ok()?;
        Some(id)
    }

    pub fn drag_moved(&mut self, id: u32, delta: Vec2) -> Result<(), GateError> {
        self.sim.drag_by(id, delta)
    }

    /// Touch up. Evaluates the target's answer only when released inside the
    /// drop zone; returns `None` otherwise.
    pub fn drag_ended(
        &mut self,
        id: u32,
        release: Vec2,
        fling: Vec2,
    ) -> Result<Option<bool>, GateError> {
        let value = self.sim.end_hold(id, release, fling)?;
        if !self.drop_zone.contains(release) || !self.gate.is_active() {
            return Ok(None);
        }
        self.gate.evaluate(value).map(Some)
    }
}
