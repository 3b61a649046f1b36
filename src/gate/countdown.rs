//! One-second countdown driven by the host loop
//!
//! The host either calls `tick` from a 1 Hz timer, or feeds real frame
//! intervals to `advance`, which carries the fractional remainder between
//! calls so variable frame rates still produce one tick per second.

/// Countdown state
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    remaining: u32,
    accumulator: f32,
    running: bool,
}

impl Countdown {
    /// Start (or restart) from `seconds`
    pub fn start(&mut self, seconds: u32) {
        self.remaining = seconds;
        self.accumulator = 0.0;
        self.running = true;
    }

    /// Cancel; safe to call when not running
    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Consume one second. Returns the new remaining value, or `None` when
    /// not running. Stops itself on reaching zero.
    pub fn tick(&mut self) -> Option<u32> {
        if !self.running {
            return None;
        }
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
        }
        Some(self.remaining)
    }

    /// Accumulate elapsed time; returns how many whole seconds are due
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.running || !dt.is_finite() || dt <= 0.0 {
            return 0;
        }
        self.accumulator += dt;
        let due = self.accumulator.floor();
        self.accumulator -= due;
        due as u32
    }
}
