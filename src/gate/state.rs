//! Gate phases, outcomes and events

use serde::{Deserialize, Serialize};

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ValidationState {
    /// Countdown reached zero
    TimesUp,
    /// Too many wrong answers for this question
    TooManyIncorrect,
    /// Too many wrong answers across sessions; user is locked out
    TooManyAttempts,
    /// Correct answer
    Validated,
}

impl ValidationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationState::TimesUp => "TimesUp",
            ValidationState::TooManyIncorrect => "TooManyIncorrect",
            ValidationState::TooManyAttempts => "TooManyAttempts",
            ValidationState::Validated => "Validated",
        }
    }

    /// Whether the user got through the gate
    pub fn is_success(&self) -> bool {
        matches!(self, ValidationState::Validated)
    }
}

/// Current phase of the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GatePhase {
    /// No session running
    Idle,
    /// Countdown running, waiting for the user to pick an answer
    AwaitingAnswer,
    /// Session ended; must return to `Idle` before the next one
    Concluded(ValidationState),
}

/// Events emitted to the presentation layer, in order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GateEvent {
    /// Once per countdown second while active
    TimeRemaining { seconds_left: u32 },
    /// Once per terminal transition
    StateChanged { state: ValidationState },
}
