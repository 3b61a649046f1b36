//! Challenge state machine
//!
//! `Idle -> AwaitingAnswer -> {Validated, TimesUp, TooManyIncorrect, TooManyAttempts} -> Idle`
//!
//! No rendering here. Callers drive the countdown (`tick`/`advance`) and
//! drain `GateEvent`s for presentation.

pub mod answers;
pub mod countdown;
pub mod machine;
pub mod state;

pub use answers::{decoy_window, generate_answer_set};
pub use countdown::Countdown;
pub use machine::ChallengeStateMachine;
pub use state::{GateEvent, GatePhase, ValidationState};
