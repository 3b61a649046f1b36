//! Challenge state machine
//!
//! Owns one gate session at a time: question selection, answer generation,
//! the countdown, per-session and cross-session failure counting, and the
//! lockout. Outcomes are queued as `GateEvent`s for the presentation layer.

use std::time::Duration;

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::answers::{decoy_window, generate_answer_set};
use super::countdown::Countdown;
use super::state::{GateEvent, GatePhase, ValidationState};
use crate::error::GateError;
use crate::persistence::{LockoutRecord, LockoutStore, MemoryLockoutStore};
use crate::platform::{Clock, SystemClock};
use crate::questions::{Question, QuestionBank};
use crate::settings::GateSettings;

pub struct ChallengeStateMachine {
    settings: GateSettings,
    bank: QuestionBank,
    clock: Box<dyn Clock>,
    store: Box<dyn LockoutStore>,
    rng: Pcg32,
    /// Index into `bank`
    current: Option<usize>,
    phase: GatePhase,
    countdown: Countdown,
    incorrect_attempts: u32,
    /// Persisted cross-session state
    record: LockoutRecord,
    events: Vec<GateEvent>,
}

impl std::fmt::Debug for ChallengeStateMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeStateMachine")
            .field("phase", &self.phase)
            .field("current", &self.current_question())
            .field("remaining_seconds", &self.countdown.remaining())
            .field("incorrect_attempts", &self.incorrect_attempts)
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

impl ChallengeStateMachine {
    /// Create a gate on wall-clock time with an in-memory lockout store
    pub fn new(bank: QuestionBank, settings: GateSettings) -> Self {
        Self {
            settings,
            bank,
            clock: Box::new(SystemClock),
            store: Box::new(MemoryLockoutStore::new()),
            rng: Pcg32::seed_from_u64(rand::rng().random()),
            current: None,
            phase: GatePhase::Idle,
            countdown: Countdown::default(),
            incorrect_attempts: 0,
            record: LockoutRecord::default(),
            events: Vec::new(),
        }
    }

    /// Use a different time source
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Use a persisted store; its record replaces the current one
    pub fn with_store(mut self, store: impl LockoutStore + 'static) -> Self {
        self.record = match store.load() {
            Ok(record) => record,
            Err(e) => {
                log::warn!("Failed to load lockout record ({e}), starting fresh");
                LockoutRecord::default()
            }
        };
        self.store = Box::new(store);
        self
    }

    /// Seed question selection and answer generation
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = Pcg32::seed_from_u64(seed);
        self
    }

    // === Queries ===

    pub fn settings(&self) -> &GateSettings {
        &self.settings
    }

    pub fn phase(&self) -> GatePhase {
        self.phase
    }

    /// A session is running and accepting answers
    pub fn is_active(&self) -> bool {
        self.phase == GatePhase::AwaitingAnswer
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.current.and_then(|i| self.bank.get(i))
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.countdown.remaining()
    }

    pub fn incorrect_attempts(&self) -> u32 {
        self.incorrect_attempts
    }

    pub fn total_attempts(&self) -> u32 {
        self.record.total_attempts
    }

    pub fn lockout_until(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.record.lockout_until
    }

    /// True while a lockout is set and has not yet elapsed
    pub fn is_user_locked_out(&self) -> bool {
        self.lockout_remaining().is_some()
    }

    /// Time left on the lockout, if any
    pub fn lockout_remaining(&self) -> Option<Duration> {
        let until = self.record.lockout_until?;
        let now = self.clock.now();
        if now < until {
            Some((until - now).to_std().unwrap_or_default())
        } else {
            None
        }
    }

    /// Take all queued events, oldest first
    pub fn drain_events(&mut self) -> Vec<GateEvent> {
        std::mem::take(&mut self.events)
    }

    // === Session ===

    /// Pick a random question and make it current. Does not start the countdown.
    ///
    /// While a session is running the current question is kept and returned.
    pub fn select_question(&mut self) -> Result<&Question, GateError> {
        if self.is_active() {
            log::debug!("select_question ignored: session already active");
            return self.current_question().ok_or(GateError::NoQuestion);
        }
        self.check_lockout()?;

        let index = self.rng.random_range(0..self.bank.len());
        self.current = Some(index);
        let question = self.bank.get(index).ok_or(GateError::NoQuestion)?;
        log::debug!("Selected question {index}: {:?}", question.prompt);
        Ok(question)
    }

    /// The correct answer plus distinct decoys, shuffled. A new set on every call.
    pub fn answers_for_current_question(&mut self) -> Result<Vec<i64>, GateError> {
        let correct = self
            .current_question()
            .map(|q| q.correct_answer)
            .ok_or(GateError::NoQuestion)?;
        let window = decoy_window(correct, self.settings.decoy_spread, self.settings.decoy_floor);
        generate_answer_set(correct, self.settings.max_targets, window, &mut self.rng)
    }

    /// Start the countdown and reset the per-session incorrect counter.
    ///
    /// A call while a session is already running is ignored, so there is never
    /// more than one countdown.
    pub fn begin_user_attempt(&mut self) -> Result<(), GateError> {
        self.check_lockout()?;

        match self.phase {
            GatePhase::AwaitingAnswer => {
                log::debug!("begin_user_attempt ignored: session already active");
                return Ok(());
            }
            GatePhase::Concluded(state) => {
                log::debug!("Returning to idle after {}", state.as_str());
                self.phase = GatePhase::Idle;
            }
            GatePhase::Idle => {}
        }

        self.incorrect_attempts = 0;
        self.countdown.start(self.settings.attempt_seconds);
        self.phase = GatePhase::AwaitingAnswer;
        log::info!(
            "Gate session started ({}s, {} prior failures)",
            self.settings.attempt_seconds,
            self.record.total_attempts
        );
        Ok(())
    }

    /// Abandon the session without an outcome. Idempotent.
    pub fn end_user_attempt(&mut self) {
        self.countdown.stop();
        if self.phase != GatePhase::Idle {
            log::debug!("Gate session ended from {:?}", self.phase);
            self.phase = GatePhase::Idle;
        }
    }

    /// One countdown second
    pub fn tick(&mut self) {
        if !self.is_active() {
            return;
        }
        if let Some(seconds_left) = self.countdown.tick() {
            self.events.push(GateEvent::TimeRemaining { seconds_left });
            if seconds_left == 0 {
                self.conclude(ValidationState::TimesUp);
            }
        }
    }

    /// Feed elapsed wall time; runs every countdown second that fell due
    pub fn advance(&mut self, dt: f32) {
        let due = self.countdown.advance(dt);
        for _ in 0..due {
            if !self.is_active() {
                break;
            }
            self.tick();
        }
    }

    /// Check the user's pick against the current question
    pub fn evaluate(&mut self, candidate: i64) -> Result<bool, GateError> {
        if !self.is_active() {
            return Err(GateError::NoQuestion);
        }
        let correct = self
            .current_question()
            .map(|q| q.correct_answer)
            .ok_or(GateError::NoQuestion)?;

        if candidate == correct {
            self.incorrect_attempts = 0;
            self.record.total_attempts = 0;
            self.persist();
            self.conclude(ValidationState::Validated);
            return Ok(true);
        }

        self.record.total_attempts = self.record.total_attempts.saturating_add(1);
        log::debug!(
            "Incorrect answer {candidate} (total failures {})",
            self.record.total_attempts
        );

        if self.record.total_attempts >= self.settings.attempts_before_wait {
            let until = self.clock.now() + self.settings.lockout_duration();
            self.record.lockout_until = Some(until);
            self.record.total_attempts = 0;
            self.persist();
            log::info!("Too many failed attempts, locked out until {until}");
            self.conclude(ValidationState::TooManyAttempts);
            return Ok(false);
        }
        self.persist();

        self.incorrect_attempts += 1;
        if self.incorrect_attempts >= self.settings.attempts_before_close {
            self.conclude(ValidationState::TooManyIncorrect);
        }
        Ok(false)
    }

    // === Internals ===

    /// Fail while locked out; clear an expired lockout
    fn check_lockout(&mut self) -> Result<(), GateError> {
        if let Some(remaining) = self.lockout_remaining() {
            return Err(GateError::LockedOut { remaining });
        }
        if self.record.lockout_until.take().is_some() {
            log::info!("Lockout expired");
            self.persist();
        }
        Ok(())
    }

    fn conclude(&mut self, state: ValidationState) {
        self.countdown.stop();
        self.phase = GatePhase::Concluded(state);
        self.events.push(GateEvent::StateChanged { state });
        log::info!("Gate session concluded: {}", state.as_str());
    }

    fn persist(&mut self) {
        if let Err(e) = self.store.save(&self.record) {
            log::warn!("Failed to persist lockout record: {e}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::JsonFileLockoutStore;
    use crate::platform::ManualClock;
    use chrono::TimeDelta;
    use proptest::prelude::*;

    fn two_plus_two() -> QuestionBank {
        QuestionBank::from_questions(vec![Question::new("2+2?", 4)]).unwrap()
    }

    /// Gate whose decoy window for the answer 4 is [1, 10]
    fn gate(seed: u64) -> (ChallengeStateMachine, ManualClock) {
        let clock = ManualClock::default();
        let settings = GateSettings {
            decoy_spread: 6,
            decoy_floor: Some(1),
            ..Default::default()
        };
        let gate = ChallengeStateMachine::new(two_plus_two(), settings)
            .with_clock(clock.clone())
            .with_seed(seed);
        (gate, clock)
    }

    fn started(seed: u64) -> (ChallengeStateMachine, ManualClock) {
        let (mut gate, clock) = gate(seed);
        gate.select_question().unwrap();
        gate.begin_user_attempt().unwrap();
        (gate, clock)
    }

    fn state_changes(events: &[GateEvent]) -> Vec<ValidationState> {
        events
            .iter()
            .filter_map(|e| match e {
                GateEvent::StateChanged { state } => Some(*state),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_answers_for_current_question() {
        let (mut gate, _) = gate(1);
        assert!(matches!(
            gate.answers_for_current_question(),
            Err(GateError::NoQuestion)
        ));

        gate.select_question().unwrap();
        let answers = gate.answers_for_current_question().unwrap();
        assert_eq!(answers.len(), 8);
        assert_eq!(answers.iter().filter(|&&a| a == 4).count(), 1);
        assert!(answers.iter().all(|a| (1..=10).contains(a)));
    }

    #[test]
    fn test_select_does_not_start_countdown() {
        let (mut gate, _) = gate(1);
        assert_eq!(gate.select_question().unwrap().correct_answer, 4);
        assert_eq!(gate.phase(), GatePhase::Idle);
        gate.tick();
        assert!(gate.drain_events().is_empty());
    }

    #[test]
    fn test_correct_answer_validates() {
        let (mut gate, _) = started(2);
        assert!(gate.evaluate(4).unwrap());
        assert_eq!(gate.drain_events(), vec![GateEvent::StateChanged {
            state: ValidationState::Validated
        }]);
        assert_eq!(gate.phase(), GatePhase::Concluded(ValidationState::Validated));
        assert!(!gate.is_active());
    }

    #[test]
    fn test_three_incorrect_closes() {
        let (mut gate, _) = started(3);

        assert!(!gate.evaluate(5).unwrap());
        assert!(!gate.evaluate(5).unwrap());
        assert!(gate.drain_events().is_empty());
        assert_eq!(gate.incorrect_attempts(), 2);

        assert!(!gate.evaluate(5).unwrap());
        assert_eq!(gate.drain_events(), vec![GateEvent::StateChanged {
            state: ValidationState::TooManyIncorrect
        }]);
        assert_eq!(gate.incorrect_attempts(), 3);
        assert_eq!(gate.total_attempts(), 3);

        // Session is over
        assert!(matches!(gate.evaluate(5), Err(GateError::NoQuestion)));
        assert_eq!(gate.incorrect_attempts(), 3);
    }

    #[test]
    fn test_lockout_across_sessions() {
        let (mut gate, clock) = started(4);
        for _ in 0..3 {
            gate.evaluate(7).unwrap();
        }
        gate.end_user_attempt();

        gate.select_question().unwrap();
        gate.begin_user_attempt().unwrap();
        assert_eq!(gate.incorrect_attempts(), 0);
        assert!(!gate.evaluate(7).unwrap());
        assert!(!gate.evaluate(7).unwrap());

        let events = gate.drain_events();
        assert_eq!(state_changes(&events), vec![
            ValidationState::TooManyIncorrect,
            ValidationState::TooManyAttempts
        ]);
        assert_eq!(gate.total_attempts(), 0);
        assert_eq!(gate.lockout_until(), Some(clock.now() + TimeDelta::minutes(5)));
        assert!(gate.is_user_locked_out());

        assert!(matches!(
            gate.select_question(),
            Err(GateError::LockedOut { remaining }) if remaining == Duration::from_secs(300)
        ));
        assert!(matches!(
            gate.begin_user_attempt(),
            Err(GateError::LockedOut { .. })
        ));

        clock.advance(TimeDelta::seconds(299));
        assert!(gate.is_user_locked_out());
        assert_eq!(gate.lockout_remaining(), Some(Duration::from_secs(1)));

        clock.advance(TimeDelta::seconds(1));
        assert!(!gate.is_user_locked_out());
        // Query alone does not clear it
        assert!(gate.lockout_until().is_some());
        gate.select_question().unwrap();
        assert_eq!(gate.lockout_until(), None);
        gate.begin_user_attempt().unwrap();
        assert!(gate.is_active());
    }

    #[test]
    fn test_success_resets_total_attempts() {
        let (mut gate, _) = started(5);
        gate.evaluate(1).unwrap();
        gate.evaluate(2).unwrap();
        assert_eq!(gate.total_attempts(), 2);
        assert!(gate.evaluate(4).unwrap());
        assert_eq!(gate.total_attempts(), 0);
        assert_eq!(gate.incorrect_attempts(), 0);
    }

    #[test]
    fn test_countdown_times_up() {
        let (mut gate, _) = started(6);
        assert_eq!(gate.remaining_seconds(), 15);

        for _ in 0..15 {
            gate.tick();
        }
        let events = gate.drain_events();
        let mut expected: Vec<GateEvent> = (0..15)
            .rev()
            .map(|seconds_left| GateEvent::TimeRemaining { seconds_left })
            .collect();
        expected.push(GateEvent::StateChanged {
            state: ValidationState::TimesUp,
        });
        assert_eq!(events, expected);
        assert!(!gate.is_active());

        gate.tick();
        gate.advance(10.0);
        assert!(gate.drain_events().is_empty());
        assert!(matches!(gate.evaluate(4), Err(GateError::NoQuestion)));
    }

    #[test]
    fn test_advance_at_frame_rate() {
        let (mut gate, _) = started(7);
        // 20 seconds of 60 fps frames
        for _ in 0..1200 {
            gate.advance(1.0 / 60.0);
        }
        let events = gate.drain_events();
        let ticks = events
            .iter()
            .filter(|e| matches!(e, GateEvent::TimeRemaining { .. }))
            .count();
        assert_eq!(ticks, 15);
        assert_eq!(state_changes(&events), vec![ValidationState::TimesUp]);
    }

    #[test]
    fn test_wrong_answer_keeps_timer() {
        let (mut gate, _) = started(8);
        gate.tick();
        gate.evaluate(9).unwrap();
        gate.tick();
        assert_eq!(gate.remaining_seconds(), 13);
        assert!(gate.is_active());
    }

    #[test]
    fn test_second_begin_is_noop() {
        let (mut gate, _) = started(9);
        gate.tick();
        gate.tick();
        gate.evaluate(1).unwrap();
        gate.begin_user_attempt().unwrap();
        assert_eq!(gate.remaining_seconds(), 13);
        assert_eq!(gate.incorrect_attempts(), 1);

        gate.drain_events();
        gate.advance(1.0);
        assert_eq!(gate.drain_events(), vec![GateEvent::TimeRemaining {
            seconds_left: 12
        }]);
    }

    #[test]
    fn test_end_user_attempt_cancels_quietly() {
        let (mut gate, _) = started(10);
        gate.end_user_attempt();
        gate.end_user_attempt();
        assert_eq!(gate.phase(), GatePhase::Idle);

        gate.tick();
        gate.advance(30.0);
        assert!(gate.drain_events().is_empty());
        assert!(matches!(gate.evaluate(4), Err(GateError::NoQuestion)));
    }

    #[test]
    fn test_evaluate_without_session() {
        let (mut gate, _) = gate(11);
        assert!(matches!(gate.evaluate(4), Err(GateError::NoQuestion)));
        gate.select_question().unwrap();
        assert!(matches!(gate.evaluate(4), Err(GateError::NoQuestion)));
    }

    #[test]
    fn test_lockout_survives_restart() {
        let path = std::env::temp_dir()
            .join(format!("parental-gate-machine-{}", std::process::id()))
            .join("lockout.json");
        let _ = std::fs::remove_file(&path);
        let clock = ManualClock::default();

        let mut first = ChallengeStateMachine::new(two_plus_two(), GateSettings::default())
            .with_clock(clock.clone())
            .with_store(JsonFileLockoutStore::new(&path))
            .with_seed(1);
        first.select_question().unwrap();
        first.begin_user_attempt().unwrap();
        first.evaluate(0).unwrap();
        first.evaluate(0).unwrap();
        drop(first);

        // Failures carry over, then trip the lockout
        let mut second = ChallengeStateMachine::new(two_plus_two(), GateSettings::default())
            .with_clock(clock.clone())
            .with_store(JsonFileLockoutStore::new(&path))
            .with_seed(2);
        assert_eq!(second.total_attempts(), 2);
        second.select_question().unwrap();
        second.begin_user_attempt().unwrap();
        for _ in 0..3 {
            second.evaluate(0).unwrap();
        }
        // Fifth failure overall wins over the third in this session
        assert_eq!(second.phase(), GatePhase::Concluded(ValidationState::TooManyAttempts));
        assert_eq!(second.incorrect_attempts(), 2);
        assert!(second.is_user_locked_out());
        drop(second);

        let third = ChallengeStateMachine::new(two_plus_two(), GateSettings::default())
            .with_clock(clock)
            .with_store(JsonFileLockoutStore::new(&path));
        assert!(third.is_user_locked_out());

        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn test_select_keeps_question_while_active() {
        let bank = QuestionBank::from_questions(vec![
            Question::new("2+2?", 4),
            Question::new("8x5?", 40),
        ])
        .unwrap();
        let mut gate = ChallengeStateMachine::new(bank, GateSettings::default())
            .with_clock(ManualClock::default())
            .with_seed(12);
        let first = gate.select_question().unwrap().correct_answer;
        gate.begin_user_attempt().unwrap();

        for _ in 0..20 {
            assert_eq!(gate.select_question().unwrap().correct_answer, first);
        }
        assert!(gate.is_active());
        assert!(gate.evaluate(first).unwrap());
    }

    #[test]
    fn test_narrow_decoy_window_reaches_caller() {
        let settings = GateSettings {
            decoy_spread: 2,
            decoy_floor: Some(0),
            ..Default::default()
        };
        let bank = QuestionBank::from_questions(vec![Question::new("1x1?", 1)]).unwrap();
        let mut gate = ChallengeStateMachine::new(bank, settings)
            .with_clock(ManualClock::default())
            .with_seed(13);
        gate.select_question().unwrap();
        assert!(matches!(
            gate.answers_for_current_question(),
            Err(GateError::InsufficientDecoys {
                correct: 1,
                low: 0,
                high: 3,
                needed: 7
            })
        ));
    }

    #[test]
    fn test_saturated_record_still_locks_out() {
        let store = MemoryLockoutStore::with_record(LockoutRecord {
            lockout_until: None,
            total_attempts: u32::MAX,
        });
        let (gate, _) = gate(14);
        let mut gate = gate.with_store(store);
        gate.select_question().unwrap();
        gate.begin_user_attempt().unwrap();

        assert!(!gate.evaluate(5).unwrap());
        assert_eq!(gate.phase(), GatePhase::Concluded(ValidationState::TooManyAttempts));
        assert_eq!(gate.total_attempts(), 0);
        assert!(gate.is_user_locked_out());
    }

    proptest! {
        #[test]
        fn prop_attempt_limits_hold(
            seed in any::<u64>(),
            answers in prop::collection::vec(any::<bool>(), 1..60),
        ) {
            let (mut gate, clock) = gate(seed);
            let mut failures_since_reset = 0u32;

            for correct in answers {
                if gate.is_user_locked_out() {
                    clock.advance(TimeDelta::minutes(5));
                }
                if !gate.is_active() {
                    gate.select_question().unwrap();
                    gate.begin_user_attempt().unwrap();
                }

                let result = gate.evaluate(if correct { 4 } else { 5 }).unwrap();
                prop_assert_eq!(result, correct);
                prop_assert!(gate.incorrect_attempts() <= 3);
                prop_assert!(gate.total_attempts() < 5);

                let changes = state_changes(&gate.drain_events());
                if correct {
                    failures_since_reset = 0;
                    prop_assert_eq!(changes, vec![ValidationState::Validated]);
                } else {
                    failures_since_reset += 1;
                    if failures_since_reset == 5 {
                        failures_since_reset = 0;
                        prop_assert_eq!(changes, vec![ValidationState::TooManyAttempts]);
                        prop_assert!(gate.is_user_locked_out());
                    } else if gate.incorrect_attempts() == 3 {
                        prop_assert_eq!(changes, vec![ValidationState::TooManyIncorrect]);
                    } else {
                        prop_assert!(changes.is_empty());
                    }
                }
                prop_assert_eq!(gate.total_attempts(), failures_since_reset);
            }
        }
    }
}
