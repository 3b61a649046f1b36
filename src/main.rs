//! Parental Gate entry point
//!
//! Runs the gate headless on simulated frames with a scripted player that
//! drags targets into the drop zone, logging every event.
//!
//! ```text
//! parental-gate [--questions PATH] [--settings PATH] [--lockout PATH] [--seed N] [--sessions N]
//! ```

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::PathBuf;
    use std::process::ExitCode;

    use clap::Parser;
    use glam::Vec2;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use parental_gate::persistence::JsonFileLockoutStore;
    use parental_gate::{
        ChallengeStateMachine, GateController, GateError, GateEvent, GateSettings,
        MotionSimulator, QuestionBank,
    };

    /// Upper bound on frames per session (the countdown ends it far sooner)
    const MAX_FRAMES_PER_SESSION: u32 = 60 * 60;

    /// Run the parental gate headless with a scripted player
    #[derive(Parser, Debug)]
    #[command(name = "parental-gate", version)]
    struct Options {
        /// Question bank JSON (defaults to the bundled set)
        #[arg(long)]
        questions: Option<PathBuf>,
        /// Gate settings JSON
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Lockout record file; kept in memory when absent
        #[arg(long)]
        lockout: Option<PathBuf>,
        /// RNG seed (random when absent)
        #[arg(long)]
        seed: Option<u64>,
        /// Number of gate sessions to play
        #[arg(long, default_value_t = 3)]
        sessions: u32,
    }

    /// Scripted player: waits a little, then drags a target into the zone.
    /// Usually picks a wrong one.
    struct AutoPlayer {
        rng: Pcg32,
        cooldown: f32,
    }

    impl AutoPlayer {
        fn new(seed: u64) -> Self {
            Self {
                rng: Pcg32::seed_from_u64(seed),
                cooldown: 1.5,
            }
        }

        /// 60 fps with jitter
        fn frame_dt(&mut self) -> f32 {
            1.0 / 60.0 + self.rng.random_range(-0.004..0.004)
        }

        fn act(&mut self, controller: &mut GateController, dt: f32) -> Result<(), GateError> {
            self.cooldown -= dt;
            if self.cooldown > 0.0 || !controller.gate().is_active() {
                return Ok(());
            }
            self.cooldown = self.rng.random_range(1.0..3.0);

            let Some(correct) = controller.gate().current_question().map(|q| q.correct_answer)
            else {
                return Ok(());
            };
            let pick_correct = self.rng.random_bool(0.25);
            let candidates: Vec<(i64, Vec2)> = controller
                .targets()
                .iter()
                .filter(|t| (t.answer_value == correct) == pick_correct)
                .map(|t| (t.answer_value, t.pos))
                .collect();
            if candidates.is_empty() {
                return Ok(());
            }
            let (_, grab) = candidates[self.rng.random_range(0..candidates.len())];

            let Some(id) = controller.drag_began(grab) else {
                return Ok(());
            };
            let zone = controller.drop_zone();
            let release = Vec2::new(zone.x + zone.size / 2.0, zone.y + zone.size / 2.0);
            controller.drag_moved(id, release - grab)?;
            let fling = Vec2::new(
                self.rng.random_range(-300.0..300.0),
                self.rng.random_range(-300.0..300.0),
            );
            let value = controller
                .simulator()
                .target(id)
                .map(|t| t.answer_value)
                .unwrap_or_default();
            match controller.drag_ended(id, release, fling)? {
                Some(true) => log::info!("Player dropped {value}: correct"),
                Some(false) => log::info!("Player dropped {value}: incorrect"),
                None => {}
            }
            Ok(())
        }
    }

    fn run(opts: Options) -> Result<(), GateError> {
        let bank = match &opts.questions {
            Some(path) => QuestionBank::load(path)?,
            None => QuestionBank::builtin()?,
        };
        let settings = match &opts.settings {
            Some(path) => GateSettings::load(path)?,
            None => GateSettings::default(),
        };
        let seed = opts.seed.unwrap_or_else(|| rand::rng().random());
        log::info!("Seed {seed} with {} questions", bank.len());

        let sim = MotionSimulator::new(&settings).with_seed(seed);
        let mut gate = ChallengeStateMachine::new(bank, settings).with_seed(seed ^ 0x9e37);
        if let Some(path) = &opts.lockout {
            gate = gate.with_store(JsonFileLockoutStore::new(path));
        }
        let mut controller = GateController::new(gate, sim);
        let mut player = AutoPlayer::new(seed.wrapping_add(1));

        for session in 1..=opts.sessions {
            match controller.show() {
                Ok(()) => {}
                Err(GateError::LockedOut { remaining }) => {
                    log::warn!("Locked out, try again in {}s", remaining.as_secs());
                    break;
                }
                Err(e) => return Err(e),
            }
            if let Some(q) = controller.gate().current_question() {
                log::info!("Session {session}: {}", q.prompt);
            }
            let answers: Vec<i64> = controller.targets().iter().map(|t| t.answer_value).collect();
            log::info!("Answers: {answers:?}");

            let mut frames = 0;
            while controller.is_presented() && frames < MAX_FRAMES_PER_SESSION {
                let dt = player.frame_dt();
                for event in controller.update(dt) {
                    match event {
                        GateEvent::TimeRemaining { seconds_left } => {
                            log::debug!("{seconds_left}s remaining")
                        }
                        GateEvent::StateChanged { state } => {
                            log::info!("Session {session} ended: {}", state.as_str())
                        }
                    }
                }
                player.act(&mut controller, dt)?;
                frames += 1;
            }
            controller.dismiss();
        }
        Ok(())
    }

    pub fn main() -> ExitCode {
        let opts = Options::parse();
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!("Parental Gate (native) starting...");

        match run(opts) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                log::error!("{e}");
                ExitCode::FAILURE
            }
        }
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    native::main()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The gate is embedded as a library on wasm; there is no standalone host.
}
