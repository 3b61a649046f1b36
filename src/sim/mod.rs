//! Motion simulation for the answer targets
//!
//! Pure data and math, no rendering:
//! - Variable timestep, driven by the host's real frame interval
//! - Target-vs-wall collision only (targets pass through each other)
//! - Seeded RNG for spawn placement

pub mod collision;
pub mod step;
pub mod target;

pub use collision::{Arena, WallHit, reflect_off_walls};
pub use step::{MotionSimulator, step};
pub use target::{Target, TargetState, random_velocity};
