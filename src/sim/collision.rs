//! Arena bounds and wall collision
//!
//! Walls reflect each axis independently. A target overrunning the low edge
//! leaves with a positive velocity on that axis, one overrunning the high
//! edge with a negative one, so speed is always preserved.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Rectangular play area, origin at the top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
}

impl Arena {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Valid range for a target center on each axis
    fn center_range(extent: f32, radius: f32) -> (f32, f32) {
        if extent >= 2.0 * radius {
            (radius, extent - radius)
        } else {
            // Too small to fit; pin to the middle
            (extent / 2.0, extent / 2.0)
        }
    }

    /// Whether a target of `radius` centered at `pos` lies fully inside
    pub fn contains(&self, pos: Vec2, radius: f32) -> bool {
        let (x_lo, x_hi) = Self::center_range(self.width, radius);
        let (y_lo, y_hi) = Self::center_range(self.height, radius);
        (x_lo..=x_hi).contains(&pos.x) && (y_lo..=y_hi).contains(&pos.y)
    }

    /// Uniform random in-bounds center for a target of `radius`
    pub fn random_position<R: Rng + ?Sized>(&self, rng: &mut R, radius: f32) -> Vec2 {
        let (x_lo, x_hi) = Self::center_range(self.width, radius);
        let (y_lo, y_hi) = Self::center_range(self.height, radius);
        Vec2::new(rng.random_range(x_lo..=x_hi), rng.random_range(y_lo..=y_hi))
    }
}

/// Which axes were reflected
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WallHit {
    pub x: bool,
    pub y: bool,
}

impl WallHit {
    pub fn any(&self) -> bool {
        self.x || self.y
    }
}

/// Clamp one axis into `[lo, hi]`, reflecting velocity on overrun
#[inline]
fn reflect_axis(pos: &mut f32, vel: &mut f32, lo: f32, hi: f32) -> bool {
    if *pos < lo {
        *pos = lo;
        *vel = vel.abs();
        true
    } else if *pos > hi {
        *pos = hi;
        *vel = -vel.abs();
        true
    } else {
        false
    }
}

/// Keep a target inside the arena. Corners reflect both axes in one call.
pub fn reflect_off_walls(pos: &mut Vec2, vel: &mut Vec2, radius: f32, arena: &Arena) -> WallHit {
    let (x_lo, x_hi) = Arena::center_range(arena.width, radius);
    let (y_lo, y_hi) = Arena::center_range(arena.height, radius);
    WallHit {
        x: reflect_axis(&mut pos.x, &mut vel.x, x_lo, x_hi),
        y: reflect_axis(&mut pos.y, &mut vel.y, y_lo, y_hi),
    }
}
