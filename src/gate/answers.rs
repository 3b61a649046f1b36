//! Answer set generation
//!
//! An answer set holds the correct answer once plus distinct decoys drawn
//! from a window around it. Collisions are re-drawn, up to a fixed budget.

use std::ops::RangeInclusive;

use rand::Rng;

use crate::error::GateError;

/// Re-draw budget per decoy before giving up
const DRAWS_PER_DECOY: usize = 64;

/// Window decoys are drawn from: `[max(correct - spread, floor), correct + spread]`
pub fn decoy_window(correct: i64, spread: i64, floor: Option<i64>) -> RangeInclusive<i64> {
    let spread = spread.max(0);
    let mut low = correct.saturating_sub(spread);
    if let Some(floor) = floor {
        low = low.max(floor);
    }
    low..=correct.saturating_add(spread)
}

/// Number of values in `window` other than `correct`
fn decoy_capacity(correct: i64, window: &RangeInclusive<i64>) -> i128 {
    let (low, high) = (*window.start(), *window.end());
    if low > high {
        return 0;
    }
    let size = i128::from(high) - i128::from(low) + 1;
    if window.contains(&correct) { size - 1 } else { size }
}

/// Build `count` distinct answers containing `correct` exactly once, at a
/// uniformly random index.
pub fn generate_answer_set<R: Rng + ?Sized>(
    correct: i64,
    count: usize,
    window: RangeInclusive<i64>,
    rng: &mut R,
) -> Result<Vec<i64>, GateError> {
    let needed = count.saturating_sub(1);
    let insufficient = || GateError::InsufficientDecoys {
        correct,
        low: *window.start(),
        high: *window.end(),
        needed,
    };

    if decoy_capacity(correct, &window) < needed as i128 {
        return Err(insufficient());
    }

    let mut answers: Vec<i64> = Vec::with_capacity(count);
    let mut draws = 0;
    while answers.len() < needed {
        if draws >= needed * DRAWS_PER_DECOY {
            log::warn!("Gave up drawing decoys for {correct} after {draws} draws");
            return Err(insufficient());
        }
        draws += 1;

        let candidate = rng.random_range(window.clone());
        if candidate != correct && !answers.contains(&candidate) {
            answers.push(candidate);
        }
    }

    let slot = rng.random_range(0..=answers.len());
    answers.insert(slot, correct);
    log::debug!("Answer set for {correct}: {answers:?} ({draws} draws)");
    Ok(answers)
}
