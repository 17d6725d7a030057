//! Tuning constants and the pure scoring/difficulty rules.

use std::time::Duration;

/// How often falling blocks move.
pub const POSITION_INTERVAL: Duration = Duration::from_millis(50);
/// How often a spawn is attempted.
pub const SPAWN_INTERVAL: Duration = Duration::from_millis(1500);

/// Blocks below this line have left the play field.
pub const VISIBLE_BOUND: f64 = 100.0;
/// Spawns are skipped while this many blocks are on screen.
pub const MAX_LIVE_BLOCKS: usize = 4;

pub const SPAWN_X_MIN: f64 = 5.0;
pub const SPAWN_X_MAX: f64 = 85.0;
/// Probability that a spawned block is valid rather than a trap.
pub const VALID_CHANCE: f64 = 0.6;
/// Probability that a valid block is flagged bonus.
pub const BONUS_CHANCE: f64 = 0.15;

pub const STARTING_LIVES: u8 = 3;
pub const VALID_POINTS: u32 = 10;
pub const BONUS_POINTS: u32 = 25;

pub const BASE_SPEED: f64 = 1.0;
/// Added to the speed for every full 100 points.
pub const SPEED_STEP: f64 = 0.25;
pub const MAX_SPEED: f64 = 4.0;

/// Palace mode moves to the next room after this many blocks leave play.
pub const ROTATE_EVERY: u32 = 10;

/// Fall speed for a given score.
#[must_use]
pub fn speed_for_score(score: u32) -> f64 {
    let steps = f64::from(score / 100);
    (BASE_SPEED + SPEED_STEP * steps).min(MAX_SPEED)
}

/// Point multiplier once the streak (including the current catch) reaches a threshold.
#[must_use]
pub fn streak_multiplier(streak: u32) -> u32 {
    match streak {
        s if s >= 10 => 3,
        s if s >= 5 => 2,
        _ => 1,
    }
}
