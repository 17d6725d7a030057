use serde::{Deserialize, Serialize};

use super::rules::{
    BONUS_POINTS, ROTATE_EVERY, STARTING_LIVES, VALID_POINTS, speed_for_score, streak_multiplier,
};

/// Running tallies for one play-through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSession {
    score: u32,
    lives: u8,
    streak: u32,
    speed: f64,
    blocks_processed: u32,
    scope_index: usize,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            score: 0,
            lives: STARTING_LIVES,
            streak: 0,
            speed: speed_for_score(0),
            blocks_processed: 0,
            scope_index: 0,
        }
    }
}

impl GameSession {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn lives(&self) -> u8 {
        self.lives
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn speed(&self) -> f64 {
        self.speed
    }

    #[must_use]
    pub fn blocks_processed(&self) -> u32 {
        self.blocks_processed
    }

    #[must_use]
    pub fn scope_index(&self) -> usize {
        self.scope_index
    }

    /// Apply a correct tap and return the points it earned.
    pub(crate) fn record_catch(&mut self, bonus: bool) -> u32 {
        self.streak = self.streak.saturating_add(1);
        let base = if bonus { BONUS_POINTS } else { VALID_POINTS };
        let points = base * streak_multiplier(self.streak);
        self.score = self.score.saturating_add(points);
        self.speed = speed_for_score(self.score);
        points
    }

    /// Apply a trap tap and return the lives left.
    pub(crate) fn record_trap(&mut self) -> u8 {
        self.lives = self.lives.saturating_sub(1);
        self.streak = 0;
        self.lives
    }

    /// Count a block leaving play. Returns true when the scope rotated.
    pub(crate) fn record_processed(&mut self, scope_count: usize, rotating: bool) -> bool {
        self.blocks_processed = self.blocks_processed.saturating_add(1);
        if rotating && scope_count > 0 && self.blocks_processed % ROTATE_EVERY == 0 {
            self.scope_index = (self.scope_index + 1) % scope_count;
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trap_costs_one_life_and_resets_streak() {
        let mut session = GameSession::new();
        for _ in 0..7 {
            session.record_catch(false);
        }
        assert_eq!(session.streak(), 7);

        let lives = session.record_trap();
        assert_eq!(lives, STARTING_LIVES - 1);
        assert_eq!(session.streak(), 0);
    }

    #[test]
    fn streak_thresholds_scale_points() {
        let mut session = GameSession::new();
        let points: Vec<u32> = (0..10).map(|_| session.record_catch(false)).collect();
        assert_eq!(points[..4], [10, 10, 10, 10]);
        assert_eq!(points[4..9], [20, 20, 20, 20, 20]);
        assert_eq!(points[9], 30);
    }

    #[test]
    fn bonus_blocks_are_worth_more() {
        let mut session = GameSession::new();
        assert_eq!(session.record_catch(true), BONUS_POINTS);
    }

    #[test]
    fn speed_follows_score() {
        let mut session = GameSession::new();
        let start = session.speed();
        while session.score() < 100 {
            session.record_catch(true);
        }
        assert!(session.speed() > start);
        assert_eq!(session.speed(), speed_for_score(session.score()));
    }

    #[test]
    fn rotation_only_in_rotating_mode() {
        let mut fixed = GameSession::new();
        let mut palace = GameSession::new();
        let mut rotations = 0;
        for _ in 0..ROTATE_EVERY * 5 {
            assert!(!fixed.record_processed(4, false));
            if palace.record_processed(4, true) {
                rotations += 1;
            }
        }
        assert_eq!(fixed.scope_index(), 0);
        assert_eq!(rotations, 5);
        assert_eq!(palace.scope_index(), 1);
    }
}
