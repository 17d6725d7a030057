use std::fmt;
use std::time::Duration;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::block::{BlockContext, BlockKind, FallingBlock};
use super::rules::{
    BONUS_CHANCE, MAX_LIVE_BLOCKS, POSITION_INTERVAL, SPAWN_INTERVAL, SPAWN_X_MAX, SPAWN_X_MIN,
    VALID_CHANCE, VISIBLE_BOUND,
};
use super::session::GameSession;
use crate::content::{ArcadePool, RoomContent};
use crate::model::{BlockId, RoomId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ArcadeError {
    #[error("cannot start a game while in {0}")]
    InvalidTransition(GamePhase),

    #[error("no arcade content for room {0}")]
    UnknownRoom(RoomId),

    #[error("content scope is empty")]
    EmptyScope,
}

//
// ─── PHASES & MODES ────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GamePhase {
    Menu,
    Playing,
    GameOver,
}

impl fmt::Display for GamePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GamePhase::Menu => "menu",
            GamePhase::Playing => "playing",
            GamePhase::GameOver => "game over",
        })
    }
}

/// Which content the blocks are drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    /// A single room for the whole game.
    Room(RoomId),
    /// Every room in turn, rotating as blocks are processed.
    Palace,
}

//
// ─── OUTCOMES ──────────────────────────────────────────────────────────────────
//

/// What a tap did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    Caught { points: u32, streak: u32, score: u32 },
    Trap { lives_left: u8 },
    GameOver { final_score: u32, new_high_score: bool },
    /// The block already left play, or no game is running.
    Gone,
}

/// Summary of one `tick` call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub position_steps: u32,
    pub spawned: Vec<BlockId>,
    pub missed: Vec<BlockId>,
    pub rotated: bool,
}

//
// ─── GAME ──────────────────────────────────────────────────────────────────────
//

/// The falling-block practice game.
///
/// All state lives here and is only changed through `tick`, `tap`, `start`
/// and `return_to_menu`, so any scheduler can drive it.
#[derive(Debug, Clone)]
pub struct ArcadeGame {
    pool: ArcadePool,
    phase: GamePhase,
    mode: Option<GameMode>,
    scopes: Vec<&'static RoomContent>,
    session: GameSession,
    blocks: Vec<FallingBlock>,
    next_block_id: u64,
    high_score: u32,
    position_elapsed: Duration,
    spawn_elapsed: Duration,
}

impl Default for ArcadeGame {
    fn default() -> Self {
        Self::new(ArcadePool::new())
    }
}

impl ArcadeGame {
    #[must_use]
    pub fn new(pool: ArcadePool) -> Self {
        Self {
            pool,
            phase: GamePhase::Menu,
            mode: None,
            scopes: Vec::new(),
            session: GameSession::new(),
            blocks: Vec::new(),
            next_block_id: 1,
            high_score: 0,
            position_elapsed: Duration::ZERO,
            spawn_elapsed: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[must_use]
    pub fn mode(&self) -> Option<GameMode> {
        self.mode
    }

    #[must_use]
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    #[must_use]
    pub fn blocks(&self) -> &[FallingBlock] {
        &self.blocks
    }

    /// Best final score seen since this game object was created.
    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    /// Room blocks are currently drawn from.
    #[must_use]
    pub fn active_room(&self) -> Option<&'static RoomContent> {
        if self.scopes.is_empty() {
            return None;
        }
        self.scopes
            .get(self.session.scope_index() % self.scopes.len())
            .copied()
    }

    /// Begin a fresh session from the menu or after a game over.
    ///
    /// # Errors
    ///
    /// Returns `ArcadeError::InvalidTransition` while a game is running and
    /// `ArcadeError::UnknownRoom` if the room has no content.
    pub fn start(&mut self, mode: GameMode) -> Result<(), ArcadeError> {
        if self.phase == GamePhase::Playing {
            return Err(ArcadeError::InvalidTransition(self.phase));
        }

        let scopes: Vec<&'static RoomContent> = match mode {
            GameMode::Room(id) => vec![self.pool.room(id).ok_or(ArcadeError::UnknownRoom(id))?],
            GameMode::Palace => self.pool.palace_rotation().iter().collect(),
        };
        if scopes.is_empty() {
            return Err(ArcadeError::EmptyScope);
        }

        self.scopes = scopes;
        self.mode = Some(mode);
        self.session = GameSession::new();
        self.blocks.clear();
        self.position_elapsed = Duration::ZERO;
        self.spawn_elapsed = Duration::ZERO;
        self.phase = GamePhase::Playing;
        Ok(())
    }

    /// Leave the current game (if any) and go back to the menu.
    pub fn return_to_menu(&mut self) {
        self.phase = GamePhase::Menu;
        self.blocks.clear();
        self.position_elapsed = Duration::ZERO;
        self.spawn_elapsed = Duration::ZERO;
    }

    /// Advance the game clock by `dt`, running every position and spawn step
    /// that falls due. No-op unless playing.
    pub fn tick<R: Rng + ?Sized>(&mut self, dt: Duration, rng: &mut R) -> TickReport {
        let mut report = TickReport::default();
        if self.phase != GamePhase::Playing {
            return report;
        }

        self.position_elapsed += dt;
        while self.position_elapsed >= POSITION_INTERVAL {
            self.position_elapsed -= POSITION_INTERVAL;
            self.step_positions(&mut report);
        }

        self.spawn_elapsed += dt;
        while self.spawn_elapsed >= SPAWN_INTERVAL {
            self.spawn_elapsed -= SPAWN_INTERVAL;
            if let Some(id) = self.step_spawn(rng) {
                report.spawned.push(id);
            }
        }

        report
    }

    /// Move every block down by the current speed; drop the ones that fell
    /// out of view. Misses cost nothing.
    fn step_positions(&mut self, report: &mut TickReport) {
        report.position_steps += 1;
        let speed = self.session.speed();
        for block in &mut self.blocks {
            block.y += speed;
        }

        let (gone, live): (Vec<_>, Vec<_>) = self
            .blocks
            .drain(..)
            .partition(|block| block.y > VISIBLE_BOUND);
        self.blocks = live;
        for block in gone {
            report.missed.push(block.id);
            report.rotated |= self.mark_processed();
        }
    }

    /// Add one block from the active room unless the screen is full.
    fn step_spawn<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<BlockId> {
        if self.blocks.len() >= MAX_LIVE_BLOCKS {
            return None;
        }
        let room = self.active_room()?;

        let kind = if rng.random_bool(VALID_CHANCE) {
            BlockKind::Valid
        } else {
            BlockKind::Trap
        };
        let texts = match kind {
            BlockKind::Valid => room.valid,
            BlockKind::Trap => room.traps,
        };
        let text = texts.choose(rng)?;
        let bonus = kind == BlockKind::Valid && rng.random_bool(BONUS_CHANCE);
        let x = rng.random_range(SPAWN_X_MIN..=SPAWN_X_MAX);

        let id = BlockId::new(self.next_block_id);
        self.next_block_id += 1;
        self.blocks.push(FallingBlock {
            id,
            text: (*text).to_owned(),
            kind,
            bonus,
            y: 0.0,
            x,
            context: BlockContext {
                room: room.id,
                verse_reference: room.verse_reference.to_owned(),
            },
        });
        Some(id)
    }

    /// Tap a block: score it, or lose a life if it was a trap.
    pub fn tap(&mut self, id: BlockId) -> TapOutcome {
        if self.phase != GamePhase::Playing {
            return TapOutcome::Gone;
        }
        let Some(index) = self.blocks.iter().position(|block| block.id == id) else {
            return TapOutcome::Gone;
        };
        let block = self.blocks.remove(index);
        self.mark_processed();

        match block.kind {
            BlockKind::Valid => {
                let points = self.session.record_catch(block.bonus);
                TapOutcome::Caught {
                    points,
                    streak: self.session.streak(),
                    score: self.session.score(),
                }
            }
            BlockKind::Trap => {
                let lives_left = self.session.record_trap();
                if lives_left > 0 {
                    return TapOutcome::Trap { lives_left };
                }
                self.finish()
            }
        }
    }

    fn finish(&mut self) -> TapOutcome {
        let final_score = self.session.score();
        let new_high_score = final_score > self.high_score;
        if new_high_score {
            self.high_score = final_score;
        }
        self.phase = GamePhase::GameOver;
        self.blocks.clear();
        TapOutcome::GameOver {
            final_score,
            new_high_score,
        }
    }

    fn mark_processed(&mut self) -> bool {
        let rotating = self.mode == Some(GameMode::Palace);
        self.session.record_processed(self.scopes.len(), rotating)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arcade::rules::{
        ROTATE_EVERY, STARTING_LIVES, VALID_POINTS, speed_for_score,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn playing(mode: GameMode) -> ArcadeGame {
        let mut game = ArcadeGame::default();
        game.start(mode).unwrap();
        game
    }

    fn insert(game: &mut ArcadeGame, kind: BlockKind, y: f64) -> BlockId {
        let id = BlockId::new(game.next_block_id);
        game.next_block_id += 1;
        game.blocks.push(FallingBlock {
            id,
            text: "test".into(),
            kind,
            bonus: false,
            y,
            x: 50.0,
            context: BlockContext {
                room: RoomId::new(1),
                verse_reference: "Genesis 22:1-14".into(),
            },
        });
        id
    }

    #[test]
    fn starts_in_menu_and_rejects_double_start() {
        let mut game = ArcadeGame::default();
        assert_eq!(game.phase(), GamePhase::Menu);
        game.start(GameMode::Palace).unwrap();
        assert_eq!(
            game.start(GameMode::Palace).unwrap_err(),
            ArcadeError::InvalidTransition(GamePhase::Playing)
        );
    }

    #[test]
    fn unknown_room_is_rejected() {
        let mut game = ArcadeGame::default();
        let err = game.start(GameMode::Room(RoomId::new(404))).unwrap_err();
        assert_eq!(err, ArcadeError::UnknownRoom(RoomId::new(404)));
        assert_eq!(game.phase(), GamePhase::Menu);
    }

    #[test]
    fn block_falling_off_screen_is_a_silent_miss() {
        let mut game = playing(GameMode::Room(RoomId::new(1)));
        let id = insert(&mut game, BlockKind::Trap, VISIBLE_BOUND - 0.5);
        let mut rng = StdRng::seed_from_u64(7);

        let report = game.tick(POSITION_INTERVAL, &mut rng);

        assert_eq!(report.missed, vec![id]);
        assert!(game.blocks().is_empty());
        assert_eq!(game.session().score(), 0);
        assert_eq!(game.session().lives(), STARTING_LIVES);
    }

    #[test]
    fn blocks_fall_by_speed_each_step() {
        let mut game = playing(GameMode::Room(RoomId::new(1)));
        insert(&mut game, BlockKind::Valid, 10.0);
        let mut rng = StdRng::seed_from_u64(1);

        let report = game.tick(POSITION_INTERVAL * 4, &mut rng);

        assert_eq!(report.position_steps, 4);
        assert_eq!(game.blocks()[0].y, 10.0 + 4.0 * speed_for_score(0));
    }

    #[test]
    fn trap_always_costs_exactly_one_life() {
        for prior_streak in [0_u32, 3, 12] {
            let mut game = playing(GameMode::Room(RoomId::new(2)));
            for _ in 0..prior_streak {
                let id = insert(&mut game, BlockKind::Valid, 0.0);
                game.tap(id);
            }
            assert_eq!(game.session().streak(), prior_streak);

            let trap = insert(&mut game, BlockKind::Trap, 0.0);
            let outcome = game.tap(trap);

            assert_eq!(
                outcome,
                TapOutcome::Trap {
                    lives_left: STARTING_LIVES - 1
                }
            );
            assert_eq!(game.session().streak(), 0);
        }
    }

    #[test]
    fn valid_tap_scores_and_removes_block() {
        let mut game = playing(GameMode::Room(RoomId::new(1)));
        let id = insert(&mut game, BlockKind::Valid, 30.0);
        assert_eq!(
            game.tap(id),
            TapOutcome::Caught {
                points: VALID_POINTS,
                streak: 1,
                score: VALID_POINTS
            }
        );
        assert!(game.blocks().is_empty());
        assert_eq!(game.tap(id), TapOutcome::Gone);
    }

    #[test]
    fn losing_last_life_ends_game_and_tracks_high_score() {
        let mut game = playing(GameMode::Room(RoomId::new(1)));
        let valid = insert(&mut game, BlockKind::Valid, 0.0);
        game.tap(valid);

        let mut last = TapOutcome::Gone;
        for _ in 0..STARTING_LIVES {
            let trap = insert(&mut game, BlockKind::Trap, 0.0);
            last = game.tap(trap);
        }
        assert_eq!(
            last,
            TapOutcome::GameOver {
                final_score: VALID_POINTS,
                new_high_score: true
            }
        );
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert_eq!(game.high_score(), VALID_POINTS);

        // a worse second game keeps the old high score
        game.start(GameMode::Palace).unwrap();
        for _ in 0..STARTING_LIVES {
            let trap = insert(&mut game, BlockKind::Trap, 0.0);
            last = game.tap(trap);
        }
        assert_eq!(
            last,
            TapOutcome::GameOver {
                final_score: 0,
                new_high_score: false
            }
        );
        assert_eq!(game.high_score(), VALID_POINTS);
    }

    #[test]
    fn game_over_can_return_to_menu() {
        let mut game = playing(GameMode::Room(RoomId::new(1)));
        for _ in 0..STARTING_LIVES {
            let trap = insert(&mut game, BlockKind::Trap, 0.0);
            game.tap(trap);
        }
        game.return_to_menu();
        assert_eq!(game.phase(), GamePhase::Menu);
        game.start(GameMode::Room(RoomId::new(3))).unwrap();
        assert_eq!(game.session().lives(), STARTING_LIVES);
    }

    #[test]
    fn spawns_stop_at_capacity() {
        let mut game = playing(GameMode::Palace);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..MAX_LIVE_BLOCKS {
            insert(&mut game, BlockKind::Valid, 0.0);
        }
        // one spawn interval moves blocks 30 steps, still on screen
        let report = game.tick(SPAWN_INTERVAL, &mut rng);
        assert!(report.spawned.is_empty());
        assert_eq!(game.blocks().len(), MAX_LIVE_BLOCKS);
    }

    #[test]
    fn spawned_blocks_come_from_active_room() {
        let mut game = playing(GameMode::Room(RoomId::new(4)));
        let mut rng = StdRng::seed_from_u64(3);
        let report = game.tick(SPAWN_INTERVAL, &mut rng);
        assert_eq!(report.spawned.len(), 1);

        let block = &game.blocks()[0];
        let room = game.active_room().unwrap();
        assert_eq!(block.context.room, RoomId::new(4));
        let pool = match block.kind {
            BlockKind::Valid => room.valid,
            BlockKind::Trap => room.traps,
        };
        assert!(pool.contains(&block.text.as_str()));
        assert!((SPAWN_X_MIN..=SPAWN_X_MAX).contains(&block.x));
        assert!(!(block.is_trap() && block.bonus));
    }

    #[test]
    fn same_seed_same_game() {
        let run = |seed| {
            let mut game = playing(GameMode::Palace);
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..200 {
                game.tick(Duration::from_millis(100), &mut rng);
            }
            game.blocks().to_vec()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn palace_mode_rotates_rooms() {
        let mut game = playing(GameMode::Palace);
        let first = game.active_room().unwrap().id;
        for _ in 0..ROTATE_EVERY {
            let id = insert(&mut game, BlockKind::Valid, 0.0);
            game.tap(id);
        }
        assert_ne!(game.active_room().unwrap().id, first);
        assert_eq!(game.session().scope_index(), 1);
    }

    #[test]
    fn ticks_are_ignored_outside_play() {
        let mut game = ArcadeGame::default();
        let mut rng = StdRng::seed_from_u64(0);
        let report = game.tick(SPAWN_INTERVAL * 3, &mut rng);
        assert_eq!(report, TickReport::default());
        assert!(game.blocks().is_empty());
    }
}
