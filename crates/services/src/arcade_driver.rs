use std::time::Duration;

use palace_core::arcade::{ArcadeError, ArcadeGame, GameMode, GamePhase, TapOutcome, TickReport};
use palace_core::model::BlockId;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::context::SessionContext;

/// Owns an arcade game together with its random source.
///
/// A seed makes block spawning reproducible; without one the generator is
/// seeded from the operating system.
#[derive(Debug, Clone)]
pub struct ArcadeDriver {
    game: ArcadeGame,
    rng: StdRng,
}

impl ArcadeDriver {
    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            game: ArcadeGame::default(),
            rng,
        }
    }

    /// # Errors
    ///
    /// Propagates `ArcadeError` from the game.
    pub fn start(&mut self, mode: GameMode) -> Result<(), ArcadeError> {
        self.game.start(mode)?;
        info!(?mode, "arcade game started");
        Ok(())
    }

    /// Play the room the user has focused, or the whole palace if none.
    ///
    /// # Errors
    ///
    /// Propagates `ArcadeError` from the game.
    pub fn start_focused(&mut self, ctx: &SessionContext) -> Result<GameMode, ArcadeError> {
        let mode = ctx.focused_room().map_or(GameMode::Palace, GameMode::Room);
        self.start(mode)?;
        Ok(mode)
    }

    pub fn advance(&mut self, dt: Duration) -> TickReport {
        let report = self.game.tick(dt, &mut self.rng);
        if report.rotated {
            debug!(
                room = ?self.game.active_room().map(|room| room.name),
                "palace rotated to next room"
            );
        }
        report
    }

    pub fn tap(&mut self, id: BlockId) -> TapOutcome {
        let outcome = self.game.tap(id);
        match outcome {
            TapOutcome::GameOver {
                final_score,
                new_high_score,
            } => info!(final_score, new_high_score, "arcade game over"),
            TapOutcome::Gone => debug!(block = %id, "tap on a block no longer in play"),
            _ => {}
        }
        outcome
    }

    pub fn return_to_menu(&mut self) {
        self.game.return_to_menu();
    }

    #[must_use]
    pub fn game(&self) -> &ArcadeGame {
        &self.game
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.game.phase() == GamePhase::Playing
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.game.high_score()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palace_core::model::RoomId;

    #[test]
    fn seeded_drivers_spawn_identically() {
        let mut a = ArcadeDriver::new(Some(7));
        let mut b = ArcadeDriver::new(Some(7));
        a.start(GameMode::Palace).unwrap();
        b.start(GameMode::Palace).unwrap();

        for _ in 0..10 {
            a.advance(Duration::from_millis(500));
            b.advance(Duration::from_millis(500));
        }

        assert_eq!(a.game().blocks(), b.game().blocks());
        assert!(!a.game().blocks().is_empty());
    }

    #[test]
    fn focused_room_selects_room_mode() {
        let mut driver = ArcadeDriver::new(Some(1));
        let ctx = SessionContext::anonymous().with_focused_room(Some(RoomId::new(2)));
        assert_eq!(
            driver.start_focused(&ctx).unwrap(),
            GameMode::Room(RoomId::new(2))
        );
        assert!(driver.is_playing());

        driver.return_to_menu();
        let mode = driver.start_focused(&SessionContext::anonymous()).unwrap();
        assert_eq!(mode, GameMode::Palace);
    }

    #[test]
    fn tapping_unknown_block_is_gone() {
        let mut driver = ArcadeDriver::new(Some(3));
        driver.start(GameMode::Palace).unwrap();
        assert_eq!(driver.tap(BlockId::new(999)), TapOutcome::Gone);
    }
}
