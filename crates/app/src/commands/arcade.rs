//! The `palace arcade` command: a headless game driven by a simple player.

use std::time::Duration;

use anyhow::Result;
use palace_core::arcade::{FallingBlock, TapOutcome, rules};
use palace_core::model::RoomId;
use services::ArcadeDriver;

use crate::config::Config;

/// Height at which the simulated player reacts to a block.
const REACTION_HEIGHT: f64 = 30.0;

/// One in this many traps gets tapped by mistake.
const CARELESS_EVERY: u64 = 5;

pub fn execute(
    config: &Config,
    seed: Option<u64>,
    seconds: u32,
    room: Option<RoomId>,
) -> Result<()> {
    let ctx = config.context().with_focused_room(room);
    let mut driver = ArcadeDriver::new(seed);
    let mode = driver.start_focused(&ctx)?;
    println!("Playing {mode:?}");

    let steps = Duration::from_secs(u64::from(seconds)).as_millis()
        / rules::POSITION_INTERVAL.as_millis();
    let (mut caught, mut traps, mut missed) = (0_u32, 0_u32, 0_usize);

    for _ in 0..steps {
        let report = driver.advance(rules::POSITION_INTERVAL);
        missed += report.missed.len();

        let targets: Vec<_> = driver
            .game()
            .blocks()
            .iter()
            .filter(|block| wants_tap(block))
            .map(|block| block.id)
            .collect();
        for id in targets {
            match driver.tap(id) {
                TapOutcome::Caught { .. } => caught += 1,
                TapOutcome::Trap { .. } | TapOutcome::GameOver { .. } => traps += 1,
                TapOutcome::Gone => {}
            }
        }
        if !driver.is_playing() {
            break;
        }
    }

    let session = driver.game().session();
    println!("Score:      {}", session.score());
    println!("Lives left: {}", session.lives());
    println!("Streak:     {}", session.streak());
    println!("Speed:      {:.2}", session.speed());
    println!("Caught {caught}, traps hit {traps}, missed {missed}");
    println!("High score: {}", driver.high_score());
    if !driver.is_playing() {
        println!("Game over");
    }
    Ok(())
}

fn wants_tap(block: &FallingBlock) -> bool {
    if block.y < REACTION_HEIGHT {
        return false;
    }
    !block.is_trap() || block.id.value() % CARELESS_EVERY == 0
}
