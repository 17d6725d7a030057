//! Falling-block practice game.
//!
//! Blocks drop from the top of the field; tap the ones that belong to the
//! room's method and leave the traps alone. Letting a block fall past the
//! bottom costs nothing.

mod block;
mod game;
pub mod rules;
mod session;

pub use block::{BlockContext, BlockKind, FallingBlock};
pub use game::{ArcadeError, ArcadeGame, GameMode, GamePhase, TapOutcome, TickReport};
pub use session::GameSession;
