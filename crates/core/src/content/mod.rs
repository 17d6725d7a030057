//! Static content the logic consumes: gate questions and arcade rooms.

mod questions;
mod rooms;

pub use questions::{QuestionBank, StaticQuestionBank};
pub use rooms::{ArcadePool, RoomContent};
