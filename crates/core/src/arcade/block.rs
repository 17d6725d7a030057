use serde::{Deserialize, Serialize};

use crate::model::{BlockId, RoomId};

/// Whether tapping a block helps or hurts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockKind {
    Valid,
    Trap,
}

/// The practice card a block was drawn from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    pub room: RoomId,
    pub verse_reference: String,
}

/// One on-screen item. Positions are percentages of the play field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallingBlock {
    pub id: BlockId,
    pub text: String,
    pub kind: BlockKind,
    pub bonus: bool,
    pub y: f64,
    pub x: f64,
    pub context: BlockContext,
}

impl FallingBlock {
    #[must_use]
    pub fn is_trap(&self) -> bool {
        self.kind == BlockKind::Trap
    }
}
