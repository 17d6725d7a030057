use crate::model::RoomId;

/// Arcade content for one palace room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomContent {
    pub id: RoomId,
    pub name: &'static str,
    pub verse_reference: &'static str,
    /// Statements that belong to the room's method; tapping them scores.
    pub valid: &'static [&'static str],
    /// Plausible-looking decoys; tapping them costs a life.
    pub traps: &'static [&'static str],
}

const ROOMS: &[RoomContent] = &[
    RoomContent {
        id: RoomId::new(1),
        name: "Story Room",
        verse_reference: "Genesis 22:1-14",
        valid: &[
            "Abraham rises early",
            "The ram in the thicket",
            "Three days' journey",
            "Isaac carries the wood",
        ],
        traps: &["Abraham refuses", "Sarah climbs Moriah", "A lamb is bought"],
    },
    RoomContent {
        id: RoomId::new(2),
        name: "Imagination Room",
        verse_reference: "Daniel 3:19-27",
        valid: &[
            "Feel the furnace heat",
            "See a fourth figure",
            "Smell no smoke",
            "Ropes burned away",
        ],
        traps: &["The king joins them", "Furnace goes cold", "Daniel in the fire"],
    },
    RoomContent {
        id: RoomId::new(3),
        name: "Translation Room",
        verse_reference: "John 10:11",
        valid: &[
            "Shepherd as guardian",
            "Life laid down",
            "Sheep know the voice",
        ],
        traps: &["Hireling stays", "Wolf as friend", "Sheep lead shepherd"],
    },
    RoomContent {
        id: RoomId::new(4),
        name: "Gems Room",
        verse_reference: "Psalm 23",
        valid: &[
            "Green pastures",
            "Still waters",
            "Table before enemies",
            "Cup runs over",
        ],
        traps: &["Dry valley forever", "Rod of anger", "Cup half empty"],
    },
];

/// Static per-room lookup of arcade content.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArcadePool;

impl ArcadePool {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    #[must_use]
    pub fn room(&self, id: RoomId) -> Option<&'static RoomContent> {
        ROOMS.iter().find(|room| room.id == id)
    }

    /// All rooms in the fixed order palace mode cycles through.
    #[must_use]
    pub fn palace_rotation(&self) -> &'static [RoomContent] {
        ROOMS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_room_has_both_pools() {
        for room in ArcadePool::new().palace_rotation() {
            assert!(!room.valid.is_empty(), "{} has no valid items", room.name);
            assert!(!room.traps.is_empty(), "{} has no traps", room.name);
        }
    }

    #[test]
    fn lookup_by_id() {
        let pool = ArcadePool::new();
        assert_eq!(pool.room(RoomId::new(3)).unwrap().name, "Translation Room");
        assert!(pool.room(RoomId::new(99)).is_none());
    }
}
