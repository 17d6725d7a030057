use palace_core::model::{RoomId, UserId};

/// Per-user state handed to every service call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<UserId>,
    focused_room: Option<RoomId>,
}

impl SessionContext {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn signed_in(user: UserId) -> Self {
        Self {
            user: Some(user),
            focused_room: None,
        }
    }

    #[must_use]
    pub fn with_focused_room(mut self, room: Option<RoomId>) -> Self {
        self.focused_room = room;
        self
    }

    #[must_use]
    pub fn user(&self) -> Option<UserId> {
        self.user
    }

    /// Room the user last selected in the palace view, if any.
    #[must_use]
    pub fn focused_room(&self) -> Option<RoomId> {
        self.focused_room
    }
}
