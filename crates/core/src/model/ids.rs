use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Error type for parsing an ID from a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    kind: &'static str,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {} from string", self.kind)
    }
}

impl std::error::Error for ParseIdError {}

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying u64 value
            #[must_use]
            pub const fn value(&self) -> u64 {
                self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<u64>().map(Self::new).map_err(|_| ParseIdError {
                    kind: stringify!($name),
                })
            }
        }
    };
}

numeric_id!(
    /// Identifier of an active study program (one per user and track run).
    ProgramId
);
numeric_id!(
    /// Identifier of a gate question, unique within its gate.
    QuestionId
);
numeric_id!(
    /// Identifier of a falling block, unique within one arcade game.
    BlockId
);
numeric_id!(
    /// Identifier of a palace room.
    RoomId
);

/// Identifier of an authenticated user.
///
/// Users come from the auth provider, which hands out UUIDs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Generates a fresh random user id.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl fmt::Debug for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserId({})", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = ParseIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|_| ParseIdError { kind: "UserId" })
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_id_display_and_parse() {
        let id = ProgramId::new(42);
        assert_eq!(id.to_string(), "42");
        assert_eq!("42".parse::<ProgramId>().unwrap(), id);
    }

    #[test]
    fn numeric_id_rejects_garbage() {
        let err = "room-seven".parse::<RoomId>().unwrap_err();
        assert_eq!(err.to_string(), "failed to parse RoomId from string");
    }

    #[test]
    fn debug_names_the_kind() {
        assert_eq!(format!("{:?}", BlockId::new(3)), "BlockId(3)");
        assert_eq!(format!("{:?}", QuestionId::new(9)), "QuestionId(9)");
    }

    #[test]
    fn user_id_parses_uuid() {
        let user = UserId::random();
        let parsed: UserId = user.to_string().parse().unwrap();
        assert_eq!(parsed, user);
        assert!("not-a-uuid".parse::<UserId>().is_err());
    }

    #[test]
    fn ids_serialize_as_bare_values() {
        let json = serde_json::to_string(&RoomId::new(5)).unwrap();
        assert_eq!(json, "5");
    }
}
