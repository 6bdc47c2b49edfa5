use std::fmt;

/// Identity of a snake for as long as its owner stays connected.
///
/// The server hands these out in increasing order and never reuses one, so the
/// same value can key every table that tracks a snake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnakeId(i64);

impl SnakeId {
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    /// Wire form of the identity, if it fits the 32-bit field.
    pub fn to_wire(self) -> Option<i32> {
        i32::try_from(self.0).ok()
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<i64> for SnakeId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<i32> for SnakeId {
    fn from(id: i32) -> Self {
        Self(id as i64)
    }
}

impl From<SnakeId> for i64 {
    fn from(id: SnakeId) -> Self {
        id.0
    }
}

impl fmt::Display for SnakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
