//! Item stacks as they appear inside dropped-item entities.

use serde::{Deserialize, Serialize};

/// Numeric item identifier (block ids share the same space in Alpha saves).
pub type ItemId = i16;

/// A single item stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Item {
    /// Item or block id.
    pub id: ItemId,
    /// Stack size.
    pub count: i8,
    /// Damage for tools, variant for everything else.
    pub damage: i16,
}

impl Item {
    /// Create a new item stack.
    pub const fn new(id: ItemId, count: i8, damage: i16) -> Self {
        Self { id, count, damage }
    }

    /// Returns true when the stack holds nothing.
    pub fn is_empty(&self) -> bool {
        self.count <= 0
    }
}
