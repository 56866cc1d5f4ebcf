#![warn(missing_docs)]
//! Typed model shared across the workspace: entities, their physics state and carried items.

pub mod entity;
pub mod item;

// Re-export commonly used types
pub use entity::{Entity, Euler, Physics, Position, Velocity};
pub use item::Item;
