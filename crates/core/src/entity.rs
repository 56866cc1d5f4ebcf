//! Entities stored inside chunks.

use serde::{Deserialize, Serialize};

use crate::item::Item;

/// World-space position.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Velocity in blocks per tick.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

/// Orientation in degrees. Saves carry no roll, so it is always zero after decode.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Euler {
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
}

impl Euler {
    /// Build an orientation from yaw and pitch with zero roll.
    pub const fn from_yaw_pitch(yaw: f32, pitch: f32) -> Self {
        Self {
            yaw,
            pitch,
            roll: 0.0,
        }
    }
}

/// Kinematic state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Physics {
    pub position: Position,
    pub velocity: Velocity,
    pub euler: Euler,
}

/// An entity record.
///
/// `health`, `age`, `tile` and `item` only exist for some entity kinds. `None`
/// means the save did not carry the attribute, which is the normal case for
/// most of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Entity type string, e.g. `"Item"` or `"Pig"`.
    pub id: String,
    /// Non-zero when the entity rests on a block.
    pub on_ground: i8,
    /// Remaining air ticks.
    pub air: i16,
    /// Remaining fire ticks (negative while immune).
    pub fire: i16,
    /// Distance fallen since last touching the ground.
    pub fall_distance: f32,
    pub physics: Physics,
    pub health: Option<i16>,
    pub age: Option<i16>,
    /// Block id carried by falling-block entities.
    pub tile: Option<i16>,
    /// Item carried by dropped-item entities.
    pub item: Option<Item>,
}

impl Entity {
    /// Create an entity with the given id and zeroed state.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            on_ground: 0,
            air: 0,
            fire: 0,
            fall_distance: 0.0,
            physics: Physics::default(),
            health: None,
            age: None,
            tile: None,
            item: None,
        }
    }

    /// Returns true when the entity is resting on the ground.
    pub fn is_on_ground(&self) -> bool {
        self.on_ground != 0
    }
}
