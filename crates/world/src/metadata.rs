use serde::{Deserialize, Serialize};

/// World-wide facts stored under `Data` in level.dat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WorldMetadata {
    pub snow_covered: i8,
    /// World age in ticks.
    pub time: i64,
    pub spawn_x: i32,
    pub spawn_y: i32,
    pub spawn_z: i32,
    /// Milliseconds since the Unix epoch.
    pub last_played: i64,
    /// Bytes, as last computed by the game.
    pub size_on_disk: i64,
    pub random_seed: i64,
}

impl WorldMetadata {
    pub fn is_snow_covered(&self) -> bool {
        self.snow_covered != 0
    }

    pub fn spawn(&self) -> (i32, i32, i32) {
        (self.spawn_x, self.spawn_y, self.spawn_z)
    }
}
