use std::fmt;

use alphaworld_core::Entity;
use fastnbt::Value;

/// Chunk width (X axis) in blocks.
pub const CHUNK_SIZE_X: usize = 16;
/// Chunk height (Y axis) in blocks.
pub const CHUNK_SIZE_Y: usize = 128;
/// Chunk depth (Z axis) in blocks.
pub const CHUNK_SIZE_Z: usize = 16;
/// Total block count per chunk.
pub const CHUNK_VOLUME: usize = CHUNK_SIZE_X * CHUNK_SIZE_Y * CHUNK_SIZE_Z;
/// Length of the 4-bit-per-block arrays (`Data`, `SkyLight`, `BlockLight`).
pub const NIBBLE_ARRAY_LEN: usize = CHUNK_VOLUME / 2;
/// Length of the per-column heightmap.
pub const HEIGHTMAP_LEN: usize = CHUNK_SIZE_X * CHUNK_SIZE_Z;

/// Chunk coordinate (X,Z) in chunk space.
/// Implements Ord for deterministic iteration in BTreeMap/BTreeSet (sorts by x, then z).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Cache key for this position.
    pub const fn key(self) -> CoordKey {
        CoordKey::new(self.x, self.z)
    }
}

impl fmt::Display for ChunkPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// Both chunk coordinates folded into one 64-bit key.
///
/// The two 32-bit patterns are packed side by side (z high, x low) so every
/// pair maps to a distinct key. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoordKey(u64);

impl CoordKey {
    pub const fn new(x: i32, z: i32) -> Self {
        Self(((z as u32 as u64) << 32) | (x as u32 as u64))
    }

    /// Raw packed value.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Recover the coordinates the key was built from.
    pub const fn pos(self) -> ChunkPos {
        ChunkPos::new(self.0 as u32 as i32, (self.0 >> 32) as u32 as i32)
    }
}

impl From<ChunkPos> for CoordKey {
    fn from(pos: ChunkPos) -> Self {
        pos.key()
    }
}

/// Terrain and entity payload of a chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Level {
    /// Block ids, `CHUNK_VOLUME` bytes, indexed `y + z * 128 + x * 128 * 16`.
    pub blocks: Vec<u8>,
    /// Block metadata nibbles.
    pub data: Vec<u8>,
    pub sky_light: Vec<u8>,
    /// Highest light-blocking Y per column.
    pub height_map: Vec<u8>,
    pub block_light: Vec<u8>,
    /// Entities in save order.
    pub entities: Vec<Entity>,
    /// Tile entities, kept undecoded.
    pub tile_entities: Value,
    pub last_update: i64,
    pub x_pos: i32,
    pub z_pos: i32,
    pub terrain_populated: i8,
}

impl Level {
    /// Chunk position recorded inside the file.
    pub fn position(&self) -> ChunkPos {
        ChunkPos::new(self.x_pos, self.z_pos)
    }

    /// Returns true once terrain decoration has run for this chunk.
    pub fn is_populated(&self) -> bool {
        self.terrain_populated != 0
    }

    /// Block id at chunk-local coordinates.
    pub fn block(&self, x: usize, y: usize, z: usize) -> u8 {
        self.blocks[block_index(x, y, z)]
    }

    /// Block metadata nibble at chunk-local coordinates.
    pub fn block_data(&self, x: usize, y: usize, z: usize) -> u8 {
        nibble(&self.data, block_index(x, y, z))
    }

    pub fn sky_light_at(&self, x: usize, y: usize, z: usize) -> u8 {
        nibble(&self.sky_light, block_index(x, y, z))
    }

    pub fn block_light_at(&self, x: usize, y: usize, z: usize) -> u8 {
        nibble(&self.block_light, block_index(x, y, z))
    }

    /// Heightmap value for a column.
    pub fn height(&self, x: usize, z: usize) -> u8 {
        debug_assert!(x < CHUNK_SIZE_X);
        debug_assert!(z < CHUNK_SIZE_Z);
        self.height_map[z * CHUNK_SIZE_X + x]
    }
}

/// Column-major index used by the Alpha layout.
fn block_index(x: usize, y: usize, z: usize) -> usize {
    debug_assert!(x < CHUNK_SIZE_X);
    debug_assert!(y < CHUNK_SIZE_Y);
    debug_assert!(z < CHUNK_SIZE_Z);
    y + z * CHUNK_SIZE_Y + x * CHUNK_SIZE_Y * CHUNK_SIZE_Z
}

/// Low nibble holds the even index.
fn nibble(array: &[u8], index: usize) -> u8 {
    let byte = array[index / 2];
    if index % 2 == 0 {
        byte & 0x0F
    } else {
        byte >> 4
    }
}

/// A loaded chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    pub level: Level,
}

impl Chunk {
    pub fn new(level: Level) -> Self {
        Self { level }
    }

    pub fn position(&self) -> ChunkPos {
        self.level.position()
    }

    pub fn entities(&self) -> &[Entity] {
        &self.level.entities
    }
}
