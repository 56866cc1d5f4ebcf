//! Chunk file paths.
//!
//! A chunk at `(x, z)` lives at `<shard_x>/<shard_z>/c.<x>.<z>.dat` below the
//! world directory, every number rendered in lowercase base 36.

use std::path::PathBuf;

use crate::chunk::ChunkPos;

/// Number of shard directories per axis.
pub const SHARD_COUNT: i64 = 64;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Reduce a coordinate into `[0, 64)` the way the legacy client names its folders.
///
/// Negative coordinates are first mapped to `64 - c`, so `-1` lands in shard 1
/// (not 63 as a floored modulo would give). Existing saves depend on this.
pub fn shard_index(coord: i32) -> i32 {
    let mut c = i64::from(coord);
    if c < 0 {
        c = SHARD_COUNT - c;
    }
    (c % SHARD_COUNT) as i32
}

/// Render a value in lowercase base 36 with a leading minus for negatives.
pub fn to_base36(value: i32) -> String {
    let negative = value < 0;
    let mut magnitude = i64::from(value).unsigned_abs();
    if magnitude == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::with_capacity(8);
    while magnitude > 0 {
        digits.push(BASE36_DIGITS[(magnitude % 36) as usize]);
        magnitude /= 36;
    }
    if negative {
        digits.push(b'-');
    }
    digits.reverse();
    digits.into_iter().map(char::from).collect()
}

/// File name of a chunk, e.g. `c.-1.z.dat`.
pub fn chunk_file_name(pos: ChunkPos) -> String {
    format!("c.{}.{}.dat", to_base36(pos.x), to_base36(pos.z))
}

/// Path of a chunk file relative to the world directory.
pub fn chunk_relative_path(pos: ChunkPos) -> PathBuf {
    let mut path = PathBuf::from(to_base36(shard_index(pos.x)));
    path.push(to_base36(shard_index(pos.z)));
    path.push(chunk_file_name(pos));
    path
}
