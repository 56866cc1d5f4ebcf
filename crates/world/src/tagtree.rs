//! Seam to the tagged-tree (NBT) file format.
//!
//! The world code only needs two things from the format: turning a file into a
//! generic [`Value`] tree, and reading/writing a raw 64-bit integer at the
//! current position of an open handle (used by the session lock).

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use fastnbt::Value;
use flate2::read::GzDecoder;
use thiserror::Error;

/// Leading bytes of a gzip stream.
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Errors produced while turning a file into a tagged tree.
#[derive(Debug, Error)]
pub enum TagTreeError {
    #[error("failed to read tagged-tree file")]
    Io(#[from] io::Error),
    #[error("failed to decode tagged-tree payload")]
    Decode(#[from] fastnbt::error::Error),
}

impl TagTreeError {
    /// Returns true when the underlying file does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Io(err) if err.kind() == io::ErrorKind::NotFound)
    }
}

/// Something that can load a file path into a tagged tree.
pub trait TagTreeSource {
    /// Load and decode the whole file at `path`.
    fn load(&self, path: &Path) -> Result<Value, TagTreeError>;
}

/// Reads tagged-tree files from disk, gunzipping them when needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NbtFileSource;

impl TagTreeSource for NbtFileSource {
    fn load(&self, path: &Path) -> Result<Value, TagTreeError> {
        let raw = fs::read(path)?;
        decode_bytes(&raw)
    }
}

/// Decode an in-memory tagged tree, compressed or not.
pub fn decode_bytes(raw: &[u8]) -> Result<Value, TagTreeError> {
    if raw.starts_with(&GZIP_MAGIC) {
        let mut inflated = Vec::with_capacity(raw.len() * 4);
        GzDecoder::new(raw).read_to_end(&mut inflated)?;
        Ok(fastnbt::from_bytes(&inflated)?)
    } else {
        Ok(fastnbt::from_bytes(raw)?)
    }
}

/// Read a big-endian `i64` at the reader's current position.
pub fn read_i64<R: Read>(reader: &mut R) -> io::Result<i64> {
    let mut bytes = [0u8; 8];
    reader.read_exact(&mut bytes)?;
    Ok(i64::from_be_bytes(bytes))
}

/// Write a big-endian `i64` at the writer's current position.
pub fn write_i64<W: Write>(writer: &mut W, value: i64) -> io::Result<()> {
    writer.write_all(&value.to_be_bytes())
}
