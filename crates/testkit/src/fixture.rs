//! On-disk world fixtures.
//!
//! A [`WorldFixture`] owns a temporary directory that is removed on drop.
//! Tagged trees are written gzip-compressed, like the game writes them.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use alphaworld_world::{chunk_relative_path, ChunkPos, Value, WorldMetadata, LEVEL_DAT, SESSION_LOCK};
use anyhow::{Context, Result};
use flate2::write::GzEncoder;
use flate2::Compression;
use tempfile::TempDir;

use crate::trees::level_dat_tree;

/// Metadata written by [`WorldFixture::standard`].
pub const STANDARD_METADATA: WorldMetadata = WorldMetadata {
    snow_covered: 0,
    time: 100,
    spawn_x: 0,
    spawn_y: 64,
    spawn_z: 0,
    last_played: 123_456_789,
    size_on_disk: 4096,
    random_seed: 42,
};

/// A world directory in a temporary location.
pub struct WorldFixture {
    dir: TempDir,
}

impl WorldFixture {
    /// Create an empty directory with no world files.
    pub fn empty() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("alphaworld_fixture_")
            .tempdir()
            .context("Failed to create fixture directory")?;
        Ok(Self { dir })
    }

    /// Create a world with [`STANDARD_METADATA`] and a zeroed session lock.
    pub fn standard() -> Result<Self> {
        Self::with_metadata(&STANDARD_METADATA)
    }

    /// Create a world whose level.dat holds `metadata`.
    pub fn with_metadata(metadata: &WorldMetadata) -> Result<Self> {
        let fixture = Self::empty()?;
        fixture.write_level_dat(&level_dat_tree(metadata))?;
        fixture.write_lock(0)?;
        Ok(fixture)
    }

    /// Root of the world directory.
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Replace level.dat with an arbitrary tree.
    pub fn write_level_dat(&self, tree: &Value) -> Result<()> {
        write_tree(&self.path().join(LEVEL_DAT), tree)
    }

    /// Overwrite session.lock with `timestamp`, as a competing process would.
    pub fn write_lock(&self, timestamp: i64) -> Result<()> {
        let path = self.path().join(SESSION_LOCK);
        fs::write(&path, timestamp.to_be_bytes())
            .with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Timestamp currently stored in session.lock.
    pub fn lock_timestamp(&self) -> Result<i64> {
        let path = self.path().join(SESSION_LOCK);
        let bytes = fs::read(&path).with_context(|| format!("Failed to read {}", path.display()))?;
        let head: [u8; 8] = bytes
            .get(..8)
            .and_then(|b| b.try_into().ok())
            .context("session.lock is shorter than 8 bytes")?;
        Ok(i64::from_be_bytes(head))
    }

    /// Write a chunk tree at its sharded location, returning the file path.
    pub fn write_chunk(&self, pos: ChunkPos, tree: &Value) -> Result<PathBuf> {
        let path = self.path().join(chunk_relative_path(pos));
        write_tree(&path, tree)?;
        Ok(path)
    }

    /// Write raw bytes where the chunk at `pos` is expected.
    pub fn write_chunk_bytes(&self, pos: ChunkPos, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path().join(chunk_relative_path(pos));
        create_parent(&path)?;
        fs::write(&path, bytes).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Sorted names of the entries directly inside the world directory.
    pub fn entry_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.path()).context("Failed to list fixture directory")? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }
}

/// Serialize `tree` and write it gzip-compressed to `path`, creating parent directories.
pub fn write_tree(path: &Path, tree: &Value) -> Result<()> {
    let raw = fastnbt::to_bytes(tree).context("Failed to encode tagged tree")?;
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw).context("Failed to compress tagged tree")?;
    let compressed = encoder.finish().context("Failed to compress tagged tree")?;

    create_parent(path)?;
    fs::write(path, compressed).with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote fixture tree");
    Ok(())
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}
