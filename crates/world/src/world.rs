//! An open world directory.

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::chunk::{Chunk, ChunkPos};
use crate::decode::{decode_chunk, decode_metadata};
use crate::error::{ChunkDecodeCause, WorldError, WorldResult};
use crate::format::{verify_format, LEVEL_DAT};
use crate::lock::{LockMode, LockState, SessionLock};
use crate::metadata::WorldMetadata;
use crate::shard::chunk_relative_path;
use crate::storage::ChunkCache;
use crate::tagtree::{NbtFileSource, TagTreeSource};

/// Options for [`World::open_with`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorldOptions {
    pub lock_mode: LockMode,
}

impl WorldOptions {
    pub fn lock_mode(mut self, lock_mode: LockMode) -> Self {
        self.lock_mode = lock_mode;
        self
    }
}

/// A world directory opened for reading.
///
/// Holds the session lock for as long as it lives. Not synchronized; callers
/// sharing one across threads must wrap it in their own lock.
pub struct World<S = NbtFileSource> {
    dir: PathBuf,
    lock: SessionLock,
    metadata: WorldMetadata,
    chunks: ChunkCache,
    source: S,
}

impl World<NbtFileSource> {
    /// Open a world from disk, claiming its session lock.
    pub fn open<P: AsRef<Path>>(dir: P) -> WorldResult<Self> {
        Self::open_with(dir, WorldOptions::default(), NbtFileSource)
    }
}

impl<S: TagTreeSource> World<S> {
    /// Open a world reading tagged trees through `source`.
    ///
    /// Nothing is written before the format check passes. If anything after
    /// locking fails, the lock handle is closed on the way out.
    pub fn open_with<P: AsRef<Path>>(dir: P, options: WorldOptions, source: S) -> WorldResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        verify_format(&dir)?;
        let lock = SessionLock::acquire(&dir, options.lock_mode)?;

        let level_path = dir.join(LEVEL_DAT);
        let tree = source
            .load(&level_path)
            .map_err(|source| WorldError::LevelRead {
                path: level_path.clone(),
                source,
            })?;
        let metadata = decode_metadata(&tree).map_err(|err| WorldError::MalformedMetadata {
            key: err.field().to_string(),
            source: err,
        })?;

        info!(
            dir = %dir.display(),
            lock_timestamp = lock.timestamp(),
            mode = ?lock.mode(),
            seed = metadata.random_seed,
            "opened world"
        );
        Ok(Self {
            dir,
            lock,
            metadata,
            chunks: ChunkCache::new(),
            source,
        })
    }

    /// Load the chunk at `(x, z)`, or return the cached copy.
    ///
    /// The session lock is re-checked first on every call, cached or not.
    /// Cached chunks are never re-read from disk.
    pub fn load_chunk(&mut self, x: i32, z: i32) -> WorldResult<&Chunk> {
        self.lock.verify()?;

        let pos = ChunkPos::new(x, z);
        let dir = &self.dir;
        let source = &self.source;
        self.chunks
            .get_or_try_insert_with(pos, || read_chunk(dir, source, pos))
    }

    /// Write in-memory changes back to disk. Not supported yet; always fails.
    pub fn flush(&mut self) -> WorldResult<()> {
        Err(WorldError::NotImplemented {
            operation: "flush",
        })
    }

    /// Release the session lock and drop every cached chunk.
    pub fn close(self) {
        info!(dir = %self.dir.display(), chunks = self.chunks.len(), "closing world");
        self.lock.release();
    }

    /// Cached chunk at `(x, z)`, without touching the disk.
    pub fn chunk(&self, x: i32, z: i32) -> Option<&Chunk> {
        self.chunks.get(ChunkPos::new(x, z))
    }

    pub fn chunks(&self) -> impl Iterator<Item = (ChunkPos, &Chunk)> + '_ {
        self.chunks.iter()
    }

    pub fn loaded_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn metadata(&self) -> &WorldMetadata {
        &self.metadata
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Timestamp this world wrote (or observed) in `session.lock`.
    pub fn lock_timestamp(&self) -> i64 {
        self.lock.timestamp()
    }

    pub fn lock_state(&self) -> LockState {
        self.lock.state()
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

fn read_chunk<S: TagTreeSource>(dir: &Path, source: &S, pos: ChunkPos) -> WorldResult<Chunk> {
    let path = dir.join(chunk_relative_path(pos));
    debug!(%pos, path = %path.display(), "loading chunk");

    let tree = source.load(&path).map_err(|err| {
        if err.is_not_found() {
            WorldError::ChunkFileNotFound {
                x: pos.x,
                z: pos.z,
                path: path.clone(),
            }
        } else {
            WorldError::ChunkDecodeError {
                x: pos.x,
                z: pos.z,
                path: path.clone(),
                source: ChunkDecodeCause::Tree(err),
            }
        }
    })?;
    let chunk = decode_chunk(&tree).map_err(|source| WorldError::ChunkDecodeError {
        x: pos.x,
        z: pos.z,
        path,
        source: ChunkDecodeCause::Schema(source),
    })?;

    if chunk.position() != pos {
        warn!(
            requested = %pos,
            stored = %chunk.position(),
            "chunk file records a different position"
        );
    }
    Ok(chunk)
}
