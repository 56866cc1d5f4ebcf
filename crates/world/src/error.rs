use std::io;
use std::path::PathBuf;
use std::time::SystemTimeError;

use thiserror::Error;

use crate::decode::DecodeError;
use crate::tagtree::TagTreeError;

/// Errors raised while opening a world or loading from it.
#[derive(Debug, Error)]
pub enum WorldError {
    /// The world path could not be stat'ed.
    #[error("could not stat world directory {}", .path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// The world path exists but is not a directory.
    #[error("expected a directory at {}, didn't get one", .path.display())]
    NotADirectory { path: PathBuf },
    /// The directory listing could not be read.
    #[error("could not read world directory contents of {}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("world at {} is missing level.dat", .path.display())]
    MissingMetadataFile { path: PathBuf },
    #[error("world at {} is missing session.lock", .path.display())]
    MissingLockFile { path: PathBuf },
    #[error("could not open session lock {}", .path.display())]
    LockOpenFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not write timestamp to session lock {}", .path.display())]
    LockWriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not read timestamp from session lock {}", .path.display())]
    LockReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not read the current time")]
    ClockUnavailable(#[source] SystemTimeError),
    #[error("current time ({millis} ms since the epoch) does not fit a lock timestamp")]
    ClockOutOfRange { millis: u128 },
    /// Another process rewrote the session lock after we acquired it.
    #[error(
        "another process has opened {} (lock timestamp {found}, ours {expected})",
        .path.display()
    )]
    LockStolen {
        path: PathBuf,
        expected: i64,
        found: i64,
    },
    /// level.dat could not be read as a tagged tree.
    #[error("could not read level metadata {}", .path.display())]
    LevelRead {
        path: PathBuf,
        #[source]
        source: TagTreeError,
    },
    #[error("malformed level metadata at key `{key}`")]
    MalformedMetadata {
        key: String,
        #[source]
        source: DecodeError,
    },
    #[error("chunk ({x}, {z}) not found at {}", .path.display())]
    ChunkFileNotFound { x: i32, z: i32, path: PathBuf },
    /// The chunk file exists but could not be decoded, either as a tagged
    /// tree or against the chunk schema.
    #[error("could not decode chunk ({x}, {z}) from {}", .path.display())]
    ChunkDecodeError {
        x: i32,
        z: i32,
        path: PathBuf,
        #[source]
        source: ChunkDecodeCause,
    },
    #[error("{operation} is not implemented")]
    NotImplemented { operation: &'static str },
}

impl WorldError {
    /// The schema error underneath a metadata or chunk decode failure.
    pub fn decode_error(&self) -> Option<&DecodeError> {
        match self {
            Self::MalformedMetadata { source, .. }
            | Self::ChunkDecodeError {
                source: ChunkDecodeCause::Schema(source),
                ..
            } => Some(source),
            _ => None,
        }
    }

    /// Returns true for the lock-theft condition.
    pub fn is_lock_stolen(&self) -> bool {
        matches!(self, Self::LockStolen { .. })
    }
}

/// Stage at which a chunk file failed to decode.
#[derive(Debug, Error)]
pub enum ChunkDecodeCause {
    /// The bytes are not a tagged tree (bad gzip stream or NBT payload).
    #[error("file is not a readable tagged tree")]
    Tree(#[source] TagTreeError),
    /// The tree does not match the chunk schema.
    #[error("chunk does not match the expected layout")]
    Schema(#[source] DecodeError),
}

/// Result alias for world operations.
pub type WorldResult<T> = Result<T, WorldError>;
