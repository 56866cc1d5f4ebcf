//! Cooperative session lock.
//!
//! Whoever opened a world last writes the current time in milliseconds into
//! `session.lock`. Holders re-read the file before touching the world; if the
//! value changed, someone else has taken over. Nothing prevents two processes
//! from opening the same world, the last opener simply wins.

use std::fs::{File, OpenOptions};
use std::io::{Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{WorldError, WorldResult};
use crate::format::SESSION_LOCK;
use crate::tagtree::{read_i64, write_i64};

/// How a world takes the session lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockMode {
    /// Write our own timestamp, claiming the world.
    #[default]
    Cooperative,
    /// Remember the timestamp already on disk without writing. Used for
    /// inspecting a world a game may currently hold.
    Observe,
}

/// Lock lifecycle. Releasing consumes the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    /// Acquired, not yet re-checked.
    Locked,
    /// The last check found our timestamp.
    Verified,
    /// Another process rewrote the file. Terminal.
    Stolen { found: i64 },
}

/// Handle on a world's `session.lock`.
#[derive(Debug)]
pub struct SessionLock {
    path: PathBuf,
    file: File,
    timestamp: i64,
    mode: LockMode,
    state: LockState,
}

impl SessionLock {
    /// Take the lock in `world_dir` using `mode`.
    pub fn acquire(world_dir: &Path, mode: LockMode) -> WorldResult<Self> {
        let path = world_dir.join(SESSION_LOCK);
        let mut file = OpenOptions::new()
            .read(true)
            .write(mode == LockMode::Cooperative)
            .open(&path)
            .map_err(|source| WorldError::LockOpenFailed {
                path: path.clone(),
                source,
            })?;

        let timestamp = match mode {
            LockMode::Cooperative => {
                let now = current_millis()?;
                write_i64(&mut file, now)
                    .and_then(|()| file.sync_data())
                    .map_err(|source| WorldError::LockWriteFailed {
                        path: path.clone(),
                        source,
                    })?;
                now
            }
            LockMode::Observe => read_i64(&mut file).map_err(|source| {
                WorldError::LockReadFailed {
                    path: path.clone(),
                    source,
                }
            })?,
        };

        debug!(path = %path.display(), timestamp, ?mode, "session lock acquired");
        Ok(Self {
            path,
            file,
            timestamp,
            mode,
            state: LockState::Locked,
        })
    }

    /// Re-read the lock file and confirm we still own the world.
    ///
    /// Once theft has been seen the lock stays stolen without further reads.
    pub fn verify(&mut self) -> WorldResult<()> {
        if let LockState::Stolen { found } = self.state {
            return Err(self.stolen(found));
        }

        let found = self
            .file
            .seek(SeekFrom::Start(0))
            .and_then(|_| read_i64(&mut self.file))
            .map_err(|source| WorldError::LockReadFailed {
                path: self.path.clone(),
                source,
            })?;

        if found != self.timestamp {
            warn!(
                path = %self.path.display(),
                ours = self.timestamp,
                found,
                "session lock taken by another process"
            );
            self.state = LockState::Stolen { found };
            return Err(self.stolen(found));
        }

        self.state = LockState::Verified;
        Ok(())
    }

    /// Close the handle. The timestamp on disk is left for the next opener.
    pub fn release(self) {
        debug!(path = %self.path.display(), "session lock released");
    }

    /// Timestamp this lock expects to find on disk.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    pub fn state(&self) -> LockState {
        self.state
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn stolen(&self, found: i64) -> WorldError {
        WorldError::LockStolen {
            path: self.path.clone(),
            expected: self.timestamp,
            found,
        }
    }
}

/// Wall-clock milliseconds since the Unix epoch.
pub fn current_millis() -> WorldResult<i64> {
    let elapsed = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(WorldError::ClockUnavailable)?;
    epoch_millis(elapsed)
}

fn epoch_millis(elapsed: Duration) -> WorldResult<i64> {
    let millis = elapsed.as_millis();
    i64::try_from(millis).map_err(|_| WorldError::ClockOutOfRange { millis })
}

/// Read the timestamp currently stored in a world's lock file without taking it.
pub fn read_lock_timestamp(world_dir: &Path) -> WorldResult<i64> {
    let path = world_dir.join(SESSION_LOCK);
    let mut file = File::open(&path).map_err(|source| WorldError::LockOpenFailed {
        path: path.clone(),
        source,
    })?;
    read_i64(&mut file).map_err(|source| WorldError::LockReadFailed { path, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn world_with_lock(timestamp: i64) -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SESSION_LOCK), timestamp.to_be_bytes()).unwrap();
        dir
    }

    fn overwrite(dir: &Path, timestamp: i64) {
        fs::write(dir.join(SESSION_LOCK), timestamp.to_be_bytes()).unwrap();
    }

    #[test]
    fn epoch_millis_rejects_overflow() {
        assert_eq!(epoch_millis(Duration::from_millis(1234)).unwrap(), 1234);
        assert_eq!(
            epoch_millis(Duration::from_millis(i64::MAX as u64)).unwrap(),
            i64::MAX
        );
        match epoch_millis(Duration::MAX) {
            Err(WorldError::ClockOutOfRange { millis }) => {
                assert_eq!(millis, Duration::MAX.as_millis());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn acquire_writes_timestamp_and_verifies() {
        let dir = world_with_lock(1);
        let mut lock = SessionLock::acquire(dir.path(), LockMode::Cooperative).unwrap();
        assert_eq!(lock.state(), LockState::Locked);
        assert_eq!(read_lock_timestamp(dir.path()).unwrap(), lock.timestamp());
        assert!(lock.timestamp() > 1);

        lock.verify().unwrap();
        lock.verify().unwrap();
        assert_eq!(lock.state(), LockState::Verified);
    }

    #[test]
    fn overwritten_timestamp_is_stolen_for_good() {
        let dir = world_with_lock(0);
        let mut lock = SessionLock::acquire(dir.path(), LockMode::Cooperative).unwrap();
        let theirs = lock.timestamp() + 1;
        overwrite(dir.path(), theirs);

        let err = lock.verify().unwrap_err();
        match err {
            WorldError::LockStolen {
                expected, found, ..
            } => {
                assert_eq!(expected, lock.timestamp());
                assert_eq!(found, theirs);
            }
            other => panic!("unexpected error: {other:?}"),
        }

        // Restoring our value does not revive the lock.
        overwrite(dir.path(), lock.timestamp());
        assert!(lock.verify().unwrap_err().is_lock_stolen());
        assert_eq!(lock.state(), LockState::Stolen { found: theirs });
    }

    #[test]
    fn acquire_does_not_truncate_longer_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SESSION_LOCK), [0xAAu8; 12]).unwrap();
        SessionLock::acquire(dir.path(), LockMode::Cooperative)
            .unwrap()
            .release();
        let bytes = fs::read(dir.path().join(SESSION_LOCK)).unwrap();
        assert_eq!(bytes.len(), 12);
        assert_eq!(&bytes[8..], &[0xAA; 4]);
    }

    #[test]
    fn release_leaves_timestamp_in_place() {
        let dir = world_with_lock(0);
        let lock = SessionLock::acquire(dir.path(), LockMode::Cooperative).unwrap();
        let ours = lock.timestamp();
        lock.release();
        assert_eq!(read_lock_timestamp(dir.path()).unwrap(), ours);
    }

    #[test]
    fn observe_mode_never_writes() {
        let dir = world_with_lock(424242);
        let mut lock = SessionLock::acquire(dir.path(), LockMode::Observe).unwrap();
        assert_eq!(lock.timestamp(), 424242);
        lock.verify().unwrap();
        assert_eq!(read_lock_timestamp(dir.path()).unwrap(), 424242);

        overwrite(dir.path(), 424243);
        assert!(lock.verify().unwrap_err().is_lock_stolen());
    }

    #[test]
    fn missing_lock_file_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let err = SessionLock::acquire(dir.path(), LockMode::Cooperative).unwrap_err();
        assert!(matches!(err, WorldError::LockOpenFailed { .. }));
        assert!(!dir.path().join(SESSION_LOCK).exists());
    }

    #[test]
    fn short_lock_file_fails_to_verify() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(SESSION_LOCK), [0u8; 3]).unwrap();
        let err = SessionLock::acquire(dir.path(), LockMode::Observe).unwrap_err();
        assert!(matches!(err, WorldError::LockReadFailed { .. }));
    }
}
