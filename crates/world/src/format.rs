//! Sanity check of a world directory's shape before anything touches it.

use std::fs;
use std::path::Path;

use crate::error::{WorldError, WorldResult};

/// World metadata file name.
pub const LEVEL_DAT: &str = "level.dat";
/// Session lock file name.
pub const SESSION_LOCK: &str = "session.lock";

/// Check that `dir` is a directory holding `level.dat` and `session.lock` as regular files.
///
/// Read-only: a world in use by another process must be left exactly as found.
pub fn verify_format(dir: &Path) -> WorldResult<()> {
    let meta = fs::metadata(dir).map_err(|source| WorldError::NotFound {
        path: dir.to_path_buf(),
        source,
    })?;
    if !meta.is_dir() {
        return Err(WorldError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }

    let read_dir_err = |source| WorldError::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut has_level_dat = false;
    let mut has_session_lock = false;
    for entry in fs::read_dir(dir).map_err(read_dir_err)? {
        let entry = entry.map_err(read_dir_err)?;
        if !entry.file_type().map_err(read_dir_err)?.is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(LEVEL_DAT) => has_level_dat = true,
            Some(SESSION_LOCK) => has_session_lock = true,
            _ => {}
        }
    }

    if !has_level_dat {
        return Err(WorldError::MissingMetadataFile {
            path: dir.to_path_buf(),
        });
    }
    if !has_session_lock {
        return Err(WorldError::MissingLockFile {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}
