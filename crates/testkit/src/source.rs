//! Instrumented tagged-tree source.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use alphaworld_world::{NbtFileSource, TagTreeError, TagTreeSource, Value};

/// Wraps another source and records every path it is asked to load.
#[derive(Debug, Default)]
pub struct CountingSource<S = NbtFileSource> {
    inner: S,
    loads: RefCell<Vec<PathBuf>>,
}

impl CountingSource<NbtFileSource> {
    /// Count loads made against the real file reader.
    pub fn new() -> Self {
        Self::wrap(NbtFileSource)
    }
}

impl<S> CountingSource<S> {
    /// Count loads made against `inner`.
    pub fn wrap(inner: S) -> Self {
        Self {
            inner,
            loads: RefCell::new(Vec::new()),
        }
    }

    /// Total number of loads, successful or not.
    pub fn load_count(&self) -> usize {
        self.loads.borrow().len()
    }

    /// Number of loads of paths ending in `file_name`.
    pub fn loads_of(&self, file_name: &str) -> usize {
        self.loads
            .borrow()
            .iter()
            .filter(|path| path.file_name().and_then(|n| n.to_str()) == Some(file_name))
            .count()
    }
}

impl<S: TagTreeSource> TagTreeSource for CountingSource<S> {
    fn load(&self, path: &Path) -> Result<Value, TagTreeError> {
        self.loads.borrow_mut().push(path.to_path_buf());
        self.inner.load(path)
    }
}
