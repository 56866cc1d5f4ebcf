use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use crate::{Chunk, ChunkPos, CoordKey};

/// In-memory cache of chunks loaded from disk.
///
/// Nothing is ever evicted; the cache grows for as long as the owning world
/// stays open. Uses BTreeMap so iteration order is stable across runs.
#[derive(Debug, Default)]
pub struct ChunkCache {
    chunks: BTreeMap<CoordKey, Chunk>,
}

impl ChunkCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of resident chunks.
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    /// Returns true when no chunks are currently stored.
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn contains(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos.key())
    }

    /// Attempt to fetch a chunk immutably.
    pub fn get(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos.key())
    }

    /// Return the cached chunk at `pos`, running `load` only when it is absent.
    ///
    /// A failed load leaves the cache untouched.
    pub fn get_or_try_insert_with<E>(
        &mut self,
        pos: ChunkPos,
        load: impl FnOnce() -> Result<Chunk, E>,
    ) -> Result<&Chunk, E> {
        match self.chunks.entry(pos.key()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => Ok(entry.insert(load()?)),
        }
    }

    /// Iterate over resident chunks with their requested positions.
    pub fn iter(&self) -> impl Iterator<Item = (ChunkPos, &Chunk)> + '_ {
        self.chunks.iter().map(|(key, chunk)| (key.pos(), chunk))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Level, CHUNK_VOLUME, HEIGHTMAP_LEN, NIBBLE_ARRAY_LEN};
    use fastnbt::Value;

    fn put(cache: &mut ChunkCache, chunk: Chunk) {
        let pos = chunk.position();
        cache
            .get_or_try_insert_with(pos, || Ok::<_, ()>(chunk))
            .unwrap();
    }

    fn chunk_at(x: i32, z: i32, last_update: i64) -> Chunk {
        Chunk::new(Level {
            blocks: vec![0; CHUNK_VOLUME],
            data: vec![0; NIBBLE_ARRAY_LEN],
            sky_light: vec![0; NIBBLE_ARRAY_LEN],
            height_map: vec![0; HEIGHTMAP_LEN],
            block_light: vec![0; NIBBLE_ARRAY_LEN],
            entities: Vec::new(),
            tile_entities: Value::List(Vec::new()),
            last_update,
            x_pos: x,
            z_pos: z,
            terrain_populated: 0,
        })
    }

    #[test]
    fn cache_never_evicts() {
        let mut cache = ChunkCache::new();
        for x in -50..50 {
            put(&mut cache, chunk_at(x, -x, 0));
        }
        assert_eq!(cache.len(), 100);
        assert!(cache.contains(ChunkPos::new(-50, 50)));
        assert!(cache.contains(ChunkPos::new(49, -49)));
    }

    #[test]
    fn loader_runs_only_for_missing_chunks() {
        let mut cache = ChunkCache::new();
        let pos = ChunkPos::new(2, 3);
        let mut calls = 0;
        for update in 1..=3 {
            let chunk = cache
                .get_or_try_insert_with(pos, || {
                    calls += 1;
                    Ok::<_, ()>(chunk_at(2, 3, update))
                })
                .unwrap();
            assert_eq!(chunk.level.last_update, 1);
        }
        assert_eq!(calls, 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn failed_load_is_not_cached() {
        let mut cache = ChunkCache::new();
        let pos = ChunkPos::new(0, 0);
        let err = cache
            .get_or_try_insert_with(pos, || Err("boom"))
            .unwrap_err();
        assert_eq!(err, "boom");
        assert!(!cache.contains(pos));
    }

    #[test]
    fn get_returns_none_for_missing_chunk() {
        let cache = ChunkCache::new();
        assert!(cache.is_empty());
        assert!(cache.get(ChunkPos::new(999, 999)).is_none());
    }

    #[test]
    fn iter_reports_requested_positions() {
        let mut cache = ChunkCache::new();
        put(&mut cache, chunk_at(-1, 4, 0));
        put(&mut cache, chunk_at(7, 0, 0));
        let mut positions: Vec<_> = cache.iter().map(|(pos, _)| pos).collect();
        positions.sort();
        assert_eq!(positions, vec![ChunkPos::new(-1, 4), ChunkPos::new(7, 0)]);
    }
}
