//! Reading legacy Alpha-format world directories.
//!
//! A [`World`] checks the directory layout, claims the cooperative session
//! lock and decodes level.dat; chunks are then loaded on demand from their
//! sharded files and cached for the life of the world.

mod chunk;
mod decode;
mod error;
mod format;
mod lock;
mod metadata;
mod shard;
mod storage;
mod tagtree;
mod world;

pub use chunk::*;
pub use decode::*;
pub use error::*;
pub use format::*;
pub use lock::*;
pub use metadata::*;
pub use shard::*;
pub use storage::*;
pub use tagtree::*;
pub use world::*;

pub use fastnbt::Value;
