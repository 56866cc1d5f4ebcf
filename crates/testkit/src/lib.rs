#![warn(missing_docs)]
//! Test fixtures: throwaway Alpha world directories and tagged-tree builders.

mod fixture;
mod source;
mod trees;

pub use fixture::*;
pub use source::*;
pub use trees::*;
