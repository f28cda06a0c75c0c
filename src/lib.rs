//! An ordered index of unique keys backed by a skiplist, and a leaderboard built from two of them.
//!
//! Entries live in a typed arena and are linked by generation-checked handles, so the structure
//! needs no unsafe code and no reference counting. Heights are drawn by a pluggable
//! `LevelGenerator`.

pub mod arena;
pub mod error;
pub mod leaderboard;
pub mod level_generator;
pub mod skiplist;

pub use crate::error::{Error, Result};
