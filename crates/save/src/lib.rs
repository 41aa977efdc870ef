//! Profile persistence: numbered save slots plus a background autosaver.

pub mod autosave;
pub mod slot;

pub use autosave::*;
pub use slot::*;
