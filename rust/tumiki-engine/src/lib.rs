//! Tumiki Engine — tree interpreters for the block-programming lessons.
//!
//! Programs are lowered into a flat node arena, then advanced by an explicit
//! frame stack under a per-tick instruction budget. Two worlds share the
//! machinery: the stage world moves a sprite across a grid, the dance world
//! poses a robot. Goals are judged after a run halts, never during it.
#![warn(clippy::all)]

pub mod budget;
pub mod frame;
pub mod path;
pub mod program;
pub mod robot;
pub mod runtime;
pub mod session;
pub mod vm;

// Re-export the shared data model so hosts can depend on one crate.
pub use tumiki_core::{audio, block, goal, grid};
