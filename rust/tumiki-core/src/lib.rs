//! Tumiki Core
//!
//! Shared types used across the Tumiki engines: the block vocabulary, grid
//! geometry, goal descriptors, and the audio-sink contract.

pub mod audio;
pub mod block;
pub mod goal;
pub mod grid;
