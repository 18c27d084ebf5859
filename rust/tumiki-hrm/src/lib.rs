//! Tumiki HRM — the register machine behind the delivery puzzles.
//!
//! A worker shuttles numbers between an inbox, an outbox, one hand, and a
//! few numbered floor tiles, driven by a twelve-op instruction set. The
//! machine steps functionally: every step maps a state to a new state, so
//! hosts can pause, scrub backward by replaying, and diff snapshots freely.
#![warn(clippy::all)]

pub mod challenge;
pub mod program;
pub mod vm;
