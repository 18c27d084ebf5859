//! Explicit execution frames.
//!
//! Control flow is an owned stack of [`Frame`]s over the lowered arena; the
//! host's call stack is never used for program structure, so interpreter
//! depth is bounded by lesson content, not by recursion limits.

use crate::program::NodeRange;

/// One level of nesting in a running program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame {
    /// Straight-line pass over a sibling range.
    Seq { range: NodeRange, cursor: usize },
    /// Bounded loop over a repeat body. `remaining` counts passes left,
    /// including the one in progress.
    Repeat {
        range: NodeRange,
        cursor: usize,
        remaining: i32,
    },
}

/// The interpreter's control stack.
///
/// The top frame is the one being advanced. A sequence frame pops when its
/// cursor runs off the range; a repeat frame rewinds the cursor and burns
/// one pass, popping when no passes remain. An empty stack is the terminal
/// condition.
#[derive(Debug, Clone, Default)]
pub struct FrameStack {
    frames: Vec<Frame>,
}

impl FrameStack {
    pub fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Start a run: drop any previous frames and enter the root sequence.
    pub fn reset(&mut self, root: NodeRange) {
        self.frames.clear();
        self.frames.push(Frame::Seq {
            range: root,
            cursor: root.start,
        });
    }

    /// Enter a repeat body for `passes` passes.
    ///
    /// Callers guard against zero passes and empty bodies; a frame pushed
    /// here always yields at least one node before its bookkeeping runs.
    pub fn push_repeat(&mut self, body: NodeRange, passes: i32) {
        self.frames.push(Frame::Repeat {
            range: body,
            cursor: body.start,
            remaining: passes,
        });
    }

    /// Current nesting depth.
    #[inline]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Advance the top frame and yield the arena index of the next node to
    /// execute, or `None` once the stack empties.
    ///
    /// All pop-and-rewind bookkeeping happens here and is free with respect
    /// to the tick budget; only yielded nodes can cost instruction units.
    pub fn next_node(&mut self) -> Option<usize> {
        loop {
            let top = self.frames.last_mut()?;
            match top {
                Frame::Seq { range, cursor } => {
                    if *cursor < range.end {
                        let idx = *cursor;
                        *cursor += 1;
                        return Some(idx);
                    }
                    self.frames.pop();
                }
                Frame::Repeat {
                    range,
                    cursor,
                    remaining,
                } => {
                    if *cursor < range.end {
                        let idx = *cursor;
                        *cursor += 1;
                        return Some(idx);
                    }
                    *remaining -= 1;
                    if *remaining > 0 {
                        *cursor = range.start;
                    } else {
                        self.frames.pop();
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
