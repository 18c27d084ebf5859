//! Step-debugging driver for lesson playback.
//!
//! Wraps a [`Runtime`] pinned to one instruction unit per tick so a host
//! can walk a program instruction by instruction. Stepping backward replays
//! from a fresh load rather than unwinding: the machine is deterministic,
//! so re-running `k - 1` steps reproduces the earlier state exactly.
//!
//! Replaying re-emits sound into the session's sink. That matches forward
//! playback semantics; hosts that must not double-play pass a
//! [`NullAudioSink`](tumiki_core::audio::NullAudioSink) and read events
//! elsewhere.

use tumiki_core::block::Block;

use crate::runtime::{Runtime, RuntimeOptions};
use crate::vm::VmState;

/// A paused run advanced one instruction at a time.
pub struct StepSession {
    options: RuntimeOptions,
    program: Vec<Block>,
    runtime: Runtime,
    step_index: u32,
}

impl StepSession {
    /// Load `program` and pause before the first instruction.
    ///
    /// The options' tick budget is overridden to one instruction per tick.
    pub fn new(mut options: RuntimeOptions, program: Vec<Block>) -> Self {
        options.max_instructions_per_tick = 1;
        let mut runtime = Runtime::new(options.clone());
        runtime.load(&program);
        Self {
            options,
            program,
            runtime,
            step_index: 0,
        }
    }

    /// Execute the next instruction. A no-op once the run has halted.
    pub fn step_forward(&mut self) {
        if !self.runtime.state().running {
            return;
        }
        self.runtime.step();
        self.step_index += 1;
    }

    /// Rewind one instruction by replaying from the start.
    ///
    /// A no-op at step zero.
    pub fn step_back(&mut self) {
        if self.step_index == 0 {
            return;
        }
        let target = self.step_index - 1;
        let mut runtime = Runtime::new(self.options.clone());
        runtime.load(&self.program);
        for _ in 0..target {
            runtime.step();
        }
        self.runtime = runtime;
        self.step_index = target;
    }

    /// Steps taken from the start of the program.
    #[inline]
    pub fn step_index(&self) -> u32 {
        self.step_index
    }

    /// Whether the run has halted.
    pub fn is_finished(&self) -> bool {
        !self.runtime.state().running
    }

    /// Whether the halted (or current) state clears the goal.
    pub fn cleared(&self) -> bool {
        self.runtime.check_complete()
    }

    /// The live machine state.
    #[inline]
    pub fn state(&self) -> &VmState {
        self.runtime.state()
    }

    /// The wrapped runtime, for event inspection.
    #[inline]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
