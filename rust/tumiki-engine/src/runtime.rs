//! The stage runtime: a [`Vm`] plus goal judging.
//!
//! Hosts construct one runtime per attempt, load the program, drive it with
//! [`Runtime::step`] or [`Runtime::run_until_idle`], then ask
//! [`Runtime::check_complete`] whether the finished run cleared the goal.
//! Path goals turn on trace recording automatically.

use std::sync::Arc;

use tumiki_core::audio::{AudioSink, MemoryAudioSink};
use tumiki_core::block::Block;
use tumiki_core::goal::{Goal, PathPattern};
use tumiki_core::grid::{Grid, Position};

use crate::budget::DEFAULT_INSTRUCTIONS_PER_TICK;
use crate::path;
use crate::vm::{RunStatus, Vm, VmOptions, VmState};

/// Construction-time configuration for a [`Runtime`].
#[derive(Clone)]
pub struct RuntimeOptions {
    pub grid: Grid,
    pub start: Position,
    pub goal: Goal,
    pub max_instructions_per_tick: u32,
    /// Sink for sound blocks. Defaults to a fresh [`MemoryAudioSink`].
    pub audio: Option<Arc<dyn AudioSink>>,
}

impl RuntimeOptions {
    pub fn new(goal: Goal) -> Self {
        Self {
            grid: Grid::default(),
            start: Position::new(1, 1),
            goal,
            max_instructions_per_tick: DEFAULT_INSTRUCTIONS_PER_TICK,
            audio: None,
        }
    }

    pub fn with_grid(mut self, grid: Grid) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_start(mut self, start: Position) -> Self {
        self.start = start;
        self
    }

    pub fn with_budget(mut self, max_instructions_per_tick: u32) -> Self {
        self.max_instructions_per_tick = max_instructions_per_tick;
        self
    }

    pub fn with_audio(mut self, audio: Arc<dyn AudioSink>) -> Self {
        self.audio = Some(audio);
        self
    }
}

/// One lesson attempt on the stage.
pub struct Runtime {
    vm: Vm,
    goal: Goal,
    audio: Arc<dyn AudioSink>,
}

impl Runtime {
    pub fn new(options: RuntimeOptions) -> Self {
        let audio = options
            .audio
            .unwrap_or_else(|| Arc::new(MemoryAudioSink::new()) as Arc<dyn AudioSink>);
        let vm = Vm::new(
            VmOptions::new()
                .with_grid(options.grid)
                .with_start(options.start)
                .with_goal(options.goal.clone())
                .with_budget(options.max_instructions_per_tick)
                .with_audio(Arc::clone(&audio))
                .with_record_path(options.goal.needs_path_trace()),
        );
        Self {
            vm,
            goal: options.goal,
            audio,
        }
    }

    /// Load a program and arm the machine.
    pub fn load(&mut self, blocks: &[Block]) {
        self.vm.load(blocks);
    }

    /// Execute one tick.
    pub fn step(&mut self) {
        self.vm.step();
    }

    /// Tick until the machine halts or `max_ticks` elapse.
    pub fn run_until_idle(&mut self, max_ticks: u32) -> RunStatus {
        self.vm.run_until_idle(max_ticks)
    }

    /// The live machine state.
    #[inline]
    pub fn state(&self) -> &VmState {
        self.vm.state()
    }

    /// The sink sound blocks fire into; tests inspect its events.
    #[inline]
    pub fn audio(&self) -> &Arc<dyn AudioSink> {
        &self.audio
    }

    /// The goal this attempt is judged against.
    #[inline]
    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    /// Judge the attempt against its goal.
    ///
    /// The sprite must sit on the target cell. A path goal additionally
    /// judges the route: a non-empty required path demands an exact match
    /// and wins over a pattern; with neither (or the custom pattern)
    /// reaching the target is enough.
    pub fn check_complete(&self) -> bool {
        let state = self.vm.state();
        if state.pos != self.goal.target() {
            return false;
        }
        match &self.goal {
            Goal::Reach { .. } => true,
            Goal::Path {
                required_path,
                path_pattern,
                ..
            } => {
                // An empty list on the wire means "no required path".
                if let Some(required) = required_path {
                    if !required.is_empty() {
                        return path::matches_required_path(&state.visited, required);
                    }
                }
                match path_pattern {
                    Some(PathPattern::Custom) | None => true,
                    Some(pattern) => path::matches_pattern(&state.visited, *pattern),
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
