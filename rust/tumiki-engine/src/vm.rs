//! The stage interpreter.
//!
//! Runs a lowered block program against a grid world: a sprite starts on a
//! cell, movement clamps at the edges, and execution is sliced into bounded
//! ticks so the host can animate between them. Halting is detected when the
//! frame stack empties; goals are judged afterwards by the caller.
//!
//! # Example
//!
//! ```rust
//! use tumiki_core::block::Block;
//! use tumiki_engine::vm::{Vm, VmOptions, DEFAULT_MAX_TICKS};
//!
//! let mut vm = Vm::new(VmOptions::default());
//! vm.load(&[Block::WhenFlag, Block::MoveRight { times: Some(3) }]);
//! vm.run_until_idle(DEFAULT_MAX_TICKS);
//! assert_eq!(vm.state().pos.x, 4);
//! assert!(!vm.state().running);
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tumiki_core::audio::AudioSink;
use tumiki_core::block::Block;
use tumiki_core::goal::Goal;
use tumiki_core::grid::{Grid, Position};

use crate::budget::{TickBudget, DEFAULT_INSTRUCTIONS_PER_TICK};
use crate::frame::FrameStack;
use crate::program::{LowerTarget, LoweredProgram, Node};

/// Default cap on ticks for [`Vm::run_until_idle`].
pub const DEFAULT_MAX_TICKS: u32 = 1024;

/// How a bounded run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// The program ran out of work before the tick cap.
    Completed,
    /// The tick cap elapsed with the program still running.
    TickLimit,
}

/// Construction-time configuration for a [`Vm`].
#[derive(Clone)]
pub struct VmOptions {
    pub grid: Grid,
    pub start: Position,
    pub goal: Option<Goal>,
    pub max_instructions_per_tick: u32,
    pub audio: Option<Arc<dyn AudioSink>>,
    /// Record every visited position for path goals.
    pub record_path: bool,
}

impl VmOptions {
    pub fn new() -> Self {
        Self {
            grid: Grid::default(),
            start: Position::new(1, 1),
            goal: None,
            max_instructions_per_tick: DEFAULT_INSTRUCTIONS_PER_TICK,
            audio: None,
            record_path: false,
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

    pub fn with_goal(mut self, goal: Goal) -> Self {
        self.goal = Some(goal);
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

    pub fn with_record_path(mut self, record_path: bool) -> Self {
        self.record_path = record_path;
        self
    }
}

impl Default for VmOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Read-only snapshot of the interpreter, kept live between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VmState {
    pub pos: Position,
    pub grid: Grid,
    pub goal: Option<Goal>,
    /// `false` before a program is loaded and after the run halts.
    pub running: bool,
    /// Instruction units consumed by the most recent tick.
    pub executed_this_tick: u32,
    /// Frame-stack depth at the end of the most recent tick.
    pub stack_depth: usize,
    /// Every position in visitation order, start included. Populated only
    /// when path recording is on; a clamped move that stays put still
    /// appends its (unchanged) position.
    pub visited: Vec<Position>,
}

/// The stage interpreter.
pub struct Vm {
    start: Position,
    budget: TickBudget,
    audio: Option<Arc<dyn AudioSink>>,
    record_path: bool,
    program: LoweredProgram,
    stack: FrameStack,
    state: VmState,
}

impl Vm {
    pub fn new(options: VmOptions) -> Self {
        let start = options.grid.clamp(options.start);
        let state = VmState {
            pos: start,
            grid: options.grid,
            goal: options.goal,
            running: false,
            executed_this_tick: 0,
            stack_depth: 0,
            visited: Vec::new(),
        };
        Self {
            start,
            budget: TickBudget::new(options.max_instructions_per_tick),
            audio: options.audio,
            record_path: options.record_path,
            program: LoweredProgram::default(),
            stack: FrameStack::new(),
            state,
        }
    }

    /// Load a program and arm the machine.
    ///
    /// Lowers the tree, rewinds the sprite to its start cell, and enters the
    /// running state. Material before the first top-level start marker is
    /// ignored; with no marker at all the machine halts on the first tick
    /// without doing anything.
    pub fn load(&mut self, blocks: &[Block]) {
        self.program = LoweredProgram::lower(blocks, LowerTarget::Stage);
        self.stack.reset(self.program.root());
        self.state.pos = self.start;
        self.state.running = true;
        self.state.executed_this_tick = 0;
        self.state.stack_depth = self.stack.depth();
        self.state.visited.clear();
        if self.record_path {
            self.state.visited.push(self.state.pos);
        }
    }

    /// Execute one tick: up to the configured number of instruction units.
    ///
    /// A no-op on a halted or never-loaded machine. A program that exhausts
    /// its frames exactly at a tick boundary needs one further (free) tick
    /// to observe the empty stack and halt.
    pub fn step(&mut self) {
        if !self.state.running {
            return;
        }
        self.budget.begin_tick();
        while !self.budget.is_exhausted() && self.state.running {
            match self.stack.next_node() {
                None => self.state.running = false,
                Some(idx) => self.execute(idx),
            }
        }
        self.state.executed_this_tick = self.budget.consumed();
        self.state.stack_depth = self.stack.depth();
    }

    /// Tick until the machine halts or `max_ticks` elapse.
    pub fn run_until_idle(&mut self, max_ticks: u32) -> RunStatus {
        let mut ticks = 0;
        while self.state.running && ticks < max_ticks {
            self.step();
            ticks += 1;
        }
        if self.state.running {
            RunStatus::TickLimit
        } else {
            RunStatus::Completed
        }
    }

    /// The live machine state.
    #[inline]
    pub fn state(&self) -> &VmState {
        &self.state
    }

    /// Whether the sprite currently sits on the goal cell.
    pub fn at_goal(&self) -> bool {
        match &self.state.goal {
            Some(goal) => self.state.pos == goal.target(),
            None => false,
        }
    }

    fn execute(&mut self, idx: usize) {
        let Some(node) = self.program.node(idx) else {
            return;
        };
        match node {
            Node::UnitMove { dx, dy } => {
                self.budget.charge();
                self.state.pos = self.state.grid.clamp(self.state.pos.offset(dx, dy));
                if self.record_path {
                    self.state.visited.push(self.state.pos);
                }
            }
            Node::Repeat { count, body } => {
                if count > 0 && !body.is_empty() {
                    self.stack.push_repeat(body, count);
                }
            }
            Node::PlaySound => {
                self.budget.charge();
                if let Some(audio) = &self.audio {
                    audio.play(None);
                }
            }
            // One unit each, no stage effect.
            Node::Say | Node::IfTouchGoal | Node::Reserved => {
                self.budget.charge();
            }
            Node::Marker => {}
            // Pose vocabulary cannot reach a stage lowering; treat it as
            // reserved if it ever does.
            Node::Pose { .. } | Node::PoseReset => {
                self.budget.charge();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
