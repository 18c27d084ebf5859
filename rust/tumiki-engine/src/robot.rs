//! The dance interpreter.
//!
//! Same frame machinery as the stage, different effects: pose blocks write
//! clamped joint angles, `pose_reset` returns the robot to neutral, and a
//! played sound fires the audio sink and sets a flag the goal can require.
//! Completion is judged after the routine halts, against a [`DanceGoal`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tumiki_core::audio::{AudioSink, MemoryAudioSink};
use tumiki_core::block::Block;
use tumiki_core::goal::DanceGoal;

use crate::budget::{TickBudget, DEFAULT_INSTRUCTIONS_PER_TICK};
use crate::frame::FrameStack;
use crate::program::{Joint, LowerTarget, LoweredProgram, Node};
use crate::vm::RunStatus;

// ---------------------------------------------------------------------------
// Joint policy
// ---------------------------------------------------------------------------

impl Joint {
    /// Angle written when the block omits one.
    pub fn default_angle(self) -> f64 {
        match self {
            Joint::RightArm | Joint::LeftArm => 90.0,
            Joint::RightLeg | Joint::LeftLeg => 45.0,
            Joint::Head => 0.0,
        }
    }

    /// Clamp into the joint's writable range: arms 0-180, legs 0-90,
    /// head -45-45 degrees.
    pub fn clamp_angle(self, angle: f64) -> f64 {
        match self {
            Joint::RightArm | Joint::LeftArm => angle.clamp(0.0, 180.0),
            Joint::RightLeg | Joint::LeftLeg => angle.clamp(0.0, 90.0),
            Joint::Head => angle.clamp(-45.0, 45.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Pose and state
// ---------------------------------------------------------------------------

/// Joint angles in degrees. A fresh robot stands neutral at all zeros.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RobotPose {
    pub right_arm: f64,
    pub left_arm: f64,
    pub right_leg: f64,
    pub left_leg: f64,
    pub head: f64,
}

impl RobotPose {
    /// Read one joint.
    pub fn angle(&self, joint: Joint) -> f64 {
        match joint {
            Joint::RightArm => self.right_arm,
            Joint::LeftArm => self.left_arm,
            Joint::RightLeg => self.right_leg,
            Joint::LeftLeg => self.left_leg,
            Joint::Head => self.head,
        }
    }

    fn set(&mut self, joint: Joint, angle: f64) {
        match joint {
            Joint::RightArm => self.right_arm = angle,
            Joint::LeftArm => self.left_arm = angle,
            Joint::RightLeg => self.right_leg = angle,
            Joint::LeftLeg => self.left_leg = angle,
            Joint::Head => self.head = angle,
        }
    }
}

/// Read-only snapshot of the dance machine, kept live between ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RobotState {
    pub pose: RobotPose,
    /// Pose changes made so far, resets included.
    pub moves: u32,
    /// Whether any sound block has fired this run.
    pub sound_played: bool,
    pub running: bool,
    pub executed_this_tick: u32,
    pub stack_depth: usize,
}

// ---------------------------------------------------------------------------
// Runtime
// ---------------------------------------------------------------------------

/// Construction-time configuration for a [`RobotRuntime`].
#[derive(Clone)]
pub struct RobotOptions {
    pub max_instructions_per_tick: u32,
    pub goal: DanceGoal,
    /// Sink for sound blocks. Defaults to a fresh [`MemoryAudioSink`].
    pub audio: Option<Arc<dyn AudioSink>>,
}

impl RobotOptions {
    pub fn new(goal: DanceGoal) -> Self {
        Self {
            max_instructions_per_tick: DEFAULT_INSTRUCTIONS_PER_TICK,
            goal,
            audio: None,
        }
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

impl Default for RobotOptions {
    fn default() -> Self {
        Self::new(DanceGoal::default())
    }
}

/// The dance interpreter.
pub struct RobotRuntime {
    goal: DanceGoal,
    budget: TickBudget,
    program: LoweredProgram,
    stack: FrameStack,
    state: RobotState,
    audio: Arc<dyn AudioSink>,
}

impl RobotRuntime {
    pub fn new(options: RobotOptions) -> Self {
        let audio = options
            .audio
            .unwrap_or_else(|| Arc::new(MemoryAudioSink::new()) as Arc<dyn AudioSink>);
        Self {
            goal: options.goal,
            budget: TickBudget::new(options.max_instructions_per_tick),
            program: LoweredProgram::default(),
            stack: FrameStack::new(),
            state: RobotState {
                pose: RobotPose::default(),
                moves: 0,
                sound_played: false,
                running: false,
                executed_this_tick: 0,
                stack_depth: 0,
            },
            audio,
        }
    }

    /// Load a routine and arm the machine, returning the robot to neutral.
    pub fn load(&mut self, blocks: &[Block]) {
        self.program = LoweredProgram::lower(blocks, LowerTarget::Dance);
        self.stack.reset(self.program.root());
        self.state.pose = RobotPose::default();
        self.state.moves = 0;
        self.state.sound_played = false;
        self.state.running = true;
        self.state.executed_this_tick = 0;
        self.state.stack_depth = self.stack.depth();
    }

    /// Execute one tick. A no-op on a halted or never-loaded machine.
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

    /// Tick until the routine halts or `max_ticks` elapse.
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
    pub fn state(&self) -> &RobotState {
        &self.state
    }

    /// The goal this routine is judged against.
    #[inline]
    pub fn goal(&self) -> DanceGoal {
        self.goal
    }

    /// The sink sound blocks fire into; tests inspect its events.
    #[inline]
    pub fn audio(&self) -> &Arc<dyn AudioSink> {
        &self.audio
    }

    /// Judge the routine: it must have halted, made enough pose changes,
    /// and played a sound when the goal demands one.
    pub fn check_complete(&self) -> bool {
        !self.state.running
            && self.state.moves >= self.goal.min_moves
            && (!self.goal.require_sound || self.state.sound_played)
    }

    fn execute(&mut self, idx: usize) {
        let Some(node) = self.program.node(idx) else {
            return;
        };
        match node {
            Node::Pose { joint, angle } => {
                self.budget.charge();
                let value = joint.clamp_angle(angle.unwrap_or(joint.default_angle()));
                self.state.pose.set(joint, value);
                self.state.moves += 1;
            }
            Node::PoseReset => {
                self.budget.charge();
                self.state.pose = RobotPose::default();
                self.state.moves += 1;
            }
            Node::PlaySound => {
                self.budget.charge();
                self.audio.play(None);
                self.state.sound_played = true;
            }
            Node::Repeat { count, body } => {
                if count > 0 && !body.is_empty() {
                    self.stack.push_repeat(body, count);
                }
            }
            Node::Marker => {}
            // Foreign vocabulary: one unit, no pose change.
            Node::UnitMove { .. } | Node::Say | Node::IfTouchGoal | Node::Reserved => {
                self.budget.charge();
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
