//! The register-machine interpreter.
//!
//! Stepping is functional: [`step`] takes a program and a state and returns
//! a fresh state, never touching its input. Faults do not panic and do not
//! advance the program counter; the machine halts with a [`HaltReason`] and
//! stays fully inspectable, `pc` still pointing at the instruction that
//! failed. Backward stepping is [`replay`]: deterministic re-execution from
//! a fresh state.
//!
//! # Example
//!
//! ```rust
//! use tumiki_hrm::program::{HrmInstruction, HrmProgram};
//! use tumiki_hrm::vm::{create_state, run, HaltReason, DEFAULT_FLOOR_SIZE};
//!
//! // Echo the inbox until it runs dry.
//! let program = HrmProgram::new(vec![
//!     HrmInstruction::Label { label: "LOOP".to_string() },
//!     HrmInstruction::Inbox,
//!     HrmInstruction::Outbox,
//!     HrmInstruction::Jump { target: "LOOP".to_string() },
//! ]);
//! let state = create_state(&program, &[1, 2, 3], DEFAULT_FLOOR_SIZE);
//! let result = run(&program, state, 1_000);
//! assert_eq!(result.state.outbox, vec![1, 2, 3]);
//! assert_eq!(result.reason, Some(HaltReason::EmptyInbox));
//! ```

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::program::{HrmInstruction, HrmProgram};

/// Floor tiles available when a puzzle does not say otherwise.
pub const DEFAULT_FLOOR_SIZE: usize = 8;

/// Why a machine stopped or refused to continue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HaltReason {
    /// [`step`] was called on an already-halted machine.
    Halted,
    /// The program counter ran past the last instruction. The normal end
    /// for programs without a final loop.
    PcOob,
    /// `inbox` found nothing left. The normal end for looping programs.
    EmptyInbox,
    /// `outbox`, `copyto`, `add` or `sub` with an empty hand.
    HandEmpty,
    /// A floor address outside the floor.
    AddrOob,
    /// `copyfrom`, `add` or `sub` read an empty floor tile.
    AddrUndefined,
    /// A jump named a label that does not exist.
    LabelUndef,
}

/// Complete machine state between steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrmState {
    pub pc: usize,
    pub hand: Option<i64>,
    pub floor: Vec<Option<i64>>,
    pub inbox: VecDeque<i64>,
    pub outbox: Vec<i64>,
    pub halted: bool,
    /// Executed instructions, faulting attempts included.
    pub steps: u64,
    /// Label jump table, resolved once at state creation.
    pub labels: HashMap<String, usize>,
}

/// Result of one [`step`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepOutcome {
    pub state: HrmState,
    /// Whether the machine is now (or already was) halted.
    pub done: bool,
    pub reason: Option<HaltReason>,
}

/// Result of a bounded [`run`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrmRun {
    pub state: HrmState,
    /// Why the machine halted; `None` when the step cap cut the run short.
    pub reason: Option<HaltReason>,
    pub hit_step_limit: bool,
}

/// Build the initial state for a program and inbox.
pub fn create_state(program: &HrmProgram, inbox: &[i64], floor_size: usize) -> HrmState {
    HrmState {
        pc: 0,
        hand: None,
        floor: vec![None; floor_size],
        inbox: inbox.iter().copied().collect(),
        outbox: Vec::new(),
        halted: false,
        steps: 0,
        labels: program.build_labels(),
    }
}

fn fault(mut state: HrmState, reason: HaltReason) -> StepOutcome {
    state.halted = true;
    StepOutcome {
        state,
        done: true,
        reason: Some(reason),
    }
}

/// Execute one instruction, producing the next state.
///
/// The input state is never mutated. Stepping a halted machine returns an
/// unchanged clone with reason [`HaltReason::Halted`].
pub fn step(program: &HrmProgram, state: &HrmState) -> StepOutcome {
    if state.halted {
        return StepOutcome {
            state: state.clone(),
            done: true,
            reason: Some(HaltReason::Halted),
        };
    }
    let Some(instruction) = program.instructions.get(state.pc) else {
        return fault(state.clone(), HaltReason::PcOob);
    };

    let mut next = state.clone();
    next.steps += 1;

    match instruction {
        HrmInstruction::Label { .. } => {
            next.pc += 1;
        }
        HrmInstruction::Inbox => {
            let Some(value) = next.inbox.pop_front() else {
                return fault(next, HaltReason::EmptyInbox);
            };
            next.hand = Some(value);
            next.pc += 1;
        }
        HrmInstruction::Outbox => {
            let Some(value) = next.hand.take() else {
                return fault(next, HaltReason::HandEmpty);
            };
            next.outbox.push(value);
            next.pc += 1;
        }
        HrmInstruction::Copyfrom { addr } => {
            let Some(tile) = next.floor.get(*addr).copied() else {
                return fault(next, HaltReason::AddrOob);
            };
            let Some(value) = tile else {
                return fault(next, HaltReason::AddrUndefined);
            };
            next.hand = Some(value);
            next.pc += 1;
        }
        HrmInstruction::Copyto { addr } => {
            if *addr >= next.floor.len() {
                return fault(next, HaltReason::AddrOob);
            }
            let Some(value) = next.hand else {
                return fault(next, HaltReason::HandEmpty);
            };
            next.floor[*addr] = Some(value);
            next.pc += 1;
        }
        HrmInstruction::Add { addr } => {
            let Some(tile) = next.floor.get(*addr).copied() else {
                return fault(next, HaltReason::AddrOob);
            };
            let Some(hand) = next.hand else {
                return fault(next, HaltReason::HandEmpty);
            };
            let Some(value) = tile else {
                return fault(next, HaltReason::AddrUndefined);
            };
            next.hand = Some(hand.saturating_add(value));
            next.pc += 1;
        }
        HrmInstruction::Sub { addr } => {
            let Some(tile) = next.floor.get(*addr).copied() else {
                return fault(next, HaltReason::AddrOob);
            };
            let Some(hand) = next.hand else {
                return fault(next, HaltReason::HandEmpty);
            };
            let Some(value) = tile else {
                return fault(next, HaltReason::AddrUndefined);
            };
            next.hand = Some(hand.saturating_sub(value));
            next.pc += 1;
        }
        HrmInstruction::BumpUp { addr } => {
            let Some(tile) = next.floor.get(*addr).copied() else {
                return fault(next, HaltReason::AddrOob);
            };
            let value = tile.unwrap_or(0).saturating_add(1);
            next.floor[*addr] = Some(value);
            next.hand = Some(value);
            next.pc += 1;
        }
        HrmInstruction::BumpDown { addr } => {
            let Some(tile) = next.floor.get(*addr).copied() else {
                return fault(next, HaltReason::AddrOob);
            };
            let value = tile.unwrap_or(0).saturating_sub(1);
            next.floor[*addr] = Some(value);
            next.hand = Some(value);
            next.pc += 1;
        }
        HrmInstruction::Jump { target } => {
            let Some(dst) = next.labels.get(target).copied() else {
                return fault(next, HaltReason::LabelUndef);
            };
            next.pc = dst;
        }
        HrmInstruction::JumpIfZero { target } => {
            // The label must resolve even when the jump is not taken.
            let Some(dst) = next.labels.get(target).copied() else {
                return fault(next, HaltReason::LabelUndef);
            };
            if next.hand == Some(0) {
                next.pc = dst;
            } else {
                next.pc += 1;
            }
        }
        HrmInstruction::JumpIfNeg { target } => {
            let Some(dst) = next.labels.get(target).copied() else {
                return fault(next, HaltReason::LabelUndef);
            };
            // An empty hand counts as zero here, not as a fault.
            if next.hand.unwrap_or(0) < 0 {
                next.pc = dst;
            } else {
                next.pc += 1;
            }
        }
    }

    StepOutcome {
        state: next,
        done: false,
        reason: None,
    }
}

/// Drive a machine until it halts or `max_steps` instructions execute.
pub fn run(program: &HrmProgram, mut state: HrmState, max_steps: u64) -> HrmRun {
    while !state.halted {
        if state.steps >= max_steps {
            return HrmRun {
                state,
                reason: None,
                hit_step_limit: true,
            };
        }
        let outcome = step(program, &state);
        state = outcome.state;
        if outcome.done {
            return HrmRun {
                state,
                reason: outcome.reason,
                hit_step_limit: false,
            };
        }
    }
    HrmRun {
        state,
        reason: Some(HaltReason::Halted),
        hit_step_limit: false,
    }
}

/// Re-execute `steps` instructions from a fresh state.
///
/// Two replays to the same index produce identical states, which is how
/// hosts scrub backward through a run.
pub fn replay(program: &HrmProgram, inbox: &[i64], floor_size: usize, steps: u64) -> HrmState {
    let mut state = create_state(program, inbox, floor_size);
    for _ in 0..steps {
        if state.halted {
            break;
        }
        let outcome = step(program, &state);
        state = outcome.state;
        if outcome.done {
            break;
        }
    }
    state
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
