//! Instruction set and program form.
//!
//! Programs arrive as a flat JSON listing of internally tagged instructions
//! (`"op": "copyfrom"`), the order the editor's palette produced them in.
//! Labels are instructions too: they occupy a slot, cost a step to cross,
//! and are resolved into a jump table once at load.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// One machine instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum HrmInstruction {
    /// Jump anchor.
    Label { label: String },
    /// Take the next inbox value into the hand.
    Inbox,
    /// Drop the hand onto the outbox.
    Outbox,
    /// Load a floor tile into the hand.
    Copyfrom { addr: usize },
    /// Store the hand onto a floor tile; the hand keeps its value.
    Copyto { addr: usize },
    /// Add a floor tile to the hand.
    Add { addr: usize },
    /// Subtract a floor tile from the hand.
    Sub { addr: usize },
    /// Increment a floor tile and load the result into the hand.
    BumpUp { addr: usize },
    /// Decrement a floor tile and load the result into the hand.
    BumpDown { addr: usize },
    /// Unconditional jump to a label.
    Jump { target: String },
    /// Jump when the hand holds zero.
    JumpIfZero { target: String },
    /// Jump when the hand holds a negative value.
    JumpIfNeg { target: String },
}

impl HrmInstruction {
    /// The fieldless kind of this instruction.
    pub fn kind(&self) -> HrmOpKind {
        match self {
            HrmInstruction::Label { .. } => HrmOpKind::Label,
            HrmInstruction::Inbox => HrmOpKind::Inbox,
            HrmInstruction::Outbox => HrmOpKind::Outbox,
            HrmInstruction::Copyfrom { .. } => HrmOpKind::Copyfrom,
            HrmInstruction::Copyto { .. } => HrmOpKind::Copyto,
            HrmInstruction::Add { .. } => HrmOpKind::Add,
            HrmInstruction::Sub { .. } => HrmOpKind::Sub,
            HrmInstruction::BumpUp { .. } => HrmOpKind::BumpUp,
            HrmInstruction::BumpDown { .. } => HrmOpKind::BumpDown,
            HrmInstruction::Jump { .. } => HrmOpKind::Jump,
            HrmInstruction::JumpIfZero { .. } => HrmOpKind::JumpIfZero,
            HrmInstruction::JumpIfNeg { .. } => HrmOpKind::JumpIfNeg,
        }
    }
}

/// Fieldless mirror of [`HrmInstruction`] for palettes, constraint lists,
/// and display.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum HrmOpKind {
    Label,
    Inbox,
    Outbox,
    Copyfrom,
    Copyto,
    Add,
    Sub,
    BumpUp,
    BumpDown,
    Jump,
    JumpIfZero,
    JumpIfNeg,
}

/// An ordered instruction listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HrmProgram {
    pub instructions: Vec<HrmInstruction>,
}

impl HrmProgram {
    pub fn new(instructions: Vec<HrmInstruction>) -> Self {
        Self { instructions }
    }

    /// Decode a program from its JSON wire form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let instructions = serde_json::from_str(json)?;
        Ok(Self { instructions })
    }

    /// Map label names to their instruction index. Later duplicates win.
    pub fn build_labels(&self) -> HashMap<String, usize> {
        let mut labels = HashMap::new();
        for (idx, instruction) in self.instructions.iter().enumerate() {
            if let HrmInstruction::Label { label } = instruction {
                labels.insert(label.clone(), idx);
            }
        }
        labels
    }

    /// Total instruction count, labels included.
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
