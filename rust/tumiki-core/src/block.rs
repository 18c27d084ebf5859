//! The block vocabulary shared by the stage and pose engines.
//!
//! Programs arrive as ordered trees of [`Block`] nodes, one tree per lesson
//! attempt. The wire form is internally tagged JSON (`"block": "move_right"`)
//! matching the editor's palette ids. Count fields are optional on the wire;
//! engines substitute defaults and clamp rather than reject, so a malformed
//! node can never wedge a run.

use serde::{Deserialize, Serialize};

/// Default nesting cap enforced by content validation.
pub const DEFAULT_MAX_DEPTH: usize = 3;

/// One node of a block program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "block", rename_all = "snake_case")]
pub enum Block {
    /// Sequence-start marker. Execution begins strictly after the first
    /// top-level one; nested occurrences are free no-ops.
    WhenFlag,
    /// Step right `times` cells (default 1), one cell per instruction unit.
    MoveRight { times: Option<i32> },
    /// Step left.
    MoveLeft { times: Option<i32> },
    /// Step up, toward row 1.
    MoveUp { times: Option<i32> },
    /// Step down, away from row 1.
    MoveDown { times: Option<i32> },
    /// Run `children` in order, `n` passes total (default 2).
    RepeatN {
        n: Option<i32>,
        #[serde(default)]
        children: Vec<Block>,
    },
    /// Fire-and-forget sound effect.
    PlaySound,
    /// Speech bubble keyed by localized text id. Costs one unit; rendering
    /// belongs to the host.
    Say { text_id: Option<String> },
    /// Reserved conditional. Deliberately inert: goals are judged after the
    /// run, not during it.
    IfTouchGoal,
    /// Reserved variable vocabulary; executes via the default arm.
    SetVar {
        var_name: Option<String>,
        var_value: Option<f64>,
    },
    ChangeVar {
        var_name: Option<String>,
        var_value: Option<f64>,
    },
    RepeatVar {
        var_name: Option<String>,
        #[serde(default)]
        children: Vec<Block>,
    },
    /// Pose the right arm to `angle` degrees (0-180, default 90).
    MoveRightArm { angle: Option<f64> },
    /// Pose the left arm (0-180, default 90).
    MoveLeftArm { angle: Option<f64> },
    /// Pose the right leg (0-90, default 45).
    MoveRightLeg { angle: Option<f64> },
    /// Pose the left leg (0-90, default 45).
    MoveLeftLeg { angle: Option<f64> },
    /// Turn the head (-45 to 45, default 0).
    MoveHead { angle: Option<f64> },
    /// Return every pose field to zero.
    PoseReset,
}

impl Block {
    /// Whether this node opens a nested sequence.
    pub fn children(&self) -> Option<&[Block]> {
        match self {
            Block::RepeatN { children, .. } | Block::RepeatVar { children, .. } => {
                Some(children.as_slice())
            }
            _ => None,
        }
    }
}

/// Deepest nesting level of a program. A flat list has depth 1; each
/// repeat body below it adds one. An empty program has depth 0.
pub fn max_depth(blocks: &[Block]) -> usize {
    let mut deepest = 0;
    for block in blocks {
        let here = match block.children() {
            Some(children) => 1 + max_depth(children),
            None => 1,
        };
        deepest = deepest.max(here);
    }
    deepest
}

/// Whether the program nests no deeper than `limit` levels.
pub fn depth_within(blocks: &[Block], limit: usize) -> bool {
    max_depth(blocks) <= limit
}

/// Errors raised when decoding a block program from JSON.
#[derive(Debug, thiserror::Error)]
pub enum ProgramParseError {
    /// The JSON could not be decoded into blocks.
    #[error("invalid block program: {0}")]
    Json(#[from] serde_json::Error),
    /// The tree nests deeper than the allowed limit.
    #[error("program nests {depth} levels deep (limit {limit})")]
    TooDeep { depth: usize, limit: usize },
}

/// Decode a block program from its JSON wire form.
pub fn parse_program(json: &str) -> Result<Vec<Block>, ProgramParseError> {
    Ok(serde_json::from_str(json)?)
}

/// Decode a block program and enforce the nesting cap the editor promises.
pub fn parse_program_checked(json: &str, limit: usize) -> Result<Vec<Block>, ProgramParseError> {
    let blocks = parse_program(json)?;
    let depth = max_depth(&blocks);
    if depth > limit {
        return Err(ProgramParseError::TooDeep { depth, limit });
    }
    Ok(blocks)
}
