//! Goal descriptors.
//!
//! Goals are judged after a run halts, never during it. The engines stay
//! unconditional; a host asks the runtime whether the finished run cleared
//! the lesson's goal.

use serde::{Deserialize, Serialize};

use crate::grid::Position;

/// Shape a visited trace must loosely follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PathPattern {
    Spiral,
    Zigzag,
    Square,
    /// Lesson-authored shape; the engine does not validate it.
    Custom,
}

/// What counts as clearing a stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Goal {
    /// Finish on the target cell.
    Reach { x: i32, y: i32 },
    /// Finish on the target cell, optionally constraining the route taken.
    Path {
        end_position: Position,
        required_path: Option<Vec<Position>>,
        path_pattern: Option<PathPattern>,
    },
}

impl Goal {
    /// The cell the sprite must finish on.
    pub fn target(&self) -> Position {
        match self {
            Goal::Reach { x, y } => Position::new(*x, *y),
            Goal::Path { end_position, .. } => *end_position,
        }
    }

    /// Whether judging this goal needs the full visited trace.
    pub fn needs_path_trace(&self) -> bool {
        matches!(self, Goal::Path { .. })
    }
}

/// Completion bar for the pose world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DanceGoal {
    /// Minimum number of pose changes the routine must make.
    pub min_moves: u32,
    /// Whether a sound must have played at least once.
    pub require_sound: bool,
}

impl Default for DanceGoal {
    fn default() -> Self {
        Self {
            min_moves: 3,
            require_sound: false,
        }
    }
}
