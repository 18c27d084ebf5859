//! Lowering block trees into a flat, interpretable form.
//!
//! The engines never walk the [`Block`] tree directly. [`LoweredProgram::lower`]
//! compiles it into a flat arena of [`Node`]s where every sibling list
//! occupies one contiguous [`NodeRange`], and execution frames advance a
//! cursor through a range. Two properties fall out of the lowering:
//!
//! - A movement block with a repeat count becomes that many single-cell
//!   nodes, so each node costs at most one instruction unit and a compound
//!   move resumes exactly where it stopped when the tick budget runs out
//!   mid-way.
//! - Vocabulary foreign to the target world (pose blocks on the stage, grid
//!   moves in the dance world) becomes a single [`Node::Reserved`] unit, the
//!   engines' explicit default arm.
//!
//! Lowering is total: malformed counts clamp to zero instead of failing.
//!
//! [`Block`]: tumiki_core::block::Block

use serde::{Deserialize, Serialize};
use tumiki_core::block::Block;

/// Which world the lowered form will run in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowerTarget {
    /// Grid world: movement is native, pose vocabulary is reserved.
    Stage,
    /// Pose world: pose vocabulary is native, movement is reserved.
    Dance,
}

/// A robot joint addressed by the pose vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Joint {
    RightArm,
    LeftArm,
    RightLeg,
    LeftLeg,
    Head,
}

/// Half-open span of sibling nodes in the arena.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRange {
    pub start: usize,
    pub end: usize,
}

impl NodeRange {
    pub const EMPTY: NodeRange = NodeRange { start: 0, end: 0 };

    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// One executable node in the lowered form.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Single-cell movement; one instruction unit.
    UnitMove { dx: i32, dy: i32 },
    /// Enter `body` for `count` passes. Frame bookkeeping only, free.
    Repeat { count: i32, body: NodeRange },
    /// Emit one audio event; one unit.
    PlaySound,
    /// Speech bubble; one unit, rendering belongs to the host.
    Say,
    /// Inert conditional; one unit, no effect.
    IfTouchGoal,
    /// Nested start marker; free.
    Marker,
    /// Pose one joint; one unit. `angle` keeps the block's raw value, the
    /// dance engine substitutes the joint default and clamps.
    Pose { joint: Joint, angle: Option<f64> },
    /// Zero every joint; one unit.
    PoseReset,
    /// Foreign or reserved vocabulary; one unit, no effect.
    Reserved,
}

/// A block program compiled for one target world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LoweredProgram {
    nodes: Vec<Node>,
    root: NodeRange,
}

impl LoweredProgram {
    /// Lower a program tree for the given world.
    ///
    /// Execution material begins strictly after the first top-level
    /// [`Block::WhenFlag`]; without one the root range is empty and the
    /// program halts immediately when run.
    pub fn lower(blocks: &[Block], target: LowerTarget) -> Self {
        let executable = match blocks.iter().position(|b| matches!(b, Block::WhenFlag)) {
            Some(flag) => &blocks[flag + 1..],
            None => &[][..],
        };
        let mut program = Self {
            nodes: Vec::new(),
            root: NodeRange::EMPTY,
        };
        program.root = program.lower_sequence(executable, target);
        program
    }

    /// The top-level executable range.
    #[inline]
    pub fn root(&self) -> NodeRange {
        self.root
    }

    /// Fetch a node by arena index.
    #[inline]
    pub fn node(&self, idx: usize) -> Option<Node> {
        self.nodes.get(idx).copied()
    }

    /// Total number of lowered nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Lower one sibling list into a contiguous range.
    ///
    /// The range is reserved up front with placeholder nodes so that nested
    /// bodies, appended during the fill, land after it rather than inside.
    fn lower_sequence(&mut self, blocks: &[Block], target: LowerTarget) -> NodeRange {
        let slots: usize = blocks.iter().map(|b| slot_count(b, target)).sum();
        let start = self.nodes.len();
        let end = start + slots;
        self.nodes.resize(end, Node::Marker);

        let mut at = start;
        for block in blocks {
            match block {
                Block::WhenFlag => {
                    self.nodes[at] = Node::Marker;
                    at += 1;
                }
                Block::MoveRight { times } => at = self.fill_move(at, target, 1, 0, *times),
                Block::MoveLeft { times } => at = self.fill_move(at, target, -1, 0, *times),
                Block::MoveUp { times } => at = self.fill_move(at, target, 0, -1, *times),
                Block::MoveDown { times } => at = self.fill_move(at, target, 0, 1, *times),
                Block::RepeatN { n, children } => {
                    let count = n.unwrap_or(2).max(0);
                    let body = self.lower_sequence(children, target);
                    self.nodes[at] = Node::Repeat { count, body };
                    at += 1;
                }
                Block::PlaySound => {
                    self.nodes[at] = Node::PlaySound;
                    at += 1;
                }
                Block::Say { .. } => {
                    self.nodes[at] = Node::Say;
                    at += 1;
                }
                Block::IfTouchGoal => {
                    self.nodes[at] = Node::IfTouchGoal;
                    at += 1;
                }
                Block::SetVar { .. } | Block::ChangeVar { .. } | Block::RepeatVar { .. } => {
                    // Reserved vocabulary: one unit, children never run.
                    self.nodes[at] = Node::Reserved;
                    at += 1;
                }
                Block::MoveRightArm { angle } => {
                    at = self.fill_pose(at, target, Joint::RightArm, *angle)
                }
                Block::MoveLeftArm { angle } => {
                    at = self.fill_pose(at, target, Joint::LeftArm, *angle)
                }
                Block::MoveRightLeg { angle } => {
                    at = self.fill_pose(at, target, Joint::RightLeg, *angle)
                }
                Block::MoveLeftLeg { angle } => {
                    at = self.fill_pose(at, target, Joint::LeftLeg, *angle)
                }
                Block::MoveHead { angle } => at = self.fill_pose(at, target, Joint::Head, *angle),
                Block::PoseReset => {
                    self.nodes[at] = match target {
                        LowerTarget::Dance => Node::PoseReset,
                        LowerTarget::Stage => Node::Reserved,
                    };
                    at += 1;
                }
            }
        }
        debug_assert_eq!(at, end);
        NodeRange { start, end }
    }

    fn fill_move(
        &mut self,
        mut at: usize,
        target: LowerTarget,
        dx: i32,
        dy: i32,
        times: Option<i32>,
    ) -> usize {
        match target {
            LowerTarget::Stage => {
                for _ in 0..unit_count(times) {
                    self.nodes[at] = Node::UnitMove { dx, dy };
                    at += 1;
                }
            }
            LowerTarget::Dance => {
                self.nodes[at] = Node::Reserved;
                at += 1;
            }
        }
        at
    }

    fn fill_pose(
        &mut self,
        at: usize,
        target: LowerTarget,
        joint: Joint,
        angle: Option<f64>,
    ) -> usize {
        self.nodes[at] = match target {
            LowerTarget::Dance => Node::Pose { joint, angle },
            LowerTarget::Stage => Node::Reserved,
        };
        at + 1
    }
}

/// Arena slots one block occupies for the given target.
fn slot_count(block: &Block, target: LowerTarget) -> usize {
    match (block, target) {
        (
            Block::MoveRight { times }
            | Block::MoveLeft { times }
            | Block::MoveUp { times }
            | Block::MoveDown { times },
            LowerTarget::Stage,
        ) => unit_count(*times),
        _ => 1,
    }
}

/// Unit-move count for a movement block: missing defaults to one, negative
/// clamps to zero.
fn unit_count(times: Option<i32>) -> usize {
    times.unwrap_or(1).max(0) as usize
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn lower_stage(blocks: &[Block]) -> LoweredProgram {
        LoweredProgram::lower(blocks, LowerTarget::Stage)
    }

    #[test]
    fn default_program_is_empty_with_an_empty_root() {
        // The not-loaded placeholder the engines start from.
        let program = LoweredProgram::default();
        assert!(program.is_empty());
        assert!(program.root().is_empty());
        assert_eq!(NodeRange::default(), NodeRange::EMPTY);
    }

    #[test]
    fn program_without_start_marker_lowers_empty() {
        let program = lower_stage(&[Block::MoveRight { times: Some(3) }]);
        assert!(program.root().is_empty());
        assert!(program.is_empty());
    }

    #[test]
    fn compound_move_expands_to_unit_nodes() {
        let program = lower_stage(&[Block::WhenFlag, Block::MoveRight { times: Some(3) }]);
        assert_eq!(program.root().len(), 3);
        for idx in program.root().start..program.root().end {
            assert_eq!(program.node(idx), Some(Node::UnitMove { dx: 1, dy: 0 }));
        }
    }

    #[test]
    fn missing_count_defaults_to_one_and_negative_to_zero() {
        let program = lower_stage(&[
            Block::WhenFlag,
            Block::MoveUp { times: None },
            Block::MoveDown { times: Some(-2) },
        ]);
        // One unit for the default, none for the negative count.
        assert_eq!(program.root().len(), 1);
        assert_eq!(
            program.node(program.root().start),
            Some(Node::UnitMove { dx: 0, dy: -1 })
        );
    }

    #[test]
    fn repeat_body_lands_after_the_sibling_range() {
        let program = lower_stage(&[
            Block::WhenFlag,
            Block::RepeatN {
                n: Some(3),
                children: vec![Block::MoveRight { times: Some(2) }],
            },
            Block::PlaySound,
        ]);
        let root = program.root();
        assert_eq!(root.len(), 2);
        let Some(Node::Repeat { count, body }) = program.node(root.start) else {
            panic!("expected a repeat node");
        };
        assert_eq!(count, 3);
        assert_eq!(program.node(root.start + 1), Some(Node::PlaySound));
        // Body range sits past the root range and holds the two unit moves.
        assert!(body.start >= root.end);
        assert_eq!(body.len(), 2);
    }

    #[test]
    fn nested_start_markers_become_free_markers() {
        let program = lower_stage(&[Block::WhenFlag, Block::WhenFlag, Block::PlaySound]);
        assert_eq!(program.node(program.root().start), Some(Node::Marker));
    }

    #[test]
    fn foreign_vocabulary_lowers_to_one_reserved_unit() {
        // Pose blocks on the stage.
        let stage = lower_stage(&[Block::WhenFlag, Block::MoveRightArm { angle: Some(120.0) }]);
        assert_eq!(stage.node(stage.root().start), Some(Node::Reserved));

        // Grid moves in the dance world collapse regardless of their count.
        let dance = LoweredProgram::lower(
            &[Block::WhenFlag, Block::MoveRight { times: Some(5) }],
            LowerTarget::Dance,
        );
        assert_eq!(dance.root().len(), 1);
        assert_eq!(dance.node(dance.root().start), Some(Node::Reserved));
    }

    #[test]
    fn variable_vocabulary_is_reserved_and_children_never_lower() {
        let program = lower_stage(&[
            Block::WhenFlag,
            Block::RepeatVar {
                var_name: Some("count".to_string()),
                children: vec![Block::MoveRight { times: Some(5) }],
            },
        ]);
        assert_eq!(program.root().len(), 1);
        assert_eq!(program.len(), 1);
        assert_eq!(program.node(program.root().start), Some(Node::Reserved));
    }
}
