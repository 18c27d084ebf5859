//! Puzzle definitions and the clearance check.
//!
//! A [`HrmChallenge`] pairs an inbox with the outbox a correct program must
//! produce, plus optional [`HrmConstraints`] on program shape and runtime.
//! [`HrmChallenge::evaluate`] runs the program under a step ceiling and
//! reports every violation it finds, not just the first.
//!
//! # Example
//!
//! ```rust
//! use tumiki_hrm::challenge::HrmChallenge;
//! use tumiki_hrm::program::HrmProgram;
//!
//! let program = HrmProgram::from_json(
//!     r#"[
//!         {"op": "label", "label": "LOOP"},
//!         {"op": "inbox"},
//!         {"op": "outbox"},
//!         {"op": "jump", "target": "LOOP"}
//!     ]"#,
//! )
//! .unwrap();
//! let challenge = HrmChallenge::new(vec![4, 8, 15], vec![4, 8, 15]);
//! let report = challenge.evaluate(&program);
//! assert!(report.cleared);
//! ```

use serde::{Deserialize, Serialize};

use crate::program::{HrmOpKind, HrmProgram};
use crate::vm::{create_state, run, HaltReason, HrmState, DEFAULT_FLOOR_SIZE};

/// Step ceiling applied when a challenge does not set its own.
pub const DEFAULT_STEP_CEILING: u64 = 10_000;

/// Optional limits a challenge places on solutions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HrmConstraints {
    /// Maximum program length, labels included.
    pub size_max: Option<usize>,
    /// Step ceiling overriding [`DEFAULT_STEP_CEILING`].
    pub step_max: Option<u64>,
    /// Ops the solution must not use.
    #[serde(default)]
    pub banned_ops: Vec<HrmOpKind>,
    /// Ops the solution must use at least once.
    #[serde(default)]
    pub required_ops: Vec<HrmOpKind>,
}

/// One delivery puzzle: an inbox and the outbox a solution must produce.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HrmChallenge {
    pub inbox: Vec<i64>,
    pub expected_outbox: Vec<i64>,
    #[serde(default = "default_floor_size")]
    pub floor_size: usize,
    #[serde(default)]
    pub constraints: HrmConstraints,
}

fn default_floor_size() -> usize {
    DEFAULT_FLOOR_SIZE
}

/// A way the submitted program fell short.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChallengeViolation {
    /// The outbox did not match the expected deliveries.
    #[error("outbox mismatch: expected {expected:?}, got {actual:?}")]
    OutboxMismatch { expected: Vec<i64>, actual: Vec<i64> },
    /// The program is longer than the challenge allows.
    #[error("program has {size} instructions (limit {limit})")]
    TooLong { size: usize, limit: usize },
    /// The run was cut off by the step ceiling.
    #[error("run exceeded the {limit} step ceiling")]
    StepLimit { limit: u64 },
    /// The program uses an op the challenge bans.
    #[error("program uses banned op {op}")]
    BannedOp { op: HrmOpKind },
    /// The program never uses an op the challenge requires.
    #[error("program never uses required op {op}")]
    MissingRequiredOp { op: HrmOpKind },
    /// The machine faulted instead of finishing its deliveries.
    #[error("machine faulted: {reason}")]
    AbnormalHalt { reason: HaltReason },
}

/// Everything [`HrmChallenge::evaluate`] found out about a submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeReport {
    pub cleared: bool,
    pub violations: Vec<ChallengeViolation>,
    /// The machine as it stood when the run ended.
    pub final_state: HrmState,
}

impl HrmChallenge {
    pub fn new(inbox: Vec<i64>, expected_outbox: Vec<i64>) -> Self {
        Self {
            inbox,
            expected_outbox,
            floor_size: DEFAULT_FLOOR_SIZE,
            constraints: HrmConstraints::default(),
        }
    }

    pub fn with_floor_size(mut self, floor_size: usize) -> Self {
        self.floor_size = floor_size;
        self
    }

    pub fn with_constraints(mut self, constraints: HrmConstraints) -> Self {
        self.constraints = constraints;
        self
    }

    /// Run `program` against this challenge and collect every violation.
    ///
    /// Static checks come first, then a bounded run. Running out of inbox
    /// or off the end of the program are both normal endings; every other
    /// halt is a fault and reported as such.
    pub fn evaluate(&self, program: &HrmProgram) -> ChallengeReport {
        let mut violations = Vec::new();

        if let Some(limit) = self.constraints.size_max {
            let size = program.len();
            if size > limit {
                violations.push(ChallengeViolation::TooLong { size, limit });
            }
        }
        for op in &self.constraints.banned_ops {
            if program.instructions.iter().any(|i| i.kind() == *op) {
                violations.push(ChallengeViolation::BannedOp { op: *op });
            }
        }
        for op in &self.constraints.required_ops {
            if !program.instructions.iter().any(|i| i.kind() == *op) {
                violations.push(ChallengeViolation::MissingRequiredOp { op: *op });
            }
        }

        let ceiling = self.constraints.step_max.unwrap_or(DEFAULT_STEP_CEILING);
        let start = create_state(program, &self.inbox, self.floor_size);
        let result = run(program, start, ceiling);

        if result.hit_step_limit {
            violations.push(ChallengeViolation::StepLimit { limit: ceiling });
        } else if let Some(reason) = result.reason {
            if !matches!(reason, HaltReason::EmptyInbox | HaltReason::PcOob) {
                violations.push(ChallengeViolation::AbnormalHalt { reason });
            }
        }

        if result.state.outbox != self.expected_outbox {
            violations.push(ChallengeViolation::OutboxMismatch {
                expected: self.expected_outbox.clone(),
                actual: result.state.outbox.clone(),
            });
        }

        ChallengeReport {
            cleared: violations.is_empty(),
            violations,
            final_state: result.state,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::HrmInstruction;

    fn echo_program() -> HrmProgram {
        HrmProgram::new(vec![
            HrmInstruction::Label {
                label: "LOOP".to_string(),
            },
            HrmInstruction::Inbox,
            HrmInstruction::Outbox,
            HrmInstruction::Jump {
                target: "LOOP".to_string(),
            },
        ])
    }

    #[test]
    fn a_correct_solution_clears() {
        let challenge = HrmChallenge::new(vec![1, 2, 3], vec![1, 2, 3]);
        let report = challenge.evaluate(&echo_program());
        assert!(report.cleared);
        assert!(report.violations.is_empty());
        assert_eq!(report.final_state.outbox, vec![1, 2, 3]);
    }

    #[test]
    fn a_wrong_outbox_is_a_mismatch() {
        let challenge = HrmChallenge::new(vec![1, 2], vec![2, 1]);
        let report = challenge.evaluate(&echo_program());
        assert!(!report.cleared);
        assert_eq!(
            report.violations,
            vec![ChallengeViolation::OutboxMismatch {
                expected: vec![2, 1],
                actual: vec![1, 2],
            }]
        );
    }

    #[test]
    fn banned_ops_are_flagged() {
        let challenge = HrmChallenge::new(vec![1], vec![1]).with_constraints(HrmConstraints {
            banned_ops: vec![HrmOpKind::Jump],
            ..HrmConstraints::default()
        });
        let report = challenge.evaluate(&echo_program());
        assert!(report
            .violations
            .contains(&ChallengeViolation::BannedOp { op: HrmOpKind::Jump }));
    }

    #[test]
    fn missing_required_ops_are_flagged() {
        let challenge = HrmChallenge::new(vec![1], vec![1]).with_constraints(HrmConstraints {
            required_ops: vec![HrmOpKind::Copyto],
            ..HrmConstraints::default()
        });
        let report = challenge.evaluate(&echo_program());
        assert!(!report.cleared);
        assert!(report
            .violations
            .contains(&ChallengeViolation::MissingRequiredOp {
                op: HrmOpKind::Copyto,
            }));
    }

    #[test]
    fn size_limits_count_labels() {
        // The echo program is four instructions, one of them a label.
        let challenge = HrmChallenge::new(vec![1], vec![1]).with_constraints(HrmConstraints {
            size_max: Some(3),
            ..HrmConstraints::default()
        });
        let report = challenge.evaluate(&echo_program());
        assert!(report
            .violations
            .contains(&ChallengeViolation::TooLong { size: 4, limit: 3 }));

        let relaxed = HrmChallenge::new(vec![1], vec![1]).with_constraints(HrmConstraints {
            size_max: Some(4),
            ..HrmConstraints::default()
        });
        assert!(relaxed.evaluate(&echo_program()).cleared);
    }

    #[test]
    fn spinning_forever_hits_the_step_ceiling() {
        let program = HrmProgram::new(vec![
            HrmInstruction::Label {
                label: "SPIN".to_string(),
            },
            HrmInstruction::Jump {
                target: "SPIN".to_string(),
            },
        ]);
        let challenge = HrmChallenge::new(vec![], vec![]).with_constraints(HrmConstraints {
            step_max: Some(50),
            ..HrmConstraints::default()
        });
        let report = challenge.evaluate(&program);
        assert!(report
            .violations
            .contains(&ChallengeViolation::StepLimit { limit: 50 }));
        assert_eq!(report.final_state.steps, 50);
    }

    #[test]
    fn faults_are_reported_as_abnormal_halts() {
        let program = HrmProgram::new(vec![HrmInstruction::Copyfrom { addr: 0 }]);
        let challenge = HrmChallenge::new(vec![], vec![]);
        let report = challenge.evaluate(&program);
        assert!(report.violations.contains(&ChallengeViolation::AbnormalHalt {
            reason: HaltReason::AddrUndefined,
        }));
    }

    #[test]
    fn running_off_the_end_is_a_normal_finish() {
        let program = HrmProgram::new(vec![HrmInstruction::Inbox, HrmInstruction::Outbox]);
        let challenge = HrmChallenge::new(vec![9], vec![9]);
        assert!(challenge.evaluate(&program).cleared);
    }

    #[test]
    fn challenges_decode_with_defaults() {
        let challenge: HrmChallenge =
            serde_json::from_str(r#"{"inbox": [1, 2], "expected_outbox": [3]}"#).unwrap();
        assert_eq!(challenge.floor_size, DEFAULT_FLOOR_SIZE);
        assert_eq!(challenge.constraints, HrmConstraints::default());

        let challenge: HrmChallenge = serde_json::from_str(
            r#"{
                "inbox": [],
                "expected_outbox": [],
                "floor_size": 4,
                "constraints": {"size_max": 10, "banned_ops": ["bump_up"]}
            }"#,
        )
        .unwrap();
        assert_eq!(challenge.floor_size, 4);
        assert_eq!(challenge.constraints.size_max, Some(10));
        assert_eq!(challenge.constraints.banned_ops, vec![HrmOpKind::BumpUp]);
        assert_eq!(challenge.constraints.step_max, None);
    }
}
