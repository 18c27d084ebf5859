//! Per-tick instruction budgeting.
//!
//! A tick is one bounded slice of interpretation: the engine executes at most
//! `budget` instruction units, then returns control to the host so animation
//! frames, narration, and input stay responsive. Frame bookkeeping (pushing
//! and popping repeat bodies) is free; only instruction units are charged.
//!
//! The [`TickBudget`] is a plain value type owned by one interpreter and
//! touched from one thread at a time.
//!
//! # Typical usage
//!
//! ```rust
//! use tumiki_engine::budget::TickBudget;
//!
//! let mut budget = TickBudget::new(4);
//! budget.begin_tick();
//! while !budget.is_exhausted() {
//!     // … execute one instruction unit …
//!     budget.charge();
//! }
//! assert_eq!(budget.consumed(), 4);
//! ```

/// Default instruction units per tick.
///
/// Sixteen units keeps a full lesson program visibly animated over a few
/// ticks without stalling the host's frame loop.
pub const DEFAULT_INSTRUCTIONS_PER_TICK: u32 = 16;

/// Counts instruction units within the current tick.
///
/// The counter starts at `budget` and decrements by one per [`charge()`]
/// call. At zero, [`is_exhausted()`] reports `true` and further charges are
/// absorbed without underflow.
///
/// [`charge()`]: TickBudget::charge
/// [`is_exhausted()`]: TickBudget::is_exhausted
#[derive(Debug, Clone)]
pub struct TickBudget {
    /// Units remaining in the current tick.
    remaining: u32,
    /// The full allowance that [`begin_tick()`] restores.
    ///
    /// [`begin_tick()`]: TickBudget::begin_tick
    budget: u32,
}

impl TickBudget {
    /// Create a budget with the given per-tick allowance.
    pub fn new(budget: u32) -> Self {
        Self {
            remaining: budget,
            budget,
        }
    }

    /// Start a fresh tick, restoring the full allowance.
    #[inline]
    pub fn begin_tick(&mut self) {
        self.remaining = self.budget;
    }

    /// Consume one instruction unit.
    ///
    /// Returns `true` when the tick's allowance is now exhausted. Charging
    /// an already-exhausted budget stays at zero.
    #[inline]
    pub fn charge(&mut self) -> bool {
        if self.remaining == 0 {
            return true;
        }
        self.remaining -= 1;
        self.remaining == 0
    }

    /// Units still available this tick.
    #[inline]
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// The configured per-tick allowance.
    #[inline]
    pub fn budget(&self) -> u32 {
        self.budget
    }

    /// Units consumed since the tick began.
    #[inline]
    pub fn consumed(&self) -> u32 {
        self.budget.saturating_sub(self.remaining)
    }

    /// Whether the current tick has no units left.
    #[inline]
    pub fn is_exhausted(&self) -> bool {
        self.remaining == 0
    }
}

impl Default for TickBudget {
    fn default() -> Self {
        Self::new(DEFAULT_INSTRUCTIONS_PER_TICK)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
