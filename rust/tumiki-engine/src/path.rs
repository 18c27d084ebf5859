//! Route validators for path goals.
//!
//! Loose, lesson-sized heuristics over the visited trace, not geometric
//! proofs: a seven-year-old's spiral should pass, a straight dash should
//! not. The thresholds are named constants so lesson content can be checked
//! against the same numbers the engine uses. Traces shorter than two
//! positions match no pattern.

use tumiki_core::goal::PathPattern;
use tumiki_core::grid::Position;

/// Largest share of backtracking steps an outward spiral may contain.
///
/// A step "backtracks" when its Manhattan distance from the trace start
/// drops strictly below the running maximum. Plateaus ratchet the maximum
/// and count as neither.
pub const SPIRAL_MAX_BACKTRACK_RATIO: f64 = 0.3;

/// Smallest share of interior triples that must change direction in a
/// zigzag.
pub const ZIGZAG_MIN_TURN_RATIO: f64 = 0.3;

/// How close, in Manhattan distance, a square route must return to its
/// start.
pub const SQUARE_CLOSE_DISTANCE: i32 = 2;

/// Perpendicular corners a square route must show.
pub const SQUARE_MIN_CORNERS: usize = 3;

/// Exact position-for-position comparison, length included.
pub fn matches_required_path(visited: &[Position], required: &[Position]) -> bool {
    visited == required
}

/// Whether the trace loosely follows the pattern.
///
/// [`PathPattern::Custom`] always matches; its judging lives in lesson
/// content, not here.
pub fn matches_pattern(visited: &[Position], pattern: PathPattern) -> bool {
    if visited.len() < 2 {
        return false;
    }
    match pattern {
        PathPattern::Spiral => looks_like_spiral(visited),
        PathPattern::Zigzag => looks_like_zigzag(visited),
        PathPattern::Square => looks_like_square(visited),
        PathPattern::Custom => true,
    }
}

fn direction(from: Position, to: Position) -> (i32, i32) {
    (to.x - from.x, to.y - from.y)
}

/// Distance from the start should mostly ratchet outward.
fn looks_like_spiral(visited: &[Position]) -> bool {
    let start = visited[0];
    let mut max_dist = 0;
    let mut backtracks = 0usize;
    for pos in &visited[1..] {
        let dist = pos.manhattan_distance(start);
        if dist < max_dist {
            backtracks += 1;
        } else {
            max_dist = dist;
        }
    }
    (backtracks as f64) < visited.len() as f64 * SPIRAL_MAX_BACKTRACK_RATIO
}

/// Enough of the interior triples should turn.
fn looks_like_zigzag(visited: &[Position]) -> bool {
    let mut turns = 0usize;
    for window in visited.windows(3) {
        let d1 = direction(window[0], window[1]);
        let d2 = direction(window[1], window[2]);
        if d1 != d2 {
            turns += 1;
        }
    }
    let interior = visited.len().saturating_sub(2);
    turns as f64 >= interior as f64 * ZIGZAG_MIN_TURN_RATIO
}

/// Close back near the start with enough perpendicular corners.
fn looks_like_square(visited: &[Position]) -> bool {
    let start = visited[0];
    let end = visited[visited.len() - 1];
    if end.manhattan_distance(start) > SQUARE_CLOSE_DISTANCE {
        return false;
    }
    let mut corners = 0usize;
    for window in visited.windows(3) {
        let d1 = direction(window[0], window[1]);
        let d2 = direction(window[1], window[2]);
        if (d1.0 != 0 && d2.1 != 0) || (d1.1 != 0 && d2.0 != 0) {
            corners += 1;
        }
    }
    corners >= SQUARE_MIN_CORNERS
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn trace(points: &[(i32, i32)]) -> Vec<Position> {
        points.iter().map(|&(x, y)| Position::new(x, y)).collect()
    }

    // -- required path ------------------------------------------------------

    #[test]
    fn required_path_must_match_exactly() {
        let visited = trace(&[(1, 1), (2, 1), (3, 1)]);
        assert!(matches_required_path(&visited, &visited));
        assert!(!matches_required_path(&visited, &trace(&[(1, 1), (2, 1)])));
        assert!(!matches_required_path(
            &visited,
            &trace(&[(1, 1), (2, 1), (3, 2)])
        ));
    }

    // -- gate ---------------------------------------------------------------

    #[test]
    fn short_traces_match_nothing() {
        assert!(!matches_pattern(&trace(&[(1, 1)]), PathPattern::Spiral));
        assert!(!matches_pattern(&[], PathPattern::Square));
    }

    #[test]
    fn custom_always_matches() {
        assert!(matches_pattern(&trace(&[(1, 1), (2, 1)]), PathPattern::Custom));
    }

    // -- spiral -------------------------------------------------------------

    #[test]
    fn mostly_outward_route_reads_as_a_spiral() {
        // Winds away from the start the whole way, with one inward step.
        let visited = trace(&[
            (1, 1),
            (2, 1),
            (3, 1),
            (3, 2),
            (4, 2),
            (4, 3),
            (5, 3),
            (5, 4),
            (6, 4),
            (6, 5),
            (5, 5),
        ]);
        assert!(matches_pattern(&visited, PathPattern::Spiral));
    }

    #[test]
    fn shuttling_back_and_forth_is_not_a_spiral() {
        // Constant backtracking toward the start.
        let visited = trace(&[
            (1, 1),
            (2, 1),
            (3, 1),
            (2, 1),
            (1, 1),
            (2, 1),
            (3, 1),
            (2, 1),
            (1, 1),
        ]);
        assert!(!matches_pattern(&visited, PathPattern::Spiral));
    }

    // -- zigzag -------------------------------------------------------------

    #[test]
    fn alternating_steps_read_as_zigzag() {
        let visited = trace(&[(1, 1), (2, 1), (2, 2), (3, 2), (3, 3), (4, 3)]);
        assert!(matches_pattern(&visited, PathPattern::Zigzag));
    }

    #[test]
    fn straight_dash_is_not_a_zigzag() {
        let visited = trace(&[(1, 1), (2, 1), (3, 1), (4, 1), (5, 1), (6, 1)]);
        assert!(!matches_pattern(&visited, PathPattern::Zigzag));
    }

    // -- square -------------------------------------------------------------

    #[test]
    fn closed_rectangle_reads_as_a_square() {
        let visited = trace(&[
            (2, 2),
            (3, 2),
            (4, 2),
            (4, 3),
            (4, 4),
            (3, 4),
            (2, 4),
            (2, 3),
            (2, 2),
        ]);
        assert!(matches_pattern(&visited, PathPattern::Square));
    }

    #[test]
    fn open_ended_route_is_not_a_square() {
        // Plenty of corners but finishes far from the start.
        let visited = trace(&[(1, 1), (2, 1), (2, 2), (3, 2), (3, 3), (4, 3), (4, 4), (5, 4)]);
        assert!(!matches_pattern(&visited, PathPattern::Square));
    }

    #[test]
    fn returning_without_corners_is_not_a_square() {
        let visited = trace(&[(1, 1), (2, 1), (3, 1), (2, 1), (1, 1)]);
        assert!(!matches_pattern(&visited, PathPattern::Square));
    }
}
