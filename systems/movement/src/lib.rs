#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-frame motion planning for scrolling words.
//!
//! The planner is a pure function over the entity's position, its
//! rendered width, the surface's right-hand column budget, and the
//! word's lifecycle state. The surface's movement callback feeds it
//! once per frame and translates the verdict into a motion directive;
//! the side effects of a `Boundary` verdict (the missed path) belong to
//! the retirement system.

use derdiedas_core::LifecycleState;
use derdiedas_surface::Position;

/// Columns of slack a `Dying` word keeps before the boundary trigger
/// point. Freezing inside this window guarantees a word already being
/// retired never re-enters the boundary path, so a resolved word is
/// never additionally counted as missed.
pub const DYING_TAIL_COLUMNS: u32 = 3;

/// Outcome of planning one frame of motion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Advance to the provided position.
    Step(Position),
    /// Stay put this frame.
    Freeze,
    /// The word reached the right-hand boundary unresolved.
    Boundary,
}

/// Plans one frame of motion for a word of `word_columns` rendered
/// columns against the surface's `right_bound` column budget.
///
/// The boundary fires exactly when the column reaches
/// `right_bound - word_columns`, never earlier: at that column the last
/// character of the word touches the right edge.
#[must_use]
pub fn plan(
    position: Position,
    word_columns: u32,
    right_bound: u32,
    state: LifecycleState,
) -> Verdict {
    let trigger = i64::from(right_bound) - i64::from(word_columns);
    let column = i64::from(position.column());

    match state {
        LifecycleState::Dead => Verdict::Freeze,
        LifecycleState::Dying => {
            if column >= trigger - i64::from(DYING_TAIL_COLUMNS) {
                Verdict::Freeze
            } else {
                Verdict::Step(position.stepped_right())
            }
        }
        LifecycleState::Advancing => {
            if column >= trigger {
                Verdict::Boundary
            } else {
                Verdict::Step(position.stepped_right())
            }
        }
    }
}
