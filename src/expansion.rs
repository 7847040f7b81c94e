//! Window expansion planning and entity coordinate shifting.
//!
//! Movement hands the engine a window-local target; if it falls outside
//! the window, the engine grows the window by whole chunks on whichever
//! edges are short. A diagonal overflow is two independent expansions, and
//! each edge must fully complete (tile fill, fog resize, entity shift,
//! POI scan) before the next begins, because strip fill depends on the
//! origin the previous edge may have moved.

use crate::window::WorldWindow;

/// One window edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    Left,
    Right,
    Top,
    Bottom,
}

impl Edge {
    pub fn name(&self) -> &'static str {
        match self {
            Edge::Left => "left",
            Edge::Right => "right",
            Edge::Top => "top",
            Edge::Bottom => "bottom",
        }
    }
}

/// A planned strip: grow `tiles` tiles on `edge`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Strip {
    pub edge: Edge,
    pub tiles: usize,
}

/// Whether a left/top expansion shifts window-local entity coordinates.
///
/// `Apply` is the normal case: entities keep pointing at the same world
/// tile because their local coordinates move with the content. `Suppress`
/// exists for mode transitions where the caller re-derives coordinates
/// itself and a shift would read as a one-frame camera snap; suppressing
/// at any other time corrupts entity positions, so the choice is an
/// explicit parameter rather than ambient state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShiftPolicy {
    Apply,
    Suppress,
}

/// Collaborator-owned window-local positions that must follow a left/top
/// expansion. The player and entity arrays live outside this engine, so
/// the engine only sees this seam.
pub trait ShiftEntities {
    fn shift(&mut self, dx: i64, dy: i64);
}

/// No entities to shift.
impl ShiftEntities for () {
    fn shift(&mut self, _dx: i64, _dy: i64) {}
}

/// A window-local position.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Pos {
    pub x: i64,
    pub y: i64,
}

impl ShiftEntities for Pos {
    fn shift(&mut self, dx: i64, dy: i64) {
        self.x += dx;
        self.y += dy;
    }
}

impl<T: ShiftEntities> ShiftEntities for Vec<T> {
    fn shift(&mut self, dx: i64, dy: i64) {
        for item in self.iter_mut() {
            item.shift(dx, dy);
        }
    }
}

impl<A: ShiftEntities, B: ShiftEntities> ShiftEntities for (A, B) {
    fn shift(&mut self, dx: i64, dy: i64) {
        self.0.shift(dx, dy);
        self.1.shift(dx, dy);
    }
}

impl<T: ShiftEntities + ?Sized> ShiftEntities for &mut T {
    fn shift(&mut self, dx: i64, dy: i64) {
        (**self).shift(dx, dy);
    }
}

/// Round `needed` up to whole chunks.
fn chunks_for(needed: i64, chunk: usize) -> usize {
    let chunk = chunk as i64;
    (((needed + chunk - 1) / chunk) * chunk) as usize
}

/// Compute the strips required to bring a window-local target coordinate
/// in bounds. Empty when the target is already inside or the chunk size
/// is zero (both are no-ops, not errors). The two axes are independent;
/// the x strip is listed first.
pub fn plan_expansions(window: &WorldWindow, tx: i64, ty: i64, chunk: usize) -> Vec<Strip> {
    let mut plan = Vec::new();
    if chunk == 0 {
        return plan;
    }
    let (cols, rows) = (window.cols() as i64, window.rows() as i64);
    if tx < 0 {
        plan.push(Strip { edge: Edge::Left, tiles: chunks_for(-tx, chunk) });
    } else if tx >= cols {
        plan.push(Strip { edge: Edge::Right, tiles: chunks_for(tx - cols + 1, chunk) });
    }
    if ty < 0 {
        plan.push(Strip { edge: Edge::Top, tiles: chunks_for(-ty, chunk) });
    } else if ty >= rows {
        plan.push(Strip { edge: Edge::Bottom, tiles: chunks_for(ty - rows + 1, chunk) });
    }
    plan
}

/// The window-local rectangle a just-applied strip occupies, for the
/// post-expansion POI scan. Must be called after the grow.
pub fn strip_rect(window: &WorldWindow, strip: Strip) -> (usize, usize, usize, usize) {
    let (cols, rows) = (window.cols(), window.rows());
    match strip.edge {
        Edge::Left => (0, 0, strip.tiles, rows),
        Edge::Right => (cols - strip.tiles, 0, strip.tiles, rows),
        Edge::Top => (0, 0, cols, strip.tiles),
        Edge::Bottom => (0, rows - strip.tiles, cols, strip.tiles),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::Generator;

    fn window() -> (Generator, WorldWindow) {
        let gen = Generator::new(42);
        let w = WorldWindow::build(&gen, 40, 30).unwrap();
        (gen, w)
    }

    #[test]
    fn test_in_bounds_target_plans_nothing() {
        let (_, w) = window();
        assert!(plan_expansions(&w, 0, 0, 16).is_empty());
        assert!(plan_expansions(&w, 39, 29, 16).is_empty());
    }

    #[test]
    fn test_zero_chunk_is_a_no_op() {
        let (_, w) = window();
        assert!(plan_expansions(&w, -5, 0, 0).is_empty());
    }

    #[test]
    fn test_left_overflow_rounds_to_chunks() {
        let (_, w) = window();
        let plan = plan_expansions(&w, -1, 5, 16);
        assert_eq!(plan, vec![Strip { edge: Edge::Left, tiles: 16 }]);
        let plan = plan_expansions(&w, -17, 5, 16);
        assert_eq!(plan, vec![Strip { edge: Edge::Left, tiles: 32 }]);
    }

    #[test]
    fn test_right_overflow() {
        let (_, w) = window();
        // cols = 40; local x 40 is one past the edge.
        let plan = plan_expansions(&w, 40, 5, 16);
        assert_eq!(plan, vec![Strip { edge: Edge::Right, tiles: 16 }]);
    }

    #[test]
    fn test_diagonal_overflow_is_two_strips() {
        let (_, w) = window();
        let plan = plan_expansions(&w, -3, 31, 8);
        assert_eq!(
            plan,
            vec![
                Strip { edge: Edge::Left, tiles: 8 },
                Strip { edge: Edge::Bottom, tiles: 8 },
            ]
        );
    }

    #[test]
    fn test_strip_rect_after_grow() {
        let (gen, mut w) = window();
        let strip = Strip { edge: Edge::Top, tiles: 8 };
        w.grow(strip.edge, strip.tiles, &gen);
        assert_eq!(strip_rect(&w, strip), (0, 0, 40, 8));

        let strip = Strip { edge: Edge::Right, tiles: 16 };
        w.grow(strip.edge, strip.tiles, &gen);
        assert_eq!(strip_rect(&w, strip), (40, 0, 16, 38));
    }

    #[test]
    fn test_shift_targets() {
        let mut player = Pos { x: 3, y: 4 };
        let mut enemies = vec![Pos { x: 0, y: 0 }, Pos { x: 9, y: 9 }];
        (&mut player, &mut enemies).shift(16, 0);
        assert_eq!(player, Pos { x: 19, y: 4 });
        assert_eq!(enemies[1], Pos { x: 25, y: 9 });
    }
}
