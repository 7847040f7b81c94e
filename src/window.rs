//! The materialized window onto the unbounded world.
//!
//! A `WorldWindow` owns a rectangular cache of derived tiles anchored at a
//! world-coordinate origin, plus the fog-of-war grids that track what the
//! player has seen. The cache is never the source of truth: every cell
//! must equal the generator's answer for its absolute coordinate, with the
//! single sanctioned exception of ford conversions, which are enumerated
//! in an overlay by the bridge synthesizer.

use crate::biome::Tile;
use crate::error::WorldError;
use crate::expansion::Edge;
use crate::generator::Generator;
use crate::grid::Grid;

pub struct WorldWindow {
    origin_x: i64,
    origin_y: i64,
    tiles: Grid<Tile>,
    /// Tiles the player has ever seen. Owned here, mutated by the external
    /// visibility subsystem, resized in lock-step with the tiles.
    pub seen: Grid<bool>,
    /// Tiles currently in view. Same ownership rules as `seen`.
    pub visible: Grid<bool>,
}

impl WorldWindow {
    /// Materialize the initial window so the generator's start position
    /// lands at the centre.
    pub fn build(gen: &Generator, cols: usize, rows: usize) -> Result<Self, WorldError> {
        let (start_x, start_y) = gen.pick_start();
        let origin_x = start_x - cols as i64 / 2;
        let origin_y = start_y - rows as i64 / 2;
        Self::materialize(gen, origin_x, origin_y, cols, rows)
    }

    /// Materialize a window at an explicit origin (used by save/load,
    /// where the origin is restored rather than re-picked).
    pub fn materialize(
        gen: &Generator,
        origin_x: i64,
        origin_y: i64,
        cols: usize,
        rows: usize,
    ) -> Result<Self, WorldError> {
        if cols == 0 || rows == 0 {
            return Err(WorldError::EmptyWindow { cols, rows });
        }
        let tiles = Grid::from_fn(cols, rows, |x, y| {
            gen.tile_at(origin_x + x as i64, origin_y + y as i64)
        });
        Ok(Self {
            origin_x,
            origin_y,
            tiles,
            seen: Grid::new_with(cols, rows, false),
            visible: Grid::new_with(cols, rows, false),
        })
    }

    pub fn cols(&self) -> usize {
        self.tiles.width()
    }

    pub fn rows(&self) -> usize {
        self.tiles.height()
    }

    /// World coordinate of the window's top-left cell.
    pub fn origin(&self) -> (i64, i64) {
        (self.origin_x, self.origin_y)
    }

    /// Tile at a window-local cell.
    pub fn tile(&self, x: usize, y: usize) -> Tile {
        *self.tiles.get(x, y)
    }

    /// Tile at a world coordinate, if materialized.
    pub fn world_tile(&self, wx: i64, wy: i64) -> Option<Tile> {
        let (lx, ly) = (wx - self.origin_x, wy - self.origin_y);
        if self.tiles.contains(lx, ly) {
            Some(*self.tiles.get(lx as usize, ly as usize))
        } else {
            None
        }
    }

    pub fn to_world(&self, x: usize, y: usize) -> (i64, i64) {
        (self.origin_x + x as i64, self.origin_y + y as i64)
    }

    pub fn to_local(&self, wx: i64, wy: i64) -> Option<(usize, usize)> {
        let (lx, ly) = (wx - self.origin_x, wy - self.origin_y);
        if self.tiles.contains(lx, ly) {
            Some((lx as usize, ly as usize))
        } else {
            None
        }
    }

    /// Whether a signed window-local coordinate is inside the window.
    pub fn contains_local(&self, x: i64, y: i64) -> bool {
        self.tiles.contains(x, y)
    }

    /// Overwrite one materialized cell. Crate-private: the only caller is
    /// the ford synthesizer, which records every converted coordinate in
    /// its overlay.
    pub(crate) fn set_tile(&mut self, x: usize, y: usize, tile: Tile) {
        self.tiles.set(x, y, tile);
    }

    /// Grow the window by `k` tiles on one edge, filling the new strip
    /// from the generator. Left/top growth re-anchors the origin first so
    /// the old content keeps its absolute coordinates; fog strips default
    /// to unseen.
    pub(crate) fn grow(&mut self, edge: Edge, k: usize, gen: &Generator) {
        if k == 0 {
            return;
        }
        let (cols, rows) = (self.cols(), self.rows());
        let (dx, dy, new_cols, new_rows) = match edge {
            Edge::Left => (k, 0, cols + k, rows),
            Edge::Right => (0, 0, cols + k, rows),
            Edge::Top => (0, k, cols, rows + k),
            Edge::Bottom => (0, 0, cols, rows + k),
        };
        match edge {
            Edge::Left => self.origin_x -= k as i64,
            Edge::Top => self.origin_y -= k as i64,
            Edge::Right | Edge::Bottom => {}
        }
        // Strip fill uses the re-anchored origin.
        let (ox, oy) = (self.origin_x, self.origin_y);
        self.tiles = self.tiles.resized_with(new_cols, new_rows, dx, dy, |x, y| {
            gen.tile_at(ox + x as i64, oy + y as i64)
        });
        self.seen = self.seen.resized_with(new_cols, new_rows, dx, dy, |_, _| false);
        self.visible = self.visible.resized_with(new_cols, new_rows, dx, dy, |_, _| false);
    }

    /// Count cells that disagree with the generator, skipping coordinates
    /// in `exempt` (the ford overlay). Zero everywhere else is the window
    /// consistency invariant.
    pub fn drift_count(
        &self,
        gen: &Generator,
        exempt: &std::collections::HashSet<(i64, i64)>,
    ) -> usize {
        let mut drift = 0;
        for (x, y, &tile) in self.tiles.iter() {
            let world = self.to_world(x, y);
            if exempt.contains(&world) {
                continue;
            }
            if gen.tile_at(world.0, world.1) != tile {
                drift += 1;
            }
        }
        drift
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_build_rejects_empty_window() {
        let gen = Generator::new(42);
        assert!(matches!(
            WorldWindow::build(&gen, 0, 80),
            Err(WorldError::EmptyWindow { .. })
        ));
        assert!(matches!(
            WorldWindow::build(&gen, 120, 0),
            Err(WorldError::EmptyWindow { .. })
        ));
    }

    #[test]
    fn test_build_centres_start() {
        let gen = Generator::new(42);
        let w = WorldWindow::build(&gen, 120, 80).unwrap();
        let (sx, sy) = gen.pick_start();
        assert_eq!(w.to_world(60, 40), (sx, sy));
    }

    #[test]
    fn test_window_matches_generator_after_build() {
        let gen = Generator::new(42);
        let w = WorldWindow::build(&gen, 64, 48).unwrap();
        assert_eq!(w.drift_count(&gen, &HashSet::new()), 0);
    }

    #[test]
    fn test_grow_left_keeps_absolute_coordinates() {
        let gen = Generator::new(42);
        let mut w = WorldWindow::build(&gen, 40, 30).unwrap();
        let (ox, oy) = w.origin();
        let probe = w.world_tile(ox + 5, oy + 5).unwrap();

        w.grow(Edge::Left, 16, &gen);
        assert_eq!(w.origin(), (ox - 16, oy));
        assert_eq!(w.cols(), 56);
        assert_eq!(w.rows(), 30);
        assert_eq!(w.world_tile(ox + 5, oy + 5).unwrap(), probe);
        assert_eq!(w.drift_count(&gen, &HashSet::new()), 0);
    }

    #[test]
    fn test_grow_bottom_leaves_origin() {
        let gen = Generator::new(42);
        let mut w = WorldWindow::build(&gen, 40, 30).unwrap();
        let origin = w.origin();
        w.grow(Edge::Bottom, 8, &gen);
        assert_eq!(w.origin(), origin);
        assert_eq!(w.rows(), 38);
        assert_eq!(w.drift_count(&gen, &HashSet::new()), 0);
    }

    #[test]
    fn test_grow_resets_fog_on_new_strips_only() {
        let gen = Generator::new(42);
        let mut w = WorldWindow::build(&gen, 20, 20).unwrap();
        w.seen.set(3, 3, true);
        w.grow(Edge::Top, 4, &gen);
        // Old content slid down by 4; new strip is unseen.
        assert!(*w.seen.get(3, 7));
        for x in 0..w.cols() {
            for y in 0..4 {
                assert!(!*w.seen.get(x, y));
            }
        }
        assert_eq!(w.seen.width(), w.cols());
        assert_eq!(w.seen.height(), w.rows());
    }

    #[test]
    fn test_grow_zero_is_a_no_op() {
        let gen = Generator::new(42);
        let mut w = WorldWindow::build(&gen, 20, 20).unwrap();
        let origin = w.origin();
        w.grow(Edge::Left, 0, &gen);
        assert_eq!(w.origin(), origin);
        assert_eq!(w.cols(), 20);
    }
}
