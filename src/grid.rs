//! Rectangular grid storage for the materialized window.
//!
//! Unlike a planet map there is no horizontal wrap: the window is a finite
//! cutout of an unbounded plane, and the expansion engine re-anchors it by
//! rebuilding rather than by wrapping indices.

/// A dense `width x height` grid, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T: Clone> Grid<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self { width, height, data: vec![value; width * height] }
    }

    /// Build a grid by evaluating a function at every cell.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height, "grid index out of bounds");
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Whether a signed local coordinate falls inside the grid.
    pub fn contains(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }

    /// Rebuild into a `new_width x new_height` grid with the existing
    /// content shifted to start at `(dx, dy)`; every cell outside the old
    /// content is produced by `fill`. This is the single splice primitive
    /// behind all four expansion edges.
    pub fn resized_with(
        &self,
        new_width: usize,
        new_height: usize,
        dx: usize,
        dy: usize,
        mut fill: impl FnMut(usize, usize) -> T,
    ) -> Grid<T> {
        Grid::from_fn(new_width, new_height, |x, y| {
            if x >= dx && y >= dy {
                let (ox, oy) = (x - dx, y - dy);
                if ox < self.width && oy < self.height {
                    return self.get(ox, oy).clone();
                }
            }
            fill(x, y)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_fn_layout() {
        let g = Grid::from_fn(3, 2, |x, y| (x, y));
        assert_eq!(*g.get(0, 0), (0, 0));
        assert_eq!(*g.get(2, 1), (2, 1));
        assert_eq!(g.width(), 3);
        assert_eq!(g.height(), 2);
    }

    #[test]
    fn test_contains_signed() {
        let g = Grid::new_with(4, 3, 0u8);
        assert!(g.contains(0, 0));
        assert!(g.contains(3, 2));
        assert!(!g.contains(-1, 0));
        assert!(!g.contains(0, -1));
        assert!(!g.contains(4, 0));
        assert!(!g.contains(0, 3));
    }

    #[test]
    fn test_resized_with_prepend() {
        let g = Grid::from_fn(2, 2, |x, y| (10 * y + x) as i32);
        // Prepend one column and one row; new cells are -1.
        let r = g.resized_with(3, 3, 1, 1, |_, _| -1);
        assert_eq!(*r.get(0, 0), -1);
        assert_eq!(*r.get(1, 1), 0);
        assert_eq!(*r.get(2, 2), 11);
        assert_eq!(*r.get(2, 0), -1);
    }

    #[test]
    fn test_resized_with_append() {
        let g = Grid::from_fn(2, 2, |x, y| (10 * y + x) as i32);
        let r = g.resized_with(4, 2, 0, 0, |x, y| 100 + (10 * y + x) as i32);
        assert_eq!(*r.get(1, 1), 11);
        assert_eq!(*r.get(2, 0), 102);
        assert_eq!(*r.get(3, 1), 113);
    }

    #[test]
    fn test_resized_round_trip_preserves_content() {
        let g = Grid::from_fn(5, 4, |x, y| (x * 7 + y * 13) as u32);
        let grown = g.resized_with(8, 4, 3, 0, |_, _| 999);
        let shrunk_back: Vec<u32> = (0..4)
            .flat_map(|y| (0..5).map(move |x| (x, y)))
            .map(|(x, y)| *grown.get(x + 3, y))
            .collect();
        let original: Vec<u32> = (0..4)
            .flat_map(|y| (0..5).map(move |x| (x, y)))
            .map(|(x, y)| *g.get(x, y))
            .collect();
        assert_eq!(shrunk_back, original);
    }
}
