//! The toroidal cell grid and the pure B3/S23 evolution rule.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Byte value of a live cell.
pub const ALIVE: u8 = 255;
/// Byte value of a dead cell.
pub const DEAD: u8 = 0;

/// A coordinate within a world. `x` is the column, `y` is the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub x: u32,
    pub y: u32,
}

impl Coord {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// A rectangular, toroidal grid of cells.
///
/// Rows are indexed `[y][x]`, `0 <= y < height`, `0 <= x < width`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct World {
    width: usize,
    height: usize,
    rows: Vec<Vec<u8>>,
}

impl World {
    /// Create an all-dead world of the given dimensions.
    pub fn new_dead(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: vec![vec![DEAD; width]; height],
        }
    }

    /// Build a world from row-major bytes, validating dimensions.
    pub fn from_rows(width: usize, height: usize, rows: Vec<Vec<u8>>) -> Result<Self> {
        if rows.len() != height {
            return Err(Error::MalformedGrid {
                expected: height,
                actual: rows.len(),
            });
        }
        for row in &rows {
            if row.len() != width {
                return Err(Error::MalformedRow {
                    expected: width,
                    actual: row.len(),
                });
            }
        }
        Ok(Self {
            width,
            height,
            rows,
        })
    }

    /// Build a world from a flat row-major byte buffer (as read from a PGM file).
    pub fn from_flat_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self> {
        if bytes.len() != width * height {
            return Err(Error::MalformedGrid {
                expected: width * height,
                actual: bytes.len() / width.max(1),
            });
        }
        let rows = bytes.chunks_exact(width).map(<[u8]>::to_vec).collect();
        Self::from_rows(width, height, rows)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Borrow one row.
    pub fn row(&self, y: usize) -> &[u8] {
        &self.rows[y]
    }

    /// All rows, in row-major order.
    pub fn rows(&self) -> &[Vec<u8>] {
        &self.rows
    }

    pub fn get(&self, coord: Coord) -> u8 {
        self.rows[coord.y as usize][coord.x as usize]
    }

    pub fn set(&mut self, coord: Coord, value: u8) {
        self.rows[coord.y as usize][coord.x as usize] = value;
    }

    pub fn is_alive(&self, coord: Coord) -> bool {
        self.get(coord) == ALIVE
    }

    /// Row index `y`, wrapped onto `[0, height)`. `y` may be negative
    /// (expressed as `isize`) to reach the ghost row above row 0.
    pub fn wrap_row(&self, y: isize) -> usize {
        (((y % self.height as isize) + self.height as isize) % self.height as isize) as usize
    }

    /// Flatten to row-major bytes, e.g. for writing a PGM file.
    pub fn to_flat_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.width * self.height);
        for row in &self.rows {
            out.extend_from_slice(row);
        }
        out
    }

    /// Count of `ALIVE`-valued cells.
    pub fn alive_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c == ALIVE)
            .count()
    }

    /// Coordinates of every alive cell, in row-major order.
    pub fn alive_cells(&self) -> Vec<Coord> {
        let mut cells = Vec::new();
        for (y, row) in self.rows.iter().enumerate() {
            for (x, &cell) in row.iter().enumerate() {
                if cell == ALIVE {
                    cells.push(Coord::new(x as u32, y as u32));
                }
            }
        }
        cells
    }

    /// Count live neighbours of `(x, y)` under toroidal wrap, consulting
    /// `self` directly (no ghost rows involved — used by [`evolve`] and by
    /// tests that need a reference evolution independent of the strip path).
    fn live_neighbours(&self, x: usize, y: usize) -> u32 {
        let mut count = 0;
        for dy in [-1isize, 0, 1] {
            for dx in [-1isize, 0, 1] {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let ny = self.wrap_row(y as isize + dy);
                let nx = (((x as isize + dx) % self.width as isize) + self.width as isize)
                    as usize
                    % self.width;
                if self.rows[ny][nx] == ALIVE {
                    count += 1;
                }
            }
        }
        count
    }

    /// Apply one full turn of B3/S23 to the whole grid.
    ///
    /// This is the golden single-process reference: the strip-decomposed
    /// path (see [`crate::strip`]) must agree with it bitwise for any
    /// worker count, per the system's determinism law.
    pub fn evolve(&self) -> World {
        let mut next = World::new_dead(self.width, self.height);
        for y in 0..self.height {
            for x in 0..self.width {
                let n = self.live_neighbours(x, y);
                let alive = self.rows[y][x] == ALIVE;
                let next_alive = matches!((alive, n), (true, 2) | (true, 3) | (false, 3));
                next.rows[y][x] = if next_alive { ALIVE } else { DEAD };
            }
        }
        next
    }

    /// Apply `turns` full turns, returning the resulting world.
    pub fn evolve_n(&self, turns: usize) -> World {
        let mut world = self.clone();
        for _ in 0..turns {
            world = world.evolve();
        }
        world
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dead_world_stays_dead() {
        let world = World::new_dead(5, 5);
        let next = world.evolve();
        assert_eq!(next.alive_count(), 0);
    }

    #[test]
    fn block_is_stable() {
        let mut world = World::new_dead(4, 4);
        for (x, y) in [(1, 1), (2, 1), (1, 2), (2, 2)] {
            world.set(Coord::new(x, y), ALIVE);
        }
        let after = world.evolve_n(100);
        assert_eq!(after, world);
    }

    #[test]
    fn blinker_rotates() {
        // Vertical blinker at column 1, rows 0..3, on a 5x5 torus.
        let mut world = World::new_dead(5, 5);
        for y in 0..3 {
            world.set(Coord::new(1, y), ALIVE);
        }
        let after = world.evolve();
        assert_eq!(after.alive_count(), 3);
        for x in 0..3 {
            assert!(after.is_alive(Coord::new(x, 1)));
        }
        assert!(!after.is_alive(Coord::new(1, 0)));
        assert!(!after.is_alive(Coord::new(1, 2)));
    }

    #[test]
    fn round_trip_flat_bytes() {
        let mut world = World::new_dead(3, 2);
        world.set(Coord::new(0, 0), ALIVE);
        let bytes = world.to_flat_bytes();
        let restored = World::from_flat_bytes(3, 2, &bytes).unwrap();
        assert_eq!(world, restored);
    }

    #[test]
    fn from_rows_rejects_wrong_height() {
        let err = World::from_rows(3, 2, vec![vec![0, 0, 0]]).unwrap_err();
        assert!(matches!(err, Error::MalformedGrid { .. }));
    }

    #[test]
    fn from_rows_rejects_wrong_width() {
        let err = World::from_rows(3, 1, vec![vec![0, 0]]).unwrap_err();
        assert!(matches!(err, Error::MalformedRow { .. }));
    }
}
