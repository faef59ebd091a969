//! Horizontal strip decomposition, ghost-row assembly, and the worker's
//! per-strip evolution step.
//!
//! This module is shared by the broker (decomposition + reassembly) and
//! the worker (the evolution step itself), so both sides agree on the
//! exact same arithmetic.

use crate::error::{Error, Result};
use crate::world::{ALIVE, DEAD, World};

/// A contiguous row range `[start_y, end_y)` assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripRange {
    pub start_y: usize,
    pub end_y: usize,
}

impl StripRange {
    /// Number of rows this worker is responsible for (excluding ghosts).
    pub fn len(&self) -> usize {
        self.end_y - self.start_y
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Divide `height` rows among `num_workers` workers.
///
/// `rows_per_worker = height / num_workers`, the remainder is appended to
/// the last worker's strip. If `height < num_workers`, each of the first
/// `height` workers gets exactly one row and the rest get empty strips
/// (tolerated, not contacted for zero-row work).
pub fn plan_strips(height: usize, num_workers: usize) -> Vec<StripRange> {
    if num_workers == 0 {
        return Vec::new();
    }

    if height < num_workers {
        return (0..num_workers)
            .map(|i| {
                if i < height {
                    StripRange {
                        start_y: i,
                        end_y: i + 1,
                    }
                } else {
                    StripRange {
                        start_y: height,
                        end_y: height,
                    }
                }
            })
            .collect();
    }

    let rows_per_worker = height / num_workers;
    let remainder = height % num_workers;
    (0..num_workers)
        .map(|i| {
            let start_y = i * rows_per_worker;
            let mut end_y = start_y + rows_per_worker;
            if i == num_workers - 1 {
                end_y += remainder;
            }
            StripRange { start_y, end_y }
        })
        .collect()
}

/// Build the `(end_y - start_y + 2)`-row slice a worker needs: one ghost
/// row copied from `(start_y - 1 + H) mod H`, the strip's own rows, and
/// one ghost row copied from `end_y mod H`.
pub fn extract_strip_with_ghosts(world: &World, range: StripRange) -> Vec<Vec<u8>> {
    let height = world.height() as isize;
    let mut rows = Vec::with_capacity(range.len() + 2);
    for y in (range.start_y as isize - 1)..=(range.end_y as isize) {
        let wrapped = (((y % height) + height) % height) as usize;
        rows.push(world.row(wrapped).to_vec());
    }
    rows
}

/// Count live neighbours of `(x, y)` within a ghost-padded strip. `y` is
/// an index into `strip` itself (so row 0 and the last row are ghosts);
/// the x axis wraps modulo `width`, the y axis does not (the ghost rows
/// already supply the wrap).
fn live_neighbours_in_strip(strip: &[Vec<u8>], x: usize, y: usize, width: usize) -> u32 {
    let mut count = 0;
    for dy in [-1isize, 0, 1] {
        for dx in [-1isize, 0, 1] {
            if dx == 0 && dy == 0 {
                continue;
            }
            let ny = (y as isize + dy) as usize;
            let nx = (((x as isize + dx) % width as isize) + width as isize) as usize % width;
            if strip[ny][nx] == ALIVE {
                count += 1;
            }
        }
    }
    count
}

/// Evolve one strip: `strip` has `height' = height + 2` rows (ghosts at
/// index 0 and `height' - 1`) and `width` columns per row. Returns the
/// `height` interior rows evolved one turn under B3/S23.
///
/// Fails with [`Error::MalformedStrip`] if `strip` has fewer than 3 rows,
/// or [`Error::MalformedRow`] if any row's length doesn't match `width`.
pub fn evolve_strip(strip: &[Vec<u8>], width: usize) -> Result<Vec<Vec<u8>>> {
    if strip.len() < 3 {
        return Err(Error::MalformedStrip {
            expected: 3,
            actual: strip.len(),
        });
    }
    for row in strip {
        if row.len() != width {
            return Err(Error::MalformedRow {
                expected: width,
                actual: row.len(),
            });
        }
    }

    let interior_height = strip.len() - 2;
    let mut out = Vec::with_capacity(interior_height);
    for y in 1..=interior_height {
        let mut new_row = vec![DEAD; width];
        for x in 0..width {
            let n = live_neighbours_in_strip(strip, x, y, width);
            let alive = strip[y][x] == ALIVE;
            let next_alive = matches!((alive, n), (true, 2) | (true, 3) | (false, 3));
            new_row[x] = if next_alive { ALIVE } else { DEAD };
        }
        out.push(new_row);
    }
    Ok(out)
}
