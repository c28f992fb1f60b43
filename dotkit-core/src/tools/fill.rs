//! 4-connected flood fill.

use crate::color::Argb;
use crate::state::PixelBuffer;
use crate::util::Point;

/// Find every cell 4-connected to `start` sharing its color.
///
/// Returns each cell paired with its current (i.e. previous, once filled) color, or `None` if `start` is out of
/// bounds or already `color`.
#[must_use]
pub fn flood_fill(pixels: &PixelBuffer, start: Point, color: Argb) -> Option<Vec<(Point, Argb)>> {
    let target = pixels.get(start).ok()?;
    if target == color {
        return None;
    }
    let width = pixels.width() as usize;
    let index = |point: Point| point.y as usize * width + point.x as usize;

    let mut visited: bitvec::vec::BitVec = bitvec::vec::BitVec::repeat(false, pixels.as_slice().len());
    let mut stack = vec![start];
    let mut cells = Vec::new();
    visited.set(index(start), true);

    // Explicit stack, recursion would blow up on big canvases.
    while let Some(cell) = stack.pop() {
        cells.push((cell, target));
        for neighbor in [
            Point::new(cell.x + 1, cell.y),
            Point::new(cell.x - 1, cell.y),
            Point::new(cell.x, cell.y + 1),
            Point::new(cell.x, cell.y - 1),
        ] {
            // Out of bounds fails the get.
            if pixels.get(neighbor) != Ok(target) {
                continue;
            }
            let idx = index(neighbor);
            if !visited[idx] {
                visited.set(idx, true);
                stack.push(neighbor);
            }
        }
    }
    Some(cells)
}
