//! # Rasterization
//!
//! Integer-only rasterizers shared by the commands and tools. Lines are unbounded and may leave the canvas.
//! Everything producing an area takes a [`CellRect`] clip and only visits cells inside it, so cost follows the
//! canvas size rather than how far a gesture strays from it.

use crate::util::Point;

/// An inclusive, non-empty rectangle of cells.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct CellRect {
    pub min: Point,
    pub max: Point,
}
impl CellRect {
    /// The whole coordinate space.
    pub const EVERYTHING: Self = Self {
        min: Point::new(i32::MIN, i32::MIN),
        max: Point::new(i32::MAX, i32::MAX),
    };
    /// Every cell of a `width` by `height` canvas. `None` if either is zero or too large for `i32` coordinates.
    #[must_use]
    pub fn canvas(width: u32, height: u32) -> Option<Self> {
        let last = |axis: u32| i32::try_from(axis).ok()?.checked_sub(1).filter(|last| *last >= 0);
        Some(Self {
            min: Point::ZERO,
            max: Point::new(last(width)?, last(height)?),
        })
    }
    /// The box with `a` and `b` as opposite corners.
    #[must_use]
    pub fn spanning(a: Point, b: Point) -> Self {
        Self {
            min: Point::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }
    /// The square of radius `radius` around `center`, cut off at the edges of the coordinate space.
    #[must_use]
    pub fn around(center: Point, radius: i32) -> Self {
        let radius = radius.max(0);
        Self {
            min: Point::new(center.x.saturating_sub(radius), center.y.saturating_sub(radius)),
            max: Point::new(center.x.saturating_add(radius), center.y.saturating_add(radius)),
        }
    }
    /// Pushed out by `by` on every side, cut off at the edges of the coordinate space.
    #[must_use]
    pub fn grow(self, by: i32) -> Self {
        Self {
            min: Self::around(self.min, by).min,
            max: Self::around(self.max, by).max,
        }
    }
    #[must_use]
    pub fn contains(&self, point: Point) -> bool {
        (self.min.x..=self.max.x).contains(&point.x) && (self.min.y..=self.max.y).contains(&point.y)
    }
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let min = Point::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y));
        let max = Point::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y));
        (min.x <= max.x && min.y <= max.y).then_some(Self { min, max })
    }
    /// Row-major.
    pub fn cells(self) -> impl Iterator<Item = Point> {
        let Self { min, max } = self;
        (min.y..=max.y).flat_map(move |y| (min.x..=max.x).map(move |x| Point::new(x, y)))
    }
}

/// Iterator over the cells of a Bresenham line, inclusive of both endpoints.
#[derive(Clone, Debug)]
pub struct Line {
    cur: Point,
    end: Point,
    // Wide, so endpoints anywhere in i32 space can't overflow.
    dx: i64,
    dy: i64,
    sx: i32,
    sy: i32,
    err: i64,
    done: bool,
}
impl Iterator for Line {
    type Item = Point;
    fn next(&mut self) -> Option<Point> {
        if self.done {
            return None;
        }
        let here = self.cur;
        if here == self.end {
            self.done = true;
            return Some(here);
        }
        let e2 = 2 * self.err;
        if e2 > -self.dy {
            self.err -= self.dy;
            self.cur.x += self.sx;
        }
        if e2 < self.dx {
            self.err += self.dx;
            self.cur.y += self.sy;
        }
        Some(here)
    }
    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        // A line visits exactly max(|dx|, |dy|) + 1 cells in total.
        let remaining = span(self.cur.x, self.end.x).max(span(self.cur.y, self.end.y));
        let remaining = usize::try_from(remaining).map_or(usize::MAX, |r| r.saturating_add(1));
        (remaining, Some(remaining))
    }
}
impl ExactSizeIterator for Line {}
impl std::iter::FusedIterator for Line {}

/// `|b - a|` without overflow.
fn span(a: i32, b: i32) -> i64 {
    (i64::from(b) - i64::from(a)).abs()
}

/// Rasterize the line from `from` to `to`.
#[must_use]
pub fn line(from: Point, to: Point) -> Line {
    let dx = span(from.x, to.x);
    let dy = span(from.y, to.y);
    Line {
        cur: from,
        end: to,
        dx,
        dy,
        sx: if from.x < to.x { 1 } else { -1 },
        sy: if from.y < to.y { 1 } else { -1 },
        err: dx - dy,
        done: false,
    }
}

/// Radius of a square brush of `size`: 1 is the center alone, 2 is 3x3, 3 is 5x5...
/// Size 0 is treated as 1.
#[must_use]
pub fn brush_radius(size: u32) -> i32 {
    i32::try_from(size.saturating_sub(1)).unwrap_or(i32::MAX)
}

/// Stamp a square brush of [`brush_radius`] around `center`, keeping only cells inside `clip`.
pub fn expand(center: Point, size: u32, clip: CellRect) -> impl Iterator<Item = Point> {
    CellRect::around(center, brush_radius(size))
        .intersect(&clip)
        .into_iter()
        .flat_map(CellRect::cells)
}

/// Outline of the box spanned by two corners: top and bottom rows, left and right columns.
/// Each cell inside `clip` is produced once.
#[must_use]
pub fn rectangle_stroke(a: Point, b: Point, clip: CellRect) -> Vec<Point> {
    let outline = CellRect::spanning(a, b);
    let Some(visible) = outline.intersect(&clip) else {
        return Vec::new();
    };
    let mut cells = Vec::new();
    let mut rows = vec![outline.min.y];
    if outline.max.y != outline.min.y {
        rows.push(outline.max.y);
    }
    for y in rows.into_iter().filter(|y| (visible.min.y..=visible.max.y).contains(y)) {
        cells.extend((visible.min.x..=visible.max.x).map(|x| Point::new(x, y)));
    }
    // Corners were covered by the rows.
    let inner_top = visible.min.y.max(outline.min.y.saturating_add(1));
    let inner_bottom = visible.max.y.min(outline.max.y.saturating_sub(1));
    let mut columns = vec![outline.min.x];
    if outline.max.x != outline.min.x {
        columns.push(outline.max.x);
    }
    for x in columns.into_iter().filter(|x| (visible.min.x..=visible.max.x).contains(x)) {
        cells.extend((inner_top..=inner_bottom).map(|y| Point::new(x, y)));
    }
    cells
}

/// Every cell of the box spanned by two corners that lies inside `clip`.
pub fn rectangle_fill(a: Point, b: Point, clip: CellRect) -> impl Iterator<Item = Point> {
    CellRect::spanning(a, b)
        .intersect(&clip)
        .into_iter()
        .flat_map(CellRect::cells)
}

/// Radius of a circle centered on `center` passing through `edge`: the Euclidean distance, truncated.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn circle_radius(center: Point, edge: Point) -> i32 {
    // Spans fit in 33 bits, exact as f64. Float to int casts saturate.
    let dx = span(center.x, edge.x) as f64;
    let dy = span(center.y, edge.y) as f64;
    dx.hypot(dy) as i32
}

/// `center + (dx, dy)`, if it lands inside `clip`.
fn offset_within(center: Point, dx: i64, dy: i64, clip: &CellRect) -> Option<Point> {
    let x = i32::try_from(i64::from(center.x) + dx).ok()?;
    let y = i32::try_from(i64::from(center.y) + dy).ok()?;
    let point = Point::new(x, y);
    clip.contains(point).then_some(point)
}

/// Midpoint circle outline with 8-way symmetry. Each cell inside `clip` is produced once.
/// A zero radius is the center cell.
#[must_use]
pub fn circle_stroke(center: Point, radius: i32, clip: CellRect) -> Vec<Point> {
    if radius <= 0 {
        return if clip.contains(center) {
            vec![center]
        } else {
            Vec::new()
        };
    }
    // Nothing to walk if the whole circle misses.
    if CellRect::around(center, radius).intersect(&clip).is_none() {
        return Vec::new();
    }
    let mut seen = hashbrown::HashSet::new();
    let mut cells = Vec::new();
    let mut push_octants = |px: i64, py: i64| {
        for (ox, oy) in [
            (px, py),
            (-px, py),
            (px, -py),
            (-px, -py),
            (py, px),
            (-py, px),
            (py, -px),
            (-py, -px),
        ] {
            if let Some(cell) = offset_within(center, ox, oy, &clip) {
                if seen.insert(cell) {
                    cells.push(cell);
                }
            }
        }
    };

    let mut x = 0_i64;
    let mut y = i64::from(radius);
    let mut d = 1 - y;
    push_octants(x, y);
    while x < y {
        x += 1;
        if d < 0 {
            d += 2 * x + 1;
        } else {
            y -= 1;
            d += 2 * (x - y) + 1;
        }
        push_octants(x, y);
    }
    cells
}

/// Filled disk: every cell with `dx² + dy² <= r²` inside `clip`.
/// A zero radius is the center cell.
pub fn circle_fill(center: Point, radius: i32, clip: CellRect) -> impl Iterator<Item = Point> {
    let radius = radius.max(0);
    let r2 = i64::from(radius) * i64::from(radius);
    CellRect::around(center, radius)
        .intersect(&clip)
        .into_iter()
        .flat_map(CellRect::cells)
        .filter(move |cell| {
            let dx = span(center.x, cell.x);
            let dy = span(center.y, cell.y);
            dx * dx + dy * dy <= r2
        })
}

/// Expand every cell by a square brush, keeping cells inside `clip` and removing duplicates while keeping
/// first-seen order.
#[must_use]
pub fn thicken(cells: impl IntoIterator<Item = Point>, size: u32, clip: CellRect) -> Vec<Point> {
    // Centers further out than this can't reach the clip.
    let reach = clip.grow(brush_radius(size));
    let mut seen = hashbrown::HashSet::new();
    cells
        .into_iter()
        .filter(|cell| reach.contains(*cell))
        .flat_map(|cell| expand(cell, size, clip))
        .filter(|cell| seen.insert(*cell))
        .collect()
}
