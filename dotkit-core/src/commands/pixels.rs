//! Commands writing pixels of a single layer.

use super::{Backup, CommandError};
use crate::color::Argb;
use crate::id::LayerId;
use crate::raster;
use crate::state::{BufferError, CanvasDocument};
use crate::util::Point;

/// Write `paints` in order into layer `id`. Unknown layers are a no-op.
fn paint(
    document: &CanvasDocument,
    id: LayerId,
    paints: impl IntoIterator<Item = (Point, Argb)>,
) -> Result<CanvasDocument, CommandError> {
    Ok(document.try_update_layer(id, |layer| {
        let mut layer = layer.clone();
        for (point, color) in paints {
            layer.set_pixel(point, color)?;
        }
        Ok::<_, BufferError>(layer)
    })?)
}

/// Set one pixel.
#[derive(Clone, Debug)]
pub struct DrawPixel {
    layer: LayerId,
    point: Point,
    color: Argb,
    backup: Backup<Argb>,
}
impl DrawPixel {
    #[must_use]
    pub fn new(layer: LayerId, point: Point, color: Argb) -> Self {
        Self {
            layer,
            point,
            color,
            backup: Backup::Pending,
        }
    }
    #[must_use]
    pub fn backup(&self) -> &Backup<Argb> {
        &self.backup
    }
    pub(super) fn execute(
        &mut self,
        document: &CanvasDocument,
    ) -> Result<CanvasDocument, CommandError> {
        let Some(layer) = document.layer(self.layer) else {
            log::debug!("draw pixel on missing layer {}", self.layer);
            return Ok(document.clone());
        };
        // Out of bounds fails here, before anything is captured.
        let prior = layer.get_pixel(self.point)?;
        self.backup.capture_with(|| Ok::<_, CommandError>(prior))?;
        paint(document, self.layer, [(self.point, self.color)])
    }
    pub(super) fn undo(&self, document: &CanvasDocument) -> Result<CanvasDocument, CommandError> {
        match self.backup {
            Backup::Captured(prior) => paint(document, self.layer, [(self.point, prior)]),
            Backup::Pending => Ok(document.clone()),
        }
    }
}

/// Set many pixels at once. Out of bounds paints are skipped.
#[derive(Clone, Debug)]
pub struct DrawPixelBatch {
    layer: LayerId,
    paints: Vec<(Point, Argb)>,
    // Prior color of each in-bounds paint, in paint order.
    backup: Backup<Vec<(Point, Argb)>>,
}
impl DrawPixelBatch {
    #[must_use]
    pub fn new(layer: LayerId, paints: Vec<(Point, Argb)>) -> Self {
        Self {
            layer,
            paints,
            backup: Backup::Pending,
        }
    }
    /// Every cell painted with the same color.
    #[must_use]
    pub fn solid(layer: LayerId, cells: impl IntoIterator<Item = Point>, color: Argb) -> Self {
        Self::new(layer, cells.into_iter().map(|cell| (cell, color)).collect())
    }
    #[must_use]
    pub fn paints(&self) -> &[(Point, Argb)] {
        &self.paints
    }
    #[must_use]
    pub fn backup(&self) -> &Backup<Vec<(Point, Argb)>> {
        &self.backup
    }
    pub(super) fn execute(
        &mut self,
        document: &CanvasDocument,
    ) -> Result<CanvasDocument, CommandError> {
        let Some(layer) = document.layer(self.layer) else {
            log::debug!("draw pixels on missing layer {}", self.layer);
            return Ok(document.clone());
        };
        let in_bounds = || {
            self.paints
                .iter()
                .copied()
                .filter(|(point, _)| layer.is_in_bounds(*point))
        };
        let priors = in_bounds()
            .map(|(point, _)| Ok((point, layer.get_pixel(point)?)))
            .collect::<Result<Vec<_>, CommandError>>()?;
        let result = paint(document, self.layer, in_bounds())?;
        self.backup.capture_with(|| Ok::<_, CommandError>(priors))?;
        Ok(result)
    }
    pub(super) fn undo(&self, document: &CanvasDocument) -> Result<CanvasDocument, CommandError> {
        match &self.backup {
            Backup::Captured(priors) => paint(document, self.layer, priors.iter().rev().copied()),
            Backup::Pending => Ok(document.clone()),
        }
    }
}

/// A one pixel wide line. The far end may be moved between executions for rubber banding,
/// every cell it ever covered is restored on undo.
#[derive(Clone, Debug)]
pub struct DrawLine {
    layer: LayerId,
    from: Point,
    to: Point,
    color: Argb,
    // Prior color of every cell ever painted. Insertion ordered for deterministic undo.
    touched: Vec<(Point, Argb)>,
    seen: hashbrown::HashSet<Point>,
}
impl DrawLine {
    #[must_use]
    pub fn new(layer: LayerId, from: Point, to: Point, color: Argb) -> Self {
        Self {
            layer,
            from,
            to,
            color,
            touched: Vec::new(),
            seen: hashbrown::HashSet::new(),
        }
    }
    pub fn set_end(&mut self, to: Point) {
        self.to = to;
    }
    #[must_use]
    pub fn endpoints(&self) -> (Point, Point) {
        (self.from, self.to)
    }
    /// Cells of the current line, including those outside the canvas.
    pub fn cells(&self) -> raster::Line {
        raster::line(self.from, self.to)
    }
    #[must_use]
    pub fn touched(&self) -> &[(Point, Argb)] {
        &self.touched
    }
    pub(super) fn execute(
        &mut self,
        document: &CanvasDocument,
    ) -> Result<CanvasDocument, CommandError> {
        let Some(layer) = document.layer(self.layer) else {
            log::debug!("draw line on missing layer {}", self.layer);
            return Ok(document.clone());
        };
        let cells: Vec<_> = self
            .cells()
            .filter(|cell| layer.is_in_bounds(*cell))
            .collect();
        let mut fresh = Vec::new();
        for &cell in &cells {
            if !self.seen.contains(&cell) {
                fresh.push((cell, layer.get_pixel(cell)?));
            }
        }
        let result = paint(
            document,
            self.layer,
            cells.iter().map(|cell| (*cell, self.color)),
        )?;
        for (cell, prior) in fresh {
            if self.seen.insert(cell) {
                self.touched.push((cell, prior));
            }
        }
        Ok(result)
    }
    pub(super) fn undo(&self, document: &CanvasDocument) -> Result<CanvasDocument, CommandError> {
        paint(document, self.layer, self.touched.iter().rev().copied())
    }
}

/// Result of a flood fill: every filled cell with its previous color.
#[derive(Clone, Debug)]
pub struct Fill {
    layer: LayerId,
    cells: Vec<(Point, Argb)>,
    color: Argb,
}
impl Fill {
    #[must_use]
    pub fn new(layer: LayerId, cells: Vec<(Point, Argb)>, color: Argb) -> Self {
        Self {
            layer,
            cells,
            color,
        }
    }
    #[must_use]
    pub fn cells(&self) -> &[(Point, Argb)] {
        &self.cells
    }
    #[must_use]
    pub fn color(&self) -> Argb {
        self.color
    }
    pub(super) fn execute(
        &mut self,
        document: &CanvasDocument,
    ) -> Result<CanvasDocument, CommandError> {
        paint(
            document,
            self.layer,
            self.cells.iter().map(|(cell, _)| (*cell, self.color)),
        )
    }
    pub(super) fn undo(&self, document: &CanvasDocument) -> Result<CanvasDocument, CommandError> {
        paint(document, self.layer, self.cells.iter().copied())
    }
}
