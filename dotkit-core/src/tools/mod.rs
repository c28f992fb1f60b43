//! # Tools
//!
//! Tools turn a pointer gesture (down, any number of moves, up) into at most one [`CanvasCommand`].
//!
//! Nothing here touches the document. A gesture's progress lives in a [`ToolState`] threaded through the
//! callbacks, so an abandoned gesture is just a dropped value. The command is only built on release.

pub mod fill;

use crate::color::Argb;
use crate::commands::{CanvasCommand, DrawPixelBatch, Fill};
use crate::id::LayerId;
use crate::raster::{self, CellRect};
use crate::state::{CanvasDocument, PixelBuffer};
use crate::util::Point;
use std::sync::Arc;

/// Whether a shape is drawn as an outline or solid.
#[derive(
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    Debug,
    Default,
    strum::AsRefStr,
    strum::EnumIter,
    serde::Serialize,
    serde::Deserialize,
)]
pub enum ShapeMode {
    #[default]
    Stroke,
    Fill,
}

/// Just the variant of a [`Tool`], without its parameters.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, strum::AsRefStr, strum::EnumIter)]
pub enum ToolKind {
    Brush,
    Eraser,
    Line,
    Rectangle,
    Circle,
    Fill,
    Eyedropper,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, serde::Serialize, serde::Deserialize)]
pub enum Tool {
    Brush { size: u32 },
    /// A brush painting transparency.
    Eraser { size: u32 },
    Line { size: u32 },
    Rectangle { mode: ShapeMode, size: u32 },
    Circle { mode: ShapeMode, size: u32 },
    Fill,
    Eyedropper,
}
impl Default for Tool {
    fn default() -> Self {
        Self::Brush { size: 1 }
    }
}
impl Tool {
    #[must_use]
    pub fn kind(&self) -> ToolKind {
        match self {
            Self::Brush { .. } => ToolKind::Brush,
            Self::Eraser { .. } => ToolKind::Eraser,
            Self::Line { .. } => ToolKind::Line,
            Self::Rectangle { .. } => ToolKind::Rectangle,
            Self::Circle { .. } => ToolKind::Circle,
            Self::Fill => ToolKind::Fill,
            Self::Eyedropper => ToolKind::Eyedropper,
        }
    }
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self.kind() {
            ToolKind::Brush => "Brush",
            ToolKind::Eraser => "Eraser",
            ToolKind::Line => "Line",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Circle => "Circle",
            ToolKind::Fill => "Fill",
            ToolKind::Eyedropper => "Eyedropper",
        }
    }
    /// Brush size, for tools that have one.
    #[must_use]
    pub fn size(&self) -> Option<u32> {
        match *self {
            Self::Brush { size }
            | Self::Eraser { size }
            | Self::Line { size }
            | Self::Rectangle { size, .. }
            | Self::Circle { size, .. } => Some(size),
            Self::Fill | Self::Eyedropper => None,
        }
    }
    /// The same tool with a new size. Sizeless tools are returned unchanged.
    #[must_use]
    pub fn with_size(self, new_size: u32) -> Self {
        match self {
            Self::Brush { .. } => Self::Brush { size: new_size },
            Self::Eraser { .. } => Self::Eraser { size: new_size },
            Self::Line { .. } => Self::Line { size: new_size },
            Self::Rectangle { mode, .. } => Self::Rectangle {
                mode,
                size: new_size,
            },
            Self::Circle { mode, .. } => Self::Circle {
                mode,
                size: new_size,
            },
            Self::Fill | Self::Eyedropper => self,
        }
    }
    /// Whether [`Self::preview`] has anything to show mid-gesture.
    #[must_use]
    pub fn supports_preview(&self) -> bool {
        !matches!(self, Self::Fill | Self::Eyedropper)
    }
    /// Color actually written, given the requested one.
    fn paint_color(&self, color: Argb) -> Argb {
        match self {
            Self::Eraser { .. } => Argb::TRANSPARENT,
            _ => color,
        }
    }

    pub fn on_down(&self, document: &CanvasDocument, point: Point, color: Argb) -> ToolState {
        if let Self::Eyedropper = self {
            let composite = document.composite().ok().map(Arc::new);
            let picked = sample(composite.as_deref(), point);
            return ToolState::Picking { composite, picked };
        }
        let Some(layer) = drawable_layer(document) else {
            return ToolState::Idle;
        };
        // Documents always have a valid size.
        let Some(clip) = CellRect::canvas(document.width(), document.height()) else {
            return ToolState::Idle;
        };
        let color = self.paint_color(color);
        match *self {
            Self::Brush { size } | Self::Eraser { size } => {
                let mut stroke = Stroke {
                    layer,
                    color,
                    size,
                    clip,
                    last: point,
                    cells: Vec::new(),
                    seen: hashbrown::HashSet::new(),
                };
                stroke.stamp(std::iter::once(point));
                ToolState::Stroke(stroke)
            }
            Self::Line { .. } | Self::Rectangle { .. } | Self::Circle { .. } => {
                ToolState::Shape(Shape {
                    tool: *self,
                    layer,
                    color,
                    clip,
                    start: point,
                    end: point,
                })
            }
            Self::Fill => ToolState::Filling { layer, color },
            Self::Eyedropper => ToolState::Idle,
        }
    }
    pub fn on_move(
        &self,
        _document: &CanvasDocument,
        point: Point,
        _color: Argb,
        state: ToolState,
    ) -> ToolState {
        match state {
            ToolState::Stroke(mut stroke) => {
                stroke.extend_to(point);
                ToolState::Stroke(stroke)
            }
            ToolState::Shape(shape) => ToolState::Shape(Shape { end: point, ..shape }),
            ToolState::Picking { composite, .. } => {
                let picked = sample(composite.as_deref(), point);
                ToolState::Picking { composite, picked }
            }
            other @ (ToolState::Idle | ToolState::Filling { .. }) => other,
        }
    }
    /// Finish the gesture. `None` if there is nothing to commit.
    pub fn on_up(
        &self,
        document: &CanvasDocument,
        point: Point,
        _color: Argb,
        state: ToolState,
    ) -> Option<CanvasCommand> {
        match state {
            ToolState::Stroke(mut stroke) => {
                stroke.extend_to(point);
                batch(document, stroke.layer, stroke.cells, stroke.color)
            }
            ToolState::Shape(shape) => {
                let shape = Shape { end: point, ..shape };
                batch(document, shape.layer, shape.cells(), shape.color)
            }
            ToolState::Filling { layer, color } => {
                let pixels = document.layer(layer)?.pixels();
                let cells = fill::flood_fill(pixels, point, color)?;
                Some(CanvasCommand::Fill(Fill::new(layer, cells, color)))
            }
            ToolState::Picking { .. } | ToolState::Idle => None,
        }
    }
    /// Cells the gesture would paint if released now. Only cells on the canvas are included.
    #[must_use]
    pub fn preview(&self, state: &ToolState) -> Vec<(Point, Argb)> {
        match state {
            ToolState::Stroke(stroke) => stroke
                .cells
                .iter()
                .map(|cell| (*cell, stroke.color))
                .collect(),
            ToolState::Shape(shape) => shape
                .cells()
                .into_iter()
                .map(|cell| (cell, shape.color))
                .collect(),
            _ => Vec::new(),
        }
    }
}

/// The active layer, if there is one and it's writable.
fn drawable_layer(document: &CanvasDocument) -> Option<LayerId> {
    let layer = document.active_layer()?;
    if layer.locked {
        log::debug!("active layer {} is locked", layer.id());
        return None;
    }
    Some(layer.id())
}

fn sample(composite: Option<&PixelBuffer>, point: Point) -> Option<Argb> {
    composite?.get(point).ok()
}

/// In-bounds cells as one batch. `None` if nothing lands on the canvas.
fn batch(
    document: &CanvasDocument,
    layer: LayerId,
    cells: Vec<Point>,
    color: Argb,
) -> Option<CanvasCommand> {
    let target = document.layer(layer)?;
    let cells: Vec<_> = cells
        .into_iter()
        .filter(|cell| target.is_in_bounds(*cell))
        .collect();
    if cells.is_empty() {
        return None;
    }
    Some(CanvasCommand::DrawPixelBatch(DrawPixelBatch::solid(
        layer, cells, color,
    )))
}

/// A freehand gesture in progress.
#[derive(Clone, Debug)]
pub struct Stroke {
    layer: LayerId,
    color: Argb,
    size: u32,
    clip: CellRect,
    last: Point,
    // Every stamped cell, in first-touched order.
    cells: Vec<Point>,
    seen: hashbrown::HashSet<Point>,
}
impl Stroke {
    fn stamp(&mut self, centers: impl IntoIterator<Item = Point>) {
        for center in centers {
            for cell in raster::expand(center, self.size, self.clip) {
                if self.seen.insert(cell) {
                    self.cells.push(cell);
                }
            }
        }
    }
    /// Interpolate from the last event, so fast motion doesn't leave gaps.
    fn extend_to(&mut self, point: Point) {
        if point == self.last {
            return;
        }
        // First cell of the line was already stamped.
        self.stamp(raster::line(self.last, point).skip(1));
        self.last = point;
    }
}

/// A rubber-band shape in progress.
#[derive(Clone, Debug)]
pub struct Shape {
    tool: Tool,
    layer: LayerId,
    color: Argb,
    clip: CellRect,
    start: Point,
    end: Point,
}
impl Shape {
    fn cells(&self) -> Vec<Point> {
        let (start, end, clip) = (self.start, self.end, self.clip);
        // Outlines just off the canvas still thicken onto it.
        let reach = |size| clip.grow(raster::brush_radius(size));
        match self.tool {
            Tool::Line { size } => raster::thicken(raster::line(start, end), size, clip),
            Tool::Rectangle {
                mode: ShapeMode::Stroke,
                size,
            } => raster::thicken(
                raster::rectangle_stroke(start, end, reach(size)),
                size,
                clip,
            ),
            Tool::Rectangle {
                mode: ShapeMode::Fill,
                ..
            } => raster::rectangle_fill(start, end, clip).collect(),
            Tool::Circle {
                mode: ShapeMode::Stroke,
                size,
            } => raster::thicken(
                raster::circle_stroke(start, raster::circle_radius(start, end), reach(size)),
                size,
                clip,
            ),
            Tool::Circle {
                mode: ShapeMode::Fill,
                ..
            } => raster::circle_fill(start, raster::circle_radius(start, end), clip).collect(),
            // Only shape tools build a Shape.
            Tool::Brush { .. } | Tool::Eraser { .. } | Tool::Fill | Tool::Eyedropper => {
                Vec::new()
            }
        }
    }
}

/// Progress of one gesture.
#[derive(Clone, Debug, Default)]
pub enum ToolState {
    /// Nothing will come of this gesture.
    #[default]
    Idle,
    Stroke(Stroke),
    Shape(Shape),
    /// Flood fill happens on release.
    Filling { layer: LayerId, color: Argb },
    /// The composite is taken once at the start of the gesture.
    Picking {
        composite: Option<Arc<PixelBuffer>>,
        picked: Option<Argb>,
    },
}
impl ToolState {
    /// Color under the pointer, for the eyedropper.
    #[must_use]
    pub fn picked_color(&self) -> Option<Argb> {
        match self {
            Self::Picking { picked, .. } => *picked,
            _ => None,
        }
    }
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}
