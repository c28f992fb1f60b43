//! # Editing sessions
//!
//! An [`EditingSession`] is one open document plus everything needed to edit it: the undo history, the selected
//! tool, and the gesture currently in flight. Front ends feed it pointer events and high level requests.
//!
//! Layer edits are routed through commands and so are undoable. View state (zoom, pan, grid, colors, which layer
//! is active) is applied directly and is not part of the history.

use crate::color::Argb;
use crate::commands::{AddLayer, CanvasCommand, CommandError, DrawLine, DrawPixel, ModifyLayer, RemoveLayer};
use crate::history::HistoryManager;
use crate::id::LayerId;
use crate::state::{BufferError, CanvasDocument, DocumentError, PixelBuffer};
use crate::tools::{Tool, ToolState};
use crate::util::{Offset, Point};
use std::num::NonZeroUsize;

/// Factor used by [`EditingSession::zoom_in`] and [`EditingSession::zoom_out`].
pub const ZOOM_STEP: f32 = 2.0;

/// What came of a finished gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureOutcome {
    /// No gesture in progress, or it produced nothing.
    Nothing,
    /// A command was executed and recorded.
    Committed,
    /// The eyedropper picked a color, which is now the primary color.
    Picked(Argb),
}

pub struct EditingSession {
    document: CanvasDocument,
    history: HistoryManager,
    tool: Tool,
    gesture: Option<ToolState>,
}
impl EditingSession {
    #[must_use]
    pub fn new(document: CanvasDocument, max_history: NonZeroUsize) -> Self {
        Self {
            document,
            history: HistoryManager::new(max_history),
            tool: Tool::default(),
            gesture: None,
        }
    }
    #[must_use]
    pub fn document(&self) -> &CanvasDocument {
        &self.document
    }
    #[must_use]
    pub fn history(&self) -> &HistoryManager {
        &self.history
    }
    #[must_use]
    pub fn tool(&self) -> Tool {
        self.tool
    }
    /// Select a tool. Any gesture in progress is dropped without effect.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.gesture.take().is_some() {
            log::debug!("tool changed mid-gesture, dropping it");
        }
        self.tool = tool;
    }
    /// Change the size of the current tool, if it has one.
    pub fn set_tool_size(&mut self, size: u32) {
        self.set_tool(self.tool.with_size(size));
    }
    pub fn composite(&self) -> Result<PixelBuffer, BufferError> {
        self.document.composite()
    }

    // ======== History
    pub fn execute(&mut self, command: CanvasCommand) -> Result<(), CommandError> {
        self.document = self.history.execute(&self.document, command)?;
        Ok(())
    }
    pub fn undo(&mut self) -> Result<(), CommandError> {
        self.document = self.history.undo(&self.document)?;
        Ok(())
    }
    pub fn redo(&mut self) -> Result<(), CommandError> {
        self.document = self.history.redo(&self.document)?;
        Ok(())
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ======== Undoable layer edits
    /// Add a blank layer on top and make it active.
    pub fn add_layer(&mut self, name: impl Into<String>) -> Result<LayerId, CommandError> {
        let (document, layer) = self.document.new_layer(name)?;
        let id = layer.id();
        // The id generator advancing isn't something to undo.
        self.document = document;
        self.execute(CanvasCommand::AddLayer(AddLayer::new(layer)))?;
        Ok(id)
    }
    pub fn remove_layer(&mut self, id: LayerId) -> Result<(), CommandError> {
        self.execute(CanvasCommand::RemoveLayer(RemoveLayer::new(id)))
    }
    /// Opacity is clamped into `[0, 1]`. NaN is an error.
    pub fn set_layer_opacity(&mut self, id: LayerId, opacity: f32) -> Result<(), CommandError> {
        let command = ModifyLayer::opacity(id, opacity.clamp(0.0, 1.0))?;
        self.execute(CanvasCommand::ModifyLayer(command))
    }
    pub fn toggle_layer_visibility(&mut self, id: LayerId) -> Result<(), CommandError> {
        let Some(layer) = self.document.layer(id) else {
            return Ok(());
        };
        let command = ModifyLayer::visible(id, !layer.visible);
        self.execute(CanvasCommand::ModifyLayer(command))
    }
    pub fn toggle_layer_lock(&mut self, id: LayerId) -> Result<(), CommandError> {
        let Some(layer) = self.document.layer(id) else {
            return Ok(());
        };
        let command = ModifyLayer::locked(id, !layer.locked);
        self.execute(CanvasCommand::ModifyLayer(command))
    }
    pub fn rename_layer(&mut self, id: LayerId, name: impl Into<String>) -> Result<(), CommandError> {
        self.execute(CanvasCommand::ModifyLayer(ModifyLayer::rename(id, name)))
    }
    pub fn clear_active_layer(&mut self) -> Result<(), CommandError> {
        let Some(id) = self.document.active_layer_id() else {
            return Ok(());
        };
        self.execute(CanvasCommand::ModifyLayer(ModifyLayer::clear(id)))
    }
    /// Set one pixel of the active layer.
    pub fn draw_pixel(&mut self, point: Point, color: Argb) -> Result<(), CommandError> {
        let Some(id) = self.document.active_layer_id() else {
            return Ok(());
        };
        self.execute(CanvasCommand::DrawPixel(DrawPixel::new(id, point, color)))
    }
    /// Draw a one pixel line on the active layer.
    pub fn draw_line(&mut self, from: Point, to: Point, color: Argb) -> Result<(), CommandError> {
        let Some(id) = self.document.active_layer_id() else {
            return Ok(());
        };
        self.execute(CanvasCommand::DrawLine(DrawLine::new(id, from, to, color)))
    }

    // ======== View state, not recorded
    pub fn set_zoom(&mut self, zoom: f32) -> Result<(), DocumentError> {
        self.document = self.document.with_zoom(zoom)?;
        Ok(())
    }
    pub fn zoom_in(&mut self) -> Result<(), DocumentError> {
        self.set_zoom(self.document.zoom() * ZOOM_STEP)
    }
    pub fn zoom_out(&mut self) -> Result<(), DocumentError> {
        self.set_zoom(self.document.zoom() / ZOOM_STEP)
    }
    pub fn set_pan(&mut self, pan: Offset) {
        self.document = self.document.with_pan(pan);
    }
    pub fn pan_by(&mut self, delta: Offset) {
        self.set_pan(self.document.pan() + delta);
    }
    pub fn toggle_grid(&mut self) {
        self.document = self.document.toggle_grid();
    }
    pub fn toggle_grid_snap(&mut self) {
        self.document = self.document.toggle_grid_snap();
    }
    pub fn set_grid_color(&mut self, color: Argb) {
        self.document = self.document.with_grid_color(color);
    }
    pub fn set_primary_color(&mut self, color: Argb) {
        self.document = self.document.set_primary_color(color);
    }
    pub fn set_secondary_color(&mut self, color: Argb) {
        self.document = self.document.set_secondary_color(color);
    }
    pub fn swap_colors(&mut self) {
        self.document = self.document.swap_colors();
    }
    pub fn set_active_layer(&mut self, id: LayerId) -> Result<(), DocumentError> {
        self.document = self.document.set_active_layer(id)?;
        Ok(())
    }
    pub fn move_layer(&mut self, from: usize, to: usize) -> Result<(), DocumentError> {
        self.document = self.document.move_layer(from, to)?;
        Ok(())
    }
    /// Copy a layer above itself. Returns the copy's id, or `None` if `id` wasn't found.
    pub fn duplicate_layer(&mut self, id: LayerId) -> Result<Option<LayerId>, DocumentError> {
        let (document, new_id) = self.document.duplicate_layer(id)?;
        self.document = document;
        Ok(new_id)
    }
    /// Change the canvas size.
    ///
    /// Recorded commands refer to cells of the old size, so history is cleared.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), DocumentError> {
        self.document = self.document.resized(width, height)?;
        self.history.clear();
        self.gesture = None;
        Ok(())
    }

    // ======== Gestures
    /// Start a gesture with the current tool. A gesture already in progress is dropped.
    pub fn pointer_down(&mut self, point: Point) {
        let color = self.document.primary_color();
        self.gesture = Some(self.tool.on_down(&self.document, point, color));
    }
    pub fn pointer_move(&mut self, point: Point) {
        let Some(state) = self.gesture.take() else {
            return;
        };
        let color = self.document.primary_color();
        self.gesture = Some(self.tool.on_move(&self.document, point, color, state));
    }
    /// Finish the gesture, committing whatever it produced.
    pub fn pointer_up(&mut self, point: Point) -> Result<GestureOutcome, CommandError> {
        let Some(state) = self.gesture.take() else {
            return Ok(GestureOutcome::Nothing);
        };
        let color = self.document.primary_color();
        let state = self.tool.on_move(&self.document, point, color, state);
        if let Some(picked) = state.picked_color() {
            self.set_primary_color(picked);
            return Ok(GestureOutcome::Picked(picked));
        }
        match self.tool.on_up(&self.document, point, color, state) {
            Some(command) => {
                self.execute(command)?;
                Ok(GestureOutcome::Committed)
            }
            None => Ok(GestureOutcome::Nothing),
        }
    }
    /// Abandon the gesture. The document is untouched.
    pub fn cancel_gesture(&mut self) {
        self.gesture = None;
    }
    #[must_use]
    pub fn is_gesture_active(&self) -> bool {
        self.gesture.is_some()
    }
    /// What the gesture in progress would paint.
    #[must_use]
    pub fn preview(&self) -> Vec<(Point, Argb)> {
        self.gesture
            .as_ref()
            .map(|state| self.tool.preview(state))
            .unwrap_or_default()
    }
}
