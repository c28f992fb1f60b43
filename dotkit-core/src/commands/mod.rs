//! # Commands
//!
//! Commands are the way a document is modified by the user. Every drawing or layer edit is described as a
//! [`CanvasCommand`], which knows how to apply itself to a document and how to take itself back.
//!
//! Commands don't know the state they'll be applied to until they're applied, so the "before" state needed to
//! undo is captured lazily on the first [`CanvasCommand::execute`] and stored in a [`Backup`]. Later executions
//! (i.e., redo) reuse that capture rather than recording over it.

pub mod layer;
pub mod pixels;

pub use layer::{AddLayer, ModifyLayer, RemoveLayer};
pub use pixels::{DrawLine, DrawPixel, DrawPixelBatch, Fill};

use crate::state::{BufferError, CanvasDocument, DocumentError, LayerError};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Layer(#[from] LayerError),
}
impl From<crate::state::LayerStackError> for CommandError {
    fn from(value: crate::state::LayerStackError) -> Self {
        Self::Document(value.into())
    }
}

/// State captured by a command so that it may be undone.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Backup<T> {
    /// Not yet executed, or executed with no effect.
    #[default]
    Pending,
    Captured(T),
}
impl<T> Backup<T> {
    #[must_use]
    pub fn get(&self) -> Option<&T> {
        match self {
            Self::Pending => None,
            Self::Captured(t) => Some(t),
        }
    }
    #[must_use]
    pub fn is_captured(&self) -> bool {
        matches!(self, Self::Captured(..))
    }
    /// Capture with `f` if pending. An existing capture is kept as-is.
    pub fn capture_with<E>(&mut self, f: impl FnOnce() -> Result<T, E>) -> Result<(), E> {
        if let Self::Pending = self {
            *self = Self::Captured(f()?);
        }
        Ok(())
    }
}

#[derive(Clone, Debug)]
pub enum CanvasCommand {
    DrawPixel(DrawPixel),
    DrawPixelBatch(DrawPixelBatch),
    DrawLine(DrawLine),
    AddLayer(AddLayer),
    RemoveLayer(RemoveLayer),
    ModifyLayer(ModifyLayer),
    Fill(Fill),
    /// Many commands, treated as one. Applied in order, undone in reverse.
    Composite(Vec<CanvasCommand>),
}
impl CanvasCommand {
    /// Apply to `document`, capturing undo state on first use.
    ///
    /// On error, nothing is returned and `document` is of course unchanged. A composite whose nth child fails
    /// discards the work of the children before it.
    pub fn execute(&mut self, document: &CanvasDocument) -> Result<CanvasDocument, CommandError> {
        log::trace!("execute {}", self.name());
        match self {
            Self::DrawPixel(c) => c.execute(document),
            Self::DrawPixelBatch(c) => c.execute(document),
            Self::DrawLine(c) => c.execute(document),
            Self::AddLayer(c) => c.execute(document),
            Self::RemoveLayer(c) => c.execute(document),
            Self::ModifyLayer(c) => c.execute(document),
            Self::Fill(c) => c.execute(document),
            Self::Composite(commands) => {
                let total = commands.len();
                let mut current = document.clone();
                for (idx, command) in commands.iter_mut().enumerate() {
                    current = command.execute(&current).map_err(|err| {
                        log::debug!("composite rolled back at command {idx} of {total}: {err}");
                        err
                    })?;
                }
                Ok(current)
            }
        }
    }
    /// Reverse a previous [`Self::execute`]. A command that never captured anything undoes to the same document.
    pub fn undo(&self, document: &CanvasDocument) -> Result<CanvasDocument, CommandError> {
        log::trace!("undo {}", self.name());
        match self {
            Self::DrawPixel(c) => c.undo(document),
            Self::DrawPixelBatch(c) => c.undo(document),
            Self::DrawLine(c) => c.undo(document),
            Self::AddLayer(c) => c.undo(document),
            Self::RemoveLayer(c) => c.undo(document),
            Self::ModifyLayer(c) => c.undo(document),
            Self::Fill(c) => c.undo(document),
            Self::Composite(commands) => commands
                .iter()
                .rev()
                .try_fold(document.clone(), |current, command| command.undo(&current)),
        }
    }
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::DrawPixel(_) => "draw pixel",
            Self::DrawPixelBatch(_) => "draw pixels",
            Self::DrawLine(_) => "draw line",
            Self::AddLayer(_) => "add layer",
            Self::RemoveLayer(_) => "remove layer",
            Self::ModifyLayer(c) => c.label(),
            Self::Fill(_) => "fill",
            Self::Composite(_) => "composite",
        }
    }
}
macro_rules! command_from {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for CanvasCommand {
                fn from(value: $variant) -> Self {
                    Self::$variant(value)
                }
            }
        )*
    };
}
command_from!(
    DrawPixel,
    DrawPixelBatch,
    DrawLine,
    AddLayer,
    RemoveLayer,
    ModifyLayer,
    Fill
);

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::Argb;
    use crate::util::Point;

    #[test]
    fn capture_keeps_first() {
        let mut backup = Backup::Pending;
        assert!(!backup.is_captured());
        backup.capture_with(|| Ok::<_, ()>(1)).unwrap();
        backup.capture_with(|| Ok::<_, ()>(2)).unwrap();
        assert_eq!(backup.get(), Some(&1));
    }
    #[test]
    fn failed_capture_stays_pending() {
        let mut backup = Backup::<i32>::Pending;
        assert_eq!(backup.capture_with(|| Err("nope")), Err("nope"));
        assert_eq!(backup, Backup::Pending);
    }
    #[test]
    fn composite_undoes_in_reverse() {
        let doc = CanvasDocument::with_seed(2, 2, 9).unwrap();
        let (doc, layer) = doc.new_layer("Layer").unwrap();
        let id = layer.id();
        let doc = doc.add_layer(layer).unwrap();
        let point = Point::new(0, 0);
        let mut composite = CanvasCommand::Composite(vec![
            DrawPixel::new(id, point, Argb::WHITE).into(),
            DrawPixel::new(id, point, Argb::BLACK).into(),
        ]);
        assert_eq!(composite.name(), "composite");
        let drawn = composite.execute(&doc).unwrap();
        assert_eq!(drawn.layer(id).unwrap().get_pixel(point), Ok(Argb::BLACK));
        let undone = composite.undo(&drawn).unwrap();
        assert_eq!(undone, doc);
    }
    #[test]
    fn failed_composite_returns_error() {
        let doc = CanvasDocument::with_seed(2, 2, 9).unwrap();
        let (doc, layer) = doc.new_layer("Layer").unwrap();
        let id = layer.id();
        let doc = doc.add_layer(layer).unwrap();
        let mut composite = CanvasCommand::Composite(vec![
            DrawPixel::new(id, Point::new(0, 0), Argb::WHITE).into(),
            DrawPixel::new(id, Point::new(5, 5), Argb::BLACK).into(),
        ]);
        assert!(matches!(
            composite.execute(&doc),
            Err(CommandError::Buffer(BufferError::OutOfBounds { .. }))
        ));
    }
}
