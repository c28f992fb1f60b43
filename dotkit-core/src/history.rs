//! # History
//!
//! A linear undo/redo history of [`CanvasCommand`]s. Executing anything new forgets the redo stack, there
//! is no branching.
//!
//! The undo stack is bounded, the oldest command is dropped when it overflows. Documents are values, so the
//! history never holds a document itself. Every call takes the present document and returns the next one.

use crate::commands::{CanvasCommand, CommandError};
use crate::state::CanvasDocument;
use std::collections::VecDeque;
use std::num::NonZeroUsize;

pub const DEFAULT_MAX_HISTORY: NonZeroUsize = match NonZeroUsize::new(50) {
    Some(n) => n,
    None => unreachable!(),
};

#[derive(Clone, Debug)]
pub struct HistoryManager {
    // Front is the oldest.
    undo: VecDeque<CanvasCommand>,
    // Last is the most recently undone.
    redo: Vec<CanvasCommand>,
    max_size: NonZeroUsize,
}
impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}
impl HistoryManager {
    #[must_use]
    pub fn new(max_size: NonZeroUsize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_size,
        }
    }
    #[must_use]
    pub fn max_size(&self) -> NonZeroUsize {
        self.max_size
    }
    /// Change the bound, dropping the oldest entries if it shrank.
    pub fn set_max_size(&mut self, max_size: NonZeroUsize) {
        self.max_size = max_size;
        self.evict();
    }
    fn evict(&mut self) {
        while self.undo.len() > self.max_size.get() {
            if let Some(oldest) = self.undo.pop_front() {
                log::debug!("history full, forgetting {}", oldest.name());
            }
        }
    }
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }
    /// Forget everything.
    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Run a new command against `document` and record it.
    ///
    /// On error, neither stack is touched and the command is dropped.
    pub fn execute(
        &mut self,
        document: &CanvasDocument,
        mut command: CanvasCommand,
    ) -> Result<CanvasDocument, CommandError> {
        let next = command.execute(document)?;
        self.redo.clear();
        self.undo.push_back(command);
        self.evict();
        Ok(next)
    }
    /// Undo the most recent command. With nothing to undo, the document is returned as-is.
    ///
    /// On error the command stays on the undo stack.
    pub fn undo(&mut self, document: &CanvasDocument) -> Result<CanvasDocument, CommandError> {
        let Some(command) = self.undo.pop_back() else {
            return Ok(document.clone());
        };
        match command.undo(document) {
            Ok(prev) => {
                self.redo.push(command);
                Ok(prev)
            }
            Err(err) => {
                self.undo.push_back(command);
                Err(err)
            }
        }
    }
    /// Redo the most recently undone command. With nothing to redo, the document is returned as-is.
    ///
    /// On error the command stays on the redo stack.
    pub fn redo(&mut self, document: &CanvasDocument) -> Result<CanvasDocument, CommandError> {
        let Some(mut command) = self.redo.pop() else {
            return Ok(document.clone());
        };
        match command.execute(document) {
            Ok(next) => {
                // The bound may have shrunk since this was undone.
                self.undo.push_back(command);
                self.evict();
                Ok(next)
            }
            Err(err) => {
                self.redo.push(command);
                Err(err)
            }
        }
    }
    /// Undo up to `num` steps, stopping early at the first error or the start of history.
    pub fn undo_n(
        &mut self,
        document: &CanvasDocument,
        num: usize,
    ) -> Result<CanvasDocument, CommandError> {
        (0..num.min(self.undo_len())).try_fold(document.clone(), |doc, _| self.undo(&doc))
    }
    /// Redo up to `num` steps.
    pub fn redo_n(
        &mut self,
        document: &CanvasDocument,
        num: usize,
    ) -> Result<CanvasDocument, CommandError> {
        (0..num.min(self.redo_len())).try_fold(document.clone(), |doc, _| self.redo(&doc))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::color::Argb;
    use crate::commands::DrawPixel;
    use crate::id::LayerId;
    use crate::util::Point;

    fn doc() -> (CanvasDocument, LayerId) {
        let doc = CanvasDocument::with_seed(4, 4, 3).unwrap();
        let (doc, mut layer) = doc.new_layer("White").unwrap();
        layer.fill(Argb::WHITE);
        let id = layer.id();
        (doc.add_layer(layer).unwrap(), id)
    }
    fn draw(id: LayerId, x: i32, y: i32) -> CanvasCommand {
        CanvasCommand::DrawPixel(DrawPixel::new(id, Point::new(x, y), Argb::BLACK))
    }

    #[test]
    fn redo_reproduces_execute() {
        let (doc, id) = doc();
        let mut history = HistoryManager::default();
        let executed = history.execute(&doc, draw(id, 1, 1)).unwrap();
        assert!(history.can_undo());
        assert!(!history.can_redo());

        let undone = history.undo(&executed).unwrap();
        assert_eq!(undone, doc);
        assert!(history.can_redo());

        let redone = history.redo(&undone).unwrap();
        assert_eq!(redone, executed);
        assert!(!history.can_redo());
    }
    #[test]
    fn eviction() {
        let (mut doc, id) = doc();
        let max = NonZeroUsize::new(5).unwrap();
        let mut history = HistoryManager::new(max);
        for i in 0..6 {
            doc = history.execute(&doc, draw(id, i % 4, i / 4)).unwrap();
        }
        assert_eq!(history.undo_len(), 5);
        assert!(history.can_undo());
        // The first draw can't be undone anymore.
        let oldest = history.undo_n(&doc, 10).unwrap();
        assert!(!history.can_undo());
        let layer = oldest.layer(id).unwrap();
        assert_eq!(layer.get_pixel(Point::new(0, 0)), Ok(Argb::BLACK));
        assert_eq!(layer.get_pixel(Point::new(1, 0)), Ok(Argb::WHITE));
    }
    #[test]
    fn shrink_evicts() {
        let (mut doc, id) = doc();
        let mut history = HistoryManager::default();
        for i in 0..4 {
            doc = history.execute(&doc, draw(id, i, 0)).unwrap();
        }
        history.set_max_size(NonZeroUsize::new(2).unwrap());
        assert_eq!(history.undo_len(), 2);
    }
    #[test]
    fn redo_respects_shrunk_bound() {
        let (mut doc, id) = doc();
        let mut history = HistoryManager::new(NonZeroUsize::new(5).unwrap());
        for i in 0..4 {
            doc = history.execute(&doc, draw(id, i, 0)).unwrap();
        }
        doc = history.undo_n(&doc, 2).unwrap();
        history.set_max_size(NonZeroUsize::new(2).unwrap());
        assert_eq!(history.undo_len(), 2);
        let doc = history.redo_n(&doc, 2).unwrap();
        assert_eq!(history.undo_len(), 2);
        assert!(!history.can_redo());
        // Both redone draws are present.
        let layer = doc.layer(id).unwrap();
        assert_eq!(layer.get_pixel(Point::new(3, 0)), Ok(Argb::BLACK));
    }
    #[test]
    fn execute_clears_redo() {
        let (doc, id) = doc();
        let mut history = HistoryManager::default();
        let doc = history.execute(&doc, draw(id, 0, 0)).unwrap();
        let doc = history.undo(&doc).unwrap();
        assert_eq!(history.redo_len(), 1);
        let _ = history.execute(&doc, draw(id, 1, 0)).unwrap();
        assert!(!history.can_redo());
    }
    #[test]
    fn failed_execute_changes_nothing() {
        let (doc, id) = doc();
        let mut history = HistoryManager::default();
        let drawn = history.execute(&doc, draw(id, 0, 0)).unwrap();
        let drawn = history.undo(&drawn).unwrap();
        assert!(history.execute(&drawn, draw(id, 10, 10)).is_err());
        assert_eq!(history.undo_len(), 0);
        assert_eq!(history.redo_len(), 1);
    }
    #[test]
    fn empty_stacks_are_noops() {
        let (doc, _) = doc();
        let mut history = HistoryManager::default();
        assert_eq!(history.undo(&doc).unwrap(), doc);
        assert_eq!(history.redo(&doc).unwrap(), doc);
    }
    #[test]
    fn walk_back_and_forth() {
        let (start, id) = doc();
        let mut history = HistoryManager::default();
        let mut doc = start.clone();
        for i in 0..3 {
            doc = history.execute(&doc, draw(id, i, i)).unwrap();
        }
        let end = doc.clone();
        let back = history.undo_n(&doc, 3).unwrap();
        assert_eq!(back, start);
        let forward = history.redo_n(&back, 3).unwrap();
        assert_eq!(forward, end);
    }
}
