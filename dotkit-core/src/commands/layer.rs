//! Commands adding, removing, and changing whole layers.

use super::{Backup, CommandError};
use crate::id::LayerId;
use crate::state::{CanvasDocument, Layer, LayerError};
use std::sync::Arc;

/// Append a layer on top and make it active.
#[derive(Clone, Debug)]
pub struct AddLayer {
    layer: Layer,
    // Active layer before the add.
    backup: Backup<Option<LayerId>>,
}
impl AddLayer {
    #[must_use]
    pub fn new(layer: Layer) -> Self {
        Self {
            layer,
            backup: Backup::Pending,
        }
    }
    #[must_use]
    pub fn layer(&self) -> &Layer {
        &self.layer
    }
    pub(super) fn execute(
        &mut self,
        document: &CanvasDocument,
    ) -> Result<CanvasDocument, CommandError> {
        let result = document.add_layer(self.layer.clone())?;
        self.backup
            .capture_with(|| Ok::<_, CommandError>(document.active_layer_id()))?;
        Ok(result)
    }
    pub(super) fn undo(&self, document: &CanvasDocument) -> Result<CanvasDocument, CommandError> {
        let Backup::Captured(prior_active) = &self.backup else {
            return Ok(document.clone());
        };
        Ok(document
            .remove_layer(self.layer.id())
            .with_active_layer(*prior_active)?)
    }
}

/// Everything needed to put a removed layer back.
#[derive(Clone, Debug)]
pub struct RemovedLayer {
    pub layer: Layer,
    pub index: usize,
    pub prior_active: Option<LayerId>,
}

/// Remove a layer. Unknown layers are a no-op.
#[derive(Clone, Debug)]
pub struct RemoveLayer {
    id: LayerId,
    backup: Backup<RemovedLayer>,
}
impl RemoveLayer {
    #[must_use]
    pub fn new(id: LayerId) -> Self {
        Self {
            id,
            backup: Backup::Pending,
        }
    }
    #[must_use]
    pub fn backup(&self) -> &Backup<RemovedLayer> {
        &self.backup
    }
    pub(super) fn execute(
        &mut self,
        document: &CanvasDocument,
    ) -> Result<CanvasDocument, CommandError> {
        let layers = document.layers();
        let (Some(index), Some(layer)) = (layers.index_of(self.id), document.layer(self.id)) else {
            log::debug!("remove of missing layer {}", self.id);
            return Ok(document.clone());
        };
        self.backup.capture_with(|| {
            Ok::<_, CommandError>(RemovedLayer {
                layer: layer.clone(),
                index,
                prior_active: document.active_layer_id(),
            })
        })?;
        Ok(document.remove_layer(self.id))
    }
    pub(super) fn undo(&self, document: &CanvasDocument) -> Result<CanvasDocument, CommandError> {
        let Backup::Captured(removed) = &self.backup else {
            return Ok(document.clone());
        };
        Ok(document
            .insert_layer(removed.index, removed.layer.clone())?
            .with_active_layer(removed.prior_active)?)
    }
}

type Transform = dyn Fn(&Layer) -> Layer + Send + Sync;

/// Replace a layer with a transformed version of itself. Undo restores the original wholesale.
#[derive(Clone)]
pub struct ModifyLayer {
    id: LayerId,
    label: &'static str,
    transform: Arc<Transform>,
    backup: Backup<Layer>,
}
impl ModifyLayer {
    pub fn new(
        id: LayerId,
        label: &'static str,
        transform: impl Fn(&Layer) -> Layer + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            label,
            transform: Arc::new(transform),
            backup: Backup::Pending,
        }
    }
    /// Set the opacity, which must be in `[0, 1]`.
    pub fn opacity(id: LayerId, opacity: f32) -> Result<Self, LayerError> {
        if !(0.0..=1.0).contains(&opacity) {
            return Err(LayerError::InvalidOpacity(opacity));
        }
        Ok(Self::new(id, "set opacity", move |layer| {
            // Checked above.
            layer
                .clone()
                .with_opacity(opacity)
                .unwrap_or_else(|_| layer.clone())
        }))
    }
    #[must_use]
    pub fn visible(id: LayerId, visible: bool) -> Self {
        Self::new(id, "set visibility", move |layer| {
            layer.clone().with_visible(visible)
        })
    }
    #[must_use]
    pub fn locked(id: LayerId, locked: bool) -> Self {
        Self::new(id, "set lock", move |layer| layer.clone().with_locked(locked))
    }
    #[must_use]
    pub fn rename(id: LayerId, name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self::new(id, "rename layer", move |layer| {
            layer.clone().with_name(name.clone())
        })
    }
    /// Clear to transparent. Locked layers stay as they are.
    #[must_use]
    pub fn clear(id: LayerId) -> Self {
        Self::new(id, "clear layer", |layer| {
            let mut layer = layer.clone();
            layer.clear();
            layer
        })
    }
    #[must_use]
    pub fn label(&self) -> &'static str {
        self.label
    }
    #[must_use]
    pub fn backup(&self) -> &Backup<Layer> {
        &self.backup
    }
    pub(super) fn execute(
        &mut self,
        document: &CanvasDocument,
    ) -> Result<CanvasDocument, CommandError> {
        let Some(original) = document.layer(self.id) else {
            log::debug!("{} on missing layer {}", self.label, self.id);
            return Ok(document.clone());
        };
        self.backup
            .capture_with(|| Ok::<_, CommandError>(original.clone()))?;
        let transform: &Transform = &*self.transform;
        Ok(document.update_layer(self.id, transform))
    }
    pub(super) fn undo(&self, document: &CanvasDocument) -> Result<CanvasDocument, CommandError> {
        let Backup::Captured(original) = &self.backup else {
            return Ok(document.clone());
        };
        Ok(document.update_layer(self.id, |_| original.clone()))
    }
}
impl std::fmt::Debug for ModifyLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModifyLayer")
            .field("id", &self.id)
            .field("label", &self.label)
            .field("backup", &self.backup)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod test {
    use super::super::{CanvasCommand, DrawPixel};
    use super::*;
    use crate::color::Argb;
    use crate::util::Point;

    fn three_layers() -> CanvasDocument {
        let mut doc = CanvasDocument::with_seed(2, 2, 7).unwrap();
        for name in ["A", "B", "C"] {
            let (next, layer) = doc.new_layer(name).unwrap();
            doc = next.add_layer(layer).unwrap();
        }
        doc
    }
    fn round_trip(doc: &CanvasDocument, mut command: CanvasCommand) -> CanvasDocument {
        let after = command.execute(doc).unwrap();
        assert_eq!(&command.undo(&after).unwrap(), doc);
        let again = command.execute(doc).unwrap();
        assert_eq!(again, after);
        after
    }

    #[test]
    fn add_round_trip() {
        let doc = three_layers();
        let (doc, layer) = doc.new_layer("D").unwrap();
        let id = layer.id();
        let after = round_trip(&doc, CanvasCommand::AddLayer(AddLayer::new(layer)));
        assert_eq!(after.active_layer_id(), Some(id));
        assert_eq!(after.layers().top().map(Layer::id), Some(id));
    }
    #[test]
    fn add_to_empty_round_trip() {
        let doc = CanvasDocument::with_seed(2, 2, 7).unwrap();
        let (doc, layer) = doc.new_layer("Only").unwrap();
        round_trip(&doc, CanvasCommand::AddLayer(AddLayer::new(layer)));
    }
    #[test]
    fn add_duplicate_fails() {
        let doc = three_layers();
        let existing = doc.layers().get(0).unwrap().clone();
        let mut command = AddLayer::new(existing);
        assert!(command.execute(&doc).is_err());
        assert!(!command.backup.is_captured());
    }
    #[test]
    fn remove_round_trip_each_position() {
        let doc = three_layers();
        for index in 0..3 {
            let id = doc.layers().get(index).unwrap().id();
            // Removing both the active and inactive layers must restore exactly.
            round_trip(&doc, CanvasCommand::RemoveLayer(RemoveLayer::new(id)));
            let active = doc.set_active_layer(id).unwrap();
            round_trip(&active, CanvasCommand::RemoveLayer(RemoveLayer::new(id)));
        }
    }
    #[test]
    fn remove_only_layer_round_trip() {
        let doc = CanvasDocument::with_seed(2, 2, 7).unwrap();
        let (doc, layer) = doc.new_layer("Only").unwrap();
        let id = layer.id();
        let doc = doc.add_layer(layer).unwrap();
        let after = round_trip(&doc, CanvasCommand::RemoveLayer(RemoveLayer::new(id)));
        assert_eq!(after.active_layer_id(), None);
    }
    #[test]
    fn remove_missing_is_noop() {
        let doc = three_layers();
        let mut ids = doc.layer_ids();
        let mut command = RemoveLayer::new(ids.next_id());
        assert_eq!(command.execute(&doc).unwrap(), doc);
        assert!(!command.backup().is_captured());
    }
    #[test]
    fn modify_round_trips() {
        let doc = three_layers();
        let id = doc.layers().get(1).unwrap().id();
        // Some content, so clear has something to do.
        let mut draw = CanvasCommand::DrawPixel(DrawPixel::new(id, Point::new(0, 0), Argb::BLACK));
        let doc = draw.execute(&doc).unwrap();

        let after = round_trip(
            &doc,
            CanvasCommand::ModifyLayer(ModifyLayer::opacity(id, 0.25).unwrap()),
        );
        assert_eq!(after.layer(id).unwrap().opacity(), 0.25);
        let after = round_trip(&doc, CanvasCommand::ModifyLayer(ModifyLayer::visible(id, false)));
        assert!(!after.layer(id).unwrap().visible);
        let after = round_trip(&doc, CanvasCommand::ModifyLayer(ModifyLayer::locked(id, true)));
        assert!(after.layer(id).unwrap().locked);
        let after = round_trip(&doc, CanvasCommand::ModifyLayer(ModifyLayer::rename(id, "Ink")));
        assert_eq!(after.layer(id).unwrap().name(), "Ink");
        let after = round_trip(&doc, CanvasCommand::ModifyLayer(ModifyLayer::clear(id)));
        assert!(after
            .layer(id)
            .unwrap()
            .pixels()
            .as_slice()
            .iter()
            .all(|c| c.is_transparent()));
    }
    #[test]
    fn modify_keeps_id() {
        let doc = three_layers();
        let id = doc.layers().get(0).unwrap().id();
        let mut ids = doc.layer_ids();
        let stranger = ids.next_id();
        let mut command = ModifyLayer::new(id, "rekey", move |layer| layer.clone().with_id(stranger));
        let after = command.execute(&doc).unwrap();
        assert!(after.layer(id).is_some());
        assert!(after.layer(stranger).is_none());
    }
    #[test]
    fn opacity_validated() {
        let mut ids = crate::id::LayerIdGenerator::with_seed(0);
        let id = ids.next_id();
        assert_eq!(
            ModifyLayer::opacity(id, 2.0).err(),
            Some(LayerError::InvalidOpacity(2.0))
        );
        assert!(ModifyLayer::opacity(id, f32::NAN).is_err());
    }
    #[test]
    fn composite_round_trip_and_rollback() {
        let doc = three_layers();
        let id = doc.active_layer_id().unwrap();
        let composite = CanvasCommand::Composite(vec![
            CanvasCommand::DrawPixel(DrawPixel::new(id, Point::new(0, 0), Argb::BLACK)),
            CanvasCommand::ModifyLayer(ModifyLayer::rename(id, "Sketch")),
            CanvasCommand::RemoveLayer(RemoveLayer::new(id)),
        ]);
        let after = round_trip(&doc, composite);
        assert!(after.layer(id).is_none());

        // Second child fails, the whole thing fails and nothing leaks out.
        let mut failing = CanvasCommand::Composite(vec![
            CanvasCommand::DrawPixel(DrawPixel::new(id, Point::new(0, 0), Argb::BLACK)),
            CanvasCommand::DrawPixel(DrawPixel::new(id, Point::new(9, 9), Argb::BLACK)),
        ]);
        assert!(failing.execute(&doc).is_err());
        assert_eq!(failing.undo(&doc).unwrap().layer(id), doc.layer(id));
    }
}
