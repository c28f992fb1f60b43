//! # Documents
//!
//! [`CanvasDocument`] is a plain value. Every mutator borrows `self` and returns a new document, leaving the
//! original untouched. Clones share layer pixels until written.

use super::layer::Layer;
use super::layers::{LayerManager, LayerStackError};
use super::pixel_buffer::{BufferError, PixelBuffer};
use crate::color::Argb;
use crate::id::{LayerId, LayerIdGenerator};
use crate::util::Offset;

pub const MIN_ZOOM: f32 = 0.1;
pub const MAX_ZOOM: f32 = 32.0;
pub const DEFAULT_GRID_COLOR: Argb = Argb(0x4D80_8080);

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("layer {0} not found")]
    LayerNotFound(LayerId),
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("invalid zoom {0}")]
    InvalidZoom(f32),
    #[error(transparent)]
    Stack(#[from] LayerStackError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
}

#[derive(Clone, PartialEq, Debug)]
pub struct CanvasDocument {
    width: u32,
    height: u32,
    zoom: f32,
    pan: Offset,
    grid_visible: bool,
    grid_snap: bool,
    grid_color: Argb,
    layers: LayerManager,
    active_layer: Option<LayerId>,
    primary_color: Argb,
    secondary_color: Argb,
    layer_ids: LayerIdGenerator,
}
impl CanvasDocument {
    /// An empty document, with no layers.
    pub fn new(width: u32, height: u32) -> Result<Self, DocumentError> {
        Self::with_ids(width, height, LayerIdGenerator::new())
    }
    /// Like [`Self::new`], with reproducible layer ids.
    pub fn with_seed(width: u32, height: u32, seed: u64) -> Result<Self, DocumentError> {
        Self::with_ids(width, height, LayerIdGenerator::with_seed(seed))
    }
    fn with_ids(width: u32, height: u32, layer_ids: LayerIdGenerator) -> Result<Self, DocumentError> {
        // Same rules as a pixel buffer: nonzero, and addressable with i32 coordinates.
        let fits = |axis: u32| axis != 0 && i32::try_from(axis).is_ok();
        if !fits(width) || !fits(height) {
            return Err(DocumentError::InvalidDimensions { width, height });
        }
        Ok(Self {
            width,
            height,
            zoom: 1.0,
            pan: Offset::ZERO,
            grid_visible: true,
            grid_snap: false,
            grid_color: DEFAULT_GRID_COLOR,
            layers: LayerManager::new(),
            active_layer: None,
            primary_color: Argb::BLACK,
            secondary_color: Argb::WHITE,
            layer_ids,
        })
    }
    /// A ready-to-draw document: a white "Background" under an empty, active "Layer 1".
    pub fn create(width: u32, height: u32) -> Result<Self, DocumentError> {
        Self::new(width, height)?.with_default_layers()
    }
    /// Add the default "Background" and "Layer 1" layers.
    pub fn with_default_layers(&self) -> Result<Self, DocumentError> {
        let (doc, mut background) = self.new_layer("Background")?;
        background.fill(Argb::WHITE);
        let doc = doc.add_layer(background)?;
        let (doc, layer) = doc.new_layer("Layer 1")?;
        doc.add_layer(layer)
    }

    #[must_use]
    pub fn width(&self) -> u32 {
        self.width
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.height
    }
    #[must_use]
    pub fn zoom(&self) -> f32 {
        self.zoom
    }
    #[must_use]
    pub fn pan(&self) -> Offset {
        self.pan
    }
    #[must_use]
    pub fn grid_visible(&self) -> bool {
        self.grid_visible
    }
    #[must_use]
    pub fn grid_snap(&self) -> bool {
        self.grid_snap
    }
    #[must_use]
    pub fn grid_color(&self) -> Argb {
        self.grid_color
    }
    #[must_use]
    pub fn primary_color(&self) -> Argb {
        self.primary_color
    }
    #[must_use]
    pub fn secondary_color(&self) -> Argb {
        self.secondary_color
    }
    #[must_use]
    pub fn layers(&self) -> &LayerManager {
        &self.layers
    }
    #[must_use]
    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.find(id)
    }
    #[must_use]
    pub fn active_layer_id(&self) -> Option<LayerId> {
        self.active_layer
    }
    #[must_use]
    pub fn active_layer(&self) -> Option<&Layer> {
        self.layers.find(self.active_layer?)
    }
    #[must_use]
    pub fn layer_ids(&self) -> LayerIdGenerator {
        self.layer_ids
    }

    /// Set the zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`. Non-positive or non-finite zooms are rejected.
    pub fn with_zoom(&self, zoom: f32) -> Result<Self, DocumentError> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(DocumentError::InvalidZoom(zoom));
        }
        Ok(Self {
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            ..self.clone()
        })
    }
    #[must_use]
    pub fn with_pan(&self, pan: Offset) -> Self {
        Self {
            pan,
            ..self.clone()
        }
    }
    #[must_use]
    pub fn toggle_grid(&self) -> Self {
        Self {
            grid_visible: !self.grid_visible,
            ..self.clone()
        }
    }
    #[must_use]
    pub fn toggle_grid_snap(&self) -> Self {
        Self {
            grid_snap: !self.grid_snap,
            ..self.clone()
        }
    }
    #[must_use]
    pub fn with_grid_color(&self, grid_color: Argb) -> Self {
        Self {
            grid_color,
            ..self.clone()
        }
    }
    #[must_use]
    pub fn set_primary_color(&self, primary_color: Argb) -> Self {
        Self {
            primary_color,
            ..self.clone()
        }
    }
    #[must_use]
    pub fn set_secondary_color(&self, secondary_color: Argb) -> Self {
        Self {
            secondary_color,
            ..self.clone()
        }
    }
    #[must_use]
    pub fn swap_colors(&self) -> Self {
        Self {
            primary_color: self.secondary_color,
            secondary_color: self.primary_color,
            ..self.clone()
        }
    }

    /// Allocate a blank, document-sized layer. The returned document has its id generator advanced,
    /// the layer is *not* added.
    pub fn new_layer(&self, name: impl Into<String>) -> Result<(Self, Layer), DocumentError> {
        let mut layer_ids = self.layer_ids;
        let layer = Layer::new(layer_ids.next_id(), name, self.width, self.height)?;
        Ok((
            Self {
                layer_ids,
                ..self.clone()
            },
            layer,
        ))
    }
    /// Append on top and make it active.
    pub fn add_layer(&self, layer: Layer) -> Result<Self, DocumentError> {
        let active_layer = Some(layer.id());
        Ok(Self {
            layers: self.layers.add_layer(layer)?,
            active_layer,
            ..self.clone()
        })
    }
    /// Insert without changing the active layer.
    pub fn insert_layer(&self, index: usize, layer: Layer) -> Result<Self, DocumentError> {
        Ok(Self {
            layers: self.layers.insert_layer(index, layer)?,
            ..self.clone()
        })
    }
    /// Remove a layer. If it was active, the layer now at its old index (clamped to the new top) becomes active.
    /// Unknown ids are ignored.
    #[must_use]
    pub fn remove_layer(&self, id: LayerId) -> Self {
        let Some(index) = self.layers.index_of(id) else {
            log::debug!("remove of missing layer {id}");
            return self.clone();
        };
        let layers = self.layers.remove_layer(id);
        let active_layer = if self.active_layer == Some(id) {
            let fallback = index.min(layers.len().saturating_sub(1));
            layers.get(fallback).map(Layer::id)
        } else {
            self.active_layer
        };
        Self {
            layers,
            active_layer,
            ..self.clone()
        }
    }
    pub fn set_active_layer(&self, id: LayerId) -> Result<Self, DocumentError> {
        self.with_active_layer(Some(id))
    }
    /// Set or unset the active layer. A `Some` id must exist.
    pub fn with_active_layer(&self, active_layer: Option<LayerId>) -> Result<Self, DocumentError> {
        if let Some(id) = active_layer {
            if !self.layers.contains(id) {
                return Err(DocumentError::LayerNotFound(id));
            }
        }
        Ok(Self {
            active_layer,
            ..self.clone()
        })
    }
    /// Replace a layer with `f(layer)`, keeping its id. Unknown ids are ignored.
    #[must_use]
    pub fn update_layer(&self, id: LayerId, f: impl FnOnce(&Layer) -> Layer) -> Self {
        Self {
            layers: self.layers.update_layer(id, f),
            ..self.clone()
        }
    }
    /// Like [`Self::update_layer`], for edits that can fail.
    pub fn try_update_layer<E>(
        &self,
        id: LayerId,
        f: impl FnOnce(&Layer) -> Result<Layer, E>,
    ) -> Result<Self, E> {
        Ok(Self {
            layers: self.layers.try_update_layer(id, f)?,
            ..self.clone()
        })
    }
    pub fn move_layer(&self, from: usize, to: usize) -> Result<Self, DocumentError> {
        Ok(Self {
            layers: self.layers.move_layer(from, to)?,
            ..self.clone()
        })
    }
    /// Copy a layer directly above itself under a fresh id. Returns the new id, or `None` if `id` was unknown.
    pub fn duplicate_layer(&self, id: LayerId) -> Result<(Self, Option<LayerId>), DocumentError> {
        if !self.layers.contains(id) {
            return Ok((self.clone(), None));
        }
        let mut layer_ids = self.layer_ids;
        let new_id = layer_ids.next_id();
        Ok((
            Self {
                layers: self.layers.duplicate_layer(id, new_id)?,
                layer_ids,
                ..self.clone()
            },
            Some(new_id),
        ))
    }
    /// Change the canvas size. Every layer keeps its overlapping top-left region.
    /// The active layer is kept, or falls back to the bottom layer.
    pub fn resized(&self, width: u32, height: u32) -> Result<Self, DocumentError> {
        // Validate even if there are no layers to do it for us.
        let resized = Self::with_ids(width, height, self.layer_ids)?;
        let layers = self.layers.try_map(|layer| layer.resized(width, height))?;
        let active_layer = self
            .active_layer
            .filter(|id| layers.contains(*id))
            .or_else(|| layers.get(0).map(Layer::id));
        Ok(Self {
            width: resized.width,
            height: resized.height,
            layers,
            active_layer,
            ..self.clone()
        })
    }

    /// Flatten the visible layers at document size.
    pub fn composite(&self) -> Result<PixelBuffer, BufferError> {
        self.layers.composite(self.width, self.height)
    }
}
