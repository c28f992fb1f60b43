//! # State
//!
//! The document model: pixel storage, layers, the layer stack, and the document value tying them together.

pub mod document;
pub mod layer;
pub mod layers;
pub mod pixel_buffer;

pub use document::{CanvasDocument, DocumentError};
pub use layer::{Layer, LayerError};
pub use layers::{LayerManager, LayerStackError};
pub use pixel_buffer::{BufferError, PixelBuffer};
