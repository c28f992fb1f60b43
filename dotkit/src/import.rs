//! JSON document import.
//!
//! Two shapes are understood. The full shape lists layers bottom to top, each with row-major pixels:
//! ```json
//! { "width": 2, "height": 1, "layers": [{ "name": "Ink", "pixels": ["#FF0000", 4278190080] }] }
//! ```
//! The indexed grid shape is a single layer of palette indices, one array per row:
//! ```json
//! { "width": 2, "height": 2, "palette": ["#00000000", "#000000"], "data": [[0, 1], [1, 0]] }
//! ```
//! Width and height default to 32. When both `layers` and `palette`/`data` are present, `layers` wins.

use dotkit_core::color::{Argb, ParseColorError};
use dotkit_core::state::{BufferError, CanvasDocument, DocumentError, LayerError};

pub const DEFAULT_DIMENSION: u32 = 32;

#[derive(thiserror::Error, Debug)]
pub enum ImportError {
    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unknown document shape, expected `layers` or `palette` and `data`")]
    UnknownShape,
    #[error("bad color: {0}")]
    Color(#[from] ParseColorError),
    #[error(transparent)]
    Document(#[from] DocumentError),
    #[error(transparent)]
    Buffer(#[from] BufferError),
    #[error(transparent)]
    Layer(#[from] LayerError),
}

#[derive(serde::Deserialize)]
struct RawDocument {
    width: Option<u32>,
    height: Option<u32>,
    layers: Option<Vec<RawLayer>>,
    palette: Option<Vec<RawColor>>,
    data: Option<Vec<Vec<i64>>>,
}

#[derive(serde::Deserialize)]
struct RawLayer {
    #[serde(default = "default_layer_name")]
    name: String,
    #[serde(default)]
    pixels: Vec<RawColor>,
    visible: Option<bool>,
    opacity: Option<f32>,
    locked: Option<bool>,
}
fn default_layer_name() -> String {
    "Layer".to_owned()
}

/// Packed integer, or hex string.
#[derive(serde::Deserialize)]
#[serde(untagged)]
enum RawColor {
    Packed(i64),
    Hex(String),
}
impl TryFrom<&RawColor> for Argb {
    type Error = ParseColorError;
    fn try_from(value: &RawColor) -> Result<Self, Self::Error> {
        match value {
            // Signed ints show up from platforms without unsigned 32 bit types. Keep the low bits either way.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            RawColor::Packed(packed) => Ok(Argb(*packed as u32)),
            RawColor::Hex(hex) => hex.parse(),
        }
    }
}

pub fn from_reader(reader: impl std::io::Read) -> Result<CanvasDocument, ImportError> {
    let raw: RawDocument = serde_json::from_reader(reader)?;
    from_raw(raw)
}
pub fn from_str(json: &str) -> Result<CanvasDocument, ImportError> {
    let raw: RawDocument = serde_json::from_str(json)?;
    from_raw(raw)
}

fn from_raw(raw: RawDocument) -> Result<CanvasDocument, ImportError> {
    let width = raw.width.unwrap_or(DEFAULT_DIMENSION);
    let height = raw.height.unwrap_or(DEFAULT_DIMENSION);
    let document = CanvasDocument::new(width, height)?;

    match (raw.layers, raw.palette, raw.data) {
        (Some(layers), _, _) => full(document, layers),
        (None, Some(palette), Some(data)) => grid(document, &palette, &data),
        _ => Err(ImportError::UnknownShape),
    }
}

/// Adding each layer makes it active, so the topmost ends up active.
fn full(mut document: CanvasDocument, layers: Vec<RawLayer>) -> Result<CanvasDocument, ImportError> {
    let len = document.width() as usize * document.height() as usize;
    for raw in layers {
        if raw.pixels.len() > len {
            log::warn!(
                "layer {:?} has {} pixels, {} extra ignored",
                raw.name,
                raw.pixels.len(),
                raw.pixels.len() - len
            );
        }
        let mut pixels = vec![Argb::TRANSPARENT; len];
        for (pixel, raw_pixel) in pixels.iter_mut().zip(&raw.pixels) {
            *pixel = raw_pixel.try_into()?;
        }

        let (next, mut layer) = document.new_layer(raw.name)?;
        layer.set_pixels(&pixels)?;
        if let Some(opacity) = raw.opacity {
            layer = layer.with_opacity(opacity)?;
        }
        if let Some(visible) = raw.visible {
            layer = layer.with_visible(visible);
        }
        // Last, locked layers ignore writes.
        if let Some(locked) = raw.locked {
            layer = layer.with_locked(locked);
        }
        document = next.add_layer(layer)?;
    }
    log::debug!("imported {} layers", document.layers().len());
    Ok(document)
}

/// Indices outside the palette, and cells outside the canvas, are skipped.
fn grid(
    document: CanvasDocument,
    palette: &[RawColor],
    data: &[Vec<i64>],
) -> Result<CanvasDocument, ImportError> {
    let palette = palette
        .iter()
        .map(Argb::try_from)
        .collect::<Result<Vec<_>, _>>()?;
    let width = document.width() as usize;
    let height = document.height() as usize;

    let mut pixels = vec![Argb::TRANSPARENT; width * height];
    for (y, row) in data.iter().enumerate().take(height) {
        for (x, &index) in row.iter().enumerate().take(width) {
            let color = usize::try_from(index)
                .ok()
                .and_then(|index| palette.get(index));
            match color {
                Some(&color) => pixels[y * width + x] = color,
                None => log::warn!("palette index {index} at ({x}, {y}) out of range"),
            }
        }
    }

    let (document, mut layer) = document.new_layer("Imported")?;
    layer.set_pixels(&pixels)?;
    Ok(document.add_layer(layer)?)
}
