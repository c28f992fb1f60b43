use super::pixel_buffer::{BufferError, PixelBuffer};
use crate::color::Argb;
use crate::id::LayerId;
use crate::util::Point;
use std::sync::Arc;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum LayerError {
    #[error("opacity {0} is outside of [0, 1]")]
    InvalidOpacity(f32),
}

/// A named raster plus its display flags.
///
/// Pixels live behind an [`Arc`], so cloning a layer (and thus a whole document) never copies pixel data.
/// Writes go through [`Arc::make_mut`], copying the buffer only if some other snapshot still shares it.
#[derive(Clone, PartialEq, Debug)]
pub struct Layer {
    id: LayerId,
    pub name: String,
    opacity: f32,
    pub visible: bool,
    pub locked: bool,
    pixels: Arc<PixelBuffer>,
}
impl Layer {
    /// A transparent, fully opaque, visible, unlocked layer.
    pub fn new(
        id: LayerId,
        name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Result<Self, BufferError> {
        Ok(Self::from_buffer(id, name, PixelBuffer::new(width, height)?))
    }
    pub fn from_buffer(id: LayerId, name: impl Into<String>, pixels: PixelBuffer) -> Self {
        Self {
            id,
            name: name.into(),
            opacity: 1.0,
            visible: true,
            locked: false,
            pixels: Arc::new(pixels),
        }
    }
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
    #[must_use]
    pub fn opacity(&self) -> f32 {
        self.opacity
    }
    #[must_use]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }
    #[must_use]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }
    #[must_use]
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }
    /// Whether two layers share the same pixel storage.
    #[must_use]
    pub fn shares_pixels_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.pixels, &other.pixels)
    }

    #[must_use]
    pub fn is_in_bounds(&self, point: Point) -> bool {
        self.pixels.is_in_bounds(point)
    }
    pub fn get_pixel(&self, point: Point) -> Result<Argb, BufferError> {
        self.pixels.get(point)
    }
    /// Write a single pixel. Silently ignored on a locked layer.
    pub fn set_pixel(&mut self, point: Point, color: Argb) -> Result<(), BufferError> {
        if self.locked {
            return Ok(());
        }
        // Check before make_mut, a failed write shouldn't cost a copy.
        if !self.pixels.is_in_bounds(point) {
            return self.pixels.get(point).map(|_| ());
        }
        Arc::make_mut(&mut self.pixels).set(point, color)
    }
    /// Replace every pixel. Silently ignored on a locked layer.
    pub fn set_pixels(&mut self, pixels: &[Argb]) -> Result<(), BufferError> {
        if self.locked {
            return Ok(());
        }
        if pixels.len() != self.pixels.as_slice().len() {
            return Err(BufferError::DataLength {
                expected: self.pixels.as_slice().len(),
                found: pixels.len(),
            });
        }
        Arc::make_mut(&mut self.pixels).set_pixels(pixels)
    }
    /// Silently ignored on a locked layer.
    pub fn fill(&mut self, color: Argb) {
        if self.locked {
            return;
        }
        Arc::make_mut(&mut self.pixels).fill(color);
    }
    /// Silently ignored on a locked layer.
    pub fn clear(&mut self) {
        self.fill(Argb::TRANSPARENT);
    }

    #[must_use]
    pub fn with_id(mut self, id: LayerId) -> Self {
        self.id = id;
        self
    }
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
    pub fn with_opacity(mut self, opacity: f32) -> Result<Self, LayerError> {
        if !(0.0..=1.0).contains(&opacity) {
            // NaN fails the range check too.
            return Err(LayerError::InvalidOpacity(opacity));
        }
        self.opacity = opacity;
        Ok(self)
    }
    #[must_use]
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }
    #[must_use]
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }
    /// A copy with its own pixel storage. Same id and metadata.
    #[must_use]
    pub fn deep_copy(&self) -> Self {
        Self {
            pixels: Arc::new(PixelBuffer::clone(&self.pixels)),
            ..self.clone()
        }
    }
    /// A deep copy under a new id, named `"<name> Copy"`.
    #[must_use]
    pub fn duplicate(&self, new_id: LayerId) -> Self {
        let mut copy = self.deep_copy().with_id(new_id);
        copy.name = format!("{} Copy", self.name);
        copy
    }
    /// A layer of a new size holding the overlapping top-left region of this one.
    /// Id and metadata are kept.
    pub fn resized(&self, width: u32, height: u32) -> Result<Self, BufferError> {
        let mut pixels = PixelBuffer::new(width, height)?;
        let copy_width = width.min(self.width()) as usize;
        let copy_height = height.min(self.height()) as usize;
        let (src_stride, dst_stride) = (self.width() as usize, width as usize);
        let source = self.pixels.as_slice();
        let dest = pixels.as_mut_slice();
        for row in 0..copy_height {
            let src = &source[row * src_stride..][..copy_width];
            dest[row * dst_stride..][..copy_width].copy_from_slice(src);
        }
        Ok(Self {
            pixels: Arc::new(pixels),
            ..self.clone()
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::id::LayerIdGenerator;

    fn layer(width: u32, height: u32) -> Layer {
        let mut ids = LayerIdGenerator::with_seed(0);
        Layer::new(ids.next_id(), "Test", width, height).unwrap()
    }
    #[test]
    fn defaults() {
        let layer = layer(4, 4);
        assert_eq!(layer.opacity(), 1.0);
        assert!(layer.visible);
        assert!(!layer.locked);
        assert_eq!((layer.width(), layer.height()), (4, 4));
        assert!(layer.pixels().as_slice().iter().all(|c| c.is_transparent()));
    }
    #[test]
    fn locked_ignores_writes() {
        let mut layer = layer(2, 2).with_locked(true);
        let before = layer.clone();
        layer.set_pixel(Point::new(0, 0), Argb::BLACK).unwrap();
        layer.fill(Argb::WHITE);
        layer.clear();
        layer.set_pixels(&[Argb::BLACK; 4]).unwrap();
        assert_eq!(layer, before);
    }
    #[test]
    fn unlocked_bounds_errors_surface() {
        let mut layer = layer(2, 2);
        assert!(layer.set_pixel(Point::new(2, 0), Argb::BLACK).is_err());
        assert!(layer.set_pixels(&[Argb::BLACK; 3]).is_err());
    }
    #[test]
    fn opacity_range() {
        assert!(layer(1, 1).with_opacity(0.0).is_ok());
        assert!(layer(1, 1).with_opacity(1.0).is_ok());
        assert_eq!(
            layer(1, 1).with_opacity(1.5),
            Err(LayerError::InvalidOpacity(1.5))
        );
        assert!(layer(1, 1).with_opacity(-0.1).is_err());
        assert!(layer(1, 1).with_opacity(f32::NAN).is_err());
    }
    #[test]
    fn copy_on_write() {
        let original = layer(3, 3);
        let mut copy = original.clone();
        assert!(copy.shares_pixels_with(&original));
        // Metadata edits don't touch pixels.
        copy = copy.with_visible(false).with_name("Renamed");
        assert!(copy.shares_pixels_with(&original));
        copy.set_pixel(Point::new(1, 1), Argb::BLACK).unwrap();
        assert!(!copy.shares_pixels_with(&original));
        assert_eq!(original.get_pixel(Point::new(1, 1)), Ok(Argb::TRANSPARENT));
    }
    #[test]
    fn duplicate_is_independent() {
        let mut ids = LayerIdGenerator::with_seed(3);
        let original = Layer::new(ids.next_id(), "Ink", 2, 2).unwrap();
        let dup = original.duplicate(ids.next_id());
        assert_eq!(dup.name(), "Ink Copy");
        assert_ne!(dup.id(), original.id());
        assert!(!dup.shares_pixels_with(&original));
        assert_eq!(dup.pixels(), original.pixels());
    }
    #[test]
    fn resize_keeps_top_left() {
        let mut layer = layer(3, 2);
        layer.set_pixel(Point::new(0, 0), Argb::BLACK).unwrap();
        layer.set_pixel(Point::new(2, 1), Argb::WHITE).unwrap();

        let grown = layer.resized(4, 4).unwrap();
        assert_eq!(grown.id(), layer.id());
        assert_eq!(grown.get_pixel(Point::new(0, 0)), Ok(Argb::BLACK));
        assert_eq!(grown.get_pixel(Point::new(2, 1)), Ok(Argb::WHITE));
        assert_eq!(grown.get_pixel(Point::new(3, 3)), Ok(Argb::TRANSPARENT));

        let shrunk = layer.resized(2, 1).unwrap();
        assert_eq!(shrunk.pixels().as_slice(), &[Argb::BLACK, Argb::TRANSPARENT]);
        assert!(layer.resized(0, 1).is_err());
    }
}
