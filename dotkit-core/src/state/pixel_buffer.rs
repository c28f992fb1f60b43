//! # Pixel buffers
//!
//! Fixed-size, row-major ARGB storage. Every access is bounds checked; nothing is ever clamped.

use crate::color::Argb;
use crate::util::Point;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferError {
    #[error("invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },
    #[error("{point} is outside of the {width}x{height} buffer")]
    OutOfBounds { point: Point, width: u32, height: u32 },
    #[error("dimensions differ, {expected:?} != {found:?}")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
    #[error("expected {expected} pixels, found {found}")]
    DataLength { expected: usize, found: usize },
}

/// `width * height` pixels, index `y * width + x`.
#[derive(Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<Argb>,
}
impl PixelBuffer {
    /// A transparent buffer.
    pub fn new(width: u32, height: u32) -> Result<Self, BufferError> {
        Self::filled(width, height, Argb::TRANSPARENT)
    }
    pub fn filled(width: u32, height: u32, color: Argb) -> Result<Self, BufferError> {
        let len = Self::checked_len(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![color; len],
        })
    }
    /// Wrap existing row-major pixel data.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Argb>) -> Result<Self, BufferError> {
        let len = Self::checked_len(width, height)?;
        if pixels.len() != len {
            return Err(BufferError::DataLength {
                expected: len,
                found: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }
    fn checked_len(width: u32, height: u32) -> Result<usize, BufferError> {
        let invalid = BufferError::InvalidDimensions { width, height };
        if width == 0 || height == 0 {
            return Err(invalid);
        }
        // Pixel coordinates are i32, so each axis must fit.
        if i32::try_from(width).is_err() || i32::try_from(height).is_err() {
            return Err(invalid);
        }
        (width as usize)
            .checked_mul(height as usize)
            .ok_or(invalid)
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
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
    #[must_use]
    pub fn is_in_bounds(&self, point: Point) -> bool {
        self.index_of(point).is_some()
    }
    fn index_of(&self, point: Point) -> Option<usize> {
        let x = u32::try_from(point.x).ok()?;
        let y = u32::try_from(point.y).ok()?;
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(y as usize * self.width as usize + x as usize)
    }
    fn out_of_bounds(&self, point: Point) -> BufferError {
        BufferError::OutOfBounds {
            point,
            width: self.width,
            height: self.height,
        }
    }
    pub fn get(&self, point: Point) -> Result<Argb, BufferError> {
        self.index_of(point)
            .map(|idx| self.pixels[idx])
            .ok_or_else(|| self.out_of_bounds(point))
    }
    pub fn set(&mut self, point: Point, color: Argb) -> Result<(), BufferError> {
        let idx = self
            .index_of(point)
            .ok_or_else(|| self.out_of_bounds(point))?;
        self.pixels[idx] = color;
        Ok(())
    }
    pub fn fill(&mut self, color: Argb) {
        self.pixels.fill(color);
    }
    pub fn clear(&mut self) {
        self.fill(Argb::TRANSPARENT);
    }
    /// Overwrite with the contents of another buffer of identical size.
    pub fn copy_from(&mut self, other: &Self) -> Result<(), BufferError> {
        if self.dimensions() != other.dimensions() {
            return Err(BufferError::DimensionMismatch {
                expected: self.dimensions(),
                found: other.dimensions(),
            });
        }
        self.pixels.copy_from_slice(&other.pixels);
        Ok(())
    }
    /// Bulk replace every pixel, row-major.
    pub fn set_pixels(&mut self, pixels: &[Argb]) -> Result<(), BufferError> {
        if pixels.len() != self.pixels.len() {
            return Err(BufferError::DataLength {
                expected: self.pixels.len(),
                found: pixels.len(),
            });
        }
        self.pixels.copy_from_slice(pixels);
        Ok(())
    }
    #[must_use]
    pub fn as_slice(&self) -> &[Argb] {
        &self.pixels
    }
    pub(crate) fn as_mut_slice(&mut self) -> &mut [Argb] {
        &mut self.pixels
    }
    #[must_use]
    pub fn to_vec(&self) -> Vec<Argb> {
        self.pixels.clone()
    }
    /// Raw `0xAARRGGBB` words, for handing off to encoders.
    #[must_use]
    pub fn as_words(&self) -> &[u32] {
        bytemuck::cast_slice(&self.pixels)
    }
    /// Iterate `(point, color)` in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, Argb)> + '_ {
        let width = self.width as usize;
        self.pixels.iter().enumerate().map(move |(idx, &color)| {
            // Both fit in i32, checked at construction.
            let point = Point::new((idx % width) as i32, (idx / width) as i32);
            (point, color)
        })
    }
}
impl std::fmt::Debug for PixelBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Dumping every pixel is never useful.
        f.debug_struct("PixelBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}
