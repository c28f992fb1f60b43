//! # Layer stack
//!
//! An ordered list of [`Layer`]s, index 0 at the bottom, and the compositor that flattens them.
//!
//! Every operation takes `&self` and hands back a new stack. Layers are cheap to clone, as pixel data is shared
//! until written, so a new stack costs one `Vec` of metadata.

use super::layer::Layer;
use super::pixel_buffer::{BufferError, PixelBuffer};
use crate::blend;
use crate::id::LayerId;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayerStackError {
    #[error("layer {0} is already in the stack")]
    DuplicateId(LayerId),
    #[error("index {index} out of range for {len} layers")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Clone, PartialEq, Debug, Default)]
pub struct LayerManager {
    layers: Vec<Layer>,
}
impl LayerManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
    /// Bottom to top.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Layer> + ExactSizeIterator + '_ {
        self.layers.iter()
    }
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Layer> {
        self.layers.get(index)
    }
    #[must_use]
    pub fn find(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|layer| layer.id() == id)
    }
    #[must_use]
    pub fn index_of(&self, id: LayerId) -> Option<usize> {
        self.layers.iter().position(|layer| layer.id() == id)
    }
    #[must_use]
    pub fn contains(&self, id: LayerId) -> bool {
        self.index_of(id).is_some()
    }
    #[must_use]
    pub fn top(&self) -> Option<&Layer> {
        self.layers.last()
    }

    fn check_unique(&self, id: LayerId) -> Result<(), LayerStackError> {
        if self.contains(id) {
            Err(LayerStackError::DuplicateId(id))
        } else {
            Ok(())
        }
    }
    fn check_index(&self, index: usize, len: usize) -> Result<(), LayerStackError> {
        if index < len {
            Ok(())
        } else {
            Err(LayerStackError::IndexOutOfRange {
                index,
                len: self.len(),
            })
        }
    }
    /// Append on top.
    pub fn add_layer(&self, layer: Layer) -> Result<Self, LayerStackError> {
        self.insert_layer(self.len(), layer)
    }
    /// Insert at `index`, where `index == len` is the top.
    pub fn insert_layer(&self, index: usize, layer: Layer) -> Result<Self, LayerStackError> {
        self.check_unique(layer.id())?;
        self.check_index(index, self.len() + 1)?;
        let mut layers = self.layers.clone();
        layers.insert(index, layer);
        Ok(Self { layers })
    }
    /// Remove by id. Unknown ids leave the stack unchanged.
    #[must_use]
    pub fn remove_layer(&self, id: LayerId) -> Self {
        Self {
            layers: self
                .layers
                .iter()
                .filter(|layer| layer.id() != id)
                .cloned()
                .collect(),
        }
    }
    pub fn remove_layer_at(&self, index: usize) -> Result<Self, LayerStackError> {
        self.check_index(index, self.len())?;
        let mut layers = self.layers.clone();
        layers.remove(index);
        Ok(Self { layers })
    }
    /// Replace the layer `id` with `f(layer)`. The id survives regardless of what `f` returns.
    /// Unknown ids leave the stack unchanged.
    #[must_use]
    pub fn update_layer(&self, id: LayerId, f: impl FnOnce(&Layer) -> Layer) -> Self {
        let Some(index) = self.index_of(id) else {
            log::debug!("update of missing layer {id}");
            return self.clone();
        };
        let mut layers = self.layers.clone();
        layers[index] = f(&self.layers[index]).with_id(id);
        Self { layers }
    }
    /// Like [`Self::update_layer`], for edits that can fail.
    pub fn try_update_layer<E>(
        &self,
        id: LayerId,
        f: impl FnOnce(&Layer) -> Result<Layer, E>,
    ) -> Result<Self, E> {
        let Some(index) = self.index_of(id) else {
            return Ok(self.clone());
        };
        let mut layers = self.layers.clone();
        layers[index] = f(&self.layers[index])?.with_id(id);
        Ok(Self { layers })
    }
    /// Remove the layer at `from` and reinsert it at `to`.
    pub fn move_layer(&self, from: usize, to: usize) -> Result<Self, LayerStackError> {
        self.check_index(from, self.len())?;
        self.check_index(to, self.len())?;
        let mut layers = self.layers.clone();
        let layer = layers.remove(from);
        layers.insert(to, layer);
        Ok(Self { layers })
    }
    /// Deep copy `id` under `new_id`, directly above the source. Unknown ids leave the stack unchanged.
    pub fn duplicate_layer(&self, id: LayerId, new_id: LayerId) -> Result<Self, LayerStackError> {
        let Some(index) = self.index_of(id) else {
            return Ok(self.clone());
        };
        self.check_unique(new_id)?;
        let copy = self.layers[index].duplicate(new_id);
        let mut layers = self.layers.clone();
        layers.insert(index + 1, copy);
        Ok(Self { layers })
    }
    /// Apply `f` to every layer, keeping ids.
    pub fn try_map<E>(&self, mut f: impl FnMut(&Layer) -> Result<Layer, E>) -> Result<Self, E> {
        let layers = self
            .layers
            .iter()
            .map(|layer| Ok(f(layer)?.with_id(layer.id())))
            .collect::<Result<_, E>>()?;
        Ok(Self { layers })
    }

    /// Flatten the visible layers, bottom to top, onto a transparent `width x height` canvas.
    pub fn composite(&self, width: u32, height: u32) -> Result<PixelBuffer, BufferError> {
        let mut out = PixelBuffer::new(width, height)?;
        for layer in self.layers.iter().filter(|layer| layer.visible) {
            if layer.pixels().dimensions() == out.dimensions() {
                composite_flat(&mut out, layer);
            } else {
                composite_checked(&mut out, layer);
            }
        }
        Ok(out)
    }
}

/// Same-size fast path. Walks both buffers as flat slices.
fn composite_flat(out: &mut PixelBuffer, layer: &Layer) {
    let opacity = layer.opacity();
    if opacity <= 0.0 {
        return;
    }
    let full_opacity = opacity >= 1.0;
    for (dst, &src) in out
        .as_mut_slice()
        .iter_mut()
        .zip(layer.pixels().as_slice())
    {
        if full_opacity && src.is_opaque() {
            *dst = src;
            continue;
        }
        *dst = blend::over(*dst, src, blend::effective_alpha(src, opacity));
    }
}

/// Any-size path. Blends the top-left region the layer and output share, row by row.
fn composite_checked(out: &mut PixelBuffer, layer: &Layer) {
    let opacity = layer.opacity();
    let out_width = out.width() as usize;
    let layer_width = layer.width() as usize;
    let width = out_width.min(layer_width);
    let height = out.height().min(layer.height()) as usize;
    let src_rows = layer.pixels().as_slice().chunks_exact(layer_width);
    let dst_rows = out.as_mut_slice().chunks_exact_mut(out_width);
    for (src_row, dst_row) in src_rows.zip(dst_rows).take(height) {
        for (dst, &src) in dst_row[..width].iter_mut().zip(&src_row[..width]) {
            let alpha = blend::effective_alpha(src, opacity);
            if alpha <= 0.0 {
                continue;
            }
            *dst = blend::over(*dst, src, alpha);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::util::Point;
    use crate::color::Argb;
    use crate::id::LayerIdGenerator;

    fn solid(ids: &mut LayerIdGenerator, color: Argb, size: u32) -> Layer {
        Layer::from_buffer(
            ids.next_id(),
            "Solid",
            PixelBuffer::filled(size, size, color).unwrap(),
        )
    }
    fn stack(count: usize) -> (LayerIdGenerator, LayerManager) {
        let mut ids = LayerIdGenerator::with_seed(9);
        let mut manager = LayerManager::new();
        for _ in 0..count {
            manager = manager.add_layer(solid(&mut ids, Argb::WHITE, 2)).unwrap();
        }
        (ids, manager)
    }
    fn ids_of(manager: &LayerManager) -> Vec<LayerId> {
        manager.iter().map(Layer::id).collect()
    }

    #[test]
    fn add_rejects_duplicates() {
        let (_, manager) = stack(1);
        let again = manager.get(0).unwrap().clone();
        assert_eq!(
            manager.add_layer(again.clone()),
            Err(LayerStackError::DuplicateId(again.id()))
        );
        assert_eq!(
            manager.insert_layer(0, again.clone()),
            Err(LayerStackError::DuplicateId(again.id()))
        );
    }
    #[test]
    fn insert_bounds() {
        let (mut ids, manager) = stack(2);
        let layer = solid(&mut ids, Argb::BLACK, 2);
        assert!(manager.insert_layer(3, layer.clone()).is_err());
        let top = manager.insert_layer(2, layer.clone()).unwrap();
        assert_eq!(top.top().map(Layer::id), Some(layer.id()));
        let bottom = manager.insert_layer(0, layer.clone()).unwrap();
        assert_eq!(bottom.index_of(layer.id()), Some(0));
    }
    #[test]
    fn remove() {
        let (mut ids, manager) = stack(3);
        let order = ids_of(&manager);
        let removed = manager.remove_layer(order[1]);
        assert_eq!(ids_of(&removed), vec![order[0], order[2]]);
        // Unknown id.
        assert_eq!(manager.remove_layer(ids.next_id()), manager);
        assert_eq!(ids_of(&manager.remove_layer_at(0).unwrap()), order[1..]);
        assert!(manager.remove_layer_at(3).is_err());
    }
    #[test]
    fn update_preserves_id() {
        let (mut ids, manager) = stack(2);
        let target = manager.get(1).unwrap().id();
        let stranger = ids.next_id();
        let updated = manager.update_layer(target, |layer| {
            layer.clone().with_name("Changed").with_id(stranger)
        });
        let layer = updated.get(1).unwrap();
        assert_eq!(layer.id(), target);
        assert_eq!(layer.name(), "Changed");
        // Other layer shares storage with the original stack.
        assert!(updated
            .get(0)
            .unwrap()
            .shares_pixels_with(manager.get(0).unwrap()));
        assert_eq!(manager.update_layer(stranger, |l| l.clone()), manager);
    }
    #[test]
    fn move_layers() {
        let (_, manager) = stack(3);
        let order = ids_of(&manager);
        let moved = manager.move_layer(0, 2).unwrap();
        assert_eq!(ids_of(&moved), vec![order[1], order[2], order[0]]);
        assert_eq!(
            manager.move_layer(0, 3),
            Err(LayerStackError::IndexOutOfRange { index: 3, len: 3 })
        );
    }
    #[test]
    fn duplicate_above_source() {
        let (mut ids, manager) = stack(2);
        let source = manager.get(0).unwrap().id();
        let new_id = ids.next_id();
        let dup = manager.duplicate_layer(source, new_id).unwrap();
        assert_eq!(dup.len(), 3);
        assert_eq!(dup.index_of(new_id), Some(1));
        assert_eq!(dup.get(1).unwrap().name(), "Solid Copy");
        // Missing source is a no-op.
        let missing = ids.next_id();
        assert_eq!(manager.duplicate_layer(missing, ids.next_id()).unwrap(), manager);
    }

    #[test]
    fn single_opaque_layer_is_identity() {
        let mut ids = LayerIdGenerator::with_seed(1);
        let mut pixels = PixelBuffer::new(4, 4).unwrap();
        for (i, (point, _)) in pixels.clone().iter().enumerate() {
            pixels
                .set(point, Argb(0xFF00_0000 | (i as u32 * 0x0001_0F03)))
                .unwrap();
        }
        let layer = Layer::from_buffer(ids.next_id(), "Opaque", pixels.clone());
        let manager = LayerManager::new().add_layer(layer).unwrap();
        assert_eq!(manager.composite(4, 4).unwrap(), pixels);
    }
    #[test]
    fn hidden_and_transparent_layers_skipped() {
        let mut ids = LayerIdGenerator::with_seed(1);
        let base = solid(&mut ids, Argb::WHITE, 2);
        let hidden = solid(&mut ids, Argb::BLACK, 2).with_visible(false);
        let faded = solid(&mut ids, Argb::BLACK, 2).with_opacity(0.0).unwrap();
        let manager = LayerManager::new()
            .add_layer(base)
            .unwrap()
            .add_layer(hidden)
            .unwrap()
            .add_layer(faded)
            .unwrap();
        let out = manager.composite(2, 2).unwrap();
        assert!(out.as_slice().iter().all(|c| *c == Argb::WHITE));
    }
    #[test]
    fn red_under_half_blue() {
        let mut ids = LayerIdGenerator::with_seed(1);
        let manager = LayerManager::new()
            .add_layer(solid(&mut ids, Argb(0xFFFF_0000), 3))
            .unwrap()
            .add_layer(solid(&mut ids, Argb(0x8000_00FF), 3))
            .unwrap();
        let expected = blend::over(
            Argb(0xFFFF_0000),
            Argb(0x8000_00FF),
            blend::effective_alpha(Argb(0x8000_00FF), 1.0),
        );
        assert_eq!(expected, Argb(0xFF7F_0080));

        let fast = manager.composite(3, 3).unwrap();
        assert!(fast.as_slice().iter().all(|c| *c == expected));

        let mut checked = PixelBuffer::new(3, 3).unwrap();
        for layer in manager.iter() {
            composite_checked(&mut checked, layer);
        }
        assert_eq!(checked, fast);
    }
    #[test]
    fn paths_agree() {
        // A spread of alphas and opacities, compared between both paths.
        let mut ids = LayerIdGenerator::with_seed(5);
        let size = 16;
        let mut manager = LayerManager::new();
        for (n, opacity) in [1.0, 0.75, 0.5, 0.2].into_iter().enumerate() {
            let mut pixels = PixelBuffer::new(size, size).unwrap();
            for (point, _) in pixels.clone().iter() {
                let seed = (point.x * 31 + point.y * 17 + n as i32 * 101) as u32;
                let color = Argb(seed.wrapping_mul(0x9E37_79B9));
                pixels.set(point, color).unwrap();
            }
            let layer = Layer::from_buffer(ids.next_id(), "Noise", pixels)
                .with_opacity(opacity)
                .unwrap();
            manager = manager.add_layer(layer).unwrap();
        }
        let mut fast = PixelBuffer::new(size, size).unwrap();
        let mut checked = PixelBuffer::new(size, size).unwrap();
        for layer in manager.iter() {
            composite_flat(&mut fast, layer);
            composite_checked(&mut checked, layer);
        }
        assert_eq!(fast, checked);
        assert_eq!(manager.composite(size, size).unwrap(), fast);
    }
    #[test]
    fn mismatched_sizes_blend_overlap() {
        let mut ids = LayerIdGenerator::with_seed(2);
        let manager = LayerManager::new()
            .add_layer(solid(&mut ids, Argb::BLACK, 2))
            .unwrap();
        let out = manager.composite(3, 3).unwrap();
        assert_eq!(out.get(Point::new(1, 1)), Ok(Argb::BLACK));
        assert_eq!(out.get(Point::new(2, 2)), Ok(Argb::TRANSPARENT));
        assert!(manager.composite(0, 3).is_err());
    }
    #[test]
    fn oversized_layer_is_cropped() {
        let mut ids = LayerIdGenerator::with_seed(4);
        let mut pixels = PixelBuffer::new(4, 3).unwrap();
        pixels.set(Point::new(1, 0), Argb::WHITE).unwrap();
        pixels.set(Point::new(3, 0), Argb::BLACK).unwrap();
        pixels.set(Point::new(0, 2), Argb::BLACK).unwrap();
        let manager = LayerManager::new()
            .add_layer(Layer::from_buffer(ids.next_id(), "Wide", pixels))
            .unwrap();
        let out = manager.composite(2, 2).unwrap();
        // Row stride comes from each buffer, not the overlap.
        assert_eq!(
            out.as_slice(),
            &[Argb::TRANSPARENT, Argb::WHITE, Argb::TRANSPARENT, Argb::TRANSPARENT]
        );
    }
}
