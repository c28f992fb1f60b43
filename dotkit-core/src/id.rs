//! # IDs
//! Layers need an identity that survives reordering, duplication, and undo. This is implemented
//! via [`LayerId`], handed out by a [`LayerIdGenerator`].
//!
//! There is no process-wide counter. Each generator mixes a random seed (taken from a v4 UUID) with its own
//! monotonically increasing serial, so ids from two independent documents practically never collide, while
//! ids from the same generator never collide at all. Generators are `Copy` values owned by a document, so
//! allocating an id is just another pure document mutation.

/// Opaque layer identity. Displays as `layer_<seed>_<serial>`.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId {
    seed: u64,
    serial: std::num::NonZeroU64,
}
impl LayerId {
    /// The random component shared by every id from one generator.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
    /// Position of this id within its generator. Not stable between documents!
    #[must_use]
    pub fn serial(&self) -> u64 {
        self.serial.get()
    }
}
impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "layer_{:016x}_{}", self.seed, self.serial)
    }
}
impl std::fmt::Debug for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <LayerId as std::fmt::Display>::fmt(self, f)
    }
}

/// Hands out unique [`LayerId`]s.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct LayerIdGenerator {
    seed: u64,
    // Serial of the next id. Zero is never handed out.
    next: u64,
}
impl LayerIdGenerator {
    /// A generator with a fresh random seed.
    #[must_use]
    pub fn new() -> Self {
        let (seed, _) = uuid::Uuid::new_v4().as_u64_pair();
        Self::with_seed(seed)
    }
    /// A generator with a fixed seed. Two generators with the same seed produce the same ids,
    /// which is useful for reproducible tests and nothing else.
    #[must_use]
    pub const fn with_seed(seed: u64) -> Self {
        Self { seed, next: 1 }
    }
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }
    /// Allocate the next id.
    ///
    /// # Panics
    /// After `u64::MAX - 1` allocations from one generator, which no document will ever reach.
    pub fn next_id(&mut self) -> LayerId {
        let serial = std::num::NonZeroU64::new(self.next).expect("layer id serial overflow");
        self.next = self.next.wrapping_add(1);
        LayerId {
            seed: self.seed,
            serial,
        }
    }
    /// Allocate many ids at once.
    pub fn many(&mut self, count: usize) -> impl ExactSizeIterator<Item = LayerId> {
        let ids: Vec<_> = (0..count).map(|_| self.next_id()).collect();
        ids.into_iter()
    }
}
impl Default for LayerIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
