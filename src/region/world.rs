//! Process-wide region state, carried explicitly rather than as mutable
//! statics.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::region::descriptor::{TypeDescriptor, TypeId, TypeRegistry};
use crate::util::constants::*;
use crate::util::Address;

/// The context every region operation runs against: the two coarse write
/// barrier filters (lowest region address ever used and a one-bit-per-arena
/// region map) plus the type-descriptor table.
///
/// The filters are written while regions are set up and are effectively
/// read-only during steady state, so they use relaxed atomics and all steady
/// state operations take `&RegionWorld`.
pub struct RegionWorld {
    min_region_address: AtomicUsize,
    is_region_arena: Box<[AtomicU64]>,
    types: TypeRegistry,
}

impl RegionWorld {
    pub fn new() -> Self {
        let words = 1 << (LOG_ADDRESS_SPACE - LOG_BYTES_IN_ARENA - LOG_BITS_IN_WORD);
        RegionWorld {
            // No region memory yet: every address tests as heap.
            min_region_address: AtomicUsize::new(usize::MAX),
            is_region_arena: (0..words).map(|_| AtomicU64::new(0)).collect(),
            types: TypeRegistry::default(),
        }
    }

    /// Register a type descriptor. See [`TypeRegistry::register`] for the
    /// preconditions.
    pub fn register_type(&mut self, size: usize, ptr_bytes: usize, gcdata: Vec<u8>) -> TypeId {
        self.types.register(size, ptr_bytes, gcdata)
    }

    pub fn type_of(&self, id: TypeId) -> &TypeDescriptor {
        self.types.get(id)
    }

    /// Record that the block at `base` now holds region memory.
    pub fn register_block(&self, base: Address) {
        self.register_region_range(base, BYTES_IN_BLOCK);
    }

    /// Record a whole span of region memory, such as an anonymous mapping
    /// about to be carved into blocks.
    pub fn register_region_range(&self, start: Address, bytes: usize) {
        self.min_region_address
            .fetch_min(start.as_usize(), Ordering::Relaxed);
        let first = start.as_usize() >> LOG_BYTES_IN_ARENA;
        let last = (start.as_usize() + bytes - 1) >> LOG_BYTES_IN_ARENA;
        for arena in first..=last {
            if let Some(word) = self.is_region_arena.get(arena >> LOG_BITS_IN_WORD) {
                word.fetch_or(1 << (arena & (BITS_IN_WORD - 1)), Ordering::Relaxed);
            }
        }
    }

    /// The lowest address ever used by a region block; everything below it
    /// is heap.
    pub fn min_region_address(&self) -> usize {
        self.min_region_address.load(Ordering::Relaxed)
    }

    /// Whether the arena containing `addr` holds any region memory.
    pub fn is_region_arena(&self, addr: Address) -> bool {
        let arena = addr.as_usize() >> LOG_BYTES_IN_ARENA;
        match self.is_region_arena.get(arena >> LOG_BITS_IN_WORD) {
            Some(word) => word.load(Ordering::Relaxed) & (1 << (arena & (BITS_IN_WORD - 1))) != 0,
            // Beyond the covered address space: not region memory.
            None => false,
        }
    }
}

impl Default for RegionWorld {
    fn default() -> Self {
        Self::new()
    }
}
