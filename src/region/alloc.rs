//! Bump/line allocation across blocks.

use crate::region::block::Block;
use crate::region::descriptor::{ObjectHeader, TypeId};
use crate::region::world::RegionWorld;
use crate::util::constants::*;
use crate::util::conversions::raw_align_up;
use crate::util::memory;
use crate::util::Address;

/// The largest request a single block can satisfy: the biggest free-line run
/// starts at line 2, which also loses 16 bytes to block metadata, and the
/// bump check is strict.
const MAX_ALLOC_BYTES: usize = (LINES_IN_BLOCK - 2) * BYTES_IN_LINE - 2 * BYTES_IN_WORD - 1;

/// Region allocator: a *main* block for ordinary allocations, an *overflow*
/// block for line-crossing allocations that would otherwise waste the main
/// block's remaining lines, the list of exhausted blocks, and a stack of
/// reusable ones.
///
/// Not safe for concurrent use; an allocator owns its blocks exclusively.
pub struct Allocator {
    main: Option<Box<Block>>,
    overflow: Option<Box<Block>>,
    full: Vec<Box<Block>>,
    existing: Vec<Box<Block>>,
}

impl Allocator {
    /// Create an allocator, optionally seeded with pre-built blocks to draw
    /// from before any fresh ones are created.
    pub fn new(blocks: Vec<Box<Block>>) -> Self {
        Allocator {
            main: None,
            overflow: None,
            full: Vec::new(),
            existing: blocks,
        }
    }

    /// Allocate a `size`-byte object of type `ty`, returning the payload
    /// address. The payload is zeroed; the header word precedes it.
    ///
    /// `size` must not exceed what a single block can hold.
    pub fn make(&mut self, world: &RegionWorld, size: usize, ty: TypeId) -> Address {
        let full_size = raw_align_up(size + HEADER_BYTES, MIN_OBJECT_ALIGN);
        assert!(full_size <= MAX_ALLOC_BYTES, "allocation of {} bytes cannot fit in a block", size);
        if self.main.is_none() {
            self.main = Some(self.get_block(world));
        }
        let addr = loop {
            let main = self.main.as_mut().unwrap();
            if let Some(addr) = main.try_alloc(full_size) {
                break addr;
            }
            if full_size > BYTES_IN_LINE && main.remaining() > BYTES_IN_LINE {
                // A line-crossing allocation while the main block still has
                // room for small ones: divert it to the overflow block.
                break self.overflow_alloc(world, full_size);
            }
            trace!("main block exhausted, acquiring a new one");
            let exhausted = self.main.take().unwrap();
            self.full.push(exhausted);
            self.main = Some(self.get_block(world));
        };
        unsafe { addr.store::<u64>(ObjectHeader::new(ty, size).to_raw()) };
        memory::zero(addr + HEADER_BYTES, size);
        addr + HEADER_BYTES
    }

    fn overflow_alloc(&mut self, world: &RegionWorld, full_size: usize) -> Address {
        if self.overflow.is_none() {
            self.overflow = Some(self.new_block(world));
        }
        loop {
            if let Some(addr) = self.overflow.as_mut().unwrap().try_alloc(full_size) {
                return addr;
            }
            trace!("overflow block exhausted, acquiring a new one");
            let exhausted = self.overflow.take().unwrap();
            self.full.push(exhausted);
            self.overflow = Some(self.new_block(world));
        }
    }

    /// Recycle every exhausted block onto the reuse stack. Escaped lines
    /// keep their contents and stay withheld from allocation.
    pub fn reset(&mut self) {
        for mut block in self.full.drain(..) {
            block.reset();
            self.existing.push(block);
        }
    }

    /// Find the block containing `ptr` among the main, overflow, and full
    /// blocks.
    pub fn block_of(&self, ptr: Address) -> Option<&Block> {
        self.main
            .as_deref()
            .filter(|b| b.contains(ptr))
            .or_else(|| self.overflow.as_deref().filter(|b| b.contains(ptr)))
            .or_else(|| self.full.iter().map(|b| &**b).find(|b| b.contains(ptr)))
    }

    fn get_block(&mut self, world: &RegionWorld) -> Box<Block> {
        match self.existing.pop() {
            Some(block) => {
                world.register_block(block.base());
                block
            }
            None => self.new_block(world),
        }
    }

    fn new_block(&mut self, world: &RegionWorld) -> Box<Block> {
        let block = Block::new(0);
        trace!("created block at {}", block.base());
        world.register_block(block.base());
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::block::BlockMeta;

    fn obj_bit(meta: &BlockMeta, word: usize) -> bool {
        meta.obj_bits[word >> LOG_BITS_IN_WORD] & (1 << (word & (BITS_IN_WORD - 1))) != 0
    }

    fn pointer_free(world: &mut RegionWorld, size: usize) -> TypeId {
        world.register_type(size, 0, Vec::new())
    }

    #[test]
    fn payloads_are_aligned_and_header_backed() {
        let mut world = RegionWorld::new();
        let ty = pointer_free(&mut world, 24);
        let mut allocator = Allocator::new(Vec::new());
        for _ in 0..100 {
            let payload = allocator.make(&world, 24, ty);
            assert!(payload.is_aligned_to(MIN_OBJECT_ALIGN));
            assert!(raw_align_up(24, MIN_OBJECT_ALIGN) <= world.type_of(ty).size());
            let header = unsafe { (payload - HEADER_BYTES).load::<u64>() };
            assert_eq!(ObjectHeader::from_raw(header).size(), 24);
        }
    }

    #[test]
    fn exactly_one_start_bit_per_object() {
        let mut world = RegionWorld::new();
        let ty = pointer_free(&mut world, 64);
        let mut allocator = Allocator::new(Vec::new());
        let mut payloads = Vec::new();
        for _ in 0..20 {
            payloads.push(allocator.make(&world, 64, ty));
        }
        for &payload in &payloads {
            let block = allocator.block_of(payload).unwrap();
            let start = (payload - HEADER_BYTES - block.base()) / MIN_OBJECT_ALIGN;
            let end = (payload + 64 - block.base()) / MIN_OBJECT_ALIGN;
            assert!(obj_bit(block.meta(), start), "missing start bit");
            for word in start + 1..end {
                assert!(!obj_bit(block.meta(), word), "stray start bit at word {}", word);
            }
        }
    }

    #[test]
    fn payload_is_zeroed() {
        let mut world = RegionWorld::new();
        let ty = pointer_free(&mut world, 256);
        let mut allocator = Allocator::new(Vec::new());
        let payload = allocator.make(&world, 256, ty);
        for word in 0..256 / BYTES_IN_WORD {
            assert_eq!(unsafe { (payload + word * BYTES_IN_WORD).load::<u64>() }, 0);
        }
    }

    #[test]
    fn large_allocations_divert_to_overflow() {
        let mut world = RegionWorld::new();
        let small = pointer_free(&mut world, 64);
        let big = pointer_free(&mut world, 1024);
        let mut allocator = Allocator::new(Vec::new());

        // Consume the main block until a 1 KiB object no longer fits there
        // but plenty of small-object room remains.
        let first = allocator.make(&world, 64, small);
        let main_base = allocator.block_of(first).unwrap().base();
        while allocator.main.as_ref().unwrap().remaining() > 1024 + HEADER_BYTES {
            allocator.make(&world, 64, small);
        }
        assert!(allocator.main.as_ref().unwrap().remaining() > BYTES_IN_LINE);

        let big_payload = allocator.make(&world, 1024, big);
        let big_base = allocator.block_of(big_payload).unwrap().base();
        assert_ne!(big_base, main_base, "large allocation landed in the main block");
        assert_eq!(allocator.overflow.as_ref().unwrap().base(), big_base);

        // Small allocations keep landing in the main block.
        let small_payload = allocator.make(&world, 64, small);
        assert_eq!(allocator.block_of(small_payload).unwrap().base(), main_base);
    }

    #[test]
    fn blocks_register_with_the_world() {
        let mut world = RegionWorld::new();
        let ty = pointer_free(&mut world, 64);
        let mut allocator = Allocator::new(Vec::new());
        let payload = allocator.make(&world, 64, ty);
        let base = allocator.block_of(payload).unwrap().base();
        assert!(world.min_region_address() <= base.as_usize());
        assert!(world.is_region_arena(payload));
    }

    #[test]
    fn reset_recycles_full_blocks() {
        let mut world = RegionWorld::new();
        let ty = pointer_free(&mut world, 64);
        let mut allocator = Allocator::new(Vec::new());
        while allocator.full.len() < 2 {
            allocator.make(&world, 64, ty);
        }
        let recycled: Vec<Address> = allocator.full.iter().map(|b| b.base()).collect();
        allocator.reset();
        assert!(allocator.full.is_empty());
        assert_eq!(allocator.existing.len(), 2);

        // The reuse stack feeds the next main block before anything fresh.
        while allocator.full.is_empty() {
            allocator.make(&world, 64, ty);
        }
        let main_base = allocator.main.as_ref().unwrap().base();
        assert!(recycled.contains(&main_base));
    }

    #[test]
    #[should_panic(expected = "cannot fit in a block")]
    fn oversized_allocation_panics() {
        let mut world = RegionWorld::new();
        let ty = pointer_free(&mut world, BYTES_IN_BLOCK);
        Allocator::new(Vec::new()).make(&world, BYTES_IN_BLOCK, ty);
    }
}
