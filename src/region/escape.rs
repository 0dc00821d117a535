//! Escape tracking: transitive escape marking and the write-barrier fast
//! path.
//!
//! This is the unsafe boundary of the simulation. Both operations recover a
//! block's in-band metadata by masking an interior pointer down to the block
//! base, which is only sound because blocks are aligned to their own size.

use crate::region::block::BlockMeta;
use crate::region::descriptor::ObjectHeader;
use crate::region::shape::PointerShape;
use crate::region::world::RegionWorld;
use crate::util::constants::*;
use crate::util::Address;

/// Mark the object containing `ptr` as escaped, transitively marking
/// everything it references. `ptr` may be null or interior to the object.
///
/// The whole object, header word included, is marked in the block's escape
/// bitmap, and every line the object touches is marked in the line-escape
/// mask. Referents that already escaped are short-circuited via the escape
/// bitmap, so the walk terminates on cyclic object graphs.
///
/// # Safety
/// `ptr` must be null or point into a live block of some allocator, at an
/// object whose type is registered in `world`; the same goes for every
/// pointer slot reachable from it.
pub unsafe fn mark_escaped(world: &RegionWorld, ptr: Address) {
    if ptr.is_zero() {
        return;
    }
    // Freshly allocated memory holds no pointers, so in the common case the
    // pending stack never allocates.
    let mut pending: Vec<Address> = Vec::new();
    mark_one(world, ptr, &mut pending);
    while let Some(next) = pending.pop() {
        if next.is_zero() || escape_bit(next) {
            continue;
        }
        mark_one(world, next, &mut pending);
    }
}

unsafe fn mark_one(world: &RegionWorld, ptr: Address, pending: &mut Vec<Address>) {
    let base = ptr.align_down(BYTES_IN_BLOCK);
    let mut obj_idx = (ptr - base) >> LOG_MIN_OBJECT_ALIGN;
    let meta = &mut *base.to_mut_ptr::<BlockMeta>();

    // Find the object's header word.
    if obj_idx != 0 && bit(&meta.obj_bits, obj_idx - 1) {
        // Fast path: `ptr` is the payload start, one word past the header.
        obj_idx -= 1;
    } else {
        // Scan the object-start bitmap backwards for the closest header at a
        // lower word index, one bitmap word at a time.
        let mask = (1u64 << (obj_idx & (BITS_IN_WORD - 1))) - 1;
        let mut word = obj_idx >> LOG_BITS_IN_WORD;
        let mut lead = (meta.obj_bits[word] & mask).leading_zeros() as usize;
        while lead == BITS_IN_WORD {
            debug_assert!(word > 0, "no object start before {}", ptr);
            word -= 1;
            lead = meta.obj_bits[word].leading_zeros() as usize;
        }
        obj_idx = (word << LOG_BITS_IN_WORD) + BITS_IN_WORD - lead - 1;
    }
    let obj_start = base + (obj_idx << LOG_MIN_OBJECT_ALIGN);
    let header = ObjectHeader::from_raw(obj_start.load::<u64>());
    let size = header.size();

    // Mark the object escaped, header word included.
    let obj_end_idx = obj_idx + (size >> LOG_MIN_OBJECT_ALIGN);
    mark_word_range(&mut meta.esc_bits, obj_idx, obj_end_idx);

    // Mark every line the object touches. The end is computed from the
    // interior pointer, so clamp it to the block's last line.
    let obj_line = (ptr - base) >> LOG_BYTES_IN_LINE;
    let obj_end_line = ((ptr + size - base) >> LOG_BYTES_IN_LINE).min(LINES_IN_BLOCK - 1);
    meta.line_escape |= (!0u64 >> (BITS_IN_WORD - 1 - (obj_end_line - obj_line))) << obj_line;

    // Transitively mark whatever the object points to.
    let desc = world.type_of(header.type_id());
    if desc.ptr_bytes() == 0 {
        return;
    }
    let payload = obj_start + HEADER_BYTES;
    let limit = payload + size;
    let mut shape = PointerShape::new(desc, payload);
    loop {
        let mut slot = shape.next_fast();
        if slot.is_zero() {
            slot = shape.next(limit);
            if slot.is_zero() {
                break;
            }
        }
        let referent = slot.load::<Address>();
        debug_assert!(
            referent.is_zero(),
            "expected zeroed memory at {}, found {}",
            slot,
            referent
        );
        if !referent.is_zero() {
            pending.push(referent);
        }
    }
}

/// Set bits `[start, end]` (inclusive) in a word-indexed bitmap.
fn mark_word_range(bits: &mut [u64], start: usize, end: usize) {
    let start_word = start >> LOG_BITS_IN_WORD;
    let end_word = end >> LOG_BITS_IN_WORD;
    let lo = start & (BITS_IN_WORD - 1);
    let hi = end & (BITS_IN_WORD - 1);
    if start_word == end_word {
        // Fast path: the range stays within one bitmap word.
        bits[start_word] |= (!0u64 >> (BITS_IN_WORD - 1 - (hi - lo))) << lo;
    } else {
        bits[start_word] |= !0u64 << lo;
        for word in &mut bits[start_word + 1..end_word] {
            *word = !0;
        }
        bits[end_word] |= !0u64 >> (BITS_IN_WORD - 1 - hi);
    }
}

#[inline(always)]
fn bit(bits: &[u64], index: usize) -> bool {
    bits[index >> LOG_BITS_IN_WORD] & (1 << (index & (BITS_IN_WORD - 1))) != 0
}

/// Test the escape bit covering the word `ptr` points into, through the
/// block-base mask.
#[inline(always)]
unsafe fn escape_bit(ptr: Address) -> bool {
    let base = ptr.align_down(BYTES_IN_BLOCK);
    let word = (ptr - base) >> LOG_MIN_OBJECT_ALIGN;
    let bits = (base + ((word >> LOG_BITS_IN_WORD) << LOG_BYTES_IN_WORD)).load::<u64>();
    bits & (1 << (word & (BITS_IN_WORD - 1))) != 0
}

/// True when `ptr` refers to heap memory, or to a region word that has
/// already escaped.
unsafe fn escaped_or_heap(world: &RegionWorld, ptr: Address) -> bool {
    if ptr.as_usize() < world.min_region_address() {
        return true;
    }
    if !world.is_region_arena(ptr) {
        return true;
    }
    let base = ptr.align_down(BYTES_IN_BLOCK);
    let word = (ptr - base) >> LOG_MIN_OBJECT_ALIGN;
    let byte = (base + (word >> LOG_BITS_IN_BYTE)).load::<u8>();
    byte & (1 << (word & (BITS_IN_BYTE - 1))) != 0
}

/// Reference form of the write barrier, called before a pointer write
/// `*dst = ptr`. The only writes that matter are those storing a
/// region-private referent into escaped-or-heap memory; for those, escape
/// propagation runs (modeled by [`mark_escaped_stub`]) and `true` is
/// returned.
///
/// # Safety
/// Any pointer at or above `world`'s minimum region address and within a
/// region arena must point into a live block.
pub unsafe fn write_barrier_reference(world: &RegionWorld, ptr: Address, dst: Address) -> bool {
    if escaped_or_heap(world, ptr) || !escaped_or_heap(world, dst) {
        return false;
    }
    mark_escaped_stub(ptr);
    true
}

/// Branch-pruned equivalent of [`write_barrier_reference`], with the checks
/// ordered to return as early as possible on the common cases.
///
/// # Safety
/// Same contract as [`write_barrier_reference`].
#[inline(never)]
pub unsafe fn write_barrier_fast_path(world: &RegionWorld, ptr: Address, dst: Address) -> bool {
    if ptr.is_zero() {
        return false;
    }
    let split = world.min_region_address();
    if ptr.as_usize() < split {
        return false;
    }
    if !world.is_region_arena(ptr) {
        return false;
    }
    if dst.as_usize() >= split && world.is_region_arena(dst) {
        // A region-internal reference needs no work unless the destination
        // itself has escaped.
        if !escape_bit(dst) {
            return false;
        }
    }
    if escape_bit(ptr) {
        return false;
    }
    mark_escaped_stub(ptr);
    true
}

/// Out-of-line stand-in for the escape-propagation slow path; the call
/// models the real barrier's slow-path dispatch cost.
#[inline(never)]
pub fn mark_escaped_stub(_ptr: Address) {}
