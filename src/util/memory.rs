//! Raw-memory helpers for the block allocator.

use std::alloc::{alloc_zeroed, dealloc, handle_alloc_error, Layout};

use crate::util::Address;

/// Zero a memory range.
///
/// The range must be owned by the caller and writable; the allocator uses
/// this to clear fresh payloads the way a real runtime would.
pub fn zero(start: Address, len: usize) {
    unsafe {
        std::ptr::write_bytes(start.to_mut_ptr::<u8>(), 0, len);
    }
}

/// Allocate `size` zeroed bytes aligned to `align`, aborting on failure.
///
/// Block bases must be recoverable from interior pointers by masking, so
/// block buffers are allocated at their own size's alignment.
pub(crate) fn alloc_zeroed_aligned(size: usize, align: usize) -> Address {
    let layout = Layout::from_size_align(size, align).unwrap();
    let ptr = unsafe { alloc_zeroed(layout) };
    if ptr.is_null() {
        handle_alloc_error(layout);
    }
    Address::from_mut_ptr(ptr)
}

/// Free a buffer obtained from [`alloc_zeroed_aligned`].
///
/// # Safety
/// `start` must come from [`alloc_zeroed_aligned`] with the same `size` and
/// `align`, and must not be used afterwards.
pub(crate) unsafe fn free_aligned(start: Address, size: usize, align: usize) {
    let layout = Layout::from_size_align(size, align).unwrap();
    dealloc(start.to_mut_ptr(), layout);
}
