//! Helpers shared by unit tests and the microbenchmarks.

use crate::util::constants::*;
use crate::util::conversions::{raw_align_down, raw_align_up};

/// Build the `(ptr_bytes, gcdata)` pair for an object of `size` bytes whose
/// pointer prefix covers roughly `ptr_percent` percent of its words, with the
/// pointer slots spread evenly across the payload.
///
/// `ptr_percent == 0` yields a pointer-free type. Densities other than 0 and
/// 100 need enough payload words for at least one pointer at the requested
/// spacing.
pub fn shaped_pointer_map(size: usize, ptr_percent: usize) -> (usize, Vec<u8>) {
    if ptr_percent == 0 {
        return (0, Vec::new());
    }
    let ptr_bytes = raw_align_down(size, BYTES_IN_WORD);
    let bitmap_bytes = raw_align_up(ptr_bytes / BYTES_IN_WORD, BITS_IN_BYTE) / BITS_IN_BYTE;
    let mut gcdata = vec![0u8; raw_align_up(bitmap_bytes, BYTES_IN_WORD)];
    let nwords = size / BYTES_IN_WORD;
    // For densities above 50% it is the holes that are evenly spaced.
    let invert = ptr_percent > 50 && ptr_percent != 100;
    let percent = if invert { 100 - ptr_percent } else { ptr_percent };
    let nptrs = nwords * percent / 100;
    assert!(nptrs > 0, "object too small for {}% pointers", ptr_percent);
    let spacing = nwords / nptrs;
    for word in 0..nwords {
        if (!invert && word % spacing == 0) || (invert && word % spacing != 0) {
            gcdata[word / BITS_IN_BYTE] |= 1 << (word % BITS_IN_BYTE);
        }
    }
    (ptr_bytes, gcdata)
}
