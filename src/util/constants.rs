/// log2 of the number of bits in a byte
pub const LOG_BITS_IN_BYTE: usize = 3;
/// The number of bits in a byte
pub const BITS_IN_BYTE: usize = 1 << LOG_BITS_IN_BYTE;

/// log2 of the number of bytes in a word
pub const LOG_BYTES_IN_WORD: usize = 3;
/// The number of bytes in a word
pub const BYTES_IN_WORD: usize = 1 << LOG_BYTES_IN_WORD;
/// log2 of the number of bits in a word
pub const LOG_BITS_IN_WORD: usize = LOG_BITS_IN_BYTE + LOG_BYTES_IN_WORD;
/// The number of bits in a word
pub const BITS_IN_WORD: usize = 1 << LOG_BITS_IN_WORD;

/// log2 of the number of bytes in a block
pub const LOG_BYTES_IN_BLOCK: usize = 13;
/// The number of bytes in a block. Blocks are aligned to their own size so
/// that the block base is recoverable from any interior pointer.
pub const BYTES_IN_BLOCK: usize = 1 << LOG_BYTES_IN_BLOCK;

/// log2 of the number of bytes in a line
pub const LOG_BYTES_IN_LINE: usize = 7;
/// The number of bytes in a line, the coarse unit of free-space management
/// and escape coalescing within a block.
pub const BYTES_IN_LINE: usize = 1 << LOG_BYTES_IN_LINE;
/// The number of lines in a block
pub const LINES_IN_BLOCK: usize = 1 << (LOG_BYTES_IN_BLOCK - LOG_BYTES_IN_LINE);

/// log2 of the minimum object alignment
pub const LOG_MIN_OBJECT_ALIGN: usize = LOG_BYTES_IN_WORD;
/// Minimum object alignment; the block bitmaps carry one bit per this many
/// bytes.
pub const MIN_OBJECT_ALIGN: usize = 1 << LOG_MIN_OBJECT_ALIGN;

/// Bytes in the object header word preceding every payload.
pub const HEADER_BYTES: usize = BYTES_IN_WORD;

/// Bytes in each per-block bitmap (one bit per word of the block).
pub const BITMAP_BYTES: usize = BYTES_IN_BLOCK / MIN_OBJECT_ALIGN / BITS_IN_BYTE;
/// The number of object-sized words in a block
pub const WORDS_IN_BLOCK: usize = BYTES_IN_BLOCK / BYTES_IN_WORD;

// Each block bitmap must fit exactly in one line: the two bitmaps are the
// block's two reserved metadata lines.
const _: () = assert!(BITMAP_BYTES == BYTES_IN_LINE);

/// log2 of the number of bytes in an arena, the granularity of the
/// write barrier's coarse region filter.
pub const LOG_BYTES_IN_ARENA: usize = 26;
/// The number of bytes in an arena
pub const BYTES_IN_ARENA: usize = 1 << LOG_BYTES_IN_ARENA;

/// log2 of the usable address space the arena bit vector covers.
pub const LOG_ADDRESS_SPACE: usize = 48;
