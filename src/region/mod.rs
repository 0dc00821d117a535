//! The region simulation core: block-structured bump allocation with
//! per-block object and escape bitmaps, transitive escape marking, and the
//! write-barrier fast path.
//!
//! Everything here is single-threaded. An [`alloc::Allocator`] owns its
//! blocks exclusively; the only cross-cutting state is the [`world::RegionWorld`]
//! passed explicitly to every operation that needs it.

pub mod alloc;
pub mod block;
pub mod descriptor;
pub mod escape;
pub mod shape;
pub mod world;
