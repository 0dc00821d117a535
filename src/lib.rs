//! CPU-cost evaluation harness for a region-based memory management scheme
//! layered on top of a tracing garbage collector.
//!
//! The crate has two halves. The [`region`] module is a faithful simulation
//! of the runtime work the scheme would add: a block-structured bump
//! allocator with per-block object and escape bitmaps, transitive escape
//! marking, and the write-barrier fast path. It exists to be microbenchmarked
//! (see `benches/`), and the per-operation costs measured there calibrate the
//! constants in the [`model`] module, a closed-form calculator that projects
//! the total-CPU change for an application profile under a given scenario.
//!
//! None of this is a production allocator. The simulation deliberately works
//! on raw, block-aligned memory so that the measured cycle counts are
//! realistic, and it is strictly single-threaded.

#[macro_use]
extern crate log;

pub mod model;
pub mod region;
pub mod report;
pub mod util;
