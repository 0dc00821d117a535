//! CPU and allocation profiles collected from real application runs.

use std::time::Duration;

use crate::model::cost;

/// One application's measured profile: total CPU, CPU spent in the GC, and
/// the allocation and pointer-write volume over the same run.
#[derive(Debug, Clone, Copy)]
pub struct AppProfile {
    pub name: &'static str,
    pub total_cpu: Duration,
    pub gc_cpu: Duration,
    pub alloc_bytes: u64,
    pub allocs: u64,
    pub pointer_writes: u64,
}

impl AppProfile {
    /// Fraction of total CPU the GC consumed.
    pub fn gc_cpu_frac(&self) -> f64 {
        self.gc_cpu.as_nanos() as f64 / self.total_cpu.as_nanos() as f64
    }

    /// Fraction of total CPU the baseline allocator consumed, per the cost
    /// model's calibrated allocation costs.
    pub fn alloc_cpu_frac(&self) -> f64 {
        cost::base_alloc_cpu(self.allocs as f64, self.alloc_bytes as f64)
            / self.total_cpu.as_nanos() as f64
    }
}

/// The compiled-in application profiles. Total CPU figures for the server
/// benchmarks are wall-clock times multiplied by the core count of the run.
pub const APP_PROFILES: &[AppProfile] = &[
    AppProfile {
        name: "Tile38Bench",
        total_cpu: Duration::from_nanos(1_055_508_000_000),
        gc_cpu: Duration::from_nanos(106_033_000_000),
        allocs: 145_783_906,
        alloc_bytes: 84_299_344_536,
        pointer_writes: 3_982_888_311,
    },
    AppProfile {
        name: "EtcdPutBench",
        total_cpu: Duration::from_nanos(18_732_000_000),
        gc_cpu: Duration::from_nanos(310_651_000),
        allocs: 8_838_440,
        alloc_bytes: 1_027_291_400,
        pointer_writes: 38_108_457,
    },
    AppProfile {
        name: "EtcdStmBench",
        total_cpu: Duration::from_nanos(53_212_000_000),
        gc_cpu: Duration::from_nanos(4_677_100_000),
        allocs: 51_522_979,
        alloc_bytes: 11_645_083_144,
        pointer_writes: 446_980_825,
    },
    AppProfile {
        name: "CockroachKv0W300",
        total_cpu: Duration::from_nanos(696_232_000_000),
        gc_cpu: Duration::from_nanos(24_808_369_000),
        allocs: 428_559_454,
        alloc_bytes: 55_367_775_328,
        pointer_writes: 5_961_213_414,
    },
    AppProfile {
        name: "CockroachKv50W300",
        total_cpu: Duration::from_nanos(779_872_000_000),
        gc_cpu: Duration::from_nanos(26_663_114_000),
        allocs: 967_379_582,
        alloc_bytes: 70_718_196_320,
        pointer_writes: 6_446_345_731,
    },
    AppProfile {
        name: "CockroachKv95W300",
        total_cpu: Duration::from_nanos(661_504_000_000),
        gc_cpu: Duration::from_nanos(20_728_359_000),
        allocs: 368_300_343,
        alloc_bytes: 40_104_479_528,
        pointer_writes: 5_636_509_516,
    },
    AppProfile {
        name: "CockroachKv0W100",
        total_cpu: Duration::from_nanos(827_464_000_000),
        gc_cpu: Duration::from_nanos(89_548_573_000),
        allocs: 1_106_189_051,
        alloc_bytes: 74_973_042_400,
        pointer_writes: 5_669_424_874,
    },
    AppProfile {
        name: "CockroachKv50W100",
        total_cpu: Duration::from_nanos(821_000_000_000),
        gc_cpu: Duration::from_nanos(80_561_780_000),
        allocs: 1_052_674_597,
        alloc_bytes: 69_439_903_920,
        pointer_writes: 5_709_550_463,
    },
    AppProfile {
        name: "CockroachKv95W100",
        total_cpu: Duration::from_nanos(984_808_000_000),
        gc_cpu: Duration::from_nanos(101_636_461_000),
        allocs: 1_958_662_837,
        alloc_bytes: 98_514_330_368,
        pointer_writes: 6_556_261_885,
    },
];

/// Look up a profile by name.
pub fn find(name: &str) -> Option<&'static AppProfile> {
    APP_PROFILES.iter().find(|p| p.name == name)
}
