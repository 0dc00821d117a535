//! Closed-form CPU projection for a (profile, scenario) pair.
//!
//! The per-operation constants below are nanosecond costs calibrated from
//! the microbenchmarks under `benches/`: bump and baseline allocation from
//! the allocation benchmark, the barrier cost from the write-barrier
//! benchmark, and the fade costs from escape marking over pointer-dense
//! objects.

use crate::model::profile::AppProfile;
use crate::model::scenario::Scenario;

const BUMP_ALLOC_NS_PER_OBJECT: f64 = 8.0;
const BUMP_ALLOC_NS_PER_BYTE: f64 = 0.15;
const BASE_ALLOC_NS_PER_OBJECT: f64 = 20.0;
const BASE_ALLOC_NS_PER_BYTE: f64 = 0.08;
const WRITE_BARRIER_NS_PER_WRITE: f64 = 4.5;
const FADE_NS_PER_OBJECT: f64 = 40.0;
const FADE_NS_PER_POINTER: f64 = 3.37;

/// Projected CPU deltas for one (profile, scenario) pair, as fractions of
/// the profile's total CPU.
#[derive(Debug, Clone, Copy)]
pub struct Projection {
    /// Change in total CPU.
    pub delta_cpu_frac: f64,
    /// CPU added by the new write barrier.
    pub write_barrier_frac: f64,
    /// Change in allocation CPU.
    pub delta_alloc_frac: f64,
}

/// Project the CPU effect of running `prof`'s workload under `scenario`.
pub fn project(prof: &AppProfile, scenario: &Scenario) -> Projection {
    let total = prof.total_cpu.as_nanos() as f64;
    let gc = prof.gc_cpu.as_nanos() as f64;

    let delta_alloc = delta_alloc_cpu(prof, scenario);
    let barrier = write_barrier_cpu(prof.pointer_writes);

    let mut delta = delta_alloc;
    // GC over the heap that remains outside regions.
    delta += gc * (1.0 - scenario.region_alloc_bytes_frac);
    // GC over faded and scanned region bytes.
    delta += gc
        * scenario.region_alloc_bytes_frac
        * (scenario.fade_alloc_bytes_frac + scenario.scanned_region_alloc_bytes_frac)
        * scenario.region_scan_cost_ratio;
    // The baseline GC cost goes away.
    delta -= gc;
    // The new write barrier runs on every pointer write (an overestimate).
    delta += barrier;
    // Fading promotes objects and their pointer shapes under GC control.
    delta += fade_cpu(
        prof.allocs as f64 * scenario.region_allocs_frac * scenario.fade_allocs_frac,
        scenario.fade_allocs_pointer_density
            * prof.alloc_bytes as f64
            * scenario.region_alloc_bytes_frac
            * scenario.fade_alloc_bytes_frac,
    );

    Projection {
        delta_cpu_frac: delta / total,
        write_barrier_frac: barrier / total,
        delta_alloc_frac: delta_alloc / total,
    }
}

fn delta_alloc_cpu(prof: &AppProfile, scenario: &Scenario) -> f64 {
    let allocs = prof.allocs as f64;
    let bytes = prof.alloc_bytes as f64;
    // Regionalized allocation becomes bump allocation, the rest stays on
    // the baseline allocator, and the original baseline cost is subtracted.
    bump_alloc_cpu(
        scenario.region_allocs_frac * allocs,
        scenario.region_alloc_bytes_frac * bytes,
    ) + base_alloc_cpu(
        (1.0 - scenario.region_allocs_frac) * allocs,
        (1.0 - scenario.region_alloc_bytes_frac) * bytes,
    ) - base_alloc_cpu(allocs, bytes)
}

fn bump_alloc_cpu(objects: f64, bytes: f64) -> f64 {
    BUMP_ALLOC_NS_PER_OBJECT * objects + BUMP_ALLOC_NS_PER_BYTE * bytes
}

pub(crate) fn base_alloc_cpu(objects: f64, bytes: f64) -> f64 {
    BASE_ALLOC_NS_PER_OBJECT * objects + BASE_ALLOC_NS_PER_BYTE * bytes
}

fn write_barrier_cpu(writes: u64) -> f64 {
    WRITE_BARRIER_NS_PER_WRITE * writes as f64
}

fn fade_cpu(objects: f64, pointers: f64) -> f64 {
    FADE_NS_PER_OBJECT * objects + FADE_NS_PER_POINTER * pointers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::profile;
    use crate::model::scenario;

    fn etcd_put() -> &'static AppProfile {
        profile::find("EtcdPutBench").unwrap()
    }

    #[test]
    fn best_possible_on_etcd_put() {
        let proj = project(etcd_put(), scenario::find("BestPossible").unwrap());
        // Full regionalization with no fading: the GC cost disappears, the
        // barrier cost appears, and bump allocation is a small win.
        assert!((proj.delta_cpu_frac * 100.0 - -0.93).abs() < 0.01);
        assert!((proj.write_barrier_frac * 100.0 - 0.92).abs() < 0.01);
        assert!((proj.delta_alloc_frac * 100.0 - -0.18).abs() < 0.01);
    }

    #[test]
    fn worst_possible_on_etcd_put() {
        let proj = project(etcd_put(), scenario::find("WorstPossible").unwrap());
        // Everything fades: the fade cost dominates and the projection is
        // strongly positive.
        assert!(proj.delta_cpu_frac * 100.0 > 2.5);
        assert!((proj.delta_cpu_frac * 100.0 - 5.01).abs() < 0.01);
    }

    #[test]
    fn ideal_broad_use_on_tile38() {
        let tile38 = profile::find("Tile38Bench").unwrap();
        let proj = project(tile38, scenario::find("IdealBroadUse").unwrap());
        assert!((proj.delta_cpu_frac * 100.0 - -3.69).abs() < 0.01);
    }

    #[test]
    fn delta_is_monotone_in_fade_parameters() {
        let base = *scenario::find("IdealBroadUse").unwrap();
        for prof in profile::APP_PROFILES {
            let mut last = f64::NEG_INFINITY;
            for i in 0..=10 {
                let mut s = base;
                s.fade_alloc_bytes_frac = i as f64 / 10.0;
                let d = project(prof, &s).delta_cpu_frac;
                assert!(d >= last, "delta not monotone in B_F for {}", prof.name);
                last = d;
            }
            let mut last = f64::NEG_INFINITY;
            for i in 0..=10 {
                let mut s = base;
                s.fade_allocs_frac = i as f64 / 10.0;
                let d = project(prof, &s).delta_cpu_frac;
                assert!(d >= last, "delta not monotone in O_F for {}", prof.name);
                last = d;
            }
            let mut last = f64::NEG_INFINITY;
            for i in 0..=10 {
                let mut s = base;
                s.region_scan_cost_ratio = 1.0 + i as f64 / 10.0;
                let d = project(prof, &s).delta_cpu_frac;
                assert!(d >= last, "delta not monotone in C_R for {}", prof.name);
                last = d;
            }
        }
    }

    #[test]
    fn regionalization_without_fading_reduces_gc_cost() {
        for prof in profile::APP_PROFILES {
            let mut last = f64::INFINITY;
            for i in 0..=10 {
                let mut s = *scenario::find("BestPossible").unwrap();
                s.region_alloc_bytes_frac = i as f64 / 10.0;
                let d = project(prof, &s).delta_cpu_frac;
                assert!(
                    d <= last,
                    "delta not non-increasing in B_R for {}",
                    prof.name
                );
                last = d;
            }
        }
    }
}
