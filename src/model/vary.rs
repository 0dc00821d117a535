//! Parameter sweeps: expand a scenario across linear ranges.

use std::str::FromStr;

use thiserror::Error;

use crate::model::scenario::Scenario;

/// A scenario parameter a sweep can vary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepParam {
    RegionAllocBytesFrac,
    RegionAllocsFrac,
    FadeAllocBytesFrac,
    FadeAllocsFrac,
    RegionScanCostRatio,
    FadeAllocsPointerDensity,
}

impl SweepParam {
    fn parse(token: &str) -> Option<SweepParam> {
        Some(match token {
            "B_R" => SweepParam::RegionAllocBytesFrac,
            "O_R" => SweepParam::RegionAllocsFrac,
            "B_F" => SweepParam::FadeAllocBytesFrac,
            "O_F" => SweepParam::FadeAllocsFrac,
            "C_R" => SweepParam::RegionScanCostRatio,
            "P_F" => SweepParam::FadeAllocsPointerDensity,
            _ => return None,
        })
    }

    fn apply(self, scenario: &mut Scenario, value: f64) {
        match self {
            SweepParam::RegionAllocBytesFrac => scenario.region_alloc_bytes_frac = value,
            SweepParam::RegionAllocsFrac => scenario.region_allocs_frac = value,
            SweepParam::FadeAllocBytesFrac => scenario.fade_alloc_bytes_frac = value,
            SweepParam::FadeAllocsFrac => scenario.fade_allocs_frac = value,
            SweepParam::RegionScanCostRatio => scenario.region_scan_cost_ratio = value,
            SweepParam::FadeAllocsPointerDensity => scenario.fade_allocs_pointer_density = value,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SweepParseError {
    #[error("invalid sweep program: {0:?}")]
    Malformed(String),
    #[error("invalid sweep program: unknown parameter: {0}")]
    UnknownParam(String),
    #[error("invalid sweep program: cannot parse bound: {0}")]
    BadBound(String),
    #[error("invalid sweep program: cannot parse steps: {0}")]
    BadSteps(String),
    #[error("invalid sweep program: need at least two steps")]
    TooFewSteps,
}

/// A parsed sweep program `PARAM=[LO:HI](,PARAM=[LO:HI])*/STEPS`.
///
/// Every listed parameter is varied together: at step `i` of `N`, each takes
/// the value `lo + i * (hi - lo) / (N - 1)`, so the bounds themselves are
/// always emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepProgram {
    ranges: Vec<(SweepParam, f64, f64)>,
    steps: usize,
}

impl SweepProgram {
    /// The scenarios of the sweep applied to `base`, in step order.
    pub fn scenarios(&self, base: Scenario) -> impl Iterator<Item = Scenario> + '_ {
        let steps = self.steps;
        (0..steps).map(move |i| {
            let mut scenario = base;
            for &(param, lo, hi) in &self.ranges {
                param.apply(&mut scenario, lo + i as f64 * (hi - lo) / (steps - 1) as f64);
            }
            scenario
        })
    }

    pub fn steps(&self) -> usize {
        self.steps
    }
}

impl FromStr for SweepProgram {
    type Err = SweepParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SweepParseError::Malformed(s.to_string());
        let (body, steps) = s.rsplit_once('/').ok_or_else(malformed)?;
        let steps: usize = steps
            .parse()
            .map_err(|_| SweepParseError::BadSteps(steps.to_string()))?;
        if steps < 2 {
            return Err(SweepParseError::TooFewSteps);
        }
        let mut ranges = Vec::new();
        for clause in body.split(',') {
            let (name, range) = clause.split_once('=').ok_or_else(malformed)?;
            let param = SweepParam::parse(name)
                .ok_or_else(|| SweepParseError::UnknownParam(name.to_string()))?;
            let range = range
                .strip_prefix('[')
                .and_then(|r| r.strip_suffix(']'))
                .ok_or_else(malformed)?;
            let (lo, hi) = range.split_once(':').ok_or_else(malformed)?;
            let lo: f64 = lo
                .parse()
                .map_err(|_| SweepParseError::BadBound(lo.to_string()))?;
            let hi: f64 = hi
                .parse()
                .map_err(|_| SweepParseError::BadBound(hi.to_string()))?;
            ranges.push((param, lo, hi));
        }
        Ok(SweepProgram { ranges, steps })
    }
}
