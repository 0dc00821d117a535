//! The analytic cost model: application profiles, region scenarios, the
//! closed-form CPU projection, and parameter sweeps.

pub mod cost;
pub mod profile;
pub mod scenario;
pub mod vary;
