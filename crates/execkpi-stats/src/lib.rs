//! Pure significance evaluation for A/B conversion experiments.
//!
//! Turns two group outcome tallies into a full report: an SRM
//! (sample-ratio-mismatch) guard, a pooled two-proportion z-test and a fixed
//! 95% confidence interval for the uplift. No side effects, no state; safe
//! to call concurrently.

pub mod dist;
mod significance;

pub use significance::{evaluate, Ci95, SignificanceReport, DEFAULT_ALPHA};
