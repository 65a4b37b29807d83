//! Green-grid telemetry derived from the hardware counters.

use std::ops::Range;

use rand::Rng;
use serde::Serialize;

use crate::channel::Counters;

/// Bounds of the reported entropy score
pub const ENTROPY_RANGE: Range<u32> = 100..200;

/// Baseline draw of an idle core, in watts
pub const IDLE_WATTS: f64 = 0.05;

/// Extra draw per percentage point of uncompressed traffic
pub const WATTS_PER_PERCENT: f64 = 0.001;

/// Telemetry snapshot. Recomputed on every query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    /// Total bytes in
    pub events_processed: u64,
    /// Total bytes out
    pub events_emitted: u64,
    /// Estimated power consumption
    pub current_watts: f64,
    /// Efficiency of the compression model
    pub grid_save_percent: f64,
    /// Bounded noise standing in for polymorphic complexity
    pub entropy_score: u32,
}

impl Metrics {
    /// Derive a snapshot from `counters`, drawing the entropy score from `rng`.
    pub fn sample<R: Rng + ?Sized>(counters: &Counters, rng: &mut R) -> Self {
        let grid_save_percent = grid_save_percent(counters);
        Self {
            events_processed: counters.bytes_in,
            events_emitted: counters.bytes_out,
            current_watts: estimate_watts(grid_save_percent),
            grid_save_percent,
            entropy_score: rng.gen_range(ENTROPY_RANGE),
        }
    }
}

/// `(1 - out/in) * 100`, or 0 before any input.
pub fn grid_save_percent(counters: &Counters) -> f64 {
    if counters.bytes_in == 0 {
        return 0.0;
    }
    let ratio = counters.bytes_out as f64 / counters.bytes_in as f64;
    (1.0 - ratio) * 100.0
}

/// Power estimate for a given efficiency.
pub fn estimate_watts(grid_save_percent: f64) -> f64 {
    IDLE_WATTS + (100.0 - grid_save_percent) * WATTS_PER_PERCENT
}
