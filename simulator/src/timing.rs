//! Timing constants for the simulator.
//!
//! These constants use `std::time::Duration` which is not available in `no_std`
//! environments, so they are defined here rather than in the common crate.

use std::time::Duration;

use pulse_common::config::TICK_MS;

/// Sampler period, one detector tick.
pub const SAMPLE_PERIOD: Duration = Duration::from_millis(TICK_MS as u64);

/// Reporter poll period. The reporter sleeps if a poll completes early.
pub const REPORT_PERIOD: Duration = Duration::from_millis(20);

/// Detector ticks between two reporter polls.
pub const TICKS_PER_REPORT: u32 = (REPORT_PERIOD.as_millis() / SAMPLE_PERIOD.as_millis()) as u32;

const _: () = assert!(TICKS_PER_REPORT == 10);
