//! Async tasks for the pulse monitor firmware.
//!
//! This module contains Embassy async tasks that run concurrently:
//! - `sampler`: Reads the sensor every 2 ms and ticks the detector
//! - `reporter`: Polls the detector every 20 ms, writes the serial report and
//!   drives the beat LEDs
//!
//! Both tasks share [`DETECTOR`]; every access is a short critical section.

pub mod reporter;
pub mod sampler;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use pulse_common::SharedDetector;

pub use reporter::{ReporterOutputs, reporter_task};
pub use sampler::{SampleSource, sampler_task};

/// Detector shared between the sampler (writer) and reporter (reader).
/// Initialized at compile time (`SharedDetector::new()` is const).
pub static DETECTOR: SharedDetector<CriticalSectionRawMutex> = SharedDetector::new();
