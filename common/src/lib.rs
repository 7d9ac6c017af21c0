//! Platform-agnostic core of the pulse sensor heart rate monitor.
//!
//! This crate contains the code shared between the Pico 2 firmware and the
//! desktop simulator:
//!
//! - [`config`]: Detector timing constants and [`DetectorConfig`]
//! - [`history`]: Fixed-capacity IBI history used for BPM smoothing
//! - [`detector`]: The per-tick beat detection state machine
//! - [`shared`]: Critical-section handoff between the sampler and readers
//! - [`reporter`]: Serial output formatting (Processing protocol / ASCII visual)
//! - [`waveform`]: Deterministic synthetic pulse waveforms
//!
//! # no_std Compatibility
//!
//! This crate is `no_std` and allocation-free. The detector is `const`
//! constructible so it can live in a `static` on the firmware side.
//!
//! # Testing
//!
//! ```bash
//! cargo test -p pulse-common
//! ```

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

pub mod config;
pub mod detector;
pub mod history;
pub mod reporter;
pub mod shared;
pub mod waveform;

// Re-export commonly used items
pub use config::{ConfigError, DetectorConfig};
pub use detector::{BeatDetector, BeatEvent, DetectorSnapshot, TickOutcome};
pub use history::RateHistory;
pub use reporter::{BeatSource, OutputMode, Reporter, ReporterConfig};
pub use shared::SharedDetector;
pub use waveform::{Shape, Waveform};
