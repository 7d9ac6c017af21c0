//! Pulse monitor library - testable modules for the Pico 2 firmware.
//!
//! This library contains the firmware logic that can be tested on the host
//! machine. The binary (`main.rs`) uses this library and adds the
//! embedded-specific code (ADC sampling, UART output, PWM LED).
//!
//! # Testing
//!
//! Run tests on host with:
//! ```bash
//! cargo test -p pulse-pico2 --lib
//! ```
//!
//! Tests run with `std` enabled (via `cfg_attr`), allowing use of the standard
//! test framework while the actual firmware runs as `no_std`.

// Use no_std only when NOT testing (tests need std for the test harness)
#![cfg_attr(not(test), no_std)]
// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// === Pure logic modules (testable on host, no ARM dependencies) ===

pub mod config;
pub mod indicator;

pub use indicator::BeatIndicator;
