//! Detector timing constants and runtime configuration.
//!
//! All defaults are compile-time constants with validation assertions.
//! [`DetectorConfig`] carries them at runtime so the empirical guard values
//! can be tuned per sensor.
//!
//! # Usage
//!
//! ```ignore
//! use pulse_common::config::DetectorConfig;
//!
//! let config = DetectorConfig { silence_timeout_ms: 3000, ..DetectorConfig::DEFAULT };
//! let detector = BeatDetector::with_config(config)?;
//! ```

use core::fmt;

// =============================================================================
// Timing Defaults
// =============================================================================

/// Sampling period in milliseconds (500 Hz).
pub const TICK_MS: u32 = 2;

/// Minimum time since the last beat before a new beat is considered.
/// Rejects high-frequency noise (caps detection at 240 BPM).
pub const NOISE_GUARD_MS: u32 = 250;

/// Dichrotic notch guard numerator: wait `(ibi / DEN) * NUM` ms after a beat.
pub const NOTCH_GUARD_NUM: u32 = 3;

/// Dichrotic notch guard denominator.
pub const NOTCH_GUARD_DEN: u32 = 5;

/// Time without a beat after which the detector re-bootstraps.
pub const SILENCE_TIMEOUT_MS: u32 = 2500;

const _: () = assert!(TICK_MS > 0);
const _: () = assert!(NOTCH_GUARD_DEN > 0);
const _: () = assert!(NOISE_GUARD_MS < SILENCE_TIMEOUT_MS);

// =============================================================================
// Seed Values
// =============================================================================

/// Threshold, peak and trough at startup (mid-scale of a 12-bit ADC).
pub const SEED_THRESHOLD: i32 = 2048;

/// Threshold, peak and trough after a silence reset.
pub const SILENCE_RESET_LEVEL: i32 = 512;

/// Inter-beat interval at startup (100 BPM).
pub const SEED_IBI_MS: u32 = 600;

/// Pulse wave amplitude at startup.
pub const SEED_AMPLITUDE: i32 = 410;

/// Number of IBI values averaged for the BPM.
pub const RATE_HISTORY_LEN: usize = 10;

/// Milliseconds per minute, numerator of every BPM computation.
pub const MS_PER_MINUTE: u32 = 60_000;

// =============================================================================
// Detector Configuration
// =============================================================================

/// Reasons a [`DetectorConfig`] is rejected.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `tick_ms` is zero, so time would never advance.
    ZeroTick,
    /// `notch_guard_den` is zero.
    ZeroNotchDenominator,
    /// The silence timeout must be longer than the noise guard, otherwise
    /// every beat candidate is preempted by a reset.
    SilenceBeforeNoiseGuard,
}

impl fmt::Display for ConfigError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            Self::ZeroTick => f.write_str("tick_ms must be non-zero"),
            Self::ZeroNotchDenominator => f.write_str("notch_guard_den must be non-zero"),
            Self::SilenceBeforeNoiseGuard => f.write_str("silence_timeout_ms must exceed noise_guard_ms"),
        }
    }
}

/// Tunable constants of the beat detector.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DetectorConfig {
    /// Sampling period in milliseconds.
    pub tick_ms: u32,
    /// High-frequency noise guard in milliseconds.
    pub noise_guard_ms: u32,
    /// Dichrotic notch guard numerator.
    pub notch_guard_num: u32,
    /// Dichrotic notch guard denominator.
    pub notch_guard_den: u32,
    /// Silence reset trigger in milliseconds.
    pub silence_timeout_ms: u32,
    /// Threshold/peak/trough after a silence reset.
    pub silence_reset_level: i32,
    /// Threshold/peak/trough at startup.
    pub seed_threshold: i32,
    /// IBI at startup in milliseconds.
    pub seed_ibi_ms: u32,
    /// Amplitude at startup.
    pub seed_amplitude: i32,
}

impl DetectorConfig {
    /// Defaults tuned for the analog pulse sensor sampled at 500 Hz.
    pub const DEFAULT: Self = Self {
        tick_ms: TICK_MS,
        noise_guard_ms: NOISE_GUARD_MS,
        notch_guard_num: NOTCH_GUARD_NUM,
        notch_guard_den: NOTCH_GUARD_DEN,
        silence_timeout_ms: SILENCE_TIMEOUT_MS,
        silence_reset_level: SILENCE_RESET_LEVEL,
        seed_threshold: SEED_THRESHOLD,
        seed_ibi_ms: SEED_IBI_MS,
        seed_amplitude: SEED_AMPLITUDE,
    };

    /// Check the configuration for values that would break the state machine.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::ZeroTick);
        }
        if self.notch_guard_den == 0 {
            return Err(ConfigError::ZeroNotchDenominator);
        }
        if self.silence_timeout_ms <= self.noise_guard_ms {
            return Err(ConfigError::SilenceBeforeNoiseGuard);
        }
        Ok(())
    }

    /// Dichrotic notch guard for the given IBI: `(ibi / den) * num`.
    ///
    /// The division happens first and truncates.
    #[inline]
    pub const fn notch_guard(
        &self,
        ibi: u32,
    ) -> u32 {
        (ibi / self.notch_guard_den) * self.notch_guard_num
    }
}

impl Default for DetectorConfig {
    fn default() -> Self { Self::DEFAULT }
}

const _: () = assert!(DetectorConfig::DEFAULT.validate().is_ok());

// =============================================================================
// Unit Tests
// =============================================================================
