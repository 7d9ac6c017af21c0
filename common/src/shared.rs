//! Critical-section handoff between the sampler and its readers.
//!
//! The sampler ticks the detector from a 2 ms timer while the reporter polls
//! it every ~20 ms from another task (or thread on the simulator). Every access
//! goes through one blocking mutex, so a tick is never observed half-applied
//! and each beat is consumed at most once.
//!
//! # Usage
//!
//! ```ignore
//! static DETECTOR: SharedDetector<CriticalSectionRawMutex> = SharedDetector::new();
//!
//! // Sampler (2 ms)
//! let outcome = DETECTOR.tick(raw);
//!
//! // Reporter (~20 ms)
//! if let Some(beat) = DETECTOR.consume_beat() { /* ... */ }
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::config::{ConfigError, DetectorConfig};
use crate::detector::{BeatDetector, BeatEvent, DetectorSnapshot, TickOutcome};

/// Beat detector behind a blocking mutex, safe to place in a `static`.
pub struct SharedDetector<M: RawMutex> {
    inner: Mutex<M, RefCell<BeatDetector>>,
}

impl<M: RawMutex> SharedDetector<M> {
    /// Create a shared detector with the default configuration.
    pub const fn new() -> Self { Self::from_detector(BeatDetector::new()) }

    /// Create a shared detector with a custom configuration.
    pub fn with_config(config: DetectorConfig) -> Result<Self, ConfigError> {
        BeatDetector::with_config(config).map(Self::from_detector)
    }

    /// Wrap an existing detector.
    pub const fn from_detector(detector: BeatDetector) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(detector)),
        }
    }

    /// Run `f` with exclusive access to the detector.
    #[inline]
    fn with<R>(
        &self,
        f: impl FnOnce(&mut BeatDetector) -> R,
    ) -> R {
        self.inner.lock(|cell| f(&mut cell.borrow_mut()))
    }

    /// Advance one tick atomically.
    #[inline]
    pub fn tick(
        &self,
        raw_sample: i32,
    ) -> TickOutcome {
        self.with(|detector| detector.tick(raw_sample))
    }

    /// Advance one tick atomically, returning only the confirmed beat.
    #[inline]
    pub fn process_tick(
        &self,
        raw_sample: i32,
    ) -> Option<BeatEvent> {
        self.tick(raw_sample).beat
    }

    /// Smoothed BPM of the last confirmed beat.
    pub fn current_bpm(&self) -> u32 { self.with(|detector| detector.current_bpm()) }

    /// Peek at the pending beat flag without clearing it.
    pub fn has_pending_beat(&self) -> bool { self.with(|detector| detector.has_pending_beat()) }

    /// Take the pending beat (read-and-clear).
    pub fn consume_beat(&self) -> Option<BeatEvent> { self.with(BeatDetector::consume_beat) }

    /// Consistent copy of the full detector state.
    pub fn snapshot(&self) -> DetectorSnapshot { self.with(|detector| detector.snapshot()) }
}

impl<M: RawMutex> Default for SharedDetector<M> {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

    use super::*;
    use crate::config::TICK_MS;
    use crate::waveform::{Shape, Waveform};

    type Shared = SharedDetector<CriticalSectionRawMutex>;

    static STATIC_DETECTOR: Shared = SharedDetector::new();

    #[test]
    fn test_static_construction() {
        let snapshot = STATIC_DETECTOR.snapshot();
        assert_eq!(snapshot.threshold, 2048);
        assert!(!STATIC_DETECTOR.has_pending_beat());
    }

    #[test]
    fn test_with_config_rejects_invalid() {
        let config = DetectorConfig {
            notch_guard_den: 0,
            ..DetectorConfig::DEFAULT
        };
        assert!(Shared::with_config(config).is_err());
        assert!(Shared::with_config(DetectorConfig::DEFAULT).is_ok());
    }

    #[test]
    fn test_consume_beat_round_trip() {
        let shared = Shared::new();
        let wave = Waveform::new(Shape::Square { high_ms: 100 }, 600, 2048, 952);
        for _ in 0..600 {
            let t = shared.snapshot().sample_counter + TICK_MS;
            shared.tick(wave.sample_at(t));
        }

        assert!(shared.has_pending_beat());
        assert_eq!(shared.current_bpm(), 100);
        assert_eq!(shared.consume_beat(), Some(BeatEvent { bpm: 100, ibi: 600 }));
        assert_eq!(shared.consume_beat(), None);
        assert!(!shared.has_pending_beat());
    }

    #[test]
    fn test_concurrent_reader_sees_each_beat_at_most_once() {
        let shared = Arc::new(Shared::new());
        let wave = Waveform::new(Shape::Square { high_ms: 100 }, 600, 2048, 952);

        let producer = {
            let shared = Arc::clone(&shared);
            thread::spawn(move || {
                let mut emitted = 0u32;
                for i in 1..=15_000u32 {
                    if shared.process_tick(wave.sample_at(i * TICK_MS)).is_some() {
                        emitted += 1;
                    }
                }
                emitted
            })
        };

        let mut consumed = 0u32;
        loop {
            if let Some(beat) = shared.consume_beat() {
                assert_eq!(beat, BeatEvent { bpm: 100, ibi: 600 });
                consumed += 1;
            }
            // Every snapshot is taken between ticks
            let snapshot = shared.snapshot();
            assert_eq!(snapshot.sample_counter % TICK_MS, 0);
            if producer.is_finished() {
                break;
            }
            thread::yield_now();
        }

        let emitted = producer.join().unwrap();
        if shared.consume_beat().is_some() {
            consumed += 1;
        }
        assert_eq!(emitted, 49);
        assert!(consumed >= 1);
        assert!(consumed <= emitted);
    }
}
