//! Beat detection state machine for an analog pulse (PPG) sensor.
//!
//! The detector consumes one raw sample per fixed tick and tracks the pulse
//! wave envelope. A beat is the rising edge of the signal through an adaptive
//! threshold that sits halfway between the trough and the peak of the previous
//! wave.
//!
//! # Tick Sequence
//!
//! With `N` = time since the last beat, each tick:
//!
//! 1. Tracks the trough (below threshold, past the dichrotic notch guard) and
//!    the peak (above threshold).
//! 2. Once `N` exceeds the noise guard, a rising crossing outside an active
//!    pulse is a beat. The first beat after (re)start only bootstraps, the
//!    second seeds the rate history, every later beat is pushed into it.
//! 3. A falling crossing ends the pulse and re-centres the threshold at 50% of
//!    the wave amplitude.
//! 4. With no beat for the silence timeout, the envelope is reset and the
//!    bootstrap starts over.
//!
//! All arithmetic is integer with truncating division.

use crate::config::{ConfigError, DetectorConfig, RATE_HISTORY_LEN};
use crate::history::RateHistory;

// =============================================================================
// Events
// =============================================================================

/// A confirmed heartbeat with its smoothed rate and raw interval.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BeatEvent {
    /// Beats per minute averaged over the last ten intervals.
    pub bpm: u32,
    /// Interval since the previous beat in milliseconds.
    pub ibi: u32,
}

/// Everything that happened during one tick.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickOutcome {
    /// Beat confirmed on this tick.
    pub beat: Option<BeatEvent>,
    /// A beat was detected but discarded as the unreliable first beat.
    pub bootstrap: bool,
    /// No beat for the silence timeout: the envelope was reset on this tick.
    pub signal_lost: bool,
}

/// Copy of the full detector state, taken between ticks.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DetectorSnapshot {
    pub sample_counter: u32,
    pub last_beat_time: u32,
    pub threshold: i32,
    pub peak: i32,
    pub trough: i32,
    pub signal: i32,
    pub ibi: u32,
    pub amplitude: i32,
    pub pulse_active: bool,
    pub quiet_flag: bool,
    pub first_beat: bool,
    pub second_beat: bool,
    pub rate_history: [u32; RATE_HISTORY_LEN],
    pub bpm: u32,
}

// =============================================================================
// Beat Detector
// =============================================================================

/// Adaptive-threshold beat detector driven by periodic samples.
#[derive(Clone, Debug)]
pub struct BeatDetector {
    config: DetectorConfig,

    /// Elapsed time since start in milliseconds (wraps after ~49 days).
    sample_counter: u32,
    last_beat_time: u32,

    // Envelope
    threshold: i32,
    peak: i32,
    trough: i32,
    signal: i32,
    amplitude: i32,

    ibi: u32,
    bpm: u32,
    rate_history: RateHistory,

    /// True while the signal is above threshold after a detected beat.
    pulse_active: bool,
    first_beat: bool,
    second_beat: bool,

    /// Beat waiting to be consumed by a reporter (the "quantified self" flag).
    pending: Option<BeatEvent>,
}

impl BeatDetector {
    /// Create a detector with the default configuration.
    pub const fn new() -> Self { Self::from_config(DetectorConfig::DEFAULT) }

    /// Create a detector with a custom configuration.
    pub const fn with_config(config: DetectorConfig) -> Result<Self, ConfigError> {
        match config.validate() {
            Ok(()) => Ok(Self::from_config(config)),
            Err(e) => Err(e),
        }
    }

    const fn from_config(config: DetectorConfig) -> Self {
        Self {
            config,
            sample_counter: 0,
            last_beat_time: 0,
            threshold: config.seed_threshold,
            peak: config.seed_threshold,
            trough: config.seed_threshold,
            signal: 0,
            amplitude: config.seed_amplitude,
            ibi: config.seed_ibi_ms,
            bpm: 0,
            rate_history: RateHistory::new(),
            pulse_active: false,
            first_beat: true,
            second_beat: false,
            pending: None,
        }
    }

    /// Advance one tick with a raw ADC sample. Returns the confirmed beat, if any.
    ///
    /// Samples are not range-checked; whatever the ADC reports is used as-is.
    #[inline]
    pub fn process_tick(
        &mut self,
        raw_sample: i32,
    ) -> Option<BeatEvent> {
        self.tick(raw_sample).beat
    }

    /// Advance one tick and report bootstrap and silence events as well.
    pub fn tick(
        &mut self,
        raw_sample: i32,
    ) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        self.signal = raw_sample;
        self.sample_counter = self.sample_counter.wrapping_add(self.config.tick_ms);
        let since_beat = self.sample_counter.wrapping_sub(self.last_beat_time);
        let past_notch = since_beat > self.config.notch_guard(self.ibi);

        // Envelope tracking
        if self.signal < self.threshold && past_notch && self.signal < self.trough {
            self.trough = self.signal;
        }
        if self.signal > self.threshold && self.signal > self.peak {
            self.peak = self.signal;
        }

        // Beat detection
        if since_beat > self.config.noise_guard_ms
            && self.signal > self.threshold
            && !self.pulse_active
            && past_notch
        {
            self.pulse_active = true;
            self.ibi = since_beat;
            self.last_beat_time = self.sample_counter;

            if self.second_beat {
                self.second_beat = false;
                self.rate_history.seed(self.ibi);
            }

            if self.first_beat {
                // First interval after (re)start is unreliable: discard it
                self.first_beat = false;
                self.second_beat = true;
                outcome.bootstrap = true;
                return outcome;
            }

            self.rate_history.push(self.ibi);
            if let Some(bpm) = self.rate_history.bpm() {
                self.bpm = bpm;
            }

            let event = BeatEvent {
                bpm: self.bpm,
                ibi: self.ibi,
            };
            self.pending = Some(event);
            outcome.beat = Some(event);
        }

        // End of the pulse wave: re-centre the threshold
        if self.signal < self.threshold && self.pulse_active {
            self.pulse_active = false;
            // Two's-complement wrap on full-scale inputs
            self.amplitude = self.peak.wrapping_sub(self.trough);
            self.threshold = self.trough.wrapping_add(self.amplitude / 2);
            self.peak = self.threshold;
            self.trough = self.threshold;
        }

        // Silence reset
        if since_beat > self.config.silence_timeout_ms {
            let level = self.config.silence_reset_level;
            self.threshold = level;
            self.peak = level;
            self.trough = level;
            self.last_beat_time = self.sample_counter;
            self.first_beat = true;
            self.second_beat = false;
            outcome.signal_lost = true;
        }

        outcome
    }

    /// Smoothed BPM of the last confirmed beat, `0` before the first one.
    #[inline]
    pub const fn current_bpm(&self) -> u32 { self.bpm }

    /// Latest inter-beat interval in milliseconds.
    #[inline]
    pub const fn current_ibi(&self) -> u32 { self.ibi }

    /// True if a confirmed beat has not been consumed yet.
    #[inline]
    pub const fn has_pending_beat(&self) -> bool { self.pending.is_some() }

    /// Take the pending beat. Each beat is returned at most once.
    #[inline]
    pub fn consume_beat(&mut self) -> Option<BeatEvent> { self.pending.take() }

    /// Configuration in use.
    #[inline]
    pub const fn config(&self) -> &DetectorConfig { &self.config }

    /// Copy of the complete state.
    pub fn snapshot(&self) -> DetectorSnapshot {
        DetectorSnapshot {
            sample_counter: self.sample_counter,
            last_beat_time: self.last_beat_time,
            threshold: self.threshold,
            peak: self.peak,
            trough: self.trough,
            signal: self.signal,
            ibi: self.ibi,
            amplitude: self.amplitude,
            pulse_active: self.pulse_active,
            quiet_flag: self.pending.is_some(),
            first_beat: self.first_beat,
            second_beat: self.second_beat,
            rate_history: self.rate_history.to_array(),
            bpm: self.bpm,
        }
    }
}

impl Default for BeatDetector {
    fn default() -> Self { Self::new() }
}

// =============================================================================
// Unit Tests
// =============================================================================
