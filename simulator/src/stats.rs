//! Session statistics printed when the simulator exits.

use std::fmt;
use std::time::{Duration, Instant};

use pulse_common::{BeatEvent, TickOutcome};

/// Counters collected by the sampler and reporter.
pub struct SessionStats {
    pub ticks: u32,
    pub resets: u32,
    pub bootstraps: u32,
    pub beats: u32,
    pub bpm_min: u32,
    pub bpm_max: u32,
    pub last_beat: Option<BeatEvent>,

    start_time: Instant,
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            ticks: 0,
            resets: 0,
            bootstraps: 0,
            beats: 0,
            bpm_min: u32::MAX,
            bpm_max: 0,
            last_beat: None,
            start_time: Instant::now(),
        }
    }

    /// Record the outcome of one detector tick.
    pub fn record_tick(
        &mut self,
        outcome: &TickOutcome,
    ) {
        self.ticks += 1;
        if outcome.signal_lost {
            self.resets += 1;
        }
        if outcome.bootstrap {
            self.bootstraps += 1;
        }
    }

    /// Record a beat consumed by the reporter.
    pub fn record_beat(
        &mut self,
        beat: &BeatEvent,
    ) {
        self.beats += 1;
        self.bpm_min = self.bpm_min.min(beat.bpm);
        self.bpm_max = self.bpm_max.max(beat.bpm);
        self.last_beat = Some(*beat);
    }

    /// Fold the sampler's counters into the reporter's.
    pub fn merge_sampler(
        &mut self,
        sampler: &Self,
    ) {
        self.ticks += sampler.ticks;
        self.resets += sampler.resets;
        self.bootstraps += sampler.bootstraps;
    }

    /// Wall-clock time since the stats were created.
    #[inline]
    pub fn uptime(&self) -> Duration { self.start_time.elapsed() }
}

impl Default for SessionStats {
    fn default() -> Self { Self::new() }
}

impl fmt::Display for SessionStats {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(
            f,
            "{} ticks ({} ms signal) in {:.1} s | beats: {} | resets: {} | first beats: {}",
            self.ticks,
            self.ticks * pulse_common::config::TICK_MS,
            self.uptime().as_secs_f32(),
            self.beats,
            self.resets,
            self.bootstraps,
        )?;
        if self.beats > 0 {
            write!(f, " | BPM range: {}-{}", self.bpm_min, self.bpm_max)?;
        }
        if let Some(beat) = self.last_beat {
            write!(f, " | last: {} BPM, IBI {} ms", beat.bpm, beat.ibi)?;
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
