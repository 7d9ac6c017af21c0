//! Serial output for detected beats.
//!
//! Two output formats are supported, selected by [`ReporterConfig`]:
//!
//! - [`OutputMode::Processing`]: one line per value with a single-letter
//!   prefix (`B` = BPM, `Q` = IBI, `S` = raw signal), as read by the pulse
//!   sensor Processing visualizer and third-party serial plotters.
//! - [`OutputMode::Visual`]: a human-readable ASCII bar graph for a plain
//!   serial monitor.
//!
//! The reporter never touches detector state directly: it polls through the
//! query interface and consumes each beat at most once.
//!
//! # Example Output (Processing)
//!
//! ```text
//! B75
//! Q800
//! ```

use core::fmt::{self, Write};

use embassy_sync::blocking_mutex::raw::RawMutex;

use crate::detector::{BeatDetector, BeatEvent};
use crate::shared::SharedDetector;

/// Line terminator used by every report line.
pub const LINE_END: &str = "\r\n";

/// Prefix for the smoothed heart rate line.
pub const BPM_PREFIX: char = 'B';

/// Prefix for the inter-beat interval line.
pub const IBI_PREFIX: char = 'Q';

/// Prefix for the raw signal line.
pub const SIGNAL_PREFIX: char = 'S';

/// Banner written in visual mode when a beat is consumed.
pub const BEAT_BANNER: &str = "*** Heart-Beat Happened *** ";

/// Input range mapped onto the visual bars.
const VISUAL_RANGE_MAX: u32 = 1024;

/// Bar for each of the 12 visual levels.
const VISUAL_BARS: [&str; 12] = [
    "",
    "---",
    "------",
    "---------",
    "------------",
    "--------------|-",
    "--------------|---",
    "--------------|-------",
    "--------------|----------",
    "--------------|----------------",
    "--------------|-------------------",
    "--------------|-----------------------",
];

// =============================================================================
// Configuration
// =============================================================================

/// Serial output format.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OutputMode {
    /// Prefixed values for the Processing visualizer.
    #[default]
    Processing,
    /// ASCII bar graph for a serial monitor.
    Visual,
}

/// Reporter options.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ReporterConfig {
    pub mode: OutputMode,
    /// Also send the latest raw sample on every poll (Processing mode only).
    pub stream_signal: bool,
}

impl ReporterConfig {
    /// Processing protocol without signal streaming.
    pub const PROCESSING: Self = Self {
        mode: OutputMode::Processing,
        stream_signal: false,
    };

    /// ASCII visualizer.
    pub const VISUAL: Self = Self {
        mode: OutputMode::Visual,
        stream_signal: false,
    };
}

// =============================================================================
// Beat Source
// =============================================================================

/// Anything the reporter can poll for beats.
pub trait BeatSource {
    /// Smoothed BPM of the last confirmed beat.
    fn current_bpm(&self) -> u32;
    /// Latest raw sample.
    fn current_signal(&self) -> i32;
    /// Take the pending beat, if any.
    fn consume_beat(&mut self) -> Option<BeatEvent>;
}

impl BeatSource for BeatDetector {
    fn current_bpm(&self) -> u32 { BeatDetector::current_bpm(self) }

    fn current_signal(&self) -> i32 { self.snapshot().signal }

    fn consume_beat(&mut self) -> Option<BeatEvent> { BeatDetector::consume_beat(self) }
}

impl<M: RawMutex> BeatSource for &SharedDetector<M> {
    fn current_bpm(&self) -> u32 { SharedDetector::current_bpm(*self) }

    fn current_signal(&self) -> i32 { SharedDetector::snapshot(*self).signal }

    fn consume_beat(&mut self) -> Option<BeatEvent> { SharedDetector::consume_beat(*self) }
}

// =============================================================================
// Reporter
// =============================================================================

/// Formats detector output for a serial link.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reporter {
    config: ReporterConfig,
    beats_reported: u32,
}

impl Reporter {
    /// Create a reporter with the given options.
    pub const fn new(config: ReporterConfig) -> Self {
        Self {
            config,
            beats_reported: 0,
        }
    }

    /// Options in use.
    #[inline]
    pub const fn config(&self) -> ReporterConfig { self.config }

    /// Number of beats written so far.
    #[inline]
    pub const fn beats_reported(&self) -> u32 { self.beats_reported }

    /// One reporter poll: per-poll output, then at most one pending beat.
    ///
    /// Returns the beat that was consumed and written, if any.
    ///
    /// The beat is taken from `source` before it is formatted. If `out`
    /// fails, the beat is lost and not counted in [`Self::beats_reported`].
    /// Size the writer for the longest poll (a bar plus a beat in visual mode).
    pub fn poll<S: BeatSource, W: Write>(
        &mut self,
        source: &mut S,
        out: &mut W,
    ) -> Result<Option<BeatEvent>, fmt::Error> {
        match self.config.mode {
            OutputMode::Visual => write_visual_bar(out, source.current_bpm())?,
            OutputMode::Processing => {
                if self.config.stream_signal {
                    write_value(out, SIGNAL_PREFIX, source.current_signal())?;
                }
            }
        }

        let Some(beat) = source.consume_beat() else {
            return Ok(None);
        };
        self.write_beat(out, &beat)?;
        Ok(Some(beat))
    }

    /// Write a single beat in the configured format.
    pub fn write_beat<W: Write>(
        &mut self,
        out: &mut W,
        beat: &BeatEvent,
    ) -> fmt::Result {
        match self.config.mode {
            OutputMode::Processing => {
                write_value(out, BPM_PREFIX, beat.bpm)?;
                write_value(out, IBI_PREFIX, beat.ibi)?;
            }
            OutputMode::Visual => {
                // No line end: the next bar finishes the line
                write!(out, "{BEAT_BANNER}BPM: {}  ", beat.bpm)?;
            }
        }
        self.beats_reported = self.beats_reported.wrapping_add(1);
        Ok(())
    }
}

/// Write `{prefix}{value}` followed by [`LINE_END`].
pub fn write_value<W: Write, V: fmt::Display>(
    out: &mut W,
    prefix: char,
    value: V,
) -> fmt::Result {
    write!(out, "{prefix}{value}{LINE_END}")
}

/// Integer range mapping with truncation: `x * (out_max) / in_max`.
#[inline]
const fn map_level(value: u32) -> u32 {
    // Multiply in u64 so huge values cannot wrap back into range
    ((value as u64 * (VISUAL_BARS.len() as u64 - 1)) / VISUAL_RANGE_MAX as u64) as u32
}

/// Bar for a BPM value, `None` once the value maps past the last level.
pub fn visual_bar(bpm: u32) -> Option<&'static str> {
    let level = map_level(bpm);
    VISUAL_BARS.get(level as usize).copied()
}

/// Write the visual bar for `bpm` as a full line. Nothing is written for
/// values past the last level.
pub fn write_visual_bar<W: Write>(
    out: &mut W,
    bpm: u32,
) -> fmt::Result {
    match visual_bar(bpm) {
        Some(bar) => write!(out, "{bar}{LINE_END}"),
        None => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use heapless::String;

    use super::*;
    use crate::config::TICK_MS;
    use crate::waveform::{Shape, Waveform};

    fn detector_with_pending_beat() -> BeatDetector {
        let mut detector = BeatDetector::new();
        let wave = Waveform::new(Shape::Square { high_ms: 100 }, 600, 2048, 952);
        for i in 1..=600 {
            detector.process_tick(wave.sample_at(i * TICK_MS));
        }
        assert!(detector.has_pending_beat());
        detector
    }

    #[test]
    fn test_processing_beat_lines() {
        let mut detector = detector_with_pending_beat();
        let mut reporter = Reporter::new(ReporterConfig::PROCESSING);
        let mut out: String<64> = String::new();

        let beat = reporter.poll(&mut detector, &mut out).unwrap();
        assert_eq!(beat, Some(BeatEvent { bpm: 100, ibi: 600 }));
        assert_eq!(out.as_str(), "B100\r\nQ600\r\n");
        assert_eq!(reporter.beats_reported(), 1);
    }

    #[test]
    fn test_poll_consumes_once() {
        let mut detector = detector_with_pending_beat();
        let mut reporter = Reporter::new(ReporterConfig::PROCESSING);
        let mut out: String<64> = String::new();

        reporter.poll(&mut detector, &mut out).unwrap();
        out.clear();
        let beat = reporter.poll(&mut detector, &mut out).unwrap();
        assert_eq!(beat, None);
        assert!(out.is_empty());
        assert_eq!(reporter.beats_reported(), 1);
    }

    #[test]
    fn test_processing_streams_signal() {
        let mut detector = BeatDetector::new();
        detector.process_tick(1234);
        let config = ReporterConfig {
            stream_signal: true,
            ..ReporterConfig::PROCESSING
        };
        let mut reporter = Reporter::new(config);
        let mut out: String<64> = String::new();

        reporter.poll(&mut detector, &mut out).unwrap();
        assert_eq!(out.as_str(), "S1234\r\n");
    }

    #[test]
    fn test_visual_beat_banner() {
        let mut detector = detector_with_pending_beat();
        let mut reporter = Reporter::new(ReporterConfig::VISUAL);
        let mut out: String<128> = String::new();

        reporter.poll(&mut detector, &mut out).unwrap();
        // 100 * 11 / 1024 = 1
        assert_eq!(out.as_str(), "---\r\n*** Heart-Beat Happened *** BPM: 100  ");
    }

    #[test]
    fn test_visual_without_beat() {
        let mut detector = BeatDetector::new();
        let mut reporter = Reporter::new(ReporterConfig::VISUAL);
        let mut out: String<64> = String::new();

        assert_eq!(reporter.poll(&mut detector, &mut out).unwrap(), None);
        assert_eq!(out.as_str(), "\r\n");
    }

    #[test]
    fn test_visual_bar_mapping() {
        assert_eq!(visual_bar(0), Some(""));
        assert_eq!(visual_bar(93), Some(""));
        assert_eq!(visual_bar(94), Some("---"));
        assert_eq!(visual_bar(200), Some("------"));
        assert_eq!(visual_bar(1023), Some("--------------|-------------------"));
        assert_eq!(visual_bar(1024), Some("--------------|-----------------------"));
        assert_eq!(visual_bar(1117), Some("--------------|-----------------------"));
        assert_eq!(visual_bar(1118), None);
        assert_eq!(visual_bar(u32::MAX), None);
    }

    #[test]
    fn test_write_visual_bar_out_of_range_writes_nothing() {
        let mut out: String<8> = String::new();
        write_visual_bar(&mut out, 5000).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_poll_shared_detector() {
        let shared: SharedDetector<CriticalSectionRawMutex> = SharedDetector::new();
        let wave = Waveform::new(Shape::Square { high_ms: 100 }, 600, 2048, 952);
        for i in 1..=600 {
            shared.tick(wave.sample_at(i * TICK_MS));
        }

        let mut reporter = Reporter::new(ReporterConfig::default());
        let mut out: String<64> = String::new();
        let mut source = &shared;
        reporter.poll(&mut source, &mut out).unwrap();
        assert_eq!(out.as_str(), "B100\r\nQ600\r\n");
        assert!(!shared.has_pending_beat());
    }

    #[test]
    fn test_buffer_overflow_is_an_error() {
        let mut reporter = Reporter::new(ReporterConfig::PROCESSING);
        let mut out: String<4> = String::new();
        let beat = BeatEvent { bpm: 100, ibi: 600 };
        assert!(reporter.write_beat(&mut out, &beat).is_err());
    }

    #[test]
    fn test_poll_overflow_drops_the_beat() {
        let mut detector = detector_with_pending_beat();
        let mut reporter = Reporter::new(ReporterConfig::PROCESSING);
        let mut out: String<4> = String::new();

        assert!(reporter.poll(&mut detector, &mut out).is_err());
        assert!(!detector.has_pending_beat());
        assert_eq!(reporter.beats_reported(), 0);
    }
}
