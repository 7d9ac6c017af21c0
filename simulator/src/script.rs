//! Scripted sensor session.
//!
//! A [`Script`] strings together pulse and flat segments so one run shows the
//! detector bootstrapping, tracking rate changes and recovering from a
//! removed finger. Time is the detector's own clock (ms since the first tick).

use pulse_common::{Shape, Waveform};

/// One stretch of the simulated signal.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Segment {
    /// Periodic pulse.
    Pulse { waveform: Waveform, duration_ms: u32 },
    /// Constant level (finger off the sensor).
    Flat { level: i32, duration_ms: u32 },
}

impl Segment {
    #[inline]
    pub const fn duration_ms(&self) -> u32 {
        match self {
            Self::Pulse { duration_ms, .. } | Self::Flat { duration_ms, .. } => *duration_ms,
        }
    }

    /// Value at `t_ms` relative to the start of the segment.
    fn sample_at(
        &self,
        t_ms: u32,
    ) -> i32 {
        match self {
            Self::Pulse { waveform, .. } => waveform.sample_at(t_ms),
            Self::Flat { level, .. } => *level,
        }
    }

    /// Short label for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Pulse { waveform, duration_ms } => {
                format!("{} BPM pulse for {} s", waveform.bpm(), duration_ms / 1000)
            }
            Self::Flat { level, duration_ms } => format!("flat {level} for {} s (no finger)", duration_ms / 1000),
        }
    }
}

/// Baseline of the scripted pulses. Troughs must sit below the detector's
/// silence reset level (512) or it cannot re-arm after a dropout.
const BASELINE: i32 = 300;

/// Systolic peak height above [`BASELINE`].
const AMPLITUDE: i32 = 2600;

/// Default session: 72 BPM, finger lifted for 5 s, 90 BPM, then 60 BPM.
const DEFAULT_SEGMENTS: [Segment; 4] = [
    Segment::Pulse {
        waveform: Waveform::from_bpm(Shape::Ppg, 72, BASELINE, AMPLITUDE),
        duration_ms: 20_000,
    },
    Segment::Flat {
        level: BASELINE,
        duration_ms: 5_000,
    },
    Segment::Pulse {
        waveform: Waveform::from_bpm(Shape::Ppg, 90, BASELINE, AMPLITUDE),
        duration_ms: 20_000,
    },
    Segment::Pulse {
        waveform: Waveform::from_bpm(Shape::Ppg, 60, BASELINE, AMPLITUDE),
        duration_ms: 20_000,
    },
];

/// Sequence of segments played back to back.
#[derive(Clone, Copy, Debug)]
pub struct Script {
    segments: &'static [Segment],
}

impl Script {
    pub const fn new(segments: &'static [Segment]) -> Self { Self { segments } }

    /// The built-in demonstration session.
    pub const fn default_session() -> Self { Self::new(&DEFAULT_SEGMENTS) }

    #[inline]
    pub fn segments(&self) -> &'static [Segment] { self.segments }

    /// Total length in milliseconds.
    pub fn duration_ms(&self) -> u32 { self.segments.iter().map(Segment::duration_ms).sum() }

    /// Segment playing at `t_ms` and its start time, `None` past the end.
    pub fn segment_at(
        &self,
        t_ms: u32,
    ) -> Option<(u32, &'static Segment)> {
        let mut start = 0u32;
        for segment in self.segments {
            let end = start + segment.duration_ms();
            if t_ms < end {
                return Some((start, segment));
            }
            start = end;
        }
        None
    }

    /// Raw sample at `t_ms`, `None` once the script has ended.
    pub fn sample_at(
        &self,
        t_ms: u32,
    ) -> Option<i32> {
        self.segment_at(t_ms)
            .map(|(start, segment)| segment.sample_at(t_ms - start))
    }
}

impl Default for Script {
    fn default() -> Self { Self::default_session() }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use pulse_common::config::TICK_MS;
    use pulse_common::{BeatDetector, BeatEvent};

    use super::*;

    /// Play the whole script through a fresh detector.
    fn play(script: &Script) -> (Vec<(u32, BeatEvent)>, Vec<u32>) {
        let mut detector = BeatDetector::new();
        let mut beats = Vec::new();
        let mut resets = Vec::new();
        let mut t = TICK_MS;
        while let Some(raw) = script.sample_at(t) {
            let outcome = detector.tick(raw);
            if let Some(beat) = outcome.beat {
                beats.push((t, beat));
            }
            if outcome.signal_lost {
                resets.push(t);
            }
            t += TICK_MS;
        }
        (beats, resets)
    }

    #[test]
    fn test_duration() {
        assert_eq!(Script::default_session().duration_ms(), 65_000);
    }

    #[test]
    fn test_segment_lookup() {
        let script = Script::default_session();
        let (start, segment) = script.segment_at(0).unwrap();
        assert_eq!(start, 0);
        assert!(matches!(segment, Segment::Pulse { .. }));

        let (start, segment) = script.segment_at(20_000).unwrap();
        assert_eq!(start, 20_000);
        assert_eq!(*segment, Segment::Flat { level: BASELINE, duration_ms: 5_000 });

        assert_eq!(script.segment_at(64_999).map(|(start, _)| start), Some(45_000));
        assert!(script.segment_at(65_000).is_none());
        assert!(script.sample_at(65_000).is_none());
    }

    #[test]
    fn test_segments_restart_their_waveform() {
        let script = Script::default_session();
        // Systolic peak 15% into the first 90 BPM period
        let peak = script.sample_at(25_000 + 100).unwrap();
        assert!(peak > BASELINE + AMPLITUDE - 50, "peak {peak}");
        assert_eq!(script.sample_at(22_000), Some(BASELINE));
    }

    #[test]
    fn test_describe() {
        let script = Script::default_session();
        assert_eq!(script.segments()[0].describe(), "72 BPM pulse for 20 s");
        assert_eq!(script.segments()[1].describe(), "flat 300 for 5 s (no finger)");
    }

    #[test]
    fn test_default_session_tracks_each_rate() {
        let (beats, resets) = play(&Script::default_session());

        // Dropout at 20 s: resets at ~21.7 s and ~24.2 s, then pulses resume
        assert_eq!(resets.len(), 2, "resets at {resets:?}");
        assert!(resets.iter().all(|&t| (20_000..25_000).contains(&t)));
        assert!(beats.iter().all(|&(t, _)| !(20_000..25_000).contains(&t)));

        let bpm_before = |end: u32| beats.iter().rev().find(|&&(t, _)| t < end).map(|(_, beat)| beat.bpm);
        assert!(matches!(bpm_before(20_000), Some(71..=73)));
        assert!(matches!(bpm_before(45_000), Some(89..=91)));
        assert!(matches!(bpm_before(65_000), Some(59..=61)));
    }
}
