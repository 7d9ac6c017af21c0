//! Task cadence and serial output settings.

use pulse_common::config::TICK_MS;
use pulse_common::{OutputMode, ReporterConfig, Shape, Waveform};

// =============================================================================
// Task Cadence
// =============================================================================

/// Sampler period. Must match the detector's tick so its clock stays in ms.
pub const SAMPLE_INTERVAL_MS: u64 = TICK_MS as u64;

/// Reporter poll period.
pub const REPORT_INTERVAL_MS: u64 = 20;

/// Interval between periodic status logs over defmt.
pub const STATUS_LOG_INTERVAL_MS: u64 = 10_000;

/// Log one ADC failure out of this many to keep RTT from flooding.
pub const ADC_ERROR_LOG_EVERY: u32 = 500;

const _: () = assert!(SAMPLE_INTERVAL_MS == TICK_MS as u64);
const _: () = assert!(REPORT_INTERVAL_MS > SAMPLE_INTERVAL_MS);
const _: () = assert!(STATUS_LOG_INTERVAL_MS >= REPORT_INTERVAL_MS);
const _: () = assert!(ADC_ERROR_LOG_EVERY > 0);

// =============================================================================
// Serial Output
// =============================================================================

/// UART0 baud rate (the pulse sensor visualizer default).
pub const UART_BAUD: u32 = 115_200;

/// Capacity of the per-poll output buffer.
///
/// Largest poll: a full visual bar line (40 bytes) plus the beat banner with
/// a 5-digit BPM (42 bytes).
pub const REPORT_LINE_CAPACITY: usize = 96;

/// Output format selected by cargo features.
pub const REPORTER_CONFIG: ReporterConfig = ReporterConfig {
    mode: if cfg!(feature = "visual-output") {
        OutputMode::Visual
    } else {
        OutputMode::Processing
    },
    stream_signal: cfg!(feature = "stream-signal"),
};

// =============================================================================
// Demo Signal
// =============================================================================

/// Synthetic 72 BPM pulse used by the `demo-signal` feature, scaled to the
/// 12-bit ADC range.
pub const DEMO_WAVEFORM: Waveform = Waveform::from_bpm(Shape::Ppg, 72, 1200, 1600);

const _: () = assert!(DEMO_WAVEFORM.baseline + DEMO_WAVEFORM.amplitude < 4096);

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reports_fit_line_buffer() {
        use core::fmt::Write;

        let mut line: heapless::String<REPORT_LINE_CAPACITY> = heapless::String::new();
        pulse_common::reporter::write_visual_bar(&mut line, 1024).unwrap();
        write!(line, "{}BPM: {}  ", pulse_common::reporter::BEAT_BANNER, 99_999).unwrap();
        assert!(line.len() <= REPORT_LINE_CAPACITY);
    }

    #[test]
    fn test_polls_per_tick() {
        // Ten samples between two reporter polls
        assert_eq!(REPORT_INTERVAL_MS / SAMPLE_INTERVAL_MS, 10);
    }

    #[test]
    fn test_demo_waveform_rate() {
        assert_eq!(DEMO_WAVEFORM.period_ms, 833);
        assert_eq!(DEMO_WAVEFORM.bpm(), 72);
    }

    #[test]
    fn test_default_reporter_config() {
        #[cfg(not(any(feature = "visual-output", feature = "stream-signal")))]
        assert_eq!(REPORTER_CONFIG, ReporterConfig::PROCESSING);
        #[cfg(feature = "visual-output")]
        assert_eq!(REPORTER_CONFIG.mode, OutputMode::Visual);
    }
}
