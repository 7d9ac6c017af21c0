//! Pulse Sensor Simulator for Desktop.
//!
//! Runs the same detector and reporter as the firmware against a scripted
//! synthetic PPG signal. A sampler thread ticks a shared detector every 2 ms
//! while the main thread polls it every 20 ms and prints the serial report to
//! stdout. Log lines go to stderr so stdout stays a clean serial stream.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p pulse-simulator                # Processing protocol, real time
//! cargo run -p pulse-simulator -- --visual    # ASCII bar graph
//! cargo run -p pulse-simulator -- --signal    # also stream S{signal} lines
//! cargo run -p pulse-simulator -- --fast      # no sleeping, lockstep ticks
//! ```

// Crate-level lints
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

mod script;
mod stats;
mod timing;

use std::io::{self, Write as _};
use std::thread;
use std::time::Instant;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use pulse_common::config::{SILENCE_TIMEOUT_MS, TICK_MS};
use pulse_common::{OutputMode, Reporter, ReporterConfig, SharedDetector, TickOutcome};

use crate::script::Script;
use crate::stats::SessionStats;
use crate::timing::{REPORT_PERIOD, SAMPLE_PERIOD, TICKS_PER_REPORT};

/// Detector shared between the sampler thread and the reporter loop.
static DETECTOR: SharedDetector<CriticalSectionRawMutex> = SharedDetector::new();

/// Capacity of the per-poll output buffer (same as the firmware).
const REPORT_LINE_CAPACITY: usize = 96;

// =============================================================================
// Command Line
// =============================================================================

/// Simulator options.
#[derive(Clone, Copy, Debug, Default)]
struct Options {
    reporter: ReporterConfig,
    /// Run as fast as possible instead of in real time.
    fast: bool,
}

impl Options {
    /// Parse command line flags. Unknown flags are an error.
    fn from_args(args: impl IntoIterator<Item = String>) -> Result<Self, String> {
        let mut options = Self::default();
        for arg in args {
            match arg.as_str() {
                "--visual" => options.reporter.mode = OutputMode::Visual,
                "--signal" => options.reporter.stream_signal = true,
                "--fast" => options.fast = true,
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(options)
    }
}

const USAGE: &str = "usage: simulator [--visual] [--signal] [--fast]";

// =============================================================================
// Sampler / Reporter
// =============================================================================

/// Feed one scripted sample to the shared detector. Returns `None` once the
/// script has ended.
fn sample_tick(
    script: &Script,
    tick: u32,
) -> Option<TickOutcome> {
    let t_ms = tick * TICK_MS;
    let raw = script.sample_at(t_ms)?;
    let outcome = DETECTOR.tick(raw);

    if outcome.signal_lost {
        eprintln!("[sampler] {t_ms:>6} ms: no beat for {SILENCE_TIMEOUT_MS} ms, detector reset");
    }
    if outcome.bootstrap {
        eprintln!("[sampler] {t_ms:>6} ms: first beat, waiting for the next to seed the rate");
    }
    if let Some((start, segment)) = script.segment_at(t_ms)
        && start == t_ms
    {
        eprintln!("[sampler] {t_ms:>6} ms: {}", segment.describe());
    }
    Some(outcome)
}

/// One reporter poll written to stdout.
fn report(
    reporter: &mut Reporter,
    stats: &mut SessionStats,
) -> io::Result<()> {
    let mut line: heapless::String<REPORT_LINE_CAPACITY> = heapless::String::new();
    let mut source = &DETECTOR;
    let beat = match reporter.poll(&mut source, &mut line) {
        Ok(beat) => beat,
        Err(_) => {
            eprintln!("[reporter] report buffer overflow, poll dropped");
            return Ok(());
        }
    };
    if let Some(beat) = beat {
        stats.record_beat(&beat);
    }

    let mut stdout = io::stdout().lock();
    stdout.write_all(line.as_bytes())?;
    stdout.flush()
}

/// Real time: sampler thread on a 2 ms schedule, reporter on this thread.
fn run_realtime(
    script: Script,
    reporter: &mut Reporter,
    stats: &mut SessionStats,
) -> io::Result<()> {
    let sampler = thread::spawn(move || {
        let mut sampler_stats = SessionStats::new();
        let start = Instant::now();
        for tick in 1.. {
            // Sleep to an absolute deadline so late wakeups do not accumulate
            let deadline = start + SAMPLE_PERIOD * tick;
            if let Some(remaining) = deadline.checked_duration_since(Instant::now()) {
                thread::sleep(remaining);
            }
            match sample_tick(&script, tick) {
                Some(outcome) => sampler_stats.record_tick(&outcome),
                None => break,
            }
        }
        sampler_stats
    });

    while !sampler.is_finished() {
        let poll_start = Instant::now();
        report(reporter, stats)?;
        if let Some(remaining) = REPORT_PERIOD.checked_sub(poll_start.elapsed()) {
            thread::sleep(remaining);
        }
    }
    // Last beat of the script
    report(reporter, stats)?;

    match sampler.join() {
        Ok(sampler_stats) => stats.merge_sampler(&sampler_stats),
        Err(_) => eprintln!("[sampler] thread panicked"),
    }
    Ok(())
}

/// Fast: ten ticks, one poll, repeated on this thread without sleeping.
fn run_fast(
    script: Script,
    reporter: &mut Reporter,
    stats: &mut SessionStats,
) -> io::Result<()> {
    let mut sampler_stats = SessionStats::new();
    let mut tick = 1u32;
    'session: loop {
        for _ in 0..TICKS_PER_REPORT {
            match sample_tick(&script, tick) {
                Some(outcome) => sampler_stats.record_tick(&outcome),
                None => break 'session,
            }
            tick += 1;
        }
        report(reporter, stats)?;
    }
    report(reporter, stats)?;
    stats.merge_sampler(&sampler_stats);
    Ok(())
}

fn main() {
    let options = match Options::from_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{e}\n{USAGE}");
            std::process::exit(2);
        }
    };

    let script = Script::default_session();
    eprintln!(
        "[simulator] {:?} output, {} s session{}",
        options.reporter.mode,
        script.duration_ms() / 1000,
        if options.fast { " (fast)" } else { "" }
    );
    if let Some(first) = script.segments().first() {
        eprintln!("[sampler]      0 ms: {}", first.describe());
    }

    let mut reporter = Reporter::new(options.reporter);
    let mut stats = SessionStats::new();

    let result = if options.fast {
        run_fast(script, &mut reporter, &mut stats)
    } else {
        run_realtime(script, &mut reporter, &mut stats)
    };

    // Broken pipe (e.g. `| head`) ends the session quietly
    if let Err(e) = result
        && e.kind() != io::ErrorKind::BrokenPipe
    {
        eprintln!("[simulator] stdout error: {e}");
        std::process::exit(1);
    }

    eprintln!("[simulator] {stats}");
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> { list.iter().map(|s| (*s).to_owned()).collect() }

    #[test]
    fn test_default_options() {
        let options = Options::from_args(args(&[])).unwrap();
        assert_eq!(options.reporter, ReporterConfig::PROCESSING);
        assert!(!options.fast);
    }

    #[test]
    fn test_flags() {
        let options = Options::from_args(args(&["--visual", "--fast", "--signal"])).unwrap();
        assert_eq!(options.reporter.mode, OutputMode::Visual);
        assert!(options.reporter.stream_signal);
        assert!(options.fast);
    }

    #[test]
    fn test_unknown_flag() {
        assert!(Options::from_args(args(&["--loud"])).is_err());
    }
}
