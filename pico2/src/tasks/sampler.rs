//! Sensor sampling task.
//!
//! Runs on a 2 ms [`Ticker`] so the detector's millisecond clock stays in step
//! with wall time. A late tick is caught up on the next wakeup.

use defmt::{debug, info, warn};
use embassy_rp::adc::{self, Adc, Channel};
use embassy_time::{Duration, Ticker};
use pulse_common::Waveform;
use pulse_common::config::{SILENCE_TIMEOUT_MS, TICK_MS};

use super::DETECTOR;
use crate::config::{ADC_ERROR_LOG_EVERY, SAMPLE_INTERVAL_MS};

/// Where raw samples come from.
pub enum SampleSource {
    /// Pulse sensor on an ADC pin (12-bit, 0-4095).
    Adc {
        adc: Adc<'static, adc::Blocking>,
        channel: Channel<'static>,
    },
    /// Synthetic waveform, sampled at the detector's own clock.
    Demo(Waveform),
}

impl SampleSource {
    /// Read one raw sample. `t_ms` is only used by the demo source.
    fn read(
        &mut self,
        t_ms: u32,
    ) -> Result<i32, adc::Error> {
        match self {
            Self::Adc { adc, channel } => adc.blocking_read(channel).map(i32::from),
            Self::Demo(waveform) => Ok(waveform.sample_at(t_ms)),
        }
    }
}

/// Sampler task - ticks the shared detector every [`SAMPLE_INTERVAL_MS`].
#[embassy_executor::task]
pub async fn sampler_task(mut source: SampleSource) {
    info!("Sampler task started ({} ms tick)", SAMPLE_INTERVAL_MS);

    let mut ticker = Ticker::every(Duration::from_millis(SAMPLE_INTERVAL_MS));
    let mut elapsed_ms: u32 = 0;
    let mut adc_errors: u32 = 0;

    loop {
        ticker.next().await;
        elapsed_ms = elapsed_ms.wrapping_add(TICK_MS);

        let raw = match source.read(elapsed_ms) {
            Ok(raw) => raw,
            Err(e) => {
                // Skip the tick; the detector clock only counts real samples
                adc_errors = adc_errors.wrapping_add(1);
                if adc_errors % ADC_ERROR_LOG_EVERY == 1 {
                    warn!("ADC read failed ({} total): {}", adc_errors, e);
                }
                continue;
            }
        };

        let outcome = DETECTOR.tick(raw);

        if outcome.signal_lost {
            warn!("No beat for {} ms, detector reset", SILENCE_TIMEOUT_MS);
        }
        if outcome.bootstrap {
            debug!("First beat after reset, waiting for the next to seed the rate");
        }
        if let Some(beat) = outcome.beat {
            debug!("Beat: {} BPM, IBI {} ms", beat.bpm, beat.ibi);
        }
    }
}
