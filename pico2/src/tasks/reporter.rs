//! Serial report and LED task.
//!
//! Every [`REPORT_INTERVAL_MS`] the task formats one poll into a fixed-size
//! buffer, writes it to UART0 in a single blocking transfer, then updates the
//! beat LEDs. Beats are consumed here and nowhere else.

use defmt::{info, warn};
use embassy_rp::gpio::Output;
use embassy_rp::pwm::{self, Pwm};
use embassy_rp::uart::{self, UartTx};
use embassy_time::{Duration, Instant, Ticker};
use heapless::String;
use pulse_common::{Reporter, ReporterConfig};

use super::DETECTOR;
use crate::config::{REPORT_INTERVAL_MS, REPORT_LINE_CAPACITY, STATUS_LOG_INTERVAL_MS};
use crate::indicator::BeatIndicator;

/// Hardware driven by the reporter.
pub struct ReporterOutputs {
    pub uart: UartTx<'static, uart::Blocking>,
    pub blink_led: Output<'static>,
    pub fade_led: Pwm<'static>,
    /// PWM configuration of `fade_led`; only `compare_b` changes at runtime.
    pub fade_config: pwm::Config,
}

/// Reporter task - polls the shared detector every [`REPORT_INTERVAL_MS`].
#[embassy_executor::task]
pub async fn reporter_task(
    mut outputs: ReporterOutputs,
    config: ReporterConfig,
) {
    info!("Reporter task started ({})", config);

    let mut reporter = Reporter::new(config);
    let mut indicator = BeatIndicator::new();
    let mut ticker = Ticker::every(Duration::from_millis(REPORT_INTERVAL_MS));
    let mut last_status_log = Instant::now();
    let mut dropped_polls: u32 = 0;

    loop {
        let mut line: String<REPORT_LINE_CAPACITY> = String::new();
        let mut source = &DETECTOR;

        let beat = match reporter.poll(&mut source, &mut line) {
            Ok(beat) => beat,
            Err(_) => {
                dropped_polls = dropped_polls.wrapping_add(1);
                warn!("Report buffer overflow, poll dropped ({} total)", dropped_polls);
                line.clear();
                None
            }
        };

        if !line.is_empty()
            && let Err(e) = outputs.uart.blocking_write(line.as_bytes())
        {
            warn!("UART write failed: {}", e);
        }

        // LEDs
        let snapshot = DETECTOR.snapshot();
        indicator.update(snapshot.pulse_active, beat.is_some());
        if indicator.blink_on() {
            outputs.blink_led.set_high();
        } else {
            outputs.blink_led.set_low();
        }
        outputs.fade_config.compare_b = indicator.pwm_compare(outputs.fade_config.top);
        outputs.fade_led.set_config(&outputs.fade_config);

        if last_status_log.elapsed() >= Duration::from_millis(STATUS_LOG_INTERVAL_MS) {
            info!(
                "BPM: {} | IBI: {} ms | threshold: {} | amplitude: {} | beats: {}",
                snapshot.bpm,
                snapshot.ibi,
                snapshot.threshold,
                snapshot.amplitude,
                reporter.beats_reported()
            );
            last_status_log = Instant::now();
        }

        ticker.next().await;
    }
}
