//! Pulse Sensor Heart Rate Monitor Firmware for Raspberry Pi Pico 2 (RP2350)
//!
//! Reads a PulseSensor-compatible PPG sensor on GP26, detects heart beats and
//! reports BPM/IBI over UART0.
//!
//! # Architecture
//!
//! Two tasks share one [`pulse_common::SharedDetector`]:
//! - Sampler task: reads the ADC every 2 ms and ticks the detector
//! - Reporter task: every 20 ms writes the serial report and drives the LEDs
//!
//! # Features
//!
//! - `visual-output`: ASCII bar graph instead of the Processing protocol
//! - `stream-signal`: also send every raw sample (`S` lines)
//! - `demo-signal`: synthetic 72 BPM pulse instead of the ADC
//!
//! On non-ARM targets this binary is an empty stub so the workspace still
//! builds and tests on the host.

#![cfg_attr(target_arch = "arm", no_std)]
#![cfg_attr(target_arch = "arm", no_main)]
// Crate-level lints (match lib.rs for consistency)
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]

// Modules only used in the binary (not testable on host)
#[cfg(target_arch = "arm")]
mod tasks;

// Re-export testable modules from library for local use
// (These are defined in lib.rs with host-testable code)
#[cfg(target_arch = "arm")]
mod config {
    pub use pulse_pico2::config::*;
}
#[cfg(target_arch = "arm")]
mod indicator {
    pub use pulse_pico2::indicator::*;
}

#[cfg(target_arch = "arm")]
mod firmware {
    use defmt::info;
    use embassy_executor::Spawner;
    use embassy_rp::adc::{self, Adc, Channel};
    use embassy_rp::gpio::{Level, Output, Pull};
    use embassy_rp::pwm::{self, Pwm};
    use embassy_rp::uart::{self, UartTx};
    use {defmt_rtt as _, panic_probe as _};

    use crate::config::{
        BLINK_LED_GPIO,
        DEMO_WAVEFORM,
        FADE_LED_GPIO,
        PULSE_ADC_CHANNEL,
        PULSE_ADC_GPIO,
        REPORTER_CONFIG,
        UART_BAUD,
        UART_TX_GPIO,
    };
    use crate::tasks::{ReporterOutputs, SampleSource, reporter_task, sampler_task};

    /// PWM counter wrap for the fade LED (~6 kHz at the stock 150 MHz clock).
    const FADE_PWM_TOP: u16 = 25_000;

    // Program metadata for `picotool info`
    #[unsafe(link_section = ".bi_entries")]
    #[used]
    pub static PICOTOOL_ENTRIES: [embassy_rp::binary_info::EntryAddr; 4] = [
        embassy_rp::binary_info::rp_program_name!(c"pico2-pulse"),
        embassy_rp::binary_info::rp_program_description!(c"Pulse sensor heart rate monitor"),
        embassy_rp::binary_info::rp_cargo_version!(),
        embassy_rp::binary_info::rp_program_build_attribute!(),
    ];

    #[embassy_executor::main]
    async fn main(spawner: Spawner) {
        info!("Pulse monitor starting...");

        let p = embassy_rp::init(Default::default());

        // Serial report on UART0 TX (GP0)
        let mut uart_config = uart::Config::default();
        uart_config.baudrate = UART_BAUD;
        let uart = UartTx::new_blocking(p.UART0, p.PIN_0, uart_config);
        info!("UART0 TX on GP{} at {} baud", UART_TX_GPIO, UART_BAUD);

        // Beat LEDs: on-board LED (GP25) blinks with the pulse, GP15 fades per beat
        let blink_led = Output::new(p.PIN_25, Level::Low);
        let mut fade_config = pwm::Config::default();
        fade_config.top = FADE_PWM_TOP;
        fade_config.compare_b = 0;
        let fade_led = Pwm::new_output_b(p.PWM_SLICE7, p.PIN_15, fade_config.clone());
        info!("Blink LED on GP{}, fade LED on GP{}", BLINK_LED_GPIO, FADE_LED_GPIO);

        // Pulse sensor on ADC0 (GP26)
        let source = if cfg!(feature = "demo-signal") {
            info!("Demo signal: {} BPM synthetic pulse", DEMO_WAVEFORM.bpm());
            SampleSource::Demo(DEMO_WAVEFORM)
        } else {
            let adc = Adc::new_blocking(p.ADC, adc::Config::default());
            let channel = Channel::new_pin(p.PIN_26, Pull::None);
            info!("ADC{} initialized on GP{}", PULSE_ADC_CHANNEL, PULSE_ADC_GPIO);
            SampleSource::Adc { adc, channel }
        };

        let outputs = ReporterOutputs {
            uart,
            blink_led,
            fade_led,
            fade_config,
        };

        spawner.spawn(sampler_task(source)).unwrap();
        info!("Sampler task spawned");

        spawner.spawn(reporter_task(outputs, REPORTER_CONFIG)).unwrap();
        info!("Reporter task spawned");
    }
}

/// Host stub: the firmware only runs on the RP2350.
#[cfg(not(target_arch = "arm"))]
fn main() {
    println!("pulse-pico2 is RP2350 firmware; build with --target thumbv8m.main-none-eabihf");
    println!("Run the desktop simulator with: cargo run -p pulse-simulator");
}
