//! Firmware configuration.
//!
//! - `pins`: GPIO assignments for the sensor, LEDs and serial port
//! - `timing`: Sampler/reporter cadence, serial settings and output format

pub mod pins;
pub mod timing;

// Re-export at config level for convenience
pub use pins::{BLINK_LED_GPIO, FADE_LED_GPIO, PULSE_ADC_CHANNEL, PULSE_ADC_GPIO, UART_TX_GPIO};
pub use timing::{
    ADC_ERROR_LOG_EVERY,
    DEMO_WAVEFORM,
    REPORT_INTERVAL_MS,
    REPORT_LINE_CAPACITY,
    REPORTER_CONFIG,
    SAMPLE_INTERVAL_MS,
    STATUS_LOG_INTERVAL_MS,
    UART_BAUD,
};
