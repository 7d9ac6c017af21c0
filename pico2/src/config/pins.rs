//! GPIO assignments (Raspberry Pi Pico 2).
//!
//! These numbers document the wiring; `main.rs` takes the matching
//! `embassy_rp` peripherals (`PIN_26`, `PIN_25`, ...).
//!
//! ```text
//! Pulse sensor  S -> GP26 (ADC0)   + -> 3V3   - -> GND
//! Blink LED        -> GP25 (on-board LED)
//! Fade LED         -> GP15 (PWM slice 7, channel B) via 220R
//! Serial TX        -> GP0  (UART0)
//! ```

/// Analog input for the pulse sensor signal wire.
pub const PULSE_ADC_GPIO: u8 = 26;

/// ADC channel of [`PULSE_ADC_GPIO`].
pub const PULSE_ADC_CHANNEL: u8 = PULSE_ADC_GPIO - 26;

/// LED that is lit while the detector is inside a pulse.
pub const BLINK_LED_GPIO: u8 = 25;

/// PWM LED that flashes on every beat and fades out.
pub const FADE_LED_GPIO: u8 = 15;

/// UART0 transmit pin for the serial report.
pub const UART_TX_GPIO: u8 = 0;

// Only GP26..=GP29 are wired to the ADC on the RP2350A
const _: () = assert!(PULSE_ADC_GPIO >= 26 && PULSE_ADC_GPIO <= 29);
const _: () = assert!(BLINK_LED_GPIO != FADE_LED_GPIO);

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pins_are_distinct() {
        let pins = [PULSE_ADC_GPIO, BLINK_LED_GPIO, FADE_LED_GPIO, UART_TX_GPIO];
        for (i, a) in pins.iter().enumerate() {
            assert!(pins[i + 1..].iter().all(|b| b != a));
        }
    }

    #[test]
    fn test_adc_channel() {
        assert_eq!(PULSE_ADC_CHANNEL, 0);
    }

    #[test]
    fn test_fade_led_is_pwm_slice7_channel_b() {
        // GPIO n maps to slice (n / 2) % 8, channel B on odd pins
        assert_eq!((FADE_LED_GPIO / 2) % 8, 7);
        assert_eq!(FADE_LED_GPIO % 2, 1);
    }
}
