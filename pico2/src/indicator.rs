//! LED beat indicator.
//!
//! Two LEDs follow the detector:
//! - the blink LED is on while the signal is inside a pulse
//! - the fade LED jumps to full brightness on every reported beat and then
//!   dims by [`FADE_STEP`] per reporter poll (255 to dark in ~340 ms at 20 ms)
//!
//! The logic is hardware-free; the reporter task maps [`BeatIndicator::fade_level`]
//! onto a PWM compare value with [`BeatIndicator::pwm_compare`].

/// Fade LED brightness right after a beat.
pub const FADE_MAX: u8 = 255;

/// Brightness lost per reporter poll.
pub const FADE_STEP: u8 = 15;

const _: () = assert!(FADE_STEP > 0);

/// State of the blink and fade LEDs.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct BeatIndicator {
    blink_on: bool,
    fade_level: u8,
}

impl BeatIndicator {
    /// Both LEDs off.
    pub const fn new() -> Self {
        Self {
            blink_on: false,
            fade_level: 0,
        }
    }

    /// Advance one reporter poll.
    ///
    /// `pulse_active` is the detector's current pulse flag, `beat` is true if
    /// a beat was consumed during this poll.
    pub fn update(
        &mut self,
        pulse_active: bool,
        beat: bool,
    ) {
        self.blink_on = pulse_active;
        self.fade_level = if beat {
            FADE_MAX
        } else {
            self.fade_level.saturating_sub(FADE_STEP)
        };
    }

    /// Whether the blink LED should be lit.
    #[inline]
    pub const fn blink_on(&self) -> bool { self.blink_on }

    /// Fade LED brightness (0-255).
    #[inline]
    pub const fn fade_level(&self) -> u8 { self.fade_level }

    /// Fade level scaled to a PWM compare value for a counter wrapping at `top`.
    pub const fn pwm_compare(
        &self,
        top: u16,
    ) -> u16 {
        // u32 so 65535 * 255 cannot overflow
        ((self.fade_level as u32 * top as u32) / FADE_MAX as u32) as u16
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
