//! Synthetic pulse waveforms for the simulator, demo mode and tests.
//!
//! Every shape is a pure function of `t mod period`, so a waveform sampled at
//! the detector's own clock repeats exactly from one period to the next.
//! Uses micromath for `sin`/`exp` so it also runs on the firmware.

use core::f32::consts::PI;

use micromath::F32;

/// Shape of one period of the synthetic signal.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shape {
    /// `baseline + amplitude` for the first `high_ms` of each period,
    /// `baseline - amplitude` for the rest.
    Square { high_ms: u32 },
    /// `baseline + amplitude * sin(2π t / period)`.
    Sine,
    /// Photoplethysmogram-like pulse: a sharp systolic peak of height
    /// `amplitude` followed by a smaller dicrotic wave, on top of `baseline`.
    Ppg,
}

/// Systolic peak position as a fraction of the period.
const SYSTOLIC_PHASE: f32 = 0.15;
const SYSTOLIC_WIDTH: f32 = 0.06;

/// Dicrotic wave position, width and relative height.
const DICROTIC_PHASE: f32 = 0.45;
const DICROTIC_WIDTH: f32 = 0.08;
const DICROTIC_GAIN: f32 = 0.4;

/// Periodic synthetic sensor signal in ADC counts.
#[derive(Clone, Copy, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Waveform {
    pub shape: Shape,
    /// Period in milliseconds (60000 / BPM).
    pub period_ms: u32,
    pub baseline: i32,
    pub amplitude: i32,
}

impl Waveform {
    /// Create a waveform. A zero period is treated as 1 ms.
    pub const fn new(
        shape: Shape,
        period_ms: u32,
        baseline: i32,
        amplitude: i32,
    ) -> Self {
        Self {
            shape,
            period_ms: if period_ms == 0 { 1 } else { period_ms },
            baseline,
            amplitude,
        }
    }

    /// Waveform whose period matches `bpm` beats per minute.
    pub const fn from_bpm(
        shape: Shape,
        bpm: u32,
        baseline: i32,
        amplitude: i32,
    ) -> Self {
        let bpm = if bpm == 0 { 1 } else { bpm };
        Self::new(shape, 60_000 / bpm, baseline, amplitude)
    }

    /// Signal value at time `t_ms`.
    pub fn sample_at(
        &self,
        t_ms: u32,
    ) -> i32 {
        let t = t_ms % self.period_ms;
        match self.shape {
            Shape::Square { high_ms } => {
                if t < high_ms {
                    self.baseline + self.amplitude
                } else {
                    self.baseline - self.amplitude
                }
            }
            Shape::Sine => {
                let phase = t as f32 / self.period_ms as f32;
                let s = F32(2.0 * PI * phase).sin().0;
                self.baseline + (self.amplitude as f32 * s) as i32
            }
            Shape::Ppg => {
                let phase = t as f32 / self.period_ms as f32;
                let pulse = gaussian(phase, SYSTOLIC_PHASE, SYSTOLIC_WIDTH)
                    + DICROTIC_GAIN * gaussian(phase, DICROTIC_PHASE, DICROTIC_WIDTH);
                self.baseline + (self.amplitude as f32 * pulse) as i32
            }
        }
    }

    /// Heart rate this waveform represents.
    #[inline]
    pub const fn bpm(&self) -> u32 { 60_000 / self.period_ms }
}

/// Unnormalized gaussian bump `exp(-((x - center) / width)²)`.
fn gaussian(
    x: f32,
    center: f32,
    width: f32,
) -> f32 {
    let z = (x - center) / width;
    F32(-(z * z)).exp().0
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_levels() {
        let wave = Waveform::new(Shape::Square { high_ms: 100 }, 600, 2048, 952);
        assert_eq!(wave.sample_at(0), 3000);
        assert_eq!(wave.sample_at(98), 3000);
        assert_eq!(wave.sample_at(100), 1096);
        assert_eq!(wave.sample_at(599), 1096);
        assert_eq!(wave.sample_at(600), 3000);
    }

    #[test]
    fn test_periodic() {
        for shape in [Shape::Square { high_ms: 50 }, Shape::Sine, Shape::Ppg] {
            let wave = Waveform::new(shape, 800, 2048, 800);
            for t in (0..800).step_by(2) {
                assert_eq!(wave.sample_at(t), wave.sample_at(t + 800 * 7));
            }
        }
    }

    #[test]
    fn test_sine_bounds() {
        let wave = Waveform::new(Shape::Sine, 1000, 2048, 800);
        for t in 0..1000 {
            let v = wave.sample_at(t);
            assert!((1240..=2856).contains(&v), "t={t}: {v}");
        }
        // Quarter period is the crest
        assert!((wave.sample_at(250) - 2848).abs() <= 4);
        assert!((wave.sample_at(750) - 1248).abs() <= 4);
    }

    #[test]
    fn test_ppg_systolic_peak_dominates() {
        let wave = Waveform::new(Shape::Ppg, 1000, 1200, 1600);
        let systolic = wave.sample_at(150);
        let dicrotic = wave.sample_at(450);
        let diastole = wave.sample_at(900);

        assert!((systolic - 2800).abs() <= 20, "systolic {systolic}");
        assert!(dicrotic > diastole);
        assert!(dicrotic < systolic);
        assert!((diastole - 1200).abs() <= 5, "diastole {diastole}");
    }

    #[test]
    fn test_from_bpm() {
        let wave = Waveform::from_bpm(Shape::Sine, 75, 2048, 800);
        assert_eq!(wave.period_ms, 800);
        assert_eq!(wave.bpm(), 75);
    }

    #[test]
    fn test_zero_period_is_clamped() {
        let wave = Waveform::new(Shape::Sine, 0, 0, 100);
        assert_eq!(wave.period_ms, 1);
        let _ = wave.sample_at(12345);
        let wave = Waveform::from_bpm(Shape::Sine, 0, 0, 100);
        assert_eq!(wave.period_ms, 60_000);
    }
}
