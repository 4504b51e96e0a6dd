//! The four built-in periodic wave shapes, evaluated at a phase in radians.
//!
//! Shared by [`Oscillator`](crate::oscillator::Oscillator) (direct evaluation)
//! and [`WaveTable`](crate::wave_table::WaveTable) (table synthesis), so both
//! generators agree on what "sine at phase φ" means.

use crate::dsp::{self, TAU};

/// Built-in wave shape.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Waveform {
    #[default]
    Sine,
    Square,
    Triangle,
    Saw,
}

impl Waveform {
    pub const ALL: [Waveform; 4] = [Waveform::Sine, Waveform::Square, Waveform::Triangle, Waveform::Saw];

    /// Evaluate one cycle-periodic sample. `phase` is wrapped into `[0, TAU)` first.
    ///
    /// - sine     : `sin(φ)`
    /// - square   : `sign(sin(φ))`, zero only at exact zero crossings
    /// - triangle : `2·|2·(φ/2π − 0.5)| − 1`, starts at +1
    /// - saw      : `2·(φ/2π) − 1`, ramps −1 → +1
    #[inline]
    pub fn sample(self, phase: f32) -> f32 {
        let phase = dsp::wrap_phase(phase);
        match self {
            Waveform::Sine => dsp::sin(phase),
            Waveform::Square => dsp::sign(dsp::sin(phase)),
            Waveform::Triangle => {
                let t = phase / TAU;
                2.0 * (2.0 * (t - 0.5)).abs() - 1.0
            }
            Waveform::Saw => {
                let t = phase / TAU;
                2.0 * t - 1.0
            }
        }
    }
}
