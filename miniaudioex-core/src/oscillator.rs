//! Phase-accumulator tone generator.
//!
//! The phase runs in radians and is wrapped into `[0, TAU)` after every
//! sample-producing call. Changing the frequency only changes the increment,
//! so sweeps stay phase-continuous.
//!
//! `amplitude` is carried for callers but never applied here: `value()` and
//! friends return the raw wave in [-1, 1]. Multiply externally if needed.

use tracing::warn;

use crate::dsp::{self, phase_increment};
use crate::error::{Error, Result};
use crate::waveform::Waveform;

#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OscillatorConfig {
    pub waveform: Waveform,
    /// Hz, must be > 0.
    pub frequency: f32,
    /// Stored only; see the module docs.
    pub amplitude: f32,
    /// Hz, must be > 0.
    pub sample_rate: f32,
}

impl OscillatorConfig {
    pub fn new(waveform: Waveform, frequency: f32, amplitude: f32, sample_rate: f32) -> Self {
        Self { waveform, frequency, amplitude, sample_rate }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Oscillator {
    waveform: Waveform,
    frequency: f32,
    amplitude: f32,
    sample_rate: f32,
    phase: f32,
    phase_inc: f32,
}

impl Oscillator {
    pub fn new(config: &OscillatorConfig) -> Result<Self> {
        if !(config.frequency > 0.0) {
            warn!(frequency = config.frequency, "oscillator: frequency must be > 0");
            return Err(Error::InvalidArgument("frequency must be > 0"));
        }
        if !(config.sample_rate > 0.0) {
            warn!(sample_rate = config.sample_rate, "oscillator: sample rate must be > 0");
            return Err(Error::InvalidArgument("sample rate must be > 0"));
        }
        Ok(Self {
            waveform: config.waveform,
            frequency: config.frequency,
            amplitude: config.amplitude,
            sample_rate: config.sample_rate,
            phase: 0.0,
            phase_inc: phase_increment(config.frequency, config.sample_rate),
        })
    }

    /// Sample at the current phase, then advance and wrap.
    #[inline]
    pub fn value(&mut self) -> f32 {
        let y = self.waveform.sample(self.phase);
        self.advance();
        y
    }

    /// Evaluate the wave at an arbitrary phase. Does not touch the oscillator state.
    #[inline]
    pub fn value_at_phase(&self, phase: f32) -> f32 {
        self.waveform.sample(phase)
    }

    /// Sample at `current phase + phase_offset` (phase modulation), then advance
    /// the unmodulated phase exactly like [`value`](Self::value).
    #[inline]
    pub fn modulated_value(&mut self, phase_offset: f32) -> f32 {
        let y = self.waveform.sample(self.phase + phase_offset);
        self.advance();
        y
    }

    /// Fill `out` with consecutive [`value`](Self::value) samples.
    pub fn fill(&mut self, out: &mut [f32]) {
        for s in out.iter_mut() {
            *s = self.value();
        }
    }

    #[inline]
    fn advance(&mut self) {
        self.phase = dsp::wrap_phase(self.phase + self.phase_inc);
    }

    /// Change frequency without resetting the phase.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.phase_inc = phase_increment(frequency, self.sample_rate);
    }

    /// Change the sample rate; the increment is recomputed, phase is kept.
    pub fn set_sample_rate(&mut self, sample_rate: f32) -> Result<()> {
        if !(sample_rate > 0.0) {
            warn!(sample_rate, "oscillator: sample rate must be > 0");
            return Err(Error::InvalidArgument("sample rate must be > 0"));
        }
        self.sample_rate = sample_rate;
        self.phase_inc = phase_increment(self.frequency, sample_rate);
        Ok(())
    }

    #[inline] pub fn set_waveform(&mut self, waveform: Waveform) { self.waveform = waveform; }
    #[inline] pub fn set_amplitude(&mut self, amplitude: f32) { self.amplitude = amplitude; }

    /// Hard-set the phase (sync/reset). Wrapped into `[0, TAU)`.
    #[inline] pub fn set_phase(&mut self, phase: f32) { self.phase = dsp::wrap_phase(phase); }

    #[inline] pub fn waveform(&self) -> Waveform { self.waveform }
    #[inline] pub fn frequency(&self) -> f32 { self.frequency }
    #[inline] pub fn amplitude(&self) -> f32 { self.amplitude }
    #[inline] pub fn sample_rate(&self) -> f32 { self.sample_rate }
    #[inline] pub fn phase(&self) -> f32 { self.phase }
    #[inline] pub fn phase_increment(&self) -> f32 { self.phase_inc }
}
