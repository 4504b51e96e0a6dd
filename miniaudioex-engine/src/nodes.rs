//! Generator nodes built on the core primitives.
//!
//! - [`Oscillator`]        : analytic waveform voice (impl lives here)
//! - [`TableOscillator`]   : wave table played at a fixed frequency
//! - [`CallbackGenerator`] : one sample per call from a closure
//!
//! Everything here is per-sample and allocation-free once built.

use miniaudioex_core::oscillator::Oscillator;
use miniaudioex_core::wave_table::WaveTable;
use tracing::warn;

use crate::error::{Error, Result};
use crate::graph::Generator;

impl Generator for Oscillator {
    /// Adopt the new sample rate, keeping the phase. A non-positive rate is
    /// rejected by the oscillator and the previous one stays in effect.
    #[inline]
    fn reset(&mut self, sample_rate: f32) {
        if let Err(e) = self.set_sample_rate(sample_rate) {
            warn!(sample_rate, kept = self.sample_rate(), "oscillator node: reset ignored: {e}");
        }
    }

    #[inline]
    fn next(&mut self) -> f32 {
        self.value()
    }
}

/// A wave table read at a steady frequency.
#[derive(Clone, Debug)]
pub struct TableOscillator<'a> {
    table: WaveTable<'a>,
    frequency: f32,
    sample_rate: f32,
}

impl<'a> TableOscillator<'a> {
    pub fn new(table: WaveTable<'a>, frequency: f32) -> Result<Self> {
        if !(frequency > 0.0) {
            warn!(frequency, "table oscillator: frequency must be positive");
            return Err(Error::InvalidArgument("frequency must be > 0"));
        }
        Ok(Self { table, frequency, sample_rate: 48_000.0 })
    }

    #[inline] pub fn set_frequency(&mut self, hz: f32) { self.frequency = hz.max(0.0); }
    #[inline] pub fn frequency(&self) -> f32 { self.frequency }
    #[inline] pub fn table(&self) -> &WaveTable<'a> { &self.table }
}

impl Generator for TableOscillator<'_> {
    #[inline]
    fn reset(&mut self, sample_rate: f32) {
        if sample_rate > 0.0 {
            self.sample_rate = sample_rate;
        } else {
            warn!(sample_rate, kept = self.sample_rate, "table oscillator: reset ignored: sample rate must be > 0");
        }
    }

    #[inline]
    fn next(&mut self) -> f32 {
        self.table.sample(self.frequency, self.sample_rate)
    }
}

/// Generator driven by a closure, for one-off sources (noise, test signals).
pub struct CallbackGenerator<F> {
    f: F,
}

impl<F: FnMut() -> f32> CallbackGenerator<F> {
    #[inline] pub fn new(f: F) -> Self { Self { f } }
}

impl<F: FnMut() -> f32> Generator for CallbackGenerator<F> {
    #[inline] fn reset(&mut self, _sample_rate: f32) {}
    #[inline] fn next(&mut self) -> f32 { (self.f)() }
}
