//! Per-sample generators and the adapter that turns one into a data source.
//!
//! `Generator` is the minimal mono voice contract. `GeneratorSource<G>` owns a
//! generator, communicates the sample rate to it, and fans its mono output out
//! to every interleaved channel with zero heap work per read.

use tracing::warn;

use crate::data_source::{required_samples, DataSource};
use crate::error::{Error, Result};
use crate::format::{DataFormat, SampleFormat};

/// A mono voice pulled one sample per output frame by [`GeneratorSource`].
pub trait Generator {
    /// Adopt `sample_rate`. [`GeneratorSource`] calls this on construction and
    /// again whenever its output rate changes; state other than the rate
    /// (phase, table position) should survive.
    fn reset(&mut self, sample_rate: f32);

    /// Mono sample for the next frame, at the rate last passed to `reset`.
    fn next(&mut self) -> f32;
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    #[inline] fn reset(&mut self, sample_rate: f32) { (**self).reset(sample_rate) }
    #[inline] fn next(&mut self) -> f32 { (**self).next() }
}

/// Data source that owns a generator and duplicates its output across channels.
pub struct GeneratorSource<G: Generator> {
    gen: G,
    channels: u32,
    sample_rate: u32,
    gain: f32,
    frames_read: u64,
}

impl<G: Generator> GeneratorSource<G> {
    /// Wrap `gen` and immediately `reset` it to communicate the sample rate.
    pub fn new(mut gen: G, channels: u32, sample_rate: u32) -> Result<Self> {
        if channels == 0 {
            warn!("generator source: channel count can not be 0");
            return Err(Error::InvalidArgument("channels must be > 0"));
        }
        if sample_rate == 0 {
            warn!("generator source: sample rate can not be 0");
            return Err(Error::InvalidArgument("sample rate must be > 0"));
        }
        gen.reset(sample_rate as f32);
        Ok(Self { gen, channels, sample_rate, gain: 1.0, frames_read: 0 })
    }

    /// Builder-style output gain (linear).
    pub fn with_gain(mut self, gain: f32) -> Self {
        self.set_gain(gain);
        self
    }

    #[inline] pub fn set_gain(&mut self, gain: f32) { self.gain = gain.max(0.0); }
    #[inline] pub fn gain(&self) -> f32 { self.gain }

    /// Change the sample rate; the generator is `reset` once with the new rate.
    pub fn set_sample_rate(&mut self, sample_rate: u32) -> Result<()> {
        if sample_rate == 0 {
            return Err(Error::InvalidArgument("sample rate must be > 0"));
        }
        if sample_rate != self.sample_rate {
            self.sample_rate = sample_rate;
            self.gen.reset(sample_rate as f32);
        }
        Ok(())
    }

    /// Replace the inner generator without reallocating. The new one is `reset`.
    #[inline]
    pub fn swap_generator(&mut self, mut gen: G) {
        gen.reset(self.sample_rate as f32);
        self.gen = gen;
    }

    /// Mutable access to the inner generator for live parameter tweaks.
    #[inline] pub fn generator_mut(&mut self) -> &mut G { &mut self.gen }

    /// Elapsed time (seconds) since this source was created.
    #[inline]
    pub fn time(&self) -> f64 {
        self.frames_read as f64 / f64::from(self.sample_rate)
    }
}

impl<G: Generator> DataSource for GeneratorSource<G> {
    fn read_pcm_frames(&mut self, frames_out: &mut [f32], frame_count: u64) -> Result<u64> {
        let n = required_samples(frames_out.len(), frame_count, self.channels)?;
        for frame in frames_out[..n].chunks_exact_mut(self.channels as usize) {
            let s = self.gen.next() * self.gain;
            frame.fill(s);
        }
        self.frames_read += frame_count;
        Ok(frame_count)
    }

    fn data_format(&self) -> DataFormat {
        DataFormat::standard(SampleFormat::F32, self.channels, self.sample_rate)
    }

    fn cursor(&self) -> Result<u64> {
        Ok(self.frames_read)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counts up from 0; remembers the last sample rate it saw.
    #[derive(Default)]
    struct Ramp {
        n: f32,
        sr: f32,
        resets: u32,
    }

    impl Generator for Ramp {
        fn reset(&mut self, sr: f32) {
            self.sr = sr;
            self.resets += 1;
        }
        fn next(&mut self) -> f32 {
            let v = self.n;
            self.n += 1.0;
            v
        }
    }

    #[test]
    fn rejects_bad_config() {
        assert!(matches!(GeneratorSource::new(Ramp::default(), 0, 48_000), Err(Error::InvalidArgument(_))));
        assert!(matches!(GeneratorSource::new(Ramp::default(), 2, 0), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn new_resets_with_sample_rate() {
        let mut src = GeneratorSource::new(Ramp::default(), 1, 44_100).unwrap();
        assert_eq!(src.generator_mut().sr, 44_100.0);
        assert_eq!(src.generator_mut().resets, 1);
        src.set_sample_rate(44_100).unwrap();
        assert_eq!(src.generator_mut().resets, 1, "same rate must not reset");
        src.set_sample_rate(48_000).unwrap();
        assert_eq!(src.generator_mut().resets, 2);
        assert!(src.set_sample_rate(0).is_err());
    }

    #[test]
    fn duplicates_mono_across_channels() {
        let mut src = GeneratorSource::new(Ramp::default(), 3, 48_000).unwrap().with_gain(0.5);
        let mut buf = [0.0f32; 9];
        assert_eq!(src.read_pcm_frames(&mut buf, 3).unwrap(), 3);
        assert_eq!(buf, [0.0, 0.0, 0.0, 0.5, 0.5, 0.5, 1.0, 1.0, 1.0]);
        assert_eq!(src.cursor().unwrap(), 3);
        assert!((src.time() - 3.0 / 48_000.0).abs() < 1e-12);
    }

    #[test]
    fn rejects_short_buffer() {
        let mut src = GeneratorSource::new(Ramp::default(), 2, 48_000).unwrap();
        let mut buf = [0.0f32; 3];
        assert!(matches!(src.read_pcm_frames(&mut buf, 2), Err(Error::InvalidArgument(_))));
        assert_eq!(src.cursor().unwrap(), 0);
    }

    #[test]
    fn swap_generator_resets_new_one() {
        let mut src = GeneratorSource::new(Ramp::default(), 1, 32_000).unwrap();
        let mut buf = [0.0f32; 4];
        src.read_pcm_frames(&mut buf, 4).unwrap();
        src.swap_generator(Ramp::default());
        assert_eq!(src.generator_mut().sr, 32_000.0);
        src.read_pcm_frames(&mut buf, 1).unwrap();
        assert_eq!(buf[0], 0.0);
    }

    #[test]
    fn boxed_generators_work() {
        let gen: Box<dyn Generator + Send> = Box::new(Ramp::default());
        let mut src = GeneratorSource::new(gen, 1, 48_000).unwrap();
        let mut buf = [0.0f32; 2];
        src.read_pcm_frames(&mut buf, 2).unwrap();
        assert_eq!(buf, [0.0, 1.0]);
    }
}
