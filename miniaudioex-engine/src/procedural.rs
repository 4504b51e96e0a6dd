//! A data source whose samples come from a caller-supplied callback.
//!
//! The source keeps no position of its own. Every read hands the whole block
//! to the callback, which decides what to write. It is an infinite stream:
//! seeking, cursor and length queries and looping are not supported.

use tracing::warn;

use crate::data_source::{required_samples, DataSource};
use crate::error::{Error, Result};
use crate::format::{DataFormat, SampleFormat};

/// Boxed form of the callback, for sources picked at runtime.
pub type WaveformCallback = Box<dyn FnMut(&mut [f32], u64, u32) + Send>;

/// Configuration for [`ProceduralWave`].
///
/// `callback(frames_out, frame_count, channels)` must write
/// `frame_count × channels` interleaved samples into `frames_out`. Any state
/// it needs (a frame counter, a user pointer) lives in the closure.
pub struct ProceduralWaveConfig<F> {
    pub format: SampleFormat,
    pub channels: u32,
    pub sample_rate: u32,
    pub callback: F,
}

impl<F> ProceduralWaveConfig<F>
where
    F: FnMut(&mut [f32], u64, u32),
{
    pub fn new(format: SampleFormat, channels: u32, sample_rate: u32, callback: F) -> Self {
        Self { format, channels, sample_rate, callback }
    }
}

pub struct ProceduralWave<F> {
    format: SampleFormat,
    channels: u32,
    sample_rate: u32,
    callback: F,
}

impl<F> ProceduralWave<F>
where
    F: FnMut(&mut [f32], u64, u32),
{
    pub fn new(config: ProceduralWaveConfig<F>) -> Result<Self> {
        if config.channels == 0 {
            warn!("procedural wave: channel count can not be 0");
            return Err(Error::InvalidArgument("channels must be > 0"));
        }
        if config.sample_rate == 0 {
            warn!("procedural wave: sample rate can not be 0");
            return Err(Error::InvalidArgument("sample rate must be > 0"));
        }
        Ok(Self {
            format: config.format,
            channels: config.channels,
            sample_rate: config.sample_rate,
            callback: config.callback,
        })
    }

    #[inline] pub fn channels(&self) -> u32 { self.channels }
    #[inline] pub fn sample_rate(&self) -> u32 { self.sample_rate }
    #[inline] pub fn format(&self) -> SampleFormat { self.format }
}

impl<F> DataSource for ProceduralWave<F>
where
    F: FnMut(&mut [f32], u64, u32),
{
    /// Invoke the callback exactly once for the whole block. Always reports
    /// `frame_count` frames read.
    fn read_pcm_frames(&mut self, frames_out: &mut [f32], frame_count: u64) -> Result<u64> {
        let n = required_samples(frames_out.len(), frame_count, self.channels)?;
        (self.callback)(&mut frames_out[..n], frame_count, self.channels);
        Ok(frame_count)
    }

    fn data_format(&self) -> DataFormat {
        DataFormat::standard(self.format, self.channels, self.sample_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::Channel;
    use miniaudioex_core::dsp::TAU;

    fn counter_wave(channels: u32) -> ProceduralWave<impl FnMut(&mut [f32], u64, u32)> {
        let mut frame = 0u64;
        ProceduralWave::new(ProceduralWaveConfig::new(SampleFormat::F32, channels, 48_000, move |out: &mut [f32], n, ch| {
            for f in 0..n as usize {
                for c in 0..ch as usize {
                    out[f * ch as usize + c] = (frame + f as u64) as f32;
                }
            }
            frame += n;
        }))
        .unwrap()
    }

    #[test]
    fn rejects_bad_config() {
        let cb = |_: &mut [f32], _: u64, _: u32| {};
        assert!(matches!(
            ProceduralWave::new(ProceduralWaveConfig::new(SampleFormat::F32, 0, 48_000, cb)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            ProceduralWave::new(ProceduralWaveConfig::new(SampleFormat::F32, 2, 0, cb)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn callback_runs_once_per_read() {
        let mut calls = 0u32;
        let mut last = (0u64, 0u32);
        {
            let mut src = ProceduralWave::new(ProceduralWaveConfig::new(
                SampleFormat::F32,
                2,
                44_100,
                |out: &mut [f32], n, ch| {
                    calls += 1;
                    last = (n, ch);
                    out.fill(0.25);
                },
            ))
            .unwrap();
            let mut buf = vec![0.0f32; 64];
            assert_eq!(src.read_pcm_frames(&mut buf, 32).unwrap(), 32);
            assert!(buf.iter().all(|&x| x == 0.25));
        }
        assert_eq!(calls, 1);
        assert_eq!(last, (32, 2));
    }

    #[test]
    fn callback_sees_exact_block() {
        let mut src = counter_wave(2);
        let mut buf = vec![-1.0f32; 20];
        assert_eq!(src.read_pcm_frames(&mut buf, 4).unwrap(), 4);
        assert_eq!(&buf[..8], &[0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
        // larger buffer: tail untouched
        assert!(buf[8..].iter().all(|&x| x == -1.0));
        // state in the closure persists across reads
        src.read_pcm_frames(&mut buf, 2).unwrap();
        assert_eq!(&buf[..4], &[4.0, 4.0, 5.0, 5.0]);
    }

    #[test]
    fn invalid_reads_do_not_call_back() {
        let mut called = false;
        let mut src = ProceduralWave::new(ProceduralWaveConfig::new(SampleFormat::F32, 2, 48_000, |_: &mut [f32], _, _| {
            called = true;
        }))
        .unwrap();
        let mut buf = [0.0f32; 8];
        assert!(matches!(src.read_pcm_frames(&mut buf, 0), Err(Error::InvalidArgument(_))));
        assert!(matches!(src.read_pcm_frames(&mut buf, 5), Err(Error::InvalidArgument(_))));
        drop(src);
        assert!(!called);
    }

    #[test]
    fn unsupported_capabilities() {
        let mut src = counter_wave(1);
        assert!(matches!(src.seek_to_pcm_frame(10), Err(Error::NotImplemented(_))));
        assert!(matches!(src.cursor(), Err(Error::NotImplemented(_))));
        assert!(matches!(src.length(), Err(Error::NotImplemented(_))));
        assert!(matches!(src.set_looping(true), Err(Error::NotImplemented(_))));
    }

    #[test]
    fn reports_format() {
        let src = counter_wave(6);
        let f = src.data_format();
        assert_eq!(f.format, SampleFormat::F32);
        assert_eq!(f.channels, 6);
        assert_eq!(f.sample_rate, 48_000);
        assert_eq!(f.channel_map[3], Channel::Lfe);
    }

    #[test]
    fn boxed_callback_sine() {
        let mut frame = 0u64;
        let cb: WaveformCallback = Box::new(move |out, n, ch| {
            for f in 0..n as usize {
                let s = (TAU * 440.0 * (frame + f as u64) as f32 / 48_000.0).sin();
                for c in 0..ch as usize {
                    out[f * ch as usize + c] = s;
                }
            }
            frame += n;
        });
        let mut src = ProceduralWave::new(ProceduralWaveConfig::new(SampleFormat::F32, 2, 48_000, cb)).unwrap();
        let mut buf = vec![0.0f32; 512];
        src.read_pcm_frames(&mut buf, 256).unwrap();
        assert_eq!(buf[0], 0.0);
        assert!(buf.iter().all(|x| x.abs() <= 1.0));
        assert!(buf.chunks(2).all(|fr| fr[0] == fr[1]));
    }
}
