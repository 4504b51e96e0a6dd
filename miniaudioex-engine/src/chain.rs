//! Serial biquad chains and a data source that runs one chain per channel.

use miniaudioex_core::biquad::{BiquadFilter, FilterConfig};
use tracing::debug;

use crate::data_source::DataSource;
use crate::error::{Error, Result};
use crate::format::DataFormat;

/// Biquads applied in series. An empty chain passes audio through unchanged.
#[derive(Clone, Debug, Default)]
pub struct FilterChain {
    filters: Vec<BiquadFilter>,
}

impl FilterChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a chain from configs, in order. Fails on the first invalid one.
    pub fn from_configs<'c>(configs: impl IntoIterator<Item = &'c FilterConfig>) -> Result<Self> {
        let filters = configs.into_iter().map(BiquadFilter::new).collect::<core::result::Result<Vec<_>, _>>()?;
        Ok(Self { filters })
    }

    pub fn push(&mut self, filter: BiquadFilter) {
        self.filters.push(filter);
    }

    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        self.filters.iter_mut().fold(x, |acc, f| f.process_sample(acc))
    }

    pub fn process_in_place(&mut self, buf: &mut [f32]) {
        for f in &mut self.filters {
            f.process_in_place(buf);
        }
    }

    /// Clear every stage's delay line.
    pub fn reset(&mut self) {
        self.filters.iter_mut().for_each(BiquadFilter::reset);
    }

    #[inline] pub fn len(&self) -> usize { self.filters.len() }
    #[inline] pub fn is_empty(&self) -> bool { self.filters.is_empty() }
    #[inline] pub fn filters(&self) -> &[BiquadFilter] { &self.filters }
    #[inline] pub fn filters_mut(&mut self) -> &mut [BiquadFilter] { &mut self.filters }
}

/// Wraps a source and filters each interleaved channel with its own chain.
pub struct FilteredSource<S> {
    inner: S,
    chains: Vec<FilterChain>,
}

impl<S: DataSource> FilteredSource<S> {
    /// Clone `chain` once per channel of `inner`, so channel state never mixes.
    pub fn new(inner: S, chain: FilterChain) -> Result<Self> {
        let channels = inner.data_format().channels as usize;
        if channels == 0 {
            return Err(Error::InvalidArgument("source reports 0 channels"));
        }
        debug!(channels, stages = chain.len(), "filtered source: built");
        Ok(Self { inner, chains: vec![chain; channels] })
    }

    /// Chain applied to `channel`, for live parameter tweaks.
    pub fn chain_mut(&mut self, channel: usize) -> Option<&mut FilterChain> {
        self.chains.get_mut(channel)
    }

    pub fn inner(&self) -> &S { &self.inner }

    pub fn into_inner(self) -> S { self.inner }
}

impl<S: DataSource> DataSource for FilteredSource<S> {
    fn read_pcm_frames(&mut self, frames_out: &mut [f32], frame_count: u64) -> Result<u64> {
        let read = self.inner.read_pcm_frames(frames_out, frame_count)?;
        let channels = self.chains.len();
        let n = (read as usize).saturating_mul(channels).min(frames_out.len());
        for frame in frames_out[..n].chunks_exact_mut(channels) {
            for (x, chain) in frame.iter_mut().zip(self.chains.iter_mut()) {
                *x = chain.process_sample(*x);
            }
        }
        Ok(read)
    }

    fn data_format(&self) -> DataFormat { self.inner.data_format() }

    /// Seeking clears the filters so no history leaks across the jump.
    fn seek_to_pcm_frame(&mut self, frame_index: u64) -> Result<()> {
        self.inner.seek_to_pcm_frame(frame_index)?;
        self.chains.iter_mut().for_each(FilterChain::reset);
        Ok(())
    }

    fn cursor(&self) -> Result<u64> { self.inner.cursor() }
    fn length(&self) -> Result<u64> { self.inner.length() }
    fn set_looping(&mut self, looping: bool) -> Result<()> { self.inner.set_looping(looping) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::SampleFormat;
    use crate::procedural::{ProceduralWave, ProceduralWaveConfig};
    use miniaudioex_core::biquad::FilterKind;

    fn lp(freq: f32) -> FilterConfig {
        FilterConfig::new(FilterKind::Lowpass, 48_000, freq, 0.707)
    }

    #[test]
    fn empty_chain_is_identity() {
        let mut c = FilterChain::new();
        assert!(c.is_empty());
        assert_eq!(c.process_sample(0.3), 0.3);
        let mut buf = [0.1, -0.2, 0.3];
        c.process_in_place(&mut buf);
        assert_eq!(buf, [0.1, -0.2, 0.3]);
    }

    #[test]
    fn from_configs_rejects_invalid() {
        let bad = FilterConfig::new(FilterKind::Lowpass, 48_000, 30_000.0, 0.707);
        assert!(FilterChain::from_configs([&lp(1000.0), &bad]).is_err());
        assert_eq!(FilterChain::from_configs([&lp(1000.0), &lp(2000.0)]).unwrap().len(), 2);
    }

    #[test]
    fn serial_matches_manual_cascade() {
        let mut chain = FilterChain::from_configs([&lp(1000.0), &lp(3000.0)]).unwrap();
        let mut a = BiquadFilter::new(&lp(1000.0)).unwrap();
        let mut b = BiquadFilter::new(&lp(3000.0)).unwrap();
        let input: Vec<f32> = (0..64).map(|i| ((i * 7) % 11) as f32 / 11.0 - 0.5).collect();
        let mut block = input.clone();
        chain.reset();
        chain.process_in_place(&mut block);
        for (i, &x) in input.iter().enumerate() {
            let want = b.process_sample(a.process_sample(x));
            assert!((block[i] - want).abs() < 1e-6, "i={}", i);
        }
    }

    #[test]
    fn channels_filter_independently() {
        // left: constant 1, right: silence
        let src = ProceduralWave::new(ProceduralWaveConfig::new(SampleFormat::F32, 2, 48_000, |out: &mut [f32], _, _| {
            for fr in out.chunks_exact_mut(2) {
                fr[0] = 1.0;
                fr[1] = 0.0;
            }
        }))
        .unwrap();
        let mut f = FilteredSource::new(src, FilterChain::from_configs([&lp(500.0)]).unwrap()).unwrap();
        let mut buf = vec![0.0f32; 2 * 4096];
        assert_eq!(f.read_pcm_frames(&mut buf, 4096).unwrap(), 4096);
        assert!(buf.chunks(2).all(|fr| fr[1] == 0.0), "right channel picked up left state");
        let settled = buf[2 * 4095];
        assert!((settled - 1.0).abs() < 1e-3, "lowpass DC gain: {}", settled);
    }

    #[test]
    fn delegates_capabilities() {
        let src = ProceduralWave::new(ProceduralWaveConfig::new(SampleFormat::F32, 1, 48_000, |_: &mut [f32], _, _| {}))
            .unwrap();
        let mut f = FilteredSource::new(src, FilterChain::new()).unwrap();
        assert!(matches!(f.seek_to_pcm_frame(0), Err(Error::NotImplemented(_))));
        assert!(matches!(f.length(), Err(Error::NotImplemented(_))));
        assert_eq!(f.data_format().channels, 1);
        assert!(f.chain_mut(0).is_some());
        assert!(f.chain_mut(1).is_none());
    }
}
