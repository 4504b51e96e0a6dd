//! User-defined processing node: a callback that consumes input frames and
//! produces output frames.
//!
//! The node validates its configuration and the buffers of every call, then
//! hands both to the callback. The callback may consume fewer input frames or
//! produce fewer output frames than offered; it reports the actual numbers
//! back through the two count arguments.

use tracing::warn;

use crate::error::{Error, Result};

/// Read-only view of the node handed to the callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DspNodeInfo {
    pub channels: u32,
    pub sample_rate: u32,
}

pub struct DspNodeConfig<F> {
    pub channels: u32,
    pub sample_rate: u32,
    pub callback: F,
}

impl<F> DspNodeConfig<F>
where
    F: FnMut(&DspNodeInfo, &[f32], &mut u32, &mut [f32], &mut u32),
{
    pub fn new(channels: u32, sample_rate: u32, callback: F) -> Self {
        Self { channels, sample_rate, callback }
    }
}

pub struct DspNode<F> {
    info: DspNodeInfo,
    callback: F,
}

impl<F> DspNode<F>
where
    F: FnMut(&DspNodeInfo, &[f32], &mut u32, &mut [f32], &mut u32),
{
    /// Only mono and stereo nodes are supported.
    pub fn new(config: DspNodeConfig<F>) -> Result<Self> {
        if !matches!(config.channels, 1 | 2) {
            warn!(channels = config.channels, "dsp node: only 1 or 2 channels supported");
            return Err(Error::InvalidArgument("dsp node channels must be 1 or 2"));
        }
        if config.sample_rate == 0 {
            return Err(Error::InvalidArgument("sample rate must be > 0"));
        }
        Ok(Self {
            info: DspNodeInfo { channels: config.channels, sample_rate: config.sample_rate },
            callback: config.callback,
        })
    }

    /// Run the callback on one block.
    ///
    /// On entry the counts hold the frames available in each buffer; on return
    /// they hold what the callback consumed and produced.
    pub fn process_pcm_frames(
        &mut self,
        frames_in: &[f32],
        frame_count_in: &mut u32,
        frames_out: &mut [f32],
        frame_count_out: &mut u32,
    ) -> Result<()> {
        let ch = self.info.channels as usize;
        let n_in = (*frame_count_in as usize) * ch;
        let n_out = (*frame_count_out as usize) * ch;
        if frames_in.len() < n_in {
            return Err(Error::InvalidArgument("input buffer smaller than frame count × channels"));
        }
        if frames_out.len() < n_out {
            return Err(Error::InvalidArgument("output buffer smaller than frame count × channels"));
        }
        let (offered_in, offered_out) = (*frame_count_in, *frame_count_out);
        (self.callback)(&self.info, &frames_in[..n_in], frame_count_in, &mut frames_out[..n_out], frame_count_out);
        // a callback can not claim more than it was offered
        *frame_count_in = (*frame_count_in).min(offered_in);
        *frame_count_out = (*frame_count_out).min(offered_out);
        Ok(())
    }

    #[inline] pub fn info(&self) -> DspNodeInfo { self.info }
    #[inline] pub fn channels(&self) -> u32 { self.info.channels }
    #[inline] pub fn sample_rate(&self) -> u32 { self.info.sample_rate }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gain_node(g: f32, channels: u32) -> DspNode<impl FnMut(&DspNodeInfo, &[f32], &mut u32, &mut [f32], &mut u32)> {
        DspNode::new(DspNodeConfig::new(channels, 48_000, move |info: &DspNodeInfo, input: &[f32], n_in: &mut u32, output: &mut [f32], n_out: &mut u32| {
            let frames = (*n_in).min(*n_out);
            for i in 0..(frames * info.channels) as usize {
                output[i] = input[i] * g;
            }
            *n_in = frames;
            *n_out = frames;
        }))
        .unwrap()
    }

    #[test]
    fn channel_count_must_be_mono_or_stereo() {
        let cb = |_: &DspNodeInfo, _: &[f32], _: &mut u32, _: &mut [f32], _: &mut u32| {};
        assert!(matches!(DspNode::new(DspNodeConfig::new(0, 48_000, cb)), Err(Error::InvalidArgument(_))));
        assert!(matches!(DspNode::new(DspNodeConfig::new(3, 48_000, cb)), Err(Error::InvalidArgument(_))));
        assert!(matches!(DspNode::new(DspNodeConfig::new(2, 0, cb)), Err(Error::InvalidArgument(_))));
        assert!(DspNode::new(DspNodeConfig::new(1, 48_000, cb)).is_ok());
        assert!(DspNode::new(DspNodeConfig::new(2, 48_000, cb)).is_ok());
    }

    #[test]
    fn processes_and_reports_counts() {
        let mut node = gain_node(0.5, 2);
        let input = [1.0f32, -1.0, 0.5, -0.5, 0.25, -0.25];
        let mut output = [0.0f32; 4];
        let (mut n_in, mut n_out) = (3u32, 2u32);
        node.process_pcm_frames(&input, &mut n_in, &mut output, &mut n_out).unwrap();
        assert_eq!((n_in, n_out), (2, 2));
        assert_eq!(output, [0.5, -0.5, 0.25, -0.25]);
    }

    #[test]
    fn callback_sees_node_info() {
        let mut seen = None;
        let mut node = DspNode::new(DspNodeConfig::new(1, 22_050, |info: &DspNodeInfo, _: &[f32], _: &mut u32, _: &mut [f32], _: &mut u32| {
            seen = Some(*info);
        }))
        .unwrap();
        let (mut a, mut b) = (0u32, 0u32);
        node.process_pcm_frames(&[], &mut a, &mut [], &mut b).unwrap();
        drop(node);
        assert_eq!(seen, Some(DspNodeInfo { channels: 1, sample_rate: 22_050 }));
    }

    #[test]
    fn rejects_short_buffers() {
        let mut node = gain_node(1.0, 2);
        let (mut n_in, mut n_out) = (4u32, 4u32);
        let mut out = [0.0f32; 8];
        assert!(node.process_pcm_frames(&[0.0; 7], &mut n_in, &mut out, &mut n_out).is_err());
        let mut short = [0.0f32; 6];
        assert!(node.process_pcm_frames(&[0.0; 8], &mut n_in, &mut short, &mut n_out).is_err());
    }

    #[test]
    fn over_reported_counts_are_clamped() {
        let mut node = DspNode::new(DspNodeConfig::new(1, 48_000, |_: &DspNodeInfo, _: &[f32], n_in: &mut u32, _: &mut [f32], n_out: &mut u32| {
            *n_in = 100;
            *n_out = 100;
        }))
        .unwrap();
        let (mut n_in, mut n_out) = (4u32, 2u32);
        node.process_pcm_frames(&[0.0; 4], &mut n_in, &mut [0.0; 2], &mut n_out).unwrap();
        assert_eq!((n_in, n_out), (4, 2));
    }
}
