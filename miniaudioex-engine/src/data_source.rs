//! Pull-based data source protocol.
//!
//! A consumer (the device callback, a filter stage, a test) asks a source for
//! `frame_count` interleaved `f32` frames at a time. Only reading and format
//! reporting are mandatory. Seeking, cursor/length queries and looping are
//! optional and report [`Error::NotImplemented`] unless a source overrides them.

use crate::error::{Error, Result};
use crate::format::DataFormat;

pub trait DataSource {
    /// Fill `frames_out` with `frame_count` interleaved frames and return the
    /// number of frames written.
    ///
    /// `frames_out` must hold at least `frame_count × channels` samples.
    fn read_pcm_frames(&mut self, frames_out: &mut [f32], frame_count: u64) -> Result<u64>;

    fn data_format(&self) -> DataFormat;

    fn seek_to_pcm_frame(&mut self, _frame_index: u64) -> Result<()> {
        Err(Error::NotImplemented("seek"))
    }

    fn cursor(&self) -> Result<u64> {
        Err(Error::NotImplemented("cursor"))
    }

    fn length(&self) -> Result<u64> {
        Err(Error::NotImplemented("length"))
    }

    fn set_looping(&mut self, _looping: bool) -> Result<()> {
        Err(Error::NotImplemented("looping"))
    }
}

impl<S: DataSource + ?Sized> DataSource for Box<S> {
    #[inline]
    fn read_pcm_frames(&mut self, frames_out: &mut [f32], frame_count: u64) -> Result<u64> {
        (**self).read_pcm_frames(frames_out, frame_count)
    }
    fn data_format(&self) -> DataFormat { (**self).data_format() }
    fn seek_to_pcm_frame(&mut self, frame_index: u64) -> Result<()> { (**self).seek_to_pcm_frame(frame_index) }
    fn cursor(&self) -> Result<u64> { (**self).cursor() }
    fn length(&self) -> Result<u64> { (**self).length() }
    fn set_looping(&mut self, looping: bool) -> Result<()> { (**self).set_looping(looping) }
}

/// Number of interleaved samples a read of `frame_count` frames touches.
///
/// Rejects zero-length reads and buffers too small to hold the request.
pub(crate) fn required_samples(buffer_len: usize, frame_count: u64, channels: u32) -> Result<usize> {
    if frame_count == 0 {
        return Err(Error::InvalidArgument("frame count must be > 0"));
    }
    let needed = usize::try_from(frame_count)
        .ok()
        .and_then(|f| f.checked_mul(channels as usize))
        .ok_or(Error::InvalidArgument("frame count overflows buffer size"))?;
    if buffer_len < needed {
        return Err(Error::InvalidArgument("output buffer smaller than frame count × channels"));
    }
    Ok(needed)
}
