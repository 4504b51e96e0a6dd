//! Playback devices via CPAL.
//!
//! A [`Context`] resolves an output device and a concrete stream config once;
//! [`Context::play`] then drives any [`DataSource`] from the device callback.
//! The callback pulls exactly the frames the device asked for into a scratch
//! buffer, remaps channels, applies gain, clamps, and converts to the device's
//! sample type. A failed read plays silence for that block.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{debug, error, info};

use crate::data_source::DataSource;
use crate::error::{Error, Result};

/// One output device as reported by the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub name: String,
    pub is_default: bool,
}

/// Enumerate output devices on the default host.
pub fn list_playback_devices() -> Result<Vec<DeviceInfo>> {
    let host = cpal::default_host();
    let default_name = host.default_output_device().and_then(|d| d.name().ok());
    let mut devices = Vec::new();
    for dev in host.output_devices()? {
        let name = dev.name()?;
        let is_default = default_name.as_deref() == Some(name.as_str());
        devices.push(DeviceInfo { name, is_default });
    }
    Ok(devices)
}

/// What to open. Unset fields fall back to the device defaults.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContextConfig {
    /// Exact device name, as listed by [`list_playback_devices`].
    pub device_name: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
}

/// An opened output device and the stream config chosen for it.
pub struct Context {
    device: cpal::Device,
    config: cpal::StreamConfig,
    sample_format: cpal::SampleFormat,
}

impl Context {
    pub fn new(config: &ContextConfig) -> Result<Self> {
        let device = pick_device(config.device_name.as_deref())?;
        let supported = choose_config(&device, config.sample_rate, config.channels)?;
        let sample_format = supported.sample_format();
        let stream_config = supported.config();
        info!(
            device = %device.name().unwrap_or_default(),
            sample_rate = stream_config.sample_rate.0,
            channels = stream_config.channels,
            ?sample_format,
            "context: opened"
        );
        Ok(Self { device, config: stream_config, sample_format })
    }

    #[inline] pub fn sample_rate(&self) -> u32 { self.config.sample_rate.0 }
    #[inline] pub fn channels(&self) -> u16 { self.config.channels }

    pub fn device_name(&self) -> Result<String> {
        Ok(self.device.name()?)
    }

    /// Start pulling `source` on the device's audio thread.
    ///
    /// The source's channel count may differ from the device's; frames are
    /// remapped per [`remap_sample`]. Its sample rate is not converted.
    pub fn play<S>(&self, source: S, gain: f32) -> Result<Playback>
    where
        S: DataSource + Send + 'static,
    {
        let format = source.data_format();
        if format.channels == 0 {
            return Err(Error::InvalidArgument("source reports 0 channels"));
        }
        if format.sample_rate != self.sample_rate() {
            debug!(
                source = format.sample_rate,
                device = self.sample_rate(),
                "context: source and device sample rates differ"
            );
        }

        let stream = match self.sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32, S>(&self.device, &self.config, source, gain)?,
            cpal::SampleFormat::I16 => build_stream::<i16, S>(&self.device, &self.config, source, gain)?,
            cpal::SampleFormat::U16 => build_stream::<u16, S>(&self.device, &self.config, source, gain)?,
            other => return Err(Error::UnsupportedSampleFormat(other)),
        };
        stream.play()?;
        Ok(Playback { stream, playing: true })
    }
}

/// A running output stream. Dropping it stops playback.
pub struct Playback {
    stream: cpal::Stream,
    playing: bool,
}

impl Playback {
    pub fn pause(&mut self) -> Result<()> {
        self.stream.pause()?;
        self.playing = false;
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        self.stream.play()?;
        self.playing = true;
        Ok(())
    }

    #[inline] pub fn is_playing(&self) -> bool { self.playing }
}

fn pick_device(name: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();
    if let Some(name) = name {
        for d in host.output_devices()? {
            if d.name()? == name {
                return Ok(d);
            }
        }
        return Err(Error::DeviceNotFound(name.to_string()));
    }
    host.default_output_device().ok_or(Error::NoDefaultDevice)
}

/// Distance of a supported range from the request: sample-rate misses weigh
/// 1000× a channel-count miss. Lower is better, 0 is an exact fit.
pub fn config_score(channels: u16, sr_min: u32, sr_max: u32, req_sr: Option<u32>, req_ch: Option<u16>) -> u64 {
    let ch_pen = req_ch.map_or(0, |c| u64::from(channels.abs_diff(c)));
    let sr_pen = match req_sr {
        Some(sr) if (sr_min..=sr_max).contains(&sr) => 0,
        Some(sr) => u64::from(sr_min.abs_diff(sr).min(sr_max.abs_diff(sr))),
        None => 0,
    };
    sr_pen.saturating_mul(1000).saturating_add(ch_pen)
}

fn choose_config(
    device: &cpal::Device,
    req_sr: Option<u32>,
    req_ch: Option<u16>,
) -> Result<cpal::SupportedStreamConfig> {
    if req_sr.is_none() && req_ch.is_none() {
        return Ok(device.default_output_config()?);
    }

    let mut best: Option<(u64, cpal::SupportedStreamConfigRange)> = None;
    for range in device.supported_output_configs()? {
        let score = config_score(
            range.channels(),
            range.min_sample_rate().0,
            range.max_sample_rate().0,
            req_sr,
            req_ch,
        );
        if best.as_ref().map_or(true, |(s, _)| score < *s) {
            best = Some((score, range));
        }
    }

    let (_, range) = best.ok_or(Error::NoSupportedConfig)?;
    let pick_sr = match req_sr {
        Some(sr) => cpal::SampleRate(sr.clamp(range.min_sample_rate().0, range.max_sample_rate().0)),
        None => range.max_sample_rate(),
    };
    Ok(range.with_sample_rate(pick_sr))
}

/// Value of output channel `channel` (of `dst_channels`) for one source frame.
///
/// Equal counts pass through. Mono fans out to every output. A mono output
/// gets the average of the source frame. Otherwise channels map by index and
/// outputs without a source channel are silent.
#[inline]
pub fn remap_sample(src_frame: &[f32], dst_channels: usize, channel: usize) -> f32 {
    match (src_frame.len(), dst_channels) {
        (0, _) => 0.0,
        (1, _) => src_frame[0],
        (n, 1) => src_frame.iter().sum::<f32>() / n as f32,
        (n, _) if channel < n => src_frame[channel],
        _ => 0.0,
    }
}

/// Pull `frames` frames into `block`. Anything the source did not write is
/// zeroed so a short or failed read never replays the previous callback.
fn pull_block<S: DataSource + ?Sized>(source: &mut S, block: &mut [f32], frames: u64, channels: usize) {
    let read = source.read_pcm_frames(block, frames).unwrap_or(0).min(frames);
    let written = (read as usize).saturating_mul(channels).min(block.len());
    block[written..].fill(0.0);
}

fn build_stream<T, S>(device: &cpal::Device, cfg: &cpal::StreamConfig, mut source: S, gain: f32) -> Result<cpal::Stream>
where
    T: cpal::Sample + cpal::FromSample<f32> + cpal::SizedSample + Send + 'static,
    S: DataSource + Send + 'static,
{
    let device_channels = usize::from(cfg.channels).max(1);
    let source_channels = (source.data_format().channels as usize).max(1);
    // grown on the first callbacks, then reused
    let mut scratch: Vec<f32> = Vec::new();

    let stream = device.build_output_stream(
        cfg,
        move |output: &mut [T], _: &cpal::OutputCallbackInfo| {
            let frames = output.len() / device_channels;
            if frames == 0 {
                return;
            }
            let needed = frames * source_channels;
            if scratch.len() < needed {
                scratch.resize(needed, 0.0);
            }
            let block = &mut scratch[..needed];
            pull_block(&mut source, block, frames as u64, source_channels);
            for (out_frame, src_frame) in output.chunks_mut(device_channels).zip(block.chunks(source_channels)) {
                for (c, slot) in out_frame.iter_mut().enumerate() {
                    let s = (remap_sample(src_frame, device_channels, c) * gain).clamp(-1.0, 1.0);
                    *slot = T::from_sample(s);
                }
            }
        },
        |e: cpal::StreamError| error!("stream error: {e}"),
        None,
    )?;

    Ok(stream)
}
