//! Engine error type.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The source does not support this capability (seek/cursor/length/looping
    /// on an infinite procedural stream). Permanent, not transient.
    #[error("not implemented: {0}")]
    NotImplemented(&'static str),

    #[error(transparent)]
    Dsp(#[from] miniaudioex_core::Error),

    #[cfg(feature = "realtime")]
    #[error("playback device not found: {0}")]
    DeviceNotFound(String),

    #[cfg(feature = "realtime")]
    #[error("no default playback device")]
    NoDefaultDevice,

    #[cfg(feature = "realtime")]
    #[error("no supported output configs")]
    NoSupportedConfig,

    #[cfg(feature = "realtime")]
    #[error("unsupported device sample format: {0:?}")]
    UnsupportedSampleFormat(cpal::SampleFormat),

    #[cfg(feature = "realtime")]
    #[error(transparent)]
    Devices(#[from] cpal::DevicesError),

    #[cfg(feature = "realtime")]
    #[error(transparent)]
    DeviceName(#[from] cpal::DeviceNameError),

    #[cfg(feature = "realtime")]
    #[error(transparent)]
    DefaultStreamConfig(#[from] cpal::DefaultStreamConfigError),

    #[cfg(feature = "realtime")]
    #[error(transparent)]
    SupportedStreamConfigs(#[from] cpal::SupportedStreamConfigsError),

    #[cfg(feature = "realtime")]
    #[error(transparent)]
    BuildStream(#[from] cpal::BuildStreamError),

    #[cfg(feature = "realtime")]
    #[error(transparent)]
    PlayStream(#[from] cpal::PlayStreamError),

    #[cfg(feature = "realtime")]
    #[error(transparent)]
    PauseStream(#[from] cpal::PauseStreamError),
}

pub type Result<T> = core::result::Result<T, Error>;
