//! miniaudioex engine: pull-based data sources on top of the core DSP primitives.
//!
//! Crate layout:
//! - [`format`]      : sample formats, channel positions, `DataFormat`
//! - [`data_source`] : the `DataSource` pull protocol
//! - [`procedural`]  : `ProceduralWave`, a source fed by a user callback
//! - [`graph`]       : `Generator` trait and the `GeneratorSource<G>` adapter
//! - [`nodes`]       : generators over oscillators, wave tables and closures
//! - [`chain`]       : serial biquad chains and per-channel filtered sources
//! - [`dsp_node`]    : user-defined frames-in/frames-out processing node
//! - [`device`]      : CPAL playback (feature `realtime`)
//!
//! Reads never allocate on the audio thread once a source is built. Sources
//! are plain structs owned by whoever pulls them.

pub mod chain;
pub mod data_source;
#[cfg(feature = "realtime")]
pub mod device;
pub mod dsp_node;
pub mod error;
pub mod format;
pub mod graph;
pub mod nodes;
pub mod procedural;

// Re-export some commonly used items to make downstream imports ergonomic.
pub use chain::{FilterChain, FilteredSource};
pub use data_source::DataSource;
#[cfg(feature = "realtime")]
pub use device::{list_playback_devices, Context, ContextConfig, DeviceInfo, Playback};
pub use dsp_node::{DspNode, DspNodeConfig, DspNodeInfo};
pub use error::{Error, Result};
pub use format::{standard_channel_map, Channel, DataFormat, SampleFormat};
pub use graph::{Generator, GeneratorSource};
pub use nodes::{CallbackGenerator, TableOscillator};
pub use procedural::{ProceduralWave, ProceduralWaveConfig, WaveformCallback};
