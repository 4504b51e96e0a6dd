//! miniaudioex core: the DSP primitives behind the playback layer.
//!
//! Features
//! - `fast-math` : polynomial sine/tan in the hot paths
//! - `libm`      : use `libm` for transcendental functions
//! - `micromath` : use `micromath` for transcendental functions
//! - `serde`     : (de)serialize config types
//!
//! Modules
//! - [`dsp`]        : math backend, phase helpers, dB conversion
//! - [`waveform`]   : sine/square/triangle/saw evaluated at a phase
//! - [`biquad`]     : cookbook biquad designs + transposed DF-II processing
//! - [`oscillator`] : phase-accumulator tone generator
//! - [`wave_table`] : interpolated single-cycle tables (owned or borrowed)
//! - [`error`]      : crate error type
//!
//! Every primitive is a plain value: construct it from its config, call it
//! sample-by-sample from one thread, drop it. Nothing here allocates after
//! construction or blocks.

pub mod biquad;
pub mod dsp;
pub mod error;
pub mod oscillator;
pub mod wave_table;
pub mod waveform;

pub use error::{Error, Result};

/// Commonly used types for convenience:
pub mod prelude {
    pub use crate::biquad::{BiquadFilter, Coefficients, FilterConfig, FilterKind, DEFAULT_GAIN_DB};
    pub use crate::dsp::{db_to_lin, lerp, wrap_phase, TAU};
    pub use crate::error::{Error, Result};
    pub use crate::oscillator::{Oscillator, OscillatorConfig};
    pub use crate::wave_table::{WaveTable, WaveTableConfig, WaveTableKind};
    pub use crate::waveform::Waveform;
}
