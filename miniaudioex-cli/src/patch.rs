//! TOML patch files: a saved source + filter chain + output settings.
//!
//! ```toml
//! sample_rate = 44100
//! channels = 2
//! gain = 0.35
//!
//! [source]
//! type = "wave_table"
//! waveform = "saw"
//! frequency = 110.0
//! table_size = 2048
//!
//! [[filters]]
//! kind = "lowpass"
//! frequency = 1200.0
//! q = 0.707
//! ```
//!
//! Every field is optional; command-line flags win over the file.

use std::path::Path;

use anyhow::{Context, Result};
use miniaudioex_core::biquad::{FilterConfig, FilterKind};
use miniaudioex_core::waveform::Waveform;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Patch {
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub gain: Option<f32>,
    pub duration: Option<u64>,
    pub source: Option<SourceSpec>,
    #[serde(default)]
    pub filters: Vec<FilterSpec>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SourceSpec {
    Oscillator {
        #[serde(default)]
        waveform: Waveform,
        frequency: f32,
    },
    WaveTable {
        #[serde(default)]
        waveform: Waveform,
        frequency: f32,
        table_size: Option<usize>,
        /// One cycle of custom samples; overrides `waveform`.
        table: Option<Vec<f32>>,
    },
    Procedural {
        frequency: f32,
    },
    Noise {
        seed: Option<u64>,
    },
}

/// One biquad stage. The sample rate comes from the opened device.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FilterSpec {
    pub kind: FilterKind,
    pub frequency: f32,
    #[serde(default = "default_q")]
    pub q: f32,
    pub gain_db: Option<f32>,
}

fn default_q() -> f32 {
    core::f32::consts::FRAC_1_SQRT_2
}

impl FilterSpec {
    pub fn to_config(self, sample_rate: u32) -> FilterConfig {
        FilterConfig { kind: self.kind, sample_rate, frequency: self.frequency, q: self.q, gain_db: self.gain_db }
    }
}

pub fn parse(text: &str) -> Result<Patch> {
    toml::from_str(text).context("invalid patch")
}

pub fn load(path: &Path) -> Result<Patch> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading patch {}", path.display()))?;
    parse(&text).with_context(|| format!("in {}", path.display()))
}
