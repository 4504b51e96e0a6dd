//! Turn a [`SourceSpec`] into a playable data source.

use anyhow::Result;
use miniaudioex_core::dsp::{self, TAU};
use miniaudioex_core::oscillator::{Oscillator, OscillatorConfig};
use miniaudioex_core::wave_table::WaveTable;
use miniaudioex_engine::{
    DataSource, GeneratorSource, ProceduralWave, ProceduralWaveConfig, SampleFormat, TableOscillator,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::patch::SourceSpec;

pub type BoxedSource = Box<dyn DataSource + Send>;

pub const DEFAULT_TABLE_SIZE: usize = 2048;

pub fn build(spec: &SourceSpec, sample_rate: u32, channels: u32) -> Result<BoxedSource> {
    Ok(match spec {
        SourceSpec::Oscillator { waveform, frequency } => {
            let osc = Oscillator::new(&OscillatorConfig::new(*waveform, *frequency, 1.0, sample_rate as f32))?;
            Box::new(GeneratorSource::new(osc, channels, sample_rate)?)
        }
        SourceSpec::WaveTable { waveform, frequency, table_size, table } => {
            let wt = match table {
                Some(data) => {
                    // patch tables live for the rest of the process
                    let data: &'static [f32] = Box::leak(data.clone().into_boxed_slice());
                    WaveTable::custom(data)?
                }
                None => WaveTable::builtin(*waveform, table_size.unwrap_or(DEFAULT_TABLE_SIZE))?,
            };
            Box::new(GeneratorSource::new(TableOscillator::new(wt, *frequency)?, channels, sample_rate)?)
        }
        SourceSpec::Procedural { frequency } => Box::new(sine_wave(*frequency, channels, sample_rate)?),
        SourceSpec::Noise { seed } => Box::new(white_noise(*seed, channels, sample_rate)?),
    })
}

/// Sine written block-wise by a callback that counts frames itself.
pub fn sine_wave(
    frequency: f32,
    channels: u32,
    sample_rate: u32,
) -> Result<ProceduralWave<impl FnMut(&mut [f32], u64, u32) + Send>> {
    let cycles_per_frame = f64::from(frequency) / f64::from(sample_rate.max(1));
    let mut frame: u64 = 0;
    let wave = ProceduralWave::new(ProceduralWaveConfig::new(
        SampleFormat::F32,
        channels,
        sample_rate,
        move |out: &mut [f32], frame_count: u64, ch: u32| {
            for (i, fr) in out.chunks_exact_mut(ch as usize).enumerate() {
                let t = ((frame + i as u64) as f64 * cycles_per_frame).fract() as f32;
                fr.fill(dsp::sin(t * TAU));
            }
            frame += frame_count;
        },
    ))?;
    Ok(wave)
}

/// Uniform white noise in [-1, 1], independent per channel.
pub fn white_noise(
    seed: Option<u64>,
    channels: u32,
    sample_rate: u32,
) -> Result<ProceduralWave<impl FnMut(&mut [f32], u64, u32) + Send>> {
    let mut rng = seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64);
    let wave = ProceduralWave::new(ProceduralWaveConfig::new(
        SampleFormat::F32,
        channels,
        sample_rate,
        move |out: &mut [f32], _frame_count: u64, _ch: u32| {
            for s in out.iter_mut() {
                *s = rng.gen_range(-1.0..=1.0);
            }
        },
    ))?;
    Ok(wave)
}
