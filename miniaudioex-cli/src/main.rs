//! miniaudioex CLI: play an oscillator, wave table, procedural or noise source
//! through an optional biquad chain on a real output device.

mod patch;
mod sources;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use clap::{Parser, ValueEnum};
use miniaudioex_core::biquad::{FilterConfig, FilterKind};
use miniaudioex_core::waveform::Waveform;
use miniaudioex_engine::{list_playback_devices, Context, ContextConfig, FilterChain, FilteredSource};
use tracing::info;

use crate::patch::{FilterSpec, Patch, SourceSpec};
use crate::sources::BoxedSource;

const DEFAULT_GAIN: f32 = 0.35;
const DEFAULT_FREQUENCY: f32 = 440.0;

#[derive(Parser, Debug)]
#[command(name = "miniaudioex")]
#[command(about = "Real-time player for oscillators, wave tables and procedural sources")]
struct Cli {
    /// List playback devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Output device name (default device if omitted)
    #[arg(long)]
    device: Option<String>,

    #[arg(long)]
    sample_rate: Option<u32>,

    #[arg(long)]
    channels: Option<u16>,

    /// Stop after this many seconds
    #[arg(long)]
    duration: Option<u64>,

    /// Output gain (linear)
    #[arg(long)]
    gain: Option<f32>,

    #[arg(long, value_enum)]
    source: Option<SourceArg>,

    #[arg(long, value_enum)]
    waveform: Option<WaveformArg>,

    /// Tone frequency in Hz
    #[arg(long)]
    frequency: Option<f32>,

    /// Samples per wave table cycle
    #[arg(long)]
    table_size: Option<usize>,

    /// Seed for the noise source
    #[arg(long)]
    seed: Option<u64>,

    /// Append a biquad stage after any patch filters
    #[arg(long, value_enum)]
    filter: Option<FilterArg>,

    /// Filter cutoff/center in Hz
    #[arg(long, default_value_t = 1000.0)]
    cutoff: f32,

    #[arg(long, default_value_t = core::f32::consts::FRAC_1_SQRT_2)]
    q: f32,

    /// Shelf/peak gain in dB
    #[arg(long, allow_hyphen_values = true)]
    gain_db: Option<f32>,

    /// TOML patch file; flags override its values
    #[arg(long)]
    patch: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum SourceArg {
    Oscillator,
    WaveTable,
    Procedural,
    Noise,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum WaveformArg {
    Sine,
    Saw,
    Square,
    Triangle,
}

impl From<WaveformArg> for Waveform {
    fn from(w: WaveformArg) -> Self {
        match w {
            WaveformArg::Sine => Waveform::Sine,
            WaveformArg::Saw => Waveform::Saw,
            WaveformArg::Square => Waveform::Square,
            WaveformArg::Triangle => Waveform::Triangle,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum FilterArg {
    Lowpass,
    Highpass,
    Bandpass,
    LowShelf,
    HighShelf,
    Peak,
    Notch,
}

impl From<FilterArg> for FilterKind {
    fn from(f: FilterArg) -> Self {
        match f {
            FilterArg::Lowpass => FilterKind::Lowpass,
            FilterArg::Highpass => FilterKind::Highpass,
            FilterArg::Bandpass => FilterKind::Bandpass,
            FilterArg::LowShelf => FilterKind::LowShelf,
            FilterArg::HighShelf => FilterKind::HighShelf,
            FilterArg::Peak => FilterKind::Peak,
            FilterArg::Notch => FilterKind::Notch,
        }
    }
}

/// Everything needed to open a device and start playing.
#[derive(Debug, PartialEq)]
struct Settings {
    context: ContextConfig,
    gain: f32,
    duration: Option<u64>,
    source: SourceSpec,
    filters: Vec<FilterSpec>,
}

/// Merge flags over the patch.
fn resolve(cli: &Cli, patch: Patch) -> Settings {
    let mut source = patch
        .source
        .unwrap_or(SourceSpec::Oscillator { waveform: Waveform::Sine, frequency: DEFAULT_FREQUENCY });

    if let Some(kind) = cli.source {
        if kind != source_kind(&source) {
            source = blank_source(kind, source_frequency(&source));
        }
    }
    apply_overrides(&mut source, cli);

    let mut filters = patch.filters;
    if let Some(kind) = cli.filter {
        filters.push(FilterSpec { kind: kind.into(), frequency: cli.cutoff, q: cli.q, gain_db: cli.gain_db });
    }

    Settings {
        context: ContextConfig {
            device_name: cli.device.clone(),
            sample_rate: cli.sample_rate.or(patch.sample_rate),
            channels: cli.channels.or(patch.channels),
        },
        gain: cli.gain.or(patch.gain).unwrap_or(DEFAULT_GAIN),
        duration: cli.duration.or(patch.duration),
        source,
        filters,
    }
}

fn source_kind(spec: &SourceSpec) -> SourceArg {
    match spec {
        SourceSpec::Oscillator { .. } => SourceArg::Oscillator,
        SourceSpec::WaveTable { .. } => SourceArg::WaveTable,
        SourceSpec::Procedural { .. } => SourceArg::Procedural,
        SourceSpec::Noise { .. } => SourceArg::Noise,
    }
}

fn source_frequency(spec: &SourceSpec) -> f32 {
    match spec {
        SourceSpec::Oscillator { frequency, .. }
        | SourceSpec::WaveTable { frequency, .. }
        | SourceSpec::Procedural { frequency } => *frequency,
        SourceSpec::Noise { .. } => DEFAULT_FREQUENCY,
    }
}

fn blank_source(kind: SourceArg, frequency: f32) -> SourceSpec {
    match kind {
        SourceArg::Oscillator => SourceSpec::Oscillator { waveform: Waveform::Sine, frequency },
        SourceArg::WaveTable => SourceSpec::WaveTable { waveform: Waveform::Sine, frequency, table_size: None, table: None },
        SourceArg::Procedural => SourceSpec::Procedural { frequency },
        SourceArg::Noise => SourceSpec::Noise { seed: None },
    }
}

fn apply_overrides(spec: &mut SourceSpec, cli: &Cli) {
    match spec {
        SourceSpec::Oscillator { waveform, frequency } => {
            if let Some(w) = cli.waveform { *waveform = w.into(); }
            if let Some(f) = cli.frequency { *frequency = f; }
        }
        SourceSpec::WaveTable { waveform, frequency, table_size, table } => {
            if let Some(w) = cli.waveform {
                *waveform = w.into();
                // an explicit waveform replaces a custom patch table
                *table = None;
            }
            if let Some(f) = cli.frequency { *frequency = f; }
            if cli.table_size.is_some() { *table_size = cli.table_size; }
        }
        SourceSpec::Procedural { frequency } => {
            if let Some(f) = cli.frequency { *frequency = f; }
        }
        SourceSpec::Noise { seed } => {
            if cli.seed.is_some() { *seed = cli.seed; }
        }
    }
}

fn list_devices() -> Result<()> {
    println!("Available playback devices:");
    for dev in list_playback_devices()? {
        let mark = if dev.is_default { "*" } else { "-" };
        println!("{mark} {}", dev.name);
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if cli.list_devices {
        return list_devices();
    }

    let patch = match &cli.patch {
        Some(path) => patch::load(path)?,
        None => Patch::default(),
    };
    let settings = resolve(&cli, patch);

    let ctx = Context::new(&settings.context).context("opening playback device")?;
    let sample_rate = ctx.sample_rate();
    let channels = u32::from(ctx.channels());

    let mut source = sources::build(&settings.source, sample_rate, channels).context("building source")?;
    if !settings.filters.is_empty() {
        let configs: Vec<FilterConfig> = settings.filters.iter().map(|f| f.to_config(sample_rate)).collect();
        let chain = FilterChain::from_configs(&configs).context("building filter chain")?;
        source = Box::new(FilteredSource::new(source, chain)?) as BoxedSource;
    }

    info!(device = %ctx.device_name()?, sample_rate, channels, "playing");
    info!(source = ?settings.source, filters = settings.filters.len(), gain = settings.gain, "patch");
    if let Some(d) = settings.duration {
        info!("auto-stop after {d} seconds");
    }

    let playback = ctx.play(source, settings.gain)?;

    match settings.duration {
        Some(d) => std::thread::sleep(Duration::from_secs(d)),
        None => {
            while playback.is_playing() {
                std::thread::sleep(Duration::from_millis(500));
            }
        }
    }
    Ok(())
}
