//! Single-cycle wave tables read with linear interpolation.
//!
//! Built-in kinds synthesize one cycle of a [`Waveform`] into a table the
//! `WaveTable` owns. `Custom` tables borrow a caller slice for `'a` and never
//! take ownership of it; the borrow checker enforces that the slice outlives
//! the table.
//!
//! Reads map a phase in radians to a fractional table position
//! `pos = (phase / 2π) · len` and blend `table[⌊pos⌋ mod len]` with
//! `table[(⌊pos⌋ + 1) mod len]`.

use tracing::{debug, warn};

use crate::dsp::{self, phase_increment, TAU};
use crate::error::{Error, Result};
use crate::waveform::Waveform;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum WaveTableKind {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
    /// Caller-supplied table.
    Custom,
}

impl WaveTableKind {
    /// The built-in wave shape, or `None` for custom tables.
    pub fn waveform(self) -> Option<Waveform> {
        match self {
            WaveTableKind::Sine => Some(Waveform::Sine),
            WaveTableKind::Saw => Some(Waveform::Saw),
            WaveTableKind::Square => Some(Waveform::Square),
            WaveTableKind::Triangle => Some(Waveform::Triangle),
            WaveTableKind::Custom => None,
        }
    }
}

impl From<Waveform> for WaveTableKind {
    fn from(w: Waveform) -> Self {
        match w {
            Waveform::Sine => WaveTableKind::Sine,
            Waveform::Saw => WaveTableKind::Saw,
            Waveform::Square => WaveTableKind::Square,
            Waveform::Triangle => WaveTableKind::Triangle,
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct WaveTableConfig<'a> {
    pub kind: WaveTableKind,
    /// Required for `Custom`, ignored otherwise.
    pub data: Option<&'a [f32]>,
    /// Table length. For `Custom` it must not exceed `data.len()`; the first
    /// `sample_count` values are used.
    pub sample_count: usize,
}

impl<'a> WaveTableConfig<'a> {
    pub fn new(kind: WaveTableKind, data: Option<&'a [f32]>, sample_count: usize) -> Self {
        Self { kind, data, sample_count }
    }
}

/// Table storage: synthesized and owned, or borrowed from the caller.
#[derive(Clone, Debug)]
enum TableData<'a> {
    Owned(Box<[f32]>),
    Borrowed(&'a [f32]),
}

impl TableData<'_> {
    #[inline]
    fn as_slice(&self) -> &[f32] {
        match self {
            TableData::Owned(b) => b,
            TableData::Borrowed(s) => s,
        }
    }
}

#[derive(Clone, Debug)]
pub struct WaveTable<'a> {
    kind: WaveTableKind,
    data: TableData<'a>,
    data_index: usize,
    phase: f32,
    phase_inc: f32,
}

impl<'a> WaveTable<'a> {
    pub fn new(config: &WaveTableConfig<'a>) -> Result<Self> {
        if config.sample_count == 0 {
            warn!("wave table: sample count can not be 0");
            return Err(Error::InvalidArgument("sample count must be > 0"));
        }

        let data = match config.kind.waveform() {
            None => {
                let Some(user) = config.data else {
                    warn!("wave table: custom table requires data");
                    return Err(Error::InvalidArgument("custom table requires data"));
                };
                if config.sample_count > user.len() {
                    warn!(
                        sample_count = config.sample_count,
                        len = user.len(),
                        "wave table: sample count exceeds custom data"
                    );
                    return Err(Error::InvalidArgument("sample count exceeds custom data length"));
                }
                TableData::Borrowed(&user[..config.sample_count])
            }
            Some(waveform) => {
                let n = config.sample_count;
                let step = TAU / n as f32;
                let table: Box<[f32]> = (0..n).map(|i| waveform.sample(i as f32 * step)).collect();
                debug!(?waveform, n, "wave table: synthesized");
                TableData::Owned(table)
            }
        };

        Ok(Self { kind: config.kind, data, data_index: 0, phase: 0.0, phase_inc: 0.0 })
    }

    /// Owned table holding one synthesized cycle of `waveform`.
    pub fn builtin(waveform: Waveform, sample_count: usize) -> Result<WaveTable<'static>> {
        WaveTable::new(&WaveTableConfig::new(waveform.into(), None, sample_count))
    }

    /// Table reading directly from `data` (borrowed, never copied).
    pub fn custom(data: &'a [f32]) -> Result<Self> {
        Self::new(&WaveTableConfig::new(WaveTableKind::Custom, Some(data), data.len()))
    }

    /// Read at the current phase, then advance by `2π · frequency / sample_rate`.
    #[inline]
    pub fn sample(&mut self, frequency: f32, sample_rate: f32) -> f32 {
        let (index, y) = lookup(self.data.as_slice(), self.phase).unwrap_or((self.data_index, 0.0));
        self.data_index = index;
        self.phase_inc = phase_increment(frequency, sample_rate);
        self.phase = dsp::wrap_phase(self.phase + self.phase_inc);
        y
    }

    /// Read at an arbitrary phase (radians). No state is touched.
    #[inline]
    pub fn sample_at_phase(&self, phase: f32) -> f32 {
        lookup(self.data.as_slice(), phase).map_or(0.0, |(_, y)| y)
    }

    /// Zero the phase accumulator. The table itself is untouched.
    #[inline]
    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    #[inline] pub fn kind(&self) -> WaveTableKind { self.kind }
    #[inline] pub fn data(&self) -> &[f32] { self.data.as_slice() }
    #[inline] pub fn len(&self) -> usize { self.data.as_slice().len() }
    #[inline] pub fn is_empty(&self) -> bool { self.len() == 0 }
    #[inline] pub fn phase(&self) -> f32 { self.phase }
    #[inline] pub fn phase_increment(&self) -> f32 { self.phase_inc }
    /// Table index of the most recent [`sample`](Self::sample) read.
    #[inline] pub fn data_index(&self) -> usize { self.data_index }
    /// `true` when the table allocated its own buffer.
    #[inline] pub fn is_owned(&self) -> bool { matches!(self.data, TableData::Owned(_)) }
}

/// Interpolated read. `None` when the position is not a usable index
/// (non-finite phase).
#[inline]
fn lookup(table: &[f32], phase: f32) -> Option<(usize, f32)> {
    let len = table.len();
    let pos = dsp::wrap_phase(phase) / TAU * len as f32;
    if !(pos >= 0.0) || !pos.is_finite() {
        return None;
    }
    let index = pos as usize;
    let t = pos - index as f32;
    let i1 = index % len;
    let i2 = (index + 1) % len;
    Some((i1, dsp::lerp(table[i1], table[i2], t)))
}
