//! C ABI wrapper for miniaudioex.
//!
//! Exposes biquad filters, oscillators, wave tables and procedural sources as
//! opaque heap handles the caller creates and destroys.
//!
//! ABI notes
//! - All functions are `extern "C"` and `#[no_mangle]`.
//! - Creation returns null on invalid arguments; destroy accepts null.
//! - Every other function tolerates a null handle: getters return 0.0 (or the
//!   first enum value), setters and processing do nothing, fallible calls
//!   return `MAE_INVALID_ARGS`.
//! - Enum arguments are plain `int`s; unknown values are rejected.
//!
//! Threading
//! - Handles are NOT thread-safe; use each one from a single thread.

use std::ffi::{c_int, c_void};

use miniaudioex_core::biquad::{BiquadFilter, FilterConfig, FilterKind, DEFAULT_GAIN_DB};
use miniaudioex_core::oscillator::{Oscillator, OscillatorConfig};
use miniaudioex_core::wave_table::{WaveTable, WaveTableConfig, WaveTableKind};
use miniaudioex_core::waveform::Waveform;
use miniaudioex_engine::{DataSource, Error, ProceduralWave, ProceduralWaveConfig, SampleFormat};

// --- Result codes ----------------------------------------------------------------

pub const MAE_SUCCESS: c_int = 0;
pub const MAE_INVALID_ARGS: c_int = -2;
pub const MAE_NOT_IMPLEMENTED: c_int = -29;

fn result_code(e: &Error) -> c_int {
    match e {
        Error::NotImplemented(_) => MAE_NOT_IMPLEMENTED,
        _ => MAE_INVALID_ARGS,
    }
}

// --- Enum values -----------------------------------------------------------------

pub const MAE_FILTER_LOWPASS: c_int = 0;
pub const MAE_FILTER_HIGHPASS: c_int = 1;
pub const MAE_FILTER_BANDPASS: c_int = 2;
pub const MAE_FILTER_LOWSHELF: c_int = 3;
pub const MAE_FILTER_HIGHSHELF: c_int = 4;
pub const MAE_FILTER_PEAK: c_int = 5;
pub const MAE_FILTER_NOTCH: c_int = 6;

pub const MAE_WAVEFORM_SINE: c_int = 0;
pub const MAE_WAVEFORM_SQUARE: c_int = 1;
pub const MAE_WAVEFORM_TRIANGLE: c_int = 2;
pub const MAE_WAVEFORM_SAW: c_int = 3;

pub const MAE_WAVE_TABLE_SINE: c_int = 0;
pub const MAE_WAVE_TABLE_SAW: c_int = 1;
pub const MAE_WAVE_TABLE_SQUARE: c_int = 2;
pub const MAE_WAVE_TABLE_TRIANGLE: c_int = 3;
pub const MAE_WAVE_TABLE_CUSTOM: c_int = 4;

fn filter_kind(v: c_int) -> Option<FilterKind> {
    usize::try_from(v).ok().and_then(|i| FilterKind::ALL.get(i).copied())
}

fn filter_kind_code(k: FilterKind) -> c_int {
    match k {
        FilterKind::Lowpass => MAE_FILTER_LOWPASS,
        FilterKind::Highpass => MAE_FILTER_HIGHPASS,
        FilterKind::Bandpass => MAE_FILTER_BANDPASS,
        FilterKind::LowShelf => MAE_FILTER_LOWSHELF,
        FilterKind::HighShelf => MAE_FILTER_HIGHSHELF,
        FilterKind::Peak => MAE_FILTER_PEAK,
        FilterKind::Notch => MAE_FILTER_NOTCH,
    }
}

fn waveform(v: c_int) -> Option<Waveform> {
    match v {
        MAE_WAVEFORM_SINE => Some(Waveform::Sine),
        MAE_WAVEFORM_SQUARE => Some(Waveform::Square),
        MAE_WAVEFORM_TRIANGLE => Some(Waveform::Triangle),
        MAE_WAVEFORM_SAW => Some(Waveform::Saw),
        _ => None,
    }
}

fn waveform_code(w: Waveform) -> c_int {
    match w {
        Waveform::Sine => MAE_WAVEFORM_SINE,
        Waveform::Square => MAE_WAVEFORM_SQUARE,
        Waveform::Triangle => MAE_WAVEFORM_TRIANGLE,
        Waveform::Saw => MAE_WAVEFORM_SAW,
    }
}

fn wave_table_kind(v: c_int) -> Option<WaveTableKind> {
    match v {
        MAE_WAVE_TABLE_SINE => Some(WaveTableKind::Sine),
        MAE_WAVE_TABLE_SAW => Some(WaveTableKind::Saw),
        MAE_WAVE_TABLE_SQUARE => Some(WaveTableKind::Square),
        MAE_WAVE_TABLE_TRIANGLE => Some(WaveTableKind::Triangle),
        MAE_WAVE_TABLE_CUSTOM => Some(WaveTableKind::Custom),
        _ => None,
    }
}

// --- Handle plumbing -------------------------------------------------------------

fn into_handle<T>(v: T) -> *mut T {
    Box::into_raw(Box::new(v))
}

fn destroy<T>(p: *mut T) {
    if !p.is_null() {
        unsafe { drop(Box::from_raw(p)); }
    }
}

/// Run `f` on the handle, or return `default` when it is null.
#[inline]
fn with<T, R>(p: *const T, default: R, f: impl FnOnce(&T) -> R) -> R {
    match unsafe { p.as_ref() } {
        Some(v) => f(v),
        None => default,
    }
}

#[inline]
fn with_mut<T, R>(p: *mut T, default: R, f: impl FnOnce(&mut T) -> R) -> R {
    match unsafe { p.as_mut() } {
        Some(v) => f(v),
        None => default,
    }
}

// --- Biquad filter ---------------------------------------------------------------

/// Opaque biquad filter handle.
pub struct MaeFilter(BiquadFilter);

/// Create a biquad filter. `gain_db <= 0` selects the 6 dB default.
/// Returns null on invalid arguments.
#[no_mangle]
pub extern "C" fn mae_filter_create(kind: c_int, sample_rate: i32, frequency: f32, q: f32, gain_db: f32) -> *mut MaeFilter {
    let (Some(kind), Ok(sample_rate)) = (filter_kind(kind), u32::try_from(sample_rate)) else {
        return std::ptr::null_mut();
    };
    let gain_db = if gain_db > 0.0 { gain_db } else { DEFAULT_GAIN_DB };
    let config = FilterConfig::new(kind, sample_rate, frequency, q).with_gain_db(gain_db);
    match BiquadFilter::new(&config) {
        Ok(f) => into_handle(MaeFilter(f)),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn mae_filter_destroy(filter: *mut MaeFilter) {
    destroy(filter);
}

/// Switch response; unknown values are ignored.
#[no_mangle]
pub extern "C" fn mae_filter_set_type(filter: *mut MaeFilter, kind: c_int) {
    if let Some(kind) = filter_kind(kind) {
        with_mut(filter, (), |f| f.0.set_kind(kind));
    }
}

#[no_mangle]
pub extern "C" fn mae_filter_get_type(filter: *const MaeFilter) -> c_int {
    with(filter, MAE_FILTER_LOWPASS, |f| filter_kind_code(f.0.kind()))
}

#[no_mangle]
pub extern "C" fn mae_filter_set_frequency(filter: *mut MaeFilter, frequency: f32) -> c_int {
    with_mut(filter, MAE_INVALID_ARGS, |f| match f.0.set_frequency(frequency) {
        Ok(()) => MAE_SUCCESS,
        Err(_) => MAE_INVALID_ARGS,
    })
}

#[no_mangle]
pub extern "C" fn mae_filter_get_frequency(filter: *const MaeFilter) -> f32 {
    with(filter, 0.0, |f| f.0.frequency())
}

#[no_mangle]
pub extern "C" fn mae_filter_set_q(filter: *mut MaeFilter, q: f32) -> c_int {
    with_mut(filter, MAE_INVALID_ARGS, |f| match f.0.set_q(q) {
        Ok(()) => MAE_SUCCESS,
        Err(_) => MAE_INVALID_ARGS,
    })
}

#[no_mangle]
pub extern "C" fn mae_filter_get_q(filter: *const MaeFilter) -> f32 {
    with(filter, 0.0, |f| f.0.q())
}

/// Non-finite gains return `MAE_INVALID_ARGS` and leave the filter unchanged.
#[no_mangle]
pub extern "C" fn mae_filter_set_gain_db(filter: *mut MaeFilter, gain_db: f32) -> c_int {
    with_mut(filter, MAE_INVALID_ARGS, |f| match f.0.set_gain_db(gain_db) {
        Ok(()) => MAE_SUCCESS,
        Err(_) => MAE_INVALID_ARGS,
    })
}

#[no_mangle]
pub extern "C" fn mae_filter_get_gain_db(filter: *const MaeFilter) -> f32 {
    with(filter, 0.0, |f| f.0.gain_db())
}

#[no_mangle]
pub extern "C" fn mae_filter_process_sample(filter: *mut MaeFilter, input: f32) -> f32 {
    with_mut(filter, 0.0, |f| f.0.process_sample(input))
}

/// Filter `input_samples` values. Only the first `output_samples` results are
/// written; the filter state advances over the whole input either way.
#[no_mangle]
pub extern "C" fn mae_filter_process_samples(
    filter: *mut MaeFilter,
    input: *const f32,
    input_samples: u64,
    output: *mut f32,
    output_samples: u64,
) {
    if input.is_null() || output.is_null() {
        return;
    }
    let (Ok(n_in), Ok(n_out)) = (usize::try_from(input_samples), usize::try_from(output_samples)) else {
        return;
    };
    with_mut(filter, (), |f| {
        let input = unsafe { std::slice::from_raw_parts(input, n_in) };
        let output = unsafe { std::slice::from_raw_parts_mut(output, n_out) };
        f.0.process_samples(input, output);
    });
}

/// Clear the delay line.
#[no_mangle]
pub extern "C" fn mae_filter_reset(filter: *mut MaeFilter) {
    with_mut(filter, (), |f| f.0.reset());
}

// --- Oscillator ------------------------------------------------------------------

/// Opaque oscillator handle.
pub struct MaeOscillator(Oscillator);

#[no_mangle]
pub extern "C" fn mae_oscillator_create(kind: c_int, frequency: f32, amplitude: f32, sample_rate: f32) -> *mut MaeOscillator {
    let Some(waveform) = waveform(kind) else {
        return std::ptr::null_mut();
    };
    match Oscillator::new(&OscillatorConfig::new(waveform, frequency, amplitude, sample_rate)) {
        Ok(o) => into_handle(MaeOscillator(o)),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn mae_oscillator_destroy(osc: *mut MaeOscillator) {
    destroy(osc);
}

#[no_mangle]
pub extern "C" fn mae_oscillator_set_type(osc: *mut MaeOscillator, kind: c_int) {
    if let Some(w) = waveform(kind) {
        with_mut(osc, (), |o| o.0.set_waveform(w));
    }
}

#[no_mangle]
pub extern "C" fn mae_oscillator_get_type(osc: *const MaeOscillator) -> c_int {
    with(osc, MAE_WAVEFORM_SINE, |o| waveform_code(o.0.waveform()))
}

#[no_mangle]
pub extern "C" fn mae_oscillator_set_frequency(osc: *mut MaeOscillator, frequency: f32) {
    with_mut(osc, (), |o| o.0.set_frequency(frequency));
}

#[no_mangle]
pub extern "C" fn mae_oscillator_get_frequency(osc: *const MaeOscillator) -> f32 {
    with(osc, 0.0, |o| o.0.frequency())
}

/// Stored only; the output is not scaled by it.
#[no_mangle]
pub extern "C" fn mae_oscillator_set_amplitude(osc: *mut MaeOscillator, amplitude: f32) {
    with_mut(osc, (), |o| o.0.set_amplitude(amplitude));
}

#[no_mangle]
pub extern "C" fn mae_oscillator_get_amplitude(osc: *const MaeOscillator) -> f32 {
    with(osc, 0.0, |o| o.0.amplitude())
}

#[no_mangle]
pub extern "C" fn mae_oscillator_set_phase(osc: *mut MaeOscillator, phase: f32) {
    with_mut(osc, (), |o| o.0.set_phase(phase));
}

#[no_mangle]
pub extern "C" fn mae_oscillator_get_phase(osc: *const MaeOscillator) -> f32 {
    with(osc, 0.0, |o| o.0.phase())
}

/// Next sample; advances the phase.
#[no_mangle]
pub extern "C" fn mae_oscillator_get_value(osc: *mut MaeOscillator) -> f32 {
    with_mut(osc, 0.0, |o| o.0.value())
}

#[no_mangle]
pub extern "C" fn mae_oscillator_get_value_at_phase(osc: *const MaeOscillator, phase: f32) -> f32 {
    with(osc, 0.0, |o| o.0.value_at_phase(phase))
}

#[no_mangle]
pub extern "C" fn mae_oscillator_get_modulated_value(osc: *mut MaeOscillator, phase_offset: f32) -> f32 {
    with_mut(osc, 0.0, |o| o.0.modulated_value(phase_offset))
}

// --- Wave table ------------------------------------------------------------------

/// Opaque wave table handle.
///
/// Custom tables read straight from the caller's buffer, which must stay
/// valid and unmodified until the table is destroyed.
pub struct MaeWaveTable(WaveTable<'static>);

/// `data` is only read for `MAE_WAVE_TABLE_CUSTOM`; built-in kinds ignore it.
#[no_mangle]
pub extern "C" fn mae_wave_table_create(kind: c_int, data: *const f32, sample_count: u64) -> *mut MaeWaveTable {
    let (Some(kind), Ok(sample_count)) = (wave_table_kind(kind), usize::try_from(sample_count)) else {
        return std::ptr::null_mut();
    };
    let data: Option<&'static [f32]> = match kind {
        WaveTableKind::Custom if !data.is_null() => Some(unsafe { std::slice::from_raw_parts(data, sample_count) }),
        _ => None,
    };
    match WaveTable::new(&WaveTableConfig::new(kind, data, sample_count)) {
        Ok(t) => into_handle(MaeWaveTable(t)),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn mae_wave_table_destroy(table: *mut MaeWaveTable) {
    destroy(table);
}

/// Zero the phase.
#[no_mangle]
pub extern "C" fn mae_wave_table_reset(table: *mut MaeWaveTable) {
    with_mut(table, (), |t| t.0.reset());
}

#[no_mangle]
pub extern "C" fn mae_wave_table_get_sample(table: *mut MaeWaveTable, frequency: f32, sample_rate: f32) -> f32 {
    with_mut(table, 0.0, |t| t.0.sample(frequency, sample_rate))
}

#[no_mangle]
pub extern "C" fn mae_wave_table_get_sample_at_phase(table: *const MaeWaveTable, phase: f32) -> f32 {
    with(table, 0.0, |t| t.0.sample_at_phase(phase))
}

// --- Procedural wave -------------------------------------------------------------

/// Fills `frames_out` with `frame_count × channels` interleaved floats.
pub type MaeWaveformProc = extern "C" fn(user_data: *mut c_void, frames_out: *mut f32, frame_count: u64, channels: u32);

type BoxedProc = Box<dyn FnMut(&mut [f32], u64, u32)>;

/// Opaque procedural source handle.
pub struct MaeProceduralWave(ProceduralWave<BoxedProc>);

/// Create a procedural f32 source. `user_data` is passed back to `callback`
/// untouched on every read.
#[no_mangle]
pub extern "C" fn mae_procedural_wave_create(
    channels: u32,
    sample_rate: u32,
    callback: Option<MaeWaveformProc>,
    user_data: *mut c_void,
) -> *mut MaeProceduralWave {
    let Some(callback) = callback else {
        return std::ptr::null_mut();
    };
    let proc: BoxedProc = Box::new(move |out: &mut [f32], frame_count: u64, ch: u32| {
        callback(user_data, out.as_mut_ptr(), frame_count, ch);
    });
    match ProceduralWave::new(ProceduralWaveConfig::new(SampleFormat::F32, channels, sample_rate, proc)) {
        Ok(w) => into_handle(MaeProceduralWave(w)),
        Err(_) => std::ptr::null_mut(),
    }
}

#[no_mangle]
pub extern "C" fn mae_procedural_wave_destroy(wave: *mut MaeProceduralWave) {
    destroy(wave);
}

/// Read `frame_count` frames into `frames_out`, which must hold
/// `frame_count × channels` floats. `frames_read` may be null.
///
/// A null `frames_out` skips the callback but still reports `frame_count`
/// frames read, so hosts can advance past a block without rendering it.
#[no_mangle]
pub extern "C" fn mae_procedural_wave_read_pcm_frames(
    wave: *mut MaeProceduralWave,
    frames_out: *mut f32,
    frame_count: u64,
    frames_read: *mut u64,
) -> c_int {
    if let Some(n) = unsafe { frames_read.as_mut() } {
        *n = 0;
    }
    if frames_out.is_null() {
        if frame_count == 0 || wave.is_null() {
            return MAE_INVALID_ARGS;
        }
        if let Some(n) = unsafe { frames_read.as_mut() } {
            *n = frame_count;
        }
        return MAE_SUCCESS;
    }
    with_mut(wave, MAE_INVALID_ARGS, |w| {
        let Some(len) = usize::try_from(frame_count)
            .ok()
            .and_then(|f| f.checked_mul(w.0.channels() as usize))
        else {
            return MAE_INVALID_ARGS;
        };
        let out = unsafe { std::slice::from_raw_parts_mut(frames_out, len) };
        match w.0.read_pcm_frames(out, frame_count) {
            Ok(read) => {
                if let Some(n) = unsafe { frames_read.as_mut() } {
                    *n = read;
                }
                MAE_SUCCESS
            }
            Err(e) => result_code(&e),
        }
    })
}

/// Procedural sources have no position; always `MAE_NOT_IMPLEMENTED` for a
/// valid handle.
#[no_mangle]
pub extern "C" fn mae_procedural_wave_seek_to_pcm_frame(wave: *mut MaeProceduralWave, frame_index: u64) -> c_int {
    with_mut(wave, MAE_INVALID_ARGS, |w| match w.0.seek_to_pcm_frame(frame_index) {
        Ok(()) => MAE_SUCCESS,
        Err(e) => result_code(&e),
    })
}
