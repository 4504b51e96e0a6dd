//! Second-order IIR ("biquad") filter with cookbook coefficient designs.
//!
//! Seven responses: lowpass, highpass, bandpass, notch, low shelf, high shelf
//! and peaking EQ. Coefficients follow the EarLevel / RBJ bilinear designs with
//! the usual prewarp
//!
//! ```text
//! k = tan(π · f / fs)
//! v = 10^(|gain_db| / 20)
//! ```
//!
//! and are processed in transposed direct form II:
//!
//! ```text
//! y   = x·a0 + z1
//! z1' = x·a1 + z2 − b1·y
//! z2' = x·a2 − b2·y
//! ```
//!
//! Shelf and peak designs have separate boost (`gain_db >= 0`) and cut
//! formula sets; 0 dB takes the boost branch.

use core::f32::consts::PI;

use tracing::{debug, warn};

use crate::dsp::{self, SQRT_2};
use crate::error::{Error, Result};

/// Gain used by shelf/peak designs when the config does not specify one.
pub const DEFAULT_GAIN_DB: f32 = 6.0;

/// Filter response.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum FilterKind {
    #[default]
    Lowpass,
    Highpass,
    Bandpass,
    LowShelf,
    HighShelf,
    Peak,
    Notch,
}

impl FilterKind {
    pub const ALL: [FilterKind; 7] = [
        FilterKind::Lowpass,
        FilterKind::Highpass,
        FilterKind::Bandpass,
        FilterKind::LowShelf,
        FilterKind::HighShelf,
        FilterKind::Peak,
        FilterKind::Notch,
    ];

    /// Whether `gain_db` affects this response.
    #[inline]
    pub fn uses_gain(self) -> bool {
        matches!(self, FilterKind::LowShelf | FilterKind::HighShelf | FilterKind::Peak)
    }
}

/// Construction parameters for [`BiquadFilter`].
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FilterConfig {
    pub kind: FilterKind,
    /// Hz, must be > 0.
    pub sample_rate: u32,
    /// Cutoff/center in Hz; `0 < frequency` and `sample_rate >= 2 · frequency`.
    pub frequency: f32,
    /// Quality factor, must be > 0.
    pub q: f32,
    /// Shelf/peak gain. `None` selects [`DEFAULT_GAIN_DB`]; `Some` is used as is,
    /// including cuts and 0 dB.
    #[cfg_attr(feature = "serde", serde(default))]
    pub gain_db: Option<f32>,
}

impl FilterConfig {
    pub fn new(kind: FilterKind, sample_rate: u32, frequency: f32, q: f32) -> Self {
        Self { kind, sample_rate, frequency, q, gain_db: None }
    }

    pub fn with_gain_db(mut self, gain_db: f32) -> Self {
        self.gain_db = Some(gain_db);
        self
    }

    fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(Error::InvalidArgument("sample rate must be > 0"));
        }
        if !(self.frequency > 0.0) || !self.frequency.is_finite() {
            return Err(Error::InvalidArgument("frequency must be > 0"));
        }
        if !nyquist_ok(self.sample_rate, self.frequency) {
            return Err(Error::InvalidArgument("sample rate must be >= 2 * frequency"));
        }
        if !(self.q > 0.0) || !self.q.is_finite() {
            return Err(Error::InvalidArgument("q must be > 0"));
        }
        if let Some(g) = self.gain_db {
            if !g.is_finite() {
                return Err(Error::InvalidArgument("gain must be finite"));
            }
        }
        Ok(())
    }
}

#[inline]
fn nyquist_ok(sample_rate: u32, frequency: f32) -> bool {
    sample_rate as f32 >= frequency * 2.0
}

/// Snapshot of the five normalized coefficients.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Coefficients {
    pub a0: f32,
    pub a1: f32,
    pub a2: f32,
    pub b1: f32,
    pub b2: f32,
}

impl Coefficients {
    /// Magnitude of the response at DC: `H(1)`.
    pub fn dc_gain(&self) -> f32 {
        (self.a0 + self.a1 + self.a2) / (1.0 + self.b1 + self.b2)
    }

    /// Magnitude of the response at Nyquist: `|H(-1)|`.
    pub fn nyquist_gain(&self) -> f32 {
        ((self.a0 - self.a1 + self.a2) / (1.0 - self.b1 + self.b2)).abs()
    }

    fn design(kind: FilterKind, sample_rate: u32, frequency: f32, q: f32, gain_db: f32) -> Self {
        let k = dsp::tan(PI * frequency / sample_rate as f32);
        let kk = k * k;
        match kind {
            FilterKind::Lowpass => {
                let norm = 1.0 / (1.0 + k / q + kk);
                let a0 = kk * norm;
                Self {
                    a0,
                    a1: 2.0 * a0,
                    a2: a0,
                    b1: 2.0 * (kk - 1.0) * norm,
                    b2: (1.0 - k / q + kk) * norm,
                }
            }
            FilterKind::Highpass => {
                let norm = 1.0 / (1.0 + k / q + kk);
                let a0 = norm;
                Self {
                    a0,
                    a1: -2.0 * a0,
                    a2: a0,
                    b1: 2.0 * (kk - 1.0) * norm,
                    b2: (1.0 - k / q + kk) * norm,
                }
            }
            FilterKind::Bandpass => {
                let norm = 1.0 / (1.0 + k / q + kk);
                let a0 = k / q * norm;
                Self {
                    a0,
                    a1: 0.0,
                    a2: -a0,
                    b1: 2.0 * (kk - 1.0) * norm,
                    b2: (1.0 - k / q + kk) * norm,
                }
            }
            FilterKind::Notch => {
                let norm = 1.0 / (1.0 + k / q + kk);
                let a0 = (1.0 + kk) * norm;
                let a1 = 2.0 * (kk - 1.0) * norm;
                Self {
                    a0,
                    a1,
                    a2: a0,
                    b1: a1,
                    b2: (1.0 - k / q + kk) * norm,
                }
            }
            FilterKind::LowShelf => {
                let v = dsp::db_to_lin(gain_db.abs());
                let sv = dsp::sqrt(2.0 * v) * k;
                if gain_db >= 0.0 {
                    let norm = 1.0 / (1.0 + SQRT_2 * k + kk);
                    Self {
                        a0: (1.0 + sv + v * kk) * norm,
                        a1: 2.0 * (v * kk - 1.0) * norm,
                        a2: (1.0 - sv + v * kk) * norm,
                        b1: 2.0 * (kk - 1.0) * norm,
                        b2: (1.0 - SQRT_2 * k + kk) * norm,
                    }
                } else {
                    let norm = 1.0 / (1.0 + sv + v * kk);
                    Self {
                        a0: (1.0 + SQRT_2 * k + kk) * norm,
                        a1: 2.0 * (kk - 1.0) * norm,
                        a2: (1.0 - SQRT_2 * k + kk) * norm,
                        b1: 2.0 * (v * kk - 1.0) * norm,
                        b2: (1.0 - sv + v * kk) * norm,
                    }
                }
            }
            FilterKind::HighShelf => {
                let v = dsp::db_to_lin(gain_db.abs());
                let sv = dsp::sqrt(2.0 * v) * k;
                if gain_db >= 0.0 {
                    let norm = 1.0 / (1.0 + SQRT_2 * k + kk);
                    Self {
                        a0: (v + sv + kk) * norm,
                        a1: 2.0 * (kk - v) * norm,
                        a2: (v - sv + kk) * norm,
                        b1: 2.0 * (kk - 1.0) * norm,
                        b2: (1.0 - SQRT_2 * k + kk) * norm,
                    }
                } else {
                    let norm = 1.0 / (v + sv + kk);
                    Self {
                        a0: (1.0 + SQRT_2 * k + kk) * norm,
                        a1: 2.0 * (kk - 1.0) * norm,
                        a2: (1.0 - SQRT_2 * k + kk) * norm,
                        b1: 2.0 * (kk - v) * norm,
                        b2: (v - sv + kk) * norm,
                    }
                }
            }
            FilterKind::Peak => {
                let v = dsp::db_to_lin(gain_db.abs());
                if gain_db >= 0.0 {
                    let norm = 1.0 / (1.0 + k / q + kk);
                    let a1 = 2.0 * (kk - 1.0) * norm;
                    Self {
                        a0: (1.0 + v / q * k + kk) * norm,
                        a1,
                        a2: (1.0 - v / q * k + kk) * norm,
                        b1: a1,
                        b2: (1.0 - k / q + kk) * norm,
                    }
                } else {
                    let norm = 1.0 / (1.0 + v / q * k + kk);
                    let a1 = 2.0 * (kk - 1.0) * norm;
                    Self {
                        a0: (1.0 + k / q + kk) * norm,
                        a1,
                        a2: (1.0 - k / q + kk) * norm,
                        b1: a1,
                        b2: (1.0 - v / q * k + kk) * norm,
                    }
                }
            }
        }
    }
}

/// Stateful biquad. Coefficients are recomputed by every setter, so processing
/// never sees values that disagree with the current kind/frequency/Q/gain.
#[derive(Copy, Clone, Debug)]
pub struct BiquadFilter {
    kind: FilterKind,
    sample_rate: u32,
    frequency: f32,
    q: f32,
    gain_db: f32,
    c: Coefficients,
    z1: f32,
    z2: f32,
}

impl BiquadFilter {
    /// Validate `config` and design the initial coefficients. State starts at zero.
    pub fn new(config: &FilterConfig) -> Result<Self> {
        if let Err(e) = config.validate() {
            warn!(?config, "biquad: rejected config: {e}");
            return Err(e);
        }
        let mut f = Self {
            kind: config.kind,
            sample_rate: config.sample_rate,
            frequency: config.frequency,
            q: config.q,
            gain_db: config.gain_db.unwrap_or(DEFAULT_GAIN_DB),
            c: Coefficients::default(),
            z1: 0.0,
            z2: 0.0,
        };
        f.recalc();
        Ok(f)
    }

    #[inline]
    fn recalc(&mut self) {
        self.c = Coefficients::design(self.kind, self.sample_rate, self.frequency, self.q, self.gain_db);
    }

    pub fn set_kind(&mut self, kind: FilterKind) {
        self.kind = kind;
        self.recalc();
    }

    /// Change the cutoff/center frequency.
    ///
    /// Frequencies above Nyquist are rejected with
    /// [`Error::ConstraintViolation`] and the previous frequency is kept.
    pub fn set_frequency(&mut self, frequency: f32) -> Result<()> {
        if !(frequency > 0.0) || !frequency.is_finite() {
            warn!(frequency, "biquad: frequency must be > 0");
            return Err(Error::InvalidArgument("frequency must be > 0"));
        }
        if !nyquist_ok(self.sample_rate, frequency) {
            warn!(frequency, sample_rate = self.sample_rate, "biquad: sample rate has to be >= 2 * frequency");
            return Err(Error::ConstraintViolation("sample rate must be >= 2 * frequency"));
        }
        self.frequency = frequency;
        self.recalc();
        Ok(())
    }

    pub fn set_q(&mut self, q: f32) -> Result<()> {
        if !(q > 0.0) || !q.is_finite() {
            warn!(q, "biquad: q must be > 0");
            return Err(Error::InvalidArgument("q must be > 0"));
        }
        self.q = q;
        self.recalc();
        Ok(())
    }

    /// Gain for shelf/peak responses. Negative values select the cut designs.
    ///
    /// Non-finite gains are rejected and the previous gain is kept.
    pub fn set_gain_db(&mut self, gain_db: f32) -> Result<()> {
        if !gain_db.is_finite() {
            warn!(gain_db, "biquad: gain must be finite");
            return Err(Error::InvalidArgument("gain must be finite"));
        }
        if !self.kind.uses_gain() {
            debug!(kind = ?self.kind, gain_db, "biquad: gain stored but unused by this response");
        }
        self.gain_db = gain_db;
        self.recalc();
        Ok(())
    }

    #[inline] pub fn kind(&self) -> FilterKind { self.kind }
    #[inline] pub fn sample_rate(&self) -> u32 { self.sample_rate }
    #[inline] pub fn frequency(&self) -> f32 { self.frequency }
    #[inline] pub fn q(&self) -> f32 { self.q }
    #[inline] pub fn gain_db(&self) -> f32 { self.gain_db }
    #[inline] pub fn coefficients(&self) -> Coefficients { self.c }

    /// Clear the two state registers. Coefficients are untouched.
    #[inline]
    pub fn reset(&mut self) {
        self.z1 = 0.0;
        self.z2 = 0.0;
    }

    /// Process one sample.
    #[inline]
    pub fn process_sample(&mut self, x: f32) -> f32 {
        let c = &self.c;
        let y = x * c.a0 + self.z1;
        self.z1 = dsp::kill_denormals(x * c.a1 + self.z2 - c.b1 * y);
        self.z2 = dsp::kill_denormals(x * c.a2 - c.b2 * y);
        y
    }

    /// Filter `input` into `output`.
    ///
    /// Every input sample advances the state. Only the first
    /// `min(input.len(), output.len())` results are written.
    pub fn process_samples(&mut self, input: &[f32], output: &mut [f32]) {
        for (i, &x) in input.iter().enumerate() {
            let y = self.process_sample(x);
            if let Some(o) = output.get_mut(i) {
                *o = y;
            }
        }
    }

    pub fn process_in_place(&mut self, buf: &mut [f32]) {
        for s in buf.iter_mut() {
            *s = self.process_sample(*s);
        }
    }
}

// ------------------------------------ Tests --------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 44_100;

    fn filter(kind: FilterKind) -> BiquadFilter {
        BiquadFilter::new(&FilterConfig::new(kind, SR, 1000.0, 0.707)).unwrap()
    }

    #[test]
    fn rejects_invalid_configs() {
        let ok = FilterConfig::new(FilterKind::Lowpass, SR, 1000.0, 0.707);
        assert!(BiquadFilter::new(&ok).is_ok());

        let bad = [
            FilterConfig { sample_rate: 0, ..ok },
            FilterConfig { frequency: 0.0, ..ok },
            FilterConfig { frequency: -10.0, ..ok },
            FilterConfig { frequency: 30_000.0, ..ok },
            FilterConfig { q: 0.0, ..ok },
            FilterConfig { q: -1.0, ..ok },
        ];
        for cfg in bad {
            assert!(
                matches!(BiquadFilter::new(&cfg), Err(Error::InvalidArgument(_))),
                "cfg={:?}",
                cfg
            );
        }
        // exactly Nyquist is allowed
        assert!(BiquadFilter::new(&FilterConfig { frequency: 22_050.0, ..ok }).is_ok());
    }

    #[test]
    fn lowpass_impulse_matches_cookbook() {
        let mut f = filter(FilterKind::Lowpass);
        let k = (PI * 1000.0 / SR as f32).tan();
        let norm = 1.0 / (1.0 + k / 0.707 + k * k);
        let a0 = k * k * norm;
        assert!((f.coefficients().a0 - a0).abs() < 1e-7, "a0={} want {}", f.coefficients().a0, a0);

        let first = f.process_sample(1.0);
        assert!((first - a0).abs() < 1e-7);

        let mut peak_tail = 0.0f32;
        for i in 0..20_000 {
            let y = f.process_sample(0.0);
            if i > 10_000 {
                peak_tail = peak_tail.max(y.abs());
            }
        }
        assert!(peak_tail < 1e-6, "impulse response not decaying: {}", peak_tail);
    }

    #[test]
    fn every_kind_is_stable() {
        for kind in FilterKind::ALL {
            for gain in [None, Some(-12.0), Some(0.0), Some(12.0)] {
                let mut cfg = FilterConfig::new(kind, SR, 2500.0, 1.5);
                cfg.gain_db = gain;
                let mut f = BiquadFilter::new(&cfg).unwrap();
                f.process_sample(1.0);
                let mut y = 1.0;
                for _ in 0..44_100 {
                    y = f.process_sample(0.0);
                }
                assert!(y.abs() < 1e-5, "{:?} gain={:?} y={}", kind, gain, y);
            }
        }
    }

    #[test]
    fn process_sample_is_deterministic() {
        let mut a = filter(FilterKind::Peak);
        a.process_sample(0.3);
        a.process_sample(-0.8);
        let mut b = a;
        let ya = a.process_sample(0.5);
        let yb = b.process_sample(0.5);
        assert_eq!(ya.to_bits(), yb.to_bits());
        assert_eq!(a.z1.to_bits(), b.z1.to_bits());
        assert_eq!(a.z2.to_bits(), b.z2.to_bits());
    }

    #[test]
    fn dc_and_nyquist_responses() {
        let lp = filter(FilterKind::Lowpass).coefficients();
        assert!((lp.dc_gain() - 1.0).abs() < 1e-4);
        assert!(lp.nyquist_gain() < 1e-4);

        let hp = filter(FilterKind::Highpass).coefficients();
        assert!(hp.dc_gain().abs() < 1e-6);
        assert!((hp.nyquist_gain() - 1.0).abs() < 1e-4);

        let bp = filter(FilterKind::Bandpass).coefficients();
        assert!(bp.dc_gain().abs() < 1e-6);

        let notch = filter(FilterKind::Notch).coefficients();
        assert!((notch.dc_gain() - 1.0).abs() < 1e-4);
    }

    #[test]
    fn shelves_boost_and_cut() {
        let v = dsp::db_to_lin(6.0);
        let cfg = FilterConfig::new(FilterKind::LowShelf, SR, 500.0, 0.707);

        let boost = BiquadFilter::new(&cfg.with_gain_db(6.0)).unwrap().coefficients();
        assert!((boost.dc_gain() - v).abs() < 1e-3, "dc={}", boost.dc_gain());
        assert!((boost.nyquist_gain() - 1.0).abs() < 1e-3);

        let cut = BiquadFilter::new(&cfg.with_gain_db(-6.0)).unwrap().coefficients();
        assert!((cut.dc_gain() - 1.0 / v).abs() < 1e-3, "dc={}", cut.dc_gain());

        let hs = FilterConfig::new(FilterKind::HighShelf, SR, 5000.0, 0.707);
        let boost = BiquadFilter::new(&hs.with_gain_db(6.0)).unwrap().coefficients();
        assert!((boost.nyquist_gain() - v).abs() < 1e-3, "ny={}", boost.nyquist_gain());
        assert!((boost.dc_gain() - 1.0).abs() < 1e-3);
        let cut = BiquadFilter::new(&hs.with_gain_db(-6.0)).unwrap().coefficients();
        assert!((cut.nyquist_gain() - 1.0 / v).abs() < 1e-3);

        let peak = BiquadFilter::new(&FilterConfig::new(FilterKind::Peak, SR, 1000.0, 1.0).with_gain_db(-9.0))
            .unwrap()
            .coefficients();
        assert!((peak.dc_gain() - 1.0).abs() < 1e-3);
    }

    #[test]
    fn zero_db_shelf_is_transparent() {
        let cfg = FilterConfig::new(FilterKind::LowShelf, SR, 800.0, 0.707).with_gain_db(0.0);
        let mut f = BiquadFilter::new(&cfg).unwrap();
        assert_eq!(f.gain_db(), 0.0);
        for (i, x) in [0.5f32, -0.25, 1.0, 0.0, 0.75].into_iter().enumerate() {
            let y = f.process_sample(x);
            assert!((y - x).abs() < 1e-5, "i={} x={} y={}", i, x, y);
        }
    }

    #[test]
    fn gain_defaults_only_when_unset() {
        let cfg = FilterConfig::new(FilterKind::Peak, SR, 1000.0, 1.0);
        assert_eq!(BiquadFilter::new(&cfg).unwrap().gain_db(), DEFAULT_GAIN_DB);
        assert_eq!(BiquadFilter::new(&cfg.with_gain_db(-3.0)).unwrap().gain_db(), -3.0);
    }

    #[test]
    fn frequency_setter_keeps_previous_on_violation() {
        let mut f = filter(FilterKind::Lowpass);
        let before = f.coefficients();
        assert!(matches!(f.set_frequency(30_000.0), Err(Error::ConstraintViolation(_))));
        assert!(matches!(f.set_frequency(0.0), Err(Error::InvalidArgument(_))));
        assert_eq!(f.frequency(), 1000.0);
        assert_eq!(f.coefficients(), before);

        f.set_frequency(2000.0).unwrap();
        assert_eq!(f.frequency(), 2000.0);
        assert_ne!(f.coefficients(), before);
    }

    #[test]
    fn setters_recompute_coefficients() {
        let mut f = filter(FilterKind::Lowpass);
        let lp = f.coefficients();
        f.set_kind(FilterKind::Highpass);
        assert_eq!(f.coefficients(), filter(FilterKind::Highpass).coefficients());
        assert_ne!(f.coefficients(), lp);

        assert!(f.set_q(0.0).is_err());
        assert_eq!(f.q(), 0.707);
        f.set_q(2.0).unwrap();
        assert_eq!(f.q(), 2.0);

        f.set_kind(FilterKind::Peak);
        let before = f.coefficients();
        f.set_gain_db(-12.0).unwrap();
        assert_ne!(f.coefficients(), before);
    }

    #[test]
    fn non_finite_gain_is_rejected() {
        let ok = FilterConfig::new(FilterKind::Peak, SR, 1000.0, 1.0);
        for g in [f32::NAN, f32::INFINITY, f32::NEG_INFINITY] {
            assert!(matches!(BiquadFilter::new(&ok.with_gain_db(g)), Err(Error::InvalidArgument(_))), "gain={}", g);
        }
        assert!(matches!(
            BiquadFilter::new(&FilterConfig { q: f32::INFINITY, ..ok }),
            Err(Error::InvalidArgument(_))
        ));

        let mut f = BiquadFilter::new(&FilterConfig::new(FilterKind::LowShelf, SR, 1000.0, 1.0).with_gain_db(3.0)).unwrap();
        let before = f.coefficients();
        assert!(matches!(f.set_gain_db(f32::NAN), Err(Error::InvalidArgument(_))));
        assert!(matches!(f.set_gain_db(f32::INFINITY), Err(Error::InvalidArgument(_))));
        assert_eq!(f.gain_db(), 3.0);
        assert_eq!(f.coefficients(), before);
        for i in 0..64 {
            let y = f.process_sample(if i == 0 { 1.0 } else { 0.0 });
            assert!(y.is_finite(), "i={} y={}", i, y);
        }
    }

    #[test]
    fn only_shelf_and_peak_use_gain() {
        let gained: Vec<_> = FilterKind::ALL.iter().copied().filter(|k| k.uses_gain()).collect();
        assert_eq!(gained, [FilterKind::LowShelf, FilterKind::HighShelf, FilterKind::Peak]);
        // gain has no effect on the other responses
        for kind in FilterKind::ALL.into_iter().filter(|k| !k.uses_gain()) {
            let cfg = FilterConfig::new(kind, SR, 1000.0, 0.707);
            let a = BiquadFilter::new(&cfg.with_gain_db(-9.0)).unwrap().coefficients();
            let b = BiquadFilter::new(&cfg.with_gain_db(9.0)).unwrap().coefficients();
            assert_eq!(a, b, "{:?}", kind);
        }
    }

    #[test]
    fn decayed_state_flushes_to_zero() {
        let mut f = filter(FilterKind::Lowpass);
        f.process_sample(1.0);
        for _ in 0..20_000 {
            f.process_sample(0.0);
        }
        assert_eq!((f.z1, f.z2), (0.0, 0.0));
    }

    #[test]
    fn short_output_still_advances_state() {
        let input = [1.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let mut full = [0.0f32; 6];
        let mut a = filter(FilterKind::Lowpass);
        a.process_samples(&input, &mut full);

        let mut short = [0.0f32; 2];
        let mut b = filter(FilterKind::Lowpass);
        b.process_samples(&input, &mut short);
        assert_eq!(short, [full[0], full[1]]);

        // both filters consumed six samples, so the next output agrees
        assert_eq!(a.process_sample(0.0).to_bits(), b.process_sample(0.0).to_bits());
    }

    #[test]
    fn reset_clears_state_only() {
        let mut f = filter(FilterKind::Bandpass);
        let c = f.coefficients();
        f.process_sample(1.0);
        f.reset();
        assert_eq!(f.coefficients(), c);
        assert_eq!(f.process_sample(0.0), 0.0);
    }
}
