//! Math backend and small numeric helpers shared by the filters and generators.
//!
//! Features used by this file:
//! - `fast-math` : polynomial sine / tan approximations for hot paths
//! - `libm`      : route transcendental functions through `libm`
//! - `micromath` : route transcendental functions through `micromath`
//!
//! Phase is always expressed in **radians** in this crate; one cycle is [`TAU`].

#![allow(clippy::excessive_precision)]

use core::f32::consts::PI;

use cfg_if::cfg_if;

// ----------------------------- Math backend selection -----------------------------

cfg_if! {
    if #[cfg(feature = "micromath")] {
        #[inline] pub(crate) fn m_sin(x: f32) -> f32 { micromath::F32Ext::sin(x) }
        #[inline] pub(crate) fn m_tan(x: f32) -> f32 { micromath::F32Ext::tan(x) }
        #[inline] pub(crate) fn m_pow(x: f32, y: f32) -> f32 { micromath::F32Ext::powf(x, y) }
        #[inline] pub(crate) fn m_sqrt(x: f32) -> f32 { micromath::F32Ext::sqrt(x) }
    } else if #[cfg(feature = "libm")] {
        #[inline] pub(crate) fn m_sin(x: f32) -> f32 { libm::sinf(x) }
        #[inline] pub(crate) fn m_tan(x: f32) -> f32 { libm::tanf(x) }
        #[inline] pub(crate) fn m_pow(x: f32, y: f32) -> f32 { libm::powf(x, y) }
        #[inline] pub(crate) fn m_sqrt(x: f32) -> f32 { libm::sqrtf(x) }
    } else {
        #[inline] pub(crate) fn m_sin(x: f32) -> f32 { x.sin() }
        #[inline] pub(crate) fn m_tan(x: f32) -> f32 { x.tan() }
        #[inline] pub(crate) fn m_pow(x: f32, y: f32) -> f32 { x.powf(y) }
        #[inline] pub(crate) fn m_sqrt(x: f32) -> f32 { x.sqrt() }
    }
}

// --------------------------------- Constants -------------------------------------

/// One full cycle in radians.
pub const TAU: f32 = 2.0 * PI;

/// Magnitudes below this are flushed to zero by [`kill_denormals`].
pub const EPS_SMALL: f32 = 1.0e-20;

/// √2, used by the shelving filter designs.
pub const SQRT_2: f32 = core::f32::consts::SQRT_2;

// --------------------------------- Utilities -------------------------------------

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Sign as a sample value: `-1`, `0` or `+1`. Zero maps to zero (not `+1`).
#[inline]
pub fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Wrap a phase in radians into `[0, TAU)`.
///
/// Negative inputs wrap upward. Rounding can land exactly on `TAU` for inputs a
/// hair below zero; that case folds back to `0.0`.
#[inline]
pub fn wrap_phase(phase: f32) -> f32 {
    let p = phase.rem_euclid(TAU);
    if p >= TAU { 0.0 } else { p }
}

/// Radians advanced per sample for a tone of `freq_hz` at `sample_rate`.
#[inline]
pub fn phase_increment(freq_hz: f32, sample_rate: f32) -> f32 {
    TAU * freq_hz / sample_rate
}

/// Flush denormal/subnormal values to zero.
#[inline]
pub fn kill_denormals(x: f32) -> f32 {
    if x.abs() < EPS_SMALL { 0.0 } else { x }
}

/// Decibels to linear amplitude: `10^(db/20)`.
#[inline]
pub fn db_to_lin(db: f32) -> f32 {
    m_pow(10.0, db / 20.0)
}

#[inline]
pub fn sqrt(x: f32) -> f32 {
    m_sqrt(x)
}

// --------------------------------- Trig -------------------------------------------

/// Sine through the selected backend, or [`fast_sin`] with `fast-math`.
#[inline]
pub fn sin(x: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            fast_sin(x)
        } else {
            m_sin(x)
        }
    }
}

/// `tan(x)` for the bilinear prewarp `k = tan(π f / fs)`.
#[inline]
pub fn tan(x: f32) -> f32 {
    cfg_if! {
        if #[cfg(feature = "fast-math")] {
            fast_sin(x) / fast_sin(x + 0.5 * PI)
        } else {
            m_tan(x)
        }
    }
}

/// Polynomial sine. Reduces into [-π/2, π/2] by symmetry, then a 7th-order odd
/// polynomial. Max abs error ~2e-4.
#[inline]
pub fn fast_sin(x: f32) -> f32 {
    let k = (x / TAU).round();
    let mut xr = x - k * TAU;
    if xr > 0.5 * PI {
        xr = PI - xr;
    } else if xr < -0.5 * PI {
        xr = -PI - xr;
    }
    let x2 = xr * xr;
    xr * (1.0 + x2 * (-1.0 / 6.0 + x2 * (1.0 / 120.0 + x2 * (-1.0 / 5040.0))))
}

// --------------------------------- Tests ------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_phase_stays_in_range() {
        for p in [-100.0, -TAU, -0.1, 0.0, 0.5, TAU - 1e-6, TAU, 3.0 * TAU + 0.25, 1.0e4] {
            let w = wrap_phase(p);
            assert!((0.0..TAU).contains(&w), "p={} w={}", p, w);
        }
        assert!((wrap_phase(TAU + 1.0) - 1.0).abs() < 1e-5);
        assert!((wrap_phase(-1.0) - (TAU - 1.0)).abs() < 1e-5);
    }

    #[test]
    fn sign_has_three_states() {
        assert_eq!(sign(2.0), 1.0);
        assert_eq!(sign(-0.001), -1.0);
        assert_eq!(sign(0.0), 0.0);
    }

    #[test]
    fn db_to_lin_known_points() {
        assert!((db_to_lin(0.0) - 1.0).abs() < 1e-6);
        assert!((db_to_lin(20.0) - 10.0).abs() < 1e-4);
        assert!((db_to_lin(-6.0) - 0.501_187).abs() < 1e-4);
    }

    #[test]
    fn fast_sin_is_close() {
        let mut x = -10.0f32;
        while x < 10.0 {
            assert!((fast_sin(x) - x.sin()).abs() < 2e-3, "x={}", x);
            x += 0.01;
        }
    }

    #[test]
    fn phase_increment_matches_definition() {
        let inc = phase_increment(441.0, 44_100.0);
        assert!((inc - TAU / 100.0).abs() < 1e-7);
    }
}
