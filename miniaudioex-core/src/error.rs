//! Error type shared by the DSP primitives.

use thiserror::Error;

/// Failures reported by filter/oscillator/wave-table construction and setters.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A required value was zero, negative, empty or out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// The value is well formed but violates a constraint of the current
    /// configuration (e.g. above Nyquist). The previous value stays in effect.
    #[error("constraint violated: {0}")]
    ConstraintViolation(&'static str),
}

pub type Result<T> = core::result::Result<T, Error>;
