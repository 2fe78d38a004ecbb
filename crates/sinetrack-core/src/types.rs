//! Core types for sinusoidal model analysis
//!
//! A sinusoidal model describes each short-time spectrum as a small set of
//! stable partials. Every partial is reported per frame as a [`Peak`]:
//!
//! ```text
//!   magnitude
//!      ^
//!      |        * (f=440 Hz, m=1.0, φ=0.3)
//!      |        |
//!      |        |            * (f=880 Hz, m=0.5, φ=-1.2)
//!      |        |            |
//!   ---+--------+------------+--------> frequency (Hz)
//!      0                              Nyquist
//! ```
//!
//! Frequencies are in Hz, magnitudes are linear or dB depending on the
//! configured [`MagnitudeScale`](crate::complex_to_mag_phase::MagnitudeScale),
//! and phases are in radians.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Type alias for complex spectrum bins using f64 precision
pub type Complex = Complex64;

/// Result type for sine model operations
pub type SineResult<T> = Result<T, SineModelError>;

/// Errors that can occur during sine model analysis
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SineModelError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Length mismatch for {what}: expected {expected}, got {actual}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// A single spectral peak: one sinusoid in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Peak {
    /// Frequency in Hz (never negative)
    pub frequency: f64,
    /// Magnitude in the analyzer's configured scale
    pub magnitude: f64,
    /// Phase in radians
    pub phase: f64,
}

impl Peak {
    pub fn new(frequency: f64, magnitude: f64, phase: f64) -> Self {
        Self {
            frequency,
            magnitude,
            phase,
        }
    }

    /// Check the per-frame contract: finite, non-negative frequency, a
    /// magnitude that is not NaN and a finite phase.
    pub fn validate(&self) -> SineResult<()> {
        if !self.frequency.is_finite() || self.frequency < 0.0 {
            return Err(SineModelError::InvalidArgument(format!(
                "peak frequency must be finite and non-negative, got {}",
                self.frequency
            )));
        }
        if self.magnitude.is_nan() {
            return Err(SineModelError::InvalidArgument(
                "peak magnitude is NaN".to_string(),
            ));
        }
        if !self.phase.is_finite() {
            return Err(SineModelError::InvalidArgument(format!(
                "peak phase must be finite, got {}",
                self.phase
            )));
        }
        Ok(())
    }
}

/// Zip three parallel slices into peaks, failing on any length mismatch.
pub fn peaks_from_parts(
    frequencies: &[f64],
    magnitudes: &[f64],
    phases: &[f64],
) -> SineResult<Vec<Peak>> {
    if magnitudes.len() != frequencies.len() {
        return Err(SineModelError::LengthMismatch {
            what: "peak magnitudes",
            expected: frequencies.len(),
            actual: magnitudes.len(),
        });
    }
    if phases.len() != frequencies.len() {
        return Err(SineModelError::LengthMismatch {
            what: "peak phases",
            expected: frequencies.len(),
            actual: phases.len(),
        });
    }

    let peaks: Vec<Peak> = frequencies
        .iter()
        .zip(magnitudes)
        .zip(phases)
        .map(|((&f, &m), &p)| Peak::new(f, m, p))
        .collect();

    for peak in &peaks {
        peak.validate()?;
    }
    Ok(peaks)
}
