//! ComplexToMagPhase: Polar conversion of complex spectra
//!
//! Converts a complex half-spectrum to paired magnitude and phase arrays in a
//! single pass. Magnitudes feed the peak detector, phases feed the phase
//! interpolator.
//!
//! ## Example
//!
//! ```rust
//! use sinetrack_core::complex_to_mag_phase::{CartesianToPolar, MagnitudeScale};
//! use num_complex::Complex64;
//!
//! let c2p = CartesianToPolar;
//! let spectrum = vec![Complex64::new(3.0, 4.0)]; // mag=5, phase=atan2(4,3)
//! let mut polar = c2p.process(&spectrum);
//! assert!((polar.magnitudes[0] - 5.0).abs() < 1e-10);
//!
//! MagnitudeScale::Decibels.apply(&mut polar.magnitudes);
//! assert!((polar.magnitudes[0] - 20.0 * 5.0_f64.log10()).abs() < 1e-10);
//! ```

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

/// Floor applied before taking the logarithm of a magnitude.
const MAGNITUDE_EPSILON: f64 = 1e-10;

/// Magnitude and phase arrays of one spectrum, bin-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolarSpectrum {
    /// Bin magnitudes
    pub magnitudes: Vec<f64>,
    /// Bin phases in radians [-π, π]
    pub phases: Vec<f64>,
}

impl PolarSpectrum {
    /// Number of bins.
    pub fn len(&self) -> usize {
        self.magnitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.magnitudes.is_empty()
    }
}

/// Convert complex spectrum bins to (magnitude, phase) arrays.
#[derive(Debug, Clone, Copy)]
pub struct CartesianToPolar;

impl CartesianToPolar {
    /// Process a whole spectrum.
    pub fn process(&self, spectrum: &[Complex64]) -> PolarSpectrum {
        let mut magnitudes = Vec::with_capacity(spectrum.len());
        let mut phases = Vec::with_capacity(spectrum.len());
        for &c in spectrum {
            magnitudes.push(c.norm());
            phases.push(c.arg());
        }
        PolarSpectrum { magnitudes, phases }
    }

    /// Process a single bin.
    #[inline]
    pub fn process_bin(&self, c: Complex64) -> (f64, f64) {
        (c.norm(), c.arg())
    }
}

/// Scale in which peak magnitudes are reported and thresholded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MagnitudeScale {
    /// Linear amplitude
    #[default]
    Linear,
    /// 20·log10(amplitude)
    #[serde(rename = "db", alias = "decibels")]
    Decibels,
}

impl MagnitudeScale {
    /// Convert linear magnitudes to this scale in place.
    pub fn apply(&self, magnitudes: &mut [f64]) {
        if let MagnitudeScale::Decibels = self {
            for m in magnitudes.iter_mut() {
                *m = amplitude_to_db(*m);
            }
        }
    }
}

/// Linear amplitude to dB, floored at `20·log10(1e-10) = -200 dB`.
#[inline]
pub fn amplitude_to_db(amplitude: f64) -> f64 {
    20.0 * amplitude.max(MAGNITUDE_EPSILON).log10()
}
