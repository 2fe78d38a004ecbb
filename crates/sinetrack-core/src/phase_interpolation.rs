//! Phase Interpolation: Sub-bin phase estimates for spectral peaks
//!
//! A peak refined to a fractional bin position sits between two phase bins.
//! Its phase is taken by linear interpolation against the neighbouring bin
//! on the side of the fractional offset:
//!
//! ```text
//!   pos = bin_count · f / nyquist      idx = round(pos)     a = pos - idx
//!
//!   a < 0:   φ = a·phase[idx-1] + (1-a)·phase[idx]
//!   a ≥ 0:   φ = a·phase[idx+1] + (1-a)·phase[idx]
//! ```
//!
//! Interpolating across a 2π wrap produces garbage, so when the two bins
//! differ by more than π the nearest bin's phase is used unchanged. The first
//! and last bins never read outside the array; a peak at or above Nyquist
//! resolves to the last bin.
//!
//! ## Example
//!
//! ```rust
//! use sinetrack_core::phase_interpolation::PhaseInterpolator;
//!
//! // 8 phase bins spanning 0..4 kHz (sample rate 8 kHz): 500 Hz per bin
//! let interp = PhaseInterpolator::new(8000.0).unwrap();
//! let phases = vec![0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7];
//! let out = interp.interpolate(&phases, &[1125.0, 4000.0]).unwrap();
//! assert!((out[0] - (0.25 * 0.3 + 0.75 * 0.2)).abs() < 1e-12);
//! assert_eq!(out[1], 0.7); // Nyquist -> last bin
//! ```

use std::f64::consts::PI;

use crate::types::{SineModelError, SineResult};

/// Per-peak phase interpolator for one analysis configuration.
#[derive(Debug, Clone)]
pub struct PhaseInterpolator {
    /// Frequency mapped to `bin_count` (half the sample rate).
    nyquist: f64,
    /// Maximum adjacent-bin difference that is still interpolated.
    tolerance: f64,
}

impl PhaseInterpolator {
    /// Create an interpolator for the given sample rate.
    pub fn new(sample_rate: f64) -> SineResult<Self> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(SineModelError::InvalidArgument(format!(
                "sample rate must be positive, got {}",
                sample_rate
            )));
        }
        Ok(Self {
            nyquist: sample_rate / 2.0,
            tolerance: PI,
        })
    }

    /// Create with a custom wrap-detection tolerance.
    pub fn with_tolerance(sample_rate: f64, tolerance: f64) -> SineResult<Self> {
        if tolerance.is_nan() || tolerance < 0.0 {
            return Err(SineModelError::InvalidArgument(format!(
                "phase tolerance must be non-negative, got {}",
                tolerance
            )));
        }
        Ok(Self {
            tolerance,
            ..Self::new(sample_rate)?
        })
    }

    pub fn nyquist(&self) -> f64 {
        self.nyquist
    }

    /// Phase per peak frequency, from one frame's phase spectrum.
    pub fn interpolate(&self, phases: &[f64], frequencies: &[f64]) -> SineResult<Vec<f64>> {
        if frequencies.is_empty() {
            return Ok(Vec::new());
        }
        if phases.is_empty() {
            return Err(SineModelError::InvalidArgument(
                "phase spectrum is empty".to_string(),
            ));
        }
        if let Some(&f) = frequencies.iter().find(|f| !f.is_finite() || **f < 0.0) {
            return Err(SineModelError::InvalidArgument(format!(
                "peak frequency must be finite and non-negative, got {}",
                f
            )));
        }

        Ok(frequencies
            .iter()
            .map(|&f| self.interpolate_one(phases, f))
            .collect())
    }

    /// Phase at one frequency. `phases` must be non-empty and `frequency`
    /// non-negative.
    #[inline]
    fn interpolate_one(&self, phases: &[f64], frequency: f64) -> f64 {
        let bin_count = phases.len();
        let last = bin_count - 1;

        let pos = bin_count as f64 * frequency / self.nyquist;
        let idx = ((pos + 0.5).floor() as usize).min(last);
        let a = pos - idx as f64;

        if a < 0.0 && idx > 0 {
            self.blend(phases[idx - 1], phases[idx], a)
        } else if idx < last {
            self.blend(phases[idx + 1], phases[idx], a)
        } else {
            phases[idx]
        }
    }

    #[inline]
    fn blend(&self, neighbor: f64, nearest: f64, a: f64) -> f64 {
        if (neighbor - nearest).abs() > self.tolerance {
            nearest
        } else {
            a * neighbor + (1.0 - a) * nearest
        }
    }
}
