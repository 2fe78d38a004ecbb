//! Spectral Peak Detector
//!
//! Finds local maxima in a magnitude spectrum and reports them as
//! (position, magnitude) pairs, where position is the bin index mapped onto
//! `[0, range]` (for a half-spectrum with `range = Nyquist`, position is the
//! frequency in Hz).
//!
//! ## Scan
//!
//! ```text
//!  mag                      plateau
//!   ^        peak            _____
//!   |         /\            /     \        rising edge
//!   |   /\   /  \          /       \          /
//!   |  /  \_/    \________/         \________/
//!   +--|--------------------------------------|-> bin
//!    min_position                        last bin
//! ```
//!
//! - Local maxima are refined with a parabola through the three bins around
//!   the maximum (sub-bin position and magnitude).
//! - A flat plateau reports its centre bin and the plateau value.
//! - The first searched bin and the last bin are peaks when they fall
//!   towards the interior.
//! - Only values strictly above the threshold qualify; the scan stops at
//!   the first peak beyond `max_position`.
//!
//! ## Example
//!
//! ```rust
//! use sinetrack_core::peak_detector::{PeakDetectorConfig, PeakOrder, SpectralPeakDetector};
//!
//! let detector = SpectralPeakDetector::new(PeakDetectorConfig {
//!     range: 8.0,
//!     max_position: 8.0,
//!     order: PeakOrder::Amplitude,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let spectrum = vec![0.0, 0.1, 0.5, 0.1, 0.0, 0.2, 0.9, 0.2, 0.0];
//! let peaks = detector.detect(&spectrum).unwrap();
//! assert_eq!(peaks.len(), 2);
//! assert_eq!(peaks[0].index, 6); // strongest first
//! assert!((peaks[0].position - 6.0).abs() < 1e-10);
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{SineModelError, SineResult};

/// Detected peak information.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakInfo {
    /// Integer bin the peak was found at
    pub index: usize,
    /// Refined (sub-bin) index
    pub fractional_index: f64,
    /// Refined index mapped to `[0, range]`
    pub position: f64,
    /// Peak magnitude (interpolated when refinement is enabled)
    pub magnitude: f64,
}

/// Ordering of the detector output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeakOrder {
    /// Descending magnitude; equal magnitudes by ascending position
    Amplitude,
    /// Ascending position, chosen among the `max_peaks` strongest
    #[default]
    Position,
}

/// Peak detector configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeakDetectorConfig {
    /// Position assigned to the last bin
    pub range: f64,
    /// Maximum number of peaks returned
    pub max_peaks: usize,
    /// Lowest position searched
    pub min_position: f64,
    /// Highest position reported
    pub max_position: f64,
    /// Peaks must be strictly above this value
    pub threshold: f64,
    /// Parabolic refinement of position and magnitude
    pub interpolate: bool,
    /// Output ordering
    pub order: PeakOrder,
}

impl Default for PeakDetectorConfig {
    fn default() -> Self {
        Self {
            range: 1.0,
            max_peaks: 100,
            min_position: 0.0,
            max_position: 1.0,
            threshold: -1e6,
            interpolate: true,
            order: PeakOrder::Position,
        }
    }
}

/// Spectral peak detector.
#[derive(Debug, Clone)]
pub struct SpectralPeakDetector {
    config: PeakDetectorConfig,
}

impl SpectralPeakDetector {
    /// Create a detector, rejecting inconsistent search bounds.
    pub fn new(config: PeakDetectorConfig) -> SineResult<Self> {
        if !(config.range.is_finite() && config.range > 0.0) {
            return Err(SineModelError::InvalidArgument(format!(
                "peak detection range must be positive, got {}",
                config.range
            )));
        }
        if config.max_peaks == 0 {
            return Err(SineModelError::InvalidArgument(
                "max_peaks must be > 0".to_string(),
            ));
        }
        if config.min_position < 0.0 || config.max_position < config.min_position {
            return Err(SineModelError::InvalidArgument(format!(
                "invalid peak search band [{}, {}]",
                config.min_position, config.max_position
            )));
        }
        Ok(Self { config })
    }

    /// Get the configuration.
    pub fn config(&self) -> &PeakDetectorConfig {
        &self.config
    }

    /// Detect peaks in a magnitude array.
    ///
    /// Arrays shorter than two bins, or holding NaN, are rejected.
    pub fn detect(&self, array: &[f64]) -> SineResult<Vec<PeakInfo>> {
        let size = array.len();
        if size < 2 {
            return Err(SineModelError::InvalidArgument(format!(
                "peak detection needs at least 2 bins, got {}",
                size
            )));
        }
        if array.iter().any(|v| v.is_nan()) {
            return Err(SineModelError::InvalidArgument(
                "magnitude array contains NaN".to_string(),
            ));
        }

        let cfg = &self.config;
        let scale = cfg.range / (size - 1) as f64;
        let mut peaks = Vec::new();

        // Round up so the first candidate never sits below min_position
        let mut i = (cfg.min_position / scale).ceil() as usize;

        // A band narrower than one bin can start the scan above max_position
        if i as f64 * scale > cfg.max_position {
            return Ok(peaks);
        }

        if i + 1 < size && array[i] > array[i + 1] && array[i] > cfg.threshold {
            peaks.push(self.raw_peak(i, array[i], scale));
        }

        while i + 1 < size - 1 {
            // Down the slope
            while i + 1 < size - 1 && array[i] >= array[i + 1] {
                i += 1;
            }
            // Up the slope
            while i + 1 < size - 1 && array[i] < array[i + 1] {
                i += 1;
            }
            // Across a plateau
            let mut j = i;
            while j + 1 < size - 1 && array[j] == array[j + 1] {
                j += 1;
            }

            if j + 1 < size - 1 && array[j + 1] < array[j] && array[j] > cfg.threshold {
                let peak = if j != i {
                    let bin = if cfg.interpolate {
                        (i + j) as f64 * 0.5
                    } else {
                        i as f64
                    };
                    PeakInfo {
                        index: i,
                        fractional_index: bin,
                        position: bin * scale,
                        magnitude: array[i],
                    }
                } else {
                    self.refined_peak(array, j, scale)
                };

                if peak.position > cfg.max_position {
                    return Ok(self.finish(peaks));
                }
                peaks.push(peak);
            }

            i = j;
        }

        // The bin just before the last one
        if i == size - 2
            && i >= 1
            && array[i - 1] < array[i]
            && array[i + 1] < array[i]
            && array[i] > cfg.threshold
            && peaks.last().map_or(true, |p| p.index != i)
        {
            let peak = self.refined_peak(array, i, scale);
            if peak.position <= cfg.max_position {
                peaks.push(peak);
            }
        }

        // Rising into the last bin
        let last = size - 1;
        let last_position = last as f64 * scale;
        if last_position <= cfg.max_position
            && last_position >= cfg.min_position
            && array[last] > array[last - 1]
            && array[last] > cfg.threshold
        {
            peaks.push(self.raw_peak(last, array[last], scale));
        }

        Ok(self.finish(peaks))
    }

    fn raw_peak(&self, index: usize, magnitude: f64, scale: f64) -> PeakInfo {
        PeakInfo {
            index,
            fractional_index: index as f64,
            position: index as f64 * scale,
            magnitude,
        }
    }

    fn refined_peak(&self, array: &[f64], j: usize, scale: f64) -> PeakInfo {
        if !self.config.interpolate {
            return self.raw_peak(j, array[j], scale);
        }
        let (l, m, r) = (array[j - 1], array[j], array[j + 1]);
        let delta = parabolic_interpolation(l, m, r);
        let bin = j as f64 + delta;
        PeakInfo {
            index: j,
            fractional_index: bin,
            position: bin * scale,
            magnitude: m - 0.25 * (l - r) * delta,
        }
    }

    /// Keep the strongest `max_peaks` and apply the configured ordering.
    fn finish(&self, mut peaks: Vec<PeakInfo>) -> Vec<PeakInfo> {
        peaks.sort_by(|a, b| {
            b.magnitude
                .total_cmp(&a.magnitude)
                .then(a.position.total_cmp(&b.position))
        });
        peaks.truncate(self.config.max_peaks);

        if self.config.order == PeakOrder::Position {
            peaks.sort_by(|a, b| a.position.total_cmp(&b.position));
        }
        peaks
    }
}

/// Parabolic interpolation to find fractional peak offset.
///
/// Given three consecutive samples (y_minus1, y_0, y_plus1) where y_0 is the
/// peak, returns the fractional offset from the center sample.
fn parabolic_interpolation(y_m1: f64, y_0: f64, y_p1: f64) -> f64 {
    let denom = y_m1 - 2.0 * y_0 + y_p1;
    if denom.abs() < 1e-30 {
        0.0
    } else {
        0.5 * (y_m1 - y_p1) / denom
    }
}
