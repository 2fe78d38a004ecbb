//! Sine Model Analysis: Per-frame sinusoidal parameters with track identity
//!
//! Chains the analysis stages for one session:
//!
//! ```text
//! Complex half-spectrum
//!        │
//!        ▼
//! ┌──────────────────┐   magnitudes   ┌───────────────────────┐
//! │ CartesianToPolar │──────────────▶│ SpectralPeakDetector   │
//! │  (+ dB scaling)  │               │ positions in Hz        │
//! └──────────────────┘               └───────────────────────┘
//!        │ phases                               │ frequencies, magnitudes
//!        ▼                                      ▼
//! ┌──────────────────┐               ┌───────────────────────┐
//! │ PhaseInterpolator│◀──────────────│ peaks                  │
//! └──────────────────┘               └───────────────────────┘
//!        │ per-peak phases
//!        ▼
//! ┌──────────────────┐
//! │   SineTracker    │──▶ SineFrame { frequencies, magnitudes, phases, track_ids }
//! └──────────────────┘
//! ```
//!
//! With tracking enabled, the output lists the live tracks in slot order and
//! `track_ids` are slot indices, stable for as long as a partial lives. With
//! tracking disabled each frame reports its raw peaks in the configured
//! `order_by` order.
//!
//! ## Example
//!
//! ```rust
//! use sinetrack_core::config::SineModelConfig;
//! use sinetrack_core::sine_model::SineModelAnalyzer;
//! use sinetrack_core::spectrum::{SpectrumConfig, SpectrumFramer, Window};
//!
//! let sample_rate = 8000.0;
//! let signal: Vec<f64> = (0..4096)
//!     .map(|n| (2.0 * std::f64::consts::PI * 1000.0 * n as f64 / sample_rate).sin())
//!     .collect();
//!
//! let mut framer = SpectrumFramer::new(SpectrumConfig {
//!     fft_size: 1024,
//!     hop_size: 256,
//!     window: Window::Hann,
//! })
//! .unwrap();
//!
//! let mut analyzer = SineModelAnalyzer::new(SineModelConfig {
//!     sample_rate,
//!     max_frequency: 4000.0,
//!     magnitude_threshold: 0.1,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! let spectra = framer.frames(&signal).collect::<Result<Vec<_>, _>>().unwrap();
//! let frames = analyzer.analyze(&spectra).unwrap();
//! assert_eq!(frames.len(), 13);
//! assert!(frames.iter().all(|f| f.track_ids == vec![0]));
//! assert!((frames[0].frequencies[0] - 1000.0).abs() < 1e-6);
//! ```

use num_complex::Complex64;
use tracing::{debug, warn};

use crate::complex_to_mag_phase::CartesianToPolar;
use crate::config::SineModelConfig;
use crate::peak_detector::SpectralPeakDetector;
use crate::phase_interpolation::PhaseInterpolator;
use crate::sine_tracker::SineTracker;
use crate::types::{Peak, SineResult};

/// Sinusoidal parameters of one analysis frame.
///
/// The four vectors are parallel, one entry per sinusoid present this frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SineFrame {
    /// Frequencies in Hz
    pub frequencies: Vec<f64>,
    /// Magnitudes, linear or dB
    pub magnitudes: Vec<f64>,
    /// Phases in radians
    pub phases: Vec<f64>,
    /// Track slot (tracking on) or peak index (tracking off) per entry
    pub track_ids: Vec<usize>,
}

impl SineFrame {
    fn with_capacity(n: usize) -> Self {
        Self {
            frequencies: Vec::with_capacity(n),
            magnitudes: Vec::with_capacity(n),
            phases: Vec::with_capacity(n),
            track_ids: Vec::with_capacity(n),
        }
    }

    fn push(&mut self, id: usize, peak: &Peak) {
        self.frequencies.push(peak.frequency);
        self.magnitudes.push(peak.magnitude);
        self.phases.push(peak.phase);
        self.track_ids.push(id);
    }

    /// Number of sinusoids in the frame.
    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    /// The frame's sinusoids as peaks, in output order.
    pub fn iter(&self) -> impl Iterator<Item = Peak> + '_ {
        self.frequencies
            .iter()
            .zip(&self.magnitudes)
            .zip(&self.phases)
            .map(|((&f, &m), &p)| Peak::new(f, m, p))
    }
}

/// Frame-by-frame sine model analyzer.
#[derive(Debug, Clone)]
pub struct SineModelAnalyzer {
    config: SineModelConfig,
    polar: CartesianToPolar,
    detector: SpectralPeakDetector,
    interpolator: PhaseInterpolator,
    tracker: SineTracker,
    frames: u64,
}

impl SineModelAnalyzer {
    /// Build an analyzer. Configuration errors are fatal here.
    pub fn new(config: SineModelConfig) -> SineResult<Self> {
        config.validate()?;

        let detector = SpectralPeakDetector::new(config.peak_detector_config())?;
        let interpolator = PhaseInterpolator::new(config.sample_rate)?;
        let tracker = SineTracker::with_params(config.tracking_params())?;

        debug!(
            sample_rate = config.sample_rate,
            max_peaks = config.max_peaks,
            min_frequency = config.min_frequency,
            max_frequency = config.max_frequency,
            order_by = %config.order_by,
            tracking = config.tracking,
            "Created sine model analyzer"
        );

        Ok(Self {
            config,
            polar: CartesianToPolar,
            detector,
            interpolator,
            tracker,
            frames: 0,
        })
    }

    /// Analyze one complex half-spectrum (`fft_size / 2 + 1` bins).
    ///
    /// On error nothing changes: the next frame continues from the last
    /// good one.
    pub fn compute(&mut self, spectrum: &[Complex64]) -> SineResult<SineFrame> {
        let peaks = match self.extract(spectrum) {
            Ok(peaks) => peaks,
            Err(e) => {
                warn!(frame = self.frames, bins = spectrum.len(), error = %e, "Rejected spectrum");
                return Err(e);
            }
        };

        let frame = if self.config.tracking {
            let update = self.tracker.update(&peaks)?;
            let state = self.tracker.state();
            let mut frame = SineFrame::with_capacity(state.active_count());
            for (slot, peak) in state.active_peaks() {
                frame.push(slot, &peak);
            }
            debug!(
                frame = self.frames,
                peaks = peaks.len(),
                continued = update.continued,
                born = update.born,
                died = update.died,
                slots = state.len(),
                "Analyzed frame"
            );
            frame
        } else {
            let mut frame = SineFrame::with_capacity(peaks.len());
            for (i, peak) in peaks.iter().enumerate() {
                frame.push(i, peak);
            }
            debug!(frame = self.frames, peaks = peaks.len(), "Analyzed frame");
            frame
        };

        self.frames += 1;
        Ok(frame)
    }

    /// Analyze a sequence of spectra in order, stopping at the first error.
    pub fn analyze<I, S>(&mut self, spectra: I) -> SineResult<Vec<SineFrame>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[Complex64]>,
    {
        spectra
            .into_iter()
            .map(|spectrum| self.compute(spectrum.as_ref()))
            .collect()
    }

    /// Peaks of one spectrum with interpolated phases.
    fn extract(&self, spectrum: &[Complex64]) -> SineResult<Vec<Peak>> {
        let mut polar = self.polar.process(spectrum);
        self.config.magnitude_scale.apply(&mut polar.magnitudes);

        let detected = self.detector.detect(&polar.magnitudes)?;
        let frequencies: Vec<f64> = detected.iter().map(|p| p.position).collect();
        let phases = self.interpolator.interpolate(&polar.phases, &frequencies)?;

        Ok(detected
            .iter()
            .zip(phases)
            .map(|(p, phase)| Peak::new(p.position, p.magnitude, phase))
            .collect())
    }

    /// Forget all tracks and start a new session.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.frames = 0;
    }

    pub fn tracker(&self) -> &SineTracker {
        &self.tracker
    }

    pub fn config(&self) -> &SineModelConfig {
        &self.config
    }

    /// Frames successfully analyzed since creation or reset.
    pub fn frames_processed(&self) -> u64 {
        self.frames
    }
}
