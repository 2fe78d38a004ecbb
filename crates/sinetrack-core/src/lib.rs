//! # Sinusoidal Model Analysis Library
//!
//! This crate decomposes audio spectra into sinusoidal partials and follows
//! them through time, the analysis half of a sinusoidal (additive) model.
//!
//! ## Overview
//!
//! Each analysis frame is a complex half-spectrum. For every frame the
//! library:
//!
//! - **Peak Extraction**: Converts bins to magnitude/phase and finds spectral
//!   peaks with sub-bin (parabolic) frequency and magnitude estimates
//! - **Phase Interpolation**: Estimates each peak's phase between adjacent
//!   phase bins, falling back to the nearest bin across a 2π wrap
//! - **Sinusoidal Tracking**: Continues peaks along existing tracks within a
//!   frequency-dependent deviation window, ends unmatched tracks and starts
//!   new ones in free slots
//!
//! ## Signal Flow
//!
//! ```text
//! Signal → SpectrumFramer → Complex spectrum → CartesianToPolar → SpectralPeakDetector
//!                                                     │                   │
//!                                                  phases            frequencies
//!                                                     └──▶ PhaseInterpolator ──▶ SineTracker → SineFrame
//! ```
//!
//! ## Example
//!
//! ```rust
//! use sinetrack_core::{Peak, SineTracker};
//!
//! let mut tracker = SineTracker::new();
//! tracker.update(&[Peak::new(440.0, 1.0, 0.0), Peak::new(880.0, 0.5, 0.0)]).unwrap();
//! tracker.update(&[Peak::new(441.0, 1.0, 0.0)]).unwrap();
//!
//! // 440 Hz continued in slot 0; 880 Hz ended, its slot is kept empty
//! assert_eq!(tracker.state().frequencies(), &[441.0, 0.0]);
//! ```

pub mod complex_to_mag_phase;
pub mod config;
pub mod observe;
pub mod peak_detector;
pub mod phase_interpolation;
pub mod sine_model;
pub mod sine_tracker;
pub mod spectrum;
pub mod types;

pub use complex_to_mag_phase::{CartesianToPolar, MagnitudeScale, PolarSpectrum};
pub use config::{ConfigError, OrderBy, SineModelConfig, SinetrackConfig};
pub use peak_detector::{PeakDetectorConfig, PeakInfo, PeakOrder, SpectralPeakDetector};
pub use phase_interpolation::PhaseInterpolator;
pub use sine_model::{SineFrame, SineModelAnalyzer};
pub use sine_tracker::{track_step, SineTracker, TrackState, TrackUpdate, TrackingParams};
pub use spectrum::{SpectrumConfig, SpectrumFramer, Window};
pub use types::{Complex, Peak, SineModelError, SineResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{OrderBy, SineModelConfig};
    pub use crate::sine_model::{SineFrame, SineModelAnalyzer};
    pub use crate::sine_tracker::{SineTracker, TrackState};
    pub use crate::spectrum::{SpectrumConfig, SpectrumFramer, Window};
    pub use crate::types::{Peak, SineModelError, SineResult};
}
