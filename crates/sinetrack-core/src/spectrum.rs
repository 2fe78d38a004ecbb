//! Short-time spectrum framing
//!
//! Turns a real signal into the sequence of complex half-spectra consumed by
//! the sine model analyzer: frame → window → zero-pad → FFT → bins
//! `0..=fft_size/2`.
//!
//! ```text
//!  signal  ──┬────────────┬────────────┬──────────── ...
//!            │<─ fft_size ─>│
//!            │<hop>│<─ fft_size ─>│
//!                  │<hop>│<─ fft_size ─>│
//! ```
//!
//! Spectra are scaled by `2 / Σw`, so a stationary sinusoid of amplitude `A`
//! centred on a bin has a magnitude close to `A` there.
//!
//! ## Example
//!
//! ```rust
//! use sinetrack_core::spectrum::{SpectrumConfig, SpectrumFramer, Window};
//!
//! let mut framer = SpectrumFramer::new(SpectrumConfig {
//!     fft_size: 1024,
//!     hop_size: 256,
//!     window: Window::Hann,
//! })
//! .unwrap();
//!
//! let sample_rate = 8000.0;
//! let signal: Vec<f64> = (0..4096)
//!     .map(|n| (2.0 * std::f64::consts::PI * 1000.0 * n as f64 / sample_rate).sin())
//!     .collect();
//!
//! let spectra = framer.frames(&signal).collect::<Result<Vec<_>, _>>().unwrap();
//! assert_eq!(spectra.len(), 13);
//! assert_eq!(spectra[0].len(), 513);
//! // 1000 Hz sits exactly on bin 128
//! assert!((spectra[0][128].norm() - 1.0).abs() < 1e-6);
//! ```

use rustfft::{num_complex::Complex64, Fft, FftPlanner};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

use crate::config::ConfigError;
use crate::types::{SineModelError, SineResult};

/// Analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Window {
    /// No windowing
    Rectangular,
    /// Hann: -32 dB sidelobes
    Hann,
    /// Hamming: -43 dB sidelobes
    Hamming,
    /// Blackman: -58 dB sidelobes
    Blackman,
    /// 4-term Blackman-Harris: -92 dB sidelobes
    #[default]
    BlackmanHarris,
}

impl Window {
    /// Cosine-sum coefficients `a0, a1, a2, a3` with
    /// `w[n] = a0 - a1·cos(x) + a2·cos(2x) - a3·cos(3x)`.
    fn coefficients(&self) -> [f64; 4] {
        match self {
            Window::Rectangular => [1.0, 0.0, 0.0, 0.0],
            Window::Hann => [0.5, 0.5, 0.0, 0.0],
            Window::Hamming => [0.54, 0.46, 0.0, 0.0],
            Window::Blackman => [0.42, 0.5, 0.08, 0.0],
            Window::BlackmanHarris => [0.35875, 0.48829, 0.14128, 0.01168],
        }
    }

    /// Periodic (DFT-even) window of the given length.
    pub fn generate(&self, length: usize) -> Vec<f64> {
        let [a0, a1, a2, a3] = self.coefficients();
        (0..length)
            .map(|n| {
                let x = 2.0 * PI * n as f64 / length as f64;
                a0 - a1 * x.cos() + a2 * (2.0 * x).cos() - a3 * (3.0 * x).cos()
            })
            .collect()
    }
}

/// Spectrum framing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpectrumConfig {
    /// FFT length in samples (also the frame length)
    pub fft_size: usize,
    /// Samples between successive frames
    pub hop_size: usize,
    /// Analysis window
    pub window: Window,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            hop_size: 512,
            window: Window::BlackmanHarris,
        }
    }
}

impl SpectrumConfig {
    /// Number of bins per half-spectrum.
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2 + 1
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fft_size < 4 {
            return Err(ConfigError::ValidationError(format!(
                "fft_size must be at least 4, got {}",
                self.fft_size
            )));
        }
        if self.hop_size == 0 {
            return Err(ConfigError::ValidationError(
                "hop_size must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Windowed FFT of real frames.
pub struct SpectrumFramer {
    config: SpectrumConfig,
    fft: Arc<dyn Fft<f64>>,
    window: Vec<f64>,
    buffer: Vec<Complex64>,
    scratch: Vec<Complex64>,
}

impl fmt::Debug for SpectrumFramer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpectrumFramer")
            .field("config", &self.config)
            .finish()
    }
}

impl SpectrumFramer {
    pub fn new(config: SpectrumConfig) -> SineResult<Self> {
        config.validate()?;

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let scratch = vec![Complex64::new(0.0, 0.0); fft.get_inplace_scratch_len()];

        Ok(Self {
            config,
            fft,
            window: config.window.generate(config.fft_size),
            buffer: vec![Complex64::new(0.0, 0.0); config.fft_size],
            scratch,
        })
    }

    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    /// Bins per output spectrum (`fft_size / 2 + 1`).
    pub fn bin_count(&self) -> usize {
        self.config.bin_count()
    }

    /// Half-spectrum of one frame.
    ///
    /// Frames shorter than `fft_size` are windowed at their own length and
    /// zero-padded; longer frames are rejected.
    pub fn spectrum(&mut self, frame: &[f64]) -> SineResult<Vec<Complex64>> {
        let n = self.config.fft_size;
        if frame.is_empty() || frame.len() > n {
            return Err(SineModelError::InvalidArgument(format!(
                "frame length must be in 1..={}, got {}",
                n,
                frame.len()
            )));
        }

        let short_window;
        let window: &[f64] = if frame.len() == n {
            &self.window
        } else {
            short_window = self.config.window.generate(frame.len());
            &short_window
        };

        let window_sum: f64 = window.iter().sum();
        let scale = if window_sum > 0.0 { 2.0 / window_sum } else { 0.0 };

        for (i, slot) in self.buffer.iter_mut().enumerate() {
            *slot = match frame.get(i) {
                Some(&x) => Complex64::new(x * window[i] * scale, 0.0),
                None => Complex64::new(0.0, 0.0),
            };
        }

        self.fft.process_with_scratch(&mut self.buffer, &mut self.scratch);
        Ok(self.buffer[..self.bin_count()].to_vec())
    }

    /// Spectra of every complete frame of `signal`, `hop_size` apart.
    pub fn frames<'a>(&'a mut self, signal: &'a [f64]) -> Frames<'a> {
        Frames {
            framer: self,
            signal,
            position: 0,
        }
    }

    /// Number of complete frames in a signal of `len` samples.
    pub fn frame_count(&self, len: usize) -> usize {
        if len < self.config.fft_size {
            0
        } else {
            (len - self.config.fft_size) / self.config.hop_size + 1
        }
    }
}

/// Iterator over the spectra of a signal. See [`SpectrumFramer::frames`].
pub struct Frames<'a> {
    framer: &'a mut SpectrumFramer,
    signal: &'a [f64],
    position: usize,
}

impl<'a> Iterator for Frames<'a> {
    type Item = SineResult<Vec<Complex64>>;

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.position + self.framer.config.fft_size;
        if end > self.signal.len() {
            return None;
        }
        let frame = &self.signal[self.position..end];
        self.position += self.framer.config.hop_size;
        Some(self.framer.spectrum(frame))
    }
}
