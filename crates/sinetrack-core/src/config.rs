//! # Configuration System
//!
//! Provides YAML-based configuration for sinetrack, including:
//!
//! - Sine model analysis (sample rate, peak limits, search band, ordering)
//! - Tracking deviation window
//! - Short-time spectrum framing (FFT size, hop, window)
//! - Logging
//!
//! ## Configuration Search Path
//!
//! Configuration is loaded from the first file found:
//! 1. Path specified via `SINETRACK_CONFIG` environment variable
//! 2. `./sinetrack.yaml` (current directory)
//! 3. `~/.config/sinetrack/config.yaml` (user config)
//! 4. `/etc/sinetrack/config.yaml` (system config)
//!
//! ## Example Configuration
//!
//! ```yaml
//! sine_model:
//!   sample_rate: 44100
//!   max_peaks: 60
//!   max_frequency: 8000
//!   magnitude_threshold: -80
//!   magnitude_scale: db
//!   order_by: magnitude
//!   freq_dev_offset: 20
//!   freq_dev_slope: 0.01
//!
//! spectrum:
//!   fft_size: 2048
//!   hop_size: 512
//!   window: blackman_harris
//!
//! logging:
//!   level: debug
//!   format: compact
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::complex_to_mag_phase::MagnitudeScale;
use crate::observe::LogConfig;
use crate::peak_detector::{PeakDetectorConfig, PeakOrder};
use crate::sine_tracker::{TrackingParams, DEFAULT_FREQ_DEV_OFFSET, DEFAULT_FREQ_DEV_SLOPE};
use crate::spectrum::SpectrumConfig;

/// Error type for configuration operations.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("config not found: {0}")]
    NotFound(String),
    /// Failed to read configuration file
    #[error("failed to read config: {0}")]
    ReadError(String),
    /// Failed to parse configuration
    #[error("failed to parse config: {0}")]
    ParseError(String),
    /// Invalid configuration value
    #[error("invalid config: {0}")]
    ValidationError(String),
    /// Peak ordering other than "magnitude" or "frequency"
    #[error("Unsupported ordering type: '{0}'")]
    UnsupportedOrdering(String),
}

/// Order in which the analyzer reports a frame's peaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum OrderBy {
    /// Strongest peak first
    Magnitude,
    /// Lowest frequency first
    #[default]
    Frequency,
}

impl OrderBy {
    /// The peak detector ordering this maps to.
    pub fn peak_order(self) -> PeakOrder {
        match self {
            OrderBy::Magnitude => PeakOrder::Amplitude,
            OrderBy::Frequency => PeakOrder::Position,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderBy::Magnitude => "magnitude",
            OrderBy::Frequency => "frequency",
        }
    }
}

impl FromStr for OrderBy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "magnitude" => Ok(OrderBy::Magnitude),
            "frequency" => Ok(OrderBy::Frequency),
            _ => Err(ConfigError::UnsupportedOrdering(s.to_string())),
        }
    }
}

impl TryFrom<String> for OrderBy {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OrderBy> for String {
    fn from(order: OrderBy) -> Self {
        order.as_str().to_string()
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sine model analysis configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SineModelConfig {
    /// Sample rate in Hz; Nyquist is half of it
    pub sample_rate: f64,
    /// Maximum number of peaks reported per frame
    pub max_peaks: usize,
    /// Lowest peak frequency searched, in Hz
    pub min_frequency: f64,
    /// Highest peak frequency reported, in Hz
    pub max_frequency: f64,
    /// Peaks must be strictly above this magnitude (in `magnitude_scale`)
    pub magnitude_threshold: f64,
    /// Peak ordering within a frame
    pub order_by: OrderBy,
    /// Allowed tracking deviation at 0 Hz, in Hz
    pub freq_dev_offset: f64,
    /// Allowed tracking deviation increase per Hz
    pub freq_dev_slope: f64,
    /// Linear or dB magnitudes
    pub magnitude_scale: MagnitudeScale,
    /// Continue peaks across frames; when off, each frame's raw peaks are reported
    pub tracking: bool,
}

impl Default for SineModelConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44_100.0,
            max_peaks: 100,
            min_frequency: 0.0,
            max_frequency: 5_000.0,
            magnitude_threshold: 0.0,
            order_by: OrderBy::Frequency,
            freq_dev_offset: DEFAULT_FREQ_DEV_OFFSET,
            freq_dev_slope: DEFAULT_FREQ_DEV_SLOPE,
            magnitude_scale: MagnitudeScale::Linear,
            tracking: true,
        }
    }
}

impl SineModelConfig {
    /// Half the sample rate.
    pub fn nyquist(&self) -> f64 {
        self.sample_rate / 2.0
    }

    /// Deviation window for the tracker.
    pub fn tracking_params(&self) -> TrackingParams {
        TrackingParams::new(self.freq_dev_offset, self.freq_dev_slope)
    }

    /// Peak detector settings: positions in Hz over `[0, nyquist]`.
    ///
    /// With tracking on, a 0 Hz candidate could never be tracked, so the
    /// search starts above DC and such a peak cannot use up `max_peaks`.
    pub fn peak_detector_config(&self) -> PeakDetectorConfig {
        let min_position =
            if self.tracking && self.min_frequency == 0.0 && self.max_frequency > 0.0 {
                f64::MIN_POSITIVE
            } else {
                self.min_frequency
            };
        PeakDetectorConfig {
            range: self.nyquist(),
            max_peaks: self.max_peaks,
            min_position,
            max_position: self.max_frequency,
            threshold: self.magnitude_threshold,
            interpolate: true,
            order: self.order_by.peak_order(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.sample_rate.is_finite() && self.sample_rate > 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "sample_rate must be positive, got {}",
                self.sample_rate
            )));
        }

        if self.max_peaks == 0 {
            return Err(ConfigError::ValidationError(
                "max_peaks must be > 0".to_string(),
            ));
        }

        if !(self.min_frequency.is_finite() && self.min_frequency >= 0.0) {
            return Err(ConfigError::ValidationError(format!(
                "min_frequency must be non-negative, got {}",
                self.min_frequency
            )));
        }

        if self.max_frequency.is_nan() || self.max_frequency < self.min_frequency {
            return Err(ConfigError::ValidationError(format!(
                "max_frequency ({}) must not be below min_frequency ({})",
                self.max_frequency, self.min_frequency
            )));
        }

        if self.magnitude_threshold.is_nan() {
            return Err(ConfigError::ValidationError(
                "magnitude_threshold is NaN".to_string(),
            ));
        }

        self.tracking_params()
            .validate()
            .map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

/// Complete sinetrack configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SinetrackConfig {
    /// Configuration version
    pub version: String,
    /// Analysis configuration
    pub sine_model: SineModelConfig,
    /// Spectrum framing configuration
    pub spectrum: SpectrumConfig,
    /// Logging configuration
    pub logging: LogConfig,
}

impl Default for SinetrackConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            sine_model: SineModelConfig::default(),
            spectrum: SpectrumConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

impl SinetrackConfig {
    /// Load configuration from the default search path.
    ///
    /// Search order:
    /// 1. `SINETRACK_CONFIG` environment variable
    /// 2. `./sinetrack.yaml`
    /// 3. `~/.config/sinetrack/config.yaml`
    /// 4. `/etc/sinetrack/config.yaml`
    ///
    /// Returns default config if no file is found.
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = std::env::var("SINETRACK_CONFIG") {
            let path = PathBuf::from(path);
            if !path.exists() {
                return Err(ConfigError::NotFound(path.display().to_string()));
            }
            return Self::load_from(&path);
        }

        for path in &Self::config_search_paths() {
            if path.exists() {
                return Self::load_from(path);
            }
        }

        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))?;

        Self::parse(&content)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content =
            serde_yaml::to_string(self).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        std::fs::write(path, content)
            .map_err(|e| ConfigError::ReadError(format!("{}: {}", path.display(), e)))
    }

    /// Get configuration search paths.
    pub fn config_search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("./sinetrack.yaml")];

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "sinetrack") {
            paths.push(config_dir.config_dir().join("config.yaml"));
        }

        paths.push(PathBuf::from("/etc/sinetrack/config.yaml"));

        paths
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.sine_model.validate()?;
        self.spectrum.validate()
    }

    /// Generate example configuration YAML.
    pub fn example_yaml() -> String {
        serde_yaml::to_string(&Self::default()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::observe::{LogFormat, LogLevel};
    use crate::spectrum::Window;

    #[test]
    fn test_default_config() {
        let config = SinetrackConfig::default();
        assert_eq!(config.sine_model.sample_rate, 44_100.0);
        assert_eq!(config.sine_model.freq_dev_offset, 20.0);
        assert_eq!(config.sine_model.freq_dev_slope, 0.01);
        assert_eq!(config.sine_model.order_by, OrderBy::Frequency);
        assert!(config.sine_model.tracking);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
sine_model:
  sample_rate: 48000
  max_peaks: 40
  min_frequency: 50
  max_frequency: 12000
  magnitude_threshold: -90
  magnitude_scale: db
  order_by: Magnitude
  freq_dev_offset: 10
  freq_dev_slope: 0.02

spectrum:
  fft_size: 4096
  hop_size: 1024
  window: hann

logging:
  level: debug
  format: json
"#;

        let config = SinetrackConfig::parse(yaml).unwrap();
        let sm = &config.sine_model;
        assert_eq!(sm.sample_rate, 48_000.0);
        assert_eq!(sm.max_peaks, 40);
        assert_eq!(sm.min_frequency, 50.0);
        assert_eq!(sm.max_frequency, 12_000.0);
        assert_eq!(sm.magnitude_threshold, -90.0);
        assert_eq!(sm.magnitude_scale, MagnitudeScale::Decibels);
        assert_eq!(sm.order_by, OrderBy::Magnitude);
        assert_eq!(sm.tracking_params(), TrackingParams::new(10.0, 0.02));
        assert_eq!(config.spectrum.fft_size, 4096);
        assert_eq!(config.spectrum.hop_size, 1024);
        assert_eq!(config.spectrum.window, Window::Hann);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_parse_partial_yaml() {
        let yaml = r#"
sine_model:
  max_peaks: 12
"#;

        let config = SinetrackConfig::parse(yaml).unwrap();
        assert_eq!(config.sine_model.max_peaks, 12);
        // Defaults should be applied
        assert_eq!(config.sine_model.sample_rate, 44_100.0);
        assert_eq!(config.sine_model.max_frequency, 5_000.0);
        assert_eq!(config.spectrum, SpectrumConfig::default());
    }

    #[test]
    fn test_unsupported_ordering() {
        let err = "amplitude".parse::<OrderBy>().unwrap_err();
        assert_eq!(err, ConfigError::UnsupportedOrdering("amplitude".to_string()));
        assert_eq!(err.to_string(), "Unsupported ordering type: 'amplitude'");

        let yaml = r#"
sine_model:
  order_by: loudness
"#;
        let err = SinetrackConfig::parse(yaml).unwrap_err();
        match err {
            ConfigError::ParseError(msg) => assert!(msg.contains("'loudness'")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ordering_is_case_insensitive() {
        assert_eq!("MAGNITUDE".parse::<OrderBy>().unwrap(), OrderBy::Magnitude);
        assert_eq!("Frequency".parse::<OrderBy>().unwrap(), OrderBy::Frequency);
        assert_eq!(OrderBy::Magnitude.peak_order(), PeakOrder::Amplitude);
        assert_eq!(OrderBy::Frequency.peak_order(), PeakOrder::Position);
    }

    #[test]
    fn test_validation_errors() {
        let bad_rate = SineModelConfig {
            sample_rate: 0.0,
            ..Default::default()
        };
        assert!(matches!(bad_rate.validate(), Err(ConfigError::ValidationError(_))));

        let bad_band = SineModelConfig {
            min_frequency: 3000.0,
            max_frequency: 1000.0,
            ..Default::default()
        };
        assert!(bad_band.validate().is_err());

        let bad_peaks = SineModelConfig {
            max_peaks: 0,
            ..Default::default()
        };
        assert!(bad_peaks.validate().is_err());

        let bad_slope = SineModelConfig {
            freq_dev_slope: -0.1,
            ..Default::default()
        };
        assert!(bad_slope.validate().is_err());
    }

    #[test]
    fn test_invalid_yaml_rejected_by_validation() {
        let yaml = r#"
sine_model:
  sample_rate: -1
"#;
        assert!(matches!(
            SinetrackConfig::parse(yaml),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_peak_detector_mapping() {
        let config = SineModelConfig {
            sample_rate: 48_000.0,
            order_by: OrderBy::Magnitude,
            ..Default::default()
        };
        let pd = config.peak_detector_config();
        assert_eq!(pd.range, 24_000.0);
        assert_eq!(pd.max_peaks, 100);
        assert_eq!(pd.max_position, 5_000.0);
        assert_eq!(pd.order, PeakOrder::Amplitude);
        assert!(pd.interpolate);
        assert!(pd.min_position > 0.0);

        let untracked = SineModelConfig {
            tracking: false,
            ..config.clone()
        };
        assert_eq!(untracked.peak_detector_config().min_position, 0.0);

        let banded = SineModelConfig {
            min_frequency: 80.0,
            ..config
        };
        assert_eq!(banded.peak_detector_config().min_position, 80.0);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sinetrack.yaml");

        let mut config = SinetrackConfig::default();
        config.sine_model.max_peaks = 25;
        config.sine_model.order_by = OrderBy::Magnitude;
        config.spectrum.window = Window::Hamming;
        config.save(&path).unwrap();

        let loaded = SinetrackConfig::load_from(&path).unwrap();
        assert_eq!(loaded.sine_model, config.sine_model);
        assert_eq!(loaded.spectrum, config.spectrum);
    }

    #[test]
    fn test_load_missing_file() {
        let err = SinetrackConfig::load_from(Path::new("/nonexistent/sinetrack.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadError(_)));
    }

    #[test]
    fn test_example_yaml_parses() {
        let yaml = SinetrackConfig::example_yaml();
        assert!(yaml.contains("order_by: frequency"));
        assert!(SinetrackConfig::parse(&yaml).is_ok());
    }
}
