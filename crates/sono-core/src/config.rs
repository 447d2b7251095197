use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Detector configuration. Every tunable constant of the analysis pipeline
/// as a named field with a documented default.
///
/// The defaults are an externally pinned contract (the test suite depends
/// on them); change them via TOML override, not in code.
///
/// # Example
/// ```
/// use sono_core::config::AnalysisConfig;
/// let config = AnalysisConfig::default();
/// assert_eq!(config.flux_history_len, 40);
/// assert_eq!(config.refractory_ms, 170.0);
/// ```
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AnalysisConfig {
    // === Bounded histories ===
    /// Flux values retained for the adaptive threshold statistics.
    pub flux_history_len: usize,
    /// Accepted onset timestamps retained for interval computation.
    pub onset_history_len: usize,
    /// Plausible inter-onset intervals retained for the BPM estimate.
    pub interval_history_len: usize,
    /// Recent flux values retained for sparkline-style consumers.
    pub flux_trend_len: usize,

    // === Onset detection ===
    /// Multiplier on the flux standard deviation in the adaptive threshold.
    pub sigma_factor: f32,
    /// Additive floor of the adaptive threshold; suppresses firing on the
    /// near-zero flux of silence.
    pub threshold_floor: f32,
    /// Minimum time between accepted onsets, in milliseconds.
    pub refractory_ms: f64,

    // === Tempo ===
    /// Shortest inter-onset interval treated as a beat (ms). 1500 ms ↔ 40 BPM.
    pub min_beat_interval_ms: f64,
    /// Longest inter-onset interval treated as a beat (ms). 260 ms ↔ ~231 BPM.
    pub max_beat_interval_ms: f64,

    // === Spectral features ===
    /// Fraction of total energy below the rolloff frequency.
    pub rolloff_fraction: f32,
    /// Maximum per-bin magnitude of the incoming spectrum; flux and band
    /// energies are normalized by this.
    pub magnitude_scale: f32,

    // === Pulse envelope ===
    /// Multiplicative per-frame decay of the pulse envelope.
    pub pulse_decay: f32,
    /// Linear per-frame fall subtracted after the decay.
    pub pulse_fall: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            flux_history_len: 40,
            onset_history_len: 12,
            interval_history_len: 10,
            flux_trend_len: 90,
            sigma_factor: 1.35,
            threshold_floor: 0.25,
            refractory_ms: 170.0,
            min_beat_interval_ms: 260.0,
            max_beat_interval_ms: 1500.0,
            rolloff_fraction: 0.85,
            magnitude_scale: 255.0,
            pulse_decay: 0.86,
            pulse_fall: 0.02,
        }
    }
}

impl AnalysisConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.flux_history_len = self.flux_history_len.clamp(1, 4096);
        self.onset_history_len = self.onset_history_len.clamp(2, 256);
        self.interval_history_len = self.interval_history_len.clamp(1, 256);
        self.flux_trend_len = self.flux_trend_len.clamp(1, 4096);
        self.sigma_factor = self.sigma_factor.clamp(0.0, 10.0);
        self.threshold_floor = self.threshold_floor.clamp(0.0, 10.0);
        self.refractory_ms = self.refractory_ms.clamp(0.0, 5000.0);
        self.min_beat_interval_ms = self.min_beat_interval_ms.clamp(1.0, 10000.0);
        self.max_beat_interval_ms = self
            .max_beat_interval_ms
            .clamp(self.min_beat_interval_ms, 10000.0);
        self.rolloff_fraction = self.rolloff_fraction.clamp(0.0, 1.0);
        self.magnitude_scale = self.magnitude_scale.max(f32::EPSILON);
        self.pulse_decay = self.pulse_decay.clamp(0.0, 0.999);
        self.pulse_fall = self.pulse_fall.clamp(0.0, 1.0);
    }

    /// Check cross-field consistency without mutating.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidValue` when a field is outside its valid
    /// range or the beat-interval window is inverted.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.magnitude_scale <= 0.0 {
            return Err(CoreError::InvalidValue {
                field: "magnitude_scale",
                value: f64::from(self.magnitude_scale),
            });
        }
        if self.max_beat_interval_ms < self.min_beat_interval_ms {
            return Err(CoreError::InvalidValue {
                field: "max_beat_interval_ms",
                value: self.max_beat_interval_ms,
            });
        }
        if !(0.0..=1.0).contains(&self.rolloff_fraction) {
            return Err(CoreError::InvalidValue {
                field: "rolloff_fraction",
                value: f64::from(self.rolloff_fraction),
            });
        }
        Ok(())
    }
}

/// Intermediate TOML structure for deserialization with optional values.
#[derive(Deserialize)]
struct ConfigFile {
    analysis: AnalysisSection,
}

/// Analysis section of the TOML config, all fields optional for partial override.
#[derive(Deserialize)]
struct AnalysisSection {
    flux_history_len: Option<usize>,
    onset_history_len: Option<usize>,
    interval_history_len: Option<usize>,
    flux_trend_len: Option<usize>,
    sigma_factor: Option<f32>,
    threshold_floor: Option<f32>,
    refractory_ms: Option<f64>,
    min_beat_interval_ms: Option<f64>,
    max_beat_interval_ms: Option<f64>,
    rolloff_fraction: Option<f32>,
    magnitude_scale: Option<f32>,
    pulse_decay: Option<f32>,
    pulse_fall: Option<f32>,
}

/// Load a TOML file and merge it with the default values.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use sono_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<AnalysisConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read {}", path.display()))?;

    let file: ConfigFile = toml::from_str(&content)
        .with_context(|| format!("TOML parse error in {}", path.display()))?;

    let mut config = AnalysisConfig::default();

    let a = file.analysis;
    if let Some(v) = a.flux_history_len {
        config.flux_history_len = v;
    }
    if let Some(v) = a.onset_history_len {
        config.onset_history_len = v;
    }
    if let Some(v) = a.interval_history_len {
        config.interval_history_len = v;
    }
    if let Some(v) = a.flux_trend_len {
        config.flux_trend_len = v;
    }
    if let Some(v) = a.sigma_factor {
        config.sigma_factor = v;
    }
    if let Some(v) = a.threshold_floor {
        config.threshold_floor = v;
    }
    if let Some(v) = a.refractory_ms {
        config.refractory_ms = v;
    }
    if let Some(v) = a.min_beat_interval_ms {
        config.min_beat_interval_ms = v;
    }
    if let Some(v) = a.max_beat_interval_ms {
        config.max_beat_interval_ms = v;
    }
    if let Some(v) = a.rolloff_fraction {
        config.rolloff_fraction = v;
    }
    if let Some(v) = a.magnitude_scale {
        config.magnitude_scale = v;
    }
    if let Some(v) = a.pulse_decay {
        config.pulse_decay = v;
    }
    if let Some(v) = a.pulse_fall {
        config.pulse_fall = v;
    }

    config.clamp_all();
    log::info!("loaded analysis config from {}", path.display());
    Ok(config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_match_detector_contract() {
        let config = AnalysisConfig::default();
        assert_eq!(config.flux_history_len, 40);
        assert_eq!(config.onset_history_len, 12);
        assert_eq!(config.interval_history_len, 10);
        assert!((config.sigma_factor - 1.35).abs() < f32::EPSILON);
        assert!((config.threshold_floor - 0.25).abs() < f32::EPSILON);
        assert!((config.refractory_ms - 170.0).abs() < f64::EPSILON);
        assert!((config.min_beat_interval_ms - 260.0).abs() < f64::EPSILON);
        assert!((config.max_beat_interval_ms - 1500.0).abs() < f64::EPSILON);
        assert!((config.rolloff_fraction - 0.85).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn clamp_repairs_out_of_range_values() {
        let mut config = AnalysisConfig {
            flux_history_len: 0,
            sigma_factor: -3.0,
            rolloff_fraction: 2.0,
            min_beat_interval_ms: 800.0,
            max_beat_interval_ms: 100.0,
            ..AnalysisConfig::default()
        };
        config.clamp_all();
        assert_eq!(config.flux_history_len, 1);
        assert_eq!(config.sigma_factor, 0.0);
        assert_eq!(config.rolloff_fraction, 1.0);
        assert!(config.max_beat_interval_ms >= config.min_beat_interval_ms);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_inverted_beat_window() {
        let config = AnalysisConfig {
            min_beat_interval_ms: 1500.0,
            max_beat_interval_ms: 260.0,
            ..AnalysisConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(CoreError::InvalidValue {
                field: "max_beat_interval_ms",
                ..
            })
        ));
    }

    #[test]
    fn load_config_partial_override() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[analysis]\nsigma_factor = 2.0\nrefractory_ms = 200.0"
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert!((config.sigma_factor - 2.0).abs() < f32::EPSILON);
        assert!((config.refractory_ms - 200.0).abs() < f64::EPSILON);
        // Untouched fields keep their defaults.
        assert_eq!(config.flux_history_len, 40);
        assert!((config.rolloff_fraction - 0.85).abs() < f32::EPSILON);
    }

    #[test]
    fn load_config_missing_file_is_error() {
        assert!(load_config(Path::new("/nonexistent/sonoscope.toml")).is_err());
    }
}
