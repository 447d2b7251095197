use sono_core::config::AnalysisConfig;
use sono_core::frame::AnalysisFrame;
use sono_core::traits::SpectrumSource;

use crate::features::{band_levels, compute_features, compute_rms, dominant_frequencies};
use crate::onset::detect_onset;
use crate::pulse::decay_pulse;
use crate::state::AnalysisState;
use crate::tempo::estimate_bpm;

/// One analysis session: configuration, state, and the fixed per-frame
/// pipeline (features → onset → tempo → pulse).
///
/// The engine is an owned value; there is no module-level state, so
/// independent sessions (tests, multiple visualizer instances) never
/// interfere. The caller drives it once per frame with a fresh spectrum
/// and a monotonically non-decreasing timestamp.
///
/// # Example
/// ```
/// use sono_analysis::engine::AnalysisEngine;
/// use sono_core::AnalysisConfig;
///
/// let mut engine = AnalysisEngine::new(AnalysisConfig::default());
/// let spectrum = vec![0.0f32; 256];
/// let frame = engine.process_frame(&spectrum, &[], 22050.0, 0.0);
/// assert!(!frame.onset);
/// assert!(frame.bpm.is_none());
/// ```
pub struct AnalysisEngine {
    config: AnalysisConfig,
    state: AnalysisState,
    spectrum_buf: Vec<f32>,
    waveform_buf: Vec<f32>,
}

impl AnalysisEngine {
    /// Create an engine for a new audio session.
    ///
    /// The configuration is clamped to its valid ranges on entry.
    #[must_use]
    pub fn new(mut config: AnalysisConfig) -> Self {
        config.clamp_all();
        let state = AnalysisState::new(&config);
        log::info!(
            "analysis engine ready (flux history {}, refractory {} ms)",
            config.flux_history_len,
            config.refractory_ms
        );
        Self {
            config,
            state,
            spectrum_buf: Vec::new(),
            waveform_buf: Vec::new(),
        }
    }

    /// Run one analysis frame.
    ///
    /// `spectrum` is the externally computed magnitude spectrum,
    /// `waveform` the matching time-domain buffer (may be empty), `now_ms`
    /// a monotonic timestamp. The pipeline order is fixed: feature
    /// extraction, onset decision, tempo update, pulse envelope.
    pub fn process_frame(
        &mut self,
        spectrum: &[f32],
        waveform: &[f32],
        nyquist_hz: f32,
        now_ms: f64,
    ) -> AnalysisFrame {
        let features = compute_features(spectrum, nyquist_hz, &mut self.state, &self.config);
        let onset = detect_onset(features.flux, now_ms, &mut self.state, &self.config);
        self.state.flux_trend.push(f64::from(features.flux));
        let bpm = estimate_bpm(&self.state);
        let pulse_strength = decay_pulse(&mut self.state, &self.config, onset);

        AnalysisFrame {
            features,
            rms: compute_rms(waveform),
            bands: band_levels(spectrum, nyquist_hz, &self.config),
            dominant_hz: dominant_frequencies(spectrum, nyquist_hz),
            onset,
            bpm,
            pulse_strength,
        }
    }

    /// Pull the current frame from a [`SpectrumSource`] and analyze it.
    ///
    /// The source hands its data off by copy into engine-owned scratch
    /// buffers; steady state allocates nothing.
    pub fn process_source(&mut self, source: &mut dyn SpectrumSource, now_ms: f64) -> AnalysisFrame {
        source.read_spectrum(&mut self.spectrum_buf);
        source.read_waveform(&mut self.waveform_buf);
        let nyquist_hz = source.nyquist_hz();

        let spectrum = std::mem::take(&mut self.spectrum_buf);
        let waveform = std::mem::take(&mut self.waveform_buf);
        let frame = self.process_frame(&spectrum, &waveform, nyquist_hz, now_ms);
        self.spectrum_buf = spectrum;
        self.waveform_buf = waveform;
        frame
    }

    /// Restart the session: drop the previous spectrum and every history.
    ///
    /// Required between sessions; stale state would otherwise leak a flux
    /// spike or a biased tempo estimate into the new one.
    pub fn reset(&mut self) {
        self.state.reset();
        log::info!("analysis state reset");
    }

    /// The active configuration (clamped).
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Read access to the session state (pulse, histories, trend).
    #[must_use]
    pub fn state(&self) -> &AnalysisState {
        &self.state
    }
}

impl Default for AnalysisEngine {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
