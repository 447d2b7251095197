use sono_core::config::AnalysisConfig;

use crate::history::BoundedHistory;

/// Long-lived mutable state of one analysis session.
///
/// Created (or reset) when an audio session starts, mutated exactly once per
/// frame by the pipeline, discarded or reset when the session ends. A
/// restarted session MUST go through [`AnalysisState::reset`]: a stale
/// previous spectrum or history would produce a spurious flux spike or a
/// biased tempo estimate.
///
/// # Example
/// ```
/// use sono_analysis::state::AnalysisState;
/// use sono_core::AnalysisConfig;
///
/// let state = AnalysisState::new(&AnalysisConfig::default());
/// assert_eq!(state.pulse_strength(), 0.0);
/// ```
pub struct AnalysisState {
    /// Spectrum of the previous frame (copy, never a live alias).
    /// `None` until the first frame of a session.
    pub(crate) prev_spectrum: Option<Vec<f32>>,
    /// Recent flux values feeding the adaptive threshold statistics.
    pub(crate) flux_history: BoundedHistory,
    /// Accepted onset timestamps (monotonic ms).
    pub(crate) onset_times: BoundedHistory,
    /// Plausible inter-onset intervals (ms).
    pub(crate) beat_intervals: BoundedHistory,
    /// Recent flux values for sparkline-style consumers.
    pub(crate) flux_trend: BoundedHistory,
    /// Timestamp of the last accepted onset. Negative infinity at rest so
    /// the first onset is never refractory-blocked.
    pub(crate) last_onset_ms: f64,
    /// Decaying onset envelope [0.0, 1.0].
    pub(crate) pulse_strength: f32,
}

impl AnalysisState {
    /// Create the cold-start state with capacities from `config`.
    #[must_use]
    pub fn new(config: &AnalysisConfig) -> Self {
        Self {
            prev_spectrum: None,
            flux_history: BoundedHistory::new(config.flux_history_len),
            onset_times: BoundedHistory::new(config.onset_history_len),
            beat_intervals: BoundedHistory::new(config.interval_history_len),
            flux_trend: BoundedHistory::new(config.flux_trend_len),
            last_onset_ms: f64::NEG_INFINITY,
            pulse_strength: 0.0,
        }
    }

    /// Return to the cold-start state. Capacities are kept; everything a
    /// frame could observe is cleared.
    pub fn reset(&mut self) {
        self.prev_spectrum = None;
        self.flux_history.clear();
        self.onset_times.clear();
        self.beat_intervals.clear();
        self.flux_trend.clear();
        self.last_onset_ms = f64::NEG_INFINITY;
        self.pulse_strength = 0.0;
    }

    /// Current pulse envelope value [0.0, 1.0].
    #[must_use]
    pub fn pulse_strength(&self) -> f32 {
        self.pulse_strength
    }

    /// Timestamp of the last accepted onset; negative infinity before the
    /// first one.
    #[must_use]
    pub fn last_onset_ms(&self) -> f64 {
        self.last_onset_ms
    }

    /// Retained inter-onset intervals, oldest first.
    #[must_use]
    pub fn beat_intervals(&self) -> &BoundedHistory {
        &self.beat_intervals
    }

    /// Recent flux values for sparkline-style consumers, oldest first.
    #[must_use]
    pub fn flux_trend(&self) -> &BoundedHistory {
        &self.flux_trend
    }
}
