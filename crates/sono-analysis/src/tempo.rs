use crate::state::AnalysisState;

/// Tempo estimate from the retained inter-onset intervals.
///
/// Returns `None` while no plausible interval has been retained — the
/// normal state during warm-up, not an error. Otherwise
/// `60000 / mean(intervals)`. A plain arithmetic mean is a deliberate
/// simplicity/latency tradeoff: no outlier rejection, octave correction, or
/// histogram clustering.
///
/// # Example
/// ```
/// use sono_analysis::state::AnalysisState;
/// use sono_analysis::tempo::estimate_bpm;
/// use sono_core::AnalysisConfig;
///
/// let state = AnalysisState::new(&AnalysisConfig::default());
/// assert!(estimate_bpm(&state).is_none());
/// ```
#[must_use]
pub fn estimate_bpm(state: &AnalysisState) -> Option<f64> {
    if state.beat_intervals.is_empty() {
        return None;
    }
    Some(60_000.0 / state.beat_intervals.mean())
}
