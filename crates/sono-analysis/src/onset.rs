use sono_core::config::AnalysisConfig;

use crate::state::AnalysisState;

/// Adaptive-threshold onset decision for one frame.
///
/// Order matters and is part of the contract: the current flux is pushed
/// into the history *before* the threshold statistics are computed, and the
/// refractory comparison reads `last_onset_ms` *before* overwriting it.
///
/// On a fired onset: the timestamp is retained (FIFO), the interval since
/// the previous accepted onset is retained when it lies in the plausible
/// beat window, and the pulse envelope is kicked to `1.0`.
///
/// # Example
/// ```
/// use sono_analysis::onset::detect_onset;
/// use sono_analysis::state::AnalysisState;
/// use sono_core::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// let mut state = AnalysisState::new(&config);
/// // A lone frame never clears its own mean + floor.
/// assert!(!detect_onset(0.1, 0.0, &mut state, &config));
/// ```
pub fn detect_onset(
    flux: f32,
    now_ms: f64,
    state: &mut AnalysisState,
    config: &AnalysisConfig,
) -> bool {
    state.flux_history.push(f64::from(flux));

    let mean = state.flux_history.mean();
    let sigma = state.flux_history.variance().sqrt();
    let adaptive_threshold =
        mean + f64::from(config.sigma_factor) * sigma + f64::from(config.threshold_floor);

    let onset = f64::from(flux) > adaptive_threshold
        && now_ms - state.last_onset_ms > config.refractory_ms;

    if onset {
        // Interval against the previous accepted onset, read before this
        // timestamp lands in the history.
        let prev = state.onset_times.last();
        state.last_onset_ms = now_ms;
        state.onset_times.push(now_ms);

        if let Some(prev_ms) = prev {
            let interval = now_ms - prev_ms;
            if (config.min_beat_interval_ms..=config.max_beat_interval_ms).contains(&interval) {
                state.beat_intervals.push(interval);
            }
        }

        state.pulse_strength = 1.0;
        log::debug!("onset at {now_ms:.1} ms (flux {flux:.3} > threshold {adaptive_threshold:.3})");
    }

    onset
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (AnalysisState, AnalysisConfig) {
        let config = AnalysisConfig::default();
        let state = AnalysisState::new(&config);
        (state, config)
    }

    /// Fill the flux history with quiet frames so the threshold is near the
    /// additive floor.
    fn warm_up(state: &mut AnalysisState, config: &AnalysisConfig, frames: usize, start_ms: f64) {
        for i in 0..frames {
            detect_onset(0.0, start_ms + i as f64 * 16.7, state, config);
        }
    }

    #[test]
    fn spike_after_quiet_history_fires() {
        let (mut state, config) = fresh();
        warm_up(&mut state, &config, 40, 0.0);

        assert!(detect_onset(2.0, 1000.0, &mut state, &config));
        assert_eq!(state.last_onset_ms, 1000.0);
        assert_eq!(state.pulse_strength, 1.0);
        assert_eq!(state.onset_times.last(), Some(1000.0));
    }

    #[test]
    fn quiet_frames_never_fire() {
        let (mut state, config) = fresh();
        for i in 0..200 {
            assert!(!detect_onset(0.0, i as f64 * 16.7, &mut state, &config));
        }
        assert!(state.onset_times.is_empty());
    }

    #[test]
    fn refractory_suppresses_rapid_retriggering() {
        let (mut state, config) = fresh();

        // Geometric flux growth keeps every frame above the adaptive
        // threshold once the history holds a few values; 60 fps spacing.
        let mut fired: Vec<f64> = Vec::new();
        for i in 0..60u32 {
            let now = f64::from(i) * 16.7;
            let flux = 3.0f32.powi(i as i32);
            if detect_onset(flux, now, &mut state, &config) {
                fired.push(now);
            }
        }

        assert!(fired.len() >= 2, "growth sequence should fire repeatedly");
        for pair in fired.windows(2) {
            assert!(
                pair[1] - pair[0] > config.refractory_ms,
                "onsets {:.1} and {:.1} violate the refractory period",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn plausible_intervals_are_retained() {
        let (mut state, config) = fresh();
        warm_up(&mut state, &config, 40, 0.0);

        assert!(detect_onset(2.0, 1000.0, &mut state, &config));
        warm_up(&mut state, &config, 10, 1010.0);
        assert!(detect_onset(2.0, 1500.0, &mut state, &config));

        assert_eq!(state.beat_intervals.len(), 1);
        assert_eq!(state.beat_intervals.last(), Some(500.0));
    }

    #[test]
    fn implausible_intervals_are_discarded() {
        let (mut state, config) = fresh();
        warm_up(&mut state, &config, 40, 0.0);

        // 2000 ms apart: slower than the 1500 ms beat window allows.
        assert!(detect_onset(2.0, 1000.0, &mut state, &config));
        warm_up(&mut state, &config, 10, 1010.0);
        assert!(detect_onset(2.0, 3000.0, &mut state, &config));

        assert_eq!(state.onset_times.len(), 2);
        assert!(state.beat_intervals.is_empty());
    }

    #[test]
    fn flux_history_is_bounded() {
        let (mut state, config) = fresh();
        for i in 0..100 {
            detect_onset(0.0, f64::from(i) * 16.7, &mut state, &config);
        }
        assert_eq!(state.flux_history.len(), config.flux_history_len);
    }

    #[test]
    fn onset_times_are_bounded_fifo() {
        let (mut state, config) = fresh();

        // 20 accepted onsets, 1 second apart, with quiet frames between to
        // keep the threshold low.
        let mut t = 0.0;
        let mut accepted = 0;
        warm_up(&mut state, &config, 40, t);
        t += 40.0 * 16.7;
        while accepted < 20 {
            if detect_onset(5.0, t, &mut state, &config) {
                accepted += 1;
            }
            warm_up(&mut state, &config, 20, t + 10.0);
            t += 1000.0;
        }

        assert_eq!(state.onset_times.len(), config.onset_history_len);
        // The retained timestamps are the most recent ones.
        let oldest = state.onset_times.iter().next().unwrap();
        assert!(oldest > 0.0);
        assert_eq!(state.onset_times.last(), Some(state.last_onset_ms));
    }
}
