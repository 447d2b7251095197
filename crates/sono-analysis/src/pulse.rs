use sono_core::config::AnalysisConfig;

use crate::state::AnalysisState;

/// Per-frame update of the decaying onset envelope.
///
/// Called once per frame after onset detection. On a frame where an onset
/// fired, the detector's reset to `1.0` takes priority and no decay is
/// applied; every other frame decays `pulse * 0.86 - 0.02`, floored at
/// zero. Output is in [0.0, 1.0] for consumers to map to visual intensity.
///
/// # Example
/// ```
/// use sono_analysis::pulse::decay_pulse;
/// use sono_analysis::state::AnalysisState;
/// use sono_core::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// let mut state = AnalysisState::new(&config);
/// assert_eq!(decay_pulse(&mut state, &config, false), 0.0);
/// ```
pub fn decay_pulse(state: &mut AnalysisState, config: &AnalysisConfig, onset_frame: bool) -> f32 {
    if !onset_frame {
        state.pulse_strength =
            (state.pulse_strength * config.pulse_decay - config.pulse_fall).max(0.0);
    }
    state.pulse_strength
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn onset_frame_keeps_the_full_kick() {
        let config = AnalysisConfig::default();
        let mut state = AnalysisState::new(&config);
        state.pulse_strength = 1.0;

        assert_eq!(decay_pulse(&mut state, &config, true), 1.0);
    }

    #[test]
    fn decay_is_monotonic_and_floored() {
        let config = AnalysisConfig::default();
        let mut state = AnalysisState::new(&config);
        state.pulse_strength = 1.0;

        let mut prev = 1.0;
        for _ in 0..200 {
            let current = decay_pulse(&mut state, &config, false);
            assert!(current <= prev);
            assert!(current >= 0.0);
            prev = current;
        }
        assert_eq!(prev, 0.0, "envelope decays to rest");
    }

    #[test]
    fn first_decay_step_matches_the_curve() {
        let config = AnalysisConfig::default();
        let mut state = AnalysisState::new(&config);
        state.pulse_strength = 1.0;

        let value = decay_pulse(&mut state, &config, false);
        assert!((value - 0.84).abs() < 1e-6);
    }
}
