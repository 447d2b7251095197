use sono_core::config::AnalysisConfig;
use sono_core::frame::{BandLevels, FeatureSnapshot};

use crate::state::AnalysisState;

/// Analyzer preset band ranges (Hz), matching the upstream FFT's
/// bass / mid / treble presets.
const BASS_RANGE_HZ: (f32, f32) = (20.0, 140.0);
const MID_RANGE_HZ: (f32, f32) = (400.0, 2600.0);
const TREBLE_RANGE_HZ: (f32, f32) = (5200.0, 14000.0);

/// Extract spectral descriptors from one magnitude spectrum.
///
/// Overwrites `state.prev_spectrum` with a copy of `spectrum` for the next
/// call. Flux is the half-wave rectified sum of positive per-bin increases
/// since the previous frame, normalized by the per-bin magnitude ceiling;
/// decreases are ignored. When there is no previous spectrum, or its bin
/// count differs (the upstream analyzer changed formats), flux is `0.0` for
/// this frame.
///
/// # Example
/// ```
/// use sono_analysis::features::compute_features;
/// use sono_analysis::state::AnalysisState;
/// use sono_core::AnalysisConfig;
///
/// let config = AnalysisConfig::default();
/// let mut state = AnalysisState::new(&config);
/// let spectrum = vec![0.0f32; 256];
/// let snap = compute_features(&spectrum, 22050.0, &mut state, &config);
/// assert_eq!(snap.centroid_hz, 0.0);
/// assert_eq!(snap.flux, 0.0);
/// ```
pub fn compute_features(
    spectrum: &[f32],
    nyquist_hz: f32,
    state: &mut AnalysisState,
    config: &AnalysisConfig,
) -> FeatureSnapshot {
    if spectrum.is_empty() {
        state.prev_spectrum = None;
        return FeatureSnapshot::default();
    }

    let n = spectrum.len();

    // Peak, centroid accumulators, and total energy in one pass.
    // Strict `>` keeps the earliest index on ties.
    let mut peak_idx = 0usize;
    let mut peak_val = -1.0f32;
    let mut weighted_sum = 0.0f32;
    let mut total_energy = 0.0f32;

    for (i, &val) in spectrum.iter().enumerate() {
        if val > peak_val {
            peak_val = val;
            peak_idx = i;
        }
        weighted_sum += i as f32 * val;
        total_energy += val;
    }

    // Half-wave rectified flux against the previous frame, skipped on a bin
    // count mismatch (treated the same as a missing previous spectrum).
    let mut raw_flux = 0.0f32;
    if let Some(prev) = state.prev_spectrum.as_ref().filter(|p| p.len() == n) {
        for (&cur, &old) in spectrum.iter().zip(prev.iter()) {
            raw_flux += (cur - old).max(0.0);
        }
    }

    // Rolloff: smallest bin whose cumulative energy reaches the threshold.
    // Silence keeps the last bin.
    let mut rolloff_idx = n - 1;
    if total_energy > 0.0 {
        let threshold = config.rolloff_fraction * total_energy;
        let mut cumulative = 0.0f32;
        for (i, &val) in spectrum.iter().enumerate() {
            cumulative += val;
            if cumulative >= threshold {
                rolloff_idx = i;
                break;
            }
        }
    }

    // Zero-alloc update: resize only on first frame or format change.
    match &mut state.prev_spectrum {
        Some(prev) => {
            if prev.len() != n {
                prev.resize(n, 0.0);
            }
            prev.copy_from_slice(spectrum);
        }
        None => state.prev_spectrum = Some(spectrum.to_vec()),
    }

    let n_f = n as f32;
    FeatureSnapshot {
        peak_hz: (peak_idx as f32 / n_f) * nyquist_hz,
        centroid_hz: if total_energy > 0.0 {
            (weighted_sum / total_energy / n_f) * nyquist_hz
        } else {
            0.0
        },
        rolloff_hz: (rolloff_idx as f32 / n_f) * nyquist_hz,
        flux: raw_flux / config.magnitude_scale,
    }
}

/// RMS level of a time-domain waveform, clamped to [0.0, 1.0].
///
/// `0.0` for an empty buffer (source without a waveform tap).
#[must_use]
pub fn compute_rms(waveform: &[f32]) -> f32 {
    if waveform.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = waveform.iter().map(|s| s * s).sum();
    (sum_sq / waveform.len() as f32).sqrt().min(1.0)
}

/// Mean energies over the low/mid/high preset bands, normalized to [0.0, 1.0].
#[must_use]
pub fn band_levels(spectrum: &[f32], nyquist_hz: f32, config: &AnalysisConfig) -> BandLevels {
    BandLevels {
        low: band_energy(spectrum, BASS_RANGE_HZ, nyquist_hz, config.magnitude_scale),
        mid: band_energy(spectrum, MID_RANGE_HZ, nyquist_hz, config.magnitude_scale),
        high: band_energy(spectrum, TREBLE_RANGE_HZ, nyquist_hz, config.magnitude_scale),
    }
}

/// Mean magnitude over a frequency band, normalized by the magnitude scale.
fn band_energy(spectrum: &[f32], range_hz: (f32, f32), nyquist_hz: f32, scale: f32) -> f32 {
    if spectrum.is_empty() || nyquist_hz <= 0.0 {
        return 0.0;
    }
    let bin_hz = nyquist_hz / spectrum.len() as f32;
    let lo = (range_hz.0 / bin_hz) as usize;
    let hi = ((range_hz.1 / bin_hz) as usize).min(spectrum.len());
    if lo >= hi {
        return 0.0;
    }
    let sum: f32 = spectrum[lo..hi].iter().sum();
    (sum / (hi - lo) as f32 / scale).min(1.0)
}

/// The three highest-magnitude bin frequencies, descending magnitude.
///
/// Ties keep the lower bin first. Spectra with fewer than three bins leave
/// the remaining slots at `0.0`.
#[must_use]
pub fn dominant_frequencies(spectrum: &[f32], nyquist_hz: f32) -> [f32; 3] {
    let mut out = [0.0f32; 3];
    if spectrum.is_empty() {
        return out;
    }

    let mut indexed: Vec<(f32, usize)> = spectrum
        .iter()
        .enumerate()
        .map(|(i, &v)| (v, i))
        .collect();
    // Stable sort: equal magnitudes keep ascending bin order.
    indexed.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

    let n_f = spectrum.len() as f32;
    for (slot, &(_, idx)) in out.iter_mut().zip(indexed.iter().take(3)) {
        *slot = (idx as f32 / n_f) * nyquist_hz;
    }
    out
}
