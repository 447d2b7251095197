/// Scalar descriptors derived from one magnitude spectrum.
///
/// All frequencies are in Hz; `flux` is the half-wave rectified spectral
/// change since the previous frame, normalized by the per-bin magnitude
/// ceiling. Always `>= 0`; `0.0` on the first frame of a session.
///
/// # Example
/// ```
/// use sono_core::frame::FeatureSnapshot;
/// let snap = FeatureSnapshot::default();
/// assert_eq!(snap.flux, 0.0);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FeatureSnapshot {
    /// Frequency of the highest-magnitude bin. Ties keep the lowest bin.
    pub peak_hz: f32,
    /// Energy-weighted mean frequency. `0.0` when total energy is zero.
    pub centroid_hz: f32,
    /// Frequency below which 85% of total energy resides (configurable
    /// fraction). Never exceeds the Nyquist frequency.
    pub rolloff_hz: f32,
    /// Half-wave rectified spectral flux, normalized to per-bin scale.
    pub flux: f32,
}

/// Mean band energies over the analyzer's preset low/mid/high ranges,
/// normalized to [0.0, 1.0].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BandLevels {
    /// Bass: 20–140 Hz.
    pub low: f32,
    /// Mid: 400–2600 Hz.
    pub mid: f32,
    /// Treble: 5200–14000 Hz.
    pub high: f32,
}

/// Result of one analysis frame.
///
/// Written by the analysis side, read by consumers (rendering, telemetry).
/// Fixed size, Copy, never dynamically allocated.
///
/// # Example
/// ```
/// use sono_core::frame::AnalysisFrame;
/// let frame = AnalysisFrame::default();
/// assert!(!frame.onset);
/// assert!(frame.bpm.is_none());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct AnalysisFrame {
    /// Spectral descriptors for this frame.
    pub features: FeatureSnapshot,
    /// RMS level of the time-domain waveform [0.0, 1.0].
    pub rms: f32,
    /// Low/mid/high band energies [0.0, 1.0].
    pub bands: BandLevels,
    /// The three highest-magnitude bin frequencies, descending magnitude.
    pub dominant_hz: [f32; 3],
    /// True if an onset was detected in this frame.
    pub onset: bool,
    /// Estimated tempo. `None` until at least one plausible inter-onset
    /// interval has been retained.
    pub bpm: Option<f64>,
    /// Decaying onset envelope [0.0, 1.0]. 1.0 on an onset frame.
    pub pulse_strength: f32,
}
