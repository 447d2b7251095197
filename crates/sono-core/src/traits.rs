/// Provides per-frame analysis input from the external analyzer.
///
/// The analyzer (FFT, capture) lives outside this workspace; implementations
/// hand the current frame off **by copy** into caller-owned buffers, never
/// as a live-mutable reference, so the analysis step has exclusive ownership
/// of what it reads.
///
/// # Example
/// ```
/// use sono_core::traits::SpectrumSource;
///
/// struct SilentSource;
/// impl SpectrumSource for SilentSource {
///     fn read_spectrum(&mut self, out: &mut Vec<f32>) {
///         out.clear();
///         out.resize(256, 0.0);
///     }
///     fn read_waveform(&mut self, out: &mut Vec<f32>) {
///         out.clear();
///         out.resize(512, 0.0);
///     }
///     fn nyquist_hz(&self) -> f32 { 22050.0 }
/// }
/// ```
pub trait SpectrumSource: Send + 'static {
    /// Write the current frame's magnitude spectrum into `out`.
    ///
    /// Bin `i` maps to frequency `(i / len) * nyquist_hz()`; magnitudes are
    /// in `[0, magnitude_scale]` (255 for the default analyzer).
    fn read_spectrum(&mut self, out: &mut Vec<f32>);

    /// Write the current frame's time-domain waveform into `out`.
    ///
    /// Samples are in `[-1, 1]`. May leave `out` empty if the source has no
    /// waveform tap; RMS then reads as `0`.
    fn read_waveform(&mut self, out: &mut Vec<f32>);

    /// Half the source sample rate; the highest representable frequency.
    fn nyquist_hz(&self) -> f32;
}
