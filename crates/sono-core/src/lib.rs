/// Configuration, types, and shared structures for sonoscope.
///
/// This crate contains the shared types, the analyzer seam trait, and the
/// configuration logic used across the sonoscope workspace.

pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use config::AnalysisConfig;
pub use error::CoreError;
pub use frame::{AnalysisFrame, BandLevels, FeatureSnapshot};
pub use traits::SpectrumSource;
