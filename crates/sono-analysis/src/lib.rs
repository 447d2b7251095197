// Per-frame spectral feature extraction and rhythmic event detection for sonoscope.

pub mod engine;
pub mod features;
pub mod history;
pub mod onset;
pub mod pulse;
pub mod state;
pub mod tempo;

pub use engine::AnalysisEngine;
pub use state::AnalysisState;
