pub mod analyzer;
pub mod audio_stream;
pub mod low_pass;
pub mod source;

pub use analyzer::SpectrumAnalyzer;
pub use audio_stream::AudioStream;
pub use source::{LiveSource, ScriptedSource, SpectrumSource, SyntheticKick};
