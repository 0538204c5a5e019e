//! Speech output: text → normalized utterance → voice → platform synthesizer.
//!
//! Components:
//! - `normalizer`: raw text to speakable text plus formatting hints
//! - `punctuation`: spoken names for punctuation and blanks
//! - `voice`: voice catalog capability and resolver with system-voice fallback
//! - `utterance`: queue modes, options and completion handles
//! - `synthesizer`: platform speak primitive and its progress sink
//! - `scheduler`: the queue owner (`SpeechEngine`)
//! - `console`: printing synthesizer for the harness binary

pub mod console;
pub mod normalizer;
pub mod punctuation;
pub mod scheduler;
pub mod synthesizer;
pub mod utterance;
pub mod voice;
