//! speech-engine: speech output for screen readers.
//!
//! Normalizes on-screen text for speech, resolves the preferred voice
//! against the platform's installed voices, and schedules utterances with
//! queue / flush / category-flush semantics.

pub mod config;
pub mod error;
pub mod speech;

pub use config::{CapitalStrategy, Config, NumberReadingStyle, PunctuationEcho};
pub use error::{EngineError, Result};
pub use speech::normalizer::{Hints, NormalizedText, Normalizer};
pub use speech::scheduler::{EngineEvent, SpeechEngine};
pub use speech::synthesizer::{SynthesisEvents, SynthesisRequest, Synthesizer};
pub use speech::utterance::{Outcome, QueueMode, SpeakOptions, UtteranceHandle};
pub use speech::voice::{StaticCatalog, VoiceCatalog, VoiceInfo, VoiceResolver, SYSTEM_VOICE};
