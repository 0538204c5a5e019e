//! Configuration management for the speech engine.
//!
//! Loads config from YAML files in standard locations. Hosts that keep
//! their settings as named string preferences (`capitalStrategy`,
//! `numberReadingStyle`, ...) can layer them on top with
//! [`Config::with_preferences`].

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// How a solo capital letter is conveyed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum CapitalStrategy {
    /// Speak the letter at a raised pitch.
    #[default]
    IncreasePitch,
    /// Speak "Cap" before the letter.
    AnnounceCapitals,
}

impl From<String> for CapitalStrategy {
    fn from(value: String) -> Self {
        Self::from_preference(&value)
    }
}

impl CapitalStrategy {
    /// Unknown values map to the default.
    pub fn from_preference(value: &str) -> Self {
        match value {
            "announceCapitals" => Self::AnnounceCapitals,
            _ => Self::IncreasePitch,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum NumberReadingStyle {
    /// Leave digit runs to the synthesizer's own number reading.
    #[default]
    AsWords,
    /// Spell digit runs one digit at a time.
    AsDigits,
}

impl From<String> for NumberReadingStyle {
    fn from(value: String) -> Self {
        Self::from_preference(&value)
    }
}

impl NumberReadingStyle {
    pub fn from_preference(value: &str) -> Self {
        match value {
            "asDigits" => Self::AsDigits,
            _ => Self::AsWords,
        }
    }
}

/// How much embedded punctuation is verbalized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum PunctuationEcho {
    NoPunctuation,
    #[default]
    SomePunctuation,
    AllPunctuation,
}

impl From<String> for PunctuationEcho {
    fn from(value: String) -> Self {
        Self::from_preference(&value)
    }
}

impl PunctuationEcho {
    pub fn from_preference(value: &str) -> Self {
        match value {
            "none" => Self::NoPunctuation,
            "all" => Self::AllPunctuation,
            _ => Self::SomePunctuation,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    pub capital_strategy: CapitalStrategy,
    pub number_reading_style: NumberReadingStyle,
    pub punctuation_echo: PunctuationEcho,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// Preferred voice display name. Empty means the system voice.
    pub name: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Normalized text longer than this is truncated before synthesis.
    pub max_utterance_chars: usize,
    /// Added to the pitch of solo capitals under `increasePitch`.
    pub capital_pitch_delta: f32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_utterance_chars: 1500,
            capital_pitch_delta: 0.3,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub normalizer: NormalizerConfig,
    pub voice: VoiceConfig,
    pub scheduler: SchedulerConfig,
}

impl Config {
    /// Load configuration from YAML file.
    ///
    /// Searches standard locations if no path is provided:
    /// 1. ./speech.yaml
    /// 2. ~/.config/speech-engine/speech.yaml
    /// 3. /etc/speech-engine/speech.yaml
    pub fn load(path: Option<&Path>) -> Self {
        let resolved = path.map(PathBuf::from).or_else(|| {
            let candidates = [
                std::env::current_dir().ok().map(|d| d.join("speech.yaml")),
                dirs::home_dir().map(|h| h.join(".config/speech-engine/speech.yaml")),
                Some(PathBuf::from("/etc/speech-engine/speech.yaml")),
            ];
            candidates.into_iter().flatten().find(|p| p.exists())
        });

        let Some(config_path) = resolved else {
            info!("No config file found, using defaults");
            return Self::default();
        };

        match Self::from_file(&config_path) {
            Ok(config) => {
                info!("Loaded config from {}", config_path.display());
                config
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {e}, using defaults", config_path.display());
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> crate::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(contents: &str) -> crate::Result<Self> {
        Ok(serde_yml::from_str(contents)?)
    }

    /// Overlay named string preferences.
    ///
    /// Recognized keys: `capitalStrategy`, `numberReadingStyle`,
    /// `punctuationEcho`, `voiceName`. Unknown keys are ignored and unknown
    /// values fall back to the key's default.
    pub fn with_preferences<'a, I>(mut self, preferences: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        for (key, value) in preferences {
            match key {
                "capitalStrategy" => {
                    self.normalizer.capital_strategy = CapitalStrategy::from_preference(value)
                }
                "numberReadingStyle" => {
                    self.normalizer.number_reading_style =
                        NumberReadingStyle::from_preference(value)
                }
                "punctuationEcho" => {
                    self.normalizer.punctuation_echo = PunctuationEcho::from_preference(value)
                }
                "voiceName" => self.voice.name = value.to_string(),
                other => debug!("Ignoring unknown preference: {other}"),
            }
        }
        self
    }
}
