//! Text normalization: raw on-screen text → speakable text.
//!
//! Pipeline:
//! 1. A sole character is spoken by name (blanks, punctuation) or as a letter
//! 2. Runs of 3+ identical punctuation marks → "<count> <plural>"
//! 3. Shorter runs of echoed marks → their names, one per mark
//! 4. Whitespace collapsed and trimmed
//! 5. A lone letter after a digit is uppercased ("5g" → "5G"), except "a"
//! 6. Digit runs spelled out when reading numbers as digits

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::punctuation::{self, EchoLevel, Mark};
use crate::config::{CapitalStrategy, NormalizerConfig, NumberReadingStyle, PunctuationEcho};

static LETTER_AFTER_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9])(\s*)([b-z])\b").expect("valid letter-after-digit pattern"));

static DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[0-9]+").expect("valid digit-run pattern"));

const MIN_SUMMARIZED_RUN: usize = 3;

/// Formatting the synthesizer should apply on top of the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Hints {
    /// Speak at a raised pitch (solo capital letter).
    pub raise_pitch: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    pub hints: Hints,
}

impl NormalizedText {
    fn plain(text: String) -> Self {
        Self {
            text,
            hints: Hints::default(),
        }
    }

    pub fn is_silent(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &NormalizerConfig {
        &self.config
    }

    /// Normalize `raw` for speech. Total over every input string.
    pub fn normalize(&self, raw: &str) -> NormalizedText {
        let mut chars = raw.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return self.sole_character(c);
        }

        // Digits are spelled before runs are summarized so the counts stay whole.
        let text = match self.config.number_reading_style {
            NumberReadingStyle::AsDigits => spell_digits(raw),
            NumberReadingStyle::AsWords => raw.to_string(),
        };
        let expanded = self.expand_punctuation(&text);
        let collapsed = collapse_whitespace(&expanded);
        NormalizedText::plain(capitalize_letters_after_digits(&collapsed))
    }

    fn sole_character(&self, c: char) -> NormalizedText {
        if let Some(name) = punctuation::sole_name(c) {
            return NormalizedText::plain(name.to_string());
        }
        if c.is_uppercase() {
            return match self.config.capital_strategy {
                CapitalStrategy::AnnounceCapitals => NormalizedText::plain(format!("Cap {c}")),
                CapitalStrategy::IncreasePitch => NormalizedText {
                    text: c.to_string(),
                    hints: Hints { raise_pitch: true },
                },
            };
        }
        NormalizedText::plain(c.to_uppercase().collect())
    }

    fn echoes(&self, mark: &Mark) -> bool {
        match self.config.punctuation_echo {
            PunctuationEcho::NoPunctuation => false,
            PunctuationEcho::SomePunctuation => mark.level == EchoLevel::Some,
            PunctuationEcho::AllPunctuation => true,
        }
    }

    fn summarizes(&self, mark: &Mark) -> bool {
        !mark.silenced || self.config.punctuation_echo == PunctuationEcho::AllPunctuation
    }

    fn expand_punctuation(&self, raw: &str) -> String {
        let chars: Vec<char> = raw.chars().collect();
        let mut out = String::with_capacity(raw.len());
        let mut i = 0;

        while i < chars.len() {
            let c = chars[i];
            let run = chars[i..].iter().take_while(|&&d| d == c).count();

            match punctuation::lookup(c) {
                Some(mark) if run >= MIN_SUMMARIZED_RUN && self.summarizes(mark) => {
                    out.push_str(&format!(" {run} {} ", mark.plural));
                }
                Some(mark) if self.echoes(mark) => {
                    for _ in 0..run {
                        out.push(' ');
                        out.push_str(mark.name);
                        out.push(' ');
                    }
                }
                _ => out.extend(std::iter::repeat(c).take(run)),
            }

            i += run;
        }

        out
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "5g network" would otherwise be read as "5 grams network".
fn capitalize_letters_after_digits(text: &str) -> String {
    LETTER_AFTER_DIGIT
        .replace_all(text, |caps: &Captures| {
            format!("{}{}{}", &caps[1], &caps[2], caps[3].to_uppercase())
        })
        .into_owned()
}

fn spell_digits(text: &str) -> String {
    DIGIT_RUN
        .replace_all(text, |caps: &Captures| {
            caps[0]
                .chars()
                .map(String::from)
                .collect::<Vec<_>>()
                .join(" ")
        })
        .into_owned()
}
