//! Console stand-in for a platform synthesizer: prints what would be spoken.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::synthesizer::{SynthesisEvents, SynthesisRequest, Synthesizer};
use crate::Result;

pub struct ConsoleSynthesizer {
    json: bool,
    per_char: Duration,
    // Bumped on stop so in-flight playback doesn't report completion.
    generation: Arc<AtomicU64>,
}

impl ConsoleSynthesizer {
    /// `per_char` paces simulated playback; zero finishes immediately.
    pub fn new(json: bool, per_char: Duration) -> Self {
        Self {
            json,
            per_char,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    fn playback_time(&self, text: &str) -> Duration {
        let chars = u32::try_from(text.chars().count()).unwrap_or(u32::MAX);
        self.per_char.saturating_mul(chars)
    }

    fn render(&self, request: &SynthesisRequest) -> String {
        if self.json {
            match serde_json::to_string(request) {
                Ok(line) => return line,
                Err(e) => warn!("Failed to serialize request: {e}"),
            }
        }
        format!("[{}] {}", request.voice, request.text)
    }
}

#[async_trait]
impl Synthesizer for ConsoleSynthesizer {
    async fn speak(&self, request: SynthesisRequest, events: SynthesisEvents) -> Result<()> {
        let generation = self.generation.load(Ordering::Relaxed);
        let current = self.generation.clone();
        let playback = self.playback_time(&request.text);
        let line = self.render(&request);

        tokio::spawn(async move {
            events.started();
            println!("{line}");
            tokio::time::sleep(playback).await;
            if current.load(Ordering::Relaxed) == generation {
                events.finished();
            } else {
                debug!("Playback of utterance {} stopped", events.utterance_id());
            }
        });
        Ok(())
    }

    async fn stop(&self) {
        self.generation.fetch_add(1, Ordering::Relaxed);
    }
}
