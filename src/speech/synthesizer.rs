//! The platform's "speak this prepared string" primitive.

use async_trait::async_trait;
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use crate::Result;

/// A fully prepared utterance for the platform to speak.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisRequest {
    pub utterance_id: u64,
    pub text: String,
    pub voice: String,
    pub rate: f32,
    pub pitch: f32,
    pub volume: f32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum PlatformEvent {
    Started,
    Finished,
    Interrupted,
    Failed(String),
}

/// Progress sink handed to the platform with each request.
///
/// Sending is non-blocking and may happen from any thread. Events for an
/// utterance that is no longer active are ignored by the scheduler.
#[derive(Debug, Clone)]
pub struct SynthesisEvents {
    utterance_id: u64,
    tx: mpsc::UnboundedSender<(u64, PlatformEvent)>,
}

impl SynthesisEvents {
    pub(crate) fn new(utterance_id: u64, tx: mpsc::UnboundedSender<(u64, PlatformEvent)>) -> Self {
        Self { utterance_id, tx }
    }

    pub fn utterance_id(&self) -> u64 {
        self.utterance_id
    }

    /// Audible output has begun.
    pub fn started(&self) {
        self.send(PlatformEvent::Started);
    }

    /// Output ran to completion.
    pub fn finished(&self) {
        self.send(PlatformEvent::Finished);
    }

    /// Output was cut off by something outside the engine.
    pub fn interrupted(&self) {
        self.send(PlatformEvent::Interrupted);
    }

    pub fn failed(&self, reason: impl Into<String>) {
        self.send(PlatformEvent::Failed(reason.into()));
    }

    fn send(&self, event: PlatformEvent) {
        if self.tx.send((self.utterance_id, event)).is_err() {
            debug!("Speech engine gone, dropping event for utterance {}", self.utterance_id);
        }
    }
}

/// Platform speech primitive.
#[async_trait]
pub trait Synthesizer: Send + Sync {
    /// Begin speaking `request`. Returns once the platform has accepted it;
    /// start and end are reported later through `events`.
    async fn speak(&self, request: SynthesisRequest, events: SynthesisEvents) -> Result<()>;

    /// Stop in-flight speech immediately.
    async fn stop(&self);
}
