//! Utterances, queue modes and the per-utterance completion handle.

use tokio::sync::oneshot;

/// How a new utterance interacts with those already pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueueMode {
    /// Append after everything pending or speaking.
    #[default]
    Queue,
    /// Cancel everything pending and speaking, then speak.
    Flush,
    /// Cancel only utterances of the same category, then enqueue.
    CategoryFlush,
}

impl QueueMode {
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "flush" => Self::Flush,
            "category_flush" | "category-flush" => Self::CategoryFlush,
            _ => Self::Queue,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SpeakOptions {
    /// Category tag matched by [`QueueMode::CategoryFlush`].
    pub category: Option<String>,
    /// Never cancelled by a flush.
    pub do_not_interrupt: bool,
    /// Voice name overriding the configured preference.
    pub voice: Option<String>,
    pub rate: Option<f32>,
    pub pitch: Option<f32>,
    pub volume: Option<f32>,
}

impl SpeakOptions {
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn do_not_interrupt(mut self) -> Self {
        self.do_not_interrupt = true;
        self
    }

    pub fn voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = Some(voice.into());
        self
    }

    pub fn rate(mut self, rate: f32) -> Self {
        self.rate = Some(rate);
        self
    }

    pub fn pitch(mut self, pitch: f32) -> Self {
        self.pitch = Some(pitch);
        self
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = Some(volume);
        self
    }
}

/// How an utterance ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Cancelled by a flush or stop, or interrupted by the platform.
    Interrupted,
    /// The platform reported a synthesis error.
    Failed(String),
}

pub(crate) struct Utterance {
    pub id: u64,
    pub text: String,
    pub mode: QueueMode,
    pub options: SpeakOptions,
    started_tx: Option<oneshot::Sender<()>>,
    finished_tx: Option<oneshot::Sender<Outcome>>,
}

impl Utterance {
    pub fn new(
        id: u64,
        text: String,
        mode: QueueMode,
        options: SpeakOptions,
    ) -> (Self, UtteranceHandle) {
        let (started_tx, started_rx) = oneshot::channel();
        let (finished_tx, finished_rx) = oneshot::channel();
        let utterance = Self {
            id,
            text,
            mode,
            options,
            started_tx: Some(started_tx),
            finished_tx: Some(finished_tx),
        };
        let handle = UtteranceHandle {
            id,
            started: Some(started_rx),
            did_start: None,
            finished: finished_rx,
        };
        (utterance, handle)
    }

    pub fn has_started(&self) -> bool {
        self.started_tx.is_none()
    }

    pub fn notify_started(&mut self) {
        if let Some(tx) = self.started_tx.take() {
            let _ = tx.send(());
        }
    }

    /// Deliver the outcome. An utterance that never started drops its start
    /// signal unsent.
    pub fn notify_finished(mut self, outcome: Outcome) {
        self.started_tx = None;
        if let Some(tx) = self.finished_tx.take() {
            let _ = tx.send(outcome);
        }
    }
}

/// Caller's view of a submitted utterance.
#[derive(Debug)]
pub struct UtteranceHandle {
    id: u64,
    started: Option<oneshot::Receiver<()>>,
    did_start: Option<bool>,
    finished: oneshot::Receiver<Outcome>,
}

impl UtteranceHandle {
    /// Sequence id; submission order.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Resolves `true` once audible output begins, or `false` if the
    /// utterance ended without ever starting.
    pub async fn started(&mut self) -> bool {
        if let Some(rx) = self.started.take() {
            self.did_start = Some(rx.await.is_ok());
        }
        self.did_start.unwrap_or(false)
    }

    /// Resolves with the utterance's outcome.
    pub async fn finished(self) -> Outcome {
        self.finished.await.unwrap_or(Outcome::Interrupted)
    }
}
