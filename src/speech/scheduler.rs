//! Utterance scheduler: one queue, one active utterance, one owner task.
//!
//! `speak()` hands the utterance to the scheduler task, which applies the
//! queue mode, then activates the head of the queue: normalize → resolve
//! voice → hand to the synthesizer → wait for the platform's end signal
//! before activating the next one.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use super::normalizer::Normalizer;
use super::synthesizer::{PlatformEvent, SynthesisEvents, SynthesisRequest, Synthesizer};
use super::utterance::{Outcome, QueueMode, SpeakOptions, Utterance, UtteranceHandle};
use super::voice::{VoiceCatalog, VoiceResolver};
use crate::config::{Config, SchedulerConfig, VoiceConfig};
use crate::{EngineError, Result};

const EVENT_CAPACITY: usize = 64;

const RATE_RANGE: (f32, f32) = (0.1, 10.0);
const PITCH_RANGE: (f32, f32) = (0.0, 2.0);
const VOLUME_RANGE: (f32, f32) = (0.0, 1.0);

/// Lifecycle notifications, in the order the scheduler observed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Started { id: u64 },
    Finished { id: u64, outcome: Outcome },
}

enum Command {
    Speak(Utterance),
    Stop,
}

struct Submitter {
    next_id: u64,
    tx: mpsc::UnboundedSender<Command>,
}

/// Handle to the speech engine. Cheap to clone; the scheduler task exits
/// once every clone is dropped.
#[derive(Clone)]
pub struct SpeechEngine {
    submitter: Arc<Mutex<Submitter>>,
    resolver: Arc<VoiceResolver>,
    speaking: Arc<AtomicBool>,
    events: broadcast::Sender<EngineEvent>,
}

impl SpeechEngine {
    /// Spawn the scheduler task. Must be called within a tokio runtime.
    pub fn new(
        config: Config,
        catalog: Arc<dyn VoiceCatalog>,
        synthesizer: Arc<dyn Synthesizer>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (platform_tx, platform_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let resolver = Arc::new(VoiceResolver::new(catalog));
        let speaking = Arc::new(AtomicBool::new(false));

        let scheduler = Scheduler {
            normalizer: Normalizer::new(config.normalizer),
            voice: config.voice,
            limits: config.scheduler,
            resolver: resolver.clone(),
            synthesizer,
            queue: VecDeque::new(),
            active: None,
            platform_tx,
            speaking: speaking.clone(),
            events: events.clone(),
        };
        tokio::spawn(scheduler.run(rx, platform_rx));

        Self {
            submitter: Arc::new(Mutex::new(Submitter { next_id: 1, tx })),
            resolver,
            speaking,
            events,
        }
    }

    /// Submit `text` for speech under `mode`.
    pub fn speak(
        &self,
        text: impl Into<String>,
        mode: QueueMode,
        options: SpeakOptions,
    ) -> Result<UtteranceHandle> {
        let mut submitter = self.submitter.lock().unwrap();
        let id = submitter.next_id;
        let (utterance, handle) = Utterance::new(id, text.into(), mode, options);
        submitter
            .tx
            .send(Command::Speak(utterance))
            .map_err(|_| EngineError::Closed)?;
        submitter.next_id += 1;
        Ok(handle)
    }

    /// Cancel everything pending and speaking, `do_not_interrupt` included.
    pub fn stop(&self) -> Result<()> {
        self.submitter
            .lock()
            .unwrap()
            .tx
            .send(Command::Stop)
            .map_err(|_| EngineError::Closed)
    }

    pub fn is_speaking(&self) -> bool {
        self.speaking.load(Ordering::Relaxed)
    }

    pub fn current_voice(&self) -> Option<String> {
        self.resolver.current_voice()
    }

    pub fn resolver(&self) -> &VoiceResolver {
        &self.resolver
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }
}

struct Scheduler {
    normalizer: Normalizer,
    voice: VoiceConfig,
    limits: SchedulerConfig,
    resolver: Arc<VoiceResolver>,
    synthesizer: Arc<dyn Synthesizer>,
    queue: VecDeque<Utterance>,
    active: Option<Utterance>,
    platform_tx: mpsc::UnboundedSender<(u64, PlatformEvent)>,
    speaking: Arc<AtomicBool>,
    events: broadcast::Sender<EngineEvent>,
}

impl Scheduler {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<Command>,
        mut platform: mpsc::UnboundedReceiver<(u64, PlatformEvent)>,
    ) {
        loop {
            tokio::select! {
                biased;
                command = commands.recv() => match command {
                    Some(command) => self.apply(command).await,
                    None => break,
                },
                Some((id, event)) = platform.recv() => self.on_platform_event(id, event),
            }
            // Apply the mode policy of a whole burst of speak() calls before
            // anything in it is activated.
            while let Ok(command) = commands.try_recv() {
                self.apply(command).await;
            }
            self.advance().await;
        }

        debug!("Speech engine handles dropped, shutting down scheduler");
        self.stop_all().await;
    }

    async fn apply(&mut self, command: Command) {
        match command {
            Command::Speak(utterance) => self.enqueue(utterance).await,
            Command::Stop => self.stop_all().await,
        }
    }

    async fn enqueue(&mut self, utterance: Utterance) {
        debug!(
            "Utterance {} queued ({:?}, category={:?})",
            utterance.id, utterance.mode, utterance.options.category
        );

        if utterance.mode != QueueMode::Queue {
            let cancel_active = self
                .active
                .as_ref()
                .is_some_and(|active| should_cancel(active, &utterance));
            if cancel_active {
                if let Some(active) = self.active.take() {
                    self.synthesizer.stop().await;
                    self.finish(active, Outcome::Interrupted);
                }
            }

            let (cancelled, kept): (Vec<_>, Vec<_>) = self
                .queue
                .drain(..)
                .partition(|pending| should_cancel(pending, &utterance));
            self.queue = kept.into();
            for pending in cancelled {
                self.finish(pending, Outcome::Interrupted);
            }
        }

        self.queue.push_back(utterance);
    }

    async fn stop_all(&mut self) {
        if let Some(active) = self.active.take() {
            self.synthesizer.stop().await;
            self.finish(active, Outcome::Interrupted);
        }
        while let Some(pending) = self.queue.pop_front() {
            self.finish(pending, Outcome::Interrupted);
        }
        self.speaking.store(false, Ordering::Relaxed);
    }

    fn on_platform_event(&mut self, id: u64, event: PlatformEvent) {
        let Some(active) = self.active.as_mut().filter(|a| a.id == id) else {
            debug!("Ignoring {event:?} for inactive utterance {id}");
            return;
        };

        match event {
            PlatformEvent::Started => {
                if !active.has_started() {
                    active.notify_started();
                    self.emit(EngineEvent::Started { id });
                }
            }
            PlatformEvent::Finished => {
                if let Some(mut active) = self.active.take() {
                    // Keep start/end paired even if the platform skipped "start".
                    if !active.has_started() {
                        active.notify_started();
                        self.emit(EngineEvent::Started { id });
                    }
                    self.finish(active, Outcome::Completed);
                }
            }
            PlatformEvent::Interrupted => {
                if let Some(active) = self.active.take() {
                    self.finish(active, Outcome::Interrupted);
                }
            }
            PlatformEvent::Failed(reason) => {
                warn!("Synthesis failed for utterance {id}: {reason}");
                if let Some(active) = self.active.take() {
                    self.finish(active, Outcome::Failed(reason));
                }
            }
        }
    }

    /// Activate queued utterances until one is handed to the platform.
    async fn advance(&mut self) {
        while self.active.is_none() {
            let Some(mut utterance) = self.queue.pop_front() else {
                break;
            };

            let requested = utterance
                .options
                .voice
                .clone()
                .unwrap_or_else(|| self.voice.name.clone());
            let voice = self.resolver.resolve(&requested).await;

            let normalized = self.normalizer.normalize(&utterance.text);
            if normalized.is_silent() {
                // Nothing to say, but callers still get their start/end pair.
                utterance.notify_started();
                self.emit(EngineEvent::Started { id: utterance.id });
                self.finish(utterance, Outcome::Completed);
                continue;
            }

            let mut text = normalized.text;
            if let Some((cut, _)) = text.char_indices().nth(self.limits.max_utterance_chars) {
                debug!("Truncating utterance {} to {cut} bytes", utterance.id);
                text.truncate(cut);
            }

            let mut pitch = utterance.options.pitch.unwrap_or(self.voice.pitch);
            if normalized.hints.raise_pitch {
                pitch += self.limits.capital_pitch_delta;
            }
            let request = SynthesisRequest {
                utterance_id: utterance.id,
                text,
                voice,
                rate: clamp(utterance.options.rate.unwrap_or(self.voice.rate), RATE_RANGE),
                pitch: clamp(pitch, PITCH_RANGE),
                volume: clamp(utterance.options.volume.unwrap_or(self.voice.volume), VOLUME_RANGE),
            };

            info!(
                "Speaking utterance {} with {}: \"{}\"",
                utterance.id,
                request.voice,
                preview(&request.text)
            );

            let events = SynthesisEvents::new(utterance.id, self.platform_tx.clone());
            let id = utterance.id;
            self.active = Some(utterance);
            self.speaking.store(true, Ordering::Relaxed);

            if let Err(e) = self.synthesizer.speak(request, events).await {
                warn!("Synthesizer rejected utterance {id}: {e}");
                if let Some(active) = self.active.take() {
                    self.finish(active, Outcome::Failed(e.to_string()));
                }
            }
        }

        self.speaking.store(self.active.is_some(), Ordering::Relaxed);
    }

    fn finish(&self, utterance: Utterance, outcome: Outcome) {
        let id = utterance.id;
        debug!("Utterance {id} finished: {outcome:?}");
        utterance.notify_finished(outcome.clone());
        self.emit(EngineEvent::Finished { id, outcome });
    }

    fn emit(&self, event: EngineEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn should_cancel(existing: &Utterance, incoming: &Utterance) -> bool {
    if existing.options.do_not_interrupt {
        return false;
    }
    match incoming.mode {
        QueueMode::Queue => false,
        QueueMode::Flush => true,
        QueueMode::CategoryFlush => existing.options.category == incoming.options.category,
    }
}

fn clamp(value: f32, (min, max): (f32, f32)) -> f32 {
    value.clamp(min, max)
}

fn preview(text: &str) -> String {
    let head: String = text.chars().take(80).collect();
    if head.len() < text.len() {
        format!("{head}...")
    } else {
        head
    }
}
