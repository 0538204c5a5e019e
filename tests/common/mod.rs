//! Shared fakes for engine tests: a scripted synthesizer and a mutable catalog.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use speech_engine::{
    Result, SynthesisEvents, SynthesisRequest, Synthesizer, VoiceCatalog, VoiceInfo,
};
use tokio::sync::mpsc;

pub type Spoken = (SynthesisRequest, SynthesisEvents);

/// Hands every request to the test, which drives the platform events.
pub struct ManualSynthesizer {
    tx: mpsc::UnboundedSender<Spoken>,
    stops: AtomicUsize,
}

impl ManualSynthesizer {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<Spoken>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let synth = Arc::new(Self {
            tx,
            stops: AtomicUsize::new(0),
        });
        (synth, rx)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Synthesizer for ManualSynthesizer {
    async fn speak(&self, request: SynthesisRequest, events: SynthesisEvents) -> Result<()> {
        self.tx.send((request, events)).expect("test dropped request receiver");
        Ok(())
    }

    async fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Starts and finishes every request as soon as it is submitted.
#[derive(Default)]
pub struct InstantSynthesizer {
    pub spoken: Mutex<Vec<SynthesisRequest>>,
}

#[async_trait]
impl Synthesizer for InstantSynthesizer {
    async fn speak(&self, request: SynthesisRequest, events: SynthesisEvents) -> Result<()> {
        self.spoken.lock().unwrap().push(request);
        events.started();
        events.finished();
        Ok(())
    }

    async fn stop(&self) {}
}

/// Voice list the test can edit between resolutions.
#[derive(Default)]
pub struct MutableCatalog {
    pub voices: Mutex<Vec<VoiceInfo>>,
}

impl MutableCatalog {
    pub fn new(voices: Vec<VoiceInfo>) -> Arc<Self> {
        Arc::new(Self {
            voices: Mutex::new(voices),
        })
    }

    pub fn edit(&self, f: impl FnOnce(&mut Vec<VoiceInfo>)) {
        f(&mut self.voices.lock().unwrap());
    }
}

#[async_trait]
impl VoiceCatalog for MutableCatalog {
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>> {
        Ok(self.voices.lock().unwrap().clone())
    }
}

pub fn sample_voices() -> Vec<VoiceInfo> {
    vec![
        VoiceInfo::new("zh-CN", "Chinese"),
        VoiceInfo::new("zh-TW", "Chinese (Taiwan)"),
        VoiceInfo::new("es", "Spanish"),
        VoiceInfo::new("en-US", "U.S. English"),
    ]
}
