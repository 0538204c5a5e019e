//! Queueing, interruption and callback ordering of the speech engine.

mod common;

use std::sync::Arc;

use common::{sample_voices, InstantSynthesizer, ManualSynthesizer, MutableCatalog};
use speech_engine::{
    Config, EngineError, EngineEvent, Outcome, QueueMode, Result, SpeakOptions, SpeechEngine,
    SynthesisEvents, SynthesisRequest, Synthesizer, SYSTEM_VOICE,
};
use tokio::sync::broadcast;

fn catalog() -> Arc<MutableCatalog> {
    MutableCatalog::new(sample_voices())
}

async fn next_events(rx: &mut broadcast::Receiver<EngineEvent>, n: usize) -> Vec<EngineEvent> {
    let mut events = Vec::with_capacity(n);
    for _ in 0..n {
        events.push(rx.recv().await.unwrap());
    }
    events
}

#[tokio::test]
async fn flush_cancels_everything_before_it() {
    let (synth, mut requests) = ManualSynthesizer::new();
    let engine = SpeechEngine::new(Config::default(), catalog(), synth.clone());

    let mut alpha = engine.speak("alpha", QueueMode::Queue, SpeakOptions::default()).unwrap();
    let (first, _) = requests.recv().await.unwrap();
    assert_eq!(first.text, "alpha");

    let mut bravo = engine.speak("bravo", QueueMode::Queue, SpeakOptions::default()).unwrap();
    let mut charlie = engine.speak("charlie", QueueMode::Flush, SpeakOptions::default()).unwrap();
    let (second, events) = requests.recv().await.unwrap();
    assert_eq!(second.text, "charlie");
    events.started();
    events.finished();

    assert!(!alpha.started().await);
    assert_eq!(alpha.finished().await, Outcome::Interrupted);
    assert!(!bravo.started().await);
    assert_eq!(bravo.finished().await, Outcome::Interrupted);
    assert!(charlie.started().await);
    assert_eq!(charlie.finished().await, Outcome::Completed);
    assert_eq!(synth.stops(), 1);
}

#[tokio::test]
async fn flush_in_same_burst_cancels_before_activation() {
    let (synth, mut requests) = ManualSynthesizer::new();
    let engine = SpeechEngine::new(Config::default(), catalog(), synth.clone());

    let mut alpha = engine.speak("alpha", QueueMode::Queue, SpeakOptions::default()).unwrap();
    let mut bravo = engine.speak("bravo", QueueMode::Queue, SpeakOptions::default()).unwrap();
    let charlie = engine.speak("charlie", QueueMode::Flush, SpeakOptions::default()).unwrap();

    let (request, events) = requests.recv().await.unwrap();
    assert_eq!(request.text, "charlie");
    events.finished();

    assert!(!alpha.started().await);
    assert_eq!(alpha.finished().await, Outcome::Interrupted);
    assert!(!bravo.started().await);
    assert_eq!(bravo.finished().await, Outcome::Interrupted);
    assert_eq!(charlie.finished().await, Outcome::Completed);
    assert_eq!(synth.stops(), 0);
    assert!(requests.try_recv().is_err());
}

#[tokio::test]
async fn flush_wins_against_instant_platform() {
    let synth = Arc::new(InstantSynthesizer::default());
    let engine = SpeechEngine::new(Config::default(), catalog(), synth.clone());

    for round in 0..200 {
        let mut a = engine.speak("a", QueueMode::Queue, SpeakOptions::default()).unwrap();
        let mut b = engine.speak("b", QueueMode::Queue, SpeakOptions::default()).unwrap();
        let c = engine.speak("c", QueueMode::Flush, SpeakOptions::default()).unwrap();

        assert_eq!(c.finished().await, Outcome::Completed, "round {round}");
        assert!(!a.started().await, "round {round}");
        assert_eq!(a.finished().await, Outcome::Interrupted, "round {round}");
        assert!(!b.started().await, "round {round}");
        assert_eq!(b.finished().await, Outcome::Interrupted, "round {round}");
    }

    let spoken = synth.spoken.lock().unwrap();
    assert_eq!(spoken.len(), 200);
    assert!(spoken.iter().all(|r| r.text == "c"));
}

#[tokio::test]
async fn completions_are_fifo() {
    let synth = Arc::new(InstantSynthesizer::default());
    let engine = SpeechEngine::new(Config::default(), catalog(), synth.clone());
    let mut events = engine.subscribe();

    let handles: Vec<_> = ["one", "two", "three"]
        .into_iter()
        .map(|text| engine.speak(text, QueueMode::Queue, SpeakOptions::default()).unwrap())
        .collect();
    let ids: Vec<u64> = handles.iter().map(|h| h.id()).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));

    let observed = next_events(&mut events, 6).await;
    let expected: Vec<EngineEvent> = ids
        .iter()
        .flat_map(|&id| {
            [
                EngineEvent::Started { id },
                EngineEvent::Finished {
                    id,
                    outcome: Outcome::Completed,
                },
            ]
        })
        .collect();
    assert_eq!(observed, expected);

    for handle in handles {
        assert_eq!(handle.finished().await, Outcome::Completed);
    }
    let spoken: Vec<String> = synth.spoken.lock().unwrap().iter().map(|r| r.text.clone()).collect();
    assert_eq!(spoken, ["one", "two", "three"]);
}

#[tokio::test]
async fn next_utterance_waits_for_platform_end() {
    let (synth, mut requests) = ManualSynthesizer::new();
    let engine = SpeechEngine::new(Config::default(), catalog(), synth);

    let first = engine.speak("first", QueueMode::Queue, SpeakOptions::default()).unwrap();
    let second = engine.speak("second", QueueMode::Queue, SpeakOptions::default()).unwrap();

    let (request, events) = requests.recv().await.unwrap();
    assert_eq!(request.text, "first");
    events.started();
    tokio::task::yield_now().await;
    assert!(requests.try_recv().is_err());
    assert!(engine.is_speaking());

    events.finished();
    assert_eq!(first.finished().await, Outcome::Completed);

    let (request, events) = requests.recv().await.unwrap();
    assert_eq!(request.text, "second");
    events.finished();
    assert_eq!(second.finished().await, Outcome::Completed);
}

#[tokio::test]
async fn empty_strings_still_call_back() {
    let (synth, mut requests) = ManualSynthesizer::new();
    let engine = SpeechEngine::new(Config::default(), catalog(), synth);

    for text in ["", "  ", " \u{a0} "] {
        let mut handle = engine.speak(text, QueueMode::Queue, SpeakOptions::default()).unwrap();
        assert!(handle.started().await, "{text:?}");
        assert_eq!(handle.finished().await, Outcome::Completed, "{text:?}");
    }
    assert!(requests.try_recv().is_err());
}

#[tokio::test]
async fn silent_utterance_still_resolves_voice() {
    let (synth, mut requests) = ManualSynthesizer::new();
    let engine = SpeechEngine::new(Config::default(), catalog(), synth);
    assert!(engine.current_voice().is_none());

    let handle = engine.speak("", QueueMode::Queue, SpeakOptions::default()).unwrap();
    assert_eq!(handle.finished().await, Outcome::Completed);
    assert_eq!(engine.current_voice().as_deref(), Some(SYSTEM_VOICE));

    let handle = engine
        .speak("   ", QueueMode::Queue, SpeakOptions::default().voice("Spanish"))
        .unwrap();
    assert_eq!(handle.finished().await, Outcome::Completed);
    assert_eq!(engine.current_voice().as_deref(), Some("Spanish"));
    assert!(requests.try_recv().is_err());
}

#[tokio::test]
async fn category_flush_only_cancels_same_category() {
    let (synth, mut requests) = ManualSynthesizer::new();
    let engine = SpeechEngine::new(Config::default(), catalog(), synth.clone());
    let nav = || SpeakOptions::default().category("nav");

    let nav1 = engine.speak("nav one", QueueMode::Queue, nav()).unwrap();
    let (request, _) = requests.recv().await.unwrap();
    assert_eq!(request.text, "nav one");

    let live = engine
        .speak("live region", QueueMode::Queue, SpeakOptions::default().category("live"))
        .unwrap();
    let nav2 = engine.speak("nav two", QueueMode::Queue, nav()).unwrap();
    let nav3 = engine.speak("nav three", QueueMode::CategoryFlush, nav()).unwrap();

    let (request, events) = requests.recv().await.unwrap();
    assert_eq!(request.text, "live region");
    events.finished();
    let (request, events) = requests.recv().await.unwrap();
    assert_eq!(request.text, "nav three");
    events.finished();

    assert_eq!(nav1.finished().await, Outcome::Interrupted);
    assert_eq!(nav2.finished().await, Outcome::Interrupted);
    assert_eq!(live.finished().await, Outcome::Completed);
    assert_eq!(nav3.finished().await, Outcome::Completed);
    assert_eq!(synth.stops(), 1);
}

#[tokio::test]
async fn do_not_interrupt_survives_flush() {
    let (synth, mut requests) = ManualSynthesizer::new();
    let engine = SpeechEngine::new(Config::default(), catalog(), synth.clone());

    let alert = engine
        .speak("battery low", QueueMode::Queue, SpeakOptions::default().do_not_interrupt())
        .unwrap();
    let next = engine.speak("next item", QueueMode::Flush, SpeakOptions::default()).unwrap();

    let (request, events) = requests.recv().await.unwrap();
    assert_eq!(request.text, "battery low");
    events.started();
    events.finished();
    assert_eq!(alert.finished().await, Outcome::Completed);

    let (request, events) = requests.recv().await.unwrap();
    assert_eq!(request.text, "next item");
    events.finished();
    assert_eq!(next.finished().await, Outcome::Completed);
    assert_eq!(synth.stops(), 0);
}

#[tokio::test]
async fn events_for_cancelled_utterances_are_ignored() {
    let (synth, mut requests) = ManualSynthesizer::new();
    let engine = SpeechEngine::new(Config::default(), catalog(), synth);
    let mut observed = engine.subscribe();

    let old = engine.speak("old", QueueMode::Queue, SpeakOptions::default()).unwrap();
    let (_, old_events) = requests.recv().await.unwrap();
    let new = engine.speak("new", QueueMode::Flush, SpeakOptions::default()).unwrap();
    let (_, new_events) = requests.recv().await.unwrap();

    old_events.started();
    old_events.finished();
    new_events.started();
    new_events.finished();

    let (old_id, new_id) = (old.id(), new.id());
    assert_eq!(old.finished().await, Outcome::Interrupted);
    assert_eq!(new.finished().await, Outcome::Completed);
    assert_eq!(
        next_events(&mut observed, 3).await,
        vec![
            EngineEvent::Finished {
                id: old_id,
                outcome: Outcome::Interrupted
            },
            EngineEvent::Started { id: new_id },
            EngineEvent::Finished {
                id: new_id,
                outcome: Outcome::Completed
            },
        ]
    );
}

#[tokio::test]
async fn platform_failure_advances_queue() {
    let (synth, mut requests) = ManualSynthesizer::new();
    let engine = SpeechEngine::new(Config::default(), catalog(), synth);

    let broken = engine.speak("broken", QueueMode::Queue, SpeakOptions::default()).unwrap();
    let fine = engine.speak("fine", QueueMode::Queue, SpeakOptions::default()).unwrap();

    let (_, events) = requests.recv().await.unwrap();
    events.failed("audio device lost");
    assert_eq!(
        broken.finished().await,
        Outcome::Failed("audio device lost".into())
    );

    let (request, events) = requests.recv().await.unwrap();
    assert_eq!(request.text, "fine");
    events.finished();
    assert_eq!(fine.finished().await, Outcome::Completed);
}

struct RejectingSynthesizer;

#[async_trait::async_trait]
impl Synthesizer for RejectingSynthesizer {
    async fn speak(&self, _request: SynthesisRequest, _events: SynthesisEvents) -> Result<()> {
        Err(EngineError::Synthesizer("no speech service".into()))
    }

    async fn stop(&self) {}
}

#[tokio::test]
async fn rejected_request_reports_failure() {
    let engine = SpeechEngine::new(Config::default(), catalog(), Arc::new(RejectingSynthesizer));
    let handle = engine.speak("hello", QueueMode::Queue, SpeakOptions::default()).unwrap();
    assert_eq!(
        handle.finished().await,
        Outcome::Failed("Synthesizer error: no speech service".into())
    );
    assert!(!engine.is_speaking());
}

#[tokio::test]
async fn resolves_configured_and_override_voices() {
    let (synth, mut requests) = ManualSynthesizer::new();
    let config = Config::default().with_preferences([("voiceName", "U.S. English")]);
    let engine = SpeechEngine::new(config, catalog(), synth);
    assert!(engine.current_voice().is_none());

    engine.speak("hello", QueueMode::Queue, SpeakOptions::default()).unwrap();
    let (request, events) = requests.recv().await.unwrap();
    assert_eq!(request.voice, "U.S. English");
    assert_eq!(engine.current_voice().as_deref(), Some("U.S. English"));
    events.finished();

    engine
        .speak("hola", QueueMode::Queue, SpeakOptions::default().voice("Spanish"))
        .unwrap();
    let (request, events) = requests.recv().await.unwrap();
    assert_eq!(request.voice, "Spanish");
    events.finished();

    engine
        .speak("hello", QueueMode::Queue, SpeakOptions::default().voice("Klingon"))
        .unwrap();
    let (request, _) = requests.recv().await.unwrap();
    assert_eq!(request.voice, SYSTEM_VOICE);
    assert_eq!(engine.current_voice().as_deref(), Some(SYSTEM_VOICE));
}

#[tokio::test]
async fn normalizes_and_shapes_requests() {
    let (synth, mut requests) = ManualSynthesizer::new();
    let mut config = Config::default().with_preferences([("numberReadingStyle", "asDigits")]);
    config.scheduler.max_utterance_chars = 12;
    let engine = SpeechEngine::new(config, catalog(), synth);

    engine.speak("Q", QueueMode::Queue, SpeakOptions::default()).unwrap();
    let (request, events) = requests.recv().await.unwrap();
    assert_eq!(request.text, "Q");
    assert!((request.pitch - 1.3).abs() < 1e-6);
    events.finished();

    engine
        .speak("Room 101 is down the hall", QueueMode::Queue, SpeakOptions::default().rate(50.0))
        .unwrap();
    let (request, events) = requests.recv().await.unwrap();
    assert_eq!(request.text, "Room 1 0 1 i");
    assert_eq!(request.rate, 10.0);
    assert_eq!(request.pitch, 1.0);
    events.finished();
}

#[tokio::test]
async fn stop_cancels_everything() {
    let (synth, mut requests) = ManualSynthesizer::new();
    let engine = SpeechEngine::new(Config::default(), catalog(), synth.clone());

    let guarded = engine
        .speak("guarded", QueueMode::Queue, SpeakOptions::default().do_not_interrupt())
        .unwrap();
    let queued = engine.speak("queued", QueueMode::Queue, SpeakOptions::default()).unwrap();
    let (_, events) = requests.recv().await.unwrap();
    events.started();

    engine.stop().unwrap();
    assert_eq!(guarded.finished().await, Outcome::Interrupted);
    assert_eq!(queued.finished().await, Outcome::Interrupted);
    assert_eq!(synth.stops(), 1);
    assert!(!engine.is_speaking());
}
