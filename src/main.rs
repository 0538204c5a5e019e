//! speech-engine: console harness for the speech output engine.
//!
//! Speaks each argument (or each stdin line) through the engine with a
//! printing synthesizer, so normalization, voice resolution and queueing can
//! be observed without a platform speech service.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use speech_engine::speech::console::ConsoleSynthesizer;
use speech_engine::{Config, QueueMode, SpeakOptions, SpeechEngine, StaticCatalog, VoiceInfo};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "speech-engine", about = "Speech output engine harness")]
struct Args {
    /// Path to speech.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Queue mode for each utterance: queue, flush, or category_flush
    #[arg(short, long, default_value = "queue")]
    mode: String,

    /// Category tag for category_flush
    #[arg(long)]
    category: Option<String>,

    /// Named preference overrides, e.g. --pref numberReadingStyle=asDigits
    #[arg(long = "pref", value_name = "KEY=VALUE")]
    prefs: Vec<String>,

    /// Installed voices advertised to the resolver, as LANG:NAME
    #[arg(long = "voice", value_name = "LANG:NAME")]
    voices: Vec<String>,

    /// Simulated playback time per character, in milliseconds
    #[arg(long, default_value_t = 0)]
    pace_ms: u64,

    /// Print synthesis requests as JSON lines
    #[arg(long)]
    json: bool,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Text to speak; reads stdin lines when empty
    text: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let prefs: Vec<(&str, &str)> = args
        .prefs
        .iter()
        .filter_map(|p| p.split_once('='))
        .collect();
    let config = Config::load(args.config.as_deref()).with_preferences(prefs);
    info!("Config loaded: {:?}", config.normalizer);

    let mut voices: Vec<VoiceInfo> = args
        .voices
        .iter()
        .filter_map(|v| v.split_once(':'))
        .map(|(lang, name)| VoiceInfo::new(lang, name))
        .collect();
    if voices.is_empty() {
        voices.push(VoiceInfo::new("en-US", "Console"));
    }

    let engine = SpeechEngine::new(
        config,
        Arc::new(StaticCatalog::new(voices)),
        Arc::new(ConsoleSynthesizer::new(
            args.json,
            Duration::from_millis(args.pace_ms),
        )),
    );

    let lines = if args.text.is_empty() {
        std::io::stdin().lock().lines().collect::<Result<Vec<_>, _>>()?
    } else {
        args.text.clone()
    };

    let mode = QueueMode::from_str(&args.mode);
    let mut handles = Vec::with_capacity(lines.len());
    for line in lines {
        let options = SpeakOptions {
            category: args.category.clone(),
            ..SpeakOptions::default()
        };
        handles.push(engine.speak(line, mode, options)?);
    }

    for handle in handles {
        let id = handle.id();
        let outcome = handle.finished().await;
        info!("Utterance {id}: {outcome:?}");
    }

    Ok(())
}
