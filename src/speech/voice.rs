//! Voice resolution against the platform's installed voices.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::Result;

/// Sentinel voice name: let the platform pick its default voice.
pub const SYSTEM_VOICE: &str = "chromeos_system_voice";

/// An installed voice as reported by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub lang: String,
    pub voice_name: String,
}

impl VoiceInfo {
    pub fn new(lang: impl Into<String>, voice_name: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            voice_name: voice_name.into(),
        }
    }
}

/// Platform capability listing installed voices. May be slow (voices load
/// lazily) and may return a stale or empty list.
#[async_trait]
pub trait VoiceCatalog: Send + Sync {
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>>;
}

/// Picks a concrete voice for a requested name and remembers the last pick.
pub struct VoiceResolver {
    catalog: Arc<dyn VoiceCatalog>,
    current: Mutex<Option<String>>,
}

impl VoiceResolver {
    pub fn new(catalog: Arc<dyn VoiceCatalog>) -> Self {
        Self {
            catalog,
            current: Mutex::new(None),
        }
    }

    /// Last resolved voice, `None` before the first resolution.
    pub fn current_voice(&self) -> Option<String> {
        self.current.lock().unwrap().clone()
    }

    /// Installed voices, or an empty list when the catalog is unavailable.
    pub async fn list_voices(&self) -> Vec<VoiceInfo> {
        match self.catalog.list_voices().await {
            Ok(voices) => voices,
            Err(e) => {
                warn!("Failed to list voices: {e}");
                Vec::new()
            }
        }
    }

    /// Resolve `requested` to an installed voice name, falling back to
    /// [`SYSTEM_VOICE`] when it is empty or no longer installed. The catalog
    /// is queried on every call.
    pub async fn resolve(&self, requested: &str) -> String {
        let resolved = if requested.is_empty() {
            SYSTEM_VOICE.to_string()
        } else {
            let voices = self.list_voices().await;
            match voices.into_iter().find(|v| v.voice_name == requested) {
                Some(voice) => {
                    debug!("Resolved voice {requested} ({})", voice.lang);
                    voice.voice_name
                }
                None => {
                    warn!("Voice not installed: {requested}, using system voice");
                    SYSTEM_VOICE.to_string()
                }
            }
        };

        let mut current = self.current.lock().unwrap();
        if current.as_deref() != Some(resolved.as_str()) {
            info!("Voice changed to: {resolved}");
        }
        *current = Some(resolved.clone());
        resolved
    }
}

/// Fixed voice list. Useful for hosts with a static voice set.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalog {
    voices: Vec<VoiceInfo>,
}

impl StaticCatalog {
    pub fn new(voices: Vec<VoiceInfo>) -> Self {
        Self { voices }
    }
}

#[async_trait]
impl VoiceCatalog for StaticCatalog {
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>> {
        Ok(self.voices.clone())
    }
}
