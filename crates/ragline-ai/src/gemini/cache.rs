//! Reuse one session per distinct configuration.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use ragline_common::EventBus;
use tracing::debug;

use crate::LlmError;

use super::config::{GeminiConfig, GeminiOptions};
use super::models::GeminiModel;
use super::session::GeminiSession;

/// Structural key for a resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConfigKey {
    api_key: String,
    model: GeminiModel,
    temperature: u64,
    top_p: u64,
    max_tokens: Option<u32>,
    streaming: bool,
    base_url: String,
}

impl From<&GeminiConfig> for ConfigKey {
    fn from(config: &GeminiConfig) -> Self {
        // `+ 0.0` folds -0.0 into 0.0 so equal floats hash equally.
        Self {
            api_key: config.api_key.clone(),
            model: config.model,
            temperature: (config.temperature + 0.0).to_bits(),
            top_p: (config.top_p + 0.0).to_bits(),
            max_tokens: config.max_tokens,
            streaming: config.streaming,
            base_url: config.base_url.clone(),
        }
    }
}

/// Sessions keyed by configuration equality.
///
/// The lock is held while a missing session is built (construction sends
/// nothing over the network), so concurrent first requests for the same
/// configuration share a single session.
#[derive(Default)]
pub struct SessionCache {
    sessions: Mutex<HashMap<ConfigKey, Arc<GeminiSession>>>,
    callbacks: Option<Arc<EventBus>>,
}

impl SessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach `bus` to every session this cache creates.
    pub fn with_callbacks(mut self, bus: Arc<EventBus>) -> Self {
        self.callbacks = Some(bus);
        self
    }

    /// Resolve `options` against the environment and return the matching session.
    pub fn get_or_create(&self, options: GeminiOptions) -> Result<Arc<GeminiSession>, LlmError> {
        self.get_or_create_with(GeminiConfig::from_env(options)?)
    }

    /// Return the session for `config`, building it on first use.
    pub fn get_or_create_with(&self, config: GeminiConfig) -> Result<Arc<GeminiSession>, LlmError> {
        let key = ConfigKey::from(&config);
        let mut sessions = self.lock();

        if let Some(session) = sessions.get(&key) {
            return Ok(Arc::clone(session));
        }

        let mut session = GeminiSession::new(config)?;
        if let Some(bus) = &self.callbacks {
            session = session.with_callbacks(Arc::clone(bus));
        }
        let session = Arc::new(session);
        sessions.insert(key, Arc::clone(&session));
        debug!(cached = sessions.len(), "created Gemini session");

        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forget all sessions. Handles already given out stay usable.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConfigKey, Arc<GeminiSession>>> {
        // The map is never left half-updated, so a poisoned lock is still usable.
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
