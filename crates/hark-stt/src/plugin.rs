//! STT Plugin Architecture
//!
//! This module defines the plugin interface for Speech-to-Text engines.
//! Any STT backend (Vosk, Whisper, cloud APIs, etc.) implements these traits.
//!
//! Every operation on [`SttPlugin`] blocks internally until its result is
//! ready; the async surface is only the contract shape the host consumes.
//! Hosts needing concurrency run independent plugin instances, one per
//! session, on their own tasks or threads.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::error::SttError;
use crate::types::{Hypothesis, TranscriptionConfig, TranscriptionEvent};

/// Metadata about an STT plugin
#[derive(Debug, Clone)]
pub struct PluginInfo {
    /// Unique identifier for the plugin (e.g., "vosk")
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Brief description of the plugin
    pub description: String,
    /// Whether this plugin requires network access to transcribe
    pub requires_network: bool,
    /// Whether this plugin processes audio locally
    pub is_local: bool,
    /// Languages with a known default model (ISO 639-1 codes). Derived from
    /// the plugin's registry, not from whatever model happens to be loaded.
    pub supported_languages: Vec<String>,
}

/// Capabilities that an STT plugin might support
#[derive(Debug, Clone, Default)]
pub struct PluginCapabilities {
    /// Supports real-time streaming transcription
    pub streaming: bool,
    /// Supports batch transcription of complete audio
    pub batch: bool,
    /// Can provide word-level timestamps
    pub word_timestamps: bool,
    /// Can provide confidence scores
    pub confidence_scores: bool,
    /// Can report N-best alternatives
    pub alternatives: bool,
}

/// The main trait that all STT plugins must implement
#[async_trait]
pub trait SttPlugin: Send + Sync + Debug {
    /// Get plugin metadata
    fn info(&self) -> PluginInfo;

    /// Get plugin capabilities
    fn capabilities(&self) -> PluginCapabilities;

    /// Initialize the plugin with configuration. Resolves the model and
    /// loads the engine; fails fast with `ConfigurationError` or
    /// `ModelUnavailable` before any audio is accepted.
    async fn initialize(&mut self, config: TranscriptionConfig) -> Result<(), SttError>;

    /// Transcribe one complete audio buffer. Blocks until the final result
    /// is produced; there is no intermediate state.
    async fn transcribe(
        &mut self,
        samples: &[i16],
        sample_rate: u32,
    ) -> Result<Hypothesis, SttError>;

    /// Feed one chunk of a live utterance. Returns a partial event when one
    /// is available and partial reporting is enabled.
    async fn process_audio(
        &mut self,
        samples: &[i16],
    ) -> Result<Option<TranscriptionEvent>, SttError>;

    /// Signal end of utterance and get the final transcription.
    async fn finalize(&mut self) -> Result<Option<TranscriptionEvent>, SttError>;

    /// Abandon the current session, if any, without producing a result.
    async fn reset(&mut self) -> Result<(), SttError>;

    /// Unload model and free engine resources. The plugin can be
    /// re-initialized afterwards.
    async fn unload(&mut self) -> Result<(), SttError> {
        Ok(())
    }
}

/// Factory for creating STT plugins
pub trait SttPluginFactory: Send + Sync {
    /// Create a new, uninitialized instance of the plugin
    fn create(&self) -> Result<Box<dyn SttPlugin>, SttError>;

    /// Get plugin info without creating an instance
    fn plugin_info(&self) -> PluginInfo;

    /// Check if the plugin's requirements are met on this system
    fn check_requirements(&self) -> Result<(), SttError>;
}

/// Registry for managing multiple STT plugins
#[derive(Default)]
pub struct SttPluginRegistry {
    factories: Vec<Box<dyn SttPluginFactory>>,
}

impl SttPluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new plugin factory
    pub fn register(&mut self, factory: Box<dyn SttPluginFactory>) {
        self.factories.push(factory);
    }

    /// Info for all registered plugins
    pub fn available_plugins(&self) -> Vec<PluginInfo> {
        self.factories.iter().map(|f| f.plugin_info()).collect()
    }

    /// Create a plugin by ID
    pub fn create_plugin(&self, id: &str) -> Result<Box<dyn SttPlugin>, SttError> {
        self.factories
            .iter()
            .find(|f| f.plugin_info().id == id)
            .ok_or_else(|| SttError::ConfigurationError(format!("plugin '{id}' not found")))?
            .create()
    }

    /// Create the first registered plugin whose requirements are met
    pub fn create_best_available(&self) -> Result<Box<dyn SttPlugin>, SttError> {
        for factory in &self.factories {
            if factory.check_requirements().is_ok() {
                if let Ok(plugin) = factory.create() {
                    return Ok(plugin);
                }
            }
        }
        Err(SttError::ConfigurationError(
            "no STT plugins available".to_string(),
        ))
    }
}
