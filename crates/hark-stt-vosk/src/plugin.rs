//! Host-facing plugin shim.
//!
//! Translates host configuration (`model`, `lang`, `verbose`) into calls on
//! the model resolver and the recognizers. Initialization fails fast:
//! configuration and model problems surface here, before any audio is
//! accepted.

use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;

use hark_stt::plugin::{PluginCapabilities, PluginInfo, SttPlugin, SttPluginFactory};
use hark_stt::{Hypothesis, SttError, TranscriptionConfig, TranscriptionEvent};

use crate::batch::BatchRecognizer;
use crate::model::{CachedModel, ModelReference, ModelResolver};
use crate::registry;
use crate::session::StreamingSession;
use crate::vosk_transcriber::VoskTranscriber;

pub struct VoskPlugin {
    resolver: ModelResolver,
    config: Option<TranscriptionConfig>,
    resolved: Option<CachedModel>,
    session: Option<StreamingSession<VoskTranscriber>>,
    batch: Option<BatchRecognizer<VoskTranscriber>>,
    /// Additional per-language batch engines, keyed by lowercased language
    /// code. Loaded on demand, released by `unload_language`.
    languages: HashMap<String, BatchRecognizer<VoskTranscriber>>,
}

impl fmt::Debug for VoskPlugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VoskPlugin")
            .field("resolved", &self.resolved)
            .field("session", &self.session.as_ref().map(|_| "StreamingSession"))
            .field("batch", &self.batch.as_ref().map(|_| "BatchRecognizer"))
            .finish()
    }
}

impl Default for VoskPlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl VoskPlugin {
    pub fn new() -> Self {
        Self::with_resolver(ModelResolver::new())
    }

    /// Plugin with a custom resolver (e.g. a test-scoped cache root).
    pub fn with_resolver(resolver: ModelResolver) -> Self {
        Self {
            resolver,
            config: None,
            resolved: None,
            session: None,
            batch: None,
            languages: HashMap::new(),
        }
    }

    /// Resolve and load the default model for `lang`, keeping the engine
    /// around for [`Self::transcribe_language`]. A no-op for the configured
    /// language and for languages already loaded.
    pub fn load_language(&mut self, lang: &str) -> Result<(), SttError> {
        let config = self
            .config
            .clone()
            .ok_or_else(|| SttError::ConfigurationError("plugin not initialized".to_string()))?;
        let key = lang.to_ascii_lowercase();
        if self.is_configured_lang(&key) || self.languages.contains_key(&key) {
            return Ok(());
        }

        let resolved = self
            .resolver
            .resolve(&ModelReference::LanguageCode(key.clone()))?;
        tracing::info!(
            target: "hark::stt::vosk",
            lang = %key,
            model_path = %resolved.path.display(),
            "language loaded"
        );
        let path = resolved.path;
        self.languages.insert(
            key,
            BatchRecognizer::new(config.clone(), move || {
                VoskTranscriber::new(&config, &path)
            }),
        );
        Ok(())
    }

    /// Release the engine loaded for `lang`. Unknown or never-loaded
    /// languages are ignored.
    pub fn unload_language(&mut self, lang: &str) {
        if self.languages.remove(&lang.to_ascii_lowercase()).is_some() {
            tracing::debug!(target: "hark::stt::vosk", lang, "language unloaded");
        }
    }

    /// One-shot transcription in a language other than the configured one,
    /// loading that language's default model on first use.
    pub fn transcribe_language(
        &mut self,
        samples: &[i16],
        sample_rate: u32,
        lang: &str,
    ) -> Result<Hypothesis, SttError> {
        let key = lang.to_ascii_lowercase();
        if self.is_configured_lang(&key) {
            let batch = self.batch.as_mut().ok_or_else(|| {
                SttError::ConfigurationError("plugin not initialized".to_string())
            })?;
            return batch.transcribe(samples, sample_rate);
        }
        self.load_language(&key)?;
        let batch = self
            .languages
            .get_mut(&key)
            .ok_or_else(|| SttError::ModelUnavailable(format!("no engine for '{key}'")))?;
        batch.transcribe(samples, sample_rate)
    }

    fn is_configured_lang(&self, key: &str) -> bool {
        self.config
            .as_ref()
            .and_then(|c| c.lang.as_deref())
            .map(|l| l.eq_ignore_ascii_case(key))
            .unwrap_or(false)
    }

    /// The configured model reference: `model` classified by shape, else
    /// `lang` against the default-model registry.
    fn reference_from(config: &TranscriptionConfig) -> Result<ModelReference, SttError> {
        if let Some(model) = config.model.as_deref().filter(|m| !m.is_empty()) {
            return Ok(ModelReference::classify(model));
        }
        if let Some(lang) = config.lang.as_deref().filter(|l| !l.is_empty()) {
            return Ok(ModelReference::LanguageCode(lang.to_string()));
        }
        Err(SttError::ConfigurationError(
            "either 'model' or 'lang' must be configured".to_string(),
        ))
    }

    fn session(&mut self) -> Result<&mut StreamingSession<VoskTranscriber>, SttError> {
        self.session
            .as_mut()
            .ok_or_else(|| SttError::ConfigurationError("plugin not initialized".to_string()))
    }
}

#[async_trait]
impl SttPlugin for VoskPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            id: "vosk".to_string(),
            name: "Vosk".to_string(),
            description: "Offline Vosk (Kaldi) speech recognition".to_string(),
            // Transcription is fully local; the network is only used to
            // fetch missing default models at initialization.
            requires_network: false,
            is_local: true,
            supported_languages: registry::supported_languages(),
        }
    }

    fn capabilities(&self) -> PluginCapabilities {
        PluginCapabilities {
            streaming: true,
            batch: true,
            word_timestamps: true,
            confidence_scores: true,
            alternatives: true,
        }
    }

    async fn initialize(&mut self, config: TranscriptionConfig) -> Result<(), SttError> {
        let reference = Self::reference_from(&config)?;
        tracing::debug!(
            target: "hark::stt::vosk",
            reference = ?reference,
            verbose = config.verbose,
            "initializing Vosk plugin"
        );

        let resolved = self.resolver.resolve(&reference)?;

        // Load the engine now so a broken model is reported here, not on
        // the first audio chunk.
        let decoder = VoskTranscriber::new(&config, &resolved.path)?;
        self.session = Some(StreamingSession::new(decoder, config.clone()));

        let batch_config = config.clone();
        let batch_path = resolved.path.clone();
        self.batch = Some(BatchRecognizer::new(config.clone(), move || {
            VoskTranscriber::new(&batch_config, &batch_path)
        }));
        self.config = Some(config);

        tracing::info!(
            target: "hark::stt::vosk",
            model_path = %resolved.path.display(),
            "Vosk plugin initialized"
        );
        self.resolved = Some(resolved);
        Ok(())
    }

    async fn transcribe(
        &mut self,
        samples: &[i16],
        sample_rate: u32,
    ) -> Result<Hypothesis, SttError> {
        let batch = self
            .batch
            .as_mut()
            .ok_or_else(|| SttError::ConfigurationError("plugin not initialized".to_string()))?;
        batch.transcribe(samples, sample_rate)
    }

    async fn process_audio(
        &mut self,
        samples: &[i16],
    ) -> Result<Option<TranscriptionEvent>, SttError> {
        self.session()?.feed(samples)
    }

    async fn finalize(&mut self) -> Result<Option<TranscriptionEvent>, SttError> {
        let (utterance_id, hypothesis) = self.session()?.end_utterance()?;
        Ok(Some(TranscriptionEvent::Final {
            utterance_id,
            hypothesis,
        }))
    }

    async fn reset(&mut self) -> Result<(), SttError> {
        self.session()?.abandon()
    }

    async fn unload(&mut self) -> Result<(), SttError> {
        self.session = None;
        self.batch = None;
        self.languages.clear();
        self.config = None;
        self.resolved = None;
        Ok(())
    }
}

pub struct VoskPluginFactory;

impl VoskPluginFactory {
    pub fn new() -> Self {
        Self
    }
}

impl Default for VoskPluginFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl SttPluginFactory for VoskPluginFactory {
    fn create(&self) -> Result<Box<dyn SttPlugin>, SttError> {
        Ok(Box::new(VoskPlugin::new()))
    }

    fn plugin_info(&self) -> PluginInfo {
        VoskPlugin::new().info()
    }

    fn check_requirements(&self) -> Result<(), SttError> {
        // Models are provisioned on demand; there is nothing to check until
        // a model reference is known.
        Ok(())
    }
}
