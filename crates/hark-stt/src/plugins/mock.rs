//! Mock STT plugin and decoder for testing
//!
//! The mock decoder "recognizes" a scripted transcript: one word becomes
//! visible for every `samples_per_word` samples fed, so partials grow
//! monotonically and a batch feed of the full buffer agrees with a chunked
//! streaming feed of the same audio.

use async_trait::async_trait;

use crate::error::SttError;
use crate::plugin::{PluginCapabilities, PluginInfo, SttPlugin, SttPluginFactory};
use crate::types::{Hypothesis, PartialHypothesis, TranscriptionConfig, TranscriptionEvent};
use crate::{next_utterance_id, DecodeProgress, SpeechDecoder};

/// Scriptable decoder implementing [`SpeechDecoder`] without an engine.
#[derive(Debug, Clone)]
pub struct MockDecoder {
    words: Vec<String>,
    samples_per_word: usize,
    samples_fed: usize,
    fail_after_samples: Option<usize>,
    /// Number of times `reset` or `finalize_utterance` cleared state.
    pub resets: usize,
}

impl MockDecoder {
    /// A decoder that reveals one word of `transcript` per 1000 samples.
    pub fn recognizing(transcript: &str) -> Self {
        Self {
            words: transcript.split_whitespace().map(str::to_string).collect(),
            samples_per_word: 1000,
            samples_fed: 0,
            fail_after_samples: None,
            resets: 0,
        }
    }

    pub fn with_samples_per_word(mut self, n: usize) -> Self {
        self.samples_per_word = n.max(1);
        self
    }

    /// Fail the accept call that pushes the total past `n` samples.
    pub fn failing_after(mut self, n: usize) -> Self {
        self.fail_after_samples = Some(n);
        self
    }

    fn revealed_text(&self) -> String {
        let count = (self.samples_fed / self.samples_per_word).min(self.words.len());
        self.words[..count].join(" ")
    }
}

impl SpeechDecoder for MockDecoder {
    fn accept_frame(&mut self, pcm: &[i16]) -> Result<DecodeProgress, SttError> {
        self.samples_fed += pcm.len();
        if let Some(limit) = self.fail_after_samples {
            if self.samples_fed > limit {
                return Err(SttError::RecognitionFailed(
                    "mock decoder scripted failure".to_string(),
                ));
            }
        }
        let text = self.revealed_text();
        if text.is_empty() {
            Ok(DecodeProgress::Running(None))
        } else {
            Ok(DecodeProgress::Running(Some(PartialHypothesis::new(text))))
        }
    }

    fn finalize_utterance(&mut self) -> Result<Option<Hypothesis>, SttError> {
        let text = self.revealed_text();
        self.samples_fed = 0;
        self.resets += 1;
        if text.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Hypothesis::from_text(text)))
        }
    }

    fn reset(&mut self) -> Result<(), SttError> {
        self.samples_fed = 0;
        self.resets += 1;
        Ok(())
    }
}

/// Mock STT plugin for exercising the host-facing contract in tests.
#[derive(Debug, Default)]
pub struct MockPlugin {
    decoder: Option<MockDecoder>,
    transcript: String,
    verbose: bool,
    utterance_id: u64,
}

impl MockPlugin {
    pub fn with_transcript(transcript: impl Into<String>) -> Self {
        Self {
            decoder: None,
            transcript: transcript.into(),
            verbose: false,
            utterance_id: 0,
        }
    }

    fn decoder(&mut self) -> Result<&mut MockDecoder, SttError> {
        self.decoder
            .as_mut()
            .ok_or_else(|| SttError::ConfigurationError("plugin not initialized".to_string()))
    }
}

#[async_trait]
impl SttPlugin for MockPlugin {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            id: "mock".to_string(),
            name: "Mock STT".to_string(),
            description: "Scriptable mock STT for testing".to_string(),
            requires_network: false,
            is_local: true,
            supported_languages: vec!["en".to_string()],
        }
    }

    fn capabilities(&self) -> PluginCapabilities {
        PluginCapabilities {
            streaming: true,
            batch: true,
            word_timestamps: false,
            confidence_scores: false,
            alternatives: false,
        }
    }

    async fn initialize(&mut self, config: TranscriptionConfig) -> Result<(), SttError> {
        tracing::debug!(transcript = %self.transcript, "initializing mock plugin");
        self.verbose = config.verbose;
        self.decoder = Some(MockDecoder::recognizing(&self.transcript));
        self.utterance_id = next_utterance_id();
        Ok(())
    }

    async fn transcribe(
        &mut self,
        samples: &[i16],
        _sample_rate: u32,
    ) -> Result<Hypothesis, SttError> {
        let decoder = self.decoder()?;
        decoder.accept_frame(samples)?;
        Ok(decoder.finalize_utterance()?.unwrap_or_default())
    }

    async fn process_audio(
        &mut self,
        samples: &[i16],
    ) -> Result<Option<TranscriptionEvent>, SttError> {
        let verbose = self.verbose;
        let utterance_id = self.utterance_id;
        let decoder = self.decoder()?;
        match decoder.accept_frame(samples)? {
            DecodeProgress::Running(Some(partial)) if verbose => {
                Ok(Some(TranscriptionEvent::Partial {
                    utterance_id,
                    partial,
                }))
            }
            DecodeProgress::Finalized(Some(hypothesis)) => Ok(Some(TranscriptionEvent::Final {
                utterance_id,
                hypothesis,
            })),
            _ => Ok(None),
        }
    }

    async fn finalize(&mut self) -> Result<Option<TranscriptionEvent>, SttError> {
        let utterance_id = self.utterance_id;
        let decoder = self.decoder()?;
        let hypothesis = decoder.finalize_utterance()?.unwrap_or_default();
        self.utterance_id = next_utterance_id();
        Ok(Some(TranscriptionEvent::Final {
            utterance_id,
            hypothesis,
        }))
    }

    async fn reset(&mut self) -> Result<(), SttError> {
        let decoder = self.decoder()?;
        decoder.reset()?;
        self.utterance_id = next_utterance_id();
        Ok(())
    }

    async fn unload(&mut self) -> Result<(), SttError> {
        self.decoder = None;
        Ok(())
    }
}

/// Factory for creating [`MockPlugin`] instances
pub struct MockPluginFactory {
    transcript: String,
}

impl MockPluginFactory {
    pub fn new(transcript: impl Into<String>) -> Self {
        Self {
            transcript: transcript.into(),
        }
    }
}

impl Default for MockPluginFactory {
    fn default() -> Self {
        Self::new("mock test transcription")
    }
}

impl SttPluginFactory for MockPluginFactory {
    fn create(&self) -> Result<Box<dyn SttPlugin>, SttError> {
        Ok(Box::new(MockPlugin::with_transcript(
            self.transcript.clone(),
        )))
    }

    fn plugin_info(&self) -> PluginInfo {
        MockPlugin::default().info()
    }

    fn check_requirements(&self) -> Result<(), SttError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_decoder_reveals_words_monotonically() {
        let mut decoder = MockDecoder::recognizing("turn on the lights").with_samples_per_word(10);
        let mut last = String::new();
        for _ in 0..4 {
            match decoder.accept_frame(&[0; 10]).unwrap() {
                DecodeProgress::Running(Some(p)) => {
                    assert!(p.text.starts_with(&last));
                    last = p.text;
                }
                DecodeProgress::Running(None) => {}
                other => panic!("unexpected progress: {other:?}"),
            }
        }
        let hyp = decoder.finalize_utterance().unwrap().unwrap();
        assert_eq!(hyp.text, "turn on the lights");
    }

    #[tokio::test]
    async fn mock_plugin_round_trip() {
        let mut plugin = MockPlugin::with_transcript("hello world");
        plugin
            .initialize(TranscriptionConfig {
                verbose: true,
                ..Default::default()
            })
            .await
            .unwrap();

        let event = plugin.process_audio(&[0; 2000]).await.unwrap();
        assert!(matches!(event, Some(TranscriptionEvent::Partial { .. })));

        match plugin.finalize().await.unwrap() {
            Some(TranscriptionEvent::Final { hypothesis, .. }) => {
                assert_eq!(hypothesis.text, "hello world");
            }
            other => panic!("expected final event, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn mock_plugin_batch_matches_streaming() {
        let mut batch = MockPlugin::with_transcript("hello world");
        batch.initialize(TranscriptionConfig::default()).await.unwrap();
        let hyp = batch.transcribe(&[0; 2000], 16_000).await.unwrap();
        assert_eq!(hyp.text, "hello world");
    }

    #[tokio::test]
    async fn uninitialized_plugin_rejects_audio() {
        let mut plugin = MockPlugin::default();
        assert!(matches!(
            plugin.process_audio(&[0; 100]).await,
            Err(SttError::ConfigurationError(_))
        ));
    }
}
