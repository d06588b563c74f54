//! Batch transcription of complete audio buffers.
//!
//! Engine load is expensive, so the decoder is built lazily on the first
//! call and reused for the process lifetime of the recognizer. The
//! lifecycle is explicit state, not ambient globals, so an initialization
//! failure is observable by the host and retryable via [`BatchRecognizer::reload`]
//! instead of being silently cached as a crash.

use hark_stt::{Hypothesis, SpeechDecoder, SttError, TranscriptionConfig};

/// Engine lifecycle for lazy one-time initialization.
enum EngineState<D> {
    Unloaded,
    Ready(D),
    /// Initialization failed; the reason is replayed to every call until the
    /// host clears it with `reload`.
    Failed(String),
}

type DecoderBuilder<D> = Box<dyn Fn() -> Result<D, SttError> + Send + Sync>;

/// Batch recognizer: one blocking call per complete recording.
pub struct BatchRecognizer<D: SpeechDecoder> {
    engine: EngineState<D>,
    builder: DecoderBuilder<D>,
    config: TranscriptionConfig,
}

impl<D: SpeechDecoder> BatchRecognizer<D> {
    /// `builder` constructs the decoder against an already-resolved model;
    /// it runs at most once per load.
    pub fn new(
        config: TranscriptionConfig,
        builder: impl Fn() -> Result<D, SttError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            engine: EngineState::Unloaded,
            builder: Box::new(builder),
            config,
        }
    }

    /// Transcribe one complete, single-channel PCM recording. Blocks until
    /// the final result is produced; there is no intermediate state. An
    /// empty recording yields an empty hypothesis, not an error.
    pub fn transcribe(
        &mut self,
        samples: &[i16],
        sample_rate: u32,
    ) -> Result<Hypothesis, SttError> {
        if sample_rate != self.config.sample_rate {
            return Err(SttError::ConfigurationError(format!(
                "audio sample rate {} Hz does not match configured {} Hz",
                sample_rate, self.config.sample_rate
            )));
        }

        let decoder = self.ensure_loaded()?;
        let fed = decoder.accept_frame(samples);
        match fed {
            Ok(_) => {}
            Err(e) => {
                // Decoder state may be inconsistent after a failed feed.
                let _ = decoder.reset();
                return Err(e);
            }
        }
        Ok(decoder.finalize_utterance()?.unwrap_or_default())
    }

    /// Whether the engine is loaded and ready.
    pub fn is_ready(&self) -> bool {
        matches!(self.engine, EngineState::Ready(_))
    }

    /// Clear a failed (or loaded) engine so the next call loads it afresh.
    pub fn reload(&mut self) {
        self.engine = EngineState::Unloaded;
    }

    fn ensure_loaded(&mut self) -> Result<&mut D, SttError> {
        if let EngineState::Failed(reason) = &self.engine {
            return Err(SttError::RecognitionFailed(format!(
                "engine previously failed to load: {reason}"
            )));
        }
        if let EngineState::Unloaded = self.engine {
            tracing::debug!(target: "hark::stt::vosk", "loading batch recognition engine");
            match (self.builder)() {
                Ok(decoder) => self.engine = EngineState::Ready(decoder),
                Err(e) => {
                    tracing::error!(target: "hark::stt::vosk", error = %e, "engine load failed");
                    self.engine = EngineState::Failed(e.to_string());
                    return Err(e);
                }
            }
        }
        match &mut self.engine {
            EngineState::Ready(decoder) => Ok(decoder),
            _ => unreachable!("engine state handled above"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hark_stt::plugins::mock::MockDecoder;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn transcribes_a_complete_buffer_in_one_call() {
        let mut recognizer = BatchRecognizer::new(TranscriptionConfig::default(), || {
            Ok(MockDecoder::recognizing("play some jazz"))
        });
        let hyp = recognizer.transcribe(&[0; 3000], 16_000).unwrap();
        assert_eq!(hyp.text, "play some jazz");
    }

    #[test]
    fn engine_loads_once_and_is_reused() {
        let builds = Arc::new(AtomicUsize::new(0));
        let counter = builds.clone();
        let mut recognizer = BatchRecognizer::new(TranscriptionConfig::default(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(MockDecoder::recognizing("again and again"))
        });

        assert!(!recognizer.is_ready());
        recognizer.transcribe(&[0; 3000], 16_000).unwrap();
        recognizer.transcribe(&[0; 3000], 16_000).unwrap();
        assert!(recognizer.is_ready());
        assert_eq!(builds.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn empty_audio_yields_empty_hypothesis() {
        let mut recognizer = BatchRecognizer::new(TranscriptionConfig::default(), || {
            Ok(MockDecoder::recognizing("unheard"))
        });
        let hyp = recognizer.transcribe(&[], 16_000).unwrap();
        assert!(hyp.is_empty());
    }

    #[test]
    fn sample_rate_mismatch_is_a_configuration_error() {
        let mut recognizer = BatchRecognizer::new(TranscriptionConfig::default(), || {
            Ok(MockDecoder::recognizing("wrong rate"))
        });
        assert!(matches!(
            recognizer.transcribe(&[0; 100], 44_100),
            Err(SttError::ConfigurationError(_))
        ));
        // The engine was never touched.
        assert!(!recognizer.is_ready());
    }

    #[test]
    fn failed_load_is_observable_and_retryable() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let mut recognizer =
            BatchRecognizer::new(TranscriptionConfig::default(), move || {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(SttError::ModelUnavailable("disk on fire".to_string()))
                } else {
                    Ok(MockDecoder::recognizing("recovered"))
                }
            });

        // First call fails with the builder's error.
        assert!(matches!(
            recognizer.transcribe(&[0; 1000], 16_000),
            Err(SttError::ModelUnavailable(_))
        ));
        // The failure is sticky until the host reloads.
        assert!(matches!(
            recognizer.transcribe(&[0; 1000], 16_000),
            Err(SttError::RecognitionFailed(_))
        ));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);

        recognizer.reload();
        let hyp = recognizer.transcribe(&[0; 1000], 16_000).unwrap();
        assert_eq!(hyp.text, "recovered");
    }
}
