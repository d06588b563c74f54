//! Vosk-backed implementation of the `SpeechDecoder` seam.

use std::path::Path;

use tracing::warn;
use vosk::{CompleteResult, DecodingState, Model, Recognizer};

use hark_stt::{
    Alternative, DecodeProgress, Hypothesis, PartialHypothesis, SpeechDecoder, SttError,
    TranscriptionConfig, WordInfo,
};

/// Owns one Vosk recognizer for the duration of a session or batch call.
/// Not thread-safe; one decoder per concurrent utterance.
pub struct VoskTranscriber {
    recognizer: Recognizer,
    include_words: bool,
}

impl VoskTranscriber {
    /// Load the model at `model_path` and create a recognizer configured
    /// per `config`. Model load is the expensive step; callers cache the
    /// transcriber rather than recreating it per utterance.
    pub fn new(config: &TranscriptionConfig, model_path: &Path) -> Result<Self, SttError> {
        // Vosk models are trained for a fixed rate, almost always 16 kHz.
        if config.sample_rate != 16_000 {
            warn!(
                target: "hark::stt::vosk",
                sample_rate = config.sample_rate,
                "sample rate differs from the usual 16000 Hz; transcription quality may suffer"
            );
        }

        let model_path = model_path.to_string_lossy();
        let model = Model::new(model_path.as_ref()).ok_or_else(|| {
            SttError::RecognitionFailed(format!("failed to load Vosk model from '{model_path}'"))
        })?;

        // A non-empty vocabulary switches Vosk into grammar-constrained
        // decoding, restricting output to the listed words.
        let mut recognizer = match config.vocabulary.as_deref() {
            Some(words) if !words.is_empty() => {
                Recognizer::new_with_grammar(&model, config.sample_rate as f32, words)
            }
            _ => Recognizer::new(&model, config.sample_rate as f32),
        }
        .ok_or_else(|| {
            SttError::RecognitionFailed(format!(
                "failed to create Vosk recognizer at {} Hz",
                config.sample_rate
            ))
        })?;

        // 0 keeps single-result mode, which is the only mode reporting
        // word-level confidence; N-best kicks in above 1.
        let alternatives = if config.max_alternatives > 1 {
            config.max_alternatives as u16
        } else {
            0
        };
        recognizer.set_max_alternatives(alternatives);
        recognizer.set_words(config.include_words);
        recognizer.set_partial_words(false);

        Ok(Self {
            recognizer,
            include_words: config.include_words,
        })
    }

    fn parse_complete_result(
        result: CompleteResult,
        include_words: bool,
    ) -> Option<Hypothesis> {
        match result {
            CompleteResult::Single(single) => {
                if single.text.trim().is_empty() {
                    return None;
                }
                let words = if include_words && !single.result.is_empty() {
                    Some(
                        single
                            .result
                            .into_iter()
                            .map(|w| WordInfo {
                                text: w.word.to_string(),
                                start: w.start,
                                end: w.end,
                                conf: w.conf,
                            })
                            .collect(),
                    )
                } else {
                    None
                };
                Some(Hypothesis {
                    text: single.text.to_string(),
                    confidence: None,
                    alternatives: Vec::new(),
                    words,
                })
            }
            CompleteResult::Multiple(multiple) => {
                let mut iter = multiple.alternatives.into_iter();
                let best = iter.next()?;
                if best.text.trim().is_empty() {
                    return None;
                }
                let words = if include_words && !best.result.is_empty() {
                    Some(
                        best.result
                            .iter()
                            .map(|w| WordInfo {
                                text: w.word.to_string(),
                                start: w.start,
                                end: w.end,
                                // N-best word entries carry no confidence.
                                conf: 0.0,
                            })
                            .collect(),
                    )
                } else {
                    None
                };
                let alternatives = iter
                    .filter(|alt| !alt.text.trim().is_empty())
                    .map(|alt| Alternative {
                        text: alt.text.to_string(),
                        confidence: Some(alt.confidence),
                    })
                    .collect();
                Some(Hypothesis {
                    text: best.text.to_string(),
                    confidence: Some(best.confidence),
                    alternatives,
                    words,
                })
            }
        }
    }
}

impl SpeechDecoder for VoskTranscriber {
    fn accept_frame(&mut self, pcm: &[i16]) -> Result<DecodeProgress, SttError> {
        let state = self.recognizer.accept_waveform(pcm).map_err(|e| {
            SttError::RecognitionFailed(format!("Vosk rejected waveform: {e:?}"))
        })?;

        match state {
            DecodingState::Running => {
                let partial = self.recognizer.partial_result().partial;
                if partial.trim().is_empty() {
                    Ok(DecodeProgress::Running(None))
                } else {
                    Ok(DecodeProgress::Running(Some(PartialHypothesis::new(
                        partial,
                    ))))
                }
            }
            DecodingState::Finalized => {
                let hypothesis =
                    Self::parse_complete_result(self.recognizer.result(), self.include_words);
                Ok(DecodeProgress::Finalized(hypothesis))
            }
            DecodingState::Failed => Err(SttError::RecognitionFailed(
                "Vosk decoding failed for the current chunk".to_string(),
            )),
        }
    }

    fn finalize_utterance(&mut self) -> Result<Option<Hypothesis>, SttError> {
        let hypothesis =
            Self::parse_complete_result(self.recognizer.final_result(), self.include_words);
        Ok(hypothesis)
    }

    fn reset(&mut self) -> Result<(), SttError> {
        // Vosk has no explicit reset; draining the final result clears the
        // decoder state for the next utterance.
        let _ = self.recognizer.final_result();
        Ok(())
    }
}
