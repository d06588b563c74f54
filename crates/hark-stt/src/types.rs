//! Core types for speech-to-text functionality

use serde::{Deserialize, Serialize};

/// A completed transcription result. Immutable once returned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hypothesis {
    /// Best transcription text. May be empty for a silent utterance.
    pub text: String,
    /// Engine confidence in the best text, when the engine reports one.
    pub confidence: Option<f32>,
    /// N-best alternatives, best first, when requested via
    /// [`TranscriptionConfig::max_alternatives`].
    pub alternatives: Vec<Alternative>,
    /// Word-level timing, when requested via
    /// [`TranscriptionConfig::include_words`].
    pub words: Option<Vec<WordInfo>>,
}

impl Hypothesis {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// True when the utterance produced no recognized speech.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// One entry of an N-best list.
#[derive(Debug, Clone, PartialEq)]
pub struct Alternative {
    pub text: String,
    pub confidence: Option<f32>,
}

/// An in-progress, non-final transcription emitted during streaming.
/// Superseded by later partials or by the final [`Hypothesis`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialHypothesis {
    pub text: String,
}

impl PartialHypothesis {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Word-level timing and confidence information
#[derive(Debug, Clone, PartialEq)]
pub struct WordInfo {
    /// Start time in seconds
    pub start: f32,
    /// End time in seconds
    pub end: f32,
    /// Confidence score (0.0-1.0)
    pub conf: f32,
    /// Word text
    pub text: String,
}

/// Transcription events emitted by a streaming session.
#[derive(Debug, Clone)]
pub enum TranscriptionEvent {
    /// Partial transcription result (ongoing speech)
    Partial {
        utterance_id: u64,
        partial: PartialHypothesis,
    },
    /// Final transcription result (utterance complete)
    Final {
        utterance_id: u64,
        hypothesis: Hypothesis,
    },
}

/// Transcription configuration, as ingested from the host framework.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Model reference: local directory path, download URL, or language code.
    pub model: Option<String>,
    /// Fallback language code used when `model` is absent.
    pub lang: Option<String>,
    /// Emit partial recognition results while streaming.
    pub verbose: bool,
    /// Expected sample rate of incoming PCM, in Hz.
    pub sample_rate: u32,
    /// Maximum alternatives in results (1 = best-only).
    pub max_alternatives: u32,
    /// Include word-level timing in results.
    pub include_words: bool,
    /// Minimum audio to accumulate before querying the decoder for a partial,
    /// in milliseconds. 0 queries after every chunk.
    pub buffer_size_ms: u32,
    /// Restrict recognition to this word list (engines that support
    /// grammar-constrained decoding). None transcribes the full vocabulary.
    pub vocabulary: Option<Vec<String>>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            model: None,
            lang: None,
            verbose: false,
            sample_rate: 16_000,
            max_alternatives: 1,
            include_words: false,
            buffer_size_ms: 0,
            vocabulary: None,
        }
    }
}

impl TranscriptionConfig {
    /// Number of samples the streaming session buffers before each decoder
    /// query. Zero means per-chunk querying.
    pub fn min_chunk_samples(&self) -> usize {
        (self.buffer_size_ms as usize * self.sample_rate as usize) / 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_conservative_cadence() {
        let cfg = TranscriptionConfig::default();
        assert_eq!(cfg.sample_rate, 16_000);
        assert_eq!(cfg.min_chunk_samples(), 0);
        assert!(!cfg.verbose);
    }

    #[test]
    fn config_ingests_host_json() {
        let cfg: TranscriptionConfig = serde_json::from_str(
            r#"{"model": "/opt/models/vosk-small", "verbose": true, "buffer_size_ms": 256}"#,
        )
        .unwrap();
        assert_eq!(cfg.model.as_deref(), Some("/opt/models/vosk-small"));
        assert!(cfg.verbose);
        assert_eq!(cfg.min_chunk_samples(), 4096);
        assert_eq!(cfg.lang, None);
        assert_eq!(cfg.vocabulary, None);
    }

    #[test]
    fn config_ingests_a_limited_vocabulary() {
        let cfg: TranscriptionConfig = serde_json::from_str(
            r#"{"lang": "en", "vocabulary": ["yes", "no", "maybe"]}"#,
        )
        .unwrap();
        let words = cfg.vocabulary.unwrap();
        assert_eq!(words, vec!["yes", "no", "maybe"]);
    }

    #[test]
    fn empty_hypothesis_is_well_defined() {
        let hyp = Hypothesis::default();
        assert!(hyp.is_empty());
        assert!(hyp.alternatives.is_empty());
    }
}
