//! Speech-to-text abstraction layer for Hark
//!
//! This crate provides the engine-agnostic pieces of the STT stack: result
//! types, configuration, the error taxonomy, the `SpeechDecoder` seam that
//! engine adapters implement, and the host-facing plugin contract.

use std::sync::atomic::{AtomicU64, Ordering};

pub mod error;
pub mod plugin;
pub mod plugins;
pub mod types;

pub use error::SttError;
pub use types::{
    Alternative, Hypothesis, PartialHypothesis, TranscriptionConfig, TranscriptionEvent, WordInfo,
};

/// Generates unique utterance IDs
static UTTERANCE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Generate a unique utterance ID
pub fn next_utterance_id() -> u64 {
    UTTERANCE_ID_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Progress reported by a decoder after consuming one frame of audio.
#[derive(Debug, Clone)]
pub enum DecodeProgress {
    /// The utterance is still in flight; an updated partial may be available.
    Running(Option<PartialHypothesis>),
    /// The engine decided the utterance is complete on its own (e.g. it
    /// detected a final segment boundary) and produced a result.
    Finalized(Option<Hypothesis>),
}

/// The seam between session/batch state handling and a concrete engine.
///
/// A decoder is an ordered, stateful consumer: frames must be fed in
/// production order by a single caller. Implementations are not required to
/// be thread-safe; callers needing concurrency run one decoder per session.
pub trait SpeechDecoder {
    /// Feed mono S16LE PCM samples at the configured sample rate.
    fn accept_frame(&mut self, pcm: &[i16]) -> Result<DecodeProgress, SttError>;

    /// Flush the decoder and produce the final hypothesis for the current
    /// utterance, if any. Leaves the decoder ready for a new utterance.
    fn finalize_utterance(&mut self) -> Result<Option<Hypothesis>, SttError>;

    /// Discard any in-flight utterance state without producing a result.
    fn reset(&mut self) -> Result<(), SttError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn utterance_ids_are_unique_and_increasing() {
        let a = next_utterance_id();
        let b = next_utterance_id();
        assert!(b > a);
    }
}
