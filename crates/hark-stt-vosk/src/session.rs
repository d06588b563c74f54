//! Streaming session lifecycle.
//!
//! A session owns one decoder for the duration of one streaming
//! conversation and walks it through Idle -> Listening -> Idle. The caller
//! feeds chunks in production order and signals end-of-utterance explicitly
//! (voice-activity detection lives outside this crate). One active caller
//! at a time per session is a documented precondition, not an enforced
//! lock; independent sessions may run concurrently, each with its own
//! decoder.

use hark_stt::{
    next_utterance_id, DecodeProgress, Hypothesis, SpeechDecoder, SttError, TranscriptionConfig,
    TranscriptionEvent,
};

/// Session lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No utterance open.
    Idle,
    /// An utterance is open and accepting chunks.
    Listening,
}

/// Streaming recognizer: feeds audio chunks to an owned decoder and emits
/// partial and final hypotheses.
pub struct StreamingSession<D: SpeechDecoder> {
    decoder: D,
    config: TranscriptionConfig,
    state: SessionState,
    utterance_id: u64,
    /// Chunks held back until `min_chunk_samples` of audio accumulates.
    pending: Vec<i16>,
    /// Last partial text emitted, for deduplication.
    previous_partial: String,
}

impl<D: SpeechDecoder> StreamingSession<D> {
    pub fn new(decoder: D, config: TranscriptionConfig) -> Self {
        Self {
            decoder,
            config,
            state: SessionState::Idle,
            utterance_id: next_utterance_id(),
            pending: Vec::new(),
            previous_partial: String::new(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Feed one chunk of mono S16LE PCM. Opens the session on the first
    /// chunk. Returns a partial event when partial reporting (`verbose`) is
    /// enabled, the decoder produced a new partial, and enough audio has
    /// accumulated per `buffer_size_ms`.
    ///
    /// A decoder error resets the session to Idle: decoder state may be
    /// inconsistent after a failed chunk, so the session does not continue
    /// Listening past one.
    pub fn feed(&mut self, chunk: &[i16]) -> Result<Option<TranscriptionEvent>, SttError> {
        if self.state == SessionState::Idle {
            tracing::debug!(target: "hark::stt::vosk", utterance_id = self.utterance_id, "session opened");
            self.state = SessionState::Listening;
        }

        self.pending.extend_from_slice(chunk);
        if self.pending.len() < self.config.min_chunk_samples() {
            return Ok(None);
        }
        let buffered = std::mem::take(&mut self.pending);

        let progress = match self.decoder.accept_frame(&buffered) {
            Ok(progress) => progress,
            Err(e) => {
                tracing::warn!(
                    target: "hark::stt::vosk",
                    utterance_id = self.utterance_id,
                    error = %e,
                    "chunk decode failed, session reset"
                );
                // Decoder internals may still hold the failed utterance;
                // release them so the next utterance starts clean.
                let _ = self.decoder.reset();
                self.reset_to_idle();
                return Err(e);
            }
        };

        match progress {
            DecodeProgress::Running(partial) => {
                let Some(partial) = partial else {
                    return Ok(None);
                };
                if !self.config.verbose || partial.text == self.previous_partial {
                    return Ok(None);
                }
                self.previous_partial = partial.text.clone();
                Ok(Some(TranscriptionEvent::Partial {
                    utterance_id: self.utterance_id,
                    partial,
                }))
            }
            // The engine closed the utterance on its own (segment boundary);
            // report it and start a fresh utterance within the session.
            DecodeProgress::Finalized(hypothesis) => {
                let utterance_id = self.utterance_id;
                self.utterance_id = next_utterance_id();
                self.previous_partial.clear();
                Ok(hypothesis.map(|hypothesis| TranscriptionEvent::Final {
                    utterance_id,
                    hypothesis,
                }))
            }
        }
    }

    /// End-of-utterance signal from the caller. Flushes the decoder, always
    /// produces a final hypothesis (empty when no speech was recognized, not
    /// an error), and returns the session to Idle ready for the next
    /// utterance. Always emitted after all partials of this session.
    pub fn end_utterance(&mut self) -> Result<(u64, Hypothesis), SttError> {
        if !self.pending.is_empty() {
            let buffered = std::mem::take(&mut self.pending);
            if let Err(e) = self.decoder.accept_frame(&buffered) {
                let _ = self.decoder.reset();
                self.reset_to_idle();
                return Err(e);
            }
        }

        let result = self.decoder.finalize_utterance();
        if result.is_err() {
            let _ = self.decoder.reset();
        }
        let utterance_id = self.utterance_id;
        self.reset_to_idle();
        let hypothesis = result?.unwrap_or_default();
        tracing::debug!(
            target: "hark::stt::vosk",
            utterance_id,
            text = %hypothesis.text,
            "utterance finalized"
        );
        Ok((utterance_id, hypothesis))
    }

    /// Discard the session without producing a final hypothesis. Decoder
    /// state is released for the next utterance; buffered audio is dropped.
    pub fn abandon(&mut self) -> Result<(), SttError> {
        tracing::debug!(target: "hark::stt::vosk", utterance_id = self.utterance_id, "session abandoned");
        self.pending.clear();
        let result = self.decoder.reset();
        self.reset_to_idle();
        result
    }

    /// Consume the session, releasing the decoder.
    pub fn into_decoder(self) -> D {
        self.decoder
    }

    fn reset_to_idle(&mut self) {
        self.state = SessionState::Idle;
        self.utterance_id = next_utterance_id();
        self.pending.clear();
        self.previous_partial.clear();
    }
}
