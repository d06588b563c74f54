//! Vosk speech recognition plugin for Hark
//!
//! This crate adapts the Vosk engine (a wrapper over Kaldi) to the Hark STT
//! contract: a model resolver that turns a configured reference (local path,
//! language code, or download URL) into a ready-to-load model directory, a
//! streaming session state machine, and a batch recognizer.
//!
//! Everything that links against `libvosk` is gated behind the non-default
//! `vosk` cargo feature; the resolver, registry, and session/batch state
//! handling build and test without the native library.

pub mod batch;
pub mod model;
pub mod registry;
pub mod session;

#[cfg(feature = "vosk")]
pub mod plugin;
#[cfg(feature = "vosk")]
pub mod vosk_transcriber;

pub use batch::BatchRecognizer;
pub use model::{CachedModel, ModelReference, ModelResolver};
pub use session::StreamingSession;

#[cfg(feature = "vosk")]
pub use plugin::{VoskPlugin, VoskPluginFactory};
#[cfg(feature = "vosk")]
pub use vosk_transcriber::VoskTranscriber;

// Re-export common types
pub use hark_stt::{
    Hypothesis, PartialHypothesis, SpeechDecoder, SttError, TranscriptionConfig,
    TranscriptionEvent,
};
