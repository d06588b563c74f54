//! Error taxonomy shared by all STT plugins.

use thiserror::Error;

/// Errors surfaced by STT plugins and their components.
///
/// `ConfigurationError` and `ModelUnavailable` are initialization-time
/// failures: a plugin must refuse audio rather than accept chunks against a
/// broken session. `RecognitionFailed` is a per-call failure; during
/// streaming it terminates the current session but leaves other sessions
/// untouched. No variant is retried automatically anywhere in this stack.
#[derive(Debug, Error)]
pub enum SttError {
    /// The configured model reference cannot be resolved to a usable model:
    /// bad path, failed download, corrupt archive, or unknown language code.
    #[error("model unavailable: {0}")]
    ModelUnavailable(String),

    /// Engine initialization or a decode call failed, or the engine returned
    /// output that could not be parsed into a hypothesis.
    #[error("recognition failed: {0}")]
    RecognitionFailed(String),

    /// A required option is missing or malformed, detected before any model
    /// work is attempted.
    #[error("configuration error: {0}")]
    ConfigurationError(String),
}
