//! Default-model registry: language code to download URL.
//!
//! Mirrors the alphacephei model catalogue for the languages this plugin can
//! provision unattended. The capability query "which languages are
//! supported" is answered from this table, not from whatever model the user
//! happens to have configured.

/// Which variant of the default model to prefer for a language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModelSize {
    /// Compact models suitable for embedded / real-time use.
    #[default]
    Small,
    /// Full-size models, where one is published.
    Big,
}

const SMALL_MODELS: &[(&str, &str)] = &[
    (
        "en",
        "http://alphacephei.com/vosk/models/vosk-model-small-en-us-0.15.zip",
    ),
    (
        "en-in",
        "http://alphacephei.com/vosk/models/vosk-model-small-en-in-0.4.zip",
    ),
    (
        "cn",
        "https://alphacephei.com/vosk/models/vosk-model-small-cn-0.3.zip",
    ),
    (
        "ru",
        "https://alphacephei.com/vosk/models/vosk-model-small-ru-0.15.zip",
    ),
    (
        "fr",
        "https://alphacephei.com/vosk/models/vosk-model-small-fr-pguyot-0.3.zip",
    ),
    (
        "de",
        "https://alphacephei.com/vosk/models/vosk-model-small-de-0.15.zip",
    ),
    (
        "es",
        "https://alphacephei.com/vosk/models/vosk-model-small-es-0.3.zip",
    ),
    (
        "pt",
        "https://alphacephei.com/vosk/models/vosk-model-small-pt-0.3.zip",
    ),
    (
        "gr",
        "https://alphacephei.com/vosk/models/vosk-model-el-gr-0.7.zip",
    ),
    (
        "tr",
        "https://alphacephei.com/vosk/models/vosk-model-small-tr-0.3.zip",
    ),
    (
        "vn",
        "https://alphacephei.com/vosk/models/vosk-model-small-vn-0.3.zip",
    ),
    (
        "it",
        "https://alphacephei.com/vosk/models/vosk-model-small-it-0.4.zip",
    ),
    (
        "nl",
        "https://alphacephei.com/vosk/models/vosk-model-nl-spraakherkenning-0.6-lgraph.zip",
    ),
    (
        "ca",
        "https://alphacephei.com/vosk/models/vosk-model-small-ca-0.4.zip",
    ),
    (
        "ar",
        "https://alphacephei.com/vosk/models/vosk-model-ar-mgb2-0.4.zip",
    ),
    (
        "fa",
        "https://alphacephei.com/vosk/models/vosk-model-small-fa-0.5.zip",
    ),
    (
        "tl",
        "https://alphacephei.com/vosk/models/vosk-model-tl-ph-generic-0.6.zip",
    ),
];

const BIG_MODELS: &[(&str, &str)] = &[
    (
        "en",
        "https://alphacephei.com/vosk/models/vosk-model-en-us-aspire-0.2.zip",
    ),
    (
        "en-in",
        "http://alphacephei.com/vosk/models/vosk-model-en-in-0.4.zip",
    ),
    (
        "cn",
        "https://alphacephei.com/vosk/models/vosk-model-cn-0.1.zip",
    ),
    (
        "ru",
        "https://alphacephei.com/vosk/models/vosk-model-ru-0.10.zip",
    ),
    (
        "de",
        "https://alphacephei.com/vosk/models/vosk-model-de-0.6.zip",
    ),
    (
        "nl",
        "https://alphacephei.com/vosk/models/vosk-model-nl-spraakherkenning-0.6.zip",
    ),
    (
        "fa",
        "https://alphacephei.com/vosk/models/vosk-model-fa-0.5.zip",
    ),
];

fn lookup(table: &[(&str, &'static str)], code: &str) -> Option<&'static str> {
    table
        .iter()
        .find(|(lang, _)| *lang == code)
        .map(|(_, url)| *url)
}

/// Default model URL for a language code, or None when no model is known.
///
/// Codes are matched case-insensitively; a regional code falls back to its
/// primary subtag when no exact entry exists (`en-gb` -> `en`, but `en-in`
/// keeps its dedicated model). `Big` falls back to the small model for
/// languages without a published full-size one.
pub fn default_model_url(code: &str, size: ModelSize) -> Option<&'static str> {
    let code = code.to_ascii_lowercase();
    let primary = code.split('-').next().unwrap_or(&code);

    if size == ModelSize::Big {
        if let Some(url) = lookup(BIG_MODELS, &code).or_else(|| lookup(BIG_MODELS, primary)) {
            return Some(url);
        }
    }
    lookup(SMALL_MODELS, &code).or_else(|| lookup(SMALL_MODELS, primary))
}

/// Language codes with a known default model, in registry order.
pub fn supported_languages() -> Vec<String> {
    SMALL_MODELS.iter().map(|(lang, _)| lang.to_string()).collect()
}
