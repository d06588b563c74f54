//! Model resolution and caching.
//!
//! A configured model reference is one of: a local directory path, a
//! download URL, or a bare language code looked up in the default-model
//! registry. Resolution yields a ready-to-load model directory, downloading
//! and extracting an archive into a per-user cache the first time a URL is
//! seen. Extraction is atomic with respect to readers: archives are unpacked
//! into a temp directory and renamed into place, so a crash mid-way never
//! leaves a partially-usable cache entry.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;
use zip::ZipArchive;

use hark_stt::SttError;

use crate::registry::{self, ModelSize};

/// Environment override honored ahead of any configured reference.
pub const MODEL_PATH_ENV: &str = "VOSK_MODEL_PATH";

/// Cache directory name under the per-user data dir.
const CACHE_DIR: &str = "vosk";

/// A configured model reference, classified exactly once at
/// configuration-ingestion time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReference {
    /// An existing local model directory, used as-is.
    LocalPath(PathBuf),
    /// An HTTP(S) URL serving a compressed model archive.
    Url(String),
    /// A bare language code resolved against the default-model registry.
    LanguageCode(String),
}

impl ModelReference {
    /// Classify a raw configuration value by shape: existing directory wins,
    /// then a URL scheme, otherwise the value is treated as a language code.
    pub fn classify(raw: &str) -> Self {
        let path = Path::new(raw);
        if path.is_dir() {
            ModelReference::LocalPath(path.to_path_buf())
        } else if raw.starts_with("http://") || raw.starts_with("https://") {
            ModelReference::Url(raw.to_string())
        } else {
            ModelReference::LanguageCode(raw.to_string())
        }
    }
}

/// A resolved, on-disk, ready-to-load model directory plus the reference
/// that produced it. Never mutated after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedModel {
    pub path: PathBuf,
    pub reference: ModelReference,
}

/// Why a model reference could not be resolved.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("model path '{0}' does not exist or is not a directory")]
    PathMissing(String),

    #[error("no default model known for language '{0}'")]
    UnknownLanguage(String),

    #[error("download of '{url}' failed: {reason}")]
    DownloadFailed { url: String, reason: String },

    #[error("'{0}' is not a supported archive format (.zip, .tar.gz, .tgz)")]
    UnsupportedArchive(String),

    #[error("failed to extract model archive: {0}")]
    ExtractionFailed(String),

    #[error("model cache i/o error: {0}")]
    Io(#[from] io::Error),
}

impl From<ModelError> for SttError {
    fn from(err: ModelError) -> Self {
        SttError::ModelUnavailable(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArchiveKind {
    Zip,
    TarGz,
}

/// Resolves model references against the local cache, downloading and
/// extracting archives on first use. No retries: a failed download surfaces
/// immediately and the caller decides whether to try again.
#[derive(Debug, Clone)]
pub struct ModelResolver {
    cache_root: PathBuf,
    size: ModelSize,
}

impl Default for ModelResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelResolver {
    /// Resolver backed by the per-user data directory.
    pub fn new() -> Self {
        let base = dirs::data_dir().unwrap_or_else(env::temp_dir);
        Self {
            cache_root: base.join(CACHE_DIR),
            size: ModelSize::default(),
        }
    }

    /// Resolver with an explicit cache root.
    pub fn with_cache_root(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            size: ModelSize::default(),
        }
    }

    pub fn model_size(mut self, size: ModelSize) -> Self {
        self.size = size;
        self
    }

    pub fn cache_root(&self) -> &Path {
        &self.cache_root
    }

    /// Resolve a reference to a usable local model directory.
    ///
    /// The `VOSK_MODEL_PATH` environment variable, when set, overrides the
    /// configured reference entirely; a set-but-invalid override is an error
    /// rather than a silent fallback.
    pub fn resolve(&self, reference: &ModelReference) -> Result<CachedModel, ModelError> {
        if let Ok(p) = env::var(MODEL_PATH_ENV) {
            let pb = PathBuf::from(&p);
            if !pb.is_dir() {
                return Err(ModelError::PathMissing(p));
            }
            tracing::info!(target: "hark::stt::vosk", path = %pb.display(), "model resolved from {MODEL_PATH_ENV}");
            return Ok(CachedModel {
                path: pb.clone(),
                reference: ModelReference::LocalPath(pb),
            });
        }

        let path = match reference {
            ModelReference::LocalPath(path) => {
                if !path.is_dir() {
                    return Err(ModelError::PathMissing(path.display().to_string()));
                }
                path.clone()
            }
            ModelReference::Url(url) => self.resolve_url(url)?,
            ModelReference::LanguageCode(code) => {
                let url = registry::default_model_url(code, self.size)
                    .ok_or_else(|| ModelError::UnknownLanguage(code.clone()))?;
                self.resolve_url(url)?
            }
        };

        tracing::info!(
            target: "hark::stt::vosk",
            path = %path.display(),
            reference = ?reference,
            "model resolved"
        );
        Ok(CachedModel {
            path,
            reference: reference.clone(),
        })
    }

    /// Idempotent URL resolution: the cache path is derived from the archive
    /// name, and a populated cache entry short-circuits all network I/O.
    fn resolve_url(&self, url: &str) -> Result<PathBuf, ModelError> {
        let kind = archive_kind(url)?;
        let name = archive_stem(url)?;
        let final_path = self.cache_root.join(&name);
        if final_path.is_dir() {
            tracing::debug!(target: "hark::stt::vosk", path = %final_path.display(), "model cache hit");
            return Ok(final_path);
        }

        fs::create_dir_all(&self.cache_root)?;
        let archive_path = self
            .cache_root
            .join(format!(".download-{}", Uuid::new_v4()));

        tracing::info!(target: "hark::stt::vosk", url, "downloading model (this may take a while)");
        let download = download_to(url, &archive_path);
        let extracted = download
            .and_then(|()| extract_archive(kind, &archive_path, &self.cache_root, &final_path));
        let _ = fs::remove_file(&archive_path);
        extracted?;

        Ok(final_path)
    }
}

fn download_to(url: &str, dest: &Path) -> Result<(), ModelError> {
    let failed = |reason: String| ModelError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let mut response = reqwest::blocking::get(url).map_err(|e| failed(e.to_string()))?;
    if !response.status().is_success() {
        return Err(failed(format!("HTTP status {}", response.status())));
    }
    let mut file = fs::File::create(dest)?;
    response
        .copy_to(&mut file)
        .map_err(|e| failed(e.to_string()))?;
    Ok(())
}

/// Unpack `archive_path` under a temp directory next to the cache entry and
/// rename the model directory into place. A reader either sees no entry or a
/// complete one.
fn extract_archive(
    kind: ArchiveKind,
    archive_path: &Path,
    cache_root: &Path,
    final_path: &Path,
) -> Result<(), ModelError> {
    let temp_dir = cache_root.join(format!(".tmp-{}", Uuid::new_v4()));
    let result = (|| -> Result<(), ModelError> {
        fs::create_dir_all(&temp_dir)?;
        match kind {
            ArchiveKind::Zip => unpack_zip(archive_path, &temp_dir)?,
            ArchiveKind::TarGz => unpack_tar_gz(archive_path, &temp_dir)?,
        }

        // Model archives contain a single top-level directory.
        let extracted_dir = fs::read_dir(&temp_dir)?
            .filter_map(Result::ok)
            .find(|e| e.file_type().is_ok_and(|ft| ft.is_dir()))
            .map(|e| e.path())
            .ok_or_else(|| {
                ModelError::ExtractionFailed("no directory found in archive".to_string())
            })?;

        match fs::rename(&extracted_dir, final_path) {
            Ok(()) => Ok(()),
            // A concurrent resolver may have won the rename; that entry is
            // complete by construction, so use it.
            Err(_) if final_path.is_dir() => Ok(()),
            Err(e) => Err(e.into()),
        }
    })();

    let _ = fs::remove_dir_all(&temp_dir);
    result
}

fn unpack_zip(archive_path: &Path, dest: &Path) -> Result<(), ModelError> {
    let file = fs::File::open(archive_path)?;
    let mut archive =
        ZipArchive::new(file).map_err(|e| ModelError::ExtractionFailed(e.to_string()))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| ModelError::ExtractionFailed(e.to_string()))?;
        let outpath = dest.join(entry.enclosed_name().ok_or_else(|| {
            ModelError::ExtractionFailed("invalid file path in archive".to_string())
        })?);

        if entry.name().ends_with('/') {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = fs::File::create(&outpath)?;
            io::copy(&mut entry, &mut outfile)?;
        }
    }
    Ok(())
}

fn unpack_tar_gz(archive_path: &Path, dest: &Path) -> Result<(), ModelError> {
    let file = fs::File::open(archive_path)?;
    let decoder = flate2::read::GzDecoder::new(file);
    tar::Archive::new(decoder)
        .unpack(dest)
        .map_err(|e| ModelError::ExtractionFailed(e.to_string()))
}

fn archive_kind(url: &str) -> Result<ArchiveKind, ModelError> {
    if url.ends_with(".zip") {
        Ok(ArchiveKind::Zip)
    } else if url.ends_with(".tar.gz") || url.ends_with(".tgz") {
        Ok(ArchiveKind::TarGz)
    } else {
        Err(ModelError::UnsupportedArchive(url.to_string()))
    }
}

/// Deterministic cache entry name: the archive file name without its
/// archive extension, e.g. `.../vosk-model-small-en-us-0.15.zip` ->
/// `vosk-model-small-en-us-0.15`.
fn archive_stem(url: &str) -> Result<String, ModelError> {
    let file = url
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ModelError::UnsupportedArchive(url.to_string()))?;
    for suffix in [".tar.gz", ".tgz", ".zip"] {
        if let Some(s) = file.strip_suffix(suffix) {
            if s.is_empty() {
                break;
            }
            return Ok(s.to_string());
        }
    }
    Err(ModelError::UnsupportedArchive(url.to_string()))
}
