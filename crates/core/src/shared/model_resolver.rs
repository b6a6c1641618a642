use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
    #[error("model {0} not found locally and no download URL configured")]
    NotFound(String),
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Resolve a model file by name, checking local locations before downloading.
///
/// Resolution order:
/// 1. User cache directory (platform-specific)
/// 2. Configured models directory (bundled / pre-provisioned installs)
/// 3. Download from `<base_url>/<name>` to the cache, if a base URL is configured
pub fn resolve(
    name: &str,
    base_url: Option<&str>,
    models_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    let cache_dir = model_cache_dir().ok();
    resolve_in(name, base_url, models_dir, cache_dir.as_deref(), progress)
}

/// Hosts without a cache directory can still use `models_dir`; only the
/// download step needs the cache.
fn resolve_in(
    name: &str,
    base_url: Option<&str>,
    models_dir: Option<&Path>,
    cache_dir: Option<&Path>,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, ModelResolveError> {
    if let Some(cached_path) = cache_dir.map(|dir| dir.join(name)) {
        if cached_path.exists() {
            return Ok(cached_path);
        }
    }

    if let Some(path) = find_local(name, models_dir) {
        return Ok(path);
    }

    let base_url = base_url.ok_or_else(|| ModelResolveError::NotFound(name.to_string()))?;
    let cache_dir = cache_dir.ok_or(ModelResolveError::NoCacheDir)?;
    let url = format!("{}/{}", base_url.trim_end_matches('/'), name);
    fs::create_dir_all(cache_dir).map_err(ModelResolveError::CacheDir)?;
    let cached_path = cache_dir.join(name);
    download(&url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Look for `name` inside `models_dir` without touching the network.
pub fn find_local(name: &str, models_dir: Option<&Path>) -> Option<PathBuf> {
    let candidate = models_dir?.join(name);
    candidate.exists().then_some(candidate)
}

/// Platform-specific model cache directory.
///
/// - macOS: `~/Library/Application Support/CallSense/models/`
/// - Linux: `$XDG_CACHE_HOME/CallSense/models/` or `~/.cache/CallSense/models/`
/// - Windows: `%LOCALAPPDATA%/CallSense/models/`
pub fn model_cache_dir() -> Result<PathBuf, ModelResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("CallSense").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("CallSense").join("models"))
            .ok_or(ModelResolveError::NoCacheDir)
    }
}

fn download(url: &str, dest: &Path, progress: Option<ProgressFn>) -> Result<(), ModelResolveError> {
    let temp_path = dest.with_extension("part");

    let result = download_inner(url, dest, &temp_path, progress);

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), ModelResolveError> {
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| ModelResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;

    let mut file = fs::File::create(temp_path).map_err(|e| ModelResolveError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    })?;

    // Encoder weights are hundreds of MB; stream instead of buffering.
    let mut reader = response;
    let mut buf = vec![0u8; 1024 * 1024];
    loop {
        let n = reader.read(&mut buf).map_err(|e| ModelResolveError::Write {
            path: temp_path.to_path_buf(),
            source: e,
        })?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])
            .map_err(|e| ModelResolveError::Write {
                path: temp_path.to_path_buf(),
                source: e,
            })?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }

    file.flush().map_err(|e| ModelResolveError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    })?;
    drop(file);

    fs::rename(temp_path, dest).map_err(|e| ModelResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(())
}
