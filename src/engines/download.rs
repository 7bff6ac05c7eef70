//! Model and training-data download helpers shared by the engines

use crate::error::OcrError;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Cache directory for downloaded engine data
pub fn cache_dir(subdir: &str) -> Result<PathBuf, OcrError> {
    let dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("receipt-ocr")
        .join(subdir);

    std::fs::create_dir_all(&dir).map_err(|e| {
        OcrError::InitializationError(format!("Failed to create cache directory: {}", e))
    })?;

    Ok(dir)
}

/// Ensure `filename` exists in `dir`, downloading it from `url` if needed
pub fn ensure_downloaded(url: &str, dir: &Path, filename: &str) -> Result<PathBuf, OcrError> {
    let path = dir.join(filename);

    if !path.exists() {
        tracing::info!("Downloading {} (this may take a moment)...", filename);
        download_file(url, &path)?;
        tracing::info!("Downloaded {} to {:?}", filename, path);
    } else {
        tracing::info!("Using cached {} from {:?}", filename, path);
    }

    Ok(path)
}

/// Download a file from URL to path using ureq
fn download_file(url: &str, path: &Path) -> Result<(), OcrError> {
    let response = ureq::get(url)
        .call()
        .map_err(|e| OcrError::InitializationError(format!("Failed to download {}: {}", url, e)))?;

    // Read the whole body before touching the file so a failed download
    // leaves no partial file in the cache
    let buffer = response.into_body().read_to_vec().map_err(|e| {
        OcrError::InitializationError(format!("Failed to read response body: {}", e))
    })?;

    let mut file = File::create(path)
        .map_err(|e| OcrError::InitializationError(format!("Failed to create file: {}", e)))?;

    file.write_all(&buffer)
        .map_err(|e| OcrError::InitializationError(format!("Failed to write file: {}", e)))?;

    Ok(())
}
