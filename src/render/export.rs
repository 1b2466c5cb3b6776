/// Destinations for exported images

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ExportError, RenderError};

/// Somewhere a finished PNG can be saved
pub trait ImageSink {
    /// Save `png` under (a variant of) `file_name`, returning the final path
    fn save(&mut self, file_name: &str, png: &[u8]) -> Result<PathBuf, ExportError>;
}

/// The user's download directory
#[derive(Debug, Clone)]
pub struct DownloadFolder {
    dir: PathBuf,
}

impl DownloadFolder {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Platform download directory, falling back to the home directory
    pub fn user() -> Result<Self, ExportError> {
        dirs::download_dir()
            .or_else(dirs::home_dir)
            .map(Self::new)
            .ok_or(ExportError::NoDownloadDir)
    }
}

impl ImageSink for DownloadFolder {
    fn save(&mut self, file_name: &str, png: &[u8]) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(|e| ExportError::Write {
            path: self.dir.clone(),
            source: Arc::new(e),
        })?;

        let path = unique_path(&self.dir, file_name);
        std::fs::write(&path, png).map_err(|e| ExportError::Write {
            path: path.clone(),
            source: Arc::new(e),
        })?;

        Ok(path)
    }
}

/// First free path for `file_name` in `dir`: `name.png`, `name (1).png`, ...
pub fn unique_path(dir: &Path, file_name: &str) -> PathBuf {
    let candidate = dir.join(file_name);
    if !candidate.exists() {
        return candidate;
    }

    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    let extension = name.extension().map(|e| e.to_string_lossy().into_owned());

    (1..)
        .map(|n| {
            let numbered = match &extension {
                Some(ext) => format!("{} ({}).{}", stem, n, ext),
                None => format!("{} ({})", stem, n),
            };
            dir.join(numbered)
        })
        .find(|path| !path.exists())
        .unwrap_or(candidate)
}

/// Finish a download: hand a successful rasterization to the sink exactly
/// once, and never touch the sink when rasterization failed
pub fn download(
    rasterized: Result<Vec<u8>, RenderError>,
    file_name: &str,
    sink: &mut impl ImageSink,
) -> Result<PathBuf, ExportError> {
    let png = rasterized?;
    let path = sink.save(file_name, &png)?;
    tracing::info!(path = %path.display(), bytes = png.len(), "image downloaded");
    Ok(path)
}

/// Write raw bytes to a path the user picked
pub async fn write_file(path: PathBuf, bytes: Vec<u8>) -> Result<PathBuf, ExportError> {
    tokio::fs::write(&path, bytes).await.map_err(|e| ExportError::Write {
        path: path.clone(),
        source: Arc::new(e),
    })?;
    Ok(path)
}
