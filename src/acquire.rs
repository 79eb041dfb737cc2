//! Fetching and caching the zipped shapefile.

use std::{io, path::{Path, PathBuf}, time::Duration};

use thiserror::Error;

use crate::common::{download_big_file, ensure_dir_exists, extract_zip, move_tree};

/// Failures while acquiring the source archive. All of them abort the run.
#[derive(Debug, Error)]
pub enum AcquireError {
    /// Could not connect, or the server answered with an error status.
    #[error("failed to download {url}")]
    Network { url: String, #[source] source: reqwest::Error },

    /// The connection dropped (or timed out) while the body was streaming.
    #[error("transfer of {url} was interrupted")]
    Transfer { url: String, #[source] source: io::Error },

    /// The downloaded content is not a readable zip archive.
    #[error("{} is not a valid zip archive", path.display())]
    Archive { path: PathBuf, #[source] source: zip::result::ZipError },

    /// The archive extracted cleanly but did not contain the expected file.
    #[error("archive from {url} did not contain {}", expected.display())]
    MissingShapefile { url: String, expected: PathBuf },

    #[error("{context}")]
    Io { context: String, #[source] source: io::Error },
}

impl AcquireError {
    pub(crate) fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io { context: context.into(), source }
    }

    /// True for connection and transfer failures.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. } | Self::Transfer { .. })
    }
}

/// Where to fetch a zipped shapefile from, and where to keep it.
#[derive(Clone, Debug)]
pub struct ShapefileSource {
    pub url: String,
    pub cache_dir: PathBuf,
    pub shapefile_name: String,
    pub timeout: Duration,
}

impl ShapefileSource {
    /// Path of the `.shp` file once the archive has been extracted.
    pub fn shapefile_path(&self) -> PathBuf {
        self.cache_dir.join(&self.shapefile_name)
    }

    fn archive_path(&self) -> PathBuf {
        self.cache_dir.join(Path::new(&self.shapefile_name).with_extension("zip"))
    }

    /// Make sure the shapefile is on disk, downloading and extracting it if needed.
    /// A no-op when the `.shp` already exists. Returns the `.shp` path.
    pub fn acquire(&self) -> Result<PathBuf, AcquireError> {
        let shp_path = self.shapefile_path();
        if shp_path.exists() {
            tracing::info!(
                "[acquire] {} already exists in {}, skipping download",
                self.shapefile_name, self.cache_dir.display()
            );
            return Ok(shp_path);
        }

        ensure_dir_exists(&self.cache_dir)
            .map_err(|source| AcquireError::io(format!("create directory {}", self.cache_dir.display()), source))?;

        let zip_path = self.archive_path();
        tracing::info!("[download] {} -> {}", self.url, zip_path.display());
        download_big_file(&self.url, &zip_path, self.timeout)?;

        self.install_archive(&zip_path)?;
        tracing::info!("[acquire] download and extraction complete");

        Ok(shp_path)
    }

    /// Extract a downloaded archive into the cache directory and delete it.
    /// Files are staged in a scratch directory first, so an interrupted
    /// extraction never leaves a `.shp` behind that would look cached.
    pub fn install_archive(&self, zip_path: &Path) -> Result<(), AcquireError> {
        let staging = tempfile::Builder::new()
            .prefix(".extract")
            .tempdir_in(&self.cache_dir)
            .map_err(|source| AcquireError::io(format!("create staging directory in {}", self.cache_dir.display()), source))?;

        tracing::info!("[extract] {} -> {}", zip_path.display(), self.cache_dir.display());
        extract_zip(zip_path, staging.path(), true)?;

        move_tree(staging.path(), &self.cache_dir, "shp")
            .map_err(|source| AcquireError::io(format!("move extracted files into {}", self.cache_dir.display()), source))?;

        let shp_path = self.shapefile_path();
        if !shp_path.exists() {
            return Err(AcquireError::MissingShapefile { url: self.url.clone(), expected: shp_path });
        }
        Ok(())
    }
}

/// Download `url` to `path` unless `path` already exists. Returns `path`.
/// The file only appears once the whole body has been received.
pub fn fetch_cached(url: &str, path: &Path, timeout: Duration) -> Result<PathBuf, AcquireError> {
    if path.exists() {
        tracing::debug!("[acquire] {} already cached", path.display());
        return Ok(path.to_path_buf());
    }
    if let Some(dir) = path.parent() {
        ensure_dir_exists(dir)
            .map_err(|source| AcquireError::io(format!("create directory {}", dir.display()), source))?;
    }

    tracing::info!("[download] {url} -> {}", path.display());
    download_big_file(url, path, timeout)?;
    Ok(path.to_path_buf())
}
