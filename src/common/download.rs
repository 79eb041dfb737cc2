use std::{fs::File, io::{self, Write}, path::{Path, PathBuf}, time::Duration};

use reqwest::{blocking::Client, redirect::Policy};
use tempfile::NamedTempFile;

use crate::acquire::AcquireError;

const USER_AGENT: &str = concat!("texas-peaks/", env!("CARGO_PKG_VERSION"));

/// Write-then-rename wrapper for atomic big-file outputs.
/// Dropping it without calling `finalize` discards the partial file.
struct PendingWrite {
    target: PathBuf,
    tmp: Option<NamedTempFile>,
}

impl PendingWrite {
    /// Open a temp file next to `target` for a big write.
    fn open(target: &Path) -> io::Result<Self> {
        let parent = target.parent().unwrap_or(Path::new("."));
        std::fs::create_dir_all(parent)?;
        let tmp = NamedTempFile::new_in(parent)?;
        Ok(Self { target: target.to_path_buf(), tmp: Some(tmp) })
    }

    fn file(&mut self) -> io::Result<&mut NamedTempFile> {
        self.tmp.as_mut().ok_or_else(|| io::Error::other("write after finalize"))
    }

    /// Finalize the big write.
    fn finalize(&mut self) -> io::Result<()> {
        let tmp = self.tmp.take().ok_or_else(|| io::Error::other("already finalized"))?;
        tmp.as_file().sync_all().ok(); // best-effort fsync file
        tmp.persist(&self.target).map_err(|e| e.error)?;
        if let Some(dir) = self.target.parent() {
            let _ = File::open(dir).and_then(|f| f.sync_all());
        }
        Ok(())
    }
}

impl Write for PendingWrite {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> { self.file()?.write(buf) }

    fn flush(&mut self) -> io::Result<()> { self.file()?.flush() }
}

/// Download a large file from `file_url` to `out_path`, giving up after `timeout`.
/// `out_path` only appears once the whole body has been received.
pub(crate) fn download_big_file(file_url: &str, out_path: &Path, timeout: Duration) -> Result<(), AcquireError> {
    let network = |source| AcquireError::Network { url: file_url.to_string(), source };

    let client = Client::builder()
        .user_agent(USER_AGENT)
        .redirect(Policy::limited(10))
        .timeout(timeout)
        .build()
        .map_err(network)?;

    let mut resp = client.get(file_url).send()
        .and_then(|resp| resp.error_for_status())
        .map_err(network)?;

    let mut sink = PendingWrite::open(out_path)
        .map_err(|source| AcquireError::io(format!("create temp file for {}", out_path.display()), source))?;

    io::copy(&mut resp, &mut sink)
        .map_err(|source| AcquireError::Transfer { url: file_url.to_string(), source })?;

    sink.finalize()
        .map_err(|source| AcquireError::io(format!("rename to {}", out_path.display()), source))?;

    Ok(())
}
