//! Output archive abstraction and the bundled implementations.
//!
//! Every collector writes its payload through [`Archive::write`], potentially
//! from many workers at once, so implementations own their locking.
//! [`Archive::close`] is called by the bundle runner exactly once, after all
//! workers finished without a run-level error.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::debug;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::{Error, Result};

/// Destination for collected artifacts.
#[async_trait::async_trait]
pub trait Archive: Send + Sync {
    /// Store `contents` under `path`.
    ///
    /// Writing the same path twice is not detected; which entry wins is up to the implementation.
    async fn write(&self, path: &str, contents: &[u8]) -> Result<()>;

    /// Finalize the archive.
    async fn close(&self) -> Result<()>;
}

fn poisoned() -> Error {
    Error::Other("archive lock poisoned".to_string())
}

/// Thread-safe zip archive writer.
///
/// Entries are deflate-compressed. Compression and file I/O run on tokio's
/// blocking pool. After [`Archive::close`] every further write or close fails
/// with [`Error::ArchiveClosed`].
pub struct ZipArchive<W: Write + Seek + Send + 'static> {
    writer: Arc<Mutex<Option<ZipWriter<W>>>>,
}

impl<W: Write + Seek + Send + 'static> ZipArchive<W> {
    /// Wrap an arbitrary seekable writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(Some(ZipWriter::new(writer)))),
        }
    }
}

impl ZipArchive<File> {
    /// Create (or truncate) a zip file on disk.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!(?path, "creating zip archive");

        let file = File::create(path)?;
        Ok(Self::new(file))
    }
}

#[async_trait::async_trait]
impl<W: Write + Seek + Send + 'static> Archive for ZipArchive<W> {
    async fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        let writer = Arc::clone(&self.writer);
        let path = path.to_string();
        let contents = contents.to_vec();

        // Deflate and disk I/O stay off the runtime threads driving the other workers.
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut guard = writer.lock().map_err(|_| poisoned())?;
            let writer = guard.as_mut().ok_or(Error::ArchiveClosed)?;

            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
            writer.start_file(path, options)?;
            writer.write_all(&contents)?;

            Ok(())
        })
        .await?
    }

    async fn close(&self) -> Result<()> {
        let writer = Arc::clone(&self.writer);

        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut writer = writer
                .lock()
                .map_err(|_| poisoned())?
                .take()
                .ok_or(Error::ArchiveClosed)?;

            let mut inner = writer.finish()?;
            inner.flush()?;

            Ok(())
        })
        .await?
    }
}

/// In-memory archive keyed by path.
///
/// Later writes to the same path replace earlier ones.
#[derive(Debug, Default)]
pub struct MemoryArchive {
    files: Mutex<HashMap<String, Vec<u8>>>,
    closes: AtomicUsize,
}

impl MemoryArchive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Contents stored at `path`.
    pub fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().ok()?.get(path).cloned()
    }

    /// Sorted list of stored paths.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .files
            .lock()
            .map(|files| files.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.files.lock().map(|files| files.len()).unwrap_or(0)
    }

    /// Whether no entry has been stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of times [`Archive::close`] was called.
    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    /// Whether the archive has been closed.
    pub fn is_closed(&self) -> bool {
        self.close_count() > 0
    }
}

#[async_trait::async_trait]
impl Archive for MemoryArchive {
    async fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        if self.is_closed() {
            return Err(Error::ArchiveClosed);
        }

        self.files
            .lock()
            .map_err(|_| poisoned())?
            .insert(path.to_string(), contents.to_vec());

        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.closes.fetch_add(1, Ordering::SeqCst) > 0 {
            return Err(Error::ArchiveClosed);
        }

        Ok(())
    }
}
