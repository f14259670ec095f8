//! Common test utilities for support-bundle integration tests

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use support_bundle::{Archive, Collector, Result};

/// Archive recording every write, including overwritten ones.
#[derive(Default)]
pub struct RecordingArchive {
    files: Mutex<HashMap<String, Vec<u8>>>,
    writes: AtomicUsize,
    closes: AtomicUsize,
}

#[allow(dead_code)]
impl RecordingArchive {
    pub fn file(&self, path: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(path).cloned()
    }

    pub fn file_count(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Archive for RecordingArchive {
    async fn write(&self, path: &str, contents: &[u8]) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.files
            .lock()
            .unwrap()
            .insert(path.to_string(), contents.to_vec());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Collector returning a fixed payload.
#[allow(dead_code)]
pub fn fixed(path: &str, data: &'static str) -> Collector {
    Collector::new(path, move |_, _| async move { Ok(Some(data.as_bytes().to_vec())) })
}
