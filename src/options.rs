//! Runtime options shared by the bundle runner and every collector.

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;

use crate::archive::{Archive, ZipArchive};
use crate::config::BundleConfig;
use crate::error::{Error, Result};
use crate::progress::Progress;

/// Options for a single bundle run.
///
/// Constructed once before the run and only read afterwards; collectors
/// receive it behind an `Arc`.
pub struct Options {
    archive: Arc<dyn Archive>,
    progress: Option<mpsc::Sender<Progress>>,
    nodes: Vec<String>,
    num_workers: usize,
    log_output: Option<Mutex<Box<dyn Write + Send>>>,
}

impl Options {
    /// Create options writing into `archive`, with one worker and no progress reporting.
    pub fn new(archive: Arc<dyn Archive>) -> Self {
        Self {
            archive,
            progress: None,
            nodes: Vec::new(),
            num_workers: 1,
            log_output: None,
        }
    }

    /// Build options from a validated [`BundleConfig`].
    pub fn from_config(config: &BundleConfig, archive: Arc<dyn Archive>) -> Result<Self> {
        config.validate()?;

        Ok(Self::new(archive)
            .with_num_workers(config.num_workers)
            .with_nodes(config.nodes.clone()))
    }

    /// Build options from a [`BundleConfig`], opening its `output` path as a zip archive.
    pub fn from_config_with_zip(config: &BundleConfig) -> Result<Self> {
        let output = config.output.as_ref().ok_or_else(|| Error::Config {
            message: "output path is required".to_string(),
            key: Some("output".to_string()),
        })?;

        let archive = ZipArchive::create(output)?;
        Self::from_config(config, Arc::new(archive))
    }

    /// Set the number of concurrent workers (0 is treated as 1 at run time).
    pub fn with_num_workers(mut self, count: usize) -> Self {
        self.num_workers = count;
        self
    }

    /// Report per-collector progress into `progress`.
    pub fn with_progress(mut self, progress: mpsc::Sender<Progress>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Set the nodes collector providers gather node-scoped data from.
    pub fn with_nodes<I, S>(mut self, nodes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nodes = nodes.into_iter().map(Into::into).collect();
        self
    }

    /// Send [`Options::log`] lines to `writer` instead of the tracing subscriber.
    pub fn with_log_output(mut self, writer: impl Write + Send + 'static) -> Self {
        self.log_output = Some(Mutex::new(Box::new(writer)));
        self
    }

    /// Archive collected artifacts are written into.
    pub fn archive(&self) -> &Arc<dyn Archive> {
        &self.archive
    }

    /// Progress channel, if progress reporting is enabled.
    pub fn progress(&self) -> Option<&mpsc::Sender<Progress>> {
        self.progress.as_ref()
    }

    /// Configured target nodes.
    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    /// Configured worker count, as given.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    /// Write a diagnostic line to the log output, or to tracing when none is set.
    ///
    /// Log output failures are ignored.
    pub fn log(&self, line: impl fmt::Display) {
        if let Some(output) = &self.log_output
            && let Ok(mut writer) = output.lock()
        {
            let _ = writeln!(writer, "{line}");
            return;
        }

        tracing::info!("{line}");
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("progress", &self.progress.is_some())
            .field("nodes", &self.nodes)
            .field("num_workers", &self.num_workers)
            .field("log_output", &self.log_output.is_some())
            .finish_non_exhaustive()
    }
}
