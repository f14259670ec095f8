//! Collectors: named units of diagnostic data collection.
//!
//! A [`Collector`] pairs an async collect body with the archive path its
//! output lands at and a source label used to group progress. Collections are
//! shaped before a run with the consuming helpers [`with_folder`],
//! [`with_node`] and [`with_source`]; once handed to the runner a collector is
//! never modified.

mod provider;


pub use provider::{CollectorProvider, collectors_for_options};

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::BoxFuture;

use crate::context::Context;
use crate::error::Result;
use crate::options::Options;

/// Source label of cluster-wide collectors.
pub const CLUSTER: &str = "cluster";

/// Future returned by a collect body.
///
/// `Ok(None)` means there is nothing to write.
pub type CollectFuture = BoxFuture<'static, Result<Option<Vec<u8>>>>;

/// Type-erased collect body.
pub type CollectFn = Arc<dyn Fn(Context, Arc<Options>) -> CollectFuture + Send + Sync>;

/// A single artifact collection with its destination path in the archive.
#[derive(Clone)]
pub struct Collector {
    collect: CollectFn,
    source: String,
    destination_path: String,
}

impl Collector {
    /// Create a cluster-sourced collector writing to `path`.
    pub fn new<F, Fut>(path: impl Into<String>, collect: F) -> Self
    where
        F: Fn(Context, Arc<Options>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Vec<u8>>>> + Send + 'static,
    {
        Self {
            collect: Arc::new(move |ctx: Context, options: Arc<Options>| {
                collect(ctx, options).boxed()
            }),
            source: CLUSTER.to_string(),
            destination_path: path.into(),
        }
    }

    /// Run the collect body and write its payload to the archive.
    ///
    /// A body error is returned as is and nothing is written. An empty
    /// (`None`) payload is a successful no-op.
    pub async fn run(&self, ctx: Context, options: &Arc<Options>) -> Result<()> {
        let data = (self.collect)(ctx, Arc::clone(options)).await?;

        let Some(data) = data else {
            return Ok(());
        };

        options
            .archive()
            .write(&self.destination_path, &data)
            .await
    }

    /// Source label used to group progress (node name, [`CLUSTER`], ...).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Path inside the archive.
    pub fn destination_path(&self) -> &str {
        &self.destination_path
    }

    /// Prefix the destination path with `folder`.
    pub fn in_folder(mut self, folder: &str) -> Self {
        self.destination_path = join_path(folder, &self.destination_path);
        self
    }

    /// Address the collector to `node`.
    ///
    /// The body receives a context carrying the node, the source becomes the
    /// node and the destination path is prefixed with it.
    pub fn for_node(self, node: &str) -> Self {
        let inner = self.collect;
        let target = node.to_string();

        Self {
            collect: Arc::new(move |ctx: Context, options: Arc<Options>| {
                inner(ctx.with_node(target.as_str()), options)
            }),
            source: node.to_string(),
            destination_path: join_path(node, &self.destination_path),
        }
    }

    /// Replace the source label, leaving the path untouched.
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }
}

impl fmt::Display for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collect {}", base_name(&self.destination_path))
    }
}

impl fmt::Debug for Collector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Collector")
            .field("source", &self.source)
            .field("destination_path", &self.destination_path)
            .finish_non_exhaustive()
    }
}

/// Prefix every collector's destination path with `folder`.
pub fn with_folder(collectors: Vec<Collector>, folder: &str) -> Vec<Collector> {
    collectors
        .into_iter()
        .map(|collector| collector.in_folder(folder))
        .collect()
}

/// Address every collector to `node` (see [`Collector::for_node`]).
pub fn with_node(collectors: Vec<Collector>, node: &str) -> Vec<Collector> {
    collectors
        .into_iter()
        .map(|collector| collector.for_node(node))
        .collect()
}

/// Relabel every collector with `source`.
pub fn with_source(collectors: Vec<Collector>, source: &str) -> Vec<Collector> {
    collectors
        .into_iter()
        .map(|collector| collector.with_source(source))
        .collect()
}

/// Join archive path segments with `/` and clean the result.
///
/// Empty and `.` segments are dropped and `..` removes the segment before it,
/// so `resources` + `./x` gives `resources/x`. A leading `/` on `prefix` is
/// kept.
fn join_path(prefix: &str, path: &str) -> String {
    if prefix.is_empty() && path.is_empty() {
        return String::new();
    }

    let rooted = prefix.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();

    for segment in prefix.split('/').chain(path.split('/')) {
        match segment {
            "" | "." => {}
            ".." => match segments.last() {
                Some(&last) if last != ".." => {
                    segments.pop();
                }
                _ if rooted => {}
                _ => segments.push(".."),
            },
            segment => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    match (rooted, joined.is_empty()) {
        (true, _) => format!("/{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}

/// Last `/`-separated segment of `path`.
fn base_name(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return if path.is_empty() { "." } else { "/" };
    }

    trimmed.rsplit('/').next().unwrap_or(trimmed)
}
