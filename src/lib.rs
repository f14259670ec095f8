//! # support-bundle
//!
//! Concurrent collection of cluster diagnostics into a single archive.
//!
//! ## Design Philosophy
//!
//! support-bundle is designed to be:
//! - **Best-effort** - A failing collector never stops the others; failures are reported, not fatal
//! - **Bounded** - A fixed pool of workers with rendezvous handoff, no unbounded queueing
//! - **Cancellable** - One [`Context`] governs the whole run, with optional deadline
//! - **Library-first** - Collector bodies and archive formats are pluggable
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use support_bundle::{Collector, Context, Options, ZipArchive, create_support_bundle, with_node};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let archive = ZipArchive::create("support.zip")?;
//!     let (progress_tx, mut progress_rx) = tokio::sync::mpsc::channel(64);
//!
//!     let options = Arc::new(
//!         Options::new(Arc::new(archive))
//!             .with_num_workers(4)
//!             .with_progress(progress_tx),
//!     );
//!
//!     let collectors = with_node(
//!         vec![Collector::new("hostname", |ctx: Context, _| async move {
//!             Ok(ctx.node().map(|node| node.as_bytes().to_vec()))
//!         })],
//!         "10.5.0.2",
//!     );
//!
//!     tokio::spawn(async move {
//!         while let Some(progress) = progress_rx.recv().await {
//!             println!("{}: {} ({:?})", progress.source, progress.state, progress.error);
//!         }
//!     });
//!
//!     let ctx = Context::new().with_timeout(Duration::from_secs(60));
//!     create_support_bundle(&ctx, options, collectors).await?;
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Output archive abstraction and implementations
pub mod archive;
/// Bundle runner (bounded worker pool)
pub mod bundle;
/// Collector definitions and composition
pub mod collector;
/// Serializable configuration
pub mod config;
/// Cancellation and deadline context
pub mod context;
/// Error types
pub mod error;
/// Runtime options
pub mod options;
/// Progress events and totals
pub mod progress;

// Re-export commonly used types
pub use archive::{Archive, MemoryArchive, ZipArchive};
pub use bundle::create_support_bundle;
pub use collector::{
    CLUSTER, CollectFn, CollectFuture, Collector, CollectorProvider, collectors_for_options,
    with_folder, with_node, with_source,
};
pub use config::BundleConfig;
pub use context::Context;
pub use error::{Error, Result};
pub use options::Options;
pub use progress::{Progress, ProgressTracker, SourceProgress, Totals};
