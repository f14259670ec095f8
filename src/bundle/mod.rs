//! Support bundle runner -- dispatches collectors over a bounded worker pool.
//!
//! Split into focused submodules:
//! - [`worker`] - Per-worker loop: receive a collector, run it, report progress
//!
//! Handoff between the submitting side and the workers is a rendezvous: an
//! idle worker registers a one-shot slot on the ready queue and the submitter
//! fills exactly one slot per collector. Nothing is queued ahead of a free
//! worker, so submission waits for capacity instead of buffering.

mod worker;


use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::collector::Collector;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::options::Options;
use crate::progress::Totals;

use worker::Worker;

/// Slot an idle worker waits on for its next collector.
type Handoff = oneshot::Sender<Collector>;

/// Run every collector and write the results into the options' archive.
///
/// Collectors run on `options.num_workers()` concurrent workers (0 is
/// treated as 1). Individual collector failures never fail the run: they are
/// only reported through the progress channel when one is configured, and
/// dropped otherwise. The run fails when `ctx` is cancelled or expires while
/// collectors are still waiting for a worker, when a worker panics, or when
/// closing the archive fails. The archive is closed once, and only if no
/// run-level error occurred. An empty list always closes the archive, even
/// on a context that already ended.
pub async fn create_support_bundle(
    ctx: &Context,
    options: Arc<Options>,
    collectors: Vec<Collector>,
) -> Result<()> {
    let totals = Arc::new(Totals::calculate(&collectors));
    let num_workers = options.num_workers().max(1);

    info!(
        collectors = collectors.len(),
        sources = totals.len(),
        workers = num_workers,
        progress = options.progress().is_some(),
        "creating support bundle"
    );

    let (ready_tx, mut ready_rx) = mpsc::channel::<Handoff>(num_workers);

    let handles: Vec<_> = (0..num_workers)
        .map(|index| {
            tokio::spawn(
                Worker {
                    index,
                    ctx: ctx.clone(),
                    options: Arc::clone(&options),
                    totals: Arc::clone(&totals),
                    ready_tx: ready_tx.clone(),
                }
                .run(),
            )
        })
        .collect();
    drop(ready_tx);

    let submitted = submit(ctx, &mut ready_rx, collectors).await;

    // Closing the ready queue drops every pending slot, which tells idle workers to stop.
    drop(ready_rx);

    let mut first_error = submitted.err();
    for (index, joined) in join_all(handles).await.into_iter().enumerate() {
        if let Err(e) = joined {
            let e = Error::from(e);
            debug!(worker = index, error = %e, "worker stopped with error");
            first_error.get_or_insert(e);
        }
    }

    if let Some(e) = first_error {
        warn!(error = %e, "support bundle aborted");
        return Err(e);
    }

    options.archive().close().await?;

    info!("support bundle complete");
    Ok(())
}

/// Hand collectors to idle workers in order.
///
/// Stops early when the context is done while a collector is still waiting
/// for a worker (returning the context error), or when no worker is left to
/// accept work.
async fn submit(
    ctx: &Context,
    ready_rx: &mut mpsc::Receiver<Handoff>,
    collectors: Vec<Collector>,
) -> Result<()> {
    let total = collectors.len();

    for (position, collector) in collectors.into_iter().enumerate() {
        let mut pending = collector;

        loop {
            let slot = tokio::select! {
                biased;
                _ = ctx.done() => {
                    debug!(submitted = position, total, "submission interrupted");
                    return Err(ctx.err().unwrap_or(Error::Cancelled));
                }
                slot = ready_rx.recv() => slot,
            };

            let Some(slot) = slot else {
                debug!(submitted = position, total, "no workers left to accept collectors");
                return Ok(());
            };

            // A worker that stopped after registering hands the collector back.
            match slot.send(pending) {
                Ok(()) => break,
                Err(returned) => pending = returned,
            }
        }
    }

    Ok(())
}
