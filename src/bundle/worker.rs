//! Bundle worker loop.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::Handoff;
use crate::collector::Collector;
use crate::context::Context;
use crate::error::Error;
use crate::options::Options;
use crate::progress::{Progress, Totals};

/// State owned by a single worker for the duration of a run.
pub(super) struct Worker {
    pub(super) index: usize,
    pub(super) ctx: Context,
    pub(super) options: Arc<Options>,
    pub(super) totals: Arc<Totals>,
    pub(super) ready_tx: mpsc::Sender<Handoff>,
}

/// Why [`Worker::deliver`] stopped.
enum Delivery {
    Sent,
    Abandoned,
}

impl Worker {
    /// Pull collectors until the ready queue closes or progress delivery is
    /// abandoned.
    ///
    /// An idle worker waits on its slot alone. The submitter watches the
    /// context and closes every pending slot when it ends.
    pub(super) async fn run(self) {
        loop {
            let (slot_tx, slot_rx) = oneshot::channel();

            if self.ready_tx.send(slot_tx).await.is_err() {
                return;
            }

            let Ok(collector) = slot_rx.await else {
                debug!(worker = self.index, "submission finished");
                return;
            };

            let result = collector.run(self.ctx.clone(), &self.options).await;

            match &result {
                Ok(()) => debug!(
                    worker = self.index,
                    source = collector.source(),
                    path = collector.destination_path(),
                    "collected"
                ),
                Err(e) => debug!(
                    worker = self.index,
                    source = collector.source(),
                    path = collector.destination_path(),
                    error = %e,
                    "collector failed"
                ),
            }

            if let Delivery::Abandoned = self.deliver(&collector, result.err()).await {
                return;
            }
        }
    }

    /// Report a collector outcome on the progress channel, if one is configured.
    async fn deliver(&self, collector: &Collector, error: Option<Error>) -> Delivery {
        let Some(progress) = self.options.progress() else {
            return Delivery::Sent;
        };

        let event = Progress::for_collector(collector, &self.totals, error);

        tokio::select! {
            biased;
            sent = progress.send(event) => {
                if sent.is_err() {
                    debug!(worker = self.index, "progress receiver dropped");
                }
                Delivery::Sent
            }
            _ = self.ctx.done() => {
                debug!(worker = self.index, "progress delivery abandoned");
                Delivery::Abandoned
            }
        }
    }
}
