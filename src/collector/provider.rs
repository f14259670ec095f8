//! Assembly of the full collector list from a cluster/node provider.

use std::sync::Arc;

use tracing::debug;

use super::{CLUSTER, Collector, with_node, with_source};
use crate::context::Context;
use crate::error::Result;
use crate::options::Options;

/// Source of collector definitions.
///
/// Implementations talk to the cluster APIs; the bundle crate only composes
/// what they return.
#[async_trait::async_trait]
pub trait CollectorProvider: Send + Sync {
    /// Collectors for cluster-wide state.
    async fn cluster_collectors(
        &self,
        ctx: &Context,
        options: &Arc<Options>,
    ) -> Result<Vec<Collector>>;

    /// Collectors for a single node.
    ///
    /// `ctx` is already addressed to `node`. Paths are relative to the node folder.
    async fn node_collectors(&self, ctx: &Context, node: &str) -> Result<Vec<Collector>>;
}

/// Build every collector for `options`.
///
/// Cluster collectors are grouped under [`CLUSTER`]; each configured node
/// contributes its collectors scoped with [`with_node`]. Any provider error
/// aborts assembly.
pub async fn collectors_for_options(
    ctx: &Context,
    options: &Arc<Options>,
    provider: &dyn CollectorProvider,
) -> Result<Vec<Collector>> {
    let mut collectors = with_source(provider.cluster_collectors(ctx, options).await?, CLUSTER);

    for node in options.nodes() {
        let node_ctx = ctx.with_node(node.as_str());
        let node_collectors = provider.node_collectors(&node_ctx, node).await?;

        debug!(
            node = %node,
            count = node_collectors.len(),
            "assembled node collectors"
        );

        collectors.extend(with_node(node_collectors, node));
    }

    Ok(collectors)
}
