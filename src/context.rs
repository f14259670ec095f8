//! Run context: cancellation, optional deadline, and collector targeting.

use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::Error;

/// Cancellable context shared by every worker and collector of a bundle run.
///
/// A context is done once its token is cancelled or its deadline (if any)
/// has passed. Node targeting is carried explicitly so collector bodies can
/// read it with [`Context::node`] instead of relying on ambient state.
#[derive(Clone, Debug, Default)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
    node: Option<String>,
}

impl Context {
    /// Create a live context with no deadline.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context driven by an existing cancellation token.
    pub fn from_token(token: CancellationToken) -> Self {
        Self {
            token,
            deadline: None,
            node: None,
        }
    }

    /// Derive a context that expires after `timeout`.
    ///
    /// An earlier existing deadline is kept.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that expires at `deadline`.
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        };

        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
            node: self.node.clone(),
        }
    }

    /// Derive a child context; cancelling the child leaves the parent live.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
            node: self.node.clone(),
        }
    }

    /// Derive a context addressed to a specific node.
    pub fn with_node(&self, node: impl Into<String>) -> Self {
        Self {
            token: self.token.clone(),
            deadline: self.deadline,
            node: Some(node.into()),
        }
    }

    /// Node this context is addressed to, if any.
    pub fn node(&self) -> Option<&str> {
        self.node.as_deref()
    }

    /// Deadline of this context, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Cancel this context and every context derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Returns true once the context is cancelled or past its deadline.
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Wait until the context is cancelled or its deadline expires.
    pub async fn done(&self) {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = self.token.cancelled() => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => self.token.cancelled().await,
        }
    }

    /// Reason the context is done, or `None` while it is still live.
    pub fn err(&self) -> Option<Error> {
        if self.token.is_cancelled() {
            return Some(Error::Cancelled);
        }

        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(Error::DeadlineExceeded),
            _ => None,
        }
    }
}
