//! Progress reporting for recursive access-control changes.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::AccessControlChangeProgress;

/// Observer invoked once per completed batch.
///
/// The engine awaits each call before issuing the next batch, so reports
/// arrive strictly in batch order and never overlap. An observer may suspend
/// (e.g. to persist the continuation token) without racing the next batch.
///
/// Closures taking `&AccessControlChangeProgress` and
/// [`mpsc::Sender<AccessControlChangeProgress>`] implement this trait.
///
/// # Example
///
/// ```rust
/// use datalake_acl::{AccessControlChangeFailure, AccessControlChangeProgress, ProgressObserver};
///
/// let mut failed: Vec<AccessControlChangeFailure> = Vec::new();
/// let mut collect = |progress: &AccessControlChangeProgress| {
///     failed.extend(progress.batch_failures.iter().cloned());
/// };
/// let _observer: &mut dyn ProgressObserver = &mut collect;
/// ```
#[async_trait]
pub trait ProgressObserver: Send {
    /// Handles the report for the batch that just completed.
    async fn on_progress(&mut self, progress: &AccessControlChangeProgress);
}

#[async_trait]
impl<F> ProgressObserver for F
where
    F: FnMut(&AccessControlChangeProgress) + Send,
{
    async fn on_progress(&mut self, progress: &AccessControlChangeProgress) {
        self(progress);
    }
}

/// Forwards each report over a bounded channel, waiting for capacity.
///
/// A dropped receiver does not stop the operation; later reports are discarded.
#[async_trait]
impl ProgressObserver for mpsc::Sender<AccessControlChangeProgress> {
    async fn on_progress(&mut self, progress: &AccessControlChangeProgress) {
        if self.send(progress.clone()).await.is_err() {
            tracing::warn!("progress receiver dropped, discarding report");
        }
    }
}
