//! # Recursive ACL Change Engine
//!
//! Drives the batch primitive of a [`PathOperations`] client until the server
//! reports the subtree exhausted or the caller's batch cap is reached.
//!
//! ## Loop
//!
//! ```text
//! ┌──▶ apply_acl_batch(request) ──▶ accumulate ──▶ observer.on_progress ─┐
//! │                                                                      │
//! └──── request.continuation = token ◀── token present && cap not hit ◀──┘
//! ```
//!
//! Each step is awaited before the next begins; there is never more than one
//! outstanding call per operation.
//!
//! ## Final continuation
//!
//! | Totals | Returned continuation |
//! |--------|-----------------------|
//! | `failure_count == 0` | the token from the last batch (`None` once the subtree is exhausted) |
//! | `failure_count > 0` | the most recent non-empty token from any batch |
//!
//! The second rule assumes the server stops advancing when an entry fails,
//! so the last token it handed out still covers the failed entries. A server
//! that reports failures *and* moves past them with a fresh token would have
//! that fresher token replaced by an older one; retries would then reapply
//! the ACL to already-processed entries.
//!
//! ## Cancellation
//!
//! Dropping the future returned by [`RecursiveAclChangeEngine::run`] cancels
//! the in-flight batch call or observer callback. No further batches are
//! issued and totals from completed batches are discarded.

use tracing::{debug, info, instrument, warn};

use crate::{
    AccessControlChangeCounters, AccessControlChangeFailure, AccessControlChangeProgress,
    AccessControlChangeResult, AclChangeRequest, AclError, BatchResult, ContinuationToken,
    PathOperations, ProgressObserver,
};

/// Applies one logical ACL change across a subtree, batch by batch.
///
/// Holds only a borrowed client and is `Copy`; [`run`](Self::run) takes the
/// engine by value and keeps its own running totals, so one engine can drive
/// independent operations concurrently.
///
/// Most callers use the entry operations on
/// [`AclChangeExt`](crate::AclChangeExt) instead of the engine directly.
///
/// # Example
///
/// ```rust
/// use datalake_acl::{
///     AclChangeMode, AclChangeRequest, AclError, PathOperations, RecursiveAclChangeEngine,
/// };
///
/// async fn reset_acl(client: &dyn PathOperations) -> Result<u64, AclError> {
///     let request = AclChangeRequest::new(AclChangeMode::Set, "user::rwx,group::r-x,other::---");
///     let result = RecursiveAclChangeEngine::new(client).run(request, None, None).await?;
///     Ok(result.counters.total_processed())
/// }
/// ```
#[derive(Debug)]
pub struct RecursiveAclChangeEngine<'a, C: ?Sized> {
    client: &'a C,
}

impl<C: ?Sized> Clone for RecursiveAclChangeEngine<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C: ?Sized> Copy for RecursiveAclChangeEngine<'_, C> {}

impl<'a, C: PathOperations + ?Sized> RecursiveAclChangeEngine<'a, C> {
    /// Create an engine over `client`.
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Run the operation described by `request` to completion.
    ///
    /// `max_batch` caps the number of batch calls; `None` is unbounded. A cap
    /// of zero never matches the batch count and therefore also runs
    /// unbounded.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`PathOperations::apply_acl_batch`]
    /// unchanged. No partial result is produced; the caller resumes from the
    /// last continuation reported to its observer.
    #[instrument(
        name = "acl_change_recursive",
        skip_all,
        fields(mode = %request.mode(), max_batch = ?max_batch)
    )]
    pub async fn run(
        self,
        mut request: AclChangeRequest,
        mut observer: Option<&mut dyn ProgressObserver>,
        max_batch: Option<u32>,
    ) -> Result<AccessControlChangeResult, AclError> {
        let mut state = RunState::default();

        loop {
            let BatchResult {
                counters,
                failures,
                continuation,
            } = self.client.apply_acl_batch(&request).await?;

            state.record(counters, continuation.as_ref());
            debug!(
                batch = state.batch_count,
                directories = counters.directories_successful,
                files = counters.files_successful,
                failures = counters.failure_count,
                more = continuation.is_some(),
                "acl batch completed"
            );

            if let Some(observer) = observer.as_deref_mut() {
                observer.on_progress(&state.progress(counters, failures)).await;
            }

            let cap_reached = max_batch == Some(state.batch_count);
            if continuation.is_none() || cap_reached {
                if cap_reached && continuation.is_some() {
                    warn!(batches = state.batch_count, "batch cap reached with entries remaining");
                }
                let batches = state.batch_count;
                let result = state.finish(continuation);
                info!(
                    batches,
                    directories = result.counters.directories_successful,
                    files = result.counters.files_successful,
                    failures = result.counters.failure_count,
                    resumable = result.continuation.is_some(),
                    "recursive acl change finished"
                );
                return Ok(result);
            }

            request.set_continuation(continuation);
        }
    }
}

/// Running totals for one call to [`RecursiveAclChangeEngine::run`].
#[derive(Debug, Default)]
struct RunState {
    totals: AccessControlChangeCounters,
    batch_count: u32,
    last_continuation: Option<ContinuationToken>,
}

impl RunState {
    fn record(&mut self, counters: AccessControlChangeCounters, continuation: Option<&ContinuationToken>) {
        self.totals += counters;
        self.batch_count += 1;
        if let Some(token) = continuation {
            self.last_continuation = Some(token.clone());
        }
    }

    fn progress(
        &self,
        batch_counters: AccessControlChangeCounters,
        batch_failures: Vec<AccessControlChangeFailure>,
    ) -> AccessControlChangeProgress {
        AccessControlChangeProgress {
            batch_counters,
            aggregate_counters: self.totals,
            batch_failures,
            continuation: self.last_continuation.clone(),
        }
    }

    fn finish(self, current: Option<ContinuationToken>) -> AccessControlChangeResult {
        let continuation = if self.totals.has_failures() {
            self.last_continuation
        } else {
            current
        };
        AccessControlChangeResult {
            counters: self.totals,
            continuation,
        }
    }
}
