//! Request and option types for recursive access-control changes.

use std::time::Duration;

use crate::{AclChangeMode, ContinuationToken};

/// Options accepted by the recursive entry operations.
///
/// Built with chained setters, starting from [`Default`]:
///
/// ```rust
/// use datalake_acl::{AclChangeOptions, ContinuationToken};
///
/// let options = AclChangeOptions::default()
///     .batch_size(500)
///     .max_batch(4)
///     .continuation(ContinuationToken::new("resume-here"));
/// assert_eq!(options.max_batch_count(), Some(4));
/// ```
///
/// # Batch size
///
/// The server accepts between [`MIN_BATCH_SIZE`](Self::MIN_BATCH_SIZE) and
/// [`MAX_BATCH_SIZE`](Self::MAX_BATCH_SIZE) entries per batch and uses
/// [`DEFAULT_BATCH_SIZE`](Self::DEFAULT_BATCH_SIZE) when none is sent. The
/// value is forwarded unchanged; the server rejects out-of-range sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AclChangeOptions {
    continuation: Option<ContinuationToken>,
    batch_size: Option<u32>,
    max_batch: Option<u32>,
    timeout: Option<Duration>,
}

impl AclChangeOptions {
    /// Smallest batch size the server accepts.
    pub const MIN_BATCH_SIZE: u32 = 1;
    /// Largest batch size the server accepts.
    pub const MAX_BATCH_SIZE: u32 = 2000;
    /// Batch size the server uses when none is given.
    pub const DEFAULT_BATCH_SIZE: u32 = 2000;

    /// Resume a previously stopped operation from `token`.
    pub fn continuation(mut self, token: Option<ContinuationToken>) -> Self {
        self.continuation = token;
        self
    }

    /// Number of entries the server processes per batch.
    pub fn batch_size(mut self, size: u32) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Stop after this many batches even if work remains.
    ///
    /// The returned result then carries a continuation token to resume from.
    pub fn max_batch(mut self, count: u32) -> Self {
        self.max_batch = Some(count);
        self
    }

    /// Server-side timeout for each batch call.
    ///
    /// The service takes whole seconds; partial seconds are rounded up.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The configured batch cap, if any.
    pub fn max_batch_count(&self) -> Option<u32> {
        self.max_batch
    }

    /// Split into the per-call request and the batch cap.
    pub(crate) fn into_request(self, mode: AclChangeMode, acl: &str) -> (AclChangeRequest, Option<u32>) {
        let request = AclChangeRequest {
            mode,
            acl: acl.to_string(),
            continuation: self.continuation,
            batch_size: self.batch_size,
            timeout: self.timeout,
        };
        (request, self.max_batch)
    }
}

/// A single call to the recursive ACL batch primitive.
///
/// The engine updates only [`continuation`](Self::continuation) between
/// batches; everything else is fixed for the whole operation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AclChangeRequest {
    mode: AclChangeMode,
    acl: String,
    continuation: Option<ContinuationToken>,
    batch_size: Option<u32>,
    timeout: Option<Duration>,
}

impl AclChangeRequest {
    /// A request starting at the top of the subtree with server defaults.
    pub fn new(mode: AclChangeMode, acl: impl Into<String>) -> Self {
        Self {
            mode,
            acl: acl.into(),
            continuation: None,
            batch_size: None,
            timeout: None,
        }
    }

    /// How the ACL is applied.
    #[inline]
    pub fn mode(&self) -> AclChangeMode {
        self.mode
    }

    /// Comma-separated ACL entries.
    #[inline]
    pub fn acl(&self) -> &str {
        &self.acl
    }

    /// Where this batch starts; `None` for the top of the subtree.
    #[inline]
    pub fn continuation(&self) -> Option<&ContinuationToken> {
        self.continuation.as_ref()
    }

    /// Requested entries per batch; `None` for the server default.
    #[inline]
    pub fn batch_size(&self) -> Option<u32> {
        self.batch_size
    }

    /// Server-side timeout for the call.
    #[inline]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Start from `token` instead of the top of the subtree.
    pub fn with_continuation(mut self, token: Option<ContinuationToken>) -> Self {
        self.continuation = token;
        self
    }

    /// Builder form for the batch size.
    pub fn with_batch_size(mut self, size: u32) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Builder form for the server-side timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn set_continuation(&mut self, token: Option<ContinuationToken>) {
        self.continuation = token;
    }
}
