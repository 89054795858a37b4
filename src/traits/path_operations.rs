//! The recursive ACL batch primitive.

use std::sync::Arc;

use async_trait::async_trait;

use crate::{AclChangeRequest, AclError, BatchResult};

/// Server-side "apply ACL to one batch of a subtree" operation.
///
/// Implemented by the transport client for a path in a hierarchical-namespace
/// file system. Each call walks a bounded number of entries below the path,
/// starting at [`AclChangeRequest::continuation`], and reports what it did.
///
/// # Contract
///
/// - A returned [`BatchResult::continuation`] of `None` means the subtree is
///   exhausted (or the server chose to stop). Implementations normalize an
///   empty token to `None` with
///   [`ContinuationToken::from_server`](crate::ContinuationToken::from_server).
/// - Per-entry failures are data in the [`BatchResult`], never an `Err`.
/// - Any non-success response is an `Err`; retrying transient failures is the
///   implementation's concern, not the caller's.
///
/// # Thread Safety
///
/// All implementations must be `Send + Sync`. Methods use `&self` to allow
/// concurrent recursive operations on different subtrees.
///
/// # Object Safety
///
/// This trait is object-safe and can be used as `dyn PathOperations`.
///
/// # Example
///
/// ```rust
/// use async_trait::async_trait;
/// use datalake_acl::{AclChangeRequest, AclError, BatchResult, PathOperations};
///
/// struct EmptyDirectory;
///
/// #[async_trait]
/// impl PathOperations for EmptyDirectory {
///     async fn apply_acl_batch(&self, _: &AclChangeRequest) -> Result<BatchResult, AclError> {
///         Ok(BatchResult::default())
///     }
/// }
/// ```
#[async_trait]
pub trait PathOperations: Send + Sync {
    /// Apply the request's ACL change to the next batch of the subtree.
    ///
    /// # Errors
    ///
    /// - [`AclError::Remote`] if the service rejected the request
    /// - [`AclError::Timeout`] if the call exceeded its deadline
    /// - [`AclError::Deserialization`] if the response could not be decoded
    async fn apply_acl_batch(&self, request: &AclChangeRequest) -> Result<BatchResult, AclError>;
}

#[async_trait]
impl<C: PathOperations + ?Sized> PathOperations for &C {
    async fn apply_acl_batch(&self, request: &AclChangeRequest) -> Result<BatchResult, AclError> {
        (**self).apply_acl_batch(request).await
    }
}

#[async_trait]
impl<C: PathOperations + ?Sized> PathOperations for Arc<C> {
    async fn apply_acl_batch(&self, request: &AclChangeRequest) -> Result<BatchResult, AclError> {
        (**self).apply_acl_batch(request).await
    }
}

#[async_trait]
impl<C: PathOperations + ?Sized> PathOperations for Box<C> {
    async fn apply_acl_batch(&self, request: &AclChangeRequest) -> Result<BatchResult, AclError> {
        (**self).apply_acl_batch(request).await
    }
}
