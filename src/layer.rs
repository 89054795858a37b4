//! # Layer Trait
//!
//! Tower-style middleware composition for [`PathOperations`] clients.
//!
//! ## Overview
//!
//! The [`Layer`] trait wraps a client to add behavior at the collaborator
//! boundary, once per batch call, without the engine knowing about it.
//!
//! ```text
//! Client ──▶ Layer::layer() ──▶ Wrapped Client
//! ```
//!
//! ## Provided Layers
//!
//! | Layer | Middleware | Effect |
//! |-------|------------|--------|
//! | [`TimeoutLayer`] | [`TimeoutMiddleware`] | fails a batch call with [`AclError::Timeout`] after a deadline |
//! | [`TracingLayer`] | [`TracingMiddleware`] | logs every batch call and its outcome |
//!
//! ## Fluent Composition
//!
//! ```rust
//! use datalake_acl::{LayerExt, PathOperations, TimeoutLayer, TracingLayer};
//! use std::time::Duration;
//!
//! fn instrumented<C: PathOperations>(client: C) -> impl PathOperations {
//!     client
//!         .layer(TimeoutLayer::new(Duration::from_secs(30)))
//!         .layer(TracingLayer::new("container/raw"))
//! }
//! ```

use std::time::Duration;

use async_trait::async_trait;

use crate::{AclChangeRequest, AclError, BatchResult, PathOperations};

/// A layer that wraps a client to add functionality.
///
/// Inspired by Tower's `Layer` trait, this enables composable middleware.
///
/// # Design Notes
///
/// - `layer(self, client)` consumes both the layer and client
/// - The resulting `Client` type should implement [`PathOperations`]
///
/// # Example
///
/// ```rust
/// use datalake_acl::Layer;
///
/// struct RetryMiddleware<C> {
///     inner: C,
///     attempts: u32,
/// }
///
/// struct RetryLayer {
///     attempts: u32,
/// }
///
/// impl<C> Layer<C> for RetryLayer {
///     type Client = RetryMiddleware<C>;
///
///     fn layer(self, client: C) -> Self::Client {
///         RetryMiddleware {
///             inner: client,
///             attempts: self.attempts,
///         }
///     }
/// }
/// ```
pub trait Layer<C> {
    /// The resulting client type after applying this layer.
    type Client;

    /// Wrap the given client with this layer's functionality.
    fn layer(self, client: C) -> Self::Client;
}

/// Extension trait for fluent layer composition.
///
/// Provides `.layer()` on any [`PathOperations`] client.
pub trait LayerExt: PathOperations + Sized {
    /// Apply a layer to this client.
    fn layer<L: Layer<Self>>(self, layer: L) -> L::Client {
        layer.layer(self)
    }
}

// Blanket implementation - any PathOperations client gets LayerExt for free
impl<C: PathOperations> LayerExt for C {}

// ============================================================================
// Timeout
// ============================================================================

/// Applies a deadline to every batch call.
///
/// The deadline is per batch; a recursive operation as a whole has none.
#[derive(Debug, Clone, Copy)]
pub struct TimeoutLayer {
    timeout: Duration,
}

impl TimeoutLayer {
    /// Fail any single batch call that takes longer than `timeout`.
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl<C> Layer<C> for TimeoutLayer {
    type Client = TimeoutMiddleware<C>;

    fn layer(self, client: C) -> Self::Client {
        TimeoutMiddleware {
            inner: client,
            timeout: self.timeout,
        }
    }
}

/// Client produced by [`TimeoutLayer`].
#[derive(Debug, Clone)]
pub struct TimeoutMiddleware<C> {
    inner: C,
    timeout: Duration,
}

impl<C> TimeoutMiddleware<C> {
    /// The wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: PathOperations> PathOperations for TimeoutMiddleware<C> {
    async fn apply_acl_batch(&self, request: &AclChangeRequest) -> Result<BatchResult, AclError> {
        match tokio::time::timeout(self.timeout, self.inner.apply_acl_batch(request)).await {
            Ok(outcome) => outcome,
            Err(_) => Err(AclError::Timeout {
                operation: "apply_acl_batch",
                timeout: self.timeout,
            }),
        }
    }
}

// ============================================================================
// Tracing
// ============================================================================

/// Logs every batch call at the collaborator boundary.
#[derive(Debug, Clone)]
pub struct TracingLayer {
    target: String,
}

impl TracingLayer {
    /// Log calls against `target` (typically the path being changed).
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl<C> Layer<C> for TracingLayer {
    type Client = TracingMiddleware<C>;

    fn layer(self, client: C) -> Self::Client {
        TracingMiddleware {
            inner: client,
            target: self.target,
        }
    }
}

/// Client produced by [`TracingLayer`].
#[derive(Debug, Clone)]
pub struct TracingMiddleware<C> {
    inner: C,
    target: String,
}

impl<C> TracingMiddleware<C> {
    /// The wrapped client.
    pub fn inner(&self) -> &C {
        &self.inner
    }
}

#[async_trait]
impl<C: PathOperations> PathOperations for TracingMiddleware<C> {
    async fn apply_acl_batch(&self, request: &AclChangeRequest) -> Result<BatchResult, AclError> {
        tracing::debug!(
            path = %self.target,
            mode = %request.mode(),
            resumed = request.continuation().is_some(),
            batch_size = ?request.batch_size(),
            "sending acl batch"
        );
        let outcome = self.inner.apply_acl_batch(request).await;
        match &outcome {
            Ok(batch) => tracing::debug!(
                path = %self.target,
                processed = batch.counters.total_processed(),
                failures = batch.counters.failure_count,
                more = batch.continuation.is_some(),
                "acl batch returned"
            ),
            Err(err) => tracing::warn!(path = %self.target, error = %err, "acl batch failed"),
        }
        outcome
    }
}
