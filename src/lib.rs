//! # datalake-acl
//!
//! Recursive access-control changes for **hierarchical-namespace data lake
//! storage**.
//!
//! The service changes ACLs below a directory in bounded batches and hands back
//! a continuation token after each one. This crate drives that protocol:
//! it issues batch after batch, keeps running totals, reports progress after
//! every batch, honors an optional batch cap, and returns a final summary
//! with a token to resume from when the work is not finished.
//!
//! It contains **no transport**. Anything that can send one batch request
//! implements [`PathOperations`] and gets the recursive operations for free.
//!
//! ---
//!
//! ## Quick Start
//!
//! ```rust
//! use datalake_acl::{
//!     AccessControlChangeProgress, AclChangeExt, AclChangeOptions, AclError, PathOperations,
//! };
//!
//! async fn lock_down<C: PathOperations>(dir: &C) -> Result<(), AclError> {
//!     let mut report = |p: &AccessControlChangeProgress| {
//!         println!(
//!             "{} dirs, {} files, {} failed so far",
//!             p.aggregate_counters.directories_successful,
//!             p.aggregate_counters.files_successful,
//!             p.aggregate_counters.failure_count,
//!         );
//!     };
//!
//!     let result = dir
//!         .set_access_control_recursive(
//!             "user::rwx,group::r-x,other::---",
//!             AclChangeOptions::default().batch_size(1000).max_batch(10),
//!             Some(&mut report),
//!         )
//!         .await?;
//!
//!     if let Some(token) = result.continuation {
//!         // Persist `token` and pass it back via AclChangeOptions::continuation
//!         // to pick up where this run stopped.
//!         println!("stopped early, resume from {token}");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ---
//!
//! ## Core Types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`AclChangeExt`] | The three entry operations: set, update (modify), remove |
//! | [`RecursiveAclChangeEngine`] | The batch loop behind every entry operation |
//! | [`PathOperations`] | The batch primitive a transport implements |
//! | [`ProgressObserver`] | Per-batch progress callback (closure, channel or custom type) |
//! | [`AclChangeOptions`] | Continuation, batch size, batch cap, server timeout |
//! | [`AccessControlChangeResult`] | Final totals and resumable continuation |
//! | [`AccessControlChangeProgress`] | Per-batch and cumulative counters plus failed entries |
//! | [`AclError`] | Validation and remote errors |
//! | [`AccessControlList`] | Typed ACL text: parse, build, render |
//!
//! ---
//!
//! ## Partial Failure
//!
//! Entries whose ACL cannot be changed are **not** errors. They appear in
//! [`AccessControlChangeProgress::batch_failures`] and in the final
//! [`AccessControlChangeCounters::failure_count`]. When any entry failed, the
//! result's continuation is the most recent token the server issued, so a
//! retry covers the failed entries.
//!
//! An [`AclError`] aborts the operation without a result. Callers that need
//! to resume after one should record the continuation from their progress
//! observer.
//!
//! ---
//!
//! ## Concurrency
//!
//! One operation is strictly sequential: batch N+1 is not sent until batch N
//! has been aggregated and its progress report handled. Separate operations
//! share nothing and may run concurrently over the same client. Dropping an
//! operation's future cancels it.
//!
//! ---
//!
//! ## Middleware
//!
//! [`Layer`]s wrap a client per batch call: [`TimeoutLayer`] bounds each call,
//! [`TracingLayer`] logs each call.
//!
//! ---
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `serde` | Serialization for all data types; JSON response decoding in [`wire`] |

// Private modules
mod acl;
mod engine;
mod error;
mod ext;
mod layer;
mod request;
mod traits;
mod types;

// Public modules
pub mod wire;

// Public re-exports - error types
pub use error::AclError;

// Public re-exports - core types
pub use types::{
    AccessControlChangeCounters, AccessControlChangeFailure, AccessControlChangeProgress,
    AccessControlChangeResult, AclChangeMode, BatchResult, ContinuationToken,
};

// Public re-exports - requests and options
pub use request::{AclChangeOptions, AclChangeRequest};

// Public re-exports - ACL text model
pub use acl::{AccessControlEntry, AccessControlList, AclPermissions, AclScope, AclTag};

// Public re-exports - collaborator traits
pub use traits::{PathOperations, ProgressObserver};

// Public re-exports - engine and entry operations
pub use engine::RecursiveAclChangeEngine;
pub use ext::AclChangeExt;

// Public re-exports - middleware
pub use layer::{Layer, LayerExt, TimeoutLayer, TimeoutMiddleware, TracingLayer, TracingMiddleware};
