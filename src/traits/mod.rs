//! # Collaborator Traits
//!
//! The seams between the recursive engine and the outside world.
//!
//! | Trait | Implemented by | Called |
//! |-------|----------------|--------|
//! | [`PathOperations`] | transport client for one path | once per batch |
//! | [`ProgressObserver`] | caller (closure, channel, custom type) | once per batch, after aggregation |
//!
//! ## Thread Safety
//!
//! [`PathOperations`] requires `Send + Sync` and takes `&self`, so one client
//! can drive concurrent operations on different subtrees. [`ProgressObserver`]
//! requires only `Send`; it is borrowed mutably by a single operation.
//!
//! ## Object Safety
//!
//! Both traits are object-safe (via `async-trait`) and can be used as trait
//! objects:
//!
//! ```rust
//! use datalake_acl::{PathOperations, ProgressObserver};
//!
//! fn accepts(_client: &dyn PathOperations, _observer: Option<&mut dyn ProgressObserver>) {}
//! ```

mod path_operations;
mod progress;

pub use path_operations::PathOperations;
pub use progress::ProgressObserver;
