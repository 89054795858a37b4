//! # Extension Traits
//!
//! The caller-facing recursive entry operations.
//!
//! ## Overview
//!
//! [`AclChangeExt`] is blanket-implemented for every [`PathOperations`]
//! client, so any transport that provides the batch primitive gets the three
//! recursive operations for free.
//!
//! ## Available Methods
//!
//! | Method | Mode | ACL entry format |
//! |--------|------|------------------|
//! | [`set_access_control_recursive`](AclChangeExt::set_access_control_recursive) | [`AclChangeMode::Set`] | `[scope:]type:[id]:perms` |
//! | [`update_access_control_recursive`](AclChangeExt::update_access_control_recursive) | [`AclChangeMode::Modify`] | `[scope:]type:[id]:perms` |
//! | [`remove_access_control_recursive`](AclChangeExt::remove_access_control_recursive) | [`AclChangeMode::Remove`] | `[scope:]type:[id]` |
//!
//! All three reject an empty ACL with [`AclError::Validation`] before any
//! request is sent, then hand off to the same
//! [`RecursiveAclChangeEngine`].

use async_trait::async_trait;

use crate::{
    AccessControlChangeResult, AclChangeMode, AclChangeOptions, AclError, PathOperations,
    ProgressObserver, RecursiveAclChangeEngine,
};

/// Recursive access-control operations for any [`PathOperations`] client.
///
/// # Example
///
/// ```rust
/// use datalake_acl::{
///     AccessControlChangeProgress, AclChangeExt, AclChangeOptions, AclError, PathOperations,
/// };
///
/// async fn grant_read<C: PathOperations>(client: &C) -> Result<(), AclError> {
///     let mut on_progress = |p: &AccessControlChangeProgress| {
///         for failure in &p.batch_failures {
///             eprintln!("{}: {}", failure.name, failure.error_message);
///         }
///     };
///     let result = client
///         .update_access_control_recursive(
///             "user:analytics:r-x",
///             AclChangeOptions::default().batch_size(500),
///             Some(&mut on_progress),
///         )
///         .await?;
///     if let Some(token) = result.continuation {
///         println!("resume with {token}");
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait AclChangeExt: PathOperations {
    /// Set the ACL of the path and every path beneath it.
    ///
    /// # Errors
    ///
    /// - [`AclError::Validation`] if `acl` is empty
    /// - Any error from [`PathOperations::apply_acl_batch`]
    async fn set_access_control_recursive(
        &self,
        acl: &str,
        options: AclChangeOptions,
        observer: Option<&mut dyn ProgressObserver>,
    ) -> Result<AccessControlChangeResult, AclError> {
        change_recursive(self, AclChangeMode::Set, acl, options, observer).await
    }

    /// Merge ACL entries into the path and every path beneath it.
    ///
    /// # Errors
    ///
    /// - [`AclError::Validation`] if `acl` is empty
    /// - Any error from [`PathOperations::apply_acl_batch`]
    async fn update_access_control_recursive(
        &self,
        acl: &str,
        options: AclChangeOptions,
        observer: Option<&mut dyn ProgressObserver>,
    ) -> Result<AccessControlChangeResult, AclError> {
        change_recursive(self, AclChangeMode::Modify, acl, options, observer).await
    }

    /// Remove ACL entries from the path and every path beneath it.
    ///
    /// Entries name principals only, without permissions (e.g. `user:alice`).
    ///
    /// # Errors
    ///
    /// - [`AclError::Validation`] if `acl` is empty
    /// - Any error from [`PathOperations::apply_acl_batch`]
    async fn remove_access_control_recursive(
        &self,
        acl: &str,
        options: AclChangeOptions,
        observer: Option<&mut dyn ProgressObserver>,
    ) -> Result<AccessControlChangeResult, AclError> {
        change_recursive(self, AclChangeMode::Remove, acl, options, observer).await
    }
}

// Blanket implementation - any PathOperations client gets AclChangeExt for free
impl<C: PathOperations + ?Sized> AclChangeExt for C {}

async fn change_recursive<C: PathOperations + ?Sized>(
    client: &C,
    mode: AclChangeMode,
    acl: &str,
    options: AclChangeOptions,
    observer: Option<&mut dyn ProgressObserver>,
) -> Result<AccessControlChangeResult, AclError> {
    if acl.is_empty() {
        return Err(AclError::Validation {
            operation: mode.operation(),
            reason: "the access control list must be set",
        });
    }
    let (request, max_batch) = options.into_request(mode, acl);
    RecursiveAclChangeEngine::new(client)
        .run(request, observer, max_batch)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{AccessControlChangeCounters, AclChangeRequest, BatchResult, ContinuationToken};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        requests: Mutex<Vec<AclChangeRequest>>,
    }

    #[async_trait]
    impl PathOperations for RecordingClient {
        async fn apply_acl_batch(&self, request: &AclChangeRequest) -> Result<BatchResult, AclError> {
            self.requests.lock().unwrap().push(request.clone());
            Ok(BatchResult {
                counters: AccessControlChangeCounters::new(1, 1, 0),
                ..Default::default()
            })
        }
    }

    #[tokio::test]
    async fn each_entry_operation_selects_its_mode() {
        let client = RecordingClient::default();
        client
            .set_access_control_recursive("user::rwx", AclChangeOptions::default(), None)
            .await
            .unwrap();
        client
            .update_access_control_recursive("user:bob:r--", AclChangeOptions::default(), None)
            .await
            .unwrap();
        client
            .remove_access_control_recursive("user:bob", AclChangeOptions::default(), None)
            .await
            .unwrap();

        let modes: Vec<_> = client
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| (r.mode(), r.acl().to_string()))
            .collect();
        assert_eq!(
            modes,
            vec![
                (AclChangeMode::Set, "user::rwx".to_string()),
                (AclChangeMode::Modify, "user:bob:r--".to_string()),
                (AclChangeMode::Remove, "user:bob".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn empty_acl_is_rejected_before_any_call() {
        let client = RecordingClient::default();

        let err = client
            .set_access_control_recursive("", AclChangeOptions::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AclError::Validation {
                operation: "set_access_control_recursive",
                ..
            }
        ));

        let err = client
            .update_access_control_recursive("", AclChangeOptions::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AclError::Validation {
                operation: "update_access_control_recursive",
                ..
            }
        ));

        let err = client
            .remove_access_control_recursive("", AclChangeOptions::default().max_batch(1), None)
            .await
            .unwrap_err();
        assert!(err.is_validation());

        assert!(client.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn options_reach_the_first_request() {
        let client = RecordingClient::default();
        let options = AclChangeOptions::default()
            .batch_size(25)
            .continuation(ContinuationToken::new("from-earlier"));
        client
            .set_access_control_recursive("other::---", options, None)
            .await
            .unwrap();

        let requests = client.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].batch_size(), Some(25));
        assert_eq!(
            requests[0].continuation().map(ContinuationToken::as_str),
            Some("from-earlier")
        );
    }

    #[tokio::test]
    async fn works_through_trait_object() {
        let client = RecordingClient::default();
        let dynamic: &dyn PathOperations = &client;
        let result = dynamic
            .set_access_control_recursive("user::rwx", AclChangeOptions::default(), None)
            .await
            .unwrap();
        assert_eq!(result.counters, AccessControlChangeCounters::new(1, 1, 0));
        assert!(result.is_complete());
    }

    #[test]
    fn ext_is_auto_implemented() {
        fn _check<C: PathOperations + AclChangeExt>() {}
        fn _check_dyn<C: AclChangeExt + ?Sized>() {}
        _check_dyn::<dyn PathOperations>();
    }
}
