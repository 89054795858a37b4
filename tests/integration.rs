//! Integration tests driving the recursive operations against an in-memory
//! hierarchical-namespace store.
//!
//! These tests verify that:
//! 1. Set, modify and remove reach every path in the subtree
//! 2. Batch caps stop early and the returned token resumes the walk
//! 3. Failed entries are reported and a retry from the returned token covers them
//! 4. Progress reports stream in batch order
//! 5. Middleware layers compose over a real client
//! 6. Server-side errors abort the operation

use async_trait::async_trait;
use datalake_acl::*;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

// =============================================================================
// In-memory store
// =============================================================================

const BASE_ACL: &str = "user::rwx,group::r-x,other::---";

/// A directory subtree walked in a fixed order, one ACL per path.
///
/// Continuation tokens are `tok-{index}` into the walk order. An entry that
/// cannot be changed is reported as a failure and, unless `skip_failures` is
/// set, stops the batch without handing out a token.
struct InMemoryDataLake {
    entries: Vec<(String, bool)>,
    acls: RwLock<HashMap<String, AccessControlList>>,
    locked: RwLock<HashSet<String>>,
    skip_failures: bool,
    calls: AtomicUsize,
}

impl InMemoryDataLake {
    fn new() -> Self {
        let entries: Vec<(String, bool)> = [
            ("data", true),
            ("data/a.csv", false),
            ("data/logs", true),
            ("data/logs/1.log", false),
            ("data/logs/2.log", false),
            ("data/tmp", true),
            ("data/tmp/x", false),
        ]
        .into_iter()
        .map(|(path, is_dir)| (path.to_string(), is_dir))
        .collect();

        let base: AccessControlList = BASE_ACL.parse().unwrap();
        let acls = entries
            .iter()
            .map(|(path, _)| (path.clone(), base.clone()))
            .collect();

        Self {
            entries,
            acls: RwLock::new(acls),
            locked: RwLock::new(HashSet::new()),
            skip_failures: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn skipping_failures(mut self) -> Self {
        self.skip_failures = true;
        self
    }

    fn lock(&self, path: &str) {
        self.locked.write().unwrap().insert(path.to_string());
    }

    fn unlock(&self, path: &str) {
        self.locked.write().unwrap().remove(path);
    }

    fn acl_of(&self, path: &str) -> String {
        self.acls.read().unwrap()[path].to_string()
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn start_index(&self, token: Option<&ContinuationToken>) -> Result<usize, AclError> {
        let Some(token) = token else {
            return Ok(0);
        };
        token
            .as_str()
            .strip_prefix("tok-")
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|&n| n < self.entries.len())
            .ok_or_else(|| bad_request("InvalidContinuationToken", "The specified continuation token is invalid."))
    }
}

fn bad_request(code: &str, message: &str) -> AclError {
    AclError::Remote {
        operation: "apply_acl_batch",
        status: Some(400),
        code: Some(code.to_string()),
        message: message.to_string(),
    }
}

#[async_trait]
impl PathOperations for InMemoryDataLake {
    async fn apply_acl_batch(&self, request: &AclChangeRequest) -> Result<BatchResult, AclError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let start = self.start_index(request.continuation())?;
        let size = request
            .batch_size()
            .unwrap_or(AclChangeOptions::DEFAULT_BATCH_SIZE);
        if !(AclChangeOptions::MIN_BATCH_SIZE..=AclChangeOptions::MAX_BATCH_SIZE).contains(&size) {
            return Err(bad_request("InvalidQueryParameterValue", "maxRecords is out of range."));
        }
        let change: AccessControlList = request
            .acl()
            .parse()
            .map_err(|_| bad_request("InvalidAccessControlList", "The access control list is invalid."))?;

        let end = (start + size as usize).min(self.entries.len());
        let locked = self.locked.read().unwrap();
        let mut acls = self.acls.write().unwrap();
        let mut batch = BatchResult::default();

        for (path, is_dir) in &self.entries[start..end] {
            if locked.contains(path) {
                batch.counters.failure_count += 1;
                batch.failures.push(AccessControlChangeFailure {
                    name: path.clone(),
                    is_directory: *is_dir,
                    error_message: "This request is not authorized to perform this operation.".to_string(),
                });
                if self.skip_failures {
                    continue;
                }
                return Ok(batch);
            }

            let acl = acls.get_mut(path).unwrap();
            match request.mode() {
                AclChangeMode::Set => *acl = change.clone(),
                AclChangeMode::Modify => acl.merge(&change),
                AclChangeMode::Remove => acl.remove_principals(&change),
            }
            if *is_dir {
                batch.counters.directories_successful += 1;
            } else {
                batch.counters.files_successful += 1;
            }
        }

        if end < self.entries.len() {
            batch.continuation = ContinuationToken::new(format!("tok-{end}"));
        }
        Ok(batch)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn token(s: &str) -> Option<ContinuationToken> {
    ContinuationToken::new(s)
}

// =============================================================================
// Full walks
// =============================================================================

#[tokio::test]
async fn set_reaches_every_path() {
    init_tracing();
    let lake = InMemoryDataLake::new();

    let result = lake
        .set_access_control_recursive(
            "user::rwx,group::---,other::---",
            AclChangeOptions::default().batch_size(2),
            None,
        )
        .await
        .unwrap();

    assert_eq!(result.counters, AccessControlChangeCounters::new(3, 4, 0));
    assert!(result.is_complete());
    assert_eq!(lake.calls(), 4);
    for (path, _) in &lake.entries {
        assert_eq!(lake.acl_of(path), "user::rwx,group::---,other::---");
    }
}

#[tokio::test]
async fn default_batch_size_covers_small_tree_in_one_call() {
    let lake = InMemoryDataLake::new();
    let result = lake
        .set_access_control_recursive(BASE_ACL, AclChangeOptions::default(), None)
        .await
        .unwrap();

    assert_eq!(result.counters.total_processed(), 7);
    assert_eq!(lake.calls(), 1);
}

#[tokio::test]
async fn modify_merges_and_remove_restores() {
    let lake = InMemoryDataLake::new();
    let options = || AclChangeOptions::default().batch_size(3);

    lake.update_access_control_recursive("user:bob:r--", options(), None)
        .await
        .unwrap();
    assert_eq!(lake.acl_of("data/tmp/x"), format!("{BASE_ACL},user:bob:r--"));

    lake.update_access_control_recursive("user:bob:rw-,default:group:eng:r-x", options(), None)
        .await
        .unwrap();
    assert_eq!(
        lake.acl_of("data/logs"),
        format!("{BASE_ACL},user:bob:rw-,default:group:eng:r-x")
    );

    let result = lake
        .remove_access_control_recursive("user:bob,default:group:eng", options(), None)
        .await
        .unwrap();
    assert_eq!(result.counters, AccessControlChangeCounters::new(3, 4, 0));
    for (path, _) in &lake.entries {
        assert_eq!(lake.acl_of(path), BASE_ACL);
    }
}

// =============================================================================
// Batch cap and resumption
// =============================================================================

#[tokio::test]
async fn capped_run_resumes_from_returned_token() {
    let lake = InMemoryDataLake::new();

    let first = lake
        .set_access_control_recursive(
            "user::r-x",
            AclChangeOptions::default().batch_size(2).max_batch(2),
            None,
        )
        .await
        .unwrap();
    assert_eq!(lake.calls(), 2);
    assert_eq!(first.counters, AccessControlChangeCounters::new(2, 2, 0));
    assert_eq!(first.continuation, token("tok-4"));
    assert_eq!(lake.acl_of("data/logs/2.log"), BASE_ACL);

    let second = lake
        .set_access_control_recursive(
            "user::r-x",
            AclChangeOptions::default()
                .batch_size(2)
                .continuation(first.continuation.clone()),
            None,
        )
        .await
        .unwrap();
    assert!(second.is_complete());
    assert_eq!(lake.calls(), 4);
    assert_eq!(first.counters + second.counters, AccessControlChangeCounters::new(3, 4, 0));
    assert_eq!(lake.acl_of("data/tmp/x"), "user::r-x");
}

#[tokio::test]
async fn cap_larger_than_work_completes() {
    let lake = InMemoryDataLake::new();
    let result = lake
        .set_access_control_recursive(
            BASE_ACL,
            AclChangeOptions::default().batch_size(4).max_batch(10),
            None,
        )
        .await
        .unwrap();
    assert!(result.is_complete());
    assert_eq!(lake.calls(), 2);
}

// =============================================================================
// Partial failure
// =============================================================================

#[tokio::test]
async fn failure_returns_token_that_covers_failed_entry() {
    let lake = InMemoryDataLake::new();
    lake.lock("data/logs/1.log");

    let mut failures = Vec::new();
    let mut collect = |p: &AccessControlChangeProgress| failures.extend(p.batch_failures.iter().cloned());

    let result = lake
        .set_access_control_recursive(
            "user::rw-",
            AclChangeOptions::default().batch_size(2),
            Some(&mut collect),
        )
        .await
        .unwrap();

    assert_eq!(result.counters, AccessControlChangeCounters::new(2, 1, 1));
    assert_eq!(result.continuation, token("tok-2"));
    assert_eq!(lake.calls(), 2);
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].name, "data/logs/1.log");
    assert!(!failures[0].is_directory);
    assert_eq!(lake.acl_of("data/logs/1.log"), BASE_ACL);

    lake.unlock("data/logs/1.log");
    let retry = lake
        .set_access_control_recursive(
            "user::rw-",
            AclChangeOptions::default()
                .batch_size(2)
                .continuation(result.continuation),
            None,
        )
        .await
        .unwrap();
    assert!(retry.is_complete());
    assert_eq!(retry.counters, AccessControlChangeCounters::new(2, 3, 0));
    for (path, _) in &lake.entries {
        assert_eq!(lake.acl_of(path), "user::rw-");
    }
}

#[tokio::test]
async fn failure_in_first_batch_has_nothing_to_resume() {
    let lake = InMemoryDataLake::new();
    lake.lock("data");

    let result = lake
        .set_access_control_recursive(BASE_ACL, AclChangeOptions::default().batch_size(2), None)
        .await
        .unwrap();
    assert_eq!(result.counters, AccessControlChangeCounters::new(0, 0, 1));
    assert!(result.continuation.is_none());
    assert_eq!(lake.calls(), 1);
}

/// A server that moves past failures: the returned token is the most recent
/// one issued, which lies beyond the failed entry.
#[tokio::test]
async fn server_skipping_failures_yields_latest_token() {
    let lake = InMemoryDataLake::new().skipping_failures();
    lake.lock("data/logs/1.log");

    let result = lake
        .set_access_control_recursive("user::---", AclChangeOptions::default().batch_size(2), None)
        .await
        .unwrap();

    assert_eq!(lake.calls(), 4);
    assert_eq!(result.counters, AccessControlChangeCounters::new(3, 3, 1));
    assert_eq!(result.continuation, token("tok-6"));
    assert!(!result.is_complete());
}

// =============================================================================
// Progress
// =============================================================================

#[tokio::test]
async fn channel_observer_streams_reports_in_order() {
    let lake = InMemoryDataLake::new();
    let (mut tx, mut rx) = mpsc::channel(8);

    let result = lake
        .set_access_control_recursive(
            BASE_ACL,
            AclChangeOptions::default().batch_size(3),
            Some(&mut tx),
        )
        .await
        .unwrap();
    drop(tx);

    let mut reports = Vec::new();
    while let Some(report) = rx.recv().await {
        reports.push(report);
    }

    assert_eq!(reports.len(), 3);
    assert_eq!(reports[0].continuation, token("tok-3"));
    assert_eq!(reports[1].continuation, token("tok-6"));
    assert_eq!(reports[2].continuation, token("tok-6"));
    assert_eq!(reports[2].batch_counters, AccessControlChangeCounters::new(0, 1, 0));
    assert_eq!(reports[2].aggregate_counters, result.counters);

    let summed = reports
        .iter()
        .fold(AccessControlChangeCounters::default(), |acc, r| acc + r.batch_counters);
    assert_eq!(summed, result.counters);
}

// =============================================================================
// Errors
// =============================================================================

#[tokio::test]
async fn invalid_token_aborts_with_remote_error() {
    let lake = InMemoryDataLake::new();
    let err = lake
        .set_access_control_recursive(
            BASE_ACL,
            AclChangeOptions::default().continuation(token("garbage")),
            None,
        )
        .await
        .unwrap_err();

    assert!(err.is_remote());
    assert!(matches!(
        &err,
        AclError::Remote { status: Some(400), code: Some(code), .. } if code == "InvalidContinuationToken"
    ));
    assert_eq!(
        err.to_string(),
        "apply_acl_batch: remote operation failed (400 InvalidContinuationToken): The specified continuation token is invalid."
    );
}

#[tokio::test]
async fn batch_size_is_forwarded_unvalidated() {
    let lake = InMemoryDataLake::new();
    let err = lake
        .set_access_control_recursive(BASE_ACL, AclChangeOptions::default().batch_size(0), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AclError::Remote { status: Some(400), .. }));
    assert_eq!(lake.calls(), 1);
}

#[tokio::test]
async fn malformed_acl_is_rejected_by_the_server() {
    let lake = InMemoryDataLake::new();
    let err = lake
        .update_access_control_recursive("user:bob:rwz", AclChangeOptions::default(), None)
        .await
        .unwrap_err();
    assert!(err.is_remote());
    assert_eq!(lake.acl_of("data"), BASE_ACL);
}

#[tokio::test]
async fn empty_acl_never_reaches_the_server() {
    let lake = InMemoryDataLake::new();
    let err = lake
        .remove_access_control_recursive("", AclChangeOptions::default(), None)
        .await
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(lake.calls(), 0);
}

// =============================================================================
// Middleware
// =============================================================================

#[tokio::test]
async fn layered_store_behaves_like_the_store() {
    init_tracing();
    let client = InMemoryDataLake::new()
        .layer(TimeoutLayer::new(Duration::from_secs(5)))
        .layer(TracingLayer::new("data"));

    let result = client
        .set_access_control_recursive(
            "user::rwx",
            AclChangeOptions::default().batch_size(5).max_batch(1),
            None,
        )
        .await
        .unwrap();

    assert_eq!(result.continuation, token("tok-5"));
    assert_eq!(client.inner().inner().calls(), 1);
    assert_eq!(client.inner().inner().acl_of("data/logs/2.log"), "user::rwx");
    assert_eq!(client.inner().inner().acl_of("data/tmp"), BASE_ACL);
}

#[tokio::test]
async fn engine_drives_a_trait_object() {
    let lake = InMemoryDataLake::new();
    let client: &dyn PathOperations = &lake;

    let request = AclChangeRequest::new(AclChangeMode::Modify, "mask::r--").with_batch_size(4);
    let result = RecursiveAclChangeEngine::new(client)
        .run(request, None, None)
        .await
        .unwrap();

    assert!(result.is_complete());
    assert_eq!(lake.acl_of("data/a.csv"), format!("{BASE_ACL},mask::r--"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn independent_operations_run_concurrently() {
    let left = InMemoryDataLake::new();
    let right = InMemoryDataLake::new();

    let (a, b) = tokio::join!(
        left.set_access_control_recursive("user::r--", AclChangeOptions::default().batch_size(1), None),
        right.update_access_control_recursive("user:eve:---", AclChangeOptions::default().batch_size(2), None),
    );

    assert_eq!(a.unwrap().counters.total_processed(), 7);
    assert_eq!(b.unwrap().counters.total_processed(), 7);
    assert_eq!(left.calls(), 7);
    assert_eq!(right.calls(), 4);
    assert_eq!(right.acl_of("data"), format!("{BASE_ACL},user:eve:---"));
}
