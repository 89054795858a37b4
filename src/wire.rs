//! # Wire Format
//!
//! Request parameters and response decoding for the service's
//! `setAccessControlRecursive` path operation, for transports implementing
//! [`PathOperations`](crate::PathOperations) over HTTP.
//!
//! ## Request
//!
//! ```text
//! PATCH {path}?action=setAccessControlRecursive&mode={mode}[&continuation=..][&maxRecords=..][&timeout=..]
//! x-ms-acl: {acl}
//! ```
//!
//! ## Response
//!
//! The next continuation token arrives in the `x-ms-continuation` header; the
//! body is JSON (decoded by `decode_batch_response` with the `serde` feature):
//!
//! ```json
//! {
//!   "directoriesSuccessful": 3,
//!   "filesSuccessful": 7,
//!   "failureCount": 1,
//!   "failedEntries": [
//!     { "name": "dir/file", "type": "FILE", "errorMessage": "..." }
//!   ]
//! }
//! ```

use std::time::Duration;

use crate::AclChangeRequest;

/// Request header carrying the ACL text.
pub const ACL_HEADER: &str = "x-ms-acl";

/// Response header carrying the next continuation token.
pub const CONTINUATION_HEADER: &str = "x-ms-continuation";

/// Value of the `action` query parameter.
pub const ACTION: &str = "setAccessControlRecursive";

/// Query parameters for one batch call, in a stable order.
///
/// The ACL itself travels in [`ACL_HEADER`], not the query string.
///
/// ```rust
/// use datalake_acl::{AclChangeMode, AclChangeRequest, wire};
///
/// let request = AclChangeRequest::new(AclChangeMode::Remove, "user:bob").with_batch_size(100);
/// assert_eq!(
///     wire::query_parameters(&request),
///     vec![
///         ("action", "setAccessControlRecursive".to_string()),
///         ("mode", "remove".to_string()),
///         ("maxRecords", "100".to_string()),
///     ]
/// );
/// ```
pub fn query_parameters(request: &AclChangeRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("action", ACTION.to_string()),
        ("mode", request.mode().as_str().to_string()),
    ];
    if let Some(token) = request.continuation() {
        params.push(("continuation", token.as_str().to_string()));
    }
    if let Some(size) = request.batch_size() {
        params.push(("maxRecords", size.to_string()));
    }
    if let Some(timeout) = request.timeout() {
        params.push(("timeout", timeout_secs(timeout).to_string()));
    }
    params
}

/// The service takes whole seconds; partial seconds round up and the
/// minimum is one.
fn timeout_secs(timeout: Duration) -> u64 {
    let secs = timeout.as_secs();
    let secs = if timeout.subsec_nanos() > 0 { secs.saturating_add(1) } else { secs };
    secs.max(1)
}

#[cfg(feature = "serde")]
pub use decode::decode_batch_response;

#[cfg(feature = "serde")]
mod decode {
    use serde::Deserialize;

    use crate::{AccessControlChangeCounters, AccessControlChangeFailure, AclError, BatchResult, ContinuationToken};

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct SetAccessControlRecursiveResponse {
        #[serde(default)]
        directories_successful: u64,
        #[serde(default)]
        files_successful: u64,
        #[serde(default)]
        failure_count: u64,
        #[serde(default)]
        failed_entries: Vec<AclFailedEntry>,
    }

    #[derive(Debug, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct AclFailedEntry {
        #[serde(default)]
        name: String,
        #[serde(rename = "type", default)]
        kind: String,
        #[serde(default)]
        error_message: String,
    }

    /// Decode a response body and its continuation header into a [`BatchResult`].
    ///
    /// An entry is a directory exactly when its `type` is `"DIRECTORY"`.
    /// An absent or empty continuation header means the subtree is exhausted.
    ///
    /// # Errors
    ///
    /// - [`AclError::Deserialization`] if the body is not the expected JSON
    pub fn decode_batch_response(body: &[u8], continuation: Option<&str>) -> Result<BatchResult, AclError> {
        let response: SetAccessControlRecursiveResponse =
            serde_json::from_slice(body).map_err(|e| AclError::Deserialization(e.to_string()))?;

        let failures = response
            .failed_entries
            .into_iter()
            .map(|entry| AccessControlChangeFailure {
                is_directory: entry.kind == "DIRECTORY",
                name: entry.name,
                error_message: entry.error_message,
            })
            .collect();

        Ok(BatchResult {
            counters: AccessControlChangeCounters::new(
                response.directories_successful,
                response.files_successful,
                response.failure_count,
            ),
            failures,
            continuation: ContinuationToken::from_server(continuation),
        })
    }
}
