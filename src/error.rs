//! Error types for recursive access-control changes.

use std::time::Duration;

/// Error type for recursive access-control operations.
///
/// Per-entry failures reported by the server are *not* errors; they surface
/// as data in [`AccessControlChangeCounters::failure_count`] and
/// [`AccessControlChangeProgress::batch_failures`]. An `AclError` means the
/// operation as a whole was rejected or could not make progress.
///
/// Uses `#[non_exhaustive]` for forward compatibility.
///
/// [`AccessControlChangeCounters::failure_count`]: crate::AccessControlChangeCounters::failure_count
/// [`AccessControlChangeProgress::batch_failures`]: crate::AccessControlChangeProgress::batch_failures
///
/// # Examples
///
/// ```rust
/// use datalake_acl::AclError;
///
/// let err = AclError::Validation {
///     operation: "set_access_control_recursive",
///     reason: "the access control list must be set",
/// };
/// assert_eq!(
///     err.to_string(),
///     "set_access_control_recursive: invalid argument: the access control list must be set"
/// );
/// assert!(err.is_validation());
/// ```
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum AclError {
    /// An argument was rejected before any request was sent.
    #[error("{operation}: invalid argument: {reason}")]
    Validation {
        /// The operation that rejected the argument.
        operation: &'static str,
        /// Why the argument was rejected.
        reason: &'static str,
    },

    /// ACL text could not be parsed.
    #[error("invalid acl entry '{entry}': {reason}")]
    InvalidAcl {
        /// The offending entry text.
        entry: String,
        /// What is wrong with it.
        reason: &'static str,
    },

    /// The remote service rejected the request or could not be reached.
    #[error("{operation}: remote operation failed{}: {message}", status_suffix(.status, .code))]
    Remote {
        /// The operation that failed.
        operation: &'static str,
        /// HTTP status code, when a response was received.
        status: Option<u16>,
        /// Service error code (e.g. `AuthorizationPermissionMismatch`).
        code: Option<String>,
        /// Human-readable message.
        message: String,
    },

    /// A single batch call did not complete within its deadline.
    #[error("{operation}: timed out after {timeout:?}")]
    Timeout {
        /// The operation that timed out.
        operation: &'static str,
        /// The deadline that elapsed.
        timeout: Duration,
    },

    /// A response body could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialization(String),
}

fn status_suffix(status: &Option<u16>, code: &Option<String>) -> String {
    match (status, code) {
        (Some(status), Some(code)) => format!(" ({status} {code})"),
        (Some(status), None) => format!(" ({status})"),
        (None, Some(code)) => format!(" ({code})"),
        (None, None) => String::new(),
    }
}

impl AclError {
    /// Build a [`AclError::Remote`] without status or service code.
    pub fn remote(operation: &'static str, message: impl Into<String>) -> Self {
        AclError::Remote {
            operation,
            status: None,
            code: None,
            message: message.into(),
        }
    }

    /// Returns `true` if the error was raised before any network interaction.
    pub fn is_validation(&self) -> bool {
        matches!(self, AclError::Validation { .. } | AclError::InvalidAcl { .. })
    }

    /// Returns `true` if the error came from the batch primitive or the
    /// transport beneath it.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            AclError::Remote { .. } | AclError::Timeout { .. } | AclError::Deserialization(_)
        )
    }
}
