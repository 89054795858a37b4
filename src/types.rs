//! Core types for recursive access-control changes.

use std::fmt;
use std::ops::{Add, AddAssign};

/// How an ACL is applied to each path in the subtree.
///
/// Fixed for the lifetime of one logical operation, including every batch
/// and every resumption from a continuation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AclChangeMode {
    /// Replace the ACL of every path.
    Set,
    /// Merge the given entries into every path's ACL.
    Modify,
    /// Remove the given entries from every path's ACL.
    Remove,
}

impl AclChangeMode {
    /// The mode name as sent on the wire (`set`, `modify`, `remove`).
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            AclChangeMode::Set => "set",
            AclChangeMode::Modify => "modify",
            AclChangeMode::Remove => "remove",
        }
    }

    /// Name of the caller-facing entry operation for this mode.
    #[inline]
    pub(crate) const fn operation(&self) -> &'static str {
        match self {
            AclChangeMode::Set => "set_access_control_recursive",
            AclChangeMode::Modify => "update_access_control_recursive",
            AclChangeMode::Remove => "remove_access_control_recursive",
        }
    }
}

impl fmt::Display for AclChangeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque, server-issued marker for where a recursive operation resumes.
///
/// Never empty: an empty token from the server means "no more work" and is
/// represented as `None` via [`ContinuationToken::from_server`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Wrap a token previously obtained from a result or progress report.
    ///
    /// Returns `None` for an empty string.
    pub fn new(token: impl Into<String>) -> Option<Self> {
        let token = token.into();
        if token.is_empty() {
            None
        } else {
            Some(Self(token))
        }
    }

    /// Normalize a raw continuation header value.
    ///
    /// Both an absent header and an empty value mean the subtree is exhausted.
    pub fn from_server(raw: Option<&str>) -> Option<Self> {
        raw.and_then(Self::new)
    }

    /// The raw token text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the token, returning the raw text.
    #[inline]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ContinuationToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Success and failure counts, for one batch or as a running total.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessControlChangeCounters {
    /// Directories whose ACL was changed.
    pub directories_successful: u64,
    /// Files whose ACL was changed.
    pub files_successful: u64,
    /// Paths whose ACL could not be changed.
    pub failure_count: u64,
}

impl AccessControlChangeCounters {
    /// Build counters from their three components.
    #[inline]
    pub const fn new(directories_successful: u64, files_successful: u64, failure_count: u64) -> Self {
        Self {
            directories_successful,
            files_successful,
            failure_count,
        }
    }

    /// Every path the server visited, successful or not.
    ///
    /// Saturates at `u64::MAX`.
    #[inline]
    pub const fn total_processed(&self) -> u64 {
        self.directories_successful
            .saturating_add(self.files_successful)
            .saturating_add(self.failure_count)
    }

    /// Returns `true` if at least one path failed.
    #[inline]
    pub const fn has_failures(&self) -> bool {
        self.failure_count > 0
    }
}

/// Element-wise sum, saturating at `u64::MAX`.
impl Add for AccessControlChangeCounters {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            directories_successful: self.directories_successful.saturating_add(rhs.directories_successful),
            files_successful: self.files_successful.saturating_add(rhs.files_successful),
            failure_count: self.failure_count.saturating_add(rhs.failure_count),
        }
    }
}

impl AddAssign for AccessControlChangeCounters {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// A single path whose ACL could not be changed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessControlChangeFailure {
    /// Path of the entry, relative to the file system root.
    pub name: String,
    /// Whether the entry is a directory.
    pub is_directory: bool,
    /// Reason reported by the server.
    pub error_message: String,
}

/// Outcome of one call to the batch primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatchResult {
    /// Counts for this batch only.
    pub counters: AccessControlChangeCounters,
    /// Failed entries, in server order.
    pub failures: Vec<AccessControlChangeFailure>,
    /// Where the next batch starts; `None` when the subtree is exhausted.
    pub continuation: Option<ContinuationToken>,
}

/// Progress report delivered to a [`ProgressObserver`](crate::ProgressObserver)
/// after each batch.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessControlChangeProgress {
    /// Counts for the batch just completed.
    pub batch_counters: AccessControlChangeCounters,
    /// Counts for every batch so far, including this one.
    pub aggregate_counters: AccessControlChangeCounters,
    /// Entries that failed in this batch, in server order.
    pub batch_failures: Vec<AccessControlChangeFailure>,
    /// Most recent non-empty continuation token seen so far.
    pub continuation: Option<ContinuationToken>,
}

/// Final summary of a recursive access-control change.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessControlChangeResult {
    /// Totals across all batches.
    pub counters: AccessControlChangeCounters,
    /// Token to resume from, if the subtree was not fully processed
    /// or some entries failed.
    pub continuation: Option<ContinuationToken>,
}

impl AccessControlChangeResult {
    /// Returns `true` if no continuation was handed back.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.continuation.is_none()
    }
}
