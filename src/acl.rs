//! # POSIX-style Access Control Lists
//!
//! A typed model of the ACL text accepted by the recursive entry operations.
//!
//! ## Grammar
//!
//! ```text
//! acl   = entry *( "," entry )
//! entry = [ "default:" ] tag ":" [ id ] [ ":" perms ]
//! tag   = "user" | "group" | "mask" | "other"
//! perms = ( "r" | "-" ) ( "w" | "-" ) ( "x" | "-" )
//! ```
//!
//! Entries passed to a remove operation omit the permissions field.
//!
//! Parsing is optional: the entry operations forward ACL text as-is and only
//! reject an empty string. Use [`AccessControlList`] to build ACL text
//! programmatically or to inspect what a caller supplied.
//!
//! ```rust
//! use datalake_acl::AccessControlList;
//!
//! let acl: AccessControlList = "user::rwx,default:user:alice:r-x,other::---".parse().unwrap();
//! assert_eq!(acl.entries().len(), 3);
//! assert_eq!(acl.to_string(), "user::rwx,default:user:alice:r-x,other::---");
//! ```

use std::fmt;
use std::str::FromStr;

use crate::AclError;

/// Whether an entry applies to the path itself or is inherited by new children.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AclScope {
    /// The entry governs access to the path.
    #[default]
    Access,
    /// The entry is copied to children created beneath a directory.
    Default,
}

/// The kind of principal an entry grants permissions to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AclTag {
    /// Owning user (empty id) or a named user.
    User,
    /// Owning group (empty id) or a named group.
    Group,
    /// Upper bound for named users, named groups and the owning group.
    Mask,
    /// Everyone else.
    Other,
}

impl AclTag {
    fn as_str(&self) -> &'static str {
        match self {
            AclTag::User => "user",
            AclTag::Group => "group",
            AclTag::Mask => "mask",
            AclTag::Other => "other",
        }
    }
}

impl FromStr for AclTag {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(AclTag::User),
            "group" => Ok(AclTag::Group),
            "mask" => Ok(AclTag::Mask),
            "other" => Ok(AclTag::Other),
            _ => Err("unknown entry type"),
        }
    }
}

/// Read, write and execute bits of a single entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AclPermissions {
    /// `r`
    pub read: bool,
    /// `w`
    pub write: bool,
    /// `x`
    pub execute: bool,
}

impl AclPermissions {
    /// `rwx`
    pub const ALL: Self = Self {
        read: true,
        write: true,
        execute: true,
    };

    /// `---`
    pub const NONE: Self = Self {
        read: false,
        write: false,
        execute: false,
    };

    /// Build from a Unix mode triplet (e.g. `0o5` for `r-x`).
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            read: bits & 0o4 != 0,
            write: bits & 0o2 != 0,
            execute: bits & 0o1 != 0,
        }
    }

    /// The Unix mode triplet for these permissions.
    #[inline]
    pub const fn bits(&self) -> u8 {
        (self.read as u8) << 2 | (self.write as u8) << 1 | self.execute as u8
    }
}

impl FromStr for AclPermissions {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 3 {
            return Err("permissions must be three characters");
        }
        let flag = |actual: u8, expected: u8| match actual {
            b'-' => Ok(false),
            c if c == expected => Ok(true),
            _ => Err("permissions must match [r-][w-][x-]"),
        };
        Ok(Self {
            read: flag(bytes[0], b'r')?,
            write: flag(bytes[1], b'w')?,
            execute: flag(bytes[2], b'x')?,
        })
    }
}

impl fmt::Display for AclPermissions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = if self.read { 'r' } else { '-' };
        let w = if self.write { 'w' } else { '-' };
        let x = if self.execute { 'x' } else { '-' };
        write!(f, "{r}{w}{x}")
    }
}

/// One access control entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessControlEntry {
    /// Access or default scope.
    pub scope: AclScope,
    /// Principal kind.
    pub tag: AclTag,
    /// User or group identifier; empty for the owner, owning group, mask and other.
    pub id: String,
    /// Granted permissions; `None` in entries passed to a remove operation.
    pub permissions: Option<AclPermissions>,
}

impl AccessControlEntry {
    /// An access-scope entry with permissions.
    pub fn new(tag: AclTag, id: impl Into<String>, permissions: AclPermissions) -> Self {
        Self {
            scope: AclScope::Access,
            tag,
            id: id.into(),
            permissions: Some(permissions),
        }
    }

    /// Move this entry to the default scope.
    pub fn into_default(mut self) -> Self {
        self.scope = AclScope::Default;
        self
    }

    /// Drop the permissions, producing the form accepted by remove operations.
    pub fn without_permissions(mut self) -> Self {
        self.permissions = None;
        self
    }

    /// Returns `true` if both entries address the same principal in the same scope.
    pub fn same_principal(&self, other: &Self) -> bool {
        self.scope == other.scope && self.tag == other.tag && self.id == other.id
    }
}

impl FromStr for AccessControlEntry {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason| AclError::InvalidAcl {
            entry: s.to_string(),
            reason,
        };

        let mut parts: Vec<&str> = s.trim().split(':').collect();
        let scope = if parts.first() == Some(&"default") {
            parts.remove(0);
            AclScope::Default
        } else {
            AclScope::Access
        };

        let (tag, id, permissions) = match parts.as_slice() {
            [tag, id] => (*tag, *id, None),
            [tag, id, perms] => (*tag, *id, Some(perms.parse::<AclPermissions>().map_err(invalid)?)),
            _ => return Err(invalid("expected [scope:]type:[id][:permissions]")),
        };
        let tag: AclTag = tag.parse().map_err(invalid)?;
        if matches!(tag, AclTag::Mask | AclTag::Other) && !id.is_empty() {
            return Err(invalid("mask and other entries cannot name an identifier"));
        }

        Ok(Self {
            scope,
            tag,
            id: id.to_string(),
            permissions,
        })
    }
}

impl fmt::Display for AccessControlEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scope == AclScope::Default {
            f.write_str("default:")?;
        }
        write!(f, "{}:{}", self.tag.as_str(), self.id)?;
        if let Some(permissions) = self.permissions {
            write!(f, ":{permissions}")?;
        }
        Ok(())
    }
}

/// An ordered list of access control entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccessControlList(Vec<AccessControlEntry>);

impl AccessControlList {
    /// Build from entries.
    pub fn new(entries: Vec<AccessControlEntry>) -> Self {
        Self(entries)
    }

    /// The entries, in order.
    pub fn entries(&self) -> &[AccessControlEntry] {
        &self.0
    }

    /// Returns `true` if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns `true` if any entry has no permissions (remove form).
    pub fn is_removal(&self) -> bool {
        self.0.iter().any(|entry| entry.permissions.is_none())
    }

    /// Merge `other` into this list: entries for an existing principal are
    /// replaced in place, new principals are appended.
    pub fn merge(&mut self, other: &AccessControlList) {
        for incoming in &other.0 {
            match self.0.iter_mut().find(|e| e.same_principal(incoming)) {
                Some(existing) => *existing = incoming.clone(),
                None => self.0.push(incoming.clone()),
            }
        }
    }

    /// Remove every entry whose principal appears in `other`.
    pub fn remove_principals(&mut self, other: &AccessControlList) {
        self.0
            .retain(|entry| !other.0.iter().any(|r| r.same_principal(entry)));
    }
}

impl FromStr for AccessControlList {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err(AclError::InvalidAcl {
                entry: String::new(),
                reason: "access control list is empty",
            });
        }
        s.split(',')
            .map(str::parse::<AccessControlEntry>)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }
}

impl fmt::Display for AccessControlList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, entry) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

impl FromIterator<AccessControlEntry> for AccessControlList {
    fn from_iter<I: IntoIterator<Item = AccessControlEntry>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
