//! Access control lists.
//!
//! An [`Acl`] is an ordered list of [`AclEntry`] values. Order is
//! significant and preserved from construction to the wire. Bucket and object
//! contexts serialise permissions differently, see
//! [`AclPermission::object_role`].

mod permission;
mod predefined;
mod scope;

use serde::{Deserialize, Serialize};

pub use self::permission::AclPermission;
pub use self::predefined::PredefinedAcl;
pub use self::scope::AclScope;
use crate::Result;
use crate::transport::AccessControl;

/// A single grant of a permission to a scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AclEntry {
    /// Who is granted access.
    pub scope: AclScope,
    /// What they are granted.
    pub permission: AclPermission,
}

impl AclEntry {
    /// Creates a new entry.
    pub fn new(scope: AclScope, permission: AclPermission) -> Self {
        Self { scope, permission }
    }
}

/// An ordered, immutable access control list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Acl {
    entries: Vec<AclEntry>,
}

impl Acl {
    /// Creates an ACL holding its own copy of `entries`, in iteration order.
    pub fn new(entries: impl IntoIterator<Item = AclEntry>) -> Self {
        Self {
            entries: entries.into_iter().collect(),
        }
    }

    /// Returns the entries in evaluation order.
    pub fn entries(&self) -> &[AclEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the ACL has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Serialises the entries as bucket access controls.
    pub fn to_bucket_access_controls(&self) -> Result<Vec<AccessControl>> {
        self.entries
            .iter()
            .map(|entry| {
                Ok(AccessControl::new(
                    entry.scope.to_entity()?,
                    entry.permission.bucket_role(),
                ))
            })
            .collect()
    }

    /// Serialises the entries as object access controls.
    pub fn to_object_access_controls(&self) -> Result<Vec<AccessControl>> {
        self.entries
            .iter()
            .map(|entry| {
                Ok(AccessControl::new(
                    entry.scope.to_entity()?,
                    entry.permission.object_role(),
                ))
            })
            .collect()
    }
}

impl FromIterator<AclEntry> for Acl {
    fn from_iter<I: IntoIterator<Item = AclEntry>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Acl {
    type IntoIter = std::slice::Iter<'a, AclEntry>;
    type Item = &'a AclEntry;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
