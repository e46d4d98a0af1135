//! Grantee scopes of an access-control entry.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The grantee an [`AclEntry`](super::AclEntry) applies to.
///
/// `AllAuthenticated` and `AllUsers` never carry an identifier; every other
/// variant does.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "camelCase")]
pub enum AclScope {
    /// A user identified by its storage id.
    StorageId(String),
    /// A user identified by its account e-mail address.
    Account(String),
    /// A group identified by its e-mail address.
    Group(String),
    /// Every user of a domain.
    Domain(String),
    /// Any caller holding valid credentials.
    AllAuthenticated,
    /// Anyone, including anonymous callers.
    AllUsers,
}

impl AclScope {
    /// Scope for a user identified by storage id.
    pub fn storage_id(id: impl Into<String>) -> Self {
        Self::StorageId(id.into())
    }

    /// Scope for a user identified by account e-mail.
    pub fn account(email: impl Into<String>) -> Self {
        Self::Account(email.into())
    }

    /// Scope for a group identified by e-mail.
    pub fn group(email: impl Into<String>) -> Self {
        Self::Group(email.into())
    }

    /// Scope for every user of `domain`.
    pub fn domain(domain: impl Into<String>) -> Self {
        Self::Domain(domain.into())
    }

    /// Returns the identifier carried by this scope, if any.
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::StorageId(id) | Self::Account(id) | Self::Group(id) | Self::Domain(id) => {
                Some(id)
            }
            Self::AllAuthenticated | Self::AllUsers => None,
        }
    }

    /// Maps this scope to its wire entity string.
    ///
    /// Fails with a configuration error when an identified scope carries an
    /// empty identifier.
    pub fn to_entity(&self) -> Result<String> {
        let entity = match self {
            Self::StorageId(id) | Self::Account(id) => identified("user", id)?,
            Self::Group(id) => identified("group", id)?,
            Self::Domain(domain) => identified("domain", domain)?,
            Self::AllAuthenticated => "allAuthenticatedUsers".to_owned(),
            Self::AllUsers => "allUsers".to_owned(),
        };
        Ok(entity)
    }
}

fn identified(kind: &str, id: &str) -> Result<String> {
    if id.trim().is_empty() {
        return Err(Error::configuration(format!(
            "ACL scope '{kind}' requires a non-empty identifier"
        )));
    }
    Ok(format!("{kind}-{id}"))
}

impl fmt::Display for AclScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StorageId(id) => write!(f, "StorageId({id})"),
            Self::Account(id) => write!(f, "Account({id})"),
            Self::Group(id) => write!(f, "Group({id})"),
            Self::Domain(id) => write!(f, "Domain({id})"),
            Self::AllAuthenticated => f.write_str("AllAuthenticated"),
            Self::AllUsers => f.write_str("AllUsers"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorKind;

    #[test]
    fn test_entity_strings() {
        assert_eq!(AclScope::storage_id("0042").to_entity().unwrap(), "user-0042");
        assert_eq!(
            AclScope::account("a@example.com").to_entity().unwrap(),
            "user-a@example.com"
        );
        assert_eq!(
            AclScope::group("ops@example.com").to_entity().unwrap(),
            "group-ops@example.com"
        );
        assert_eq!(
            AclScope::domain("example.com").to_entity().unwrap(),
            "domain-example.com"
        );
        assert_eq!(
            AclScope::AllAuthenticated.to_entity().unwrap(),
            "allAuthenticatedUsers"
        );
        assert_eq!(AclScope::AllUsers.to_entity().unwrap(), "allUsers");
    }

    #[test]
    fn test_empty_identifier_is_rejected() {
        let err = AclScope::group("  ").to_entity().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }

    #[test]
    fn test_id_presence() {
        assert_eq!(AclScope::domain("example.com").id(), Some("example.com"));
        assert_eq!(AclScope::AllUsers.id(), None);
        assert_eq!(AclScope::AllAuthenticated.id(), None);
    }
}
