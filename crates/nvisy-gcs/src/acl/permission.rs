//! Access permissions and their context-dependent wire roles.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Permission granted by an [`AclEntry`](super::AclEntry).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum AclPermission {
    /// Read access.
    Read,
    /// Write access.
    Write,
    /// Full control, including ACL management.
    FullControl,
}

impl AclPermission {
    /// Role string used in bucket access controls.
    pub const fn bucket_role(self) -> &'static str {
        match self {
            Self::Read => "READER",
            Self::Write => "WRITER",
            Self::FullControl => "OWNER",
        }
    }

    /// Role string used in object access controls.
    ///
    /// Objects have no separate writer role, so `Write` maps to `OWNER`.
    pub const fn object_role(self) -> &'static str {
        match self {
            Self::Read => "READER",
            Self::Write | Self::FullControl => "OWNER",
        }
    }
}
