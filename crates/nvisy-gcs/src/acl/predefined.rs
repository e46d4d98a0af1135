//! Named ACL templates expanded by the service.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, IntoStaticStr};

/// A predefined ("canned") ACL.
///
/// The client forwards the template name verbatim and never expands it into
/// concrete entries; expansion happens on the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(AsRefStr, Display, EnumString, IntoStaticStr)]
#[serde(rename_all = "camelCase")]
#[strum(serialize_all = "camelCase")]
pub enum PredefinedAcl {
    /// Owner gets `OWNER`, all authenticated users get `READER`.
    AuthenticatedRead,
    /// Owner gets `OWNER`.
    Private,
    /// Project team members get access according to their roles.
    ProjectPrivate,
    /// Owner gets `OWNER`, all users get `READER`.
    PublicRead,
    /// Owner gets `OWNER`, all users get `WRITER`. Buckets only.
    PublicReadWrite,
    /// Object and bucket owners get `OWNER`. Objects only.
    BucketOwnerFullControl,
    /// Object owner gets `OWNER`, bucket owner gets `READER`. Objects only.
    BucketOwnerRead,
}

impl PredefinedAcl {
    /// Wire name of the template.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Whether the service accepts this template on buckets.
    pub const fn is_bucket_applicable(self) -> bool {
        !matches!(self, Self::BucketOwnerFullControl | Self::BucketOwnerRead)
    }

    /// Whether the service accepts this template on objects.
    pub const fn is_object_applicable(self) -> bool {
        !matches!(self, Self::PublicReadWrite)
    }
}
