//! Entries of a directory-simulated listing.

use serde::{Deserialize, Serialize};

/// One listing result: a concrete object or a common-prefix "directory".
///
/// Directories are not real containers; they group object names that share
/// a prefix up to the next delimiter, and their names end with it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "name", rename_all = "camelCase")]
pub enum BucketEntry {
    /// A concrete object.
    Object(String),
    /// A common prefix.
    Directory(String),
}

impl BucketEntry {
    /// Full name of the entry.
    pub fn name(&self) -> &str {
        match self {
            Self::Object(name) | Self::Directory(name) => name,
        }
    }

    /// Whether the entry is a concrete object.
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Whether the entry is a common prefix.
    pub fn is_directory(&self) -> bool {
        matches!(self, Self::Directory(_))
    }
}
