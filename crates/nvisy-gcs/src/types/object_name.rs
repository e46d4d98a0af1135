//! Absolute object references of the form `gs://<bucket>/<object>`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// URI scheme of absolute object references.
pub const OBJECT_SCHEME: &str = "gs";

/// An absolute object reference: bucket plus object name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectName {
    bucket: String,
    name: String,
}

impl ObjectName {
    /// Composes a reference from a bucket and a relative object name.
    ///
    /// No validation happens here; use [`FromStr`] to parse untrusted input.
    pub fn new(bucket: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            name: name.into(),
        }
    }

    /// Bucket part.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object name part, relative to the bucket.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{OBJECT_SCHEME}://{}/{}", self.bucket, self.name)
    }
}

impl FromStr for ObjectName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid =
            || Error::configuration(format!("'{s}' is not an absolute object reference"));

        let rest = s
            .strip_prefix(OBJECT_SCHEME)
            .and_then(|rest| rest.strip_prefix("://"))
            .ok_or_else(invalid)?;
        let (bucket, name) = rest.split_once('/').ok_or_else(invalid)?;
        if bucket.is_empty() || name.is_empty() {
            return Err(invalid());
        }

        Ok(Self::new(bucket, name))
    }
}

impl TryFrom<String> for ObjectName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<ObjectName> for String {
    fn from(value: ObjectName) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(ObjectName::new("b", "foo").to_string(), "gs://b/foo");
        assert_eq!(
            ObjectName::new("b", "a/b/c.txt").to_string(),
            "gs://b/a/b/c.txt"
        );
    }

    #[test]
    fn test_parse() {
        let name: ObjectName = "gs://photos/2024/cat.jpg".parse().unwrap();
        assert_eq!(name.bucket(), "photos");
        assert_eq!(name.name(), "2024/cat.jpg");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        let inputs = [
            "photos/cat.jpg",
            "s3://photos/cat.jpg",
            "gs://photos",
            "gs:///cat",
            "gs://photos/",
        ];
        for input in inputs {
            let err = input.parse::<ObjectName>().unwrap_err();
            assert!(err.is_configuration(), "{input} should be rejected");
        }
    }
}
