//! Writable object metadata.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::acl::Acl;
use crate::transport::{ObjectPatch, ObjectResource};

/// Writable metadata of an object.
///
/// Unset string fields let the service apply its own default (for example a
/// generic binary content type). The `acl` slot is write-only: it is sent with
/// outgoing requests and never populated from a read-back snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMetadata {
    /// Explicit ACL to apply on write.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<Acl>,
    /// MIME type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Content encoding, e.g. `gzip`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_encoding: Option<String>,
    /// Cache-Control directive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_control: Option<String>,
    /// Content-Disposition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_disposition: Option<String>,
    /// Content language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_language: Option<String>,
    /// Additional custom metadata.
    #[serde(default)]
    pub custom: HashMap<String, String>,
}

/// Overrides applied by [`ObjectMetadata::replace`].
///
/// `None` means "keep the current value". There is no way to express "clear
/// this field".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataOverrides {
    /// Replacement ACL.
    pub acl: Option<Acl>,
    /// Replacement MIME type.
    pub content_type: Option<String>,
    /// Replacement content encoding.
    pub content_encoding: Option<String>,
    /// Replacement Cache-Control.
    pub cache_control: Option<String>,
    /// Replacement Content-Disposition.
    pub content_disposition: Option<String>,
    /// Replacement content language.
    pub content_language: Option<String>,
    /// Replacement custom map, replacing the whole map.
    pub custom: Option<HashMap<String, String>>,
}

impl ObjectMetadata {
    /// Creates metadata with every field unset.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the ACL.
    pub fn with_acl(mut self, acl: Acl) -> Self {
        self.acl = Some(acl);
        self
    }

    /// Sets the content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Sets the content encoding.
    pub fn with_content_encoding(mut self, content_encoding: impl Into<String>) -> Self {
        self.content_encoding = Some(content_encoding.into());
        self
    }

    /// Sets the Cache-Control directive.
    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }

    /// Sets the Content-Disposition.
    pub fn with_content_disposition(mut self, content_disposition: impl Into<String>) -> Self {
        self.content_disposition = Some(content_disposition.into());
        self
    }

    /// Sets the content language.
    pub fn with_content_language(mut self, content_language: impl Into<String>) -> Self {
        self.content_language = Some(content_language.into());
        self
    }

    /// Adds a custom metadata field.
    pub fn with_custom_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.custom.insert(key.into(), value.into());
        self
    }

    /// Returns a copy with `overrides` layered over the current values.
    ///
    /// Fields left as `None` in `overrides` keep their current value, so a
    /// field that is set can never be cleared through this method.
    #[must_use]
    pub fn replace(&self, overrides: MetadataOverrides) -> Self {
        Self {
            acl: overrides.acl.or_else(|| self.acl.clone()),
            content_type: overrides.content_type.or_else(|| self.content_type.clone()),
            content_encoding: overrides
                .content_encoding
                .or_else(|| self.content_encoding.clone()),
            cache_control: overrides
                .cache_control
                .or_else(|| self.cache_control.clone()),
            content_disposition: overrides
                .content_disposition
                .or_else(|| self.content_disposition.clone()),
            content_language: overrides
                .content_language
                .or_else(|| self.content_language.clone()),
            custom: overrides.custom.unwrap_or_else(|| self.custom.clone()),
        }
    }

    /// Converts to the wire patch, serialising the ACL in object context.
    pub(crate) fn to_patch(&self) -> Result<ObjectPatch> {
        let acl = self
            .acl
            .as_ref()
            .map(Acl::to_object_access_controls)
            .transpose()?;

        Ok(ObjectPatch {
            content_type: self.content_type.clone(),
            content_encoding: self.content_encoding.clone(),
            cache_control: self.cache_control.clone(),
            content_disposition: self.content_disposition.clone(),
            content_language: self.content_language.clone(),
            metadata: (!self.custom.is_empty()).then(|| self.custom.clone()),
            acl,
        })
    }

    /// Builds read-back metadata. The ACL slot is always left empty.
    pub(crate) fn from_resource(resource: &ObjectResource) -> Self {
        Self {
            acl: None,
            content_type: resource.content_type.clone(),
            content_encoding: resource.content_encoding.clone(),
            cache_control: resource.cache_control.clone(),
            content_disposition: resource.content_disposition.clone(),
            content_language: resource.content_language.clone(),
            custom: resource.metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acl::{AclEntry, AclPermission, AclScope};
    use crate::transport::AccessControl;

    #[test]
    fn test_defaults_are_unset() {
        let metadata = ObjectMetadata::new();
        assert!(metadata.content_type.is_none());
        assert!(metadata.cache_control.is_none());
        assert!(metadata.acl.is_none());
        assert!(metadata.custom.is_empty());
    }

    #[test]
    fn test_replace_keeps_omitted_fields() {
        let metadata = ObjectMetadata::new().with_cache_control("x");
        let replaced = metadata.replace(MetadataOverrides {
            content_type: Some("text/plain".into()),
            ..Default::default()
        });

        assert_eq!(replaced.content_type.as_deref(), Some("text/plain"));
        assert_eq!(replaced.cache_control.as_deref(), Some("x"));
        assert!(metadata.content_type.is_none());
    }

    #[test]
    fn test_replace_cannot_clear() {
        let metadata = ObjectMetadata::new()
            .with_content_language("en")
            .with_custom_field("owner", "ops");
        let replaced = metadata.replace(MetadataOverrides::default());
        assert_eq!(replaced, metadata);
    }

    #[test]
    fn test_replace_swaps_whole_custom_map() {
        let metadata = ObjectMetadata::new().with_custom_field("a", "1");
        let replaced = metadata.replace(MetadataOverrides {
            custom: Some(HashMap::from([("b".to_string(), "2".to_string())])),
            ..Default::default()
        });
        assert_eq!(replaced.custom.len(), 1);
        assert_eq!(replaced.custom.get("b").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_patch_uses_object_roles() {
        let acl = Acl::new([AclEntry::new(
            AclScope::account("a@example.com"),
            AclPermission::Write,
        )]);
        let patch = ObjectMetadata::new()
            .with_content_type("image/png")
            .with_acl(acl)
            .to_patch()
            .unwrap();

        assert_eq!(patch.content_type.as_deref(), Some("image/png"));
        assert!(patch.metadata.is_none());
        assert_eq!(
            patch.acl,
            Some(vec![AccessControl::new("user-a@example.com", "OWNER")])
        );
    }
}
