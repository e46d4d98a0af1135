//! Value types shared by the clients.

mod bucket_entry;
mod bucket_info;
mod object_info;
mod object_metadata;
mod object_name;

pub use bucket_entry::BucketEntry;
pub use bucket_info::BucketInfo;
pub use object_info::{ObjectGeneration, ObjectInfo};
pub use object_metadata::{MetadataOverrides, ObjectMetadata};
pub use object_name::{OBJECT_SCHEME, ObjectName};
