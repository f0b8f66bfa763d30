use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Upload headers/options keyed by header name.
pub type Headers = HashMap<String, String>;

pub const STORAGE_CLASS_HEADER: &str = "x-amz-storage-class";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const GZIP_CONTENT_TYPE: &str = "application/x-gzip";

/// Metadata accompanying an upload. Only `key` is consumed by the adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadDescriptor {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl UploadDescriptor {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            size: None,
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

/// Confirmation echo of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    pub key: String,
}
