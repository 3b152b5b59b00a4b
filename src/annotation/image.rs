//! Loaded image records.

use super::bbox::BoundingBox;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable opaque identifier of an image, assigned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageId(String);

impl ImageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ImageId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// One loaded image and its in-memory annotation set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageRecord {
    pub id: ImageId,
    pub url: String,
    pub file_name: String,
    #[serde(default)]
    pub annotations: Vec<BoundingBox>,
}

impl ImageRecord {
    /// Creates a record with no annotations.
    pub fn new(id: ImageId, url: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
            file_name: file_name.into(),
            annotations: Vec::new(),
        }
    }
}
