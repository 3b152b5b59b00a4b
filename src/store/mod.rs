//! Persistence collaborator for images and their annotations.
//!
//! The editor talks to storage only through [`AnnotationBackend`]. Saving is
//! full-overwrite: after every committed mutation the whole annotation set
//! of an image replaces what the backend had. [`FileBackend`] keeps
//! everything in a local directory; [`SaveDispatcher`] runs saves in the
//! background so they never block editing.

mod dispatch;
mod file;

pub use dispatch::{Notice, SaveDispatcher};
pub use file::FileBackend;

use crate::annotation::{BoundingBox, Color, ImageId, ImageRecord, Palette};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors reported by annotation backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("image {0} not found")]
    NotFound(ImageId),
    #[error("invalid upload {}: {reason}", .path.display())]
    InvalidUpload { path: PathBuf, reason: String },
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed store index: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("background task failed: {0}")]
    Task(String),
}

impl StoreError {
    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// An annotation as the backend stores it.
///
/// The color is optional: rows written by other clients may not carry one,
/// in which case the editor assigns a palette color on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationRow {
    pub start_x: f64,
    pub start_y: f64,
    pub end_x: f64,
    pub end_y: f64,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub color: Option<Color>,
}

impl AnnotationRow {
    /// Converts the row into an editor box, drawing a color from `palette`
    /// when the row has none.
    pub fn into_box(self, palette: &mut Palette) -> BoundingBox {
        let color = self.color.unwrap_or_else(|| palette.next_color());
        BoundingBox::new(
            self.start_x,
            self.start_y,
            self.end_x,
            self.end_y,
            self.label,
            color,
        )
    }
}

impl From<&BoundingBox> for AnnotationRow {
    fn from(bbox: &BoundingBox) -> Self {
        Self {
            start_x: bbox.start_x,
            start_y: bbox.start_y,
            end_x: bbox.end_x,
            end_y: bbox.end_y,
            label: bbox.label.clone(),
            color: Some(bbox.color),
        }
    }
}

/// Listing entry for an image.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageSummary {
    pub id: ImageId,
    pub url: String,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    pub annotation_count: usize,
    pub created_at: DateTime<Utc>,
}

impl ImageSummary {
    /// Record with an empty annotation set, as the editor seeds it on load.
    pub fn to_record(&self) -> ImageRecord {
        ImageRecord::new(self.id.clone(), self.url.clone(), self.file_name.clone())
    }
}

/// One image with its stored annotations.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub summary: ImageSummary,
    pub annotations: Vec<AnnotationRow>,
}

/// Backend operations the editor consumes.
#[async_trait]
pub trait AnnotationBackend: Send + Sync {
    /// All images, oldest first.
    async fn list_images(&self) -> Result<Vec<ImageSummary>, StoreError>;

    /// One image and its annotations.
    async fn get_image(&self, id: &ImageId) -> Result<StoredImage, StoreError>;

    /// Stores a new image file and returns its listing entry.
    async fn upload_image(&self, path: &Path) -> Result<ImageSummary, StoreError>;

    /// Removes an image and all of its annotations.
    async fn delete_image(&self, id: &ImageId) -> Result<(), StoreError>;

    /// Replaces the full annotation set of an image.
    async fn replace_annotations(
        &self,
        id: &ImageId,
        annotations: &[BoundingBox],
    ) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests;
