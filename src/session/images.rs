use super::AnnotationSession;
use crate::annotation::{BoundingBox, ImageId};
use crate::history::HistoryEntry;
use crate::store::{Notice, StoreError};
use log::{debug, info, warn};
use std::path::Path;
use std::sync::Arc;

impl AnnotationSession {
    /// Replaces the image list with the backend's listing.
    ///
    /// Every image gets an empty history; the first image (if any) becomes
    /// current and its stored annotations are fetched. Returns the number of
    /// images loaded.
    pub async fn load_images(&mut self) -> Result<usize, StoreError> {
        let backend = Arc::clone(self.saver.backend());
        let summaries = match backend.list_images().await {
            Ok(summaries) => summaries,
            Err(err) => {
                warn!("Failed to load images: {}", err);
                self.notify(Notice::Error("Failed to load images".to_string()));
                return Err(err);
            }
        };

        self.images = summaries.iter().map(|summary| summary.to_record()).collect();
        self.history = crate::history::HistoryManager::with_limit(self.history_limit());
        for image in &self.images {
            self.history.initialize_history(&image.id, Vec::new());
        }
        self.current = None;
        self.input.reset();
        info!("Loaded {} images", self.images.len());

        if !self.images.is_empty() {
            self.select_image(0).await;
        }
        Ok(self.images.len())
    }

    /// Uploads the file at `path` and makes it the current image.
    pub async fn add_image(&mut self, path: &Path) -> Result<ImageId, StoreError> {
        let backend = Arc::clone(self.saver.backend());
        let summary = match backend.upload_image(path).await {
            Ok(summary) => summary,
            Err(err) => {
                warn!("Failed to upload {}: {}", path.display(), err);
                self.notify(Notice::Error("Failed to upload image".to_string()));
                return Err(err);
            }
        };

        let record = summary.to_record();
        let id = record.id.clone();
        self.history.reset_history(&id, Vec::new());
        self.images.push(record);
        self.current = Some(self.images.len() - 1);
        self.input.reset();

        self.notify(Notice::Info(format!("Added: {}", summary.file_name)));
        Ok(id)
    }

    /// Makes the image at `index` current.
    ///
    /// Stored annotations are fetched from the backend. They seed the image's
    /// history only while that history holds nothing but its initial
    /// snapshot; once the image has been edited locally, its undo stack is
    /// kept as is. A failed fetch is reported as a notice and the switch
    /// happens anyway. Out-of-range indices are ignored.
    pub async fn select_image(&mut self, index: usize) {
        let Some(id) = self.images.get(index).map(|image| image.id.clone()) else {
            debug!("select_image: no image at index {}", index);
            return;
        };

        let backend = Arc::clone(self.saver.backend());
        match backend.get_image(&id).await {
            Ok(stored) => {
                if self.history_is_pristine(&id) {
                    let palette = self.input.palette_mut();
                    let annotations: Vec<BoundingBox> = stored
                        .annotations
                        .into_iter()
                        .map(|row| row.into_box(palette))
                        .collect();
                    debug!("Seeding {} with {} stored annotations", id, annotations.len());
                    self.history.reset_history(&id, annotations);
                } else {
                    debug!("Keeping local history for {}", id);
                }
            }
            Err(err) => {
                warn!("Failed to load annotations for {}: {}", id, err);
                self.notify(Notice::Error("Failed to load annotations".to_string()));
                self.history.initialize_history(&id, self.images[index].annotations.clone());
            }
        }

        if let Some(current) = self.history.current(&id) {
            self.images[index].annotations = current.to_vec();
        }
        self.current = Some(index);
        self.input.reset();
    }

    /// Deletes the image at `index` from the backend and the session.
    ///
    /// Deleting the current image moves to the image now at the same
    /// position (or the new last one); deleting an earlier image keeps the
    /// same image current.
    pub async fn delete_image(&mut self, index: usize) -> Result<(), StoreError> {
        let Some(id) = self.images.get(index).map(|image| image.id.clone()) else {
            debug!("delete_image: no image at index {}", index);
            return Ok(());
        };

        let backend = Arc::clone(self.saver.backend());
        if let Err(err) = backend.delete_image(&id).await {
            warn!("Failed to delete image {}: {}", id, err);
            self.notify(Notice::Error("Failed to delete image".to_string()));
            return Err(err);
        }

        let removed = self.images.remove(index);
        self.history.discard_history(&removed.id);

        self.current = match self.current {
            Some(current) if current == index => {
                if self.images.is_empty() {
                    None
                } else {
                    Some(index.min(self.images.len() - 1))
                }
            }
            Some(current) if index < current => Some(current - 1),
            other => other,
        };
        self.input.reset();

        self.notify(Notice::Info(format!("Deleted: {}", removed.file_name)));
        Ok(())
    }

    fn history_is_pristine(&self, id: &ImageId) -> bool {
        self.history
            .entry(id)
            .is_none_or(HistoryEntry::is_pristine)
    }

    fn history_limit(&self) -> usize {
        self.history.max_snapshots()
    }
}
