use super::{AnnotationBackend, AnnotationRow, ImageSummary, StoreError, StoredImage};
use crate::annotation::{BoundingBox, ImageId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use fs2::FileExt;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const CURRENT_VERSION: u32 = 1;
const INDEX_FILE: &str = "index.json";
const LOCK_FILE: &str = "index.lock";
const IMAGES_DIR: &str = "images";

/// Directory-backed image and annotation store.
///
/// Layout:
/// ```text
/// <root>/index.json   image rows and their annotations
/// <root>/index.lock   advisory lock guarding index updates
/// <root>/images/      copies of uploaded image files
/// ```
#[derive(Debug, Clone)]
pub struct FileBackend {
    root: PathBuf,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    #[serde(default)]
    images: Vec<ImageRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ImageRow {
    id: ImageId,
    file_name: String,
    stored_name: String,
    width: u32,
    height: u32,
    created_at: DateTime<Utc>,
    #[serde(default)]
    annotations: Vec<AnnotationRow>,
}

impl FileBackend {
    /// Opens (without creating) a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    fn summary(&self, row: &ImageRow) -> ImageSummary {
        ImageSummary {
            id: row.id.clone(),
            url: self.images_dir().join(&row.stored_name).display().to_string(),
            file_name: row.file_name.clone(),
            width: row.width,
            height: row.height,
            annotation_count: row.annotations.len(),
            created_at: row.created_at,
        }
    }

    fn ensure_dirs(&self) -> Result<(), StoreError> {
        fs::create_dir_all(self.images_dir()).map_err(|err| {
            StoreError::io(
                format!("failed to create store directory {}", self.root.display()),
                err,
            )
        })
    }

    fn lock(&self, exclusive: bool) -> Result<File, StoreError> {
        self.ensure_dirs()?;
        let lock_path = self.root.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|err| {
                StoreError::io(
                    format!("failed to open store lock file {}", lock_path.display()),
                    err,
                )
            })?;
        let locked = if exclusive {
            FileExt::lock_exclusive(&lock_file)
        } else {
            FileExt::lock_shared(&lock_file)
        };
        locked.map_err(|err| {
            StoreError::io(format!("failed to lock {}", lock_path.display()), err)
        })?;
        Ok(lock_file)
    }

    fn unlock(lock_file: &File) {
        if let Err(err) = FileExt::unlock(lock_file) {
            warn!("failed to unlock store index: {}", err);
        }
    }

    fn read_index(&self) -> Result<IndexFile, StoreError> {
        let path = self.index_path();
        if !path.exists() {
            debug!("No store index at {}, starting empty", path.display());
            return Ok(IndexFile {
                version: CURRENT_VERSION,
                images: Vec::new(),
            });
        }
        let bytes = fs::read(&path)
            .map_err(|err| StoreError::io(format!("failed to read {}", path.display()), err))?;
        let index: IndexFile = serde_json::from_slice(&bytes)?;
        if index.version > CURRENT_VERSION {
            warn!(
                "Store index version {} is newer than supported version {}",
                index.version, CURRENT_VERSION
            );
        }
        Ok(index)
    }

    fn write_index(&self, index: &IndexFile) -> Result<(), StoreError> {
        let path = self.index_path();
        let tmp_path = self.root.join(format!("{INDEX_FILE}.tmp"));
        let bytes = serde_json::to_vec_pretty(index)?;
        {
            let mut tmp_file = File::create(&tmp_path).map_err(|err| {
                StoreError::io(format!("failed to open {}", tmp_path.display()), err)
            })?;
            tmp_file
                .write_all(&bytes)
                .and_then(|_| tmp_file.sync_all())
                .map_err(|err| StoreError::io("failed to write store index", err))?;
        }
        fs::rename(&tmp_path, &path).map_err(|err| {
            StoreError::io(
                format!(
                    "failed to move {} -> {}",
                    tmp_path.display(),
                    path.display()
                ),
                err,
            )
        })
    }

    /// Runs `read` against the index under a shared lock.
    fn with_index<T>(
        &self,
        read: impl FnOnce(&IndexFile) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let lock_file = self.lock(false)?;
        let result = self.read_index().and_then(|index| read(&index));
        Self::unlock(&lock_file);
        result
    }

    /// Runs `update` against the index under an exclusive lock and writes it
    /// back if `update` succeeds.
    fn update_index<T>(
        &self,
        update: impl FnOnce(&mut IndexFile) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let lock_file = self.lock(true)?;
        let result = self.read_index().and_then(|mut index| {
            let value = update(&mut index)?;
            index.version = CURRENT_VERSION;
            self.write_index(&index)?;
            Ok(value)
        });
        Self::unlock(&lock_file);
        result
    }

    fn list_images_blocking(&self) -> Result<Vec<ImageSummary>, StoreError> {
        self.with_index(|index| Ok(index.images.iter().map(|row| self.summary(row)).collect()))
    }

    fn get_image_blocking(&self, id: &ImageId) -> Result<StoredImage, StoreError> {
        self.with_index(|index| {
            let row = index
                .images
                .iter()
                .find(|row| &row.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            Ok(StoredImage {
                summary: self.summary(row),
                annotations: row.annotations.clone(),
            })
        })
    }

    fn upload_image_blocking(&self, source: &Path) -> Result<ImageSummary, StoreError> {
        let file_name = source
            .file_name()
            .and_then(|name| name.to_str())
            .map(str::to_string)
            .ok_or_else(|| StoreError::InvalidUpload {
                path: source.to_path_buf(),
                reason: "path has no file name".to_string(),
            })?;
        if !source.is_file() {
            return Err(StoreError::InvalidUpload {
                path: source.to_path_buf(),
                reason: "not a regular file".to_string(),
            });
        }

        let (width, height) = image::image_dimensions(source).unwrap_or_else(|err| {
            debug!("Could not read dimensions of {}: {}", source.display(), err);
            (0, 0)
        });

        let id = ImageId::new(Uuid::new_v4().to_string());
        let stored_name = match source.extension().and_then(|ext| ext.to_str()) {
            Some(ext) => format!("{id}.{ext}"),
            None => id.to_string(),
        };

        self.ensure_dirs()?;
        let target = self.images_dir().join(&stored_name);
        fs::copy(source, &target).map_err(|err| {
            StoreError::io(
                format!(
                    "failed to copy {} -> {}",
                    source.display(),
                    target.display()
                ),
                err,
            )
        })?;

        let row = ImageRow {
            id,
            file_name,
            stored_name,
            width,
            height,
            created_at: Utc::now(),
            annotations: Vec::new(),
        };
        let summary = self.summary(&row);
        let indexed = self.update_index(|index| {
            index.images.push(row);
            Ok(())
        });
        if let Err(err) = indexed {
            if let Err(remove_err) = fs::remove_file(&target) {
                warn!(
                    "failed to remove unindexed copy {}: {}",
                    target.display(),
                    remove_err
                );
            }
            return Err(err);
        }

        info!("Stored image {} as {}", summary.file_name, summary.id);
        Ok(summary)
    }

    fn delete_image_blocking(&self, id: &ImageId) -> Result<(), StoreError> {
        let removed = self.update_index(|index| {
            let position = index
                .images
                .iter()
                .position(|row| &row.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            Ok(index.images.remove(position))
        })?;

        let file = self.images_dir().join(&removed.stored_name);
        if let Err(err) = fs::remove_file(&file) {
            warn!("failed to remove image file {}: {}", file.display(), err);
        }
        info!("Deleted image {} ({})", removed.file_name, id);
        Ok(())
    }

    fn replace_annotations_blocking(
        &self,
        id: &ImageId,
        rows: Vec<AnnotationRow>,
    ) -> Result<(), StoreError> {
        let count = rows.len();
        self.update_index(|index| {
            let row = index
                .images
                .iter_mut()
                .find(|row| &row.id == id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            row.annotations = rows;
            Ok(())
        })?;
        debug!("Saved {} annotations for image {}", count, id);
        Ok(())
    }
}

/// Runs blocking filesystem work off the async executor.
async fn blocking<T, F>(work: F) -> Result<T, StoreError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, StoreError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| StoreError::Task(err.to_string()))?
}

#[async_trait]
impl AnnotationBackend for FileBackend {
    async fn list_images(&self) -> Result<Vec<ImageSummary>, StoreError> {
        let backend = self.clone();
        blocking(move || backend.list_images_blocking()).await
    }

    async fn get_image(&self, id: &ImageId) -> Result<StoredImage, StoreError> {
        let backend = self.clone();
        let id = id.clone();
        blocking(move || backend.get_image_blocking(&id)).await
    }

    async fn upload_image(&self, path: &Path) -> Result<ImageSummary, StoreError> {
        let backend = self.clone();
        let path = path.to_path_buf();
        blocking(move || backend.upload_image_blocking(&path)).await
    }

    async fn delete_image(&self, id: &ImageId) -> Result<(), StoreError> {
        let backend = self.clone();
        let id = id.clone();
        blocking(move || backend.delete_image_blocking(&id)).await
    }

    async fn replace_annotations(
        &self,
        id: &ImageId,
        annotations: &[BoundingBox],
    ) -> Result<(), StoreError> {
        let backend = self.clone();
        let id = id.clone();
        let rows: Vec<AnnotationRow> = annotations.iter().map(AnnotationRow::from).collect();
        blocking(move || backend.replace_annotations_blocking(&id, rows)).await
    }
}
