//! Editing session: the state object a front-end drives.
//!
//! An [`AnnotationSession`] owns the loaded images, which one is current, the
//! per-image undo history, the gesture state machine, and the background save
//! pipeline. Front-ends forward pointer and key events, read back a
//! [`RenderPlan`], and drain [`Notice`]s for display.

mod editing;
mod images;

use crate::annotation::{BoundingBox, ExportDocument, ImageRecord, export_document};
use crate::config::Config;
use crate::history::HistoryManager;
use crate::input::{InputState, LabelPrompt, RenderItem};
use crate::store::{AnnotationBackend, Notice, SaveDispatcher};
use anyhow::{Result, anyhow};
use log::debug;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;

/// Everything needed to draw the current image.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub image_url: String,
    /// Draw list, bottom to top
    pub items: Vec<RenderItem>,
    pub label_prompt: Option<LabelPrompt>,
    pub can_undo: bool,
    pub can_redo: bool,
}

pub struct AnnotationSession {
    images: Vec<ImageRecord>,
    current: Option<usize>,
    history: HistoryManager,
    input: InputState,
    saver: SaveDispatcher,
    notices: UnboundedReceiver<Notice>,
    canvas_width: u32,
    canvas_height: u32,
    pending_export: Option<ExportDocument>,
    /// Detections below this confidence are not suggested
    min_confidence: f64,
}

impl AnnotationSession {
    /// Creates an empty session saving through `backend` on `runtime`.
    pub fn new(config: &Config, backend: Arc<dyn AnnotationBackend>, runtime: Handle) -> Result<Self> {
        let input = InputState::from_config(config)
            .map_err(|err| anyhow!("invalid keybindings: {err}"))?;
        let (saver, notices) = SaveDispatcher::new(backend, runtime);

        Ok(Self {
            images: Vec::new(),
            current: None,
            history: HistoryManager::with_limit(config.history.max_snapshots),
            input,
            saver,
            notices,
            canvas_width: config.canvas.width,
            canvas_height: config.canvas.height,
            pending_export: None,
            min_confidence: config.suggest.min_confidence,
        })
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current_image(&self) -> Option<&ImageRecord> {
        self.current.and_then(|index| self.images.get(index))
    }

    /// Annotation set of the current image (empty without one).
    pub fn annotations(&self) -> &[BoundingBox] {
        self.current_image()
            .map(|image| image.annotations.as_slice())
            .unwrap_or(&[])
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    pub fn can_undo(&self) -> bool {
        self.current_image()
            .is_some_and(|image| self.history.can_undo(&image.id))
    }

    pub fn can_redo(&self) -> bool {
        self.current_image()
            .is_some_and(|image| self.history.can_redo(&image.id))
    }

    /// Export document for the current image.
    pub fn export_document(&self) -> Option<ExportDocument> {
        self.current_image()
            .map(|image| export_document(image, self.canvas_width, self.canvas_height))
    }

    /// Pretty-printed export JSON for the current image.
    pub fn export_json(&self) -> Option<serde_json::Result<String>> {
        self.export_document()
            .map(|document| crate::annotation::export::to_json(&document))
    }

    /// Takes the export requested through the export shortcut, if any.
    pub fn take_export(&mut self) -> Option<ExportDocument> {
        self.pending_export.take()
    }

    /// Returns every queued notice, oldest first.
    pub fn drain_notices(&mut self) -> Vec<Notice> {
        let mut drained = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            drained.push(notice);
        }
        drained
    }

    /// Waits for all background saves spawned so far.
    pub async fn flush_saves(&mut self) {
        self.saver.flush().await;
    }

    /// Draw plan for the current image; `None` when there is nothing to draw.
    pub fn render_plan(&self) -> Option<RenderPlan> {
        let Some(image) = self.current_image() else {
            debug!("No current image; skipping render");
            return None;
        };
        Some(RenderPlan {
            image_url: image.url.clone(),
            items: self.input.render_items(&image.annotations),
            label_prompt: self.input.label_prompt(),
            can_undo: self.history.can_undo(&image.id),
            can_redo: self.history.can_redo(&image.id),
        })
    }

    fn notify(&self, notice: Notice) {
        self.saver.notify(notice);
    }
}

impl std::fmt::Debug for AnnotationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationSession")
            .field("images", &self.images.len())
            .field("current", &self.current)
            .field("saver", &self.saver)
            .finish_non_exhaustive()
    }
}
