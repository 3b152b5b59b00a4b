use super::AnnotationSession;
use crate::annotation::BoundingBox;
use crate::input::{EditorCommand, Key, MouseButton};
use crate::store::Notice;
use crate::suggest::{Detector, detections_to_boxes};
use log::{debug, info, warn};

impl AnnotationSession {
    /// Commits `annotations` as the new state of the current image.
    ///
    /// Records a history snapshot, updates the image record and dispatches a
    /// background save. Does nothing without a current image or when the set
    /// is unchanged. Returns whether a mutation was recorded.
    pub fn set_annotations(&mut self, annotations: Vec<BoundingBox>) -> bool {
        let Some(index) = self.current else {
            debug!("set_annotations: no current image");
            return false;
        };
        let id = self.images[index].id.clone();

        if !self.history.record_mutation(&id, annotations.clone()) {
            return false;
        }
        self.images[index].annotations = annotations.clone();
        self.input.needs_redraw = true;
        self.saver.dispatch(id, annotations);
        true
    }

    /// Removes the box at `index` from the current image.
    pub fn delete_annotation(&mut self, index: usize) -> bool {
        let annotations = self.annotations();
        if index >= annotations.len() {
            debug!("delete_annotation: index {} out of range", index);
            return false;
        }
        let mut next = annotations.to_vec();
        next.remove(index);
        self.input.clear_selection();
        self.set_annotations(next)
    }

    /// Renames the box at `index`. A blank label becomes the default label.
    pub fn update_label(&mut self, index: usize, label: &str) -> bool {
        let annotations = self.annotations();
        if index >= annotations.len() {
            debug!("update_label: index {} out of range", index);
            return false;
        }
        let label = match label.trim() {
            "" => self.input.default_label.clone(),
            trimmed => trimmed.to_string(),
        };
        let mut next = annotations.to_vec();
        next[index].label = label;
        self.set_annotations(next)
    }

    /// Steps the current image one snapshot back and saves the result.
    pub fn undo(&mut self) -> bool {
        let Some(index) = self.current else {
            return false;
        };
        let id = self.images[index].id.clone();
        let Some(snapshot) = self.history.undo(&id).map(<[BoundingBox]>::to_vec) else {
            return false;
        };
        self.show_snapshot(index, snapshot);
        true
    }

    /// Steps the current image one snapshot forward and saves the result.
    pub fn redo(&mut self) -> bool {
        let Some(index) = self.current else {
            return false;
        };
        let id = self.images[index].id.clone();
        let Some(snapshot) = self.history.redo(&id).map(<[BoundingBox]>::to_vec) else {
            return false;
        };
        self.show_snapshot(index, snapshot);
        true
    }

    /// Saves the current annotation set without recording history.
    pub fn save(&mut self) {
        let Some(image) = self.current_image() else {
            return;
        };
        let id = image.id.clone();
        let annotations = image.annotations.clone();
        self.saver.dispatch(id, annotations);
    }

    /// Appends externally produced boxes as a single mutation.
    pub fn apply_suggestions(&mut self, boxes: Vec<BoundingBox>) -> bool {
        if boxes.is_empty() || self.current.is_none() {
            return false;
        }
        let count = boxes.len();
        let mut next = self.annotations().to_vec();
        next.extend(boxes);
        let applied = self.set_annotations(next);
        if applied {
            self.notify(Notice::Info(format!("Added {count} suggested boxes")));
        }
        applied
    }

    /// Runs `detector` on the current image and applies the detections at or
    /// above `[suggest] min_confidence`.
    ///
    /// Returns the number of boxes added.
    pub async fn suggest_with(&mut self, detector: &dyn Detector) -> usize {
        let Some(url) = self.current_image().map(|image| image.url.clone()) else {
            return 0;
        };

        let detections = match detector.detect(&url).await {
            Ok(detections) => detections,
            Err(err) => {
                warn!("Auto-annotation failed for {}: {}", url, err);
                self.notify(Notice::Error("Auto-annotation failed".to_string()));
                return 0;
            }
        };

        let (width, height) = self.canvas_size();
        let boxes = detections_to_boxes(
            &detections,
            f64::from(width),
            f64::from(height),
            self.input.palette_mut(),
            self.min_confidence,
        );
        let count = boxes.len();
        info!("Detector proposed {} boxes ({} kept)", detections.len(), count);
        if self.apply_suggestions(boxes) { count } else { 0 }
    }

    pub fn on_pointer_down(&mut self, button: MouseButton, x: f64, y: f64) {
        let Some(index) = self.current else {
            return;
        };
        self.input
            .on_mouse_press(button, x, y, &self.images[index].annotations);
    }

    pub fn on_pointer_move(&mut self, x: f64, y: f64) {
        if self.current.is_some() {
            self.input.on_mouse_motion(x, y);
        }
    }

    pub fn on_pointer_up(&mut self, button: MouseButton, x: f64, y: f64) {
        let Some(index) = self.current else {
            return;
        };
        let command = self
            .input
            .on_mouse_release(button, x, y, &self.images[index].annotations);
        if let Some(command) = command {
            self.apply_command(command);
        }
    }

    pub fn on_key_press(&mut self, key: Key) {
        let command = match self.current {
            Some(index) => self.input.on_key_press(key, &self.images[index].annotations),
            None => self.input.on_key_press(key, &[]),
        };
        if let Some(command) = command {
            self.apply_command(command);
        }
    }

    pub fn on_key_release(&mut self, key: Key) {
        self.input.on_key_release(key);
    }

    /// Carries out a command produced by the input state machine.
    pub fn apply_command(&mut self, command: EditorCommand) {
        match command {
            EditorCommand::SetAnnotations(annotations) => {
                self.set_annotations(annotations);
            }
            EditorCommand::Undo => {
                self.undo();
            }
            EditorCommand::Redo => {
                self.redo();
            }
            EditorCommand::Save => self.save(),
            EditorCommand::Export => {
                self.pending_export = self.export_document();
                if self.pending_export.is_none() {
                    debug!("Export requested without a current image");
                }
            }
        }
    }

    fn show_snapshot(&mut self, index: usize, snapshot: Vec<BoundingBox>) {
        let id = self.images[index].id.clone();
        self.images[index].annotations = snapshot.clone();
        self.input.reset();
        self.saver.dispatch(id, snapshot);
    }
}
