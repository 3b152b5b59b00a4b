//! Per-image undo/redo history.
//!
//! Every loaded image owns an independent, linear history of annotation-set
//! snapshots plus a cursor. Entries are created when an image is loaded or
//! added and dropped when the image is deleted, so switching between images
//! never disturbs another image's undo stack.

use crate::annotation::{BoundingBox, ImageId};
use log::debug;
use std::collections::HashMap;

/// Undo/redo log for a single image.
///
/// Invariant: `history_index < history.len()`, and `history[history_index]`
/// is the annotation set currently displayed for the image.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    history: Vec<Vec<BoundingBox>>,
    history_index: usize,
    /// Set by the first recorded mutation; a capped log can drop the seed
    /// snapshot, so its length says nothing about edits.
    edited: bool,
}

impl HistoryEntry {
    /// Creates a single-snapshot history.
    pub fn new(seed: Vec<BoundingBox>) -> Self {
        Self {
            history: vec![seed],
            history_index: 0,
            edited: false,
        }
    }

    /// True until a mutation is recorded. Undoing back to the seed does not
    /// make the entry pristine again.
    pub fn is_pristine(&self) -> bool {
        !self.edited
    }

    /// Snapshot under the cursor.
    pub fn current(&self) -> &[BoundingBox] {
        &self.history[self.history_index]
    }

    pub fn history(&self) -> &[Vec<BoundingBox>] {
        &self.history
    }

    pub fn history_index(&self) -> usize {
        self.history_index
    }

    pub fn can_undo(&self) -> bool {
        self.history_index > 0
    }

    pub fn can_redo(&self) -> bool {
        self.history_index + 1 < self.history.len()
    }

    /// Appends a snapshot after the cursor, discarding the redo branch.
    ///
    /// Returns `false` without touching the log when `snapshot` equals the
    /// current one. When `limit` > 0 the oldest snapshots are dropped so the
    /// log never exceeds `limit` entries.
    fn record(&mut self, snapshot: Vec<BoundingBox>, limit: usize) -> bool {
        if self.current() == snapshot.as_slice() {
            return false;
        }

        self.history.truncate(self.history_index + 1);
        self.history.push(snapshot);
        self.history_index += 1;
        self.edited = true;

        if limit > 0 && self.history.len() > limit {
            let excess = self.history.len() - limit;
            self.history.drain(..excess);
            self.history_index -= excess;
        }
        true
    }

    fn undo(&mut self) -> Option<&[BoundingBox]> {
        if !self.can_undo() {
            return None;
        }
        self.history_index -= 1;
        Some(self.current())
    }

    fn redo(&mut self) -> Option<&[BoundingBox]> {
        if !self.can_redo() {
            return None;
        }
        self.history_index += 1;
        Some(self.current())
    }
}

/// Owns the history entry of every loaded image, keyed by image id.
///
/// Operations on an id with no entry are no-ops: they log at debug level and
/// report "nothing happened" through their return value.
#[derive(Debug, Default)]
pub struct HistoryManager {
    entries: HashMap<ImageId, HistoryEntry>,
    /// Maximum snapshots per image (0 = unlimited)
    max_snapshots: usize,
}

impl HistoryManager {
    /// Creates a manager with unlimited history depth.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a manager that keeps at most `max_snapshots` per image.
    /// Zero means unlimited.
    pub fn with_limit(max_snapshots: usize) -> Self {
        Self {
            entries: HashMap::new(),
            max_snapshots,
        }
    }

    pub fn max_snapshots(&self) -> usize {
        self.max_snapshots
    }

    /// Seeds a single-snapshot history for `id` unless one already exists.
    ///
    /// Returns `true` if a new entry was created. Re-initializing an image
    /// keeps its existing undo stack.
    pub fn initialize_history(&mut self, id: &ImageId, seed: Vec<BoundingBox>) -> bool {
        if self.entries.contains_key(id) {
            debug!("History for image {} already initialized; keeping it", id);
            return false;
        }
        self.entries.insert(id.clone(), HistoryEntry::new(seed));
        true
    }

    /// Replaces any existing history for `id` with a fresh single snapshot.
    pub fn reset_history(&mut self, id: &ImageId, seed: Vec<BoundingBox>) {
        self.entries.insert(id.clone(), HistoryEntry::new(seed));
    }

    /// Drops the history for `id`. Returns the removed entry, if any.
    pub fn discard_history(&mut self, id: &ImageId) -> Option<HistoryEntry> {
        let removed = self.entries.remove(id);
        if removed.is_none() {
            debug!("discard_history: no history for image {}", id);
        }
        removed
    }

    /// Records a new annotation snapshot for `id`.
    ///
    /// Returns `true` if a snapshot was appended; `false` for unknown ids or
    /// when the snapshot equals the current one.
    pub fn record_mutation(&mut self, id: &ImageId, annotations: Vec<BoundingBox>) -> bool {
        let limit = self.max_snapshots;
        match self.entries.get_mut(id) {
            Some(entry) => entry.record(annotations, limit),
            None => {
                debug!("record_mutation: no history for image {}", id);
                false
            }
        }
    }

    /// Steps back one snapshot and returns it, or `None` if nothing to undo.
    pub fn undo(&mut self, id: &ImageId) -> Option<&[BoundingBox]> {
        match self.entries.get_mut(id) {
            Some(entry) => entry.undo(),
            None => {
                debug!("undo: no history for image {}", id);
                None
            }
        }
    }

    /// Steps forward one snapshot and returns it, or `None` if nothing to redo.
    pub fn redo(&mut self, id: &ImageId) -> Option<&[BoundingBox]> {
        match self.entries.get_mut(id) {
            Some(entry) => entry.redo(),
            None => {
                debug!("redo: no history for image {}", id);
                None
            }
        }
    }

    pub fn can_undo(&self, id: &ImageId) -> bool {
        self.entries.get(id).is_some_and(HistoryEntry::can_undo)
    }

    pub fn can_redo(&self, id: &ImageId) -> bool {
        self.entries.get(id).is_some_and(HistoryEntry::can_redo)
    }

    /// Current snapshot for `id`.
    pub fn current(&self, id: &ImageId) -> Option<&[BoundingBox]> {
        self.entries.get(id).map(HistoryEntry::current)
    }

    pub fn entry(&self, id: &ImageId) -> Option<&HistoryEntry> {
        self.entries.get(id)
    }

    pub fn contains(&self, id: &ImageId) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests;
