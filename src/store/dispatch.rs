//! Background saves with failure notices.

use super::AnnotationBackend;
use crate::annotation::{BoundingBox, ImageId};
use log::{debug, warn};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::oneshot;

/// Message shown to the user outside the canvas (toast, status line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Error(String),
}

impl Notice {
    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }

    pub fn message(&self) -> &str {
        match self {
            Notice::Info(message) | Notice::Error(message) => message,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::Info(message) => write!(f, "{message}"),
            Notice::Error(message) => write!(f, "error: {message}"),
        }
    }
}

pub const SAVE_FAILED: &str = "Failed to save annotations";

enum Job {
    Save {
        id: ImageId,
        annotations: Vec<BoundingBox>,
    },
    Flush(oneshot::Sender<()>),
}

/// Runs full-overwrite saves in the background.
///
/// [`dispatch`](Self::dispatch) returns immediately; a worker task on the
/// runtime performs the saves one at a time in dispatch order, so the last
/// dispatched set for an image is the one that ends up stored. Saves are
/// never cancelled. A failed save is logged and reported as
/// [`Notice::Error`] on the notice channel; local state is left as is.
pub struct SaveDispatcher {
    backend: Arc<dyn AnnotationBackend>,
    jobs: UnboundedSender<Job>,
    notices: UnboundedSender<Notice>,
    queued: Arc<AtomicUsize>,
}

impl SaveDispatcher {
    /// Starts the save worker on `runtime` and returns the dispatcher with
    /// the receiving end of its notice channel.
    pub fn new(
        backend: Arc<dyn AnnotationBackend>,
        runtime: Handle,
    ) -> (Self, UnboundedReceiver<Notice>) {
        let (notices, notice_rx) = mpsc::unbounded_channel();
        let (jobs, job_rx) = mpsc::unbounded_channel();
        let queued = Arc::new(AtomicUsize::new(0));

        runtime.spawn(run_worker(
            Arc::clone(&backend),
            job_rx,
            notices.clone(),
            Arc::clone(&queued),
        ));

        let dispatcher = Self {
            backend,
            jobs,
            notices,
            queued,
        };
        (dispatcher, notice_rx)
    }

    pub fn backend(&self) -> &Arc<dyn AnnotationBackend> {
        &self.backend
    }

    /// Queues a notice on the same channel save failures use.
    pub fn notify(&self, notice: Notice) {
        if self.notices.send(notice).is_err() {
            debug!("Notice receiver dropped; discarding notice");
        }
    }

    /// Queues a save of `annotations` as the full set for `id`.
    pub fn dispatch(&mut self, id: ImageId, annotations: Vec<BoundingBox>) {
        self.queued.fetch_add(1, Ordering::SeqCst);
        if self.jobs.send(Job::Save { id, annotations }).is_err() {
            self.queued.fetch_sub(1, Ordering::SeqCst);
            warn!("Save worker has stopped; dropping save");
            self.notify(Notice::Error(SAVE_FAILED.to_string()));
        }
    }

    /// Number of saves queued and not yet finished.
    pub fn in_flight(&self) -> usize {
        self.queued.load(Ordering::SeqCst)
    }

    /// Waits until every save dispatched so far has finished.
    pub async fn flush(&mut self) {
        let (done, wait) = oneshot::channel();
        if self.jobs.send(Job::Flush(done)).is_err() {
            return;
        }
        if wait.await.is_err() {
            warn!("Save worker stopped before flushing");
        }
    }
}

async fn run_worker(
    backend: Arc<dyn AnnotationBackend>,
    mut jobs: UnboundedReceiver<Job>,
    notices: UnboundedSender<Notice>,
    queued: Arc<AtomicUsize>,
) {
    while let Some(job) = jobs.recv().await {
        match job {
            Job::Save { id, annotations } => {
                match backend.replace_annotations(&id, &annotations).await {
                    Ok(()) => debug!("Saved {} annotations for {}", annotations.len(), id),
                    Err(err) => {
                        warn!("Failed to save annotations for {}: {}", id, err);
                        let _ = notices.send(Notice::Error(SAVE_FAILED.to_string()));
                    }
                }
                queued.fetch_sub(1, Ordering::SeqCst);
            }
            Job::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Save worker finished");
}

impl fmt::Debug for SaveDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaveDispatcher")
            .field("queued", &self.in_flight())
            .finish_non_exhaustive()
    }
}
