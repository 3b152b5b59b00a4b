//! Bounding-box image annotation editor engine.
//!
//! A front-end (desktop window, web view, test harness) owns an
//! [`AnnotationSession`], forwards pointer and key events to it, and draws
//! the [`RenderPlan`](session::RenderPlan) it returns. The session keeps a
//! per-image undo history, saves every committed change through an
//! [`AnnotationBackend`](store::AnnotationBackend) in the background, and
//! exports annotation sets as JSON.

pub mod annotation;
pub mod config;
pub mod history;
pub mod input;
pub mod session;
pub mod stats;
pub mod store;
pub mod suggest;
pub mod util;

pub use config::Config;
pub use session::AnnotationSession;
