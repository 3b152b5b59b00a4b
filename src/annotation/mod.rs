//! Annotation data model.
//!
//! This module defines the core types the editor works with:
//! - [`Color`]: RGBA color with hex conversion and the rotating [`Palette`]
//! - [`BoundingBox`]: a labeled rectangle defined by two drag corners
//! - [`ImageRecord`]: one loaded image plus its current annotation set
//! - Export of an annotation set to a normalized JSON document

pub mod bbox;
pub mod color;
pub mod export;
pub mod image;

pub use bbox::{BoundingBox, hit_test};
pub use color::{Color, Palette};
pub use export::{ExportDocument, ExportedBox, export_document, export_file_name};
pub use image::{ImageId, ImageRecord};
