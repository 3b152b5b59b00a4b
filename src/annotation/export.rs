//! JSON export of an image's annotation set.

use super::bbox::BoundingBox;
use super::image::ImageRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const FALLBACK_FILE_NAME: &str = "image.jpg";

/// Top-level export document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub image: ExportedImage,
    pub annotations: Vec<ExportedBox>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedImage {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

/// A box in min-corner/absolute-size form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedBox {
    /// 1-based position in the annotation set
    pub id: usize,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl From<(usize, &BoundingBox)> for ExportedBox {
    fn from((index, bbox): (usize, &BoundingBox)) -> Self {
        let rect = bbox.rect();
        Self {
            id: index + 1,
            label: bbox.label.clone(),
            x: rect.x,
            y: rect.y,
            width: rect.width,
            height: rect.height,
        }
    }
}

/// Builds the export document for an image, using the canvas size as the
/// reported image dimensions (box coordinates are canvas pixels).
pub fn export_document(image: &ImageRecord, canvas_width: u32, canvas_height: u32) -> ExportDocument {
    let file_name = if image.file_name.is_empty() {
        FALLBACK_FILE_NAME.to_string()
    } else {
        image.file_name.clone()
    };

    ExportDocument {
        image: ExportedImage {
            file_name,
            width: canvas_width,
            height: canvas_height,
        },
        annotations: image
            .annotations
            .iter()
            .enumerate()
            .map(ExportedBox::from)
            .collect(),
    }
}

/// Serializes the export document as pretty-printed JSON.
pub fn to_json(document: &ExportDocument) -> serde_json::Result<String> {
    serde_json::to_string_pretty(document)
}

/// Download file name for an export taken at `now`, e.g.
/// `annotations_2024-05-01T12-30-00.json`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("annotations_{}.json", now.format("%Y-%m-%dT%H-%M-%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::color::RED;
    use crate::annotation::image::ImageId;
    use chrono::TimeZone;

    fn image_with(boxes: Vec<BoundingBox>) -> ImageRecord {
        let mut image = ImageRecord::new(ImageId::from("img-1"), "/uploads/cat.png", "cat.png");
        image.annotations = boxes;
        image
    }

    #[test]
    fn export_normalizes_reversed_corners() {
        let image = image_with(vec![BoundingBox::new(50.0, 80.0, 10.0, 20.0, "cat", RED)]);
        let doc = export_document(&image, 800, 600);
        assert_eq!(
            doc.annotations,
            vec![ExportedBox {
                id: 1,
                label: "cat".into(),
                x: 10.0,
                y: 20.0,
                width: 40.0,
                height: 60.0,
            }]
        );
        assert_eq!(doc.image.width, 800);
        assert_eq!(doc.image.file_name, "cat.png");
    }

    #[test]
    fn export_json_uses_camel_case_image_fields() {
        let mut image = image_with(Vec::new());
        image.file_name.clear();
        let json = to_json(&export_document(&image, 800, 600)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["image"]["fileName"], FALLBACK_FILE_NAME);
        assert!(value["annotations"].as_array().unwrap().is_empty());
    }

    #[test]
    fn export_file_name_replaces_colons() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 0).unwrap();
        assert_eq!(export_file_name(now), "annotations_2024-05-01T12-30-00.json");
    }
}
