//! Aggregate counts over the loaded images.

use crate::annotation::ImageRecord;
use crate::session::AnnotationSession;
use std::collections::HashMap;
use std::fmt;

/// Image, box and per-label counts.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionStats {
    pub total_images: usize,
    pub total_boxes: usize,
    /// Images with at least one box
    pub annotated_images: usize,
    /// `(label, count)`, most frequent first, ties by label
    pub labels: Vec<(String, usize)>,
}

impl SessionStats {
    pub fn from_session(session: &AnnotationSession) -> Self {
        Self::from_images(session.images())
    }

    pub fn from_images(images: &[ImageRecord]) -> Self {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut total_boxes = 0;
        let mut annotated_images = 0;

        for image in images {
            if !image.annotations.is_empty() {
                annotated_images += 1;
            }
            for bbox in &image.annotations {
                total_boxes += 1;
                *counts.entry(bbox.label.as_str()).or_default() += 1;
            }
        }

        let mut labels: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(label, count)| (label.to_string(), count))
            .collect();
        labels.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

        Self {
            total_images: images.len(),
            total_boxes,
            annotated_images,
            labels,
        }
    }

    /// Mean boxes per image (0 for no images).
    pub fn average_boxes(&self) -> f64 {
        if self.total_images == 0 {
            0.0
        } else {
            self.total_boxes as f64 / self.total_images as f64
        }
    }
}

impl fmt::Display for SessionStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Images:           {}", self.total_images)?;
        writeln!(f, "Annotated images: {}", self.annotated_images)?;
        writeln!(f, "Boxes:            {}", self.total_boxes)?;
        writeln!(f, "Boxes per image:  {:.2}", self.average_boxes())?;
        if !self.labels.is_empty() {
            writeln!(f, "Labels:")?;
            for (label, count) in &self.labels {
                writeln!(f, "  {label}: {count}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::color::RED;
    use crate::annotation::{BoundingBox, ImageId};

    fn image(id: &str, labels: &[&str]) -> ImageRecord {
        let mut record = ImageRecord::new(ImageId::from(id), format!("/{id}"), id);
        record.annotations = labels
            .iter()
            .map(|label| BoundingBox::new(0.0, 0.0, 1.0, 1.0, *label, RED))
            .collect();
        record
    }

    #[test]
    fn counts_and_orders_labels() {
        let stats = SessionStats::from_images(&[
            image("a", &["dog", "cat", "dog"]),
            image("b", &[]),
            image("c", &["bird", "cat", "ant"]),
        ]);
        assert_eq!(stats.total_images, 3);
        assert_eq!(stats.annotated_images, 2);
        assert_eq!(stats.total_boxes, 6);
        assert_eq!(
            stats.labels,
            vec![
                ("cat".to_string(), 2),
                ("dog".to_string(), 2),
                ("ant".to_string(), 1),
                ("bird".to_string(), 1),
            ]
        );
        assert_eq!(stats.average_boxes(), 2.0);
    }

    #[test]
    fn empty_input_has_zero_average() {
        let stats = SessionStats::from_images(&[]);
        assert_eq!(stats, SessionStats::default());
        assert_eq!(stats.average_boxes(), 0.0);
        assert!(stats.to_string().contains("Images:           0"));
    }
}
