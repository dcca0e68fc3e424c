use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::OnceLock;

// Image formats the converters and the sync step recognize
pub const IMG_FORMATS: &[&str] = &[
    "bmp", "dng", "jpeg", "jpg", "mpo", "png", "tif", "tiff", "webp", "pfm",
];

pub static IMAGE_EXTENSIONS_SET: OnceLock<HashSet<String>> = OnceLock::new();

/// Lowercased image extensions for fast lookup
pub fn image_extensions_set() -> &'static HashSet<String> {
    IMAGE_EXTENSIONS_SET.get_or_init(|| IMG_FORMATS.iter().map(|ext| ext.to_lowercase()).collect())
}

/// Shape type tag consumed by the converters; everything else is ignored.
pub const SHAPE_TYPE_RECTANGLE: &str = "rectangle";

/// One annotated region within an image.
///
/// Rectangles carry exactly two corner points in pixel coordinates. The
/// corners are not required to be ordered; min/max is always computed.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Shape {
    pub label: String,
    pub points: Vec<(f64, f64)>,
    pub group_id: Option<i64>,
    pub shape_type: String,
    pub description: Option<String>,
}

/// Annotation record for one source image, as written by LabelMe.
///
/// Fields this tool does not consume (`imageData`, `flags`, ...) are accepted
/// and ignored on deserialization.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnnotation {
    #[serde(default)]
    pub version: String,
    pub shapes: Vec<Shape>,
    pub image_path: String,
    pub image_height: u32,
    pub image_width: u32,
}

impl ImageAnnotation {
    /// Rectangle shapes, in annotation order. Other shape types are ignored.
    pub fn rectangles(&self) -> impl Iterator<Item = &Shape> {
        self.shapes
            .iter()
            .filter(|shape| shape.shape_type == SHAPE_TYPE_RECTANGLE)
    }
}

/// A parsed annotation record together with the JSON file it came from.
/// The source path anchors relative image paths and ties a record to its
/// split assignment.
pub type SourcedAnnotation = (PathBuf, ImageAnnotation);

/// Disjoint train/val partition of the parsed records.
pub struct SplitData {
    pub train_annotations: Vec<SourcedAnnotation>,
    pub val_annotations: Vec<SourcedAnnotation>,
}

impl SplitData {
    pub fn total(&self) -> usize {
        self.train_annotations.len() + self.val_annotations.len()
    }
}

/// Per-run counters. Every failure mode degrades to skip-and-count; the
/// summary is the only partial-success report a run produces.
#[derive(Debug, Default, Clone)]
pub struct ConversionStats {
    pub records_seen: usize,
    pub records_converted: usize,
    pub skipped_parse_error: usize,
    pub skipped_missing_image: usize,
    pub skipped_no_boxes: usize,
    pub boxes_written: usize,
    pub boxes_dropped_unknown_label: usize,
}

impl ConversionStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn print_summary(&self) {
        log::info!("=== Conversion Summary ===");
        log::info!("Records seen: {}", self.records_seen);
        log::info!("Records converted: {}", self.records_converted);
        log::info!("Boxes written: {}", self.boxes_written);
        if self.skipped_parse_error > 0 {
            log::warn!(
                "Skipped (unreadable/malformed JSON): {}",
                self.skipped_parse_error
            );
        }
        if self.skipped_missing_image > 0 {
            log::warn!("Skipped (image not found): {}", self.skipped_missing_image);
        }
        if self.skipped_no_boxes > 0 {
            log::info!("Skipped (no qualifying boxes): {}", self.skipped_no_boxes);
        }
        if self.boxes_dropped_unknown_label > 0 {
            log::warn!(
                "Boxes dropped (label not in class map): {}",
                self.boxes_dropped_unknown_label
            );
        }
    }
}
