use crate::class_map::ClassMap;
use crate::types::{ImageAnnotation, Shape};

/// Axis-aligned pixel-space bounding box, top-left anchored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelBox {
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Bounding box of a rectangle shape's corner points.
///
/// The corners need not be ordered; the fold takes min/max, so swapping the
/// two points yields the identical box and width/height are never negative.
/// Returns `None` for malformed shapes with fewer than two points.
pub fn rectangle_bbox(shape: &Shape) -> Option<PixelBox> {
    if shape.points.len() < 2 {
        return None;
    }
    let (x_min, y_min, x_max, y_max) = shape.points.iter().fold(
        (f64::MAX, f64::MAX, f64::MIN, f64::MIN),
        |(x_min, y_min, x_max, y_max), &(x, y)| {
            (x_min.min(x), y_min.min(y), x_max.max(x), y_max.max(y))
        },
    );
    Some(PixelBox {
        x: x_min,
        y: y_min,
        width: x_max - x_min,
        height: y_max - y_min,
    })
}

/// One YOLO label line: class id followed by center/extent coordinates
/// normalized by the image dimensions, 6 decimal digits.
pub fn yolo_line(class_id: usize, bbox: &PixelBox, image_width: u32, image_height: u32) -> String {
    let x_center = (bbox.x + bbox.width / 2.0) / image_width as f64;
    let y_center = (bbox.y + bbox.height / 2.0) / image_height as f64;
    let width = bbox.width / image_width as f64;
    let height = bbox.height / image_height as f64;

    format!(
        "{} {:.6} {:.6} {:.6} {:.6}\n",
        class_id, x_center, y_center, width, height
    )
}

/// Convert one record's rectangle shapes to YOLO label text.
///
/// Boxes whose label has no class id are dropped without a warning; the
/// caller surfaces the aggregate count. Returns the text and the counts of
/// written and dropped boxes.
pub fn convert_to_yolo_format(
    annotation: &ImageAnnotation,
    class_map: &ClassMap,
) -> (String, usize, usize) {
    let mut yolo_data = String::with_capacity(annotation.shapes.len() * 48);
    let mut written = 0;
    let mut dropped = 0;

    for shape in annotation.rectangles() {
        let Some(bbox) = rectangle_bbox(shape) else {
            continue;
        };
        match class_map.resolve(&shape.label) {
            Some(class_id) => {
                yolo_data.push_str(&yolo_line(
                    class_id,
                    &bbox,
                    annotation.image_width,
                    annotation.image_height,
                ));
                written += 1;
            }
            None => dropped += 1,
        }
    }

    (yolo_data, written, dropped)
}
