//! COCO detection-manifest document model.

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::class_map::ClassMap;
use crate::conversion::PixelBox;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub year: u32,
    pub version: String,
    pub description: String,
    pub date_created: String,
}

impl Info {
    pub fn for_split(split: &str) -> Self {
        let today = chrono::Utc::now().date_naive();
        Self {
            year: today.year() as u32,
            version: "1.0".to_string(),
            description: format!("Converted from LabelMe - {}", split),
            date_created: today.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct License {
    pub id: u32,
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    pub supercategory: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Image {
    pub id: u32,
    pub file_name: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    pub id: u32,
    pub image_id: u32,
    pub category_id: u32,
    pub bbox: [f64; 4], // [x, y, width, height]
    pub area: f64,
    pub iscrowd: u32,
    pub segmentation: Vec<Vec<f64>>,
}

impl Annotation {
    /// Detection-only annotation for a rectangle box; segmentation stays
    /// empty.
    pub fn from_bbox(id: u32, image_id: u32, category_id: u32, bbox: &PixelBox) -> Self {
        Self {
            id,
            image_id,
            category_id,
            bbox: [bbox.x, bbox.y, bbox.width, bbox.height],
            area: bbox.area(),
            iscrowd: 0,
            segmentation: Vec::new(),
        }
    }
}

/// One per-split manifest document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CocoFile {
    pub info: Info,
    pub licenses: Vec<License>,
    pub images: Vec<Image>,
    pub annotations: Vec<Annotation>,
    pub categories: Vec<Category>,
}

impl CocoFile {
    pub fn new(split: &str, categories: Vec<Category>) -> Self {
        Self {
            info: Info::for_split(split),
            licenses: Vec::new(),
            images: Vec::new(),
            annotations: Vec::new(),
            categories,
        }
    }
}

/// Category list from a class map, in id order.
pub fn categories_from(class_map: &ClassMap) -> Vec<Category> {
    class_map
        .entries()
        .map(|(id, name)| Category {
            id: id as u32,
            name: name.to_string(),
            supercategory: "none".to_string(),
        })
        .collect()
}
