//! Dataset preparation tools for LabelMe annotations.
//!
//! This library backs four small command-line tools used to get an
//! object-detection dataset ready for training: unifying annotation labels,
//! converting LabelMe JSON to YOLO or COCO format with a reproducible
//! train/val split, and removing orphan label files before a training run.

pub mod class_map;
pub mod coco;
pub mod coco_dataset;
pub mod config;
pub mod conversion;
pub mod io;
pub mod split;
pub mod sync;
pub mod types;
pub mod unify;
pub mod utils;
pub mod yolo_dataset;

// Re-export commonly used types and functions
pub use class_map::ClassMap;
pub use config::{CocoArgs, SyncArgs, UnifyArgs, YoloArgs};
pub use split::split_annotations;
pub use sync::{sync_labels_and_images, SyncReport};
pub use types::{ConversionStats, ImageAnnotation, Shape, SplitData};
pub use unify::{unify_labels, UnifyStats};

// YOLO-specific exports
pub use yolo_dataset::{process_yolo_dataset, setup_yolo_output_directories, YoloOutputDirs};

// COCO-specific exports
pub use coco_dataset::{process_coco_dataset, setup_coco_output_directories, CocoOutputDirs};
