use clap::Parser;
use std::path::PathBuf;
use std::str::FromStr;

/// Convert a directory tree of LabelMe JSON annotations into a YOLO dataset
/// (per-image label files plus data.yaml).
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct YoloArgs {
    /// Directory containing LabelMe JSON files; repeat to merge several roots.
    /// Root order is also the precedence order for the image fallback search.
    #[arg(short = 'd', long = "json_dir", required = true)]
    pub json_dirs: Vec<PathBuf>,

    /// Output directory for the generated dataset
    #[arg(short = 'o', long = "output_dir")]
    pub output_dir: PathBuf,

    /// Proportion of the dataset to use for training
    #[arg(long = "train_ratio", default_value_t = 0.9, value_parser = validate_ratio)]
    pub train_ratio: f32,

    /// Seed for the reproducible train/val shuffle
    #[arg(long = "seed", default_value_t = 42)]
    pub seed: u64,

    /// First class id assigned by the class map
    #[arg(long = "class_id_base", default_value_t = 0)]
    pub class_id_base: usize,

    /// Force every box into this single class, ignoring shape labels
    #[arg(long = "single_class", conflicts_with = "label_list")]
    pub single_class: Option<String>,

    /// Ordered label list; ids follow list order. Boxes with labels outside
    /// the list are dropped.
    #[arg(long = "label_list", use_value_delimiter = true)]
    pub label_list: Vec<String>,
}

/// Convert a directory tree of LabelMe JSON annotations into COCO detection
/// manifests (instances_train.json / instances_val.json).
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct CocoArgs {
    /// Directory containing LabelMe JSON files; repeat to merge several roots.
    /// Root order is also the precedence order for the image fallback search.
    #[arg(short = 'd', long = "json_dir", required = true)]
    pub json_dirs: Vec<PathBuf>,

    /// Output directory for the generated dataset
    #[arg(short = 'o', long = "output_dir")]
    pub output_dir: PathBuf,

    /// Proportion of the dataset to use for training
    #[arg(long = "train_ratio", default_value_t = 0.8, value_parser = validate_ratio)]
    pub train_ratio: f32,

    /// Seed for the reproducible train/val shuffle
    #[arg(long = "seed", default_value_t = 42)]
    pub seed: u64,

    /// First category id assigned by the class map
    #[arg(long = "class_id_base", default_value_t = 1)]
    pub class_id_base: usize,

    /// Force every box into this single category, ignoring shape labels
    #[arg(long = "single_class", conflicts_with = "label_list")]
    pub single_class: Option<String>,

    /// Ordered label list; ids follow list order. Boxes with labels outside
    /// the list are skipped with a warning.
    #[arg(long = "label_list", use_value_delimiter = true)]
    pub label_list: Vec<String>,
}

/// Rewrite every shape label in a directory of LabelMe JSON files to one
/// unified value, in place.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct UnifyArgs {
    /// Directory containing LabelMe JSON files
    #[arg(short = 'd', long = "json_dir")]
    pub json_dir: PathBuf,

    /// The label every shape will be rewritten to
    #[arg(short = 'l', long = "label", value_parser = validate_label)]
    pub label: String,
}

/// Delete label files that have no matching image (pre-training housekeeping).
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct SyncArgs {
    /// Directory containing the dataset images
    #[arg(long = "images_dir")]
    pub images_dir: PathBuf,

    /// Directory containing the .txt label files
    #[arg(long = "labels_dir")]
    pub labels_dir: PathBuf,

    /// Report the label files that would be deleted without deleting them
    #[arg(long = "dry_run")]
    pub dry_run: bool,
}

// The split is meaningless at the extremes, reject them at the boundary
fn validate_ratio(s: &str) -> Result<f32, String> {
    match f32::from_str(s) {
        Ok(val) if val > 0.0 && val < 1.0 => Ok(val),
        _ => Err("RATIO must be strictly between 0.0 and 1.0".to_string()),
    }
}

fn validate_label(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        Err("LABEL must not be empty".to_string())
    } else {
        Ok(s.to_string())
    }
}
