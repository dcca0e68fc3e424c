use glob::glob;
use log::{error, info, warn};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::UnifyArgs;
use crate::utils::create_progress_bar;

/// Counters for one unification run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UnifyStats {
    pub files_seen: usize,
    pub files_modified: usize,
    pub files_skipped: usize,
}

/// Rewrite every shape's label in every JSON file under `json_dir` to
/// `args.label`, in place.
///
/// The edit goes through a generic JSON value so fields this tool does not
/// model (embedded image data, editor flags) survive untouched. Files whose
/// labels already match are left unwritten, which makes the operation
/// idempotent: a second run reports zero modified files. Malformed or
/// unreadable files are logged and skipped.
pub fn unify_labels(args: &UnifyArgs) -> Result<UnifyStats, Box<dyn std::error::Error>> {
    let pattern = format!("{}/**/*.json", args.json_dir.display());
    let json_files: Vec<PathBuf> = glob(&pattern)?.filter_map(|entry| entry.ok()).collect();

    let mut stats = UnifyStats {
        files_seen: json_files.len(),
        ..UnifyStats::default()
    };

    if json_files.is_empty() {
        warn!("No .json files found in {}", args.json_dir.display());
        return Ok(stats);
    }

    info!(
        "Found {} json files. Unifying all labels to '{}'...",
        json_files.len(),
        args.label
    );

    let pb = create_progress_bar(json_files.len() as u64, "Unify");
    for json_file in &json_files {
        pb.inc(1);
        match unify_file(json_file, &args.label) {
            Ok(true) => stats.files_modified += 1,
            Ok(false) => {}
            Err(e) => {
                error!("Error processing file {}: {}", json_file.display(), e);
                stats.files_skipped += 1;
            }
        }
    }
    pb.finish_with_message("Label cleaning complete");

    info!("Done. Unified labels in {} files.", stats.files_modified);
    Ok(stats)
}

/// Rewrite one file; returns whether it was modified.
fn unify_file(path: &Path, unified_label: &str) -> std::io::Result<bool> {
    let content = fs::read_to_string(path)?;
    let mut document: Value = serde_json::from_str(&content)?;

    let mut modified = false;
    if let Some(shapes) = document
        .get_mut("shapes")
        .and_then(|shapes| shapes.as_array_mut())
    {
        for shape in shapes {
            let Some(shape) = shape.as_object_mut() else {
                continue;
            };
            match shape.get("label").and_then(|label| label.as_str()) {
                Some(label) if label == unified_label => {}
                _ => {
                    shape.insert(
                        "label".to_string(),
                        Value::String(unified_label.to_string()),
                    );
                    modified = true;
                }
            }
        }
    }

    if modified {
        let serialized = serde_json::to_string_pretty(&document)?;
        fs::write(path, serialized)?;
    }
    Ok(modified)
}
