use log::{error, info, warn};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::SyncArgs;
use crate::types::image_extensions_set;

/// Outcome of one sync pass. In dry-run mode `orphan_labels` lists what
/// would be deleted; otherwise it lists what was deleted.
#[derive(Debug, Default, Clone)]
pub struct SyncReport {
    pub labels_seen: usize,
    pub orphan_labels: Vec<PathBuf>,
    pub dry_run: bool,
}

impl SyncReport {
    pub fn removed(&self) -> usize {
        if self.dry_run {
            0
        } else {
            self.orphan_labels.len()
        }
    }
}

/// Delete every label file whose base name has no corresponding image.
///
/// One-directional: the images directory is never modified, and an image
/// with no label file is left alone (it is implicitly background). With
/// `dry_run` the planned deletions are only reported.
pub fn sync_labels_and_images(args: &SyncArgs) -> std::io::Result<SyncReport> {
    let image_stems = file_stems(&args.images_dir, |ext| {
        image_extensions_set().contains(&ext.to_lowercase())
    })?;
    let label_files = label_files(&args.labels_dir)?;

    let mut report = SyncReport {
        labels_seen: label_files.len(),
        dry_run: args.dry_run,
        ..SyncReport::default()
    };

    for (stem, path) in label_files {
        if image_stems.contains(&stem) {
            continue;
        }
        if args.dry_run {
            info!("Would delete orphan label: {}", path.display());
            report.orphan_labels.push(path);
        } else {
            match fs::remove_file(&path) {
                Ok(()) => {
                    info!("Deleted orphan label: {}", path.display());
                    report.orphan_labels.push(path);
                }
                Err(e) => error!("Failed to delete {}: {}", path.display(), e),
            }
        }
    }

    if report.orphan_labels.is_empty() {
        info!("No orphan label files found.");
    } else if args.dry_run {
        warn!(
            "Dry run: {} orphan label file(s) would be deleted.",
            report.orphan_labels.len()
        );
    } else {
        info!("Deleted {} orphan label file(s).", report.orphan_labels.len());
    }
    Ok(report)
}

/// Base names of the files in `dir` whose extension passes the filter
fn file_stems<F>(dir: &Path, extension_filter: F) -> std::io::Result<HashSet<String>>
where
    F: Fn(&str) -> bool,
{
    let mut stems = HashSet::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matches = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(&extension_filter);
        if matches {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                stems.insert(stem.to_string());
            }
        }
    }
    Ok(stems)
}

/// (stem, path) for every .txt label file in `dir`
fn label_files(dir: &Path) -> std::io::Result<Vec<(String, PathBuf)>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_label = path.is_file()
            && path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"));
        if is_label {
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                files.push((stem.to_string(), path));
            }
        }
    }
    files.sort();
    Ok(files)
}
