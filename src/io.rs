use glob::glob;
use log::{error, warn};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::types::{ImageAnnotation, SourcedAnnotation};

/// Collect every `.json` file under the given roots, recursively.
///
/// Paths under `output_dir` are excluded so a previous run's manifests are
/// never re-ingested. The result is sorted, which fixes the input ordering
/// the seeded split depends on.
pub fn discover_annotation_files(roots: &[PathBuf], output_dir: &Path) -> Vec<PathBuf> {
    let output_canonical = output_dir.canonicalize().ok();

    let mut entries: Vec<PathBuf> = roots
        .iter()
        .flat_map(|root| {
            let pattern = format!("{}/**/*.json", root.display());
            glob(&pattern)
                .map(|paths| paths.filter_map(|entry| entry.ok()).collect::<Vec<_>>())
                .unwrap_or_else(|e| {
                    error!("Bad glob pattern for {}: {}", root.display(), e);
                    Vec::new()
                })
        })
        .filter(|path| {
            let inside_output = path.starts_with(output_dir)
                || match (&output_canonical, path.canonicalize()) {
                    (Some(out), Ok(canonical)) => canonical.starts_with(out),
                    _ => false,
                };
            !inside_output
        })
        .collect();

    entries.sort();
    entries.dedup();
    entries
}

/// Parse a single LabelMe JSON file. Unreadable or malformed files are
/// logged and reported as `None`; the run continues.
pub fn read_and_parse_json(path: &Path) -> Option<ImageAnnotation> {
    let file = match fs::File::open(path) {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to open JSON file ({}): {}", path.display(), e);
            return None;
        }
    };

    match serde_json::from_reader(std::io::BufReader::new(file)) {
        Ok(annotation) => Some(annotation),
        Err(e) => {
            error!("Failed to parse JSON ({}): {}", path.display(), e);
            None
        }
    }
}

/// Parse all discovered files in parallel, preserving discovery order.
/// Returns the parsed records and the number of files that failed to parse.
pub fn parse_annotation_files(paths: Vec<PathBuf>) -> (Vec<SourcedAnnotation>, usize) {
    let parsed: Vec<Option<SourcedAnnotation>> = paths
        .into_par_iter()
        .map(|path| read_and_parse_json(&path).map(|annotation| (path, annotation)))
        .collect();

    let failures = parsed.iter().filter(|entry| entry.is_none()).count();
    let annotations = parsed.into_iter().flatten().collect();
    (annotations, failures)
}

/// Resolve the image a record refers to.
///
/// The `imagePath` is first taken relative to the record's own directory.
/// When that misses, each configured root is searched for the image's
/// basename, in root order; the first hit wins and is logged, since several
/// roots may carry same-named files.
pub fn locate_image(json_path: &Path, image_path: &str, roots: &[PathBuf]) -> Option<PathBuf> {
    let direct = json_path
        .parent()
        .map(|parent| parent.join(image_path))
        .unwrap_or_else(|| PathBuf::from(image_path));
    if direct.exists() {
        return Some(direct);
    }

    let basename = Path::new(image_path).file_name()?;
    for root in roots {
        let candidate = root.join(basename);
        if candidate.exists() {
            warn!(
                "Image {} not at {}; using {} found by basename search",
                image_path,
                direct.display(),
                candidate.display()
            );
            return Some(candidate);
        }
    }
    None
}

/// Copy a located image into a split's image directory, sanitizing the file
/// name. Returns the emitted file name.
pub fn copy_image_to(image_path: &Path, images_dir: &Path) -> std::io::Result<String> {
    let file_name = image_path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("Invalid image file name: {}", image_path.display()),
            )
        })?;

    let sanitized = sanitize_filename::sanitize(file_name);
    fs::copy(image_path, images_dir.join(&sanitized))?;
    Ok(sanitized)
}
