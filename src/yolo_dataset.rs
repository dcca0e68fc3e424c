use log::{error, info, warn};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::class_map::ClassMap;
use crate::config::YoloArgs;
use crate::conversion::convert_to_yolo_format;
use crate::io::{copy_image_to, discover_annotation_files, locate_image, parse_annotation_files};
use crate::split::split_annotations;
use crate::types::{ConversionStats, SourcedAnnotation};
use crate::utils::{create_output_directory, create_progress_bar};

/// Output directory layout for a YOLO dataset
pub struct YoloOutputDirs {
    pub train_labels_dir: PathBuf,
    pub val_labels_dir: PathBuf,
    pub train_images_dir: PathBuf,
    pub val_images_dir: PathBuf,
}

/// Set up the images/labels per-split directory structure
pub fn setup_yolo_output_directories(output_dir: &Path) -> std::io::Result<YoloOutputDirs> {
    let labels_dir = create_output_directory(&output_dir.join("labels"))?;
    let images_dir = create_output_directory(&output_dir.join("images"))?;

    Ok(YoloOutputDirs {
        train_labels_dir: create_output_directory(&labels_dir.join("train"))?,
        val_labels_dir: create_output_directory(&labels_dir.join("val"))?,
        train_images_dir: create_output_directory(&images_dir.join("train"))?,
        val_images_dir: create_output_directory(&images_dir.join("val"))?,
    })
}

/// Main YOLO conversion pipeline: discover, parse, split, emit, describe.
pub fn process_yolo_dataset(
    args: &YoloArgs,
    output_dirs: &YoloOutputDirs,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut stats = ConversionStats::new();

    let json_files = discover_annotation_files(&args.json_dirs, &args.output_dir);
    stats.records_seen = json_files.len();
    if json_files.is_empty() {
        warn!("No .json files found under the given json_dir roots; nothing to do.");
        return Ok(());
    }

    let (annotations, parse_failures) = parse_annotation_files(json_files);
    stats.skipped_parse_error = parse_failures;
    info!("Read and parsed {} annotation files.", annotations.len());

    let class_map = build_class_map(args, &annotations);
    if class_map.is_empty() {
        warn!("No labels found and none configured; nothing to emit.");
        return Ok(());
    }

    let split_data = split_annotations(annotations, args.train_ratio, args.seed);
    info!(
        "Split {} records into {} train / {} val (seed {}).",
        split_data.total(),
        split_data.train_annotations.len(),
        split_data.val_annotations.len(),
        args.seed
    );

    emit_split(
        &split_data.train_annotations,
        &output_dirs.train_labels_dir,
        &output_dirs.train_images_dir,
        &class_map,
        args,
        &mut stats,
        "Train",
    );
    emit_split(
        &split_data.val_annotations,
        &output_dirs.val_labels_dir,
        &output_dirs.val_images_dir,
        &class_map,
        args,
        &mut stats,
        "Val",
    );

    info!("Creating data.yaml file...");
    create_dataset_yaml(&args.output_dir, &class_map)?;

    stats.print_summary();
    info!("Conversion process completed successfully.");
    Ok(())
}

fn build_class_map(args: &YoloArgs, annotations: &[SourcedAnnotation]) -> ClassMap {
    if let Some(name) = &args.single_class {
        ClassMap::single(name, args.class_id_base)
    } else if !args.label_list.is_empty() {
        ClassMap::from_list(&args.label_list, args.class_id_base)
    } else {
        ClassMap::from_annotations(
            annotations.iter().map(|(_, annotation)| annotation),
            args.class_id_base,
        )
    }
}

/// Emit one split: a label file and an image copy per record. Records with
/// zero qualifying boxes produce neither.
fn emit_split(
    annotations: &[SourcedAnnotation],
    labels_dir: &Path,
    images_dir: &Path,
    class_map: &ClassMap,
    args: &YoloArgs,
    stats: &mut ConversionStats,
    split_label: &str,
) {
    let pb = create_progress_bar(annotations.len() as u64, split_label);

    for (json_path, annotation) in annotations {
        pb.inc(1);

        let (yolo_data, written, dropped) = convert_to_yolo_format(annotation, class_map);
        stats.boxes_dropped_unknown_label += dropped;
        if written == 0 {
            stats.skipped_no_boxes += 1;
            continue;
        }

        let Some(image_path) = locate_image(json_path, &annotation.image_path, &args.json_dirs)
        else {
            error!(
                "Image not found for {}; skipping this record.",
                json_path.display()
            );
            stats.skipped_missing_image += 1;
            continue;
        };

        let copied_name = match copy_image_to(&image_path, images_dir) {
            Ok(name) => name,
            Err(e) => {
                error!("Failed to copy image {}: {}", image_path.display(), e);
                stats.skipped_missing_image += 1;
                continue;
            }
        };

        let stem = Path::new(&copied_name)
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or(copied_name.as_str());
        let label_path = labels_dir.join(format!("{}.txt", stem));
        if let Err(e) = fs::write(&label_path, yolo_data.as_bytes()) {
            error!("Failed to write label file {}: {}", label_path.display(), e);
            continue;
        }

        stats.records_converted += 1;
        stats.boxes_written += written;
    }

    pb.finish_with_message(format!("{} processing complete", split_label));
}

/// Write the dataset description consumed by the downstream trainer: dataset
/// root, relative split subpaths, class count, ordered class names.
pub fn create_dataset_yaml(output_dir: &Path, class_map: &ClassMap) -> std::io::Result<()> {
    let yaml_path = output_dir.join("data.yaml");
    let mut writer = BufWriter::new(File::create(&yaml_path)?);

    let absolute_path = fs::canonicalize(output_dir)?;
    let mut yaml_content = format!(
        "path: {}\ntrain: images/train\nval: images/val\nnc: {}\nnames:\n",
        absolute_path.to_string_lossy(),
        class_map.len()
    );
    for name in class_map.names() {
        yaml_content.push_str(&format!("  - {}\n", name));
    }

    writer.write_all(yaml_content.as_bytes())
}
