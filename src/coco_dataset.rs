use log::{error, info, warn};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use crate::class_map::ClassMap;
use crate::coco::{categories_from, Annotation, CocoFile, Image};
use crate::config::CocoArgs;
use crate::conversion::rectangle_bbox;
use crate::io::{copy_image_to, discover_annotation_files, locate_image, parse_annotation_files};
use crate::split::split_annotations;
use crate::types::{ConversionStats, SourcedAnnotation};
use crate::utils::{create_output_directory, create_progress_bar};

/// Output directory layout for a COCO dataset
pub struct CocoOutputDirs {
    pub annotations_dir: PathBuf,
    pub train_images_dir: PathBuf,
    pub val_images_dir: PathBuf,
}

/// Set up the annotations/images per-split directory structure
pub fn setup_coco_output_directories(output_dir: &Path) -> std::io::Result<CocoOutputDirs> {
    let annotations_dir = create_output_directory(&output_dir.join("annotations"))?;
    let images_dir = create_output_directory(&output_dir.join("images"))?;

    Ok(CocoOutputDirs {
        annotations_dir,
        train_images_dir: create_output_directory(&images_dir.join("train"))?,
        val_images_dir: create_output_directory(&images_dir.join("val"))?,
    })
}

/// Main COCO conversion pipeline: discover, parse, split, build one manifest
/// per split, write.
pub fn process_coco_dataset(
    args: &CocoArgs,
    output_dirs: &CocoOutputDirs,
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

    for (split_name, split_records, images_dir) in [
        (
            "train",
            &split_data.train_annotations,
            &output_dirs.train_images_dir,
        ),
        (
            "val",
            &split_data.val_annotations,
            &output_dirs.val_images_dir,
        ),
    ] {
        let coco_file = build_split_manifest(
            split_name,
            split_records,
            images_dir,
            &class_map,
            args,
            &mut stats,
        );
        write_manifest(&output_dirs.annotations_dir, split_name, &coco_file)?;
    }

    stats.print_summary();
    info!("COCO conversion process completed successfully.");
    Ok(())
}

fn build_class_map(args: &CocoArgs, annotations: &[SourcedAnnotation]) -> ClassMap {
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

/// Build one split's manifest. Image and annotation ids are monotonically
/// assigned from 1 within the document; a record whose image cannot be
/// located contributes nothing.
fn build_split_manifest(
    split_name: &str,
    annotations: &[SourcedAnnotation],
    images_dir: &Path,
    class_map: &ClassMap,
    args: &CocoArgs,
    stats: &mut ConversionStats,
) -> CocoFile {
    let mut coco_file = CocoFile::new(split_name, categories_from(class_map));
    let mut next_image_id: u32 = 1;
    let mut next_annotation_id: u32 = 1;

    let pb = create_progress_bar(annotations.len() as u64, split_name);

    for (json_path, annotation) in annotations {
        pb.inc(1);

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

        let image_id = next_image_id;
        next_image_id += 1;
        coco_file.images.push(Image {
            id: image_id,
            file_name: copied_name,
            width: annotation.image_width,
            height: annotation.image_height,
        });

        let mut boxes_in_record = 0;
        for shape in annotation.rectangles() {
            let Some(bbox) = rectangle_bbox(shape) else {
                continue;
            };
            let Some(category_id) = class_map.resolve(&shape.label) else {
                warn!(
                    "Label '{}' not in class map; skipping one box in {}.",
                    shape.label,
                    json_path.display()
                );
                stats.boxes_dropped_unknown_label += 1;
                continue;
            };

            coco_file.annotations.push(Annotation::from_bbox(
                next_annotation_id,
                image_id,
                category_id as u32,
                &bbox,
            ));
            next_annotation_id += 1;
            boxes_in_record += 1;
        }

        stats.records_converted += 1;
        stats.boxes_written += boxes_in_record;
    }

    pb.finish_with_message(format!("{} processing complete", split_name));
    coco_file
}

/// Write `instances_<split>.json` into the annotations directory
fn write_manifest(
    annotations_dir: &Path,
    split_name: &str,
    coco_file: &CocoFile,
) -> std::io::Result<()> {
    let path = annotations_dir.join(format!("instances_{}.json", split_name));
    let mut writer = BufWriter::new(File::create(&path)?);
    serde_json::to_writer(&mut writer, coco_file)?;
    info!("Wrote {}", path.display());
    Ok(())
}
