use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};

use labelme_prep::class_map::ClassMap;
use labelme_prep::config::{CocoArgs, SyncArgs, UnifyArgs, YoloArgs};
use labelme_prep::conversion::{convert_to_yolo_format, rectangle_bbox, yolo_line};
use labelme_prep::io::locate_image;
use labelme_prep::split::split_annotations;
use labelme_prep::sync::sync_labels_and_images;
use labelme_prep::types::{ImageAnnotation, Shape};
use labelme_prep::unify::unify_labels;
use labelme_prep::{
    coco, process_coco_dataset, process_yolo_dataset, setup_coco_output_directories,
    setup_yolo_output_directories,
};

fn rect_shape(label: &str, p1: (f64, f64), p2: (f64, f64)) -> Shape {
    Shape {
        label: label.to_string(),
        points: vec![p1, p2],
        group_id: None,
        shape_type: "rectangle".to_string(),
        description: None,
    }
}

fn annotation(image_path: &str, width: u32, height: u32, shapes: Vec<Shape>) -> ImageAnnotation {
    ImageAnnotation {
        version: "5.3.1".to_string(),
        shapes,
        image_path: image_path.to_string(),
        image_height: height,
        image_width: width,
    }
}

/// Write a LabelMe-style JSON fixture, including fields the converters do
/// not model, so lenient parsing is exercised too.
fn write_fixture(
    dir: &Path,
    stem: &str,
    image_file: &str,
    width: u32,
    height: u32,
    shapes: serde_json::Value,
) -> PathBuf {
    let doc = json!({
        "version": "5.3.1",
        "flags": {},
        "shapes": shapes,
        "imagePath": image_file,
        "imageData": null,
        "imageHeight": height,
        "imageWidth": width
    });
    let path = dir.join(format!("{}.json", stem));
    fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
    path
}

fn rect_json(label: &str, p1: (f64, f64), p2: (f64, f64)) -> serde_json::Value {
    json!({
        "label": label,
        "points": [[p1.0, p1.1], [p2.0, p2.1]],
        "group_id": null,
        "shape_type": "rectangle",
        "description": ""
    })
}

fn list_file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().is_file())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn test_rectangle_bbox_corner_order_invariance() {
    let forward = rect_shape("x", (10.0, 10.0), (30.0, 20.0));
    let swapped = rect_shape("x", (30.0, 20.0), (10.0, 10.0));
    let mixed = rect_shape("x", (30.0, 10.0), (10.0, 20.0));

    let bbox = rectangle_bbox(&forward).unwrap();
    assert_eq!(bbox, rectangle_bbox(&swapped).unwrap());
    assert_eq!(bbox, rectangle_bbox(&mixed).unwrap());

    assert_eq!(bbox.x, 10.0);
    assert_eq!(bbox.y, 10.0);
    assert_eq!(bbox.width, 20.0);
    assert_eq!(bbox.height, 10.0);
    assert!(bbox.width >= 0.0 && bbox.height >= 0.0);

    let degenerate = rect_shape("x", (5.0, 5.0), (5.0, 5.0));
    let bbox = rectangle_bbox(&degenerate).unwrap();
    assert_eq!((bbox.width, bbox.height), (0.0, 0.0));

    let malformed = Shape {
        points: vec![(1.0, 1.0)],
        ..rect_shape("x", (0.0, 0.0), (0.0, 0.0))
    };
    assert!(rectangle_bbox(&malformed).is_none());
}

#[test]
fn test_yolo_line_worked_example() {
    let shape = rect_shape("x", (10.0, 10.0), (30.0, 20.0));
    let bbox = rectangle_bbox(&shape).unwrap();
    assert_eq!(
        yolo_line(1, &bbox, 100, 50),
        "1 0.200000 0.300000 0.200000 0.200000\n"
    );

    let record = annotation("a.jpg", 100, 50, vec![shape]);
    let class_map = ClassMap::from_list(&["x".to_string()], 1);
    let (text, written, dropped) = convert_to_yolo_format(&record, &class_map);
    assert_eq!(text, "1 0.200000 0.300000 0.200000 0.200000\n");
    assert_eq!((written, dropped), (1, 0));
}

#[test]
fn test_yolo_normalized_coordinates_in_unit_range() {
    let record = annotation(
        "a.jpg",
        640,
        480,
        vec![rect_shape("x", (0.0, 0.0), (640.0, 480.0))],
    );
    let class_map = ClassMap::from_list(&["x".to_string()], 0);
    let (text, _, _) = convert_to_yolo_format(&record, &class_map);
    for field in text.split_whitespace().skip(1) {
        let value: f64 = field.parse().unwrap();
        assert!((0.0..=1.0).contains(&value), "out of range: {}", value);
    }
}

#[test]
fn test_class_map_lexicographic_derivation() {
    let records = [
        annotation("a.jpg", 10, 10, vec![rect_shape("b", (0.0, 0.0), (1.0, 1.0))]),
        annotation(
            "b.jpg",
            10,
            10,
            vec![
                rect_shape("c", (0.0, 0.0), (1.0, 1.0)),
                rect_shape("a", (0.0, 0.0), (1.0, 1.0)),
                rect_shape("b", (0.0, 0.0), (1.0, 1.0)),
            ],
        ),
    ];

    let class_map = ClassMap::from_annotations(records.iter(), 0);
    assert_eq!(class_map.names(), ["a", "b", "c"]);
    assert_eq!(class_map.resolve("a"), Some(0));
    assert_eq!(class_map.resolve("c"), Some(2));

    let offset_map = ClassMap::from_annotations(records.iter(), 1);
    assert_eq!(offset_map.resolve("a"), Some(1));
    assert_eq!(offset_map.resolve("c"), Some(3));
    assert_eq!(offset_map.resolve("missing"), None);
}

#[test]
fn test_class_map_explicit_list_and_forced_single() {
    let listed = ClassMap::from_list(&["z".to_string(), "a".to_string()], 1);
    assert_eq!(listed.resolve("z"), Some(1));
    assert_eq!(listed.resolve("a"), Some(2));
    assert_eq!(listed.resolve("b"), None);
    assert_eq!(listed.names(), ["z", "a"]);

    let forced = ClassMap::single("invoice", 1);
    assert_eq!(forced.resolve("whatever"), Some(1));
    assert_eq!(forced.resolve("invoice"), Some(1));
    assert_eq!(forced.names(), ["invoice"]);
    assert_eq!(forced.len(), 1);
}

#[test]
fn test_split_deterministic_disjoint_and_exhaustive() {
    let records = |n: usize| -> Vec<(PathBuf, ImageAnnotation)> {
        (0..n)
            .map(|i| {
                (
                    PathBuf::from(format!("record{}.json", i)),
                    annotation(&format!("img{}.jpg", i), 10, 10, vec![]),
                )
            })
            .collect()
    };

    let first = split_annotations(records(10), 0.8, 42);
    let second = split_annotations(records(10), 0.8, 42);

    let paths = |subset: &[(PathBuf, ImageAnnotation)]| -> Vec<PathBuf> {
        subset.iter().map(|(path, _)| path.clone()).collect()
    };

    assert_eq!(paths(&first.train_annotations), paths(&second.train_annotations));
    assert_eq!(paths(&first.val_annotations), paths(&second.val_annotations));

    assert_eq!(first.train_annotations.len() + first.val_annotations.len(), 10);
    assert_eq!(first.train_annotations.len(), 8);
    for val_path in paths(&first.val_annotations) {
        assert!(!paths(&first.train_annotations).contains(&val_path));
    }
}

#[test]
fn test_split_tiny_input_may_leave_val_empty() {
    let records = vec![(
        PathBuf::from("only.json"),
        annotation("only.jpg", 10, 10, vec![]),
    )];
    let split = split_annotations(records, 0.9, 42);
    assert_eq!(split.train_annotations.len(), 1);
    assert!(split.val_annotations.is_empty());
}

#[test]
fn test_unify_labels_idempotent_and_field_preserving() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path();

    write_fixture(dir, "one", "one.jpg", 10, 10, json!([rect_json("a", (0.0, 0.0), (1.0, 1.0))]));
    write_fixture(dir, "two", "two.jpg", 10, 10, json!([
        rect_json("b", (0.0, 0.0), (1.0, 1.0)),
        rect_json("invoice", (1.0, 1.0), (2.0, 2.0))
    ]));
    fs::write(dir.join("broken.json"), "{not json").unwrap();

    let args = UnifyArgs {
        json_dir: dir.to_path_buf(),
        label: "invoice".to_string(),
    };

    let first = unify_labels(&args).unwrap();
    assert_eq!(first.files_seen, 3);
    assert_eq!(first.files_modified, 2);
    assert_eq!(first.files_skipped, 1);

    let content = fs::read_to_string(dir.join("two.json")).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&content).unwrap();
    for shape in doc["shapes"].as_array().unwrap() {
        assert_eq!(shape["label"], "invoice");
    }
    // Fields the converter does not model survive the rewrite
    assert!(doc.get("imageData").is_some());
    assert_eq!(doc["imagePath"], "two.jpg");

    let second = unify_labels(&args).unwrap();
    assert_eq!(second.files_modified, 0);
    assert_eq!(second.files_skipped, 1);
}

#[test]
fn test_yolo_pipeline_end_to_end() {
    let temp_dir = tempfile::tempdir().unwrap();
    let src_dir = temp_dir.path().join("src");
    let out_dir = temp_dir.path().join("out");
    fs::create_dir_all(&src_dir).unwrap();

    // One convertible record, one with no qualifying boxes, one missing image
    write_fixture(&src_dir, "a", "a.jpg", 100, 50, json!([rect_json("x", (10.0, 10.0), (30.0, 20.0))]));
    fs::write(src_dir.join("a.jpg"), b"jpegbytes").unwrap();

    write_fixture(&src_dir, "b", "b.jpg", 100, 100, json!([{
        "label": "p",
        "points": [[0.0, 0.0], [5.0, 0.0], [5.0, 5.0]],
        "group_id": null,
        "shape_type": "polygon",
        "description": ""
    }]));
    fs::write(src_dir.join("b.jpg"), b"jpegbytes").unwrap();

    write_fixture(&src_dir, "c", "c.jpg", 100, 100, json!([rect_json("x", (0.0, 0.0), (1.0, 1.0))]));

    let args = YoloArgs {
        json_dirs: vec![src_dir.clone()],
        output_dir: out_dir.clone(),
        train_ratio: 0.5,
        seed: 42,
        class_id_base: 0,
        single_class: None,
        label_list: vec![],
    };

    let output_dirs = setup_yolo_output_directories(&out_dir).unwrap();
    process_yolo_dataset(&args, &output_dirs).unwrap();

    let mut label_files = list_file_names(&output_dirs.train_labels_dir);
    label_files.extend(list_file_names(&output_dirs.val_labels_dir));
    assert_eq!(label_files, ["a.txt"]);

    let mut image_files = list_file_names(&output_dirs.train_images_dir);
    image_files.extend(list_file_names(&output_dirs.val_images_dir));
    assert_eq!(image_files, ["a.jpg"]);

    // Derived class map is sorted: p -> 0, x -> 1
    let label_path = if output_dirs.train_labels_dir.join("a.txt").exists() {
        output_dirs.train_labels_dir.join("a.txt")
    } else {
        output_dirs.val_labels_dir.join("a.txt")
    };
    assert_eq!(
        fs::read_to_string(label_path).unwrap(),
        "1 0.200000 0.300000 0.200000 0.200000\n"
    );

    let yaml = fs::read_to_string(out_dir.join("data.yaml")).unwrap();
    assert!(yaml.contains("train: images/train"));
    assert!(yaml.contains("val: images/val"));
    assert!(yaml.contains("nc: 2"));
    assert!(yaml.contains("  - p\n  - x\n"));
}

#[test]
fn test_yolo_unknown_label_dropped_without_output() {
    let temp_dir = tempfile::tempdir().unwrap();
    let src_dir = temp_dir.path().join("src");
    let out_dir = temp_dir.path().join("out");
    fs::create_dir_all(&src_dir).unwrap();

    write_fixture(&src_dir, "a", "a.jpg", 100, 100, json!([rect_json("z", (0.0, 0.0), (10.0, 10.0))]));
    fs::write(src_dir.join("a.jpg"), b"jpegbytes").unwrap();

    let args = YoloArgs {
        json_dirs: vec![src_dir],
        output_dir: out_dir.clone(),
        train_ratio: 0.5,
        seed: 42,
        class_id_base: 0,
        single_class: None,
        label_list: vec!["a".to_string()],
    };

    let output_dirs = setup_yolo_output_directories(&out_dir).unwrap();
    process_yolo_dataset(&args, &output_dirs).unwrap();

    assert!(list_file_names(&output_dirs.train_labels_dir).is_empty());
    assert!(list_file_names(&output_dirs.val_labels_dir).is_empty());
    assert!(list_file_names(&output_dirs.train_images_dir).is_empty());
    assert!(list_file_names(&output_dirs.val_images_dir).is_empty());
}

#[test]
fn test_yolo_single_class_forces_every_box() {
    let temp_dir = tempfile::tempdir().unwrap();
    let src_dir = temp_dir.path().join("src");
    let out_dir = temp_dir.path().join("out");
    fs::create_dir_all(&src_dir).unwrap();

    write_fixture(&src_dir, "a", "a.jpg", 100, 50, json!([
        rect_json("seal", (10.0, 10.0), (30.0, 20.0)),
        rect_json("stamp", (10.0, 10.0), (30.0, 20.0))
    ]));
    fs::write(src_dir.join("a.jpg"), b"jpegbytes").unwrap();

    let args = YoloArgs {
        json_dirs: vec![src_dir],
        output_dir: out_dir.clone(),
        train_ratio: 0.9,
        seed: 42,
        class_id_base: 0,
        single_class: Some("invoice".to_string()),
        label_list: vec![],
    };

    let output_dirs = setup_yolo_output_directories(&out_dir).unwrap();
    process_yolo_dataset(&args, &output_dirs).unwrap();

    let text = fs::read_to_string(output_dirs.train_labels_dir.join("a.txt")).unwrap();
    let class_ids: Vec<&str> = text.lines().map(|line| line.split(' ').next().unwrap()).collect();
    assert_eq!(class_ids, ["0", "0"]);

    let yaml = fs::read_to_string(out_dir.join("data.yaml")).unwrap();
    assert!(yaml.contains("nc: 1"));
    assert!(yaml.contains("  - invoice\n"));
}

#[test]
fn test_coco_pipeline_referential_integrity() {
    let temp_dir = tempfile::tempdir().unwrap();
    let src_dir = temp_dir.path().join("src");
    let out_dir = temp_dir.path().join("out");
    fs::create_dir_all(&src_dir).unwrap();

    write_fixture(&src_dir, "r1", "r1.jpg", 20, 20, json!([rect_json("cat", (0.0, 0.0), (10.0, 10.0))]));
    fs::write(src_dir.join("r1.jpg"), b"jpegbytes").unwrap();

    // Degenerate box plus a label outside the class map
    write_fixture(&src_dir, "r2", "r2.jpg", 20, 20, json!([
        rect_json("dog", (5.0, 5.0), (5.0, 5.0)),
        rect_json("bird", (1.0, 1.0), (2.0, 2.0))
    ]));
    fs::write(src_dir.join("r2.jpg"), b"jpegbytes").unwrap();

    // Missing image: the record is skipped entirely
    write_fixture(&src_dir, "r3", "r3.jpg", 20, 20, json!([rect_json("cat", (0.0, 0.0), (1.0, 1.0))]));

    let args = CocoArgs {
        json_dirs: vec![src_dir],
        output_dir: out_dir.clone(),
        train_ratio: 0.5,
        seed: 42,
        class_id_base: 1,
        single_class: None,
        label_list: vec!["cat".to_string(), "dog".to_string()],
    };

    let output_dirs = setup_coco_output_directories(&out_dir).unwrap();
    process_coco_dataset(&args, &output_dirs).unwrap();

    let mut total_images = 0;
    let mut total_annotations = 0;
    for split in ["train", "val"] {
        let path = output_dirs
            .annotations_dir
            .join(format!("instances_{}.json", split));
        let manifest: coco::CocoFile =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        let category_ids: Vec<u32> = manifest.categories.iter().map(|c| c.id).collect();
        assert_eq!(category_ids, [1, 2]);
        let category_names: Vec<&str> =
            manifest.categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(category_names, ["cat", "dog"]);

        // Ids are monotonic from 1, reset per split
        for (idx, image) in manifest.images.iter().enumerate() {
            assert_eq!(image.id, idx as u32 + 1);
        }
        for (idx, ann) in manifest.annotations.iter().enumerate() {
            assert_eq!(ann.id, idx as u32 + 1);
            assert!(manifest.images.iter().any(|image| image.id == ann.image_id));
            assert!(category_ids.contains(&ann.category_id));
            assert!(ann.segmentation.is_empty());
            assert_eq!(ann.iscrowd, 0);
        }

        for image in &manifest.images {
            if image.file_name == "r1.jpg" {
                let ann = manifest
                    .annotations
                    .iter()
                    .find(|ann| ann.image_id == image.id)
                    .unwrap();
                assert_eq!(ann.bbox, [0.0, 0.0, 10.0, 10.0]);
                assert_eq!(ann.area, 100.0);
                assert_eq!(ann.category_id, 1);
            }
            assert_ne!(image.file_name, "r3.jpg");
        }

        total_images += manifest.images.len();
        total_annotations += manifest.annotations.len();
    }

    // r3 skipped; the bird box dropped; the degenerate dog box kept
    assert_eq!(total_images, 2);
    assert_eq!(total_annotations, 2);
}

#[test]
fn test_locate_image_direct_then_fallback_in_root_order() {
    let temp_dir = tempfile::tempdir().unwrap();
    let root_a = temp_dir.path().join("a");
    let root_b = temp_dir.path().join("b");
    fs::create_dir_all(&root_a).unwrap();
    fs::create_dir_all(&root_b).unwrap();

    let json_path = root_a.join("record.json");
    fs::write(&json_path, "{}").unwrap();

    // Direct hit next to the record wins
    fs::write(root_a.join("direct.jpg"), b"img").unwrap();
    let roots = vec![root_a.clone(), root_b.clone()];
    assert_eq!(
        locate_image(&json_path, "direct.jpg", &roots),
        Some(root_a.join("direct.jpg"))
    );

    // Fallback: basename search across roots, first configured root wins
    fs::write(root_b.join("elsewhere.jpg"), b"img").unwrap();
    assert_eq!(
        locate_image(&json_path, "sub/elsewhere.jpg", &roots),
        Some(root_b.join("elsewhere.jpg"))
    );

    assert_eq!(locate_image(&json_path, "nowhere.jpg", &roots), None);
}

#[test]
fn test_sync_removes_only_orphan_labels() {
    let temp_dir = tempfile::tempdir().unwrap();
    let images_dir = temp_dir.path().join("images");
    let labels_dir = temp_dir.path().join("labels");
    fs::create_dir_all(&images_dir).unwrap();
    fs::create_dir_all(&labels_dir).unwrap();

    fs::write(images_dir.join("a.jpg"), b"img").unwrap();
    fs::write(images_dir.join("b.png"), b"img").unwrap();
    fs::write(labels_dir.join("a.txt"), "0 0.5 0.5 1.0 1.0\n").unwrap();
    fs::write(labels_dir.join("b.txt"), "0 0.5 0.5 1.0 1.0\n").unwrap();
    fs::write(labels_dir.join("c.txt"), "0 0.5 0.5 1.0 1.0\n").unwrap();

    // Dry run reports the orphan without touching anything
    let dry_args = SyncArgs {
        images_dir: images_dir.clone(),
        labels_dir: labels_dir.clone(),
        dry_run: true,
    };
    let report = sync_labels_and_images(&dry_args).unwrap();
    assert_eq!(report.labels_seen, 3);
    assert_eq!(report.orphan_labels, [labels_dir.join("c.txt")]);
    assert_eq!(report.removed(), 0);
    assert!(labels_dir.join("c.txt").exists());

    // Real run deletes exactly the orphan; images are never modified
    let args = SyncArgs {
        dry_run: false,
        ..dry_args
    };
    let report = sync_labels_and_images(&args).unwrap();
    assert_eq!(report.removed(), 1);
    assert!(!labels_dir.join("c.txt").exists());
    assert_eq!(list_file_names(&labels_dir), ["a.txt", "b.txt"]);
    assert_eq!(list_file_names(&images_dir), ["a.jpg", "b.png"]);
}
