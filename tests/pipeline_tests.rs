use approx::assert_abs_diff_eq;
use image::{Rgb, RgbImage};
use serde_json::json;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use labelme2coco::coco::CocoFile;
use labelme2coco::config::{BoxPolicy, ConvertConfig, IdScheme};
use labelme2coco::error::ConvertError;
use labelme2coco::io::find_matching_image;
use labelme2coco::process_coco_dataset;
use labelme2coco::resize::resize_directory;
use labelme2coco::visualize::{render_annotations, render_predictions, Prediction};

struct Workspace {
    _root: TempDir,
    json_dir: PathBuf,
    image_dir: PathBuf,
    output_dir: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let json_dir = root.path().join("labels");
        let image_dir = root.path().join("images");
        let output_dir = root.path().join("output");
        fs::create_dir_all(&json_dir).unwrap();
        fs::create_dir_all(&image_dir).unwrap();
        Self {
            _root: root,
            json_dir,
            image_dir,
            output_dir,
        }
    }

    fn config(&self) -> ConvertConfig {
        let mut config = ConvertConfig::new(&self.json_dir, &self.image_dir, &self.output_dir);
        config.target_width = 32;
        config.target_height = 32;
        config.seed = Some(42);
        config
    }

    fn write_image(&self, file_name: &str) {
        write_image(&self.image_dir.join(file_name), 24, 24);
    }

    fn write_label(&self, stem: &str, points: &[[[f64; 2]; 2]]) {
        let shapes: Vec<_> = points
            .iter()
            .map(|pts| {
                json!({
                    "label": "component",
                    "points": pts,
                    "group_id": null,
                    "shape_type": "rectangle",
                    "flags": {}
                })
            })
            .collect();
        let doc = json!({
            "version": "5.2.1",
            "shapes": shapes,
            "imagePath": format!("{}.jpg", stem),
            "imageData": null
        });
        fs::write(
            self.json_dir.join(format!("{}.json", stem)),
            serde_json::to_vec_pretty(&doc).unwrap(),
        )
        .unwrap();
    }

    fn write_pairs(&self, count: usize) {
        for i in 0..count {
            let stem = format!("board_{:02}", i);
            self.write_image(&format!("{}.png", stem));
            self.write_label(
                &stem,
                &[
                    [[100.0, 100.0], [300.0, 400.0]],
                    [[2000.0, 50.0], [1500.0, 900.0]],
                ],
            );
        }
    }

    fn read_doc(&self, split: &str) -> CocoFile {
        let path = self.output_dir.join("annotations").join(format!("{}.json", split));
        serde_json::from_slice(&fs::read(path).unwrap()).unwrap()
    }
}

fn write_image(path: &Path, width: u32, height: u32) {
    RgbImage::from_fn(width, height, |x, y| Rgb([(x * 10) as u8, (y * 10) as u8, 128]))
        .save(path)
        .unwrap();
}

fn file_names(doc: &CocoFile) -> HashSet<String> {
    doc.images.iter().map(|image| image.file_name.clone()).collect()
}

fn dir_len(path: &Path) -> usize {
    fs::read_dir(path).unwrap().count()
}

#[test]
fn test_single_pair_bbox_is_rescaled() {
    let ws = Workspace::new();
    ws.write_image("board.jpg");
    ws.write_label("board", &[[[100.0, 100.0], [300.0, 400.0]]]);

    let mut config = ws.config();
    config.target_width = 800;
    config.target_height = 800;
    let report = process_coco_dataset(&config).unwrap();

    // floor(1 * 0.8) == 0, so the single pair lands in val
    assert!(report.train.images.is_empty());
    let val = ws.read_doc("val");
    assert_eq!(val.images, report.val.images);
    assert_eq!(val.images.len(), 1);
    assert_eq!(val.images[0].file_name, "board.jpg");
    assert_eq!((val.images[0].width, val.images[0].height), (800, 800));

    let bbox = val.annotations[0].bbox;
    assert_abs_diff_eq!(bbox.x, 20.49, epsilon = 0.01);
    assert_abs_diff_eq!(bbox.y, 20.49, epsilon = 0.01);
    assert_abs_diff_eq!(bbox.w, 40.98, epsilon = 0.01);
    assert_abs_diff_eq!(bbox.h, 61.47, epsilon = 0.01);
    assert_abs_diff_eq!(val.annotations[0].area, bbox.w * bbox.h, epsilon = 1e-9);

    let resized = ws.output_dir.join("val_images").join("board.jpg");
    assert_eq!(image::image_dimensions(resized).unwrap(), (800, 800));
}

#[test]
fn test_ten_pairs_split_eight_two() {
    let ws = Workspace::new();
    ws.write_pairs(10);

    let report = process_coco_dataset(&ws.config()).unwrap();
    let train = ws.read_doc("train");
    let val = ws.read_doc("val");

    assert_eq!(train.images.len(), 8);
    assert_eq!(val.images.len(), 2);
    assert!(file_names(&train).is_disjoint(&file_names(&val)));
    assert_eq!(dir_len(&ws.output_dir.join("train_images")), 8);
    assert_eq!(dir_len(&ws.output_dir.join("val_images")), 2);
    assert_eq!(report.stats.converted_images, 10);
    assert_eq!(report.stats.annotations, 20);

    for doc in [&train, &val] {
        assert_eq!(doc.categories.len(), 1);
        assert_eq!(doc.categories[0].name, "component");
        let ids: HashSet<u32> = doc.images.iter().map(|image| image.id).collect();
        assert!(doc.annotations.iter().all(|ann| ids.contains(&ann.image_id)));
    }
}

#[test]
fn test_global_ids_continue_across_splits() {
    let ws = Workspace::new();
    ws.write_pairs(10);

    let report = process_coco_dataset(&ws.config()).unwrap();

    let image_ids: Vec<u32> = report
        .train
        .images
        .iter()
        .chain(&report.val.images)
        .map(|image| image.id)
        .collect();
    assert_eq!(image_ids, (1..=10).collect::<Vec<_>>());

    let annotation_ids: Vec<u32> = report
        .train
        .annotations
        .iter()
        .chain(&report.val.annotations)
        .map(|ann| ann.id)
        .collect();
    assert_eq!(annotation_ids, (1..=20).collect::<Vec<_>>());
}

#[test]
fn test_per_split_ids_restart() {
    let ws = Workspace::new();
    ws.write_pairs(10);

    let mut config = ws.config();
    config.id_scheme = IdScheme::PerSplit;
    let report = process_coco_dataset(&config).unwrap();

    let val_ids: Vec<u32> = report.val.images.iter().map(|image| image.id).collect();
    assert_eq!(val_ids, vec![1, 2]);
    let val_annotation_ids: Vec<u32> = report.val.annotations.iter().map(|ann| ann.id).collect();
    assert_eq!(val_annotation_ids, vec![1, 2, 3, 4]);
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let ws = Workspace::new();
    ws.write_pairs(10);

    let first = process_coco_dataset(&ws.config()).unwrap();
    let second = process_coco_dataset(&ws.config()).unwrap();
    assert_eq!(first.train, second.train);
    assert_eq!(first.val, second.val);
}

#[test]
fn test_unmatched_label_is_skipped() {
    let ws = Workspace::new();
    ws.write_pairs(4);
    ws.write_label("orphan", &[[[1.0, 1.0], [2.0, 2.0]]]);
    // wrong extension does not count as a match
    ws.write_image("orphan.bmp");

    let report = process_coco_dataset(&ws.config()).unwrap();

    assert_eq!(report.stats.total_label_files, 5);
    assert_eq!(report.stats.skipped_missing_image, 1);
    assert_eq!(report.train.images.len() + report.val.images.len(), 4);
    let all: HashSet<String> = file_names(&report.train)
        .union(&file_names(&report.val))
        .cloned()
        .collect();
    assert!(all.iter().all(|name| !name.starts_with("orphan")));
}

#[test]
fn test_malformed_label_and_broken_image_are_skipped() {
    let ws = Workspace::new();
    ws.write_pairs(3);

    ws.write_image("bad_shape.png");
    fs::write(
        ws.json_dir.join("bad_shape.json"),
        r#"{"shapes": [{"label": "component", "points": [[1, 1], [2, 2]]},
                       {"label": "component", "points": [[1, 1], [2, 2], [3, 3]]}]}"#,
    )
    .unwrap();

    ws.write_image("no_shapes.png");
    fs::write(ws.json_dir.join("no_shapes.json"), r#"{"version": "5.2.1"}"#).unwrap();

    ws.write_label("broken", &[[[1.0, 1.0], [2.0, 2.0]]]);
    fs::write(ws.image_dir.join("broken.jpg"), b"definitely not a jpeg").unwrap();

    let report = process_coco_dataset(&ws.config()).unwrap();

    assert_eq!(report.stats.converted_images, 3);
    assert_eq!(report.stats.skipped_malformed_label, 2);
    assert_eq!(report.stats.failed_image_io, 1);
    assert_eq!(report.train.images.len() + report.val.images.len(), 3);
    assert_eq!(
        report.train.annotations.len() + report.val.annotations.len(),
        6
    );
}

#[test]
fn test_reject_policy_skips_out_of_bounds_file() {
    let ws = Workspace::new();
    ws.write_image("inside.png");
    ws.write_label("inside", &[[[100.0, 100.0], [300.0, 400.0]]]);
    ws.write_image("outside.png");
    ws.write_label("outside", &[[[100.0, 100.0], [5000.0, 400.0]]]);

    let mut config = ws.config();
    config.box_policy = BoxPolicy::Reject;
    let report = process_coco_dataset(&config).unwrap();
    assert_eq!(report.stats.converted_images, 1);
    assert_eq!(report.stats.skipped_malformed_label, 1);

    config.box_policy = BoxPolicy::Clamp;
    let report = process_coco_dataset(&config).unwrap();
    assert_eq!(report.stats.converted_images, 2);
    let widest = report
        .train
        .annotations
        .iter()
        .chain(&report.val.annotations)
        .map(|ann| ann.bbox.x + ann.bbox.w)
        .fold(0.0, f64::max);
    assert!(widest <= 32.0);
}

#[test]
fn test_label_dir_with_glob_characters() {
    let root = tempfile::tempdir().unwrap();
    let json_dir = root.path().join("labels[v1]");
    let image_dir = root.path().join("images[raw]");
    let output_dir = root.path().join("output");
    fs::create_dir_all(&json_dir).unwrap();
    fs::create_dir_all(&image_dir).unwrap();
    let ws = Workspace {
        _root: root,
        json_dir,
        image_dir,
        output_dir,
    };
    ws.write_pairs(5);

    let report = process_coco_dataset(&ws.config()).unwrap();

    assert_eq!(report.stats.total_label_files, 5);
    assert_eq!(report.stats.converted_images, 5);
    assert_eq!(report.train.images.len() + report.val.images.len(), 5);
}

#[test]
fn test_extension_order_prefers_jpg() {
    let ws = Workspace::new();
    ws.write_image("board.png");
    ws.write_image("board.jpg");
    ws.write_image("board.jpeg");

    let found = find_matching_image(&ws.json_dir.join("board.json"), &ws.image_dir).unwrap();
    assert_eq!(found, ws.image_dir.join("board.jpg"));

    let missing = find_matching_image(&ws.json_dir.join("other.json"), &ws.image_dir);
    assert!(matches!(missing, Err(ConvertError::MissingMatch { .. })));
}

#[test]
fn test_fatal_errors() {
    let ws = Workspace::new();

    let mut config = ws.config();
    config.train_ratio = 0.0;
    assert!(matches!(
        process_coco_dataset(&config),
        Err(ConvertError::Config(_))
    ));

    let mut config = ws.config();
    config.json_dir = ws.json_dir.join("missing");
    assert!(matches!(
        process_coco_dataset(&config),
        Err(ConvertError::Io { .. })
    ));
}

#[test]
fn test_rerun_replaces_previous_output() {
    let ws = Workspace::new();
    ws.write_pairs(5);
    process_coco_dataset(&ws.config()).unwrap();

    let stale = ws.output_dir.join("train_images").join("stale.png");
    write_image(&stale, 4, 4);

    process_coco_dataset(&ws.config()).unwrap();
    assert!(!stale.exists());
}

#[test]
fn test_resize_directory() {
    let root = tempfile::tempdir().unwrap();
    let input = root.path().join("raw");
    let output = root.path().join("resized");
    fs::create_dir_all(&input).unwrap();

    write_image(&input.join("a.png"), 40, 20);
    write_image(&input.join("b.JPG"), 10, 10);
    fs::write(input.join("notes.txt"), "skip me").unwrap();
    fs::write(input.join("broken.png"), b"not a png").unwrap();

    let summary = resize_directory(&input, &output, 16, 8).unwrap();
    assert_eq!(summary.resized, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(image::image_dimensions(output.join("a.png")).unwrap(), (16, 8));
    assert_eq!(image::image_dimensions(output.join("b.JPG")).unwrap(), (16, 8));
    assert!(!output.join("notes.txt").exists());
}

#[test]
fn test_visualize_annotations_and_predictions() {
    let ws = Workspace::new();
    ws.write_pairs(3);
    let report = process_coco_dataset(&ws.config()).unwrap();

    let vis_dir = ws.output_dir.join("vis");
    let train_images = ws.output_dir.join("train_images");

    let summary = render_annotations(&report.train, &train_images, &vis_dir, 5).unwrap();
    assert_eq!(summary.rendered, report.train.images.len());
    assert_eq!(summary.boxes_drawn, report.train.annotations.len());
    for image in &report.train.images {
        let stem = image.file_name.trim_end_matches(".png");
        assert!(vis_dir.join(format!("{}_res.png", stem)).is_file());
    }

    let first = &report.train.images[0];
    let predictions = vec![
        Prediction {
            image_id: first.id,
            boxes: vec![[1.0, 1.0, 10.0, 10.0], [2.0, 2.0, 30.0, 30.0]],
            scores: vec![0.9, 0.2],
            labels: vec![0, 0],
        },
        Prediction {
            image_id: 999,
            boxes: vec![[1.0, 1.0, 2.0, 2.0]],
            scores: vec![0.99],
            labels: vec![0],
        },
    ];
    let pred_dir = ws.output_dir.join("pred");
    let summary =
        render_predictions(&predictions, &report.train, &train_images, &pred_dir, 0.5).unwrap();
    assert_eq!(summary.rendered, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.boxes_drawn, 1);
}
