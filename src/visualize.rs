//! Overlay of ground-truth annotations or detector predictions on images.
//!
//! Boxes are colour-coded by COCO size class: Small blue, Medium green,
//! Large red.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::coco::CocoFile;
use crate::error::ConvertError;
use crate::geometry::BoundingBox;
use crate::size_class::SizeClass;

/// Detector output for one image. Boxes are `[x1, y1, x2, y2]` in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub image_id: u32,
    pub boxes: Vec<[f64; 4]>,
    pub scores: Vec<f32>,
    pub labels: Vec<i64>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct VisualizeSummary {
    pub rendered: usize,
    pub skipped: usize,
    pub boxes_drawn: usize,
}

pub fn size_color(size: SizeClass) -> Rgb<u8> {
    match size {
        SizeClass::Small => Rgb([0, 0, 255]),
        SizeClass::Medium => Rgb([0, 255, 0]),
        SizeClass::Large => Rgb([255, 0, 0]),
    }
}

/// Output name of a rendered image: `board.jpg` becomes `board_res.jpg`
pub fn result_file_name(file_name: &str) -> String {
    let path = Path::new(file_name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());
    match path.extension() {
        Some(ext) => format!("{}_res.{}", stem, ext.to_string_lossy()),
        None => format!("{}_res", stem),
    }
}

/// Draw the outline of `bbox`, coloured by its size class
pub fn draw_box(canvas: &mut RgbImage, bbox: &BoundingBox) -> SizeClass {
    let size = SizeClass::classify(bbox.w, bbox.h);
    // imageproc rejects empty rectangles
    let rect = Rect::at(bbox.x as i32, bbox.y as i32)
        .of_size((bbox.w as u32).max(1), (bbox.h as u32).max(1));
    draw_hollow_rect_mut(canvas, rect, size_color(size));
    size
}

pub fn load_coco_file(path: &Path) -> Result<CocoFile, ConvertError> {
    let file = File::open(path).map_err(|e| ConvertError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| ConvertError::io(path, e.into()))
}

pub fn load_predictions(path: &Path) -> Result<Vec<Prediction>, ConvertError> {
    let file = File::open(path).map_err(|e| ConvertError::io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| ConvertError::io(path, e.into()))
}

fn open_canvas(path: &Path) -> Option<RgbImage> {
    if !path.is_file() {
        warn!("Image not found: {}", path.display());
        return None;
    }
    match image::open(path) {
        Ok(img) => Some(img.to_rgb8()),
        Err(e) => {
            warn!("Failed to open image {}: {}", path.display(), e);
            None
        }
    }
}

fn save_canvas(canvas: &RgbImage, output_dir: &Path, file_name: &str) -> Option<PathBuf> {
    let save_path = output_dir.join(result_file_name(file_name));
    match canvas.save(&save_path) {
        Ok(()) => {
            info!("Saved visualization to: {}", save_path.display());
            Some(save_path)
        }
        Err(e) => {
            warn!("Failed to save {}: {}", save_path.display(), e);
            None
        }
    }
}

/// Draw the annotations of the first `num_images` images of `doc`
pub fn render_annotations(
    doc: &CocoFile,
    image_dir: &Path,
    output_dir: &Path,
    num_images: usize,
) -> Result<VisualizeSummary, ConvertError> {
    fs::create_dir_all(output_dir).map_err(|e| ConvertError::io(output_dir, e))?;
    let mut summary = VisualizeSummary::default();

    for image in doc.images.iter().take(num_images) {
        let Some(mut canvas) = open_canvas(&image_dir.join(&image.file_name)) else {
            summary.skipped += 1;
            continue;
        };

        for ann in doc.annotations_of(image.id) {
            let size = draw_box(&mut canvas, &ann.bbox);
            debug!(
                "{}: {}, {} x {}",
                image.file_name, size, ann.bbox.w as i64, ann.bbox.h as i64
            );
            summary.boxes_drawn += 1;
        }

        match save_canvas(&canvas, output_dir, &image.file_name) {
            Some(_) => summary.rendered += 1,
            None => summary.skipped += 1,
        }
    }

    Ok(summary)
}

/// Draw the predictions scoring at least `threshold`, locating images through `doc`
pub fn render_predictions(
    predictions: &[Prediction],
    doc: &CocoFile,
    image_dir: &Path,
    output_dir: &Path,
    threshold: f32,
) -> Result<VisualizeSummary, ConvertError> {
    fs::create_dir_all(output_dir).map_err(|e| ConvertError::io(output_dir, e))?;
    let mut summary = VisualizeSummary::default();

    for prediction in predictions {
        let Some(file_name) = doc.file_name_of(prediction.image_id) else {
            warn!("Unknown image id {} in predictions", prediction.image_id);
            summary.skipped += 1;
            continue;
        };
        let image_path = image_dir.join(file_name);
        info!("Processing image: {}", image_path.display());
        let Some(mut canvas) = open_canvas(&image_path) else {
            summary.skipped += 1;
            continue;
        };

        let detections = prediction
            .boxes
            .iter()
            .zip(&prediction.scores)
            .zip(&prediction.labels);
        for ((&[x1, y1, x2, y2], &score), &label) in detections {
            if score < threshold {
                continue;
            }
            let bbox = BoundingBox::from_corners(
                (x1.trunc(), y1.trunc()),
                (x2.trunc(), y2.trunc()),
            );
            let size = draw_box(&mut canvas, &bbox);
            debug!(
                "{}:{:.2}, {}x{}, {}, Area: {}",
                label,
                score,
                bbox.w as i64,
                bbox.h as i64,
                size,
                bbox.area() as i64
            );
            summary.boxes_drawn += 1;
        }

        match save_canvas(&canvas, output_dir, file_name) {
            Some(_) => summary.rendered += 1,
            None => summary.skipped += 1,
        }
    }

    Ok(summary)
}
