use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConvertError;

// Extensions tried, in order, when pairing a label file with its image
pub const MATCH_EXTENSIONS: &[&str] = &["jpg", "png", "jpeg"];

// Image formats picked up by the bulk resizer
pub const IMG_FORMATS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tiff"];

// A shape as written by the labelling tool
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Shape {
    #[serde(default)]
    pub label: String,
    pub points: Vec<(f64, f64)>,
    #[serde(default)]
    pub group_id: Option<i64>,
    #[serde(default)]
    pub shape_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

// The label document of one source image. Other labelme keys are ignored.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LabelFile {
    pub shapes: Vec<Shape>,
}

/// Two corners of a box in original-image pixel coordinates, in either order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelShape {
    pub p1: (f64, f64),
    pub p2: (f64, f64),
}

impl LabelShape {
    pub fn new(p1: (f64, f64), p2: (f64, f64)) -> Self {
        Self { p1, p2 }
    }

    /// Validate a raw shape read from `file`.
    pub fn from_shape(shape: &Shape, file: &Path) -> Result<Self, ConvertError> {
        match shape.points.as_slice() {
            [p1, p2] => {
                let finite = [p1.0, p1.1, p2.0, p2.1].iter().all(|v| v.is_finite());
                if !finite {
                    return Err(ConvertError::malformed(
                        file,
                        format!("shape '{}' has a non-finite coordinate", shape.label),
                    ));
                }
                Ok(Self::new(*p1, *p2))
            }
            points => Err(ConvertError::malformed(
                file,
                format!(
                    "shape '{}' has {} points, expected exactly 2",
                    shape.label,
                    points.len()
                ),
            )),
        }
    }
}

impl LabelFile {
    /// Validate every shape, failing on the first non-conforming one.
    pub fn label_shapes(&self, file: &Path) -> Result<Vec<LabelShape>, ConvertError> {
        self.shapes
            .iter()
            .map(|shape| LabelShape::from_shape(shape, file))
            .collect()
    }
}

/// A label file paired with the image it annotates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPair {
    pub label_path: PathBuf,
    pub image_path: PathBuf,
}

impl LabelPair {
    /// File name of the image, reused for the resized copy
    pub fn image_file_name(&self) -> String {
        self.image_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

// Paths of the output directories of a conversion run
#[derive(Debug, Clone)]
pub struct OutputDirs {
    pub train_images_dir: PathBuf,
    pub val_images_dir: PathBuf,
    pub annotations_dir: PathBuf,
}

// The two partitions of a dataset
#[derive(Debug, Clone)]
pub struct SplitData<T> {
    pub train: Vec<T>,
    pub val: Vec<T>,
}

// Per-file outcome counters of a conversion run
#[derive(Debug, Default, Clone)]
pub struct ProcessingStats {
    pub total_label_files: usize,
    pub converted_images: usize,
    pub annotations: usize,
    pub skipped_missing_image: usize,
    pub skipped_malformed_label: usize,
    pub failed_image_io: usize,
}

impl ProcessingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a per-file error under its category.
    pub fn record_skip(&mut self, error: &ConvertError) {
        match error {
            ConvertError::MissingMatch { .. } => self.skipped_missing_image += 1,
            ConvertError::MalformedLabel { .. } => self.skipped_malformed_label += 1,
            ConvertError::ImageIo { .. } => self.failed_image_io += 1,
            _ => {}
        }
    }

    pub fn total_skipped(&self) -> usize {
        self.skipped_missing_image + self.skipped_malformed_label + self.failed_image_io
    }

    pub fn print_summary(&self) {
        log::info!("=== Processing Summary ===");
        log::info!("Label files found: {}", self.total_label_files);
        log::info!("Images converted: {}", self.converted_images);
        log::info!("Annotations written: {}", self.annotations);

        if self.total_skipped() > 0 {
            log::warn!(
                "Skipped label files: {} (missing image: {}, malformed label: {}, image I/O failure: {})",
                self.total_skipped(),
                self.skipped_missing_image,
                self.skipped_malformed_label,
                self.failed_image_io
            );
        }
    }
}
