use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::ConvertError;

/// Command-line arguments for converting LabelMe two-point shapes to a resized COCO dataset.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct Args {
    /// Directory containing the LabelMe JSON label files
    #[arg(short = 'd', long = "json_dir")]
    pub json_dir: String,

    /// Directory containing the raw images, matched to labels by basename
    #[arg(short = 'i', long = "image_dir")]
    pub image_dir: String,

    /// Directory receiving train_images/, val_images/ and annotations/
    #[arg(short = 'o', long = "output_dir", default_value = "output")]
    pub output_dir: String,

    /// Proportion of the dataset to use for training
    #[arg(long = "train_ratio", default_value_t = 0.8, value_parser = validate_ratio)]
    pub train_ratio: f64,

    /// Width shared by every source image
    #[arg(long = "original_width", default_value_t = 3904)]
    pub original_width: u32,

    /// Height shared by every source image
    #[arg(long = "original_height", default_value_t = 3904)]
    pub original_height: u32,

    /// Width of the resized output images
    #[arg(long = "target_width", default_value_t = 800)]
    pub target_width: u32,

    /// Height of the resized output images
    #[arg(long = "target_height", default_value_t = 800)]
    pub target_height: u32,

    /// Seed for random shuffling; drawn from OS entropy when omitted
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// How image and annotation IDs are numbered across the two splits
    #[arg(long = "id_scheme", value_enum, default_value = "global")]
    pub id_scheme: IdScheme,

    /// What to do with boxes extending past the target image
    #[arg(long = "box_policy", value_enum, default_value = "pass-through")]
    pub box_policy: BoxPolicy,
}

/// Numbering of image and annotation IDs across the train and val documents
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum IdScheme {
    /// One sequence shared by both splits; val continues where train stopped
    #[default]
    Global,
    /// Each split numbers from 1
    PerSplit,
}

/// Handling of boxes whose coordinates fall outside the target image
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum BoxPolicy {
    /// Emit the box unchanged
    #[default]
    PassThrough,
    /// Clip the box to the image extent
    Clamp,
    /// Skip the whole label file
    Reject,
}

/// Validated settings of a conversion run.
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    pub json_dir: PathBuf,
    pub image_dir: PathBuf,
    pub output_dir: PathBuf,
    pub train_ratio: f64,
    pub original_width: u32,
    pub original_height: u32,
    pub target_width: u32,
    pub target_height: u32,
    pub seed: Option<u64>,
    pub id_scheme: IdScheme,
    pub box_policy: BoxPolicy,
}

impl ConvertConfig {
    /// Settings with the default ratio, resolutions and policies.
    pub fn new(
        json_dir: impl Into<PathBuf>,
        image_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            json_dir: json_dir.into(),
            image_dir: image_dir.into(),
            output_dir: output_dir.into(),
            train_ratio: 0.8,
            original_width: 3904,
            original_height: 3904,
            target_width: 800,
            target_height: 800,
            seed: None,
            id_scheme: IdScheme::default(),
            box_policy: BoxPolicy::default(),
        }
    }

    /// Reject settings that would make the run meaningless.
    pub fn validate(&self) -> Result<(), ConvertError> {
        if !(self.train_ratio > 0.0 && self.train_ratio < 1.0) {
            return Err(ConvertError::Config(format!(
                "train_ratio must be strictly between 0 and 1, got {}",
                self.train_ratio
            )));
        }
        if self.original_width == 0 || self.original_height == 0 {
            return Err(ConvertError::Config(
                "original resolution must be non-zero".to_string(),
            ));
        }
        if self.target_width == 0 || self.target_height == 0 {
            return Err(ConvertError::Config(
                "target resolution must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Args {
    /// Convert the parsed arguments into a validated `ConvertConfig`
    pub fn to_convert_config(&self) -> Result<ConvertConfig, ConvertError> {
        let config = ConvertConfig {
            json_dir: PathBuf::from(&self.json_dir),
            image_dir: PathBuf::from(&self.image_dir),
            output_dir: PathBuf::from(&self.output_dir),
            train_ratio: self.train_ratio,
            original_width: self.original_width,
            original_height: self.original_height,
            target_width: self.target_width,
            target_height: self.target_height,
            seed: self.seed,
            id_scheme: self.id_scheme,
            box_policy: self.box_policy,
        };
        config.validate()?;
        Ok(config)
    }
}

/// Command-line arguments for bulk-resizing a directory of images.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct ResizeArgs {
    /// Directory containing the images to resize
    #[arg(short = 'i', long = "input_dir")]
    pub input_dir: String,

    /// Directory receiving the resized images
    #[arg(short = 'o', long = "output_dir")]
    pub output_dir: String,

    /// Output width
    #[arg(long = "width", default_value_t = 800)]
    pub width: u32,

    /// Output height
    #[arg(long = "height", default_value_t = 800)]
    pub height: u32,
}

/// Command-line arguments for drawing annotations or predictions onto images.
#[derive(Parser, Debug, Clone)]
#[command(version, long_about = None)]
pub struct VisualizeArgs {
    /// Directory containing the images referenced by the COCO document
    #[arg(short = 'i', long = "image_dir")]
    pub image_dir: String,

    /// COCO split document (e.g. annotations/train.json)
    #[arg(short = 'a', long = "annotations")]
    pub annotations: String,

    /// Detector results to draw instead of the ground-truth annotations
    #[arg(short = 'p', long = "predictions")]
    pub predictions: Option<String>,

    /// Directory receiving the rendered images
    #[arg(short = 'o', long = "output_dir", default_value = "vis")]
    pub output_dir: String,

    /// Number of images to render in ground-truth mode
    #[arg(short = 'n', long = "num_images", default_value_t = 5)]
    pub num_images: usize,

    /// Minimum score of a drawn prediction
    #[arg(long = "threshold", default_value_t = 0.5, value_parser = validate_score)]
    pub threshold: f32,
}

// Validate that the ratio lies strictly between 0.0 and 1.0
pub fn validate_ratio(s: &str) -> Result<f64, String> {
    match f64::from_str(s) {
        Ok(val) if val > 0.0 && val < 1.0 => Ok(val),
        _ => Err("RATIO must be strictly between 0.0 and 1.0".to_string()),
    }
}

// Validate that the score threshold is between 0.0 and 1.0
pub fn validate_score(s: &str) -> Result<f32, String> {
    match f32::from_str(s) {
        Ok(val) if (0.0..=1.0).contains(&val) => Ok(val),
        _ => Err("THRESHOLD must be between 0.0 and 1.0".to_string()),
    }
}
