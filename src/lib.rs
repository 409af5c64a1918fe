//! LabelMe two-point shapes to COCO converter
//!
//! This library converts a folder of labelled raw images into a resized,
//! COCO-format object detection dataset split into train and val, and ships
//! the tooling to resize images in bulk and to draw annotations or
//! detector predictions for inspection.

pub mod coco;
pub mod coco_dataset;
pub mod config;
pub mod dataset;
pub mod error;
pub mod geometry;
pub mod io;
pub mod resize;
pub mod size_class;
pub mod types;
pub mod utils;
pub mod visualize;

// Re-export commonly used types and functions
pub use coco::{CocoAssembler, CocoFile, IdCursor};
pub use coco_dataset::{process_coco_dataset, ConversionReport};
pub use config::{Args, BoxPolicy, ConvertConfig, IdScheme, ResizeArgs, VisualizeArgs};
pub use dataset::split_dataset;
pub use error::ConvertError;
pub use geometry::{normalize, BoundingBox, ScaleFactor};
pub use size_class::SizeClass;
pub use types::{LabelShape, SplitData};
