//! COCO dataset conversion pipeline
//!
//! Pairs label files with their images, splits the pairs into train and val,
//! resizes every image to the target resolution and writes one COCO document
//! per split.

use log::{debug, info, warn};
use std::path::Path;

use crate::coco::{CocoAssembler, CocoFile};
use crate::config::{BoxPolicy, ConvertConfig, IdScheme};
use crate::dataset::{create_rng, split_dataset};
use crate::error::ConvertError;
use crate::geometry::{apply_box_policy, normalize, BoundingBox, ScaleFactor};
use crate::io::{collect_label_files, pair_label_files, resize_image, setup_output_directories};
use crate::types::{LabelPair, ProcessingStats};
use crate::utils::{create_progress_bar, read_label_file, write_json_pretty};

/// Documents and counters produced by a conversion run
#[derive(Debug, Clone)]
pub struct ConversionReport {
    pub train: CocoFile,
    pub val: CocoFile,
    pub stats: ProcessingStats,
}

/// Resolution and box handling shared by every file of a run
#[derive(Debug, Clone, Copy)]
struct Resampling {
    scale: ScaleFactor,
    target_width: u32,
    target_height: u32,
    box_policy: BoxPolicy,
}

impl Resampling {
    fn from_config(config: &ConvertConfig) -> Self {
        Self {
            scale: ScaleFactor::from_resolutions(
                config.original_width,
                config.original_height,
                config.target_width,
                config.target_height,
            ),
            target_width: config.target_width,
            target_height: config.target_height,
            box_policy: config.box_policy,
        }
    }
}

/// Parameters for processing the pairs of one split
struct ProcessSplitParams<'a> {
    label: &'a str,
    pairs: &'a [LabelPair],
    images_dir: &'a Path,
    resampling: Resampling,
    assembler: &'a mut CocoAssembler,
    stats: &'a mut ProcessingStats,
}

/// Main COCO dataset processing pipeline
pub fn process_coco_dataset(config: &ConvertConfig) -> Result<ConversionReport, ConvertError> {
    config.validate()?;

    let label_files = collect_label_files(&config.json_dir)?;
    if !config.image_dir.is_dir() {
        return Err(ConvertError::io(
            &config.image_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "image directory not found"),
        ));
    }
    info!(
        "Found {} label files in {}",
        label_files.len(),
        config.json_dir.display()
    );

    let mut stats = ProcessingStats::new();
    stats.total_label_files = label_files.len();

    let pairs = pair_label_files(label_files, &config.image_dir, &mut stats);

    let mut rng = create_rng(config.seed);
    let split = split_dataset(pairs, config.train_ratio, &mut rng);
    info!(
        "Split {} matched pairs into {} train and {} val",
        split.train.len() + split.val.len(),
        split.train.len(),
        split.val.len()
    );

    let output_dirs = setup_output_directories(&config.output_dir)?;
    let resampling = Resampling::from_config(config);

    let mut train_assembler = CocoAssembler::new();
    process_split(ProcessSplitParams {
        label: "Train",
        pairs: &split.train,
        images_dir: &output_dirs.train_images_dir,
        resampling,
        assembler: &mut train_assembler,
        stats: &mut stats,
    });

    let mut val_assembler = match config.id_scheme {
        IdScheme::Global => CocoAssembler::starting_at(train_assembler.cursor()),
        IdScheme::PerSplit => CocoAssembler::new(),
    };
    process_split(ProcessSplitParams {
        label: "Val",
        pairs: &split.val,
        images_dir: &output_dirs.val_images_dir,
        resampling,
        assembler: &mut val_assembler,
        stats: &mut stats,
    });

    let train = train_assembler.serialize();
    let val = val_assembler.serialize();

    info!("Writing COCO JSON files...");
    write_json_pretty(&output_dirs.annotations_dir.join("train.json"), &train)?;
    write_json_pretty(&output_dirs.annotations_dir.join("val.json"), &val)?;

    info!(
        "Train images: {}, Val images: {}",
        train.images.len(),
        val.images.len()
    );
    stats.print_summary();

    Ok(ConversionReport { train, val, stats })
}

/// Convert every pair of one split, skipping the files that fail
fn process_split(params: ProcessSplitParams) {
    let ProcessSplitParams {
        label,
        pairs,
        images_dir,
        resampling,
        assembler,
        stats,
    } = params;

    let pb = create_progress_bar(pairs.len() as u64, label);
    for pair in pairs {
        match process_pair(pair, images_dir, resampling, assembler) {
            Ok(annotation_count) => {
                stats.converted_images += 1;
                stats.annotations += annotation_count;
            }
            Err(e) => {
                warn!("Skipping {}: {}", pair.label_path.display(), e);
                stats.record_skip(&e);
            }
        }
        pb.inc(1);
    }
    pb.finish_with_message(format!("{} processing complete", label));
}

/// Convert one label/image pair. Nothing is registered unless the whole file succeeds.
fn process_pair(
    pair: &LabelPair,
    images_dir: &Path,
    resampling: Resampling,
    assembler: &mut CocoAssembler,
) -> Result<usize, ConvertError> {
    let label_file = read_label_file(&pair.label_path)?;
    let shapes = label_file.label_shapes(&pair.label_path)?;

    let boxes = shapes
        .iter()
        .map(|shape| {
            let bbox = normalize(shape, resampling.scale);
            apply_box_policy(
                bbox,
                resampling.box_policy,
                resampling.target_width,
                resampling.target_height,
            )
            .ok_or_else(|| {
                ConvertError::malformed(
                    &pair.label_path,
                    format!("box {:?} lies outside the target image", <[f64; 4]>::from(bbox)),
                )
            })
        })
        .collect::<Result<Vec<BoundingBox>, _>>()?;

    let file_name = pair.image_file_name();
    resize_image(
        &pair.image_path,
        &images_dir.join(&file_name),
        resampling.target_width,
        resampling.target_height,
    )?;

    let image_id = assembler.add_image(
        file_name,
        resampling.target_width,
        resampling.target_height,
    );
    for bbox in &boxes {
        let annotation_id = assembler.add_annotation(image_id, *bbox);
        debug!(
            "image {} annotation {}: {:?}",
            image_id,
            annotation_id,
            <[f64; 4]>::from(*bbox)
        );
    }

    Ok(boxes.len())
}
