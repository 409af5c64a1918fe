use glob::glob;
use image::imageops::FilterType;
use log::warn;
use std::path::{Path, PathBuf};

use crate::error::ConvertError;
use crate::types::{LabelPair, OutputDirs, ProcessingStats, MATCH_EXTENSIONS};
use crate::utils::create_output_directory;

/// Set up the directory structure of the converted dataset
pub fn setup_output_directories(output_dir: &Path) -> Result<OutputDirs, ConvertError> {
    let create = |path: PathBuf| {
        create_output_directory(&path).map_err(|e| ConvertError::io(&path, e))
    };

    Ok(OutputDirs {
        train_images_dir: create(output_dir.join("train_images"))?,
        val_images_dir: create(output_dir.join("val_images"))?,
        annotations_dir: create(output_dir.join("annotations"))?,
    })
}

/// List the label files directly inside `json_dir`, sorted by path
pub fn collect_label_files(json_dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    if !json_dir.is_dir() {
        return Err(ConvertError::io(
            json_dir,
            std::io::Error::new(std::io::ErrorKind::NotFound, "label directory not found"),
        ));
    }

    let pattern = format!(
        "{}/*.json",
        glob::Pattern::escape(&json_dir.to_string_lossy())
    );
    let entries = glob(&pattern).map_err(|e| {
        ConvertError::io(
            json_dir,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        )
    })?;

    let mut label_files: Vec<PathBuf> = entries
        .filter_map(|entry| match entry {
            Ok(path) => Some(path),
            Err(e) => {
                warn!("Failed to read directory entry: {}", e);
                None
            }
        })
        .filter(|path| path.is_file())
        .collect();
    label_files.sort();
    Ok(label_files)
}

/// Find the image sharing the label file's basename, trying each extension in order
pub fn find_matching_image(label_path: &Path, image_dir: &Path) -> Result<PathBuf, ConvertError> {
    let stem = label_path
        .file_stem()
        .ok_or_else(|| ConvertError::MissingMatch {
            label: label_path.to_path_buf(),
        })?;

    MATCH_EXTENSIONS
        .iter()
        .map(|ext| {
            let mut file_name = stem.to_os_string();
            file_name.push(".");
            file_name.push(ext);
            image_dir.join(file_name)
        })
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ConvertError::MissingMatch {
            label: label_path.to_path_buf(),
        })
}

/// Pair every label file with its image, dropping and reporting the unmatched ones
pub fn pair_label_files(
    label_files: Vec<PathBuf>,
    image_dir: &Path,
    stats: &mut ProcessingStats,
) -> Vec<LabelPair> {
    label_files
        .into_iter()
        .filter_map(|label_path| match find_matching_image(&label_path, image_dir) {
            Ok(image_path) => Some(LabelPair {
                label_path,
                image_path,
            }),
            Err(e) => {
                warn!("{}", e);
                stats.record_skip(&e);
                None
            }
        })
        .collect()
}

/// Resample the image at `src` to `width` x `height` with Lanczos3 and save it to `dst`
pub fn resize_image(src: &Path, dst: &Path, width: u32, height: u32) -> Result<(), ConvertError> {
    let image_io = |source: image::ImageError| ConvertError::ImageIo {
        file: src.to_path_buf(),
        source,
    };

    let img = image::open(src).map_err(image_io)?;
    let resized = img.resize_exact(width, height, FilterType::Lanczos3);
    resized.save(dst).map_err(image_io)
}
