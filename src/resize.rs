//! Bulk resizing of a directory of images.

use log::{error, info};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ConvertError;
use crate::io::resize_image;
use crate::types::IMG_FORMATS;
use crate::utils::{create_progress_bar, lowercase_extension};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResizeSummary {
    pub resized: usize,
    pub failed: usize,
}

/// Image files directly inside `input_dir`, sorted by path
pub fn list_images(input_dir: &Path) -> Result<Vec<PathBuf>, ConvertError> {
    let entries = fs::read_dir(input_dir).map_err(|e| ConvertError::io(input_dir, e))?;

    let mut images: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.is_file())
        .filter(|path| {
            lowercase_extension(path).is_some_and(|ext| IMG_FORMATS.contains(&ext.as_str()))
        })
        .collect();
    images.sort();
    Ok(images)
}

/// Resize every image of `input_dir` into `output_dir` under the same file name.
///
/// Files that fail are logged and counted; the rest are still processed.
pub fn resize_directory(
    input_dir: &Path,
    output_dir: &Path,
    width: u32,
    height: u32,
) -> Result<ResizeSummary, ConvertError> {
    fs::create_dir_all(output_dir).map_err(|e| ConvertError::io(output_dir, e))?;
    let images = list_images(input_dir)?;

    let pb = create_progress_bar(images.len() as u64, "Resize");
    let failed = images
        .par_iter()
        .filter(|path| {
            let Some(file_name) = path.file_name() else {
                return true;
            };
            let result = resize_image(path, &output_dir.join(file_name), width, height);
            pb.inc(1);
            match result {
                Ok(()) => {
                    info!("Resized and saved: {}", path.display());
                    false
                }
                Err(e) => {
                    error!("Error resizing {}: {}", path.display(), e);
                    true
                }
            }
        })
        .count();
    pb.finish_with_message("Resize complete");

    Ok(ResizeSummary {
        resized: images.len() - failed,
        failed,
    })
}
