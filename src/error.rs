use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while converting a label folder into COCO documents.
///
/// `MissingMatch`, `ImageIo` and `MalformedLabel` are per-file: the driver
/// logs them, skips the file and keeps going. `Config` and `Io` abort the run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("no matching image found for {}", .label.display())]
    MissingMatch { label: PathBuf },

    #[error("image I/O failed for {}: {source}", .file.display())]
    ImageIo {
        file: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("malformed label file {}: {reason}", .file.display())]
    MalformedLabel { file: PathBuf, reason: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(file: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        ConvertError::MalformedLabel {
            file: file.into(),
            reason: reason.into(),
        }
    }
}
