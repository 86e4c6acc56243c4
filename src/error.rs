use thiserror::Error;

/// Per-file failure taxonomy. Every variant is handled at single-file
/// granularity so one bad input never aborts a run.
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("pixel mode {0:?} has no DICOM photometric interpretation")]
    UnsupportedMode(image::ColorType),

    #[error("failed to encode DICOM dataset: {0}")]
    Encode(String),

    #[error("filesystem error: {0}")]
    Filesystem(#[from] std::io::Error),
}
