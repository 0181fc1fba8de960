use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForensicsError {
    #[error("Image codec error: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Input not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Rasterization failed: {0}")]
    Rasterize(String),

    #[error("Page image is empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("Map dimensions disagree: expected {expected:?}, got {actual:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Analysis failed: {0}")]
    AnalysisFailed(String),
}

pub type Result<T> = std::result::Result<T, ForensicsError>;
