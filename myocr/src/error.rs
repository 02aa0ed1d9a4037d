use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("{0}")]
    Usage(String),

    #[error("Invalid format: {0}")]
    Format(String),

    #[error("failed to load image '{path}': {reason}")]
    Load { path: String, reason: String },

    #[error("failed to convert image '{path}': {reason}")]
    Conversion { path: String, reason: String },

    #[error("Crop error: {0}")]
    Crop(String),

    #[error("OCR error: {0}")]
    Engine(String),

    #[error("OCR unavailable: {0}")]
    EngineUnavailable(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, OcrError>;
