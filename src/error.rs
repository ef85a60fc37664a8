use thiserror::Error;

/// Failure of one file's pipeline. Every variant is terminal for that file only.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Not a valid image format: {file}")]
    Validation { file: String },

    #[error("Error optimizing {file}: {source}")]
    Compression {
        file: String,
        #[source]
        source: CompressionError,
    },

    #[error("Error uploading {file} to {key}: {source}")]
    Upload {
        file: String,
        key: String,
        #[source]
        source: StorageError,
    },

    #[error("Uploaded {file} to {key} but failed to remove it: {source}")]
    Deletion {
        file: String,
        key: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Validation,
    Compression,
    Upload,
    Deletion,
}

impl PipelineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            PipelineError::Validation { .. } => FailureKind::Validation,
            PipelineError::Compression { .. } => FailureKind::Compression,
            PipelineError::Upload { .. } => FailureKind::Upload,
            PipelineError::Deletion { .. } => FailureKind::Deletion,
        }
    }

    pub fn file(&self) -> &str {
        match self {
            PipelineError::Validation { file }
            | PipelineError::Compression { file, .. }
            | PipelineError::Upload { file, .. }
            | PipelineError::Deletion { file, .. } => file,
        }
    }
}

#[derive(Debug, Error)]
pub enum CompressionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Compression service rejected the request ({status}): {error}: {message}")]
    Service {
        status: u16,
        error: String,
        message: String,
    },

    #[error("Compression service returned no output location")]
    MissingOutput,

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("Invalid quality value: {0}. Must be between 1 and 100")]
    InvalidQuality(u8),

    #[error("File too large: {0} bytes. Maximum allowed: {1} bytes")]
    FileTooLarge(u64, u64),

    #[error("Invalid image dimensions: {0}x{1}. Maximum allowed: {2}x{2}")]
    InvalidDimensions(u32, u32, u32),

    #[error("{0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Object storage request failed: {0}")]
    Request(String),

    #[error("Invalid storage endpoint: {0}")]
    InvalidEndpoint(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value {value:?} for {name}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
