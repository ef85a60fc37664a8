use crate::error::CompressionError;
use std::path::Path;
use std::str::FromStr;

/// Turns a local image file into compressed bytes.
///
/// One instance is shared by every worker of a pool.
pub trait Compressor: Send + Sync {
    fn compress(&self, path: &Path) -> Result<Vec<u8>, CompressionError>;
}

/// Which compression backend a run uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressorKind {
    /// TinyPNG web service
    #[default]
    Tinify,
    /// In-process JPEG re-encoding
    Local,
}

impl FromStr for CompressorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tinify" | "tinypng" => Ok(CompressorKind::Tinify),
            "local" => Ok(CompressorKind::Local),
            _ => Err(format!("unknown compressor '{}' (expected tinify or local)", s)),
        }
    }
}
