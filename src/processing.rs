use crate::compressor::Compressor;
use crate::constants::{
    DEFAULT_QUALITY, MAX_FILE_SIZE, MAX_IMAGE_DIMENSION, MAX_QUALITY, MIN_QUALITY,
};
use crate::error::CompressionError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct CompressionOptions {
    pub quality: u8,
}

impl CompressionOptions {
    pub fn new(quality: Option<u8>) -> Result<Self, CompressionError> {
        let quality = quality.unwrap_or(DEFAULT_QUALITY);
        if !(MIN_QUALITY..=MAX_QUALITY).contains(&quality) {
            return Err(CompressionError::InvalidQuality(quality));
        }

        Ok(Self { quality })
    }
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
        }
    }
}

/// Loads an image file and returns it along with its size in bytes.
///
/// # Security Features
/// - Checks file size before attempting to decode the image
/// - Validates image dimensions to prevent memory exhaustion
pub fn load_image_with_metadata(input_path: &Path) -> Result<(DynamicImage, u64), CompressionError> {
    let file_size = fs::metadata(input_path)?.len();
    if file_size > MAX_FILE_SIZE {
        return Err(CompressionError::FileTooLarge(file_size, MAX_FILE_SIZE));
    }

    let img = ImageReader::open(input_path)?
        .with_guessed_format()?
        .decode()?;

    let (width, height) = img.dimensions();
    if width > MAX_IMAGE_DIMENSION || height > MAX_IMAGE_DIMENSION {
        return Err(CompressionError::InvalidDimensions(
            width,
            height,
            MAX_IMAGE_DIMENSION,
        ));
    }

    Ok((img, file_size))
}

/// Encodes an image as baseline JPEG. Alpha is dropped.
pub fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, CompressionError> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    DynamicImage::ImageRgb8(img.to_rgb8()).write_with_encoder(encoder)?;
    Ok(buffer)
}

/// Offline compressor that re-encodes every image as JPEG, matching the
/// `.jpg` name given to uploaded objects.
#[derive(Debug, Clone, Default)]
pub struct LocalCompressor {
    options: CompressionOptions,
}

impl LocalCompressor {
    pub fn new(options: CompressionOptions) -> Self {
        Self { options }
    }
}

impl Compressor for LocalCompressor {
    fn compress(&self, path: &Path) -> Result<Vec<u8>, CompressionError> {
        let (img, original_size) = load_image_with_metadata(path)?;
        let encoded = encode_jpeg(&img, self.options.quality)?;
        crate::verbose!(
            "Re-encoded {:?} ({}x{}): {} -> {} bytes",
            path,
            img.width(),
            img.height(),
            original_size,
            encoded.len()
        );
        Ok(encoded)
    }
}
