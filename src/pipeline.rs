use crate::compressor::Compressor;
use crate::constants::{OPTIMIZED_SUFFIX, SUPPORTED_IMAGE_EXTENSIONS};
use crate::error::{PipelineError, Result};
use crate::storage::ObjectStore;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An entry of the shared work queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Job {
    /// Name of a file inside the images directory
    File(String),
    /// Terminates exactly one worker
    Stop,
}

/// Extension of `file_name` as the segment following its first dot.
///
/// `my.photo.png` yields `photo`, not `png`.
pub fn image_extension(file_name: &str) -> Option<&str> {
    file_name.split('.').nth(1)
}

/// Name before the first dot.
pub fn file_stem(file_name: &str) -> &str {
    file_name.split('.').next().unwrap_or(file_name)
}

/// Check if a file name carries a supported image extension (case-insensitive)
pub fn is_supported_image(file_name: &str) -> bool {
    image_extension(file_name)
        .map(|ext| {
            let ext_lower = ext.to_lowercase();
            SUPPORTED_IMAGE_EXTENSIONS.contains(&ext_lower.as_str())
        })
        .unwrap_or(false)
}

/// Storage key for the compressed form of `file_name`: `{prefix}/{stem}-optimized.jpg`.
///
/// The `.jpg` suffix is used whatever the source format.
pub fn object_key(prefix: &str, file_name: &str) -> String {
    let prefix = prefix.trim_end_matches('/');
    let stem = file_stem(file_name);
    if prefix.is_empty() {
        format!("{}{}", stem, OPTIMIZED_SUFFIX)
    } else {
        format!("{}/{}{}", prefix, stem, OPTIMIZED_SUFFIX)
    }
}

/// Result of a file that went through every step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Processed {
    pub key: String,
    pub original_size: u64,
    pub compressed_size: u64,
}

/// The per-file steps: compress, upload, delete.
///
/// Each step runs only after the previous one succeeded; the first failure
/// is returned and nothing after it is attempted.
pub struct Pipeline {
    images_dir: PathBuf,
    bucket: String,
    prefix: String,
    compressor: Arc<dyn Compressor>,
    store: Arc<dyn ObjectStore>,
}

impl Pipeline {
    pub fn new(
        images_dir: impl Into<PathBuf>,
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        compressor: Arc<dyn Compressor>,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        Self {
            images_dir: images_dir.into(),
            bucket: bucket.into(),
            prefix: prefix.into(),
            compressor,
            store,
        }
    }

    pub fn images_dir(&self) -> &Path {
        &self.images_dir
    }

    pub fn key_for(&self, file_name: &str) -> String {
        object_key(&self.prefix, file_name)
    }

    pub fn process(&self, file_name: &str) -> Result<Processed> {
        let path = self.images_dir.join(file_name);
        let original_size = fs::metadata(&path).map(|m| m.len()).unwrap_or(0);

        crate::verbose!("Compressing {}", file_name);
        let buffer = self
            .compressor
            .compress(&path)
            .map_err(|source| PipelineError::Compression {
                file: file_name.to_string(),
                source,
            })?;
        let compressed_size = buffer.len() as u64;

        let key = self.key_for(file_name);
        let content_type = image::guess_format(&buffer)
            .ok()
            .map(|format| format.to_mime_type());

        crate::verbose!("Uploading {} to {}/{}", file_name, self.bucket, key);
        self.store
            .put_object(&self.bucket, &key, buffer, content_type)
            .map_err(|source| PipelineError::Upload {
                file: file_name.to_string(),
                key: key.clone(),
                source,
            })?;

        fs::remove_file(&path).map_err(|source| PipelineError::Deletion {
            file: file_name.to_string(),
            key: key.clone(),
            source,
        })?;

        Ok(Processed {
            key,
            original_size,
            compressed_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CompressionError, FailureKind, StorageError};
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct EchoCompressor;

    impl Compressor for EchoCompressor {
        fn compress(&self, path: &Path) -> std::result::Result<Vec<u8>, CompressionError> {
            let mut data = b"squeezed:".to_vec();
            data.extend(fs::read(path)?);
            Ok(data)
        }
    }

    #[derive(Default)]
    struct RecordingStore {
        fail: bool,
        puts: Mutex<Vec<(String, String, Vec<u8>)>>,
    }

    impl ObjectStore for RecordingStore {
        fn put_object(
            &self,
            bucket: &str,
            key: &str,
            body: Vec<u8>,
            _content_type: Option<&str>,
        ) -> std::result::Result<(), StorageError> {
            if self.fail {
                return Err(StorageError::Request("bucket unavailable".to_string()));
            }
            self.puts
                .lock()
                .unwrap()
                .push((bucket.to_string(), key.to_string(), body));
            Ok(())
        }
    }

    fn pipeline(dir: &Path, store: Arc<RecordingStore>) -> Pipeline {
        Pipeline::new(dir, "assets", "blog", Arc::new(EchoCompressor), store)
    }

    #[test]
    fn test_image_extension_uses_first_dot() {
        assert_eq!(image_extension("photo.PNG"), Some("PNG"));
        assert_eq!(image_extension("my.photo.v2.png"), Some("photo"));
        assert_eq!(image_extension("archive.tar.gz"), Some("tar"));
        assert_eq!(image_extension(".hidden"), Some("hidden"));
        assert_eq!(image_extension("README"), None);
    }

    #[test]
    fn test_is_supported_image() {
        assert!(is_supported_image("a.jpg"));
        assert!(is_supported_image("a.JPEG"));
        assert!(is_supported_image("a.png"));
        assert!(is_supported_image("a.WebP"));
        assert!(is_supported_image("a.jpg.bak"));

        assert!(!is_supported_image("doc.txt"));
        assert!(!is_supported_image("a.gif"));
        assert!(!is_supported_image("noext"));
        assert!(!is_supported_image("my.photo.png"));
    }

    #[test]
    fn test_object_key() {
        assert_eq!(object_key("blog", "photo.PNG"), "blog/photo-optimized.jpg");
        assert_eq!(object_key("blog/", "shot.jpeg"), "blog/shot-optimized.jpg");
        assert_eq!(object_key("a/b", "x.webp"), "a/b/x-optimized.jpg");
        assert_eq!(object_key("", "x.webp"), "x-optimized.jpg");
    }

    #[test]
    fn test_process_uploads_then_deletes() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("photo.png"), b"pixels").unwrap();
        let store = Arc::new(RecordingStore::default());

        let processed = pipeline(temp_dir.path(), store.clone())
            .process("photo.png")
            .unwrap();

        assert_eq!(processed.key, "blog/photo-optimized.jpg");
        assert_eq!(processed.original_size, 6);
        assert_eq!(processed.compressed_size, 15);
        assert!(!temp_dir.path().join("photo.png").exists());

        let puts = store.puts.lock().unwrap();
        assert_eq!(puts.len(), 1);
        assert_eq!(puts[0].0, "assets");
        assert_eq!(puts[0].1, "blog/photo-optimized.jpg");
        assert_eq!(puts[0].2, b"squeezed:pixels".to_vec());
    }

    #[test]
    fn test_process_missing_file_is_compression_error() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(RecordingStore::default());

        let err = pipeline(temp_dir.path(), store.clone())
            .process("gone.jpg")
            .unwrap_err();

        assert_eq!(err.kind(), FailureKind::Compression);
        assert_eq!(err.file(), "gone.jpg");
        assert!(store.puts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_process_upload_failure_keeps_file() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("shot.jpeg"), b"pixels").unwrap();
        let store = Arc::new(RecordingStore {
            fail: true,
            ..Default::default()
        });

        let err = pipeline(temp_dir.path(), store).process("shot.jpeg").unwrap_err();

        assert!(matches!(err, PipelineError::Upload { ref key, .. } if key == "blog/shot-optimized.jpg"));
        assert!(temp_dir.path().join("shot.jpeg").exists());
    }
}
