#![allow(dead_code)]

use r2_squeeze::{CompressionError, Compressor, ObjectStore, Pipeline, StorageError};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

pub const BUCKET: &str = "assets";
pub const PREFIX: &str = "blog";

/// Compressor double: prefixes the file contents, or fails/panics for chosen names.
#[derive(Default)]
pub struct FakeCompressor {
    pub fail_on: HashSet<String>,
    pub panic_on: HashSet<String>,
    /// Return fixed bytes without reading the source file
    pub constant_output: Option<Vec<u8>>,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub threads: Mutex<HashSet<String>>,
}

impl FakeCompressor {
    pub fn failing_on(names: &[&str]) -> Self {
        Self {
            fail_on: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn panicking_on(names: &[&str]) -> Self {
        Self {
            panic_on: names.iter().map(|n| n.to_string()).collect(),
            ..Default::default()
        }
    }
}

impl Compressor for FakeCompressor {
    fn compress(&self, path: &Path) -> Result<Vec<u8>, CompressionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(name) = thread::current().name() {
            self.threads.lock().unwrap().insert(name.to_string());
        }
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }

        let name = file_name(path);
        if self.panic_on.contains(&name) {
            panic!("compressor blew up on {}", name);
        }
        if self.fail_on.contains(&name) {
            return Err(CompressionError::Service {
                status: 429,
                error: "TooManyRequests".to_string(),
                message: "Your monthly limit has been exceeded".to_string(),
            });
        }
        if let Some(bytes) = &self.constant_output {
            return Ok(bytes.clone());
        }

        let mut data = b"compressed:".to_vec();
        data.extend(std::fs::read(path)?);
        Ok(data)
    }
}

type PutHook = Box<dyn Fn(&str) + Send + Sync>;

/// In-memory bucket.
#[derive(Default)]
pub struct MemoryStore {
    pub objects: Mutex<HashMap<(String, String), Vec<u8>>>,
    pub fail_keys: HashSet<String>,
    pub puts: AtomicUsize,
    pub on_put: Option<PutHook>,
}

impl MemoryStore {
    pub fn failing_on(keys: &[&str]) -> Self {
        Self {
            fail_keys: keys.iter().map(|k| k.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap()
            .get(&(BUCKET.to_string(), key.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

impl ObjectStore for MemoryStore {
    fn put_object(
        &self,
        bucket: &str,
        key: &str,
        body: Vec<u8>,
        _content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if self.fail_keys.contains(key) {
            return Err(StorageError::Request(format!("AccessDenied for {}", key)));
        }
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), body);
        if let Some(hook) = &self.on_put {
            hook(key);
        }
        Ok(())
    }
}

pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

pub fn create_images_dir(names: &[&str]) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let images = temp_dir.path().join("images");
    std::fs::create_dir(&images).unwrap();
    for name in names {
        File::create(images.join(name))
            .unwrap()
            .write_all(format!("pixels of {}", name).as_bytes())
            .unwrap();
    }
    (temp_dir, images)
}

pub fn pipeline(
    images: &Path,
    compressor: Arc<FakeCompressor>,
    store: Arc<MemoryStore>,
) -> Arc<Pipeline> {
    Arc::new(Pipeline::new(images, BUCKET, PREFIX, compressor, store))
}
