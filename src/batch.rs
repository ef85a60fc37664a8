use crate::pipeline::{is_supported_image, object_key, Pipeline};
use crate::pool::SqueezePool;
use crate::stats::RunSummary;
use crate::utils::create_progress_bar;
use std::io;
use std::num::NonZeroUsize;
use std::path::Path;
use std::sync::Arc;
use walkdir::WalkDir;

/// Names of the regular files directly inside `dir`, sorted by name.
pub fn list_image_dir(dir: &Path) -> io::Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("images directory not found: {}", dir.display()),
        ));
    }

    let mut names = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        match entry.file_name().to_str() {
            Some(name) => names.push(name.to_string()),
            None => crate::warn!("Skipping non UTF-8 file name {:?}", entry.file_name()),
        }
    }

    Ok(names)
}

/// Submits every name to a fresh pool and waits for all of them to be handled.
pub fn run_batch(
    worker_count: NonZeroUsize,
    pipeline: Arc<Pipeline>,
    file_names: &[String],
) -> io::Result<RunSummary> {
    let progress = create_progress_bar(0);
    progress.set_message("Compressing images and uploading to R2");

    let pool = SqueezePool::start(worker_count, pipeline, progress.clone())?;
    crate::verbose!("Pool running with {} workers", pool.worker_count());

    for name in file_names {
        if pool.add_file(name).is_ok() {
            progress.suspend(|| crate::info!("📥 Added {} to queue", name));
        }
    }

    Ok(pool.shutdown())
}

/// One line of an offline run preview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub file_name: String,
    pub key: Option<String>,
}

/// What a run would do with each entry, without touching the network or disk.
pub fn plan_batch(prefix: &str, file_names: &[String]) -> Vec<PlannedFile> {
    file_names
        .iter()
        .map(|name| PlannedFile {
            file_name: name.clone(),
            key: is_supported_image(name).then(|| object_key(prefix, name)),
        })
        .collect()
}
