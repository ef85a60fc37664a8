use crate::error::{FailureKind, PipelineError};
use crate::pipeline::Processed;
use crate::utils::{calculate_compression_ratio, format_file_size};
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Counters shared by every worker of a pool.
#[derive(Debug, Default)]
pub struct RunStats {
    accepted: AtomicUsize,
    rejected: AtomicUsize,
    uploaded: AtomicUsize,
    compression_failures: AtomicUsize,
    upload_failures: AtomicUsize,
    deletion_failures: AtomicUsize,
    panics: AtomicUsize,
    original_bytes: AtomicU64,
    compressed_bytes: AtomicU64,
}

impl RunStats {
    pub fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_panic(&self) {
        self.panics.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record(&self, result: &Result<Processed, PipelineError>) {
        match result {
            Ok(processed) => {
                self.uploaded.fetch_add(1, Ordering::Relaxed);
                self.original_bytes
                    .fetch_add(processed.original_size, Ordering::Relaxed);
                self.compressed_bytes
                    .fetch_add(processed.compressed_size, Ordering::Relaxed);
            }
            Err(err) => {
                let counter = match err.kind() {
                    FailureKind::Validation => &self.rejected,
                    FailureKind::Compression => &self.compression_failures,
                    FailureKind::Upload => &self.upload_failures,
                    FailureKind::Deletion => &self.deletion_failures,
                };
                counter.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self, elapsed: Duration) -> RunSummary {
        RunSummary {
            accepted: self.accepted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            uploaded: self.uploaded.load(Ordering::Relaxed),
            compression_failures: self.compression_failures.load(Ordering::Relaxed),
            upload_failures: self.upload_failures.load(Ordering::Relaxed),
            deletion_failures: self.deletion_failures.load(Ordering::Relaxed),
            panics: self.panics.load(Ordering::Relaxed),
            original_bytes: self.original_bytes.load(Ordering::Relaxed),
            compressed_bytes: self.compressed_bytes.load(Ordering::Relaxed),
            elapsed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub accepted: usize,
    pub rejected: usize,
    pub uploaded: usize,
    pub compression_failures: usize,
    pub upload_failures: usize,
    pub deletion_failures: usize,
    pub panics: usize,
    pub original_bytes: u64,
    pub compressed_bytes: u64,
    pub elapsed: Duration,
}

impl RunSummary {
    /// Accepted files that did not complete every step.
    pub fn failed(&self) -> usize {
        self.compression_failures + self.upload_failures + self.deletion_failures + self.panics
    }

    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    pub fn print(&self) {
        let ratio = calculate_compression_ratio(self.original_bytes, self.compressed_bytes);
        let secs = self.elapsed.as_secs_f64();

        crate::info!("\n📊 Run Summary:");
        crate::info!("  📁 Files queued: {}", self.accepted);
        crate::info!("  ✅ Uploaded and removed: {}", self.uploaded);
        if self.rejected > 0 {
            crate::info!("  🚫 Rejected (unsupported format): {}", self.rejected);
        }
        crate::info!(
            "  📊 Total original size: {}",
            format_file_size(self.original_bytes)
        );
        crate::info!(
            "  📈 Total compressed size: {}",
            format_file_size(self.compressed_bytes)
        );
        crate::info!("  🎯 Overall compression ratio: {:.1}%", ratio);
        crate::info!("  ⏱️  Total time: {:.2?}", self.elapsed);
        if secs > 0.0 {
            crate::info!("  ⚡ Average speed: {:.2} files/second", self.uploaded as f64 / secs);
        }

        if !self.is_success() {
            crate::warn!(
                "Failed files: {} (compression: {}, upload: {}, removal: {}, crashed: {})",
                self.failed(),
                self.compression_failures,
                self.upload_failures,
                self.deletion_failures,
                self.panics
            );
        }
    }
}
