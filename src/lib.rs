pub mod logger;
pub mod batch;
pub mod cli;
pub mod compressor;
pub mod config;
pub mod constants;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod processing;
pub mod queue;
pub mod stats;
pub mod storage;
pub mod tinify;
pub mod utils;

pub use batch::{list_image_dir, plan_batch, run_batch, PlannedFile};
pub use compressor::{Compressor, CompressorKind};
pub use config::{Config, Secret};
pub use error::{CompressionError, ConfigError, FailureKind, PipelineError, StorageError};
pub use pipeline::{image_extension, is_supported_image, object_key, Job, Pipeline, Processed};
pub use pool::SqueezePool;
pub use processing::{CompressionOptions, LocalCompressor};
pub use queue::JobQueue;
pub use stats::{RunStats, RunSummary};
pub use storage::{ObjectStore, S3Store};
pub use tinify::TinifyClient;
