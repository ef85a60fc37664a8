pub const DEFAULT_WORKER_COUNT: usize = 10;
pub const DEFAULT_IMAGES_DIR: &str = "images";
pub const DEFAULT_R2_REGION: &str = "auto";

pub const SUPPORTED_IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];
pub const OPTIMIZED_SUFFIX: &str = "-optimized.jpg";

pub const DEFAULT_QUALITY: u8 = 80;
pub const MIN_QUALITY: u8 = 1;
pub const MAX_QUALITY: u8 = 100;

/// Maximum file size accepted by the local compressor (100MB)
pub const MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;
pub const MAX_IMAGE_DIMENSION: u32 = 16384;

pub const TINIFY_SHRINK_URL: &str = "https://api.tinify.com/shrink";
pub const TINIFY_AUTH_USER: &str = "api";
pub const TINIFY_COMPRESSION_COUNT_HEADER: &str = "compression-count";

pub const WORKER_THREAD_PREFIX: &str = "squeeze-worker";

pub const PROGRESS_BAR_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}";
pub const PROGRESS_BAR_CHARS: &str = "#>-";

// Environment variable names
pub const ENV_TINIFY_TOKEN: &str = "TINIFY_TOKEN";
pub const ENV_PREFIX: &str = "PREFIX";
pub const ENV_BUCKET_NAME: &str = "BUCKET_NAME";
pub const ENV_R2_ENDPOINT_URL: &str = "R2_ENDPOINT_URL";
pub const ENV_R2_ACCESS_KEY_ID: &str = "R2_ACCESS_KEY_ID";
pub const ENV_R2_SECRET_ACCESS_KEY: &str = "R2_SECRET_ACCESS_KEY";
pub const ENV_R2_REGION: &str = "R2_REGION";
pub const ENV_NUM_THREADS: &str = "NUM_THREADS";
pub const ENV_IMAGES_DIR: &str = "IMAGES_DIR";
