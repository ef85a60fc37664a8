use crate::constants::{
    DEFAULT_IMAGES_DIR, DEFAULT_R2_REGION, DEFAULT_WORKER_COUNT, ENV_BUCKET_NAME,
    ENV_IMAGES_DIR, ENV_NUM_THREADS, ENV_PREFIX, ENV_R2_ACCESS_KEY_ID, ENV_R2_ENDPOINT_URL,
    ENV_R2_REGION, ENV_R2_SECRET_ACCESS_KEY, ENV_TINIFY_TOKEN,
};
use crate::error::ConfigError;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

/// A credential that never shows up in `Debug` or `Display` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Run configuration, built once at process entry and handed to the pool.
#[derive(Debug, Clone)]
pub struct Config {
    pub tinify_token: Option<Secret>,
    pub prefix: String,
    pub bucket_name: String,
    pub r2_endpoint_url: String,
    pub r2_access_key: Secret,
    pub r2_secret_access_key: Secret,
    pub r2_region: String,
    pub worker_count: NonZeroUsize,
    pub images_dir: PathBuf,
}

impl Config {
    /// Reads the configuration from the process environment.
    ///
    /// A `.env` file in the working directory is loaded first if one exists;
    /// variables already set in the environment take precedence over it.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::from_lookup(&cwd, |key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// Relative image directories are resolved against `base_dir`.
    pub fn from_lookup<F>(base_dir: &Path, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| -> Result<String, ConfigError> {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let worker_count = match optional(ENV_NUM_THREADS) {
            Some(value) => parse_worker_count(ENV_NUM_THREADS, &value)?,
            None => NonZeroUsize::new(DEFAULT_WORKER_COUNT).unwrap_or(NonZeroUsize::MIN),
        };

        let images_dir = optional(ENV_IMAGES_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_IMAGES_DIR));

        Ok(Self {
            tinify_token: optional(ENV_TINIFY_TOKEN).map(Secret::new),
            prefix: required(ENV_PREFIX)?,
            bucket_name: required(ENV_BUCKET_NAME)?,
            r2_endpoint_url: required(ENV_R2_ENDPOINT_URL)?,
            r2_access_key: Secret::new(required(ENV_R2_ACCESS_KEY_ID)?),
            r2_secret_access_key: Secret::new(required(ENV_R2_SECRET_ACCESS_KEY)?),
            r2_region: optional(ENV_R2_REGION).unwrap_or_else(|| DEFAULT_R2_REGION.to_string()),
            worker_count,
            images_dir: resolve_dir(base_dir, images_dir),
        })
    }

    pub fn tinify_token(&self) -> Result<&Secret, ConfigError> {
        self.tinify_token
            .as_ref()
            .ok_or(ConfigError::Missing(ENV_TINIFY_TOKEN))
    }

    pub fn with_worker_count(mut self, worker_count: Option<NonZeroUsize>) -> Self {
        if let Some(count) = worker_count {
            self.worker_count = count;
        }
        self
    }

    pub fn with_images_dir(mut self, images_dir: Option<PathBuf>) -> Self {
        if let Some(dir) = images_dir {
            self.images_dir = dir;
        }
        self
    }
}

fn parse_worker_count(name: &'static str, value: &str) -> Result<NonZeroUsize, ConfigError> {
    value
        .trim()
        .parse::<NonZeroUsize>()
        .map_err(|e| ConfigError::Invalid {
            name,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn resolve_dir(base_dir: &Path, dir: PathBuf) -> PathBuf {
    if dir.is_absolute() {
        dir
    } else {
        base_dir.join(dir)
    }
}
