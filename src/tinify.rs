use crate::compressor::Compressor;
use crate::config::Secret;
use crate::constants::{TINIFY_AUTH_USER, TINIFY_COMPRESSION_COUNT_HEADER, TINIFY_SHRINK_URL};
use crate::error::CompressionError;
use reqwest::header::LOCATION;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tokio::runtime::Handle;

#[derive(Debug, Deserialize)]
struct ShrinkResponse {
    output: Option<ShrinkOutput>,
}

#[derive(Debug, Deserialize)]
struct ShrinkOutput {
    #[allow(dead_code)]
    size: Option<u64>,
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ServiceError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    message: String,
}

/// Client for the TinyPNG shrink API.
///
/// The upload and the download of the result are two requests; both are
/// authenticated with the API key as the basic-auth password.
pub struct TinifyClient {
    http: reqwest::Client,
    api_key: Secret,
    shrink_url: String,
    runtime: Handle,
}

impl TinifyClient {
    pub fn new(api_key: Secret, runtime: Handle) -> Result<Self, CompressionError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("r2-squeeze/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_key,
            shrink_url: TINIFY_SHRINK_URL.to_string(),
            runtime,
        })
    }

    /// Sends `data` to the shrink endpoint and downloads the compressed result.
    pub async fn compress_bytes(&self, data: Vec<u8>) -> Result<Vec<u8>, CompressionError> {
        let response = self
            .http
            .post(&self.shrink_url)
            .basic_auth(TINIFY_AUTH_USER, Some(self.api_key.expose()))
            .body(data)
            .send()
            .await?;

        if let Some(count) = response
            .headers()
            .get(TINIFY_COMPRESSION_COUNT_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            crate::verbose!("Compressions this month: {}", count);
        }

        let status = response.status();
        if !status.is_success() {
            let body: ServiceError = response.json().await.unwrap_or_default();
            return Err(CompressionError::Service {
                status: status.as_u16(),
                error: body.error,
                message: body.message,
            });
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let location = match location {
            Some(url) => url,
            None => output_url(response.json().await?)?,
        };

        let output = self
            .http
            .get(&location)
            .basic_auth(TINIFY_AUTH_USER, Some(self.api_key.expose()))
            .send()
            .await?
            .error_for_status()?;

        Ok(output.bytes().await?.to_vec())
    }
}

fn output_url(body: ShrinkResponse) -> Result<String, CompressionError> {
    body.output
        .and_then(|output| output.url)
        .ok_or(CompressionError::MissingOutput)
}

impl Compressor for TinifyClient {
    fn compress(&self, path: &Path) -> Result<Vec<u8>, CompressionError> {
        let data = fs::read(path)?;
        self.runtime.block_on(self.compress_bytes(data))
    }
}
