//! Image relay to the Sirv image host.

use std::time::Duration;

use reqwest::{header::CONTENT_TYPE, Client};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::config::ImageHostConfig;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("File name has no usable characters")]
    InvalidFileName,
    #[error("Image host request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Image host returned {status}: {body}")]
    Rejected { status: u16, body: String },
    #[error("Image host returned an empty token")]
    EmptyToken,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    token: String,
}

/// Spaces become underscores; anything other than ASCII alphanumerics,
/// `.`, `-` and `_` is dropped.
pub fn clean_file_name(name: &str) -> Result<String, ImageError> {
    let cleaned: String = name
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('_'),
            c if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') => Some(c),
            _ => None,
        })
        .collect();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return Err(ImageError::InvalidFileName);
    }
    Ok(cleaned)
}

pub struct ImageHost {
    client: Client,
    config: ImageHostConfig,
}

impl ImageHost {
    pub fn new(config: ImageHostConfig) -> Result<Self, ImageError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { client, config })
    }

    /// Uploads `bytes` under the configured folder and returns the public URL.
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    pub async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ImageError> {
        let name = clean_file_name(file_name)?;
        let token = self.token().await?;
        let api = self.config.api_url.trim_end_matches('/');
        let folder = self.config.folder.trim_matches('/');

        let response = self
            .client
            .post(format!("{api}/v2/files/upload"))
            .query(&[("filename", format!("/{folder}/{name}"))])
            .bearer_auth(token)
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(bytes)
            .send()
            .await?;
        ensure_success(response).await?;

        let url = format!("{}{folder}/{name}", self.config.public_url);
        info!(%url, "Image uploaded");
        Ok(url)
    }

    async fn token(&self) -> Result<String, ImageError> {
        let api = self.config.api_url.trim_end_matches('/');
        let response = self
            .client
            .post(format!("{api}/v2/token"))
            .json(&TokenRequest {
                client_id: &self.config.client_id,
                client_secret: self.config.client_secret.expose_secret(),
            })
            .send()
            .await?;
        let body: TokenResponse = ensure_success(response).await?.json().await?;
        if body.token.is_empty() {
            return Err(ImageError::EmptyToken);
        }
        Ok(body.token)
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ImageError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ImageError::Rejected { status: status.as_u16(), body })
}
