use std::env;
use std::path::PathBuf;
use std::time::Duration;

use flickr_client::{FlickrClient, DEFAULT_BASE_URL};
use tracing::info;

use crate::error::{GalleryError, Result};

pub const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_HISTORY_PATH: &str = ".photo-gallery/history.json";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Flickr
    pub flickr_api_key: String,
    pub flickr_base_url: String,

    // Paging
    pub page_size: u32,
    pub safe_search: bool,
    pub request_timeout: Duration,

    // Suggestion history
    pub history_path: PathBuf,
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let flickr_api_key = lookup("FLICKR_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                GalleryError::Config("FLICKR_API_KEY environment variable is required".into())
            })?;

        let page_size: u32 = parse_or(&lookup, "GALLERY_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(GalleryError::Config(
                "GALLERY_PAGE_SIZE must be at least 1".into(),
            ));
        }

        Ok(Self {
            flickr_api_key,
            flickr_base_url: lookup("FLICKR_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            page_size,
            safe_search: parse_or(&lookup, "GALLERY_SAFE_SEARCH", true)?,
            request_timeout: Duration::from_secs(parse_or(
                &lookup,
                "GALLERY_REQUEST_TIMEOUT_SECS",
                DEFAULT_TIMEOUT_SECS,
            )?),
            history_path: history_path(&lookup),
        })
    }

    /// Where the suggestion history lives, without requiring an API key.
    pub fn history_path_from_env() -> PathBuf {
        history_path(&|key: &str| env::var(key).ok())
    }

    /// Build the upstream client this configuration describes.
    pub fn flickr_client(&self) -> Result<FlickrClient> {
        Ok(FlickrClient::builder(&self.flickr_api_key)
            .base_url(&self.flickr_base_url)
            .timeout(self.request_timeout)
            .safe_search(self.safe_search)
            .build()?)
    }

    /// Log the effective configuration with the API key masked.
    pub fn log_redacted(&self) {
        info!(
            flickr_api_key = %redact(&self.flickr_api_key),
            flickr_base_url = %self.flickr_base_url,
            page_size = self.page_size,
            safe_search = self.safe_search,
            request_timeout_secs = self.request_timeout.as_secs(),
            history_path = %self.history_path.display(),
            "Loaded configuration"
        );
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| GalleryError::Config(format!("{key} has an invalid value: {raw}"))),
        None => Ok(default),
    }
}

fn history_path<F>(lookup: &F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    lookup("GALLERY_HISTORY_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_PATH))
}

fn redact(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    format!("{visible}***")
}
