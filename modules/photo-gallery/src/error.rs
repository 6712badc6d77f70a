use thiserror::Error;

use flickr_client::FlickrError;

pub type Result<T> = std::result::Result<T, GalleryError>;

#[derive(Error, Debug)]
pub enum GalleryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Flickr(#[from] FlickrError),
}

/// Outcome of a single page request that did not produce a page.
#[derive(Error, Debug)]
pub enum FetchError {
    /// A newer (query, page) pair took over before this request finished.
    #[error("request superseded")]
    Cancelled,

    #[error(transparent)]
    Upstream(#[from] FlickrError),
}
