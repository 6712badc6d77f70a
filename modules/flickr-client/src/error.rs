use thiserror::Error;

pub type Result<T> = std::result::Result<T, FlickrError>;

#[derive(Debug, Error)]
pub enum FlickrError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    /// Flickr answers most failures with HTTP 200 and `"stat": "fail"`.
    #[error("Flickr error {code}: {message}")]
    Upstream { code: i64, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FlickrError {
    fn from(err: reqwest::Error) -> Self {
        FlickrError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for FlickrError {
    fn from(err: serde_json::Error) -> Self {
        FlickrError::Parse(err.to_string())
    }
}
