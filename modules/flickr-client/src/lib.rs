pub mod error;
pub mod types;

pub use error::{FlickrError, Result};
pub use types::{PhotoMethod, PhotoPage, PhotoQuery, RawPhoto};

use std::time::Duration;

use types::Envelope;

pub const DEFAULT_BASE_URL: &str = "https://www.flickr.com/services/rest/";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub struct FlickrClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    safe_search: bool,
}

impl FlickrClient {
    pub fn builder(api_key: impl Into<String>) -> FlickrClientBuilder {
        FlickrClientBuilder {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            safe_search: true,
        }
    }

    /// Fetch one page of recently uploaded public photos.
    pub async fn get_recent(&self, page: u32, per_page: u32) -> Result<PhotoPage> {
        self.fetch(&PhotoQuery::for_term("", page, per_page)).await
    }

    /// Fetch one page of photos tagged with `tags` (comma separated).
    pub async fn search_by_tag(&self, tags: &str, page: u32, per_page: u32) -> Result<PhotoPage> {
        let query = PhotoQuery {
            method: PhotoMethod::SearchByTag(tags.to_string()),
            page,
            per_page,
        };
        self.fetch(&query).await
    }

    /// Run a single page request. Transport failures, non-2xx statuses and
    /// `"stat": "fail"` bodies are all errors; there is no partial success.
    pub async fn fetch(&self, query: &PhotoQuery) -> Result<PhotoPage> {
        let mut params = query.params();
        params.push(("api_key", self.api_key.clone()));
        params.push(("format", "json".to_string()));
        params.push(("nojsoncallback", "1".to_string()));
        if self.safe_search {
            params.push(("safe_search", "1".to_string()));
        }

        tracing::debug!(
            method = query.method.as_str(),
            page = query.page,
            per_page = query.per_page,
            "Requesting Flickr page"
        );

        let resp = self.client.get(&self.base_url).query(&params).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FlickrError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = resp.text().await?;
        match serde_json::from_str::<Envelope>(&body)? {
            Envelope::Ok { photos } => Ok(photos),
            Envelope::Fail { code, message } => Err(FlickrError::Upstream { code, message }),
        }
    }
}

pub struct FlickrClientBuilder {
    api_key: String,
    base_url: String,
    timeout: Duration,
    safe_search: bool,
}

impl FlickrClientBuilder {
    pub fn base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn safe_search(mut self, enabled: bool) -> Self {
        self.safe_search = enabled;
        self
    }

    pub fn build(self) -> Result<FlickrClient> {
        let client = reqwest::Client::builder().timeout(self.timeout).build()?;
        Ok(FlickrClient {
            client,
            base_url: self.base_url,
            api_key: self.api_key,
            safe_search: self.safe_search,
        })
    }
}
