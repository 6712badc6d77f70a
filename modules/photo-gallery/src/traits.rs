// Trait seams for the gallery session.
//
// PhotoSource: one page of photos for a query. FlickrClient in production,
//   MockPhotoSource in tests.
// SuggestionStore: string key-value persistence for the suggestion history.
//   FileStore on disk, MemoryStore for tests and throwaway sessions.

use async_trait::async_trait;

use flickr_client::{FlickrClient, PhotoPage, PhotoQuery};

use crate::error::Result;

#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Fetch exactly one page for the given query.
    async fn fetch_page(&self, query: &PhotoQuery) -> flickr_client::Result<PhotoPage>;
}

#[async_trait]
impl PhotoSource for FlickrClient {
    async fn fetch_page(&self, query: &PhotoQuery) -> flickr_client::Result<PhotoPage> {
        self.fetch(query).await
    }
}

pub trait SuggestionStore: Send + Sync {
    /// Get the value for a key. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set a key to a value, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> Result<()>;
}
