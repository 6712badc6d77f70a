// Test doubles for the gallery session.
//
// MockPhotoSource (PhotoSource): (term, page) → canned PhotoPage, with
// optional failures and gates that hold a response until released.
// Plus helpers for building raw photo pages.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use flickr_client::{FlickrError, PhotoMethod, PhotoPage, PhotoQuery, RawPhoto};
use tokio::sync::Notify;

use crate::traits::PhotoSource;

type PageKey = (String, u32);

fn key_of(query: &PhotoQuery) -> PageKey {
    let term = match query.method {
        PhotoMethod::Recent => String::new(),
        PhotoMethod::SearchByTag(ref tags) => tags.clone(),
    };
    (term, query.page)
}

// ---------------------------------------------------------------------------
// MockPhotoSource
// ---------------------------------------------------------------------------

/// Returns `Err` for unregistered pages. Clones share state, so a test can
/// keep a handle while the session owns another.
/// Builder pattern: `.on_page()`, `.on_failure()`; `hold()` for gating.
#[derive(Clone, Default)]
pub struct MockPhotoSource {
    pages: Arc<Mutex<HashMap<PageKey, PhotoPage>>>,
    failures: Arc<Mutex<HashSet<PageKey>>>,
    gates: Arc<Mutex<HashMap<PageKey, Arc<Notify>>>>,
    requests: Arc<Mutex<Vec<PhotoQuery>>>,
}

impl MockPhotoSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `page` for (`term`, `page_number`). An empty term is recent mode.
    pub fn on_page(self, term: &str, page_number: u32, page: PhotoPage) -> Self {
        self.pages
            .lock()
            .unwrap()
            .insert((term.to_string(), page_number), page);
        self
    }

    pub fn on_failure(self, term: &str, page_number: u32) -> Self {
        self.failures
            .lock()
            .unwrap()
            .insert((term.to_string(), page_number));
        self
    }

    /// Block responses for (`term`, `page_number`) until the returned handle
    /// is notified.
    pub fn hold(&self, term: &str, page_number: u32) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert((term.to_string(), page_number), gate.clone());
        gate
    }

    /// Every query received, in order.
    pub fn requests(&self) -> Vec<PhotoQuery> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PhotoSource for MockPhotoSource {
    async fn fetch_page(&self, query: &PhotoQuery) -> flickr_client::Result<PhotoPage> {
        self.requests.lock().unwrap().push(query.clone());
        let key = key_of(query);

        let gate = self.gates.lock().unwrap().get(&key).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.failures.lock().unwrap().contains(&key) {
            return Err(FlickrError::Api {
                status: 500,
                message: "mock failure".into(),
            });
        }
        self.pages
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| FlickrError::Api {
                status: 404,
                message: format!("no mock page for {key:?}"),
            })
    }
}

// ---------------------------------------------------------------------------
// Builders
// ---------------------------------------------------------------------------

pub fn raw_photo(id: &str) -> RawPhoto {
    RawPhoto {
        id: id.to_string(),
        owner: Some("12345678@N00".to_string()),
        secret: format!("s{id}"),
        server: "65535".to_string(),
        farm: 66,
        title: format!("photo {id}"),
    }
}

/// A page of `count` photos with ids `{prefix}0..{prefix}{count-1}`.
pub fn page_of(prefix: &str, count: usize) -> PhotoPage {
    PhotoPage {
        page: 1,
        pages: 1,
        perpage: count as u64,
        total: count as u64,
        photos: (0..count).map(|i| raw_photo(&format!("{prefix}{i}"))).collect(),
    }
}
