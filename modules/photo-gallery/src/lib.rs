pub mod config;
pub mod error;
pub mod fetch;
pub mod gallery;
pub mod search;
pub mod store;
pub mod suggestions;
pub mod traits;
pub mod types;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use config::Config;
pub use error::{FetchError, GalleryError, Result};
pub use fetch::{FetchIntent, FetchOutcome, PageFetcher};
pub use gallery::Gallery;
pub use search::SearchController;
pub use store::{FileStore, MemoryStore};
pub use suggestions::SuggestionHistory;
pub use traits::{PhotoSource, SuggestionStore};
pub use types::{FetchState, Photo};
