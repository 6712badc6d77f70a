//! Paginated fetch unit.
//!
//! `PageFetcher` is a synchronous state machine: each change of the
//! (query, page) pair produces a [`FetchIntent`] and cancels the one before
//! it. Running the intent is the caller's job ([`run_intent`] does it against
//! a [`PhotoSource`]); the result comes back through [`PageFetcher::complete`],
//! which drops anything that is no longer current.

use flickr_client::{PhotoPage, PhotoQuery};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::traits::PhotoSource;
use crate::types::{FetchState, Photo};

/// One request for one (query, page) pair.
#[derive(Debug, Clone)]
pub struct FetchIntent {
    pub generation: u64,
    pub query: String,
    pub page: u32,
    pub per_page: u32,
    token: CancellationToken,
}

impl FetchIntent {
    pub fn photo_query(&self) -> PhotoQuery {
        PhotoQuery::for_term(&self.query, self.page, self.per_page)
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// What `complete` did with a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Page merged into the accumulated photos.
    Applied { added: usize, has_more: bool },
    /// Current request failed; `error` is now set.
    Failed,
    /// Superseded or cancelled; state untouched.
    Discarded,
}

pub struct PageFetcher {
    page_size: u32,
    query: String,
    state: FetchState,
    generation: u64,
    in_flight: Option<CancellationToken>,
}

impl PageFetcher {
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            query: String::new(),
            state: FetchState::default(),
            generation: 0,
            in_flight: None,
        }
    }

    pub fn state(&self) -> &FetchState {
        &self.state
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// The query changed: drop accumulated photos right away, then request
    /// page 1.
    pub fn on_query_changed(&mut self, query: &str) -> FetchIntent {
        self.query = query.to_string();
        self.state.photos.clear();
        self.state.has_more = false;
        self.issue(1)
    }

    /// Same query, next page.
    pub fn on_page_advance(&mut self, page: u32) -> FetchIntent {
        self.issue(page)
    }

    pub fn is_current(&self, intent: &FetchIntent) -> bool {
        intent.generation == self.generation && !intent.is_cancelled()
    }

    /// Cancel whatever is outstanding without issuing a replacement.
    pub fn cancel(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }

    pub fn complete(
        &mut self,
        intent: &FetchIntent,
        result: Result<PhotoPage, FetchError>,
    ) -> FetchOutcome {
        if !self.is_current(intent) {
            debug!(
                query = %intent.query,
                page = intent.page,
                generation = intent.generation,
                "Discarding superseded page"
            );
            return FetchOutcome::Discarded;
        }

        match result {
            Ok(page) => {
                self.in_flight = None;
                let added = page.photos.len();
                self.state.photos.extend(page.photos.iter().map(Photo::from));
                self.state.has_more = added > 0;
                self.state.loading = false;
                info!(
                    query = %intent.query,
                    page = intent.page,
                    added,
                    total = self.state.photos.len(),
                    "Page applied"
                );
                FetchOutcome::Applied {
                    added,
                    has_more: self.state.has_more,
                }
            }
            Err(FetchError::Cancelled) => FetchOutcome::Discarded,
            Err(FetchError::Upstream(e)) => {
                warn!(query = %intent.query, page = intent.page, error = %e, "Page request failed");
                self.in_flight = None;
                self.state.error = true;
                self.state.loading = false;
                FetchOutcome::Failed
            }
        }
    }

    fn issue(&mut self, page: u32) -> FetchIntent {
        self.cancel();
        self.generation += 1;
        self.state.loading = true;
        self.state.error = false;

        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());
        FetchIntent {
            generation: self.generation,
            query: self.query.clone(),
            page,
            per_page: self.page_size,
            token,
        }
    }
}

/// Run an intent against a source, giving up as soon as it is cancelled.
pub async fn run_intent(
    source: &dyn PhotoSource,
    intent: &FetchIntent,
) -> Result<PhotoPage, FetchError> {
    let query = intent.photo_query();
    tokio::select! {
        biased;
        _ = intent.token.cancelled() => Err(FetchError::Cancelled),
        result = source.fetch_page(&query) => result.map_err(FetchError::from),
    }
}

#[cfg(test)]
mod tests {
    use flickr_client::{FlickrError, PhotoMethod};

    use super::*;
    use crate::testing::{page_of, MockPhotoSource};

    fn failure() -> FetchError {
        FetchError::Upstream(FlickrError::Network("connection reset".into()))
    }

    #[test]
    fn recent_page_of_ten() {
        let mut fetcher = PageFetcher::new(10);
        let intent = fetcher.on_query_changed("");
        assert_eq!(intent.photo_query().method, PhotoMethod::Recent);
        assert_eq!(intent.page, 1);
        assert_eq!(intent.per_page, 10);

        let outcome = fetcher.complete(&intent, Ok(page_of("r", 10)));
        assert_eq!(outcome, FetchOutcome::Applied { added: 10, has_more: true });
        assert_eq!(fetcher.state().photos.len(), 10);
        assert!(fetcher.state().has_more);
        assert!(!fetcher.state().loading);
    }

    #[test]
    fn query_change_clears_synchronously_and_targets_tag_search() {
        let mut fetcher = PageFetcher::new(10);
        let first = fetcher.on_query_changed("");
        fetcher.complete(&first, Ok(page_of("r", 10)));

        let intent = fetcher.on_query_changed("cat");
        assert!(fetcher.state().photos.is_empty());
        assert!(fetcher.state().loading);
        assert!(!fetcher.state().has_more);
        assert_eq!(
            intent.photo_query(),
            PhotoQuery {
                method: PhotoMethod::SearchByTag("cat".into()),
                page: 1,
                per_page: 10,
            }
        );
    }

    #[test]
    fn pages_accumulate_in_order() {
        let mut fetcher = PageFetcher::new(2);
        let p1 = fetcher.on_query_changed("cat");
        fetcher.complete(&p1, Ok(page_of("a", 2)));
        let p2 = fetcher.on_page_advance(2);
        assert_eq!(p2.query, "cat");
        fetcher.complete(&p2, Ok(page_of("b", 2)));

        let ids: Vec<_> = fetcher.state().photos.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["a0", "a1", "b0", "b1"]);
    }

    #[test]
    fn superseded_response_never_mutates_state() {
        let mut fetcher = PageFetcher::new(10);
        let p1 = fetcher.on_query_changed("");
        fetcher.complete(&p1, Ok(page_of("r", 10)));

        let stale = fetcher.on_page_advance(2);
        let fresh = fetcher.on_query_changed("dog");
        assert!(stale.is_cancelled());
        assert!(!fresh.is_cancelled());

        fetcher.complete(&fresh, Ok(page_of("d", 10)));
        let before = fetcher.state().clone();

        assert_eq!(
            fetcher.complete(&stale, Ok(page_of("late", 10))),
            FetchOutcome::Discarded
        );
        assert_eq!(fetcher.complete(&stale, Err(failure())), FetchOutcome::Discarded);
        assert_eq!(fetcher.state(), &before);
    }

    #[test]
    fn stale_response_while_newer_is_loading_keeps_loading() {
        let mut fetcher = PageFetcher::new(10);
        let old = fetcher.on_query_changed("cat");
        let _new = fetcher.on_query_changed("dog");

        fetcher.complete(&old, Ok(page_of("c", 10)));
        assert!(fetcher.state().loading);
        assert!(fetcher.state().photos.is_empty());
    }

    #[test]
    fn empty_page_ends_pagination() {
        let mut fetcher = PageFetcher::new(10);
        let intent = fetcher.on_query_changed("zzzz");
        let outcome = fetcher.complete(&intent, Ok(page_of("z", 0)));

        assert_eq!(outcome, FetchOutcome::Applied { added: 0, has_more: false });
        let state = fetcher.state();
        assert!(!state.has_more);
        assert!(!state.loading);
        assert!(!state.error);
        assert!(state.is_empty_result());
    }

    #[test]
    fn upstream_failure_sets_error_and_clears_loading() {
        let mut fetcher = PageFetcher::new(10);
        let p1 = fetcher.on_query_changed("cat");
        fetcher.complete(&p1, Ok(page_of("c", 10)));
        let p2 = fetcher.on_page_advance(2);

        assert_eq!(fetcher.complete(&p2, Err(failure())), FetchOutcome::Failed);
        let state = fetcher.state();
        assert!(state.error);
        assert!(!state.loading);
        assert_eq!(state.photos.len(), 10);

        let p3 = fetcher.on_page_advance(3);
        assert!(!fetcher.state().error);
        assert!(fetcher.state().loading);
        assert_eq!(p3.page, 3);
    }

    #[test]
    fn cancelled_result_for_current_intent_is_ignored() {
        let mut fetcher = PageFetcher::new(10);
        let intent = fetcher.on_query_changed("cat");
        assert_eq!(
            fetcher.complete(&intent, Err(FetchError::Cancelled)),
            FetchOutcome::Discarded
        );
        assert!(fetcher.state().loading);
        assert!(!fetcher.state().error);
    }

    #[test]
    fn resubmitting_same_query_clears_photos() {
        let mut fetcher = PageFetcher::new(10);
        let p1 = fetcher.on_query_changed("cat");
        fetcher.complete(&p1, Ok(page_of("c", 10)));
        let p2 = fetcher.on_page_advance(2);
        fetcher.complete(&p2, Ok(page_of("d", 10)));
        assert_eq!(fetcher.state().photos.len(), 20);

        let again = fetcher.on_query_changed("cat");
        assert_eq!(again.page, 1);
        assert!(fetcher.state().photos.is_empty());
    }

    #[tokio::test]
    async fn run_intent_returns_cancelled_once_superseded() {
        let source = MockPhotoSource::new().on_page("cat", 1, page_of("c", 3));
        let gate = source.hold("cat", 1);

        let mut fetcher = PageFetcher::new(10);
        let intent = fetcher.on_query_changed("cat");
        let pending = {
            let intent = intent.clone();
            let source = source.clone();
            tokio::spawn(async move { run_intent(&source, &intent).await })
        };

        fetcher.on_query_changed("dog");
        gate.notify_one();

        let result = pending.await.unwrap();
        assert!(matches!(result, Err(FetchError::Cancelled)));
    }

    #[tokio::test]
    async fn run_intent_fetches_the_selected_endpoint() {
        let source = MockPhotoSource::new().on_page("", 1, page_of("r", 4));
        let mut fetcher = PageFetcher::new(10);
        let intent = fetcher.on_query_changed("");

        let page = run_intent(&source, &intent).await.unwrap();
        assert_eq!(page.photos.len(), 4);
        assert_eq!(source.requests(), vec![PhotoQuery::for_term("", 1, 10)]);
    }
}
