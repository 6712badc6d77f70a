//! Gallery session: the search controller and the page fetcher driven from a
//! single owner.
//!
//! Requests run as spawned tasks and report back over a channel. Nothing but
//! `Gallery` itself mutates state, and completions are applied one at a time
//! from [`Gallery::next_event`], so UI events and network completions never
//! interleave mid-update.

use std::sync::Arc;

use flickr_client::PhotoPage;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::error::FetchError;
use crate::fetch::{run_intent, FetchIntent, FetchOutcome, PageFetcher};
use crate::search::SearchController;
use crate::suggestions::SuggestionHistory;
use crate::traits::{PhotoSource, SuggestionStore};
use crate::types::FetchState;

/// A finished request on its way back to the session.
#[derive(Debug)]
pub struct Completion {
    pub intent: FetchIntent,
    pub result: Result<PhotoPage, FetchError>,
}

pub struct Gallery {
    search: SearchController,
    fetcher: PageFetcher,
    source: Arc<dyn PhotoSource>,
    tx: mpsc::UnboundedSender<Completion>,
    rx: mpsc::UnboundedReceiver<Completion>,
}

impl Gallery {
    pub fn new(
        source: Arc<dyn PhotoSource>,
        store: Arc<dyn SuggestionStore>,
        page_size: u32,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            search: SearchController::new(store),
            fetcher: PageFetcher::new(page_size),
            source,
            tx,
            rx,
        }
    }

    /// Load the first page of recent photos. Must run inside a tokio runtime.
    pub fn start(&mut self) {
        info!(page_size = self.fetcher.page_size(), "Gallery session starting");
        let intent = self.fetcher.on_query_changed(self.search.query());
        self.dispatch(intent);
    }

    pub fn state(&self) -> &FetchState {
        self.fetcher.state()
    }

    pub fn query(&self) -> &str {
        self.search.query()
    }

    pub fn page(&self) -> u32 {
        self.search.page()
    }

    pub fn draft(&self) -> &str {
        self.search.draft()
    }

    pub fn suggestions(&self) -> &SuggestionHistory {
        self.search.suggestions()
    }

    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.search.update_draft(text);
    }

    pub fn select_suggestion(&mut self, text: impl Into<String>) {
        self.search.select_suggestion(text);
    }

    /// Commit the draft. Photos are cleared before this returns. Must run
    /// inside a tokio runtime.
    pub fn submit(&mut self) {
        self.search.submit();
        let intent = self.fetcher.on_query_changed(self.search.query());
        self.dispatch(intent);
    }

    /// The last rendered photo became visible. Requests the next page only
    /// when the current one has landed and was non-empty. After a failed
    /// request the same page is retried instead. Must run inside a tokio
    /// runtime.
    pub fn on_last_item_visible(&mut self) -> bool {
        let state = self.fetcher.state();
        if state.error && !state.loading {
            info!(query = %self.search.query(), page = self.search.page(), "Retrying failed page");
            let intent = self.fetcher.on_page_advance(self.search.page());
            self.dispatch(intent);
            return true;
        }
        if !state.can_load_more() {
            debug!(
                loading = self.fetcher.state().loading,
                has_more = self.fetcher.state().has_more,
                "Ignoring visibility signal"
            );
            return false;
        }
        self.search.advance_page();
        let intent = self.fetcher.on_page_advance(self.search.page());
        self.dispatch(intent);
        true
    }

    /// Wait for the next completion and apply it.
    pub async fn next_event(&mut self) -> FetchOutcome {
        // `self.tx` keeps the channel open, so `recv` only yields `None` if
        // the session is being torn down.
        match self.rx.recv().await {
            Some(Completion { intent, result }) => self.fetcher.complete(&intent, result),
            None => FetchOutcome::Discarded,
        }
    }

    /// Apply completions until the current request has finished.
    pub async fn settle(&mut self) -> &FetchState {
        while self.fetcher.state().loading {
            self.next_event().await;
        }
        self.fetcher.state()
    }

    fn dispatch(&self, intent: FetchIntent) {
        debug!(
            query = %intent.query,
            page = intent.page,
            generation = intent.generation,
            "Dispatching page request"
        );
        let source = self.source.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = run_intent(source.as_ref(), &intent).await;
            // The receiver only goes away with the session.
            let _ = tx.send(Completion { intent, result });
        });
    }
}

impl Drop for Gallery {
    fn drop(&mut self) {
        self.fetcher.cancel();
    }
}
