use std::sync::Arc;

use tracing::{debug, warn};

use crate::suggestions::SuggestionHistory;
use crate::traits::SuggestionStore;

/// Owns the draft text, the committed query, the page number and the
/// suggestion history. All operations are synchronous and never fail;
/// persistence problems are logged and otherwise ignored.
pub struct SearchController {
    draft: String,
    query: String,
    page: u32,
    suggestions: SuggestionHistory,
    store: Arc<dyn SuggestionStore>,
}

impl SearchController {
    /// Start a session in recent-photos mode with history read from `store`.
    pub fn new(store: Arc<dyn SuggestionStore>) -> Self {
        let suggestions = SuggestionHistory::load(store.as_ref());
        Self {
            draft: String::new(),
            query: String::new(),
            page: 1,
            suggestions,
            store,
        }
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn suggestions(&self) -> &SuggestionHistory {
        &self.suggestions
    }

    /// Record in-progress text. Query and page are untouched.
    pub fn update_draft(&mut self, text: impl Into<String>) {
        self.draft = text.into();
    }

    /// Put a remembered term in the draft; the caller still has to submit.
    pub fn select_suggestion(&mut self, text: impl Into<String>) {
        self.update_draft(text);
    }

    /// Commit the draft as the query and restart paging at 1.
    pub fn submit(&mut self) {
        self.query = self.draft.clone();
        self.page = 1;

        if self.suggestions.push(self.draft.clone()) {
            if let Err(e) = self.suggestions.save(self.store.as_ref()) {
                warn!(error = %e, "Failed to persist suggestions");
            }
        }
        debug!(query = %self.query, "Search submitted");
    }

    /// Move to the next page of the current query.
    pub fn advance_page(&mut self) {
        self.page += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use crate::suggestions::SUGGESTIONS_KEY;

    fn controller() -> (SearchController, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        (SearchController::new(store.clone()), store)
    }

    #[test]
    fn starts_in_recent_mode_on_page_one() {
        let (search, _) = controller();
        assert_eq!(search.query(), "");
        assert_eq!(search.page(), 1);
        assert_eq!(search.suggestions(), &SuggestionHistory::default());
    }

    #[test]
    fn draft_does_not_touch_query_or_page() {
        let (mut search, _) = controller();
        search.advance_page();
        search.update_draft("cat");

        assert_eq!(search.draft(), "cat");
        assert_eq!(search.query(), "");
        assert_eq!(search.page(), 2);
    }

    #[test]
    fn submit_commits_and_resets_page() {
        let (mut search, _) = controller();
        search.update_draft("cat");
        search.submit();
        search.advance_page();
        search.advance_page();
        assert_eq!(search.page(), 3);

        search.submit();
        assert_eq!(search.query(), "cat");
        assert_eq!(search.page(), 1);
    }

    #[test]
    fn submit_records_and_persists_new_terms() {
        let (mut search, store) = controller();
        search.update_draft("owl");
        search.submit();

        assert_eq!(
            search.suggestions().to_vec(),
            vec!["cat", "tree", "football", "computer", "owl"]
        );
        assert_eq!(
            store.get(SUGGESTIONS_KEY).unwrap().as_deref(),
            Some(r#"["cat","tree","football","computer","owl"]"#)
        );
    }

    #[test]
    fn empty_submit_returns_to_recent_without_recording() {
        let (mut search, _) = controller();
        search.update_draft("owl");
        search.submit();
        search.update_draft("");
        search.submit();

        assert_eq!(search.query(), "");
        assert!(!search.suggestions().contains(""));
        assert_eq!(search.suggestions().len(), 5);
    }

    #[test]
    fn select_suggestion_only_fills_draft() {
        let (mut search, _) = controller();
        search.select_suggestion("tree");
        assert_eq!(search.draft(), "tree");
        assert_eq!(search.query(), "");

        search.submit();
        assert_eq!(search.query(), "tree");
        assert_eq!(search.suggestions(), &SuggestionHistory::default());
    }

    #[test]
    fn history_survives_a_new_session() {
        let store = Arc::new(MemoryStore::new());
        {
            let mut search = SearchController::new(store.clone());
            for term in ["a", "b", "c", "d", "e", "f"] {
                search.update_draft(term);
                search.submit();
            }
        }
        let search = SearchController::new(store);
        assert_eq!(search.suggestions().to_vec(), vec!["b", "c", "d", "e", "f"]);
    }

    #[test]
    fn submit_recovers_history_from_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "not json").unwrap();

        let mut search = SearchController::new(Arc::new(FileStore::new(&path)));
        assert_eq!(search.suggestions(), &SuggestionHistory::default());
        search.update_draft("owl");
        search.submit();

        let reloaded = SearchController::new(Arc::new(FileStore::new(&path)));
        assert!(reloaded.suggestions().contains("owl"));
    }
}
