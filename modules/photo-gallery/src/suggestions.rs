use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::error::Result;
use crate::traits::SuggestionStore;

/// Maximum number of remembered search terms.
pub const SUGGESTION_CAPACITY: usize = 5;

/// Store key the history is persisted under.
pub const SUGGESTIONS_KEY: &str = "search";

/// Seed history for a store that has never been written.
pub const DEFAULT_SUGGESTIONS: [&str; SUGGESTION_CAPACITY] =
    ["dog", "cat", "tree", "football", "computer"];

/// Recent search terms, oldest first. Fixed-capacity FIFO with exact-match
/// uniqueness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionHistory {
    items: VecDeque<String>,
}

impl Default for SuggestionHistory {
    fn default() -> Self {
        Self::from_terms(DEFAULT_SUGGESTIONS)
    }
}

impl SuggestionHistory {
    pub fn empty() -> Self {
        Self {
            items: VecDeque::with_capacity(SUGGESTION_CAPACITY),
        }
    }

    /// Build from an ordered list, applying the same rules as `push`.
    pub fn from_terms<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut history = Self::empty();
        for term in terms {
            history.push(term);
        }
        history
    }

    /// Remember a term. Empty and already-present terms are ignored; when
    /// full, the oldest term is evicted first. Returns whether it was added.
    pub fn push(&mut self, term: impl Into<String>) -> bool {
        let term = term.into();
        if term.is_empty() || self.contains(&term) {
            return false;
        }
        if self.items.len() == SUGGESTION_CAPACITY {
            self.items.pop_front();
        }
        self.items.push_back(term);
        true
    }

    pub fn contains(&self, term: &str) -> bool {
        self.items.iter().any(|item| item == term)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.items.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.items.iter().cloned().collect()
    }

    /// Load the persisted history, seeding (and persisting) the defaults when
    /// nothing has been stored yet. Unreadable data falls back to defaults.
    pub fn load(store: &dyn SuggestionStore) -> Self {
        match store.get(SUGGESTIONS_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(terms) => Self::from_terms(terms),
                Err(e) => {
                    warn!(error = %e, "Stored suggestions are not a JSON string list, using defaults");
                    Self::default()
                }
            },
            Ok(None) => {
                debug!("No stored suggestions, seeding defaults");
                let history = Self::default();
                if let Err(e) = history.save(store) {
                    warn!(error = %e, "Failed to persist default suggestions");
                }
                history
            }
            Err(e) => {
                warn!(error = %e, "Failed to read stored suggestions, using defaults");
                Self::default()
            }
        }
    }

    /// Persist as a JSON array of strings under `SUGGESTIONS_KEY`.
    pub fn save(&self, store: &dyn SuggestionStore) -> Result<()> {
        let raw = serde_json::to_string(&self.to_vec())?;
        store.set(SUGGESTIONS_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn six_distinct_terms_keep_the_last_five() {
        let mut history = SuggestionHistory::empty();
        for term in ["a", "b", "c", "d", "e", "f"] {
            assert!(history.push(term));
        }
        assert_eq!(history.to_vec(), vec!["b", "c", "d", "e", "f"]);
    }

    #[test]
    fn duplicates_and_empty_terms_are_ignored() {
        let mut history = SuggestionHistory::default();
        assert!(!history.push("cat"));
        assert!(!history.push(""));
        assert_eq!(history.to_vec(), DEFAULT_SUGGESTIONS.to_vec());
    }

    #[test]
    fn matching_is_exact() {
        let mut history = SuggestionHistory::empty();
        history.push("Cat");
        assert!(history.push("cat"));
        assert!(history.push("cat "));
        assert_eq!(history.len(), 3);
    }

    #[test]
    fn never_exceeds_capacity_or_duplicates() {
        let mut history = SuggestionHistory::default();
        let terms = ["x", "dog", "y", "x", "z", "w", "dog", "v", "y", "u"];
        for term in terms {
            history.push(term);
            assert!(history.len() <= SUGGESTION_CAPACITY);
            let mut seen = history.to_vec();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), history.len());
        }
    }

    #[test]
    fn load_seeds_and_persists_defaults() {
        let store = MemoryStore::new();
        let history = SuggestionHistory::load(&store);

        assert_eq!(history, SuggestionHistory::default());
        assert_eq!(
            store.get(SUGGESTIONS_KEY).unwrap().as_deref(),
            Some(r#"["dog","cat","tree","football","computer"]"#)
        );
    }

    #[test]
    fn load_reads_persisted_terms() {
        let store = MemoryStore::new();
        store.set(SUGGESTIONS_KEY, r#"["owl","fox"]"#).unwrap();

        let history = SuggestionHistory::load(&store);
        assert_eq!(history.to_vec(), vec!["owl", "fox"]);
    }

    #[test]
    fn load_tolerates_garbage() {
        let store = MemoryStore::new();
        store.set(SUGGESTIONS_KEY, "{broken").unwrap();

        assert_eq!(SuggestionHistory::load(&store), SuggestionHistory::default());
    }
}
