//! Corpus-backed search.
//!
//! Ties the query lexer and token matcher to the storage collaborator:
//! lex the raw query, probe the result cache, and only on a miss fetch the
//! corpus (once) and run the conjunctive filter. Safe to call on every
//! keystroke; each invocation fully supersedes the previous one.

use crate::error::StoreError;
use crate::store::StudyStore;
use hanzi_core::{filter_entries, lex, DictionaryEntry, EntryKind, SearchCache};

/// Search service over a storage collaborator.
pub struct SearchService<S> {
    store: S,
    cache: SearchCache,
}

impl<S: StudyStore> SearchService<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: SearchCache::new(),
        }
    }

    /// Run a raw query against one corpus.
    ///
    /// An empty or all-blank query lexes to no tokens and returns the full
    /// corpus. A cache hit skips the corpus fetch entirely.
    pub async fn search(
        &mut self,
        kind: EntryKind,
        query: &str,
    ) -> Result<Vec<DictionaryEntry>, StoreError> {
        let tokens = lex(query);

        if let Some(hit) = self.cache.get(kind, &tokens) {
            return Ok(hit);
        }

        let corpus = match kind {
            EntryKind::Character => self.store.characters().await?,
            EntryKind::Word => self.store.words().await?,
        };
        let results = filter_entries(&corpus, &tokens);
        self.cache.insert(kind, &tokens, results.clone());
        Ok(results)
    }

    /// Drop cached results (low-memory signal, or after corpus mutation).
    pub fn clear_caches(&mut self) {
        self.cache.clear();
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
