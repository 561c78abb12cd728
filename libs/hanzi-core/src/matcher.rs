//! Token matching against dictionary entries.
//!
//! Every token in a query must hold for an entry to match (logical AND);
//! each token is a single-field test. Results for a given token list are
//! memoized in small per-kind LRU caches so repeated search-as-you-type
//! queries skip the corpus scan.

use crate::types::{DictionaryEntry, EntryKind, SearchToken, TokenType};
use lru::LruCache;
use std::num::NonZeroUsize;

/// Entries kept per kind before the least recently used query is evicted.
const CACHE_CAPACITY: usize = 16;

/// Remove tone digits from a pinyin string.
pub fn strip_tones(pinyin: &str) -> String {
    pinyin.chars().filter(|c| !c.is_ascii_digit()).collect()
}

/// Whether a single token holds for an entry. Case-insensitive throughout.
pub fn matches_token(entry: &DictionaryEntry, token: &SearchToken) -> bool {
    let value = token.value.to_lowercase();
    match token.token_type {
        TokenType::Hanzi => {
            let haystack =
                format!("{} {}", entry.simplified(), entry.traditional()).to_lowercase();
            haystack.contains(&value)
        }
        TokenType::Definition => entry.definition().to_lowercase().contains(&value),
        TokenType::General => {
            let haystack = format!(
                "{}{}{}{}",
                entry.simplified(),
                entry.traditional(),
                entry.definition(),
                entry.pinyin()
            )
            .to_lowercase();
            haystack.contains(&value)
        }
        TokenType::Pinyin => match entry {
            DictionaryEntry::Character(c) => pinyin_matches_character(&c.pinyin, &value),
            DictionaryEntry::Word(w) => pinyin_matches_word(&w.pinyin, &value),
        },
    }
}

/// Character pinyin is a whole-field exact match, with or without tones.
fn pinyin_matches_character(stored: &str, query: &str) -> bool {
    let stored = stored.to_lowercase();
    stored == query || strip_tones(&stored) == strip_tones(query)
}

/// Word pinyin match.
///
/// A word whose stored pinyin has no embedded space is effectively
/// monosyllabic and never matches a pinyin token: single-syllable queries
/// should only hit character entries. Otherwise the query must equal the
/// whole field (with or without tones), or — only when the query itself
/// spans multiple syllables — equal one of the stored syllables.
fn pinyin_matches_word(stored: &str, query: &str) -> bool {
    let stored = stored.to_lowercase();
    if !stored.contains(' ') {
        return false;
    }
    if stored == query || strip_tones(&stored) == strip_tones(query) {
        return true;
    }
    if query.contains(char::is_whitespace) {
        let query_no_tones = strip_tones(query);
        for syllable in stored.split_whitespace() {
            if query == syllable || query_no_tones == strip_tones(syllable) {
                return true;
            }
        }
    }
    false
}

/// Whether every token holds for an entry. Vacuously true for no tokens.
pub fn matches_all(entry: &DictionaryEntry, tokens: &[SearchToken]) -> bool {
    tokens.iter().all(|token| matches_token(entry, token))
}

/// Filter a corpus down to the entries satisfying every token.
///
/// An empty token list is "no filter" and returns the full corpus.
pub fn filter_entries(corpus: &[DictionaryEntry], tokens: &[SearchToken]) -> Vec<DictionaryEntry> {
    corpus
        .iter()
        .filter(|entry| matches_all(entry, tokens))
        .cloned()
        .collect()
}

/// LRU caches for filtered search results, one per entry kind.
///
/// Keys are the serialized token list, so identical queries against an
/// unchanged corpus are served without a rescan. Nothing invalidates a
/// cached result when the corpus changes; callers that mutate the corpus
/// (or receive a low-memory signal) call [`SearchCache::clear`].
pub struct SearchCache {
    characters: LruCache<String, Vec<DictionaryEntry>>,
    words: LruCache<String, Vec<DictionaryEntry>>,
}

impl SearchCache {
    pub fn new() -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).expect("capacity is non-zero");
        Self {
            characters: LruCache::new(capacity),
            words: LruCache::new(capacity),
        }
    }

    fn cache_key(tokens: &[SearchToken]) -> String {
        tokens
            .iter()
            .map(|t| format!("{}:{}", t.token_type.as_str(), t.value))
            .collect::<Vec<_>>()
            .join("\u{1f}")
    }

    fn cache_for(&mut self, kind: EntryKind) -> &mut LruCache<String, Vec<DictionaryEntry>> {
        match kind {
            EntryKind::Character => &mut self.characters,
            EntryKind::Word => &mut self.words,
        }
    }

    /// Previously computed result for this token list, if still cached.
    pub fn get(&mut self, kind: EntryKind, tokens: &[SearchToken]) -> Option<Vec<DictionaryEntry>> {
        let key = Self::cache_key(tokens);
        self.cache_for(kind).get(&key).cloned()
    }

    /// Memoize a computed result.
    pub fn insert(&mut self, kind: EntryKind, tokens: &[SearchToken], results: Vec<DictionaryEntry>) {
        let key = Self::cache_key(tokens);
        self.cache_for(kind).put(key, results);
    }

    /// Drop all cached results (low-memory signal or corpus change).
    pub fn clear(&mut self) {
        self.characters.clear();
        self.words.clear();
    }
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use crate::types::{CharacterEntry, WordEntry};
    use pretty_assertions::assert_eq;

    fn character(id: i64, simplified: &str, pinyin: &str, definition: &str) -> DictionaryEntry {
        DictionaryEntry::Character(CharacterEntry {
            id,
            simplified: simplified.to_string(),
            traditional: simplified.to_string(),
            pinyin: pinyin.to_string(),
            definition: definition.to_string(),
        })
    }

    fn word(id: i64, simplified: &str, pinyin: &str, definition: &str) -> DictionaryEntry {
        DictionaryEntry::Word(WordEntry {
            id,
            simplified: simplified.to_string(),
            traditional: simplified.to_string(),
            pinyin: pinyin.to_string(),
            definition: definition.to_string(),
        })
    }

    fn corpus() -> Vec<DictionaryEntry> {
        vec![
            character(1, "水", "shui3", "water"),
            character(2, "火", "huo3", "fire"),
            word(1, "你好", "ni3 hao3", "hello"),
            word(2, "水果", "shui3 guo3", "fruit"),
        ]
    }

    #[test]
    fn pinyin_token_exact_with_tones() {
        let results = filter_entries(&corpus(), &lex("p:shui3"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].simplified(), "水");
    }

    #[test]
    fn pinyin_token_tone_stripped() {
        let results = filter_entries(&corpus(), &lex("p:shui"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].simplified(), "水");
    }

    #[test]
    fn pinyin_token_no_match() {
        let results = filter_entries(&corpus(), &lex("p:hu"));
        assert!(results.is_empty());
    }

    #[test]
    fn pinyin_monosyllable_query_never_matches_words() {
        // "shui3" is a syllable of 水果 but a monosyllabic query must not
        // surface word entries.
        let results = filter_entries(&corpus(), &lex("p:shui3"));
        assert!(results.iter().all(|e| e.kind() == EntryKind::Character));
    }

    #[test]
    fn pinyin_multisyllable_query_matches_word() {
        let results = filter_entries(&corpus(), &lex("p:ni3 hao3"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].simplified(), "你好");

        let no_tones = filter_entries(&corpus(), &lex("p:ni hao"));
        assert_eq!(no_tones.len(), 1);
    }

    #[test]
    fn monosyllabic_word_pinyin_never_matches() {
        let entries = vec![word(9, "了", "le5", "particle")];
        assert!(filter_entries(&entries, &lex("p:le5")).is_empty());
    }

    #[test]
    fn definition_token_is_substring() {
        let results = filter_entries(&corpus(), &lex("d:ate"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].definition(), "water");
    }

    #[test]
    fn hanzi_token_is_substring() {
        let results = filter_entries(&corpus(), &lex("h:水"));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn general_token_spans_all_fields() {
        let results = filter_entries(&corpus(), &lex("shui"));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn conjunction_requires_every_token() {
        let both = filter_entries(&corpus(), &lex("p:shui3 d:water"));
        assert_eq!(both.len(), 1);

        let wrong_definition = filter_entries(&corpus(), &lex("p:shui3 d:fire"));
        assert!(wrong_definition.is_empty());
    }

    #[test]
    fn fewer_tokens_yield_superset() {
        let entries = corpus();
        let narrow = filter_entries(&entries, &lex("p:shui3 d:water"));
        let wide = filter_entries(&entries, &lex("d:water"));
        for entry in &narrow {
            assert!(wide.contains(entry));
        }
    }

    #[test]
    fn empty_token_list_returns_full_corpus() {
        let entries = corpus();
        let results = filter_entries(&entries, &[]);
        assert_eq!(results, entries);
    }

    #[test]
    fn cache_round_trip_and_clear() {
        let mut cache = SearchCache::new();
        let tokens = lex("d:water");
        let results = filter_entries(&corpus(), &tokens);

        assert!(cache.get(EntryKind::Character, &tokens).is_none());
        cache.insert(EntryKind::Character, &tokens, results.clone());
        assert_eq!(cache.get(EntryKind::Character, &tokens), Some(results));

        // Kinds are cached independently.
        assert!(cache.get(EntryKind::Word, &tokens).is_none());

        cache.clear();
        assert!(cache.get(EntryKind::Character, &tokens).is_none());
    }

    #[test]
    fn cache_evicts_least_recently_used() {
        let mut cache = SearchCache::new();
        for i in 0..(CACHE_CAPACITY + 1) {
            let tokens = lex(&format!("d:query{i}"));
            cache.insert(EntryKind::Character, &tokens, Vec::new());
        }
        assert!(cache.get(EntryKind::Character, &lex("d:query0")).is_none());
        assert!(cache
            .get(EntryKind::Character, &lex(&format!("d:query{CACHE_CAPACITY}")))
            .is_some());
    }
}
