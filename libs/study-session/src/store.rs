//! Storage collaborator interface.
//!
//! The session layer consumes storage through [`StudyStore`]; the durable
//! engine behind it (a relational database in the application) is out of
//! scope here. [`MemoryStore`] is the in-memory implementation used by
//! tests, with a fetch counter so cache behavior is observable.

use crate::error::StoreError;
use hanzi_core::{DictionaryEntry, EntryKind, ReviewPair, StudyItem};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

type Result<T> = std::result::Result<T, StoreError>;

/// Async storage interface for dictionary entries and study items.
///
/// Corpus and deck fetches are point-in-time snapshots; the session
/// reconciles with durable state at explicit sync points.
pub trait StudyStore {
    /// All character entries.
    async fn characters(&self) -> Result<Vec<DictionaryEntry>>;

    /// All word entries.
    async fn words(&self) -> Result<Vec<DictionaryEntry>>;

    /// A single entry by kind and id.
    async fn entry_by_id(&self, kind: EntryKind, id: i64) -> Result<Option<DictionaryEntry>>;

    /// The full study list.
    async fn study_items(&self) -> Result<Vec<StudyItem>>;

    /// A single study item by its own id.
    async fn study_item(&self, id: i64) -> Result<Option<StudyItem>>;

    /// The study item referencing the given entry, created fresh if absent.
    async fn find_or_create_item(&self, item_id: i64, kind: EntryKind) -> Result<StudyItem>;

    /// Remove an item from the study list.
    async fn remove_item(&self, id: i64) -> Result<()>;

    /// Whether the given entry is currently in the study list.
    async fn is_in_study_list(&self, item_id: i64, kind: EntryKind) -> Result<bool>;

    /// The review deck: every study item joined with its resolved entry.
    async fn review_deck(&self) -> Result<Vec<ReviewPair>>;

    /// Persist priority fields after a decay step.
    async fn update_priority(&self, id: i64, current: u32, max: u32) -> Result<()>;

    /// Persist priority fields and the learned flag as one transactional
    /// write, so a crash cannot leave them inconsistent.
    async fn record_review(&self, id: i64, current: u32, max: u32, learned: bool) -> Result<()>;
}

impl<T: StudyStore> StudyStore for &T {
    async fn characters(&self) -> Result<Vec<DictionaryEntry>> {
        (**self).characters().await
    }

    async fn words(&self) -> Result<Vec<DictionaryEntry>> {
        (**self).words().await
    }

    async fn entry_by_id(&self, kind: EntryKind, id: i64) -> Result<Option<DictionaryEntry>> {
        (**self).entry_by_id(kind, id).await
    }

    async fn study_items(&self) -> Result<Vec<StudyItem>> {
        (**self).study_items().await
    }

    async fn study_item(&self, id: i64) -> Result<Option<StudyItem>> {
        (**self).study_item(id).await
    }

    async fn find_or_create_item(&self, item_id: i64, kind: EntryKind) -> Result<StudyItem> {
        (**self).find_or_create_item(item_id, kind).await
    }

    async fn remove_item(&self, id: i64) -> Result<()> {
        (**self).remove_item(id).await
    }

    async fn is_in_study_list(&self, item_id: i64, kind: EntryKind) -> Result<bool> {
        (**self).is_in_study_list(item_id, kind).await
    }

    async fn review_deck(&self) -> Result<Vec<ReviewPair>> {
        (**self).review_deck().await
    }

    async fn update_priority(&self, id: i64, current: u32, max: u32) -> Result<()> {
        (**self).update_priority(id, current, max).await
    }

    async fn record_review(&self, id: i64, current: u32, max: u32, learned: bool) -> Result<()> {
        (**self).record_review(id, current, max, learned).await
    }
}

struct Inner {
    characters: Vec<DictionaryEntry>,
    words: Vec<DictionaryEntry>,
    items: Vec<StudyItem>,
    next_item_id: i64,
}

impl Default for Inner {
    fn default() -> Self {
        Self {
            characters: Vec::new(),
            words: Vec::new(),
            items: Vec::new(),
            next_item_id: 1,
        }
    }
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fetches: AtomicUsize,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded with a dictionary corpus.
    pub fn with_corpus(characters: Vec<DictionaryEntry>, words: Vec<DictionaryEntry>) -> Self {
        Self {
            inner: Mutex::new(Inner {
                characters,
                words,
                items: Vec::new(),
                next_item_id: 1,
            }),
            fetches: AtomicUsize::new(0),
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Seed a study item directly, bypassing `find_or_create_item`.
    pub fn insert_item(&self, item: StudyItem) {
        let mut inner = self.inner.lock().expect("store lock");
        inner.next_item_id = inner.next_item_id.max(item.id + 1);
        inner.items.push(item);
    }

    /// Number of corpus fetches served so far.
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::Relaxed)
    }

    /// Make subsequent writes fail, for error-path tests.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Relaxed);
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::Relaxed) {
            return Err(StoreError::Backend("writes disabled".to_string()));
        }
        Ok(())
    }
}

impl StudyStore for MemoryStore {
    async fn characters(&self) -> Result<Vec<DictionaryEntry>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self.inner.lock().expect("store lock").characters.clone())
    }

    async fn words(&self) -> Result<Vec<DictionaryEntry>> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        Ok(self.inner.lock().expect("store lock").words.clone())
    }

    async fn entry_by_id(&self, kind: EntryKind, id: i64) -> Result<Option<DictionaryEntry>> {
        let inner = self.inner.lock().expect("store lock");
        let corpus = match kind {
            EntryKind::Character => &inner.characters,
            EntryKind::Word => &inner.words,
        };
        Ok(corpus.iter().find(|e| e.id() == id).cloned())
    }

    async fn study_items(&self) -> Result<Vec<StudyItem>> {
        Ok(self.inner.lock().expect("store lock").items.clone())
    }

    async fn study_item(&self, id: i64) -> Result<Option<StudyItem>> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner.items.iter().find(|i| i.id == id).cloned())
    }

    async fn find_or_create_item(&self, item_id: i64, kind: EntryKind) -> Result<StudyItem> {
        self.check_writable()?;
        let mut inner = self.inner.lock().expect("store lock");
        if let Some(existing) = inner
            .items
            .iter()
            .find(|i| i.item_id == item_id && i.item_type == kind)
        {
            return Ok(existing.clone());
        }
        let id = inner.next_item_id;
        inner.next_item_id += 1;
        let item = StudyItem::new(id, item_id, kind);
        inner.items.push(item.clone());
        Ok(item)
    }

    async fn remove_item(&self, id: i64) -> Result<()> {
        self.check_writable()?;
        let mut inner = self.inner.lock().expect("store lock");
        let before = inner.items.len();
        inner.items.retain(|i| i.id != id);
        if inner.items.len() == before {
            return Err(StoreError::ItemNotFound(id));
        }
        Ok(())
    }

    async fn is_in_study_list(&self, item_id: i64, kind: EntryKind) -> Result<bool> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner
            .items
            .iter()
            .any(|i| i.item_id == item_id && i.item_type == kind))
    }

    async fn review_deck(&self) -> Result<Vec<ReviewPair>> {
        let inner = self.inner.lock().expect("store lock");
        let mut deck = Vec::with_capacity(inner.items.len());
        for item in &inner.items {
            let corpus = match item.item_type {
                EntryKind::Character => &inner.characters,
                EntryKind::Word => &inner.words,
            };
            if let Some(entry) = corpus.iter().find(|e| e.id() == item.item_id) {
                deck.push(ReviewPair {
                    item: item.clone(),
                    entry: entry.clone(),
                });
            }
        }
        Ok(deck)
    }

    async fn update_priority(&self, id: i64, current: u32, max: u32) -> Result<()> {
        self.check_writable()?;
        let mut inner = self.inner.lock().expect("store lock");
        let item = inner
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::ItemNotFound(id))?;
        item.current_priority = current;
        item.max_priority = max;
        Ok(())
    }

    async fn record_review(&self, id: i64, current: u32, max: u32, learned: bool) -> Result<()> {
        self.check_writable()?;
        let mut inner = self.inner.lock().expect("store lock");
        let item = inner
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::ItemNotFound(id))?;
        item.current_priority = current;
        item.max_priority = max;
        item.learned = learned;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hanzi_core::CharacterEntry;

    fn character(id: i64, simplified: &str) -> DictionaryEntry {
        DictionaryEntry::Character(CharacterEntry {
            id,
            simplified: simplified.to_string(),
            traditional: simplified.to_string(),
            pinyin: "ma1".to_string(),
            definition: "test".to_string(),
        })
    }

    #[tokio::test]
    async fn find_or_create_is_idempotent() {
        let store = MemoryStore::with_corpus(vec![character(1, "水")], vec![]);
        let first = store.find_or_create_item(1, EntryKind::Character).await.unwrap();
        let second = store.find_or_create_item(1, EntryKind::Character).await.unwrap();
        assert_eq!(first.id, second.id);
        assert!(store.is_in_study_list(1, EntryKind::Character).await.unwrap());
    }

    #[tokio::test]
    async fn remove_missing_item_is_an_error() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.remove_item(42).await,
            Err(StoreError::ItemNotFound(42))
        ));
    }

    #[tokio::test]
    async fn review_deck_joins_items_with_entries() {
        let store = MemoryStore::with_corpus(vec![character(1, "水")], vec![]);
        store.find_or_create_item(1, EntryKind::Character).await.unwrap();
        // Item referencing a missing entry is skipped, not an error.
        store.insert_item(StudyItem::new(99, 12345, EntryKind::Character));

        let deck = store.review_deck().await.unwrap();
        assert_eq!(deck.len(), 1);
        assert_eq!(deck[0].entry.simplified(), "水");
    }

    #[tokio::test]
    async fn record_review_updates_all_fields_together() {
        let store = MemoryStore::with_corpus(vec![character(1, "水")], vec![]);
        let item = store.find_or_create_item(1, EntryKind::Character).await.unwrap();

        store.record_review(item.id, 3, 3, true).await.unwrap();

        let updated = store.study_item(item.id).await.unwrap().unwrap();
        assert_eq!(updated.current_priority, 3);
        assert_eq!(updated.max_priority, 3);
        assert!(updated.learned);
    }

    #[tokio::test]
    async fn fetch_counter_tracks_corpus_reads() {
        let store = MemoryStore::with_corpus(vec![character(1, "水")], vec![]);
        assert_eq!(store.fetch_count(), 0);
        store.characters().await.unwrap();
        store.words().await.unwrap();
        assert_eq!(store.fetch_count(), 2);
    }
}
