//! Review session deck scheduler.
//!
//! A session partitions the study list into a studying deck and a learned
//! deck and rotates through the active one by priority countdown: a card is
//! shown only when its priority has decayed to 1, and every pass over a
//! card with a higher priority decrements it. "Knew it" winds the countdown
//! up past the previous high-water mark and moves the card to the learned
//! deck; "forgot" resets the countdown and pulls it back.
//!
//! The session is an owned value; callers hold it and drive it with
//! sequential actions. Review actions persist first and mutate the
//! in-memory decks only after the write is acknowledged. Priority-decay
//! writes during card selection are the one exception: failures there are
//! logged and the in-memory deck stays authoritative for display until the
//! next resume-sync.

use crate::error::SessionError;
use crate::store::StudyStore;
use hanzi_core::{EntryKind, ReviewPair};
use std::collections::HashSet;
use tracing::warn;

/// Which deck the review view is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckTab {
    Studying,
    Learned,
}

/// An active review session over a storage collaborator.
pub struct ReviewSession<S> {
    store: S,
    studying: Vec<ReviewPair>,
    learned: Vec<ReviewPair>,
    active: DeckTab,
    /// Slot in the active deck where the next scan begins; one past the
    /// last shown card.
    scan_pos: usize,
    /// Study-item ids in the order they were shown.
    trail: Vec<i64>,
    /// Position in `trail` of the displayed card.
    cursor: usize,
    current: Option<i64>,
    single: bool,
}

impl<S: StudyStore> ReviewSession<S> {
    /// Start a session over the full study list.
    pub async fn start(store: S) -> Result<Self, SessionError> {
        let deck = store.review_deck().await?;
        let mut session = Self::from_deck(store, deck);
        session.select_next().await;
        Ok(session)
    }

    /// Start a session holding exactly one item, looked up (or created) by
    /// dictionary entry id. Navigation is disabled; review actions still go
    /// through the same transactional store operations.
    pub async fn single_item(store: S, kind: EntryKind, entry_id: i64) -> Result<Self, SessionError> {
        let entry = store
            .entry_by_id(kind, entry_id)
            .await?
            .ok_or(SessionError::EntryNotFound { kind, id: entry_id })?;
        let item = store.find_or_create_item(entry_id, kind).await?;
        let pair = ReviewPair { item, entry };

        let item_id = pair.item.id;
        let learned = pair.item.learned;
        let mut session = Self::from_deck(store, vec![pair]);
        session.single = true;
        session.active = if learned {
            DeckTab::Learned
        } else {
            DeckTab::Studying
        };
        session.current = Some(item_id);
        session.trail.push(item_id);
        Ok(session)
    }

    fn from_deck(store: S, deck: Vec<ReviewPair>) -> Self {
        let (learned, studying): (Vec<_>, Vec<_>) =
            deck.into_iter().partition(|pair| pair.item.learned);
        Self {
            store,
            studying,
            learned,
            active: DeckTab::Studying,
            scan_pos: 0,
            trail: Vec::new(),
            cursor: 0,
            current: None,
            single: false,
        }
    }

    /// The card currently displayed, if any.
    pub fn current(&self) -> Option<&ReviewPair> {
        let id = self.current?;
        self.find_pair(id)
    }

    pub fn active_tab(&self) -> DeckTab {
        self.active
    }

    pub fn studying(&self) -> &[ReviewPair] {
        &self.studying
    }

    pub fn learned(&self) -> &[ReviewPair] {
        &self.learned
    }

    /// Advance to the next card by the selection algorithm.
    pub async fn next(&mut self) {
        if self.single {
            return;
        }
        self.select_next().await;
    }

    /// Step back to the previously shown card. At the start of the trail
    /// this is a no-op; there is deliberately no wraparound.
    pub fn previous(&mut self) {
        if self.single || self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        self.current = Some(self.trail[self.cursor]);
    }

    /// Mark the current card as known.
    ///
    /// The new priority is the old high-water mark plus one (both current
    /// and max), the card becomes learned, and it moves to the learned
    /// deck. The durable write is awaited before any in-memory change.
    pub async fn mark_known(&mut self) -> Result<(), SessionError> {
        let Some(id) = self.current else {
            return Ok(());
        };
        let Some(pair) = self.find_pair(id) else {
            return Ok(());
        };
        let new_priority = pair.item.max_priority + 1;

        self.store
            .record_review(id, new_priority, new_priority, true)
            .await?;

        if let Some(mut pair) = self.remove_pair(id) {
            pair.item.current_priority = new_priority;
            pair.item.max_priority = new_priority;
            pair.item.learned = true;
            self.learned.push(pair);
        }

        if !self.single {
            self.select_next().await;
        }
        Ok(())
    }

    /// Mark the current card as forgotten.
    ///
    /// The countdown resets to 1, the high-water mark drops by one (floor
    /// 1), the card is unlearned and returns to the studying deck.
    pub async fn mark_forgotten(&mut self) -> Result<(), SessionError> {
        let Some(id) = self.current else {
            return Ok(());
        };
        let Some(pair) = self.find_pair(id) else {
            return Ok(());
        };
        let new_max = pair.item.max_priority.saturating_sub(1).max(1);

        self.store.record_review(id, 1, new_max, false).await?;

        if let Some(mut pair) = self.remove_pair(id) {
            pair.item.current_priority = 1;
            pair.item.max_priority = new_max;
            pair.item.learned = false;
            self.studying.push(pair);
        }

        if !self.single {
            self.select_next().await;
        }
        Ok(())
    }

    /// Switch between the studying and learned decks. Resets the scan
    /// position and immediately selects a card from the new deck.
    pub async fn switch_tab(&mut self, tab: DeckTab) {
        if self.single || self.active == tab {
            return;
        }
        self.active = tab;
        self.scan_pos = 0;
        self.select_next().await;
    }

    /// Reconcile with durable state after the view resumes.
    ///
    /// If the persisted deck holds a different set of items than the
    /// session (something was added or removed elsewhere, e.g. via search
    /// or OCR), the session restarts fresh from storage — a full reload,
    /// not a merge. The active tab is view state and survives. Returns
    /// whether a reload happened.
    pub async fn sync(&mut self) -> Result<bool, SessionError> {
        if self.single {
            return Ok(false);
        }

        let deck = self.store.review_deck().await?;
        let fresh: HashSet<i64> = deck.iter().map(|pair| pair.item.id).collect();
        let known: HashSet<i64> = self
            .studying
            .iter()
            .chain(self.learned.iter())
            .map(|pair| pair.item.id)
            .collect();
        if fresh == known {
            return Ok(false);
        }

        let (learned, studying): (Vec<_>, Vec<_>) =
            deck.into_iter().partition(|pair| pair.item.learned);
        self.studying = studying;
        self.learned = learned;
        self.scan_pos = 0;
        self.trail.clear();
        self.cursor = 0;
        self.current = None;
        self.select_next().await;
        Ok(true)
    }

    /// Find the next card to show in the active deck.
    ///
    /// Scans from the slot after the last shown index. Cards with priority
    /// above 1 are decremented and skipped; the first card found at
    /// priority 1 is selected. A lap that selects nothing has lowered every
    /// remaining priority, so the scan restarts until one reaches 1. An
    /// empty deck clears the display without ending the session.
    async fn select_next(&mut self) {
        let mut decayed: Vec<(i64, u32, u32)> = Vec::new();
        let selected = {
            let deck = match self.active {
                DeckTab::Studying => &mut self.studying,
                DeckTab::Learned => &mut self.learned,
            };
            if deck.is_empty() {
                self.current = None;
                return;
            }
            let len = deck.len();
            let selected;
            'scan: loop {
                for offset in 0..len {
                    let idx = (self.scan_pos + offset) % len;
                    let item = &mut deck[idx].item;
                    if item.current_priority > 1 {
                        item.current_priority -= 1;
                        decayed.push((item.id, item.current_priority, item.max_priority));
                    } else {
                        selected = idx;
                        break 'scan;
                    }
                }
            }
            self.scan_pos = selected + 1;
            deck[selected].item.id
        };

        self.current = Some(selected);
        self.trail.push(selected);
        self.cursor = self.trail.len() - 1;

        // Persist only the final value per decayed item. Failures are
        // logged; the in-memory deck stays authoritative for display and
        // resume-sync reconciles later.
        let mut persisted = HashSet::new();
        for &(id, current, max) in decayed.iter().rev() {
            if !persisted.insert(id) {
                continue;
            }
            if let Err(err) = self.store.update_priority(id, current, max).await {
                warn!(item_id = id, error = %err, "failed to persist priority decay");
            }
        }
    }

    fn find_pair(&self, id: i64) -> Option<&ReviewPair> {
        self.studying
            .iter()
            .chain(self.learned.iter())
            .find(|pair| pair.item.id == id)
    }

    fn remove_pair(&mut self, id: i64) -> Option<ReviewPair> {
        if let Some(pos) = self.studying.iter().position(|p| p.item.id == id) {
            return Some(self.studying.remove(pos));
        }
        if let Some(pos) = self.learned.iter().position(|p| p.item.id == id) {
            return Some(self.learned.remove(pos));
        }
        None
    }
}
