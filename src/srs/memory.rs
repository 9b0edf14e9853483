use std::collections::HashMap;
use std::sync::Mutex;

use anyhow::anyhow;
use chrono::NaiveDateTime;

use crate::srs::card::{CardContent, CardSource, CardType, ReviewRecord, SrsCard};
use crate::srs::engine::SchedulingState;
use crate::srs::store::{CardStore, StoreError};

#[derive(Default)]
struct Inner {
    cards: HashMap<i32, SrsCard>,
    reviews: Vec<ReviewRecord>,
    next_card_id: i32,
}

/// In-memory `CardStore` guarded by a single mutex. Backs the scheduler
/// tests and is good enough for ephemeral single-process runs.
#[derive(Default)]
pub struct MemoryCardStore {
    inner: Mutex<Inner>,
}

impl MemoryCardStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend(anyhow!("card store lock poisoned")))
    }
}

impl CardStore for MemoryCardStore {
    fn load_card(&self, user_id: i32, card_id: i32) -> Result<Option<SrsCard>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .cards
            .get(&card_id)
            .filter(|card| card.user_id == user_id)
            .cloned())
    }

    fn insert_card(
        &self,
        user_id: i32,
        card_type: CardType,
        content: CardContent,
        source: Option<CardSource>,
        now: NaiveDateTime,
    ) -> Result<SrsCard, StoreError> {
        let mut inner = self.lock()?;
        inner.next_card_id += 1;
        let state = SchedulingState::new_card();
        let card = SrsCard {
            card_id: inner.next_card_id,
            user_id,
            card_type,
            content,
            source,
            ease_factor: state.ease_factor,
            interval_days: state.interval_days,
            repetitions: state.repetitions,
            // A new card is due immediately.
            due_at: now,
            version: 1,
            created_at: now,
        };
        inner.cards.insert(card.card_id, card.clone());
        Ok(card)
    }

    fn save_card(&self, card: &SrsCard, expected_version: i32) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let stored = inner
            .cards
            .get_mut(&card.card_id)
            .filter(|stored| stored.user_id == card.user_id)
            .ok_or(StoreError::NotFound)?;
        if stored.version != expected_version {
            return Err(StoreError::Conflict);
        }
        let mut updated = card.clone();
        updated.version = expected_version + 1;
        *stored = updated;
        Ok(())
    }

    fn delete_card(&self, user_id: i32, card_id: i32) -> Result<bool, StoreError> {
        let mut inner = self.lock()?;
        let owned = inner
            .cards
            .get(&card_id)
            .is_some_and(|card| card.user_id == user_id);
        if owned {
            inner.cards.remove(&card_id);
        }
        Ok(owned)
    }

    fn append_review(&self, record: &ReviewRecord) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        inner.reviews.push(record.clone());
        Ok(())
    }

    fn due_cards(&self, user_id: i32, now: NaiveDateTime) -> Result<Vec<SrsCard>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .cards
            .values()
            .filter(|card| card.user_id == user_id && card.due_at <= now)
            .cloned()
            .collect())
    }

    fn all_cards(&self, user_id: i32) -> Result<Vec<SrsCard>, StoreError> {
        let inner = self.lock()?;
        let mut cards: Vec<SrsCard> = inner
            .cards
            .values()
            .filter(|card| card.user_id == user_id)
            .cloned()
            .collect();
        cards.sort_by_key(|card| card.card_id);
        Ok(cards)
    }

    fn reviews_since(
        &self,
        user_id: i32,
        since: NaiveDateTime,
    ) -> Result<Vec<ReviewRecord>, StoreError> {
        let inner = self.lock()?;
        Ok(inner
            .reviews
            .iter()
            .filter(|review| review.user_id == user_id && review.reviewed_at >= since)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    fn content(front: &str) -> CardContent {
        CardContent {
            front: front.to_string(),
            back: "answer".to_string(),
            pinyin: None,
            example: None,
            notes: None,
        }
    }

    fn store_with_card() -> (MemoryCardStore, SrsCard) {
        let store = MemoryCardStore::new();
        let card = store
            .insert_card(1, CardType::Vocabulary, content("你好"), None, now())
            .unwrap();
        (store, card)
    }

    #[test]
    fn new_cards_start_with_default_scheduling_and_are_due() {
        let (_, card) = store_with_card();
        assert_eq!(card.ease_factor, 2.5);
        assert_eq!(card.interval_days, 0);
        assert_eq!(card.repetitions, 0);
        assert_eq!(card.due_at, now());
        assert_eq!(card.version, 1);
    }

    #[test]
    fn cards_are_invisible_to_other_users() {
        let (store, card) = store_with_card();
        assert!(store.load_card(2, card.card_id).unwrap().is_none());
        assert!(!store.delete_card(2, card.card_id).unwrap());
        assert!(store.load_card(1, card.card_id).unwrap().is_some());
    }

    #[test]
    fn save_rejects_a_stale_version() {
        let (store, mut card) = store_with_card();
        card.repetitions = 1;
        store.save_card(&card, 1).unwrap();

        // Second writer still holds version 1.
        assert!(matches!(
            store.save_card(&card, 1),
            Err(StoreError::Conflict)
        ));
        let reloaded = store.load_card(1, card.card_id).unwrap().unwrap();
        assert_eq!(reloaded.version, 2);
    }

    #[test]
    fn due_query_excludes_future_cards() {
        let (store, card) = store_with_card();
        let mut future = card.clone();
        future.due_at = now() + chrono::Duration::days(3);
        store.save_card(&future, 1).unwrap();

        assert!(store.due_cards(1, now()).unwrap().is_empty());
        let later = now() + chrono::Duration::days(3);
        assert_eq!(store.due_cards(1, later).unwrap().len(), 1);
    }
}
